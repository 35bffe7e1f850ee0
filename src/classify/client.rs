use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::types::{ClassifyError, Prediction};

/// Endpoint used when no override is configured; matches the local
/// development service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";
/// Environment variable overriding the classifier endpoint.
pub const ENDPOINT_ENV_VAR: &str = "LEAFSCAN_API_URL";

/// Uploads images to the classifier and interprets its answers.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    endpoint: String,
}

/// Wire shape of a success body. `confidence` arrives as a JSON number or a
/// numeric string; anything else is rejected.
#[derive(Deserialize)]
struct RawPrediction {
    class: String,
    confidence: RawConfidence,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConfidence {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint from `LEAFSCAN_API_URL`, falling back to the local default.
    pub fn from_env() -> Self {
        let endpoint = std::env::var(ENDPOINT_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload one image as a multipart `file` part and wait for the verdict.
    pub async fn classify(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Prediction, ClassifyError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(mime)
            .map_err(|err| ClassifyError::Transport {
                reason: format!("invalid content type {mime}: {err}"),
            })?;
        let form = Form::new().part("file", part);

        let client = reqwest::Client::new();
        let response = client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| ClassifyError::Transport {
                reason: err.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClassifyError::Transport {
                reason: format!("failed to read response body: {err}"),
            })?;

        if status.is_success() {
            parse_prediction(&body)
        } else {
            Err(rejection(status.as_u16(), &body))
        }
    }
}

/// Validate a success body instead of trusting it. Off-shape answers become
/// transport errors so the user sees the retry text, not raw JSON.
fn parse_prediction(body: &[u8]) -> Result<Prediction, ClassifyError> {
    let raw: RawPrediction =
        serde_json::from_slice(body).map_err(|err| ClassifyError::Transport {
            reason: format!("unexpected response body: {err}"),
        })?;
    let confidence = match raw.confidence {
        RawConfidence::Number(value) => value,
        RawConfidence::Text(text) => {
            text.trim()
                .parse::<f64>()
                .map_err(|err| ClassifyError::Transport {
                    reason: format!("confidence {text:?} is not a number: {err}"),
                })?
        }
    };
    if !confidence.is_finite() {
        return Err(ClassifyError::Transport {
            reason: format!("confidence {confidence} is not finite"),
        });
    }
    Ok(Prediction {
        class: raw.class,
        confidence,
    })
}

/// Map a non-2xx answer to the error taxonomy: a usable `detail` string is a
/// service rejection, anything else counts as transport.
fn rejection(status: u16, body: &[u8]) -> ClassifyError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err_body) if !err_body.detail.trim().is_empty() => ClassifyError::Service {
            status,
            detail: err_body.detail,
        },
        _ => ClassifyError::Transport {
            reason: format!("service answered {status} without a usable message"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use std::net::TcpListener;
    use tokio::runtime::Runtime;

    fn classify_blocking(
        endpoint: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Prediction, ClassifyError> {
        let client = PredictionClient::new(endpoint);
        Runtime::new()
            .unwrap()
            .block_on(client.classify(file_name, "image/png", bytes))
    }

    #[test]
    fn success_parses_and_posts_multipart_file_field() {
        let body = r#"{"class":"Healthy","confidence":0.987}"#;
        let (url, request_rx) = testing::serve_once(testing::json_response(200, body));

        let prediction = classify_blocking(&url, "leaf.png", vec![1, 2, 3]).unwrap();
        assert_eq!(prediction.class, "Healthy");
        assert!((prediction.confidence - 0.987).abs() < 1e-9);

        let request = request_rx.recv().unwrap();
        let text = String::from_utf8_lossy(&request).to_lowercase();
        assert!(text.starts_with("post /predict"));
        assert!(text.contains("name=\"file\""));
        assert!(text.contains("filename=\"leaf.png\""));
        assert!(text.contains("content-type: image/png"));
    }

    #[test]
    fn string_confidence_is_accepted() {
        let body = r#"{"class":"Early Blight","confidence":"0.9131"}"#;
        let (url, _rx) = testing::serve_once(testing::json_response(200, body));

        let prediction = classify_blocking(&url, "leaf.jpg", vec![0]).unwrap();
        assert_eq!(prediction.class, "Early Blight");
        assert!((prediction.confidence - 0.9131).abs() < 1e-9);
    }

    #[test]
    fn service_detail_is_kept_verbatim() {
        let body = r#"{"detail":"File must be an image"}"#;
        let (url, _rx) = testing::serve_once(testing::json_response(400, body));

        let err = classify_blocking(&url, "notes.png", vec![0]).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::Service {
                status: 400,
                detail: "File must be an image".to_string(),
            }
        );
        assert_eq!(err.to_string(), "File must be an image");
    }

    #[test]
    fn failure_without_detail_uses_the_generic_text() {
        let (url, _rx) = testing::serve_once(testing::json_response(500, ""));

        let err = classify_blocking(&url, "leaf.png", vec![0]).unwrap_err();
        assert!(matches!(err, ClassifyError::Transport { .. }));
        assert_eq!(err.to_string(), "Failed to analyze image. Please try again.");
    }

    #[test]
    fn off_shape_success_body_degrades_to_transport() {
        let body = r#"{"verdict":"fine"}"#;
        let (url, _rx) = testing::serve_once(testing::json_response(200, body));

        let err = classify_blocking(&url, "leaf.png", vec![0]).unwrap_err();
        assert!(matches!(err, ClassifyError::Transport { .. }));
        assert_eq!(err.to_string(), "Failed to analyze image. Please try again.");
    }

    #[test]
    fn unreachable_endpoint_is_transport() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = classify_blocking(&format!("http://{addr}/predict"), "leaf.png", vec![0])
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Transport { .. }));
    }

    #[test]
    fn non_numeric_string_confidence_is_rejected() {
        let err = parse_prediction(br#"{"class":"Healthy","confidence":"very"}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Transport { .. }));
    }

    #[test]
    fn endpoint_env_override_wins_over_default() {
        std::env::set_var(ENDPOINT_ENV_VAR, "http://10.0.0.7:9000/predict");
        assert_eq!(
            PredictionClient::from_env().endpoint(),
            "http://10.0.0.7:9000/predict"
        );
        std::env::remove_var(ENDPOINT_ENV_VAR);
        assert_eq!(PredictionClient::from_env().endpoint(), DEFAULT_ENDPOINT);
    }
}
