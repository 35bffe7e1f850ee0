mod state;
mod style;
mod ui;

use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use eframe::{egui, App};

use crate::classify::{ClassifyError, ClassifyEvent, PredictionClient};
use crate::history::{HistoryStore, HISTORY_FILE_NAME};
use crate::intake::{self, SelectedImage};
pub use state::{SessionPhase, SessionState};

/// The LeafScan window: session state plus the handles that outlive a frame.
pub struct LeafScanApp {
    session: SessionState,
    history: HistoryStore,
    client: PredictionClient,
    events: Option<std_mpsc::Receiver<ClassifyEvent>>,
    request_seq: u64,
    preview_texture: Option<egui::TextureHandle>,
}

impl LeafScanApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let client = PredictionClient::from_env();
        let history = match HistoryStore::default_location() {
            Ok(store) => store,
            Err(err) => {
                tracing::warn!("no application directory ({err}); keeping history in the working directory");
                HistoryStore::new(HISTORY_FILE_NAME)
            }
        };
        let app = Self::from_parts(client, history);
        tracing::info!(
            "session started; endpoint {}, history at {} ({} stored)",
            app.client.endpoint(),
            app.history.path().display(),
            app.session.history.len()
        );
        app
    }

    fn from_parts(client: PredictionClient, history: HistoryStore) -> Self {
        let session = SessionState {
            history: history.load(),
            ..SessionState::default()
        };
        Self {
            session,
            history,
            client,
            events: None,
            request_seq: 0,
            preview_texture: None,
        }
    }

    /// Handle a file chosen through the picker or dropped onto the window:
    /// load it, swap in its preview texture, and dispatch the upload.
    fn select_file(&mut self, ctx: &egui::Context, path: PathBuf) {
        let Some((selected, preview)) = intake::load_selection(&path) else {
            return;
        };
        self.preview_texture =
            preview.map(|pixels| ctx.load_texture("leaf_preview", pixels, egui::TextureOptions::LINEAR));
        self.submit(selected);
    }

    /// Send one classification to a worker thread under a fresh generation.
    /// Any request still in flight is superseded from this moment on.
    fn submit(&mut self, selected: SelectedImage) {
        self.request_seq += 1;
        let generation = self.request_seq;
        tracing::info!(
            "submitting {} ({}) as request {generation}",
            selected.path.display(),
            selected.size_label()
        );

        let (sender, receiver) = std_mpsc::channel();
        self.events = Some(receiver);

        let client = self.client.clone();
        let file_name = selected.file_name.clone();
        let mime = selected.mime;
        let bytes = selected.bytes.clone();
        self.session.begin_submission(selected, generation);

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(client.classify(&file_name, mime, bytes.as_ref().clone())),
                Err(err) => Err(ClassifyError::Transport {
                    reason: format!("failed to start async runtime: {err}"),
                }),
            };
            let _ = sender.send(ClassifyEvent {
                generation,
                outcome,
            });
        });
    }

    /// Drain settled outcomes from the worker channel. Only the current
    /// generation may change the session; a current success is also written
    /// to history, and a history write failure stays in the log.
    fn poll_events(&mut self) {
        let Some(receiver) = &self.events else {
            return;
        };
        while let Ok(ClassifyEvent {
            generation,
            outcome,
        }) = receiver.try_recv()
        {
            match &outcome {
                Ok(prediction) => tracing::info!(
                    "request {generation}: {} at {}",
                    prediction.class,
                    style::confidence_label(prediction.confidence)
                ),
                Err(ClassifyError::Service { status, detail }) => {
                    tracing::warn!("request {generation}: service rejected with {status}: {detail}")
                }
                Err(ClassifyError::Transport { reason }) => {
                    tracing::warn!("request {generation}: transport failure: {reason}")
                }
            }

            if !self.session.settle(generation, outcome) {
                tracing::info!("request {generation} superseded; dropping its outcome");
                continue;
            }
            if let Some(prediction) = self.session.prediction().cloned() {
                match self.history.record(&prediction) {
                    Ok(entries) => self.session.history = entries,
                    Err(err) => tracing::warn!("prediction not saved to history: {err}"),
                }
            }
        }
        if !self.session.is_submitting() {
            self.events = None;
        }
    }

    /// Files dropped anywhere on the window act like a picker choice; the
    /// first image file of a multi-drop wins and the rest are ignored.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        let path = dropped
            .into_iter()
            .filter_map(|file| file.path)
            .find(|path| intake::is_image_file(path));
        match path {
            Some(path) => self.select_file(ctx, path),
            None => tracing::debug!("ignoring drop without an image file"),
        }
    }

    fn open_picker(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &intake::IMAGE_EXTENSIONS)
            .set_title("Choose a potato leaf photo")
            .pick_file();
        match picked {
            Some(path) => self.select_file(ctx, path),
            None => tracing::debug!("file picker cancelled"),
        }
    }

    /// "Try Another Image": back to Idle, releasing the preview texture.
    fn clear(&mut self) {
        self.session.clear();
        self.preview_texture = None;
    }
}

impl App for LeafScanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        self.handle_dropped_files(ctx);
        self.render(ctx);
        if self.session.is_submitting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
