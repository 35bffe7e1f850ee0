//! Selection and preview of the image to classify.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use egui::ColorImage;

/// Extensions accepted by the picker and by window drops.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

/// Longest preview edge; bigger images are downscaled before upload to the
/// texture manager.
const PREVIEW_MAX_EDGE: u32 = 512;

/// The file currently chosen for classification.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: Arc<Vec<u8>>,
    pub mime: &'static str,
}

impl SelectedImage {
    pub fn size_label(&self) -> String {
        format_size(self.bytes.len() as u64)
    }
}

/// True when the path carries one of the accepted image extensions.
pub fn is_image_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Read a selection and decode its preview. Returns `None` when the file
/// should be silently ignored (wrong extension, unreadable). A readable image
/// file that fails to decode still uploads, the service owns content
/// validation, so it comes back with no preview pixels.
pub fn load_selection(path: &Path) -> Option<(SelectedImage, Option<ColorImage>)> {
    if !is_image_file(path) {
        tracing::debug!("ignoring non-image selection {}", path.display());
        return None;
    }
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!("ignoring unreadable selection {}: {err}", path.display());
            return None;
        }
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let preview = decode_preview(&bytes);
    if preview.is_none() {
        tracing::warn!(
            "could not decode {} locally; uploading it anyway",
            path.display()
        );
    }

    let selected = SelectedImage {
        file_name,
        mime: mime_for_path(path),
        path: path.to_path_buf(),
        bytes: Arc::new(bytes),
    };
    Some((selected, preview))
}

fn decode_preview(bytes: &[u8]) -> Option<ColorImage> {
    let decoded = image::load_from_memory(bytes).ok()?;
    let scaled = if decoded.width() > PREVIEW_MAX_EDGE || decoded.height() > PREVIEW_MAX_EDGE {
        decoded.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE)
    } else {
        decoded
    };
    let rgba = scaled.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Content type for the upload; the service turns away anything that does
/// not claim to be an image.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "image/*",
    }
}

/// Human-readable size for the preview caption.
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Encode a solid-color PNG for tests elsewhere in the crate.
#[cfg(test)]
pub fn test_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = image::RgbaImage::from_pixel(width, height, image::Rgba([34, 139, 34, 255]));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(&mut cursor, image::ImageOutputFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extension_filter_accepts_images_case_insensitively() {
        assert!(is_image_file(Path::new("leaf.png")));
        assert!(is_image_file(Path::new("Leaf.JPG")));
        assert!(is_image_file(Path::new("scan.tiff")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("archive.tar.gz")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn small_image_keeps_its_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, test_png_bytes(64, 48)).unwrap();

        let (selected, preview) = load_selection(&path).unwrap();
        assert_eq!(selected.file_name, "leaf.png");
        assert_eq!(selected.mime, "image/png");
        let preview = preview.unwrap();
        assert_eq!(preview.size, [64, 48]);
    }

    #[test]
    fn large_image_is_downscaled_keeping_aspect() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, test_png_bytes(1400, 700)).unwrap();

        let (_, preview) = load_selection(&path).unwrap();
        let preview = preview.unwrap();
        assert_eq!(preview.size, [512, 256]);
    }

    #[test]
    fn undecodable_image_file_is_kept_without_preview() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png at all").unwrap();

        let (selected, preview) = load_selection(&path).unwrap();
        assert_eq!(selected.bytes.len(), 16);
        assert!(preview.is_none());
    }

    #[test]
    fn non_image_and_missing_files_are_ignored() {
        let dir = tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hello").unwrap();

        assert!(load_selection(&text).is_none());
        assert!(load_selection(&dir.path().join("ghost.png")).is_none());
    }

    #[test]
    fn mime_follows_the_extension() {
        assert_eq!(mime_for_path(Path::new("a.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("a.tif")), "image/tiff");
    }

    #[test]
    fn sizes_format_for_captions() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1_572_864), "1.5 MB");
    }
}
