//! Fixed mapping from predicted labels to visual treatment.

use egui::Color32;

const GREEN: &str = "#10b981";
const AMBER: &str = "#f59e0b";
const RED: &str = "#ef4444";

/// How one verdict is drawn: leading icon, accent color, and the card's
/// fill and border derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub icon: &'static str,
    pub color: Color32,
    pub fill: Color32,
    pub stroke: Color32,
}

/// Same label in, same treatment out. Labels the client was never taught
/// get the neutral potato treatment instead of failing.
pub fn verdict_for(class: &str) -> Verdict {
    match class {
        "Healthy" => verdict("✅", GREEN),
        "Early Blight" => verdict("⚠", AMBER),
        "Late Blight" => verdict("🚨", RED),
        _ => verdict("🥔", GREEN),
    }
}

/// Treatment for the failure card.
pub fn error_verdict() -> Verdict {
    verdict("🍃", RED)
}

/// The brand color used for headers, buttons, and the dropzone border.
pub fn accent() -> Color32 {
    color_from_hex(GREEN).unwrap_or(Color32::GREEN)
}

fn verdict(icon: &'static str, hex: &str) -> Verdict {
    let color = color_from_hex(hex).unwrap_or(Color32::WHITE);
    Verdict {
        icon,
        color,
        fill: translucent(color, 38),
        stroke: translucent(color, 102),
    }
}

/// Parse `#rrggbb` into an opaque color.
pub fn color_from_hex(hex: &str) -> Option<Color32> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

fn translucent(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// One-decimal percentage, `98.7%`, used identically by the result card and
/// the history rows.
pub fn confidence_label(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}
