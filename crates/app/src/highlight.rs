use eframe::egui::text::{LayoutJob, TextFormat};
use eframe::egui::{Color32, FontId};
use pdf_clip_core::TextView;

pub const HIGHLIGHT_BACKGROUND: Color32 = Color32::YELLOW;

/// Lays out the result text with every search hit on a yellow background.
pub fn layout_view(view: &TextView, text_color: Color32) -> LayoutJob {
    let mut job = LayoutJob::default();
    let plain = TextFormat {
        font_id: FontId::monospace(13.0),
        color: text_color,
        ..Default::default()
    };

    for (text, highlighted) in view.segments() {
        let format = if highlighted {
            TextFormat {
                background: HIGHLIGHT_BACKGROUND,
                color: Color32::BLACK,
                ..plain.clone()
            }
        } else {
            plain.clone()
        };
        job.append(text, 0.0, format);
    }

    job
}
