//! Window layout and event wiring for the desktop front end.

use crate::clipboard::copy_to_clipboard;
use crate::highlight::layout_view;
use eframe::egui;
use pdf_clip_core::{CanvasPoint, SelectorState, Session, SessionError};
use pdf_clip_engine::PdfEngine;
use std::path::PathBuf;

const SELECTION_STROKE: egui::Color32 = egui::Color32::RED;

struct PageTexture {
    page_index: u32,
    handle: egui::TextureHandle,
    size: egui::Vec2,
}

#[derive(Clone, Copy, PartialEq)]
enum ErrorSeverity {
    Error,
    Warning,
}

impl ErrorSeverity {
    fn title(&self) -> &'static str {
        match self {
            ErrorSeverity::Error => "Error",
            ErrorSeverity::Warning => "Warning",
        }
    }
}

struct ErrorDialogState {
    severity: ErrorSeverity,
    message: String,
}

pub struct PdfClipApp {
    session: Session<Box<dyn PdfEngine>>,
    page_texture: Option<PageTexture>,
    // Page whose render failed; kept so the error is not re-raised every frame.
    failed_page: Option<u32>,
    go_to_entry: String,
    search_query: String,
    status: String,
    error_dialog: Option<ErrorDialogState>,
}

impl PdfClipApp {
    pub fn new(session: Session<Box<dyn PdfEngine>>) -> Self {
        Self {
            session,
            page_texture: None,
            failed_page: None,
            go_to_entry: String::new(),
            search_query: String::new(),
            status: String::new(),
            error_dialog: None,
        }
    }

    fn show_error(&mut self, severity: ErrorSeverity, message: impl Into<String>) {
        self.error_dialog = Some(ErrorDialogState { severity, message: message.into() });
    }

    fn report(&mut self, err: SessionError) {
        if err.is_user_input() {
            log::debug!("rejected input: {err}");
            self.show_error(ErrorSeverity::Warning, err.to_string());
        } else {
            log::error!("{err}");
            self.show_error(ErrorSeverity::Error, err.to_string());
        }
    }

    fn page_changed(&mut self) {
        self.page_texture = None;
        self.failed_page = None;
    }

    fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("PDF", &["pdf"]).pick_file() {
            self.load_pdf(path);
        }
    }

    pub fn load_pdf(&mut self, path: PathBuf) {
        match self.session.load(&path) {
            Ok(()) => {
                self.page_changed();
                self.status = format!("Loaded {}", path.display());
            }
            Err(err) => self.report(err),
        }
    }

    fn extract(&mut self) {
        match self.session.extract() {
            Ok(()) => {
                self.status = format!("Extracted {} pages", self.session.extracted().len());
            }
            Err(err) => self.report(err),
        }
    }

    fn search(&mut self) {
        if let Some(summary) = self.session.search(&self.search_query) {
            self.status = format!("{} matches on {} pages", summary.matches, summary.pages);
        }
    }

    fn back(&mut self) {
        self.session.clear_search();
        self.status.clear();
    }

    fn go_to(&mut self) {
        match self.session.go_to_entry(&self.go_to_entry) {
            Ok(()) => self.page_changed(),
            Err(err) => self.report(err),
        }
    }

    fn copy_results(&mut self) {
        match copy_to_clipboard(self.session.view().text()) {
            Ok(()) => self.status = "Copied to clipboard".to_owned(),
            Err(err) => self.show_error(ErrorSeverity::Warning, err.to_string()),
        }
    }

    fn ensure_page_texture(&mut self, ctx: &egui::Context) {
        if !self.session.is_loaded() {
            return;
        }
        let page_index = self.session.current_index();
        let cached = self.page_texture.as_ref().is_some_and(|t| t.page_index == page_index);
        if cached || self.failed_page == Some(page_index) {
            return;
        }

        match self.session.render_current_page() {
            Ok(image) => {
                let size = [image.width() as usize, image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                let handle = ctx.load_texture(
                    format!("page_{page_index}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                self.page_texture = Some(PageTexture {
                    page_index,
                    handle,
                    size: egui::vec2(size[0] as f32, size[1] as f32),
                });
            }
            Err(err) => {
                self.failed_page = Some(page_index);
                self.page_texture = None;
                self.report(err);
            }
        }
    }
}

impl eframe::App for PdfClipApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard_shortcuts(ctx);
        self.ensure_page_texture(ctx);
        self.draw_status_bar(ctx);
        self.draw_controls(ctx);
        self.draw_page(ctx);
        self.draw_error_dialog(ctx);
    }
}

impl PdfClipApp {
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if escape && self.error_dialog.is_some() {
            self.error_dialog = None;
        }
    }

    fn draw_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let navigator = self.session.navigator();
                if self.session.is_loaded() {
                    ui.label(format!(
                        "Page {} of {}",
                        navigator.current_page_number(),
                        navigator.page_count()
                    ));
                    ui.separator();
                }
                ui.label(&self.status);
            });
        });
    }

    fn draw_controls(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("controls")
            .resizable(true)
            .default_width(380.0)
            .min_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal_wrapped(|ui| {
                    if ui.button("Load PDF").clicked() {
                        self.open_file();
                    }
                    if ui.button("Extract Text").clicked() {
                        self.extract();
                    }
                });

                ui.horizontal(|ui| {
                    let loaded = self.session.is_loaded();
                    let navigator = *self.session.navigator();
                    if ui
                        .add_enabled(loaded && !navigator.is_first(), egui::Button::new("Previous Page"))
                        .clicked()
                        && self.session.prev()
                    {
                        self.page_changed();
                    }
                    if ui
                        .add_enabled(loaded && !navigator.is_last(), egui::Button::new("Next Page"))
                        .clicked()
                        && self.session.next()
                    {
                        self.page_changed();
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Go to page:");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.go_to_entry).desired_width(60.0),
                    );
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Go").clicked() || submitted {
                        self.go_to();
                    }
                });

                ui.separator();

                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.search_query)
                            .hint_text("Search...")
                            .desired_width(180.0),
                    );
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Search").clicked() || submitted {
                        self.search();
                    }
                    if ui.button("Back").clicked() {
                        self.back();
                    }
                    if ui.button("Copy").clicked() {
                        self.copy_results();
                    }
                });

                ui.separator();

                egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    if self.session.view().is_empty() {
                        ui.weak("Draw a rectangle on the page, then press Extract Text.");
                    } else {
                        let job = layout_view(self.session.view(), ui.visuals().text_color());
                        ui.label(job);
                    }
                });
            });
    }

    fn draw_page(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(texture) = &self.page_texture else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Load a PDF to get started");
                });
                return;
            };
            let texture_id = texture.handle.id();
            let size = texture.size;

            egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                // One canvas unit per rendered pixel, so pointer offsets map straight to the image.
                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());
                ui.painter().image(
                    texture_id,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                self.track_pointer(ui, &response, rect);

                if let Some(selection) = self.session.selector().rect() {
                    let drawn = egui::Rect::from_two_pos(
                        rect.min + egui::vec2(selection.x0, selection.y0),
                        rect.min + egui::vec2(selection.x1, selection.y1),
                    );
                    ui.painter().rect_stroke(
                        drawn,
                        0.0,
                        egui::Stroke::new(2.0, SELECTION_STROKE),
                        egui::StrokeKind::Middle,
                    );
                }
            });
        });
    }

    /// Feeds pointer input over the page canvas into the region selector.
    ///
    /// The first corner is where the button went down, not where egui
    /// recognized a drag, and a click without movement leaves an empty
    /// rectangle behind.
    fn track_pointer(&mut self, ui: &egui::Ui, response: &egui::Response, canvas: egui::Rect) {
        let (pressed, released, down, origin, latest) = ui.input(|i| {
            (
                i.pointer.any_pressed(),
                i.pointer.any_released(),
                i.pointer.any_down(),
                i.pointer.press_origin(),
                i.pointer.latest_pos(),
            )
        });

        if pressed && response.hovered() {
            if let Some(origin) = origin.filter(|pos| canvas.contains(*pos)) {
                self.session.pointer_down(canvas_point(origin, canvas));
            }
        }

        if self.session.selector().state() != SelectorState::Dragging {
            return;
        }
        let Some(latest) = latest else {
            return;
        };
        if released {
            self.session.pointer_up(canvas_point(latest, canvas));
        } else if down {
            self.session.pointer_move(canvas_point(latest, canvas));
        }
    }

    fn draw_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(error) = &self.error_dialog else {
            return;
        };

        let title = error.severity.title();
        let message = error.message.clone();

        let mut should_close = false;
        // Blocks input to the panels underneath until dismissed.
        egui::Modal::new(egui::Id::new("error_dialog")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.heading(title);
            ui.add_space(6.0);
            ui.label(&message);
            ui.add_space(12.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                if ui.button("OK").clicked() {
                    should_close = true;
                }
            });
        });

        if should_close {
            self.error_dialog = None;
        }
    }
}

/// Maps a screen position onto the page canvas, clamped to its bounds.
fn canvas_point(pos: egui::Pos2, canvas: egui::Rect) -> CanvasPoint {
    let offset = pos - canvas.min;
    CanvasPoint::new(offset.x.clamp(0.0, canvas.width()), offset.y.clamp(0.0, canvas.height()))
}
