//! Rectangle selection over the displayed page.

use pdf_clip_engine::ClipRect;

/// Pointer position on the page canvas, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rectangle as drawn: first corner is the press, second follows the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl SelectionRect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn at(point: CanvasPoint) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// True when both corners fall in the same pixel column or row.
    pub fn is_degenerate(&self) -> bool {
        self.x0.trunc() == self.x1.trunc() || self.y0.trunc() == self.y1.trunc()
    }

    /// Page-space clip for a canvas drawn at `render_scale` pixels per point.
    pub fn to_clip(&self, render_scale: f32) -> ClipRect {
        let scale = if render_scale > 0.0 { render_scale } else { 1.0 };
        ClipRect::from_corners(
            self.x0 / scale,
            self.y0 / scale,
            self.x1 / scale,
            self.y1 / scale,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorState {
    #[default]
    Idle,
    Dragging,
}

/// Press/drag state machine that owns the current rectangle.
///
/// The rectangle survives until the next press, so extraction can run again
/// after a document reload without redrawing.
#[derive(Debug, Clone, Default)]
pub struct RegionSelector {
    state: SelectorState,
    rect: Option<SelectionRect>,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Last drawn rectangle, degenerate or not.
    pub fn rect(&self) -> Option<SelectionRect> {
        self.rect
    }

    /// Rectangle usable for extraction.
    pub fn selection(&self) -> Option<SelectionRect> {
        self.rect.filter(|rect| !rect.is_degenerate())
    }

    pub fn pointer_down(&mut self, point: CanvasPoint) {
        self.rect = Some(SelectionRect::at(point));
        self.state = SelectorState::Dragging;
    }

    pub fn pointer_move(&mut self, point: CanvasPoint) {
        if self.state != SelectorState::Dragging {
            return;
        }
        if let Some(rect) = self.rect.as_mut() {
            rect.x1 = point.x;
            rect.y1 = point.y;
        }
    }

    pub fn pointer_up(&mut self, point: CanvasPoint) {
        self.pointer_move(point);
        self.state = SelectorState::Idle;
    }

    pub fn clear(&mut self) {
        self.rect = None;
        self.state = SelectorState::Idle;
    }
}
