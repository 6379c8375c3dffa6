use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use crate::viewport::Viewport;

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
pub(super) const BUBBLE_FILL: Color32 = Color32::from_rgb(25, 118, 210);
pub(super) const MENU_OWNER_FILL: Color32 = Color32::from_rgb(214, 64, 196);
pub(super) const LINK_SOURCE_RING: Color32 = Color32::from_rgb(246, 206, 104);
pub(super) const LINK_COLOR: Color32 = Color32::from_rgba_premultiplied(150, 160, 172, 210);

pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: &Viewport) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (56.0 * viewport.scale().clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + viewport.pan_offset();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// Link width on screen; thin when zoomed in, never vanishing when zoomed out.
pub(super) fn link_width(scale: f32) -> f32 {
    ((3.0 / scale).clamp(0.5, 5.0) * scale).clamp(0.75, 6.0)
}

pub(super) fn label_size(scale: f32) -> f32 {
    (14.0 * scale.sqrt()).clamp(10.0, 28.0)
}
