use std::collections::HashMap;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};

use crate::canvas::{self, CanvasSnapshot, InteractionMode};
use crate::graph::Bubble;

use super::super::BubbleCanvasApp;
use super::super::render_utils::{
    BUBBLE_FILL, LINK_COLOR, LINK_SOURCE_RING, MENU_OWNER_FILL, circle_visible, draw_background,
    edge_visible, label_size, link_width,
};
use super::interaction::read_gestures;

impl BubbleCanvasApp {
    /// Feeds this frame's gestures to the canvas and paints the result.
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) -> (CanvasSnapshot, Rect) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let gestures = read_gestures(ui, rect, &response);

        let (snapshot, hints) = {
            let mut canvas = canvas::lock(&self.canvas);
            let mut hints = Vec::new();
            for gesture in gestures {
                let event = gesture.into_event(&canvas);
                if let Some(hint) = canvas.handle_pointer(event) {
                    hints.push(hint);
                }
            }
            (canvas.snapshot(), hints)
        };
        self.apply_hints(hints);

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, &snapshot.viewport);
        paint_links(&painter, rect, &snapshot);
        paint_bubbles(&painter, rect, &snapshot);
        paint_status(&painter, rect, &snapshot);

        (snapshot, rect)
    }
}

fn screen_pos(rect: Rect, snapshot: &CanvasSnapshot, bubble: &Bubble) -> Pos2 {
    rect.min + snapshot.viewport.world_to_screen(bubble.position)
}

fn paint_links(painter: &Painter, rect: Rect, snapshot: &CanvasSnapshot) {
    let by_id = snapshot
        .bubbles
        .iter()
        .map(|bubble| (bubble.id.as_str(), bubble))
        .collect::<HashMap<_, _>>();
    let width = link_width(snapshot.viewport.scale());
    let stroke = Stroke::new(width, LINK_COLOR);

    for link in snapshot.links.iter() {
        let (Some(from), Some(to)) = (by_id.get(link.from_id.as_str()), by_id.get(link.to_id.as_str()))
        else {
            continue;
        };
        let start = screen_pos(rect, snapshot, from);
        let end = screen_pos(rect, snapshot, to);
        if edge_visible(rect, start, end, width) {
            painter.line_segment([start, end], stroke);
        }
    }
}

fn paint_bubbles(painter: &Painter, rect: Rect, snapshot: &CanvasSnapshot) {
    let scale = snapshot.viewport.scale();
    let menu_owner = match &snapshot.mode {
        InteractionMode::BubbleMenuOpen { bubble_id, .. } => Some(bubble_id.as_str()),
        _ => None,
    };
    let link_source = snapshot.mode.linking_source();
    let font = FontId::proportional(label_size(scale));

    for bubble in snapshot.bubbles.iter() {
        let center = screen_pos(rect, snapshot, bubble);
        let radius = bubble.radius * scale;
        if !circle_visible(rect, center, radius + font.size * 2.0) {
            continue;
        }

        let fill = if menu_owner == Some(bubble.id.as_str()) {
            MENU_OWNER_FILL
        } else {
            BUBBLE_FILL
        };
        painter.circle_filled(center, radius, fill);

        if link_source == Some(bubble.id.as_str()) {
            painter.circle_stroke(center, radius + 3.0, Stroke::new(3.0, LINK_SOURCE_RING));
        }

        painter.text(
            center + vec2(0.0, radius + 6.0),
            Align2::CENTER_TOP,
            &bubble.name,
            font.clone(),
            Color32::from_rgb(226, 232, 240),
        );
    }
}

fn paint_status(painter: &Painter, rect: Rect, snapshot: &CanvasSnapshot) {
    let mut status = format!(
        "Bubbles: {}  Links: {}  Scale: {:.2}",
        snapshot.bubbles.len(),
        snapshot.links.len(),
        snapshot.viewport.scale()
    );
    if let Some(source) = snapshot.mode.linking_source() {
        let name = snapshot
            .bubble(source)
            .map_or(source, |bubble| bubble.name.as_str());
        status.push_str(&format!("  |  Tap a bubble to link it with {name}"));
    }

    painter.text(
        rect.left_top() + vec2(12.0, 10.0),
        Align2::LEFT_TOP,
        status,
        FontId::monospace(13.0),
        Color32::from_rgb(176, 186, 198),
    );
}
