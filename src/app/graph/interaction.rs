use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use crate::canvas::{Canvas, PointerEvent};

/// Raw gesture in canvas-local screen coordinates, before hit testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum Gesture {
    Tap(Vec2),
    LongPress(Vec2),
    DragStart(Vec2),
    DragMove { position: Vec2, delta: Vec2 },
    DragEnd,
    Zoom { factor: f32, centroid: Vec2 },
}

impl Gesture {
    /// Resolves what the gesture landed on against the current canvas state.
    pub(in crate::app) fn into_event(self, canvas: &Canvas) -> PointerEvent {
        match self {
            Gesture::Tap(screen_pos) => PointerEvent::Tap {
                screen_pos,
                target: canvas.hit_test(screen_pos),
            },
            Gesture::LongPress(screen_pos) => PointerEvent::LongPress {
                screen_pos,
                target: canvas.hit_test(screen_pos),
            },
            Gesture::DragStart(screen_pos) => PointerEvent::DragStart {
                screen_pos,
                target: canvas.hit_test(screen_pos),
            },
            Gesture::DragMove { position, delta } => PointerEvent::DragMove {
                screen_pos: position,
                delta,
            },
            Gesture::DragEnd => PointerEvent::DragEnd,
            Gesture::Zoom { factor, centroid } => PointerEvent::Zoom { factor, centroid },
        }
    }
}

pub(in crate::app) fn read_gestures(ui: &Ui, rect: Rect, response: &egui::Response) -> Vec<Gesture> {
    let local = |pos: Pos2| pos - rect.min;
    let pointer = response
        .interact_pointer_pos()
        .or_else(|| response.hover_pos())
        .map(local);
    let mut gestures = Vec::new();

    if response.drag_started() {
        let press_origin = ui.input(|input| input.pointer.press_origin());
        let current = response.interact_pointer_pos();
        if let Some(position) = drag_start_position(rect, press_origin, current) {
            gestures.push(Gesture::DragStart(position));
        }
    }

    if response.dragged() {
        let delta = response.drag_delta();
        if delta != Vec2::ZERO
            && let Some(position) = pointer
        {
            gestures.push(Gesture::DragMove { position, delta });
        }
    }

    if response.drag_stopped() {
        gestures.push(Gesture::DragEnd);
    }

    if response.clicked()
        && let Some(position) = pointer
    {
        gestures.push(Gesture::Tap(position));
    }

    if (response.secondary_clicked() || response.long_touched())
        && let Some(position) = pointer
    {
        gestures.push(Gesture::LongPress(position));
    }

    if let Some(zoom) = read_zoom(ui, rect, response) {
        gestures.push(zoom);
    }

    gestures
}

/// A drag is hit-tested where the press began, not where the pointer was
/// once the drag threshold was crossed.
fn drag_start_position(
    rect: Rect,
    press_origin: Option<Pos2>,
    current: Option<Pos2>,
) -> Option<Vec2> {
    press_origin.or(current).map(|pos| pos - rect.min)
}

fn read_zoom(ui: &Ui, rect: Rect, response: &egui::Response) -> Option<Gesture> {
    if !response.hovered() {
        return None;
    }

    let (scroll, pinch, hover) = ui.input(|input| {
        (
            input.raw_scroll_delta.y,
            input.zoom_delta(),
            input.pointer.hover_pos(),
        )
    });

    let factor = pinch * wheel_factor(scroll);
    if (factor - 1.0).abs() <= f32::EPSILON {
        return None;
    }

    let centroid = hover.unwrap_or_else(|| rect.center()) - rect.min;
    Some(Gesture::Zoom { factor, centroid })
}

fn wheel_factor(scroll: f32) -> f32 {
    if scroll.abs() <= f32::EPSILON {
        return 1.0;
    }
    (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
}
