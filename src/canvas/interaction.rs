use tracing::{debug, info, warn};

use crate::geometry::Vec2;

use super::{
    BackgroundMenuAction, BubbleMenuAction, Canvas, DragState, InteractionMode, PointerEvent,
    PointerTarget, SimulationHint,
};

const NEW_BUBBLE_RADIUS: f32 = 45.0;

impl Canvas {
    /// Feeds one classified pointer event through the state machine.
    ///
    /// Canvas gestures are ignored while the rename dialog is up.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<SimulationHint> {
        if matches!(self.mode, InteractionMode::RenameDialog { .. }) {
            return None;
        }

        match event {
            PointerEvent::Tap { target, .. } => {
                self.tap(target);
                None
            }
            PointerEvent::LongPress { screen_pos, target } => {
                self.long_press(screen_pos, target);
                None
            }
            PointerEvent::DragStart { target, .. } => self.drag_start(target),
            PointerEvent::DragMove { delta, .. } => {
                self.drag_move(delta);
                None
            }
            PointerEvent::DragEnd => self.drag_end(),
            PointerEvent::Zoom { factor, centroid } => {
                let before = self.viewport;
                self.viewport.zoom(factor, centroid);
                if self.viewport != before {
                    self.bump();
                }
                None
            }
        }
    }

    fn tap(&mut self, target: PointerTarget) {
        match target {
            PointerTarget::Background => {
                if self.mode.is_menu_open() {
                    debug!("menu closed by background tap");
                    self.set_mode(InteractionMode::Idle);
                } else if self.mode.linking_source().is_some() {
                    debug!("linking cancelled");
                    self.set_mode(InteractionMode::Idle);
                }
            }
            PointerTarget::Bubble { id, .. } => {
                if let Some(source_id) = self.mode.linking_source().map(str::to_owned) {
                    self.finish_link(&source_id, &id);
                    return;
                }

                let closes = match &self.mode {
                    InteractionMode::BubbleMenuOpen { bubble_id, .. } => bubble_id != &id,
                    InteractionMode::BackgroundMenuOpen { .. } => true,
                    _ => false,
                };
                if closes {
                    self.set_mode(InteractionMode::Idle);
                }
            }
        }
    }

    fn finish_link(&mut self, source_id: &str, target_id: &str) {
        match self.graph.add_link(source_id, target_id) {
            Ok(()) => {
                info!(from = source_id, to = target_id, "link created");
                self.bump();
                self.persist();
            }
            Err(error) => debug!(from = source_id, to = target_id, "link rejected: {error}"),
        }
        self.set_mode(InteractionMode::Idle);
    }

    fn long_press(&mut self, screen_pos: Vec2, target: PointerTarget) {
        match target {
            PointerTarget::Bubble { id, .. } => {
                if !self.graph.contains(&id) {
                    return;
                }
                debug!(bubble = %id, "bubble menu opened");
                self.set_mode(InteractionMode::BubbleMenuOpen {
                    bubble_id: id,
                    screen_pos,
                });
            }
            PointerTarget::Background => {
                let world_pos = self.viewport.screen_to_world(screen_pos);
                debug!(?world_pos, "background menu opened");
                self.set_mode(InteractionMode::BackgroundMenuOpen {
                    world_pos,
                    screen_pos,
                });
            }
        }
    }

    fn drag_start(&mut self, target: PointerTarget) -> Option<SimulationHint> {
        let state = match target {
            PointerTarget::Bubble { id, .. } => {
                let menu_owner = matches!(
                    &self.mode,
                    InteractionMode::BubbleMenuOpen { bubble_id, .. } if bubble_id == &id
                );
                if menu_owner || !self.graph.contains(&id) {
                    DragState::Ignored
                } else {
                    DragState::Bubble(id)
                }
            }
            PointerTarget::Background => DragState::Pan,
        };

        let hint = match &state {
            DragState::Bubble(id) => {
                debug!(bubble = %id, "drag started");
                Some(SimulationHint::Suspend)
            }
            _ => None,
        };
        self.drag = Some(state);
        hint
    }

    fn drag_move(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }

        match &self.drag {
            Some(DragState::Bubble(id)) => {
                let Some(position) = self.graph.bubble(id).map(|bubble| bubble.position) else {
                    return;
                };
                let world_delta = delta / self.viewport.scale();
                let id = id.clone();
                if self.graph.move_bubble(&id, position + world_delta, Vec2::ZERO) {
                    self.bump();
                }
            }
            Some(DragState::Pan) => {
                self.viewport.pan(delta);
                self.bump();
            }
            Some(DragState::Ignored) | None => {}
        }
    }

    fn drag_end(&mut self) -> Option<SimulationHint> {
        match self.drag.take() {
            Some(DragState::Bubble(id)) => {
                debug!(bubble = %id, "drag ended");
                self.persist();
                Some(SimulationHint::Resume)
            }
            _ => None,
        }
    }

    pub fn select_bubble_menu(&mut self, action: BubbleMenuAction) {
        let InteractionMode::BubbleMenuOpen { bubble_id, .. } = &self.mode else {
            warn!(?action, "bubble menu action without an open bubble menu");
            return;
        };
        let bubble_id = bubble_id.clone();

        match action {
            BubbleMenuAction::Link => {
                debug!(bubble = %bubble_id, "linking armed");
                self.set_mode(InteractionMode::LinkingFrom {
                    source_id: bubble_id,
                });
            }
            BubbleMenuAction::Rename => {
                let next = match self.graph.bubble(&bubble_id) {
                    Some(bubble) => InteractionMode::RenameDialog {
                        current_name: bubble.name.clone(),
                        bubble_id,
                    },
                    None => InteractionMode::Idle,
                };
                self.set_mode(next);
            }
            BubbleMenuAction::UnlinkAll => {
                let removed = self.graph.remove_links_touching(&bubble_id);
                info!(bubble = %bubble_id, removed, "unlinked all");
                self.set_mode(InteractionMode::Idle);
                if removed > 0 {
                    self.bump();
                    self.persist();
                }
            }
            BubbleMenuAction::ViewContent => {
                self.selected_content = Some(bubble_id);
                self.bump();
                self.set_mode(InteractionMode::Idle);
            }
        }
    }

    pub fn select_background_menu(&mut self, action: BackgroundMenuAction) {
        let InteractionMode::BackgroundMenuOpen { world_pos, .. } = self.mode else {
            warn!(?action, "background menu action without an open background menu");
            return;
        };

        match action {
            BackgroundMenuAction::AddBubble => {
                let name = format!("Bubble {}", self.graph.bubbles().len() + 1);
                self.set_mode(InteractionMode::Idle);

                let doc_for = |id: &str| Some(format!("doc_for_{id}"));
                let added = self
                    .graph
                    .add_bubble(world_pos, name.clone(), NEW_BUBBLE_RADIUS, doc_for);
                match added {
                    Some(id) => {
                        info!(bubble = %id, %name, ?world_pos, "bubble added");
                        self.bump();
                        self.tick();
                        self.persist();
                    }
                    None => warn!(%name, ?world_pos, "bubble rejected"),
                }
            }
        }
    }

    pub fn confirm_rename(&mut self, new_name: &str) {
        let InteractionMode::RenameDialog { bubble_id, .. } = &self.mode else {
            return;
        };
        let bubble_id = bubble_id.clone();

        if self.graph.rename_bubble(&bubble_id, new_name) {
            info!(bubble = %bubble_id, name = new_name, "bubble renamed");
            self.bump();
            self.persist();
        } else {
            warn!(bubble = %bubble_id, name = new_name, "rename rejected");
        }
        self.set_mode(InteractionMode::Idle);
    }

    pub fn dismiss_rename(&mut self) {
        if matches!(self.mode, InteractionMode::RenameDialog { .. }) {
            self.set_mode(InteractionMode::Idle);
        }
    }

    pub fn clear_content_selection(&mut self) {
        if self.selected_content.take().is_some() {
            self.bump();
        }
    }

    /// Backs out of whatever is active, innermost first.
    pub fn dismiss(&mut self) {
        match self.mode {
            InteractionMode::Idle => self.clear_content_selection(),
            _ => self.set_mode(InteractionMode::Idle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vec2;
    use crate::graph::{Link, MemoryStore};
    use crate::physics::SimulationParams;

    fn canvas_with_store() -> (Canvas, MemoryStore) {
        let store = MemoryStore::default();
        let canvas =
            Canvas::new(store.clone(), SimulationParams::default().without_float()).with_seed(3);
        (canvas, store)
    }

    fn on_bubble(id: &str) -> PointerTarget {
        PointerTarget::Bubble {
            id: id.to_owned(),
            local_offset: Vec2::ZERO,
        }
    }

    fn tap(canvas: &mut Canvas, target: PointerTarget) {
        canvas.handle_pointer(PointerEvent::Tap {
            screen_pos: Vec2::ZERO,
            target,
        });
    }

    fn long_press(canvas: &mut Canvas, screen_pos: Vec2, target: PointerTarget) {
        canvas.handle_pointer(PointerEvent::LongPress { screen_pos, target });
    }

    fn arm_link(canvas: &mut Canvas, source: &str) {
        long_press(canvas, Vec2::ZERO, on_bubble(source));
        canvas.select_bubble_menu(BubbleMenuAction::Link);
        assert_eq!(canvas.mode().linking_source(), Some(source));
    }

    #[test]
    fn linking_creates_exactly_one_link() {
        let (mut canvas, store) = canvas_with_store();
        arm_link(&mut canvas, "bubble1");
        tap(&mut canvas, on_bubble("bubble2"));

        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        assert_eq!(
            canvas.graph().links().as_slice(),
            &[Link::new("bubble1", "bubble2")]
        );
        assert_eq!(store.stored().unwrap().links().len(), 1);

        arm_link(&mut canvas, "bubble1");
        tap(&mut canvas, on_bubble("bubble2"));
        arm_link(&mut canvas, "bubble2");
        tap(&mut canvas, on_bubble("bubble1"));
        assert_eq!(canvas.graph().links().len(), 1);
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
    }

    #[test]
    fn tapping_the_source_or_background_cancels_linking() {
        let (mut canvas, _store) = canvas_with_store();
        arm_link(&mut canvas, "bubble1");
        tap(&mut canvas, on_bubble("bubble1"));
        assert_eq!(canvas.mode(), &InteractionMode::Idle);

        arm_link(&mut canvas, "bubble1");
        tap(&mut canvas, PointerTarget::Background);
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        assert!(canvas.graph().links().is_empty());
    }

    #[test]
    fn long_press_opens_exactly_one_menu() {
        let (mut canvas, _store) = canvas_with_store();
        long_press(&mut canvas, vec2(10.0, 20.0), on_bubble("bubble1"));
        assert_eq!(
            canvas.mode(),
            &InteractionMode::BubbleMenuOpen {
                bubble_id: "bubble1".into(),
                screen_pos: vec2(10.0, 20.0),
            }
        );

        canvas.handle_pointer(PointerEvent::Zoom {
            factor: 2.0,
            centroid: Vec2::ZERO,
        });
        long_press(&mut canvas, vec2(50.0, 80.0), PointerTarget::Background);
        assert_eq!(
            canvas.mode(),
            &InteractionMode::BackgroundMenuOpen {
                world_pos: vec2(25.0, 40.0),
                screen_pos: vec2(50.0, 80.0),
            }
        );

        long_press(&mut canvas, Vec2::ZERO, on_bubble("missing"));
        assert!(matches!(
            canvas.mode(),
            InteractionMode::BackgroundMenuOpen { .. }
        ));
    }

    #[test]
    fn background_tap_closes_any_menu() {
        let (mut canvas, _store) = canvas_with_store();
        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble2"));
        tap(&mut canvas, PointerTarget::Background);
        assert_eq!(canvas.mode(), &InteractionMode::Idle);

        long_press(&mut canvas, Vec2::ZERO, PointerTarget::Background);
        tap(&mut canvas, PointerTarget::Background);
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
    }

    #[test]
    fn bubble_tap_only_closes_another_bubbles_menu() {
        let (mut canvas, _store) = canvas_with_store();
        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble1"));
        tap(&mut canvas, on_bubble("bubble1"));
        assert!(canvas.mode().is_menu_open());

        tap(&mut canvas, on_bubble("bubble3"));
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
    }

    #[test]
    fn rename_applies_non_blank_names_only() {
        let (mut canvas, store) = canvas_with_store();
        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble2"));
        canvas.select_bubble_menu(BubbleMenuAction::Rename);
        assert_eq!(
            canvas.mode(),
            &InteractionMode::RenameDialog {
                bubble_id: "bubble2".into(),
                current_name: "Beta".into(),
            }
        );

        canvas.confirm_rename("   ");
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        assert_eq!(canvas.graph().bubble("bubble2").unwrap().name, "Beta");
        assert_eq!(store.save_count(), 1);

        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble2"));
        canvas.select_bubble_menu(BubbleMenuAction::Rename);
        canvas.confirm_rename("Renamed");
        assert_eq!(canvas.graph().bubble("bubble2").unwrap().name, "Renamed");
        assert_eq!(
            store.stored().unwrap().bubble("bubble2").unwrap().name,
            "Renamed"
        );
    }

    #[test]
    fn rename_dismiss_changes_nothing_and_blocks_gestures_while_open() {
        let (mut canvas, _store) = canvas_with_store();
        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble1"));
        canvas.select_bubble_menu(BubbleMenuAction::Rename);

        long_press(&mut canvas, Vec2::ZERO, PointerTarget::Background);
        assert!(matches!(canvas.mode(), InteractionMode::RenameDialog { .. }));

        canvas.dismiss_rename();
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        assert_eq!(canvas.graph().bubble("bubble1").unwrap().name, "Alpha");
    }

    #[test]
    fn unlink_all_removes_incident_links_and_saves() {
        let (mut canvas, store) = canvas_with_store();
        arm_link(&mut canvas, "bubble1");
        tap(&mut canvas, on_bubble("bubble2"));
        arm_link(&mut canvas, "bubble3");
        tap(&mut canvas, on_bubble("bubble2"));
        arm_link(&mut canvas, "bubble1");
        tap(&mut canvas, on_bubble("bubble3"));
        assert_eq!(canvas.graph().links().len(), 3);

        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble1"));
        canvas.select_bubble_menu(BubbleMenuAction::UnlinkAll);
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        assert_eq!(
            canvas.graph().links().as_slice(),
            &[Link::new("bubble3", "bubble2")]
        );
        assert_eq!(store.stored().unwrap().links().len(), 1);
    }

    #[test]
    fn view_content_sets_selection_alongside_idle() {
        let (mut canvas, _store) = canvas_with_store();
        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble3"));
        canvas.select_bubble_menu(BubbleMenuAction::ViewContent);
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        assert_eq!(canvas.selected_content(), Some("bubble3"));

        canvas.dismiss();
        assert_eq!(canvas.selected_content(), None);
    }

    #[test]
    fn add_bubble_places_it_at_the_menu_position_and_resolves_overlap() {
        let (mut canvas, store) = canvas_with_store();
        let target = canvas.viewport().world_to_screen(vec2(205.0, 200.0));
        long_press(&mut canvas, target, PointerTarget::Background);
        canvas.select_background_menu(BackgroundMenuAction::AddBubble);

        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        let bubbles = canvas.graph().bubbles();
        assert_eq!(bubbles.len(), 4);
        let added = &bubbles[3];
        assert_eq!(added.name, "Bubble 4");
        assert_eq!(added.radius, 45.0);
        assert_eq!(
            added.document_id.as_deref(),
            Some(format!("doc_for_{}", added.id).as_str())
        );
        assert_ne!(added.position, vec2(205.0, 200.0));
        assert_eq!(store.stored().unwrap().bubbles().len(), 4);
    }

    #[test]
    fn menu_actions_without_matching_menu_are_ignored() {
        let (mut canvas, store) = canvas_with_store();
        canvas.select_bubble_menu(BubbleMenuAction::Link);
        canvas.select_background_menu(BackgroundMenuAction::AddBubble);
        canvas.confirm_rename("Nope");
        assert_eq!(canvas.mode(), &InteractionMode::Idle);
        assert_eq!(canvas.graph().bubbles().len(), 3);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn dragging_a_bubble_suspends_moves_and_resumes() {
        let (mut canvas, store) = canvas_with_store();
        canvas.handle_pointer(PointerEvent::Zoom {
            factor: 2.0,
            centroid: Vec2::ZERO,
        });

        let hint = canvas.handle_pointer(PointerEvent::DragStart {
            screen_pos: Vec2::ZERO,
            target: on_bubble("bubble1"),
        });
        assert_eq!(hint, Some(SimulationHint::Suspend));
        assert!(canvas.simulation_held());
        assert!(!canvas.scheduled_tick());

        canvas.handle_pointer(PointerEvent::DragMove {
            screen_pos: Vec2::ZERO,
            delta: vec2(20.0, -10.0),
        });
        let bubble = canvas.graph().bubble("bubble1").unwrap();
        assert_eq!(bubble.position, vec2(210.0, 195.0));
        assert_eq!(bubble.velocity, Vec2::ZERO);

        let hint = canvas.handle_pointer(PointerEvent::DragEnd);
        assert_eq!(hint, Some(SimulationHint::Resume));
        assert!(!canvas.simulation_held());
        assert_eq!(
            store.stored().unwrap().bubble("bubble1").unwrap().position,
            vec2(210.0, 195.0)
        );
    }

    #[test]
    fn dragging_a_bubble_with_its_menu_open_is_ignored() {
        let (mut canvas, _store) = canvas_with_store();
        long_press(&mut canvas, Vec2::ZERO, on_bubble("bubble1"));
        let hint = canvas.handle_pointer(PointerEvent::DragStart {
            screen_pos: Vec2::ZERO,
            target: on_bubble("bubble1"),
        });
        assert_eq!(hint, None);
        canvas.handle_pointer(PointerEvent::DragMove {
            screen_pos: Vec2::ZERO,
            delta: vec2(50.0, 50.0),
        });
        assert_eq!(
            canvas.graph().bubble("bubble1").unwrap().position,
            vec2(200.0, 200.0)
        );
        assert_eq!(canvas.handle_pointer(PointerEvent::DragEnd), None);
    }

    #[test]
    fn dragging_the_background_pans() {
        let (mut canvas, _store) = canvas_with_store();
        canvas.handle_pointer(PointerEvent::DragStart {
            screen_pos: Vec2::ZERO,
            target: PointerTarget::Background,
        });
        canvas.handle_pointer(PointerEvent::DragMove {
            screen_pos: Vec2::ZERO,
            delta: vec2(15.0, 30.0),
        });
        assert_eq!(canvas.handle_pointer(PointerEvent::DragEnd), None);
        assert_eq!(canvas.viewport().pan_offset(), vec2(15.0, 30.0));
    }
}
