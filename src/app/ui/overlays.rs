use eframe::egui::{self, Align2, Context, Id, Key, Order, Pos2, Rect, RichText};

use crate::canvas::{self, BackgroundMenuAction, BubbleMenuAction, CanvasSnapshot, InteractionMode};

use super::super::{BubbleCanvasApp, RenameDraft};

const NO_CONTENT: &str = "No content.";

impl BubbleCanvasApp {
    pub(in crate::app) fn show_menus(&mut self, ctx: &Context, rect: Rect, snapshot: &CanvasSnapshot) {
        match &snapshot.mode {
            InteractionMode::BubbleMenuOpen {
                bubble_id,
                screen_pos,
            } => {
                let title = snapshot
                    .bubble(bubble_id)
                    .map_or(bubble_id.as_str(), |bubble| bubble.name.as_str());
                let chosen = popup_menu(
                    ctx,
                    "bubble_menu",
                    rect.min + *screen_pos,
                    Some(title),
                    &BubbleMenuAction::ALL,
                    |action| action.label(),
                );
                if let Some(action) = chosen {
                    canvas::lock(&self.canvas).select_bubble_menu(action);
                }
            }
            InteractionMode::BackgroundMenuOpen { screen_pos, .. } => {
                let chosen = popup_menu(
                    ctx,
                    "background_menu",
                    rect.min + *screen_pos,
                    None,
                    &[BackgroundMenuAction::AddBubble],
                    |action| action.label(),
                );
                if let Some(action) = chosen {
                    canvas::lock(&self.canvas).select_background_menu(action);
                }
            }
            _ => {}
        }
    }

    pub(in crate::app) fn show_rename_dialog(&mut self, ctx: &Context, snapshot: &CanvasSnapshot) {
        let InteractionMode::RenameDialog {
            bubble_id,
            current_name,
        } = &snapshot.mode
        else {
            self.rename_draft = None;
            return;
        };

        if self
            .rename_draft
            .as_ref()
            .is_none_or(|draft| draft.bubble_id != *bubble_id)
        {
            self.rename_draft = Some(RenameDraft {
                bubble_id: bubble_id.clone(),
                text: current_name.clone(),
            });
        }
        let Some(draft) = self.rename_draft.as_mut() else {
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Rename Bubble")
            .id(Id::new("rename_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let edit = ui.add(egui::TextEdit::singleline(&mut draft.text).hint_text("New name"));
                if edit.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
                    confirmed = true;
                }
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!draft.text.trim().is_empty(), egui::Button::new("Rename"))
                        .clicked()
                    {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if confirmed {
            let text = draft.text.clone();
            self.rename_draft = None;
            canvas::lock(&self.canvas).confirm_rename(&text);
        } else if cancelled {
            self.rename_draft = None;
            canvas::lock(&self.canvas).dismiss_rename();
        }
    }

    pub(in crate::app) fn show_content_overlay(&mut self, ctx: &Context, snapshot: &CanvasSnapshot) {
        let Some(bubble) = snapshot
            .selected_content
            .as_deref()
            .and_then(|id| snapshot.bubble(id))
        else {
            return;
        };

        let mut close = false;
        egui::Window::new(RichText::new(&bubble.name).strong())
            .id(Id::new("content_overlay"))
            .collapsible(false)
            .default_width(360.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(content_text(&bubble.content));
                if let Some(document_id) = &bubble.document_id {
                    ui.add_space(4.0);
                    ui.small(format!("Document: {document_id}"));
                }
                ui.add_space(8.0);
                if ui.button("Back").clicked() {
                    close = true;
                }
            });

        if close {
            canvas::lock(&self.canvas).clear_content_selection();
        }
    }
}

fn popup_menu<A: Copy>(
    ctx: &Context,
    id: &str,
    position: Pos2,
    title: Option<&str>,
    actions: &[A],
    label: impl Fn(A) -> &'static str,
) -> Option<A> {
    let mut chosen = None;
    egui::Area::new(Id::new(id))
        .order(Order::Foreground)
        .fixed_pos(position)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_min_width(150.0);
                if let Some(title) = title {
                    ui.label(RichText::new(title).strong());
                    ui.separator();
                }
                for action in actions {
                    if ui.button(label(*action)).clicked() {
                        chosen = Some(*action);
                    }
                }
            });
        });
    chosen
}

fn content_text(content: &str) -> &str {
    if content.trim().is_empty() {
        NO_CONTENT
    } else {
        content
    }
}
