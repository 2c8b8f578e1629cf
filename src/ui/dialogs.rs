//! Modal dialogs: alerts, the label prompt, removal confirmation and the
//! startup notices.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::common::Alerts;
use crate::config::{AppConfig, ConfigResetNotification, MissingSnapshotWarning, SaveConfigRequest};
use crate::editor::{DrawingStyle, LabelPrompt, PendingRemoval, ToolStateMachine};
use crate::map::{AsyncSnapshotOperation, FeatureStore};
use crate::theme;

/// Shorten long paths from the left so the file name stays visible
pub fn truncate_path(path: &str, max_chars: usize) -> String {
    let count = path.chars().count();
    if count <= max_chars {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - (max_chars - 3)).collect();
    format!("...{}", tail)
}

/// Shows the oldest queued alert until it is dismissed
pub fn alerts_ui(mut contexts: EguiContexts, mut alerts: ResMut<Alerts>) -> Result {
    let Some(alert) = alerts.current().cloned() else {
        return Ok(());
    };

    let mut dismissed = false;
    egui::Window::new(alert.kind.title())
        .id(egui::Id::new("alert_dialog"))
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                ui.colored_label(theme::ui::ERROR_TEXT, &alert.message);
            });
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        alerts.dismiss();
    }
    Ok(())
}

/// Text entry for the Label tool
pub fn label_prompt_ui(
    mut contexts: EguiContexts,
    mut prompt: ResMut<LabelPrompt>,
    mut tools: ResMut<ToolStateMachine>,
    mut store: ResMut<FeatureStore>,
    drawing: Res<DrawingStyle>,
    mut alerts: ResMut<Alerts>,
) -> Result {
    let Some(at) = prompt.at else {
        return Ok(());
    };

    let mut confirmed = false;
    let mut cancelled = false;

    egui::Window::new("Add Label")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Label text:");
            let response = ui.text_edit_singleline(&mut prompt.text);
            if prompt.text.is_empty() && !response.has_focus() {
                response.request_focus();
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                confirmed = true;
            }
            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                cancelled = true;
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!prompt.text.trim().is_empty(), egui::Button::new("Add"))
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
        match tools.place_label(at, &prompt.text, drawing.style.clone(), &mut store) {
            Ok(Some(id)) => debug!("Placed label {}", id),
            Ok(None) => {}
            Err(e) => {
                error!("Failed to place label: {}", e);
                alerts.push(
                    crate::common::AlertKind::History,
                    format!("Could not place the label: {}", e),
                );
            }
        }
        prompt.close();
    } else if cancelled {
        prompt.close();
    }
    Ok(())
}

/// Confirmation before removing a right-clicked feature
pub fn removal_confirm_ui(
    mut contexts: EguiContexts,
    mut pending: ResMut<PendingRemoval>,
    mut store: ResMut<FeatureStore>,
) -> Result {
    let Some(id) = pending.target else {
        return Ok(());
    };
    let Some(feature) = store.get(id) else {
        pending.target = None;
        return Ok(());
    };

    let description = match feature.label.as_deref() {
        Some(label) => format!("Delete {} \"{}\"?", feature.geometry.type_name(), label),
        None => format!("Delete this {}?", feature.geometry.type_name()),
    };

    let mut remove = false;
    let mut cancel = false;
    egui::Window::new("Delete Feature")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label(description);
            ui.label(
                egui::RichText::new("You can undo this with Ctrl+Z.")
                    .color(theme::ui::HINT_TEXT)
                    .small(),
            );
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Delete").clicked() {
                    remove = true;
                }
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        });

    if remove {
        match store.remove(id) {
            Ok(feature) => info!("Removed {} {}", feature.geometry.type_name(), id),
            Err(e) => warn!("Remove failed: {}", e),
        }
        pending.target = None;
    } else if cancel {
        pending.target = None;
    }
    Ok(())
}

/// Renders the config reset notification (shown when config.json was unusable)
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Configuration Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Some settings could not be used and were reset to defaults:");
            if let Some(reason) = &notification.reason {
                ui.add_space(5.0);
                ui.colored_label(theme::ui::WARNING_TEXT, reason);
            }
            ui.add_space(10.0);
            if ui.button("OK").clicked() {
                notification.show = false;
            }
        });

    Ok(())
}

/// Renders the missing snapshot warning (shown at startup if the last map file is gone)
pub fn missing_snapshot_warning_ui(
    mut contexts: EguiContexts,
    mut warning: ResMut<MissingSnapshotWarning>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) -> Result {
    if !warning.show {
        return Ok(());
    }

    egui::Window::new("Map File Not Found")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("The last imported or exported map file no longer exists:");

            if let Some(ref path) = warning.path {
                ui.add_space(5.0);
                let path_str = path.to_string_lossy();
                ui.label(egui::RichText::new(truncate_path(&path_str, 50)).weak())
                    .on_hover_text(path_str.as_ref());
                ui.add_space(10.0);
            }

            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    warning.show = false;
                }

                if ui.button("Clear from history").clicked() {
                    config.data.last_snapshot_path = None;
                    config.dirty = true;
                    save_events.write(SaveConfigRequest);
                    warning.show = false;
                }
            });
        });

    Ok(())
}

/// Busy indicator while a snapshot is read or written
pub fn async_operation_modal_ui(
    mut contexts: EguiContexts,
    async_op: Res<AsyncSnapshotOperation>,
) -> Result {
    if !async_op.is_busy() {
        return Ok(());
    }

    egui::Window::new("Working")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(
                    async_op
                        .operation_description
                        .as_deref()
                        .unwrap_or("Working..."),
                );
            });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_path_unchanged() {
        assert_eq!(truncate_path("/tmp/map.json", 50), "/tmp/map.json");
    }

    #[test]
    fn test_long_path_keeps_tail() {
        let long = format!("/home/user/{}/map.json", "nested/".repeat(10));
        let shown = truncate_path(&long, 20);
        assert_eq!(shown.chars().count(), 20);
        assert!(shown.starts_with("..."));
        assert!(shown.ends_with("map.json"));
    }
}
