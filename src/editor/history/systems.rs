//! Bevy systems for history capture, shortcuts and undo/redo requests.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::common::{AlertKind, Alerts};
use crate::config::AppConfig;
use crate::map::FeatureStore;

use super::engine::{HistoryEngine, HistoryOutcome};

/// Undo/redo request from the keyboard or the toolbar
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRequest {
    Undo,
    Redo,
}

/// Startup system creating the engine once config is loaded
pub fn init_history_engine(
    mut commands: Commands,
    mut store: ResMut<FeatureStore>,
    config: Res<AppConfig>,
) {
    let capacity = config.data.history_capacity;
    commands.insert_resource(HistoryEngine::new(&mut store, capacity));
    info!("History capacity: {}", capacity);
}

/// Turn this frame's store notifications into history entries
pub fn capture_feature_changes(mut history: ResMut<HistoryEngine>) {
    history.capture();
}

/// Ctrl+Z = undo, Ctrl+Shift+Z = redo (Cmd on macOS)
pub fn handle_history_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut requests: MessageWriter<HistoryRequest>,
) {
    if !keyboard.just_pressed(KeyCode::KeyZ) {
        return;
    }

    // Leave Ctrl+Z to egui while a text field has focus
    if contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
    {
        return;
    }

    let modifier = keyboard.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ]);
    let shift = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    if modifier {
        requests.write(if shift {
            HistoryRequest::Redo
        } else {
            HistoryRequest::Undo
        });
    }
}

/// Replay requested entries onto the store
pub fn apply_history_requests(
    mut requests: MessageReader<HistoryRequest>,
    mut history: ResMut<HistoryEngine>,
    mut store: ResMut<FeatureStore>,
    mut alerts: ResMut<Alerts>,
) {
    for request in requests.read() {
        let result = match request {
            HistoryRequest::Undo => history.undo(&mut store),
            HistoryRequest::Redo => history.redo(&mut store),
        };
        match result {
            Ok(HistoryOutcome::Applied(_)) => {}
            Ok(HistoryOutcome::NothingToDo) => debug!("History: nothing to {:?}", request),
            Err(e) => alerts.push(AlertKind::History, e.to_string()),
        }
    }
}
