//! Common types shared across multiple modules.

use bevy::prelude::*;

/// Which part of the app raised an alert; used as the dialog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Import,
    Export,
    ImageCapture,
    LegendImage,
    History,
    Config,
}

impl AlertKind {
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::Import => "Import Failed",
            AlertKind::Export => "Export Failed",
            AlertKind::ImageCapture => "Image Export Failed",
            AlertKind::LegendImage => "Legend Image Failed",
            AlertKind::History => "Undo/Redo Failed",
            AlertKind::Config => "Configuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// Queue of user-visible failure notifications, shown one at a time.
#[derive(Resource, Default, Debug)]
pub struct Alerts {
    queue: Vec<Alert>,
}

impl Alerts {
    pub fn push(&mut self, kind: AlertKind, message: impl Into<String>) {
        self.queue.push(Alert {
            kind,
            message: message.into(),
        });
    }

    pub fn current(&self) -> Option<&Alert> {
        self.queue.first()
    }

    pub fn dismiss(&mut self) {
        if !self.queue.is_empty() {
            self.queue.remove(0);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Whether the editor controls (toolbar, panels, status bar) are drawn.
/// Image export hides them while the frame is captured.
#[derive(Resource, Default, Debug)]
pub struct ControlsVisibility {
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_shown_in_order() {
        let mut alerts = Alerts::default();
        alerts.push(AlertKind::Import, "bad file");
        alerts.push(AlertKind::Export, "disk full");

        assert_eq!(alerts.current().map(|a| a.kind), Some(AlertKind::Import));
        alerts.dismiss();
        assert_eq!(alerts.current().map(|a| a.message.as_str()), Some("disk full"));
        alerts.dismiss();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_dismiss_empty_is_noop() {
        let mut alerts = Alerts::default();
        alerts.dismiss();
        assert_eq!(alerts.len(), 0);
    }
}
