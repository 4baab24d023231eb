//! User notification seam: alerts and confirmations.
//!
//! Session code depends on [`Notifier`] instead of a global dialog primitive;
//! a terminal prompt, the in-page modal, and the test recorder are
//! interchangeable.

pub mod modal;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;

pub use modal::{extract_confirm_message, ModalDialog, ModalEvent, ModalHandle, ModalNotifier};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmOptions {
    pub title: String,
    pub ok_text: String,
    pub cancel_text: String,
    pub danger: bool,
    pub hide_cancel: bool,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            title: "Confirm".to_owned(),
            ok_text: "OK".to_owned(),
            cancel_text: "Cancel".to_owned(),
            danger: true,
            hide_cancel: false,
        }
    }
}

impl ConfirmOptions {
    /// Acknowledge-only dialog used for alerts.
    pub fn alert() -> Self {
        Self { title: "Notice".to_owned(), danger: false, hide_cancel: true, ..Self::default() }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn ok_text(mut self, ok_text: impl Into<String>) -> Self {
        self.ok_text = ok_text.into();
        self
    }

    pub fn cancel_text(mut self, cancel_text: impl Into<String>) -> Self {
        self.cancel_text = cancel_text.into();
        self
    }

    pub fn danger(mut self, danger: bool) -> Self {
        self.danger = danger;
        self
    }

    pub fn ok_style(&self) -> ButtonStyle {
        if self.danger {
            ButtonStyle::Danger
        } else {
            ButtonStyle::Primary
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Shows `message` with the given title and OK text and resolves once it
    /// has been acknowledged. There is never a cancel choice.
    async fn alert_with(&self, message: &str, options: ConfirmOptions);

    async fn alert(&self, message: &str) {
        self.alert_with(message, ConfirmOptions::alert()).await;
    }

    async fn confirm(&self, message: &str, options: ConfirmOptions) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Alert { message: String, options: ConfirmOptions },
    Confirm { message: String, options: ConfirmOptions },
}

/// Records every notification and answers confirmations with a fixed value.
#[derive(Clone)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
    confirm_answer: bool,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self { notifications: Arc::default(), confirm_answer: true }
    }
}

impl RecordingNotifier {
    pub fn answering(confirm_answer: bool) -> Self {
        Self { confirm_answer, ..Self::default() }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(notifications) => notifications.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::Alert { message, .. } => Some(message),
                Notification::Confirm { .. } => None,
            })
            .collect()
    }

    fn record(&self, notification: Notification) {
        match self.notifications.lock() {
            Ok(mut notifications) => notifications.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn alert_with(&self, message: &str, options: ConfirmOptions) {
        self.record(Notification::Alert { message: message.to_owned(), options });
    }

    async fn confirm(&self, message: &str, options: ConfirmOptions) -> bool {
        self.record(Notification::Confirm { message: message.to_owned(), options });
        self.confirm_answer
    }
}
