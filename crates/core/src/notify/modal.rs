use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::notify::{ButtonStyle, ConfirmOptions, Notifier};

/// Things the user can do to an open dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalEvent {
    Ok,
    Cancel,
    CloseButton,
    BackdropClick,
    Escape,
}

impl ModalEvent {
    fn result(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Render state of the dialog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalView {
    pub open: bool,
    pub title: String,
    pub body: String,
    pub ok_text: String,
    pub cancel_text: String,
    pub cancel_visible: bool,
    pub ok_style: ButtonStyle,
    pub focused: Option<String>,
}

impl Default for ModalView {
    fn default() -> Self {
        let options = ConfirmOptions::default();
        Self {
            open: false,
            title: options.title,
            body: String::new(),
            ok_text: options.ok_text,
            cancel_text: options.cancel_text,
            cancel_visible: true,
            ok_style: ButtonStyle::Danger,
            focused: None,
        }
    }
}

pub const OK_BUTTON_ID: &str = "modal-ok";

/// Single shared dialog. At most one request is pending; opening another
/// one resolves the previous request as cancelled.
#[derive(Debug, Default)]
pub struct ModalDialog {
    view: ModalView,
    pending: Option<oneshot::Sender<bool>>,
    restore_focus: Option<String>,
}

impl ModalDialog {
    pub fn view(&self) -> &ModalView {
        &self.view
    }

    pub fn is_open(&self) -> bool {
        self.view.open
    }

    /// Opens the dialog. `focused` is the element that had focus before and
    /// gets it back on close.
    pub fn open(
        &mut self,
        message: &str,
        options: &ConfirmOptions,
        focused: Option<String>,
    ) -> oneshot::Receiver<bool> {
        if let Some(previous) = self.pending.take() {
            let _ = previous.send(false);
        } else {
            self.restore_focus = focused;
        }

        self.view = ModalView {
            open: true,
            title: options.title.clone(),
            body: message.to_owned(),
            ok_text: options.ok_text.clone(),
            cancel_text: options.cancel_text.clone(),
            cancel_visible: !options.hide_cancel,
            ok_style: options.ok_style(),
            focused: Some(OK_BUTTON_ID.to_owned()),
        };

        let (sender, receiver) = oneshot::channel();
        self.pending = Some(sender);
        receiver
    }

    /// Applies a user event. Returns the resolved answer, or `None` when the
    /// dialog was not open and the event was ignored.
    pub fn handle(&mut self, event: ModalEvent) -> Option<bool> {
        if !self.view.open {
            return None;
        }

        let result = event.result();
        self.view.open = false;
        self.view.focused = self.restore_focus.take();
        if let Some(pending) = self.pending.take() {
            let _ = pending.send(result);
        }
        Some(result)
    }
}

/// Cloneable handle the UI layer uses to observe and drive the dialog.
#[derive(Clone, Debug, Default)]
pub struct ModalHandle {
    dialog: Arc<Mutex<ModalDialog>>,
}

impl ModalHandle {
    fn lock(&self) -> MutexGuard<'_, ModalDialog> {
        match self.dialog.lock() {
            Ok(dialog) => dialog,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn view(&self) -> ModalView {
        self.lock().view().clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    pub fn dispatch(&self, event: ModalEvent) -> Option<bool> {
        self.lock().handle(event)
    }

    fn open(
        &self,
        message: &str,
        options: &ConfirmOptions,
        focused: Option<String>,
    ) -> oneshot::Receiver<bool> {
        self.lock().open(message, options, focused)
    }
}

/// [`Notifier`] backed by the in-page modal dialog.
#[derive(Clone, Debug, Default)]
pub struct ModalNotifier {
    handle: ModalHandle,
    focused: Option<String>,
}

impl ModalNotifier {
    pub fn new(handle: ModalHandle) -> Self {
        Self { handle, focused: None }
    }

    /// Element id to hand focus back to when the dialog closes.
    pub fn restoring_focus_to(mut self, element_id: impl Into<String>) -> Self {
        self.focused = Some(element_id.into());
        self
    }

    pub fn handle(&self) -> ModalHandle {
        self.handle.clone()
    }
}

#[async_trait]
impl Notifier for ModalNotifier {
    async fn alert_with(&self, message: &str, options: ConfirmOptions) {
        let options = ConfirmOptions { hide_cancel: true, ..options };
        let receiver = self.handle.open(message, &options, self.focused.clone());
        let _ = receiver.await;
    }

    async fn confirm(&self, message: &str, options: ConfirmOptions) -> bool {
        let receiver = self.handle.open(message, &options, self.focused.clone());
        receiver.await.unwrap_or(false)
    }
}

/// Pulls the message out of legacy inline handler text such as
/// `return confirm('Delete this order?')`.
pub fn extract_confirm_message(attr: &str) -> Option<&str> {
    let start = attr.find("confirm(")? + "confirm(".len();
    let rest = &attr[start..];
    let quote = rest.chars().next().filter(|ch| *ch == '\'' || *ch == '"')?;
    let body = &rest[1..];
    let end = body.find(&format!("{quote})"))?;
    Some(&body[..end])
}
