use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::form::{FormError, FormResult, Lifecycle, SessionState, lock_mutex};
use crate::modal::{DialogId, DialogKind, DismissHook, ModalDialog};
use crate::response::{self, InputFuture, InputResponse};

type ResponseFn<T> = Box<dyn FnOnce(InputResponse<T>) + Send>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DialogButton<T> {
    pub title: String,
    pub response: InputResponse<T>,
}

struct ButtonsInner<T> {
    id: DialogId,
    header: Option<String>,
    buttons: Vec<DialogButton<T>>,
    lifecycle: Lifecycle,
    handler: Mutex<Option<ResponseFn<T>>>,
}

/// A message plus a row of buttons, each bound to a fixed response.
pub struct ButtonsDialog<T> {
    inner: Arc<ButtonsInner<T>>,
}

impl<T> Clone for ButtonsDialog<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Debug> Debug for ButtonsDialog<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonsDialog")
            .field("id", &self.inner.id)
            .field("header", &self.inner.header)
            .field("buttons", &self.inner.buttons)
            .finish()
    }
}

impl<T> ButtonsDialog<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn builder() -> ButtonsDialogBuilder<T> {
        ButtonsDialogBuilder {
            header: None,
            buttons: Vec::new(),
            handler: None,
        }
    }

    pub fn id(&self) -> DialogId {
        self.inner.id
    }

    pub fn header(&self) -> Option<&str> {
        self.inner.header.as_deref()
    }

    pub fn buttons(&self) -> &[DialogButton<T>] {
        &self.inner.buttons
    }

    pub fn titles(&self) -> Vec<&str> {
        self.inner
            .buttons
            .iter()
            .map(|button| button.title.as_str())
            .collect()
    }

    pub fn state(&self) -> FormResult<SessionState> {
        self.inner.lifecycle.state()
    }

    pub fn present(&self) -> FormResult<()> {
        self.inner.lifecycle.present()?;
        debug!(dialog = %self.inner.id, "buttons dialog presented");
        Ok(())
    }

    /// Presses the button at `index`. `Ok(false)` when the dialog is not
    /// showing.
    pub fn press(&self, index: usize) -> FormResult<bool> {
        let Some(button) = self.inner.buttons.get(index) else {
            return Err(FormError::UnknownButton(index));
        };
        if self.state()? != SessionState::Presented {
            return Ok(false);
        }
        let terminal = match button.response {
            InputResponse::Confirmed(_) => SessionState::Confirmed,
            InputResponse::Cancelled => SessionState::Cancelled,
        };
        debug!(dialog = %self.inner.id, button = %button.title, "dialog button pressed");
        self.finish(terminal, button.response.clone())
    }

    /// Window close button: delivers `Cancelled`.
    pub fn close(&self) -> FormResult<bool> {
        self.finish(SessionState::Cancelled, InputResponse::Cancelled)
    }

    pub fn is_finished(&self) -> bool {
        self.state().map(SessionState::is_terminal).unwrap_or(true)
    }

    fn finish(&self, terminal: SessionState, response: InputResponse<T>) -> FormResult<bool> {
        if !self.inner.lifecycle.finish(terminal)? {
            return Ok(false);
        }
        self.inner.lifecycle.dismiss(self.inner.id)?;
        let handler = lock_mutex(&self.inner.handler, "taking button handler")?.take();
        if let Some(handler) = handler {
            handler(response);
        }
        Ok(true)
    }
}

impl<T> ModalDialog for ButtonsDialog<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> DialogId {
        self.inner.id
    }

    fn kind(&self) -> DialogKind {
        DialogKind::Buttons
    }

    fn header(&self) -> Option<String> {
        self.inner.header.clone()
    }

    fn present(&self) -> FormResult<()> {
        ButtonsDialog::present(self)
    }

    fn close(&self) -> FormResult<bool> {
        ButtonsDialog::close(self)
    }

    fn attach_dismiss(&self, hook: DismissHook) -> FormResult<()> {
        self.inner.lifecycle.attach_dismiss(hook)
    }

    fn is_finished(&self) -> bool {
        ButtonsDialog::is_finished(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ButtonsDialogBuilder<T> {
    header: Option<String>,
    buttons: Vec<DialogButton<T>>,
    handler: Option<ResponseFn<T>>,
}

impl<T> ButtonsDialogBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Buttons are laid out in insertion order.
    pub fn button(mut self, title: impl Into<String>, response: InputResponse<T>) -> Self {
        self.buttons.push(DialogButton {
            title: title.into(),
            response,
        });
        self
    }

    pub fn on_response(mut self, handler: impl FnOnce(InputResponse<T>) + Send + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> ButtonsDialog<T> {
        ButtonsDialog {
            inner: Arc::new(ButtonsInner {
                id: DialogId::next(),
                header: self.header,
                buttons: self.buttons,
                lifecycle: Lifecycle::new(),
                handler: Mutex::new(self.handler),
            }),
        }
    }

    pub fn into_future(self) -> (ButtonsDialog<T>, InputFuture<T>) {
        let (resolver, future) = response::channel();
        let dialog = self.on_response(resolver.into_handler()).build();
        (dialog, future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::AbortedError;
    use futures::executor::block_on;

    fn yes_no() -> (ButtonsDialog<bool>, InputFuture<bool>) {
        ButtonsDialog::builder()
            .header("Continue?")
            .button("No", InputResponse::Confirmed(false))
            .button("Yes", InputResponse::Confirmed(true))
            .into_future()
    }

    #[test]
    fn press_delivers_button_response_once() {
        let (dialog, future) = yes_no();
        dialog.present().expect("present");
        assert_eq!(dialog.titles(), vec!["No", "Yes"]);

        assert!(dialog.press(1).expect("press yes"));
        assert!(!dialog.press(0).expect("press no after finish"));
        assert_eq!(dialog.state().expect("state"), SessionState::Confirmed);
        assert_eq!(block_on(future), Ok(true));
    }

    #[test]
    fn closing_window_cancels() {
        let (dialog, future) = yes_no();
        dialog.present().expect("present");
        assert!(dialog.close().expect("close"));
        assert_eq!(block_on(future), Err(AbortedError));
    }

    #[test]
    fn unknown_button_is_an_error() {
        let (dialog, _future) = yes_no();
        dialog.present().expect("present");
        assert_eq!(dialog.press(7), Err(FormError::UnknownButton(7)));
        assert!(!dialog.is_finished());
    }
}
