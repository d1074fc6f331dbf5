use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::input::InputView;
use crate::i18n::{I18nManager, keys};
use crate::modal::{DialogId, DialogKind, DismissHook, ModalDialog};
use crate::response::{self, InputFuture, InputResponse};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SessionState {
    Idle,
    Presented,
    Confirmed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("dialog state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid dialog state transition: {from:?} -> {to:?}")]
    InvalidStateTransition {
        from: SessionState,
        to: SessionState,
    },
    #[error("another modal dialog ({active}) is already active")]
    ModalBusy { active: DialogId },
    #[error("dialog has no button at index {0}")]
    UnknownButton(usize),
}

pub type FormResult<T> = Result<T, FormError>;

/// What a confirm press did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// Blocked by the first input without a valid value.
    InvalidField(String),
    /// Every input was valid but the validator produced no result.
    Rejected,
    NotPresented,
}

#[derive(Clone, Debug)]
pub struct FormOptions {
    pub confirm_label: Option<String>,
    pub cancel_label: Option<String>,
    pub i18n: I18nManager,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            confirm_label: None,
            cancel_label: None,
            i18n: I18nManager::global(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldSnapshot {
    pub name: String,
    pub label: Option<String>,
    pub valid: bool,
}

/// Everything a host needs to render the form once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormSnapshot {
    pub id: DialogId,
    pub header: Option<String>,
    pub state: SessionState,
    pub error: Option<String>,
    pub confirm_label: String,
    pub cancel_label: String,
    pub fields: Vec<FieldSnapshot>,
}

type ValidateFn<R> = Box<dyn Fn() -> Option<R> + Send + Sync>;
type ConfirmFn<R> = Box<dyn FnOnce(R) + Send>;
type CancelFn = Box<dyn FnOnce() + Send>;
type ResponseFn<R> = Box<dyn FnOnce(InputResponse<R>) + Send>;

enum Continuation<R> {
    Callbacks {
        on_confirm: Option<ConfirmFn<R>>,
        on_cancel: Option<CancelFn>,
    },
    Response(ResponseFn<R>),
}

impl<R> Continuation<R> {
    fn confirmed(self, result: R) {
        match self {
            Self::Callbacks { on_confirm, .. } => {
                if let Some(on_confirm) = on_confirm {
                    on_confirm(result);
                }
            }
            Self::Response(handler) => handler(InputResponse::Confirmed(result)),
        }
    }

    fn cancelled(self) {
        match self {
            Self::Callbacks { on_cancel, .. } => {
                if let Some(on_cancel) = on_cancel {
                    on_cancel();
                }
            }
            Self::Response(handler) => handler(InputResponse::Cancelled),
        }
    }
}

/// State machine shared by every modal dialog: presentation state plus the
/// hook that hands the dialog back to its scheduler.
pub(crate) struct Lifecycle {
    state: RwLock<SessionState>,
    dismiss: Mutex<Option<DismissHook>>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Idle),
            dismiss: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> FormResult<SessionState> {
        Ok(*read_lock(&self.state, "reading dialog state")?)
    }

    pub(crate) fn present(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "presenting dialog")?;
        transition(&mut state, SessionState::Presented)
    }

    /// Moves to a terminal state. `Ok(false)` when already terminal.
    pub(crate) fn finish(&self, next: SessionState) -> FormResult<bool> {
        let mut state = write_lock(&self.state, "finishing dialog")?;
        if state.is_terminal() {
            return Ok(false);
        }
        transition(&mut state, next)?;
        Ok(true)
    }

    pub(crate) fn attach_dismiss(&self, hook: DismissHook) -> FormResult<()> {
        *lock_mutex(&self.dismiss, "attaching dismiss hook")? = Some(hook);
        Ok(())
    }

    pub(crate) fn dismiss(&self, id: DialogId) -> FormResult<()> {
        let hook = lock_mutex(&self.dismiss, "taking dismiss hook")?.take();
        if let Some(hook) = hook {
            hook(id);
        }
        Ok(())
    }
}

struct FormCore {
    error: Option<String>,
    confirm_attempts: u32,
}

struct SessionInner<R> {
    id: DialogId,
    header: Option<String>,
    inputs: Vec<Arc<dyn InputView>>,
    confirm_label: String,
    cancel_label: String,
    i18n: I18nManager,
    validate: ValidateFn<R>,
    lifecycle: Lifecycle,
    core: RwLock<FormCore>,
    continuation: Mutex<Option<Continuation<R>>>,
}

/// One modal form interaction.
///
/// Cloning yields another handle to the same session. A session that is
/// dropped without a terminal transition drops its continuation, so a pending
/// [`InputFuture`] resolves with [`AbortedError`](crate::AbortedError).
pub struct FormSession<R> {
    inner: Arc<SessionInner<R>>,
}

impl<R> Clone for FormSession<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R> Debug for FormSession<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("id", &self.inner.id)
            .field("header", &self.inner.header)
            .field("inputs", &self.inner.inputs.len())
            .field("state", &self.inner.lifecycle.state())
            .finish()
    }
}

impl<R: 'static> FormSession<R> {
    pub fn builder(
        inputs: impl IntoIterator<Item = Arc<dyn InputView>>,
        validate: impl Fn() -> Option<R> + Send + Sync + 'static,
    ) -> FormSessionBuilder<R> {
        FormSessionBuilder {
            inputs: inputs.into_iter().collect(),
            header: None,
            options: FormOptions::default(),
            validate: Box::new(validate),
            continuation: None,
        }
    }

    pub fn id(&self) -> DialogId {
        self.inner.id
    }

    pub fn header(&self) -> Option<&str> {
        self.inner.header.as_deref()
    }

    pub fn inputs(&self) -> &[Arc<dyn InputView>] {
        &self.inner.inputs
    }

    pub fn confirm_label(&self) -> &str {
        &self.inner.confirm_label
    }

    pub fn cancel_label(&self) -> &str {
        &self.inner.cancel_label
    }

    pub fn state(&self) -> FormResult<SessionState> {
        self.inner.lifecycle.state()
    }

    /// Message of the live error label, if one is shown.
    pub fn error_message(&self) -> FormResult<Option<String>> {
        Ok(read_lock(&self.inner.core, "reading form error")?.error.clone())
    }

    pub fn confirm_attempts(&self) -> FormResult<u32> {
        Ok(read_lock(&self.inner.core, "reading confirm attempts")?.confirm_attempts)
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let state = self.state()?;
        let error = self.error_message()?;
        Ok(FormSnapshot {
            id: self.inner.id,
            header: self.inner.header.clone(),
            state,
            error,
            confirm_label: self.inner.confirm_label.clone(),
            cancel_label: self.inner.cancel_label.clone(),
            fields: self
                .inner
                .inputs
                .iter()
                .map(|input| FieldSnapshot {
                    name: input.name(),
                    label: input.label(),
                    valid: input.has_valid_value(),
                })
                .collect(),
        })
    }

    pub fn present(&self) -> FormResult<()> {
        self.inner.lifecycle.present()?;
        debug!(dialog = %self.inner.id, header = ?self.inner.header, "form presented");
        Ok(())
    }

    /// Runs the confirm action: field checks first, then the validator.
    pub fn confirm(&self) -> FormResult<ConfirmOutcome> {
        if self.state()? != SessionState::Presented {
            return Ok(ConfirmOutcome::NotPresented);
        }
        {
            let mut core = write_lock(&self.inner.core, "counting confirm attempt")?;
            core.confirm_attempts = core.confirm_attempts.saturating_add(1);
        }

        if let Some(input) = self.inner.inputs.iter().find(|input| !input.has_valid_value()) {
            let name = input.name();
            let message = self.inner.i18n.field_error(&name);
            write_lock(&self.inner.core, "reporting field error")?.error = Some(message);
            debug!(dialog = %self.inner.id, field = %name, "confirm blocked by invalid field");
            return Ok(ConfirmOutcome::InvalidField(name));
        }

        let Some(result) = (self.inner.validate)() else {
            write_lock(&self.inner.core, "clearing field error")?.error = None;
            debug!(dialog = %self.inner.id, "confirm rejected by validator");
            return Ok(ConfirmOutcome::Rejected);
        };

        // A cancel that landed while the validator ran wins.
        if !self.finish_presented(SessionState::Confirmed)? {
            return Ok(ConfirmOutcome::NotPresented);
        }
        write_lock(&self.inner.core, "clearing field error")?.error = None;
        debug!(dialog = %self.inner.id, "form confirmed");

        self.inner.lifecycle.dismiss(self.inner.id)?;
        if let Some(continuation) = self.take_continuation()? {
            continuation.confirmed(result);
        }
        Ok(ConfirmOutcome::Confirmed)
    }

    /// Cancel button. Accepted while presented or still queued; returns
    /// `false` once the session has already finished.
    pub fn cancel(&self) -> FormResult<bool> {
        if !self.inner.lifecycle.finish(SessionState::Cancelled)? {
            return Ok(false);
        }
        debug!(dialog = %self.inner.id, "form cancelled");

        self.inner.lifecycle.dismiss(self.inner.id)?;
        if let Some(continuation) = self.take_continuation()? {
            continuation.cancelled();
        }
        Ok(true)
    }

    /// Window close button; same as cancel.
    pub fn close(&self) -> FormResult<bool> {
        self.cancel()
    }

    pub fn is_finished(&self) -> bool {
        self.state().map(SessionState::is_terminal).unwrap_or(true)
    }

    fn finish_presented(&self, next: SessionState) -> FormResult<bool> {
        if self.state()? != SessionState::Presented {
            return Ok(false);
        }
        self.inner.lifecycle.finish(next)
    }

    fn take_continuation(&self) -> FormResult<Option<Continuation<R>>> {
        Ok(lock_mutex(&self.inner.continuation, "taking form continuation")?.take())
    }
}

impl<R: 'static> ModalDialog for FormSession<R> {
    fn id(&self) -> DialogId {
        self.inner.id
    }

    fn kind(&self) -> DialogKind {
        DialogKind::Form
    }

    fn header(&self) -> Option<String> {
        self.inner.header.clone()
    }

    fn present(&self) -> FormResult<()> {
        FormSession::present(self)
    }

    fn close(&self) -> FormResult<bool> {
        FormSession::close(self)
    }

    fn attach_dismiss(&self, hook: DismissHook) -> FormResult<()> {
        self.inner.lifecycle.attach_dismiss(hook)
    }

    fn is_finished(&self) -> bool {
        FormSession::is_finished(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct FormSessionBuilder<R> {
    inputs: Vec<Arc<dyn InputView>>,
    header: Option<String>,
    options: FormOptions,
    validate: ValidateFn<R>,
    continuation: Option<Continuation<R>>,
}

impl<R: 'static> FormSessionBuilder<R> {
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn maybe_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.options.confirm_label = Some(label.into());
        self
    }

    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.options.cancel_label = Some(label.into());
        self
    }

    pub fn i18n(mut self, i18n: I18nManager) -> Self {
        self.options.i18n = i18n;
        self
    }

    pub fn on_confirm(mut self, on_confirm: impl FnOnce(R) + Send + 'static) -> Self {
        let on_cancel = match self.continuation.take() {
            Some(Continuation::Callbacks { on_cancel, .. }) => on_cancel,
            _ => None,
        };
        self.continuation = Some(Continuation::Callbacks {
            on_confirm: Some(Box::new(on_confirm)),
            on_cancel,
        });
        self
    }

    pub fn on_cancel(mut self, on_cancel: impl FnOnce() + Send + 'static) -> Self {
        let on_confirm = match self.continuation.take() {
            Some(Continuation::Callbacks { on_confirm, .. }) => on_confirm,
            _ => None,
        };
        self.continuation = Some(Continuation::Callbacks {
            on_confirm,
            on_cancel: Some(Box::new(on_cancel)),
        });
        self
    }

    /// Replaces any callbacks with a single response handler.
    pub fn on_response(
        mut self,
        handler: impl FnOnce(InputResponse<R>) + Send + 'static,
    ) -> Self {
        self.continuation = Some(Continuation::Response(Box::new(handler)));
        self
    }

    pub fn build(self) -> FormSession<R> {
        let FormOptions {
            confirm_label,
            cancel_label,
            i18n,
        } = self.options;
        FormSession {
            inner: Arc::new(SessionInner {
                id: DialogId::next(),
                header: self.header,
                inputs: self.inputs,
                confirm_label: confirm_label.unwrap_or_else(|| i18n.text(keys::OK)),
                cancel_label: cancel_label.unwrap_or_else(|| i18n.text(keys::CANCEL)),
                i18n,
                validate: self.validate,
                lifecycle: Lifecycle::new(),
                core: RwLock::new(FormCore {
                    error: None,
                    confirm_attempts: 0,
                }),
                continuation: Mutex::new(self.continuation),
            }),
        }
    }

    /// Builds the session with its outcome routed into a future.
    pub fn into_future(self) -> (FormSession<R>, InputFuture<R>)
    where
        R: Send,
    {
        let (resolver, future) = response::channel();
        let session = self.on_response(resolver.into_handler()).build();
        (session, future)
    }
}

fn transition(state: &mut SessionState, next: SessionState) -> FormResult<()> {
    let current = *state;
    let allowed = matches!(
        (current, next),
        (SessionState::Idle, SessionState::Presented)
            | (SessionState::Idle, SessionState::Cancelled)
            | (SessionState::Presented, SessionState::Confirmed)
            | (SessionState::Presented, SessionState::Cancelled)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    *state = next;
    Ok(())
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn lock_mutex<'a, T>(
    lock: &'a Mutex<T>,
    context: &'static str,
) -> FormResult<MutexGuard<'a, T>> {
    lock.lock().map_err(|_| FormError::StatePoisoned(context))
}
