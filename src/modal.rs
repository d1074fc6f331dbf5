//! Process-wide serialization of modal dialogs.
//!
//! Only one dialog is active at a time. A dialog handed to a busy scheduler is
//! queued or rejected depending on [`SchedulerPolicy`]. Dialogs report their
//! own dismissal through a hook attached after construction, which activates
//! the next queued dialog before the finished dialog's continuation runs.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, RwLock};

use tracing::{debug, warn};

use crate::form::{FormError, FormResult, FormSession, read_lock, write_lock};

static DIALOG_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);
static GLOBAL: LazyLock<DialogScheduler> = LazyLock::new(DialogScheduler::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DialogId(pub u64);

impl DialogId {
    pub fn next() -> Self {
        Self(DIALOG_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for DialogId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "dialog#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DialogKind {
    Form,
    Buttons,
    Progress,
}

/// Called once by a dialog when it reaches a terminal state.
pub type DismissHook = Box<dyn FnOnce(DialogId) + Send>;

pub trait ModalDialog: Send + Sync + 'static {
    fn id(&self) -> DialogId;
    fn kind(&self) -> DialogKind;
    fn header(&self) -> Option<String>;
    fn present(&self) -> FormResult<()>;
    /// The window close button.
    fn close(&self) -> FormResult<bool>;
    fn attach_dismiss(&self, hook: DismissHook) -> FormResult<()>;
    fn is_finished(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SchedulerPolicy {
    #[default]
    Queue,
    Reject,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DialogEvent {
    Presented(DialogId),
    Queued(DialogId),
    Rejected(DialogId),
    Dismissed(DialogId),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Presentation {
    Active,
    Queued { position: usize },
}

type Listener = Arc<dyn Fn(DialogEvent) + Send + Sync>;

#[derive(Default)]
struct SchedulerState {
    active: Option<Arc<dyn ModalDialog>>,
    queue: VecDeque<Arc<dyn ModalDialog>>,
}

struct SchedulerInner {
    policy: SchedulerPolicy,
    state: RwLock<SchedulerState>,
    listeners: RwLock<Vec<Listener>>,
}

#[derive(Clone)]
pub struct DialogScheduler {
    inner: Arc<SchedulerInner>,
}

impl Default for DialogScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DialogScheduler {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogScheduler")
            .field("policy", &self.inner.policy)
            .field("active", &self.active_id().ok().flatten())
            .field("queued", &self.queued_len().ok())
            .finish()
    }
}

impl DialogScheduler {
    pub fn new() -> Self {
        Self::with_policy(SchedulerPolicy::default())
    }

    pub fn with_policy(policy: SchedulerPolicy) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                policy,
                state: RwLock::new(SchedulerState::default()),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Scheduler shared by every dialog that does not name its own.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub fn policy(&self) -> SchedulerPolicy {
        self.inner.policy
    }

    pub fn subscribe(&self, listener: impl Fn(DialogEvent) + Send + Sync + 'static) -> FormResult<()> {
        write_lock(&self.inner.listeners, "subscribing to dialog events")?.push(Arc::new(listener));
        Ok(())
    }

    pub fn present(&self, dialog: impl ModalDialog) -> FormResult<Presentation> {
        self.present_arc(Arc::new(dialog))
    }

    pub fn present_arc(&self, dialog: Arc<dyn ModalDialog>) -> FormResult<Presentation> {
        let id = dialog.id();
        let presentation = {
            let mut state = write_lock(&self.inner.state, "scheduling dialog")?;
            let active = state.active.as_ref().map(|active| active.id());
            if let (Some(active), SchedulerPolicy::Reject) = (active, self.inner.policy) {
                drop(state);
                warn!(dialog = %id, active = %active, "modal dialog rejected");
                self.emit(DialogEvent::Rejected(id));
                return Err(FormError::ModalBusy { active });
            }

            // Only dialogs the scheduler keeps report their dismissal to it.
            self.attach_hook(dialog.as_ref())?;
            match active {
                None => {
                    state.active = Some(dialog.clone());
                    Presentation::Active
                }
                Some(_) => {
                    state.queue.push_back(dialog.clone());
                    Presentation::Queued {
                        position: state.queue.len(),
                    }
                }
            }
        };

        match presentation {
            Presentation::Active => {
                if let Err(error) = dialog.present() {
                    let mut state = write_lock(&self.inner.state, "rolling back dialog")?;
                    if state.active.as_ref().is_some_and(|active| active.id() == id) {
                        state.active = None;
                    }
                    return Err(error);
                }
                debug!(dialog = %id, kind = ?dialog.kind(), "dialog presented");
                self.emit(DialogEvent::Presented(id));
            }
            Presentation::Queued { position } => {
                debug!(dialog = %id, position, "dialog queued");
                self.emit(DialogEvent::Queued(id));
            }
        }
        Ok(presentation)
    }

    pub fn active(&self) -> FormResult<Option<Arc<dyn ModalDialog>>> {
        Ok(read_lock(&self.inner.state, "reading active dialog")?
            .active
            .clone())
    }

    pub fn active_id(&self) -> FormResult<Option<DialogId>> {
        Ok(self.active()?.map(|dialog| dialog.id()))
    }

    /// The active dialog, if it is a form producing `R`.
    pub fn active_form<R: 'static>(&self) -> FormResult<Option<FormSession<R>>> {
        Ok(self
            .active()?
            .and_then(|dialog| dialog.as_any().downcast_ref::<FormSession<R>>().cloned()))
    }

    /// The active dialog downcast to its concrete type.
    pub fn active_as<D: ModalDialog + Clone>(&self) -> FormResult<Option<D>> {
        Ok(self
            .active()?
            .and_then(|dialog| dialog.as_any().downcast_ref::<D>().cloned()))
    }

    pub fn queued_len(&self) -> FormResult<usize> {
        Ok(read_lock(&self.inner.state, "reading dialog queue")?.queue.len())
    }

    pub fn queued_ids(&self) -> FormResult<Vec<DialogId>> {
        Ok(read_lock(&self.inner.state, "reading dialog queue")?
            .queue
            .iter()
            .map(|dialog| dialog.id())
            .collect())
    }

    /// Presses the close button of the active dialog.
    pub fn close_active(&self) -> FormResult<Option<DialogId>> {
        let Some(active) = self.active()? else {
            return Ok(None);
        };
        active.close()?;
        Ok(Some(active.id()))
    }

    /// Closes the queued dialogs, then the active one.
    pub fn cancel_all(&self) -> FormResult<usize> {
        let queued = {
            let mut state = write_lock(&self.inner.state, "draining dialog queue")?;
            state.queue.drain(..).collect::<Vec<_>>()
        };
        let mut closed = 0;
        for dialog in queued {
            if dialog.close()? {
                closed += 1;
            }
        }
        if let Some(active) = self.active()?
            && active.close()?
        {
            closed += 1;
        }
        Ok(closed)
    }

    fn attach_hook(&self, dialog: &dyn ModalDialog) -> FormResult<()> {
        let weak = Arc::downgrade(&self.inner);
        dialog.attach_dismiss(Box::new(move |id| {
            if let Some(inner) = weak.upgrade() {
                DialogScheduler { inner }.on_dismissed(id);
            }
        }))
    }

    fn on_dismissed(&self, id: DialogId) {
        let next = {
            let mut state = match self.inner.state.write() {
                Ok(state) => state,
                Err(_) => {
                    warn!(dialog = %id, "dialog scheduler state poisoned on dismiss");
                    return;
                }
            };
            if state.active.as_ref().is_some_and(|active| active.id() == id) {
                state.active = state.queue.pop_front();
                state.active.clone()
            } else {
                state.queue.retain(|dialog| dialog.id() != id);
                None
            }
        };
        debug!(dialog = %id, "dialog dismissed");
        self.emit(DialogEvent::Dismissed(id));

        if let Some(next) = next {
            self.activate(next);
        }
    }

    fn activate(&self, dialog: Arc<dyn ModalDialog>) {
        let id = dialog.id();
        match dialog.present() {
            Ok(()) => {
                debug!(dialog = %id, kind = ?dialog.kind(), "queued dialog presented");
                self.emit(DialogEvent::Presented(id));
            }
            Err(error) => {
                warn!(dialog = %id, %error, "queued dialog could not be presented");
                // Its dismiss hook will not fire; free the slot for the rest.
                self.on_dismissed(id);
            }
        }
    }

    fn emit(&self, event: DialogEvent) {
        let listeners = match self.inner.listeners.read() {
            Ok(listeners) => listeners.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SessionState;
    use std::sync::Mutex;

    fn form(header: &str) -> FormSession<()> {
        FormSession::builder(Vec::new(), || Some(())).header(header).build()
    }

    fn recorder(scheduler: &DialogScheduler) -> Arc<Mutex<Vec<DialogEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        scheduler
            .subscribe(move |event| sink.lock().expect("events").push(event))
            .expect("subscribe");
        events
    }

    #[test]
    fn queued_dialog_becomes_active_on_dismiss() {
        let scheduler = DialogScheduler::new();
        let events = recorder(&scheduler);
        let first = form("A");
        let second = form("B");

        assert_eq!(
            scheduler.present(first.clone()).expect("present first"),
            Presentation::Active
        );
        assert_eq!(
            scheduler.present(second.clone()).expect("present second"),
            Presentation::Queued { position: 1 }
        );
        assert_eq!(second.state().expect("state"), SessionState::Idle);

        assert_eq!(
            first.confirm().expect("confirm"),
            crate::form::ConfirmOutcome::Confirmed
        );
        assert_eq!(scheduler.active_id().expect("active"), Some(second.id()));
        assert_eq!(second.state().expect("state"), SessionState::Presented);
        assert_eq!(
            *events.lock().expect("events"),
            vec![
                DialogEvent::Presented(first.id()),
                DialogEvent::Queued(second.id()),
                DialogEvent::Dismissed(first.id()),
                DialogEvent::Presented(second.id()),
            ]
        );
    }

    #[test]
    fn reject_policy_reports_active_dialog() {
        let scheduler = DialogScheduler::with_policy(SchedulerPolicy::Reject);
        let first = form("A");
        scheduler.present(first.clone()).expect("present first");

        let error = scheduler.present(form("B")).expect_err("busy");
        assert_eq!(error, FormError::ModalBusy { active: first.id() });
        assert_eq!(scheduler.queued_len().expect("queue"), 0);
    }

    #[test]
    fn rejected_dialog_never_reports_dismissal() {
        let scheduler = DialogScheduler::with_policy(SchedulerPolicy::Reject);
        let events = recorder(&scheduler);
        let first = form("A");
        let second = form("B");
        scheduler.present(first.clone()).expect("present first");
        assert!(scheduler.present(second.clone()).is_err());

        assert!(second.cancel().expect("cancel rejected"));
        assert_eq!(scheduler.active_id().expect("active"), Some(first.id()));
        assert_eq!(
            *events.lock().expect("events"),
            vec![
                DialogEvent::Presented(first.id()),
                DialogEvent::Rejected(second.id()),
            ]
        );
    }

    #[test]
    fn cancel_all_cancels_queued_and_active() {
        let scheduler = DialogScheduler::new();
        let first = form("A");
        let second = form("B");
        scheduler.present(first.clone()).expect("present first");
        scheduler.present(second.clone()).expect("present second");

        assert_eq!(scheduler.cancel_all().expect("cancel all"), 2);
        assert_eq!(first.state().expect("state"), SessionState::Cancelled);
        assert_eq!(second.state().expect("state"), SessionState::Cancelled);
        assert_eq!(scheduler.active_id().expect("active"), None);
    }

    #[test]
    fn close_active_and_downcast() {
        let scheduler = DialogScheduler::new();
        let session = form("A");
        scheduler.present(session.clone()).expect("present");

        let active = scheduler.active_form::<()>().expect("active").expect("form");
        assert_eq!(active.id(), session.id());
        assert!(scheduler.active_form::<String>().expect("active").is_none());

        assert_eq!(scheduler.close_active().expect("close"), Some(session.id()));
        assert!(session.is_finished());
        assert_eq!(scheduler.close_active().expect("close"), None);
    }

    #[test]
    fn queued_dialog_cancelled_before_activation_leaves_queue() {
        let scheduler = DialogScheduler::new();
        let first = form("A");
        let second = form("B");
        scheduler.present(first.clone()).expect("present first");
        scheduler.present(second.clone()).expect("present second");

        assert!(second.cancel().expect("cancel queued"));
        assert_eq!(scheduler.queued_len().expect("queue"), 0);
        first.cancel().expect("cancel active");
        assert_eq!(scheduler.active_id().expect("active"), None);
    }
}
