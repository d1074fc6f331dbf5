//! Progress dialog fed from worker threads.
//!
//! Workers hold a [`ProgressHandle`] and only enqueue updates. The UI thread
//! owns the [`ProgressDialog`] and applies queued updates with
//! [`ProgressDialog::pump`], so the rendered state has a single writer.

use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex, RwLock};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, trace};

use crate::form::{FormResult, Lifecycle, SessionState, lock_mutex, read_lock, write_lock};
use crate::i18n::{I18nManager, keys};
use crate::modal::{DialogId, DialogKind, DialogScheduler, DismissHook, ModalDialog};

pub type CancelCallback = Box<dyn FnOnce() + Send>;

#[derive(Clone, Debug)]
pub struct ProgressOptions {
    /// Falls back to the localized default message.
    pub message: Option<String>,
    pub auto_dismiss_when_done: bool,
    pub i18n: I18nManager,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            message: None,
            auto_dismiss_when_done: false,
            i18n: I18nManager::global(),
        }
    }
}

impl ProgressOptions {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn auto_dismiss_when_done(mut self, auto_dismiss: bool) -> Self {
        self.auto_dismiss_when_done = auto_dismiss;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogStyle {
    Error,
    ProgressUpdate,
    /// Rendered dimmed by hosts.
    Info,
    #[default]
    Plain,
}

impl LogStyle {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Error => "⚠️ ",
            Self::ProgressUpdate => "➡️ ",
            Self::Info | Self::Plain => "",
        }
    }

    pub fn format(self, text: &str) -> String {
        format!("{}{text}", self.prefix())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogLine {
    pub text: String,
    pub style: LogStyle,
}

pub trait ProgressMonitor: Send + Sync {
    fn update_progress(&self, current: f64, total: f64);

    fn update_progress_count(&self, current: u64, total: u64) {
        self.update_progress(current as f64, total as f64);
    }

    /// Appends already formatted text.
    fn append_log(&self, line: LogLine);

    fn log(&self, text: &str, style: LogStyle, new_line: bool) {
        let mut text = style.format(text);
        if new_line {
            text.push('\n');
        }
        self.append_log(LogLine { text, style });
    }

    fn log_value(&self, value: &dyn Debug, style: LogStyle) {
        self.log(&format!("{value:?}"), style, true);
    }

    fn done(&self);
}

#[derive(Clone, Debug, PartialEq)]
enum ProgressUpdate {
    Progress { current: f64, total: f64 },
    Log(LogLine),
    Done,
}

/// Cross-thread side of a progress dialog.
#[derive(Clone, Debug)]
pub struct ProgressHandle {
    sender: Sender<ProgressUpdate>,
}

impl ProgressHandle {
    fn send(&self, update: ProgressUpdate) {
        if self.sender.send(update).is_err() {
            trace!("progress update dropped after dialog went away");
        }
    }
}

impl ProgressMonitor for ProgressHandle {
    fn update_progress(&self, current: f64, total: f64) {
        self.send(ProgressUpdate::Progress { current, total });
    }

    fn append_log(&self, line: LogLine) {
        self.send(ProgressUpdate::Log(line));
    }

    fn done(&self) {
        self.send(ProgressUpdate::Done);
    }
}

/// Rendered state of a progress dialog.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressView {
    pub message: String,
    pub indeterminate: bool,
    pub current: f64,
    pub total: f64,
    pub log: Vec<LogLine>,
    pub log_expanded: bool,
    pub abort_visible: bool,
    pub abort_enabled: bool,
    pub dismiss_visible: bool,
    pub done: bool,
}

impl ProgressView {
    /// `None` while indeterminate.
    pub fn fraction(&self) -> Option<f64> {
        if self.indeterminate || self.total <= 0.0 {
            return None;
        }
        Some((self.current / self.total).clamp(0.0, 1.0))
    }

    pub fn log_text(&self) -> String {
        self.log.iter().map(|line| line.text.as_str()).collect()
    }
}

struct ProgressInner {
    id: DialogId,
    auto_dismiss: bool,
    abort_label: String,
    done_label: String,
    receiver: Receiver<ProgressUpdate>,
    view: RwLock<ProgressView>,
    cancel: Mutex<Option<CancelCallback>>,
    lifecycle: Lifecycle,
}

/// UI side of a progress dialog.
#[derive(Clone)]
pub struct ProgressDialog {
    inner: Arc<ProgressInner>,
}

impl Debug for ProgressDialog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressDialog")
            .field("id", &self.inner.id)
            .field("view", &self.view().ok())
            .finish()
    }
}

impl ProgressDialog {
    /// Creates the dialog without presenting it. Without a cancel callback
    /// the abort button is disabled.
    pub fn new(options: ProgressOptions, cancel: Option<CancelCallback>) -> (Self, ProgressHandle) {
        let (sender, receiver) = channel::unbounded();
        let ProgressOptions {
            message,
            auto_dismiss_when_done,
            i18n,
        } = options;
        let abort_enabled = cancel.is_some();
        let dialog = Self {
            inner: Arc::new(ProgressInner {
                id: DialogId::next(),
                auto_dismiss: auto_dismiss_when_done,
                abort_label: i18n.text(keys::ABORT),
                done_label: i18n.text(keys::DONE),
                receiver,
                view: RwLock::new(ProgressView {
                    message: message.unwrap_or_else(|| i18n.text(keys::PROGRESS_MESSAGE)),
                    indeterminate: true,
                    current: 0.0,
                    total: 0.0,
                    log: Vec::new(),
                    log_expanded: false,
                    abort_visible: true,
                    abort_enabled,
                    dismiss_visible: false,
                    done: false,
                }),
                cancel: Mutex::new(cancel),
                lifecycle: Lifecycle::new(),
            }),
        };
        (dialog, ProgressHandle { sender })
    }

    /// Creates the dialog and presents it on `dialogs`.
    pub fn show(
        dialogs: &DialogScheduler,
        options: ProgressOptions,
        cancel: Option<CancelCallback>,
    ) -> FormResult<(Self, ProgressHandle)> {
        let (dialog, handle) = Self::new(options, cancel);
        dialogs.present(dialog.clone())?;
        Ok((dialog, handle))
    }

    pub fn id(&self) -> DialogId {
        self.inner.id
    }

    pub fn abort_label(&self) -> &str {
        &self.inner.abort_label
    }

    pub fn done_label(&self) -> &str {
        &self.inner.done_label
    }

    pub fn state(&self) -> FormResult<SessionState> {
        self.inner.lifecycle.state()
    }

    pub fn view(&self) -> FormResult<ProgressView> {
        Ok(read_lock(&self.inner.view, "reading progress view")?.clone())
    }

    pub fn present(&self) -> FormResult<()> {
        self.inner.lifecycle.present()?;
        debug!(dialog = %self.inner.id, "progress dialog presented");
        Ok(())
    }

    /// Applies every queued update. Call from the UI thread; returns the
    /// number of updates applied.
    pub fn pump(&self) -> FormResult<usize> {
        let updates: Vec<_> = self.inner.receiver.try_iter().collect();
        if updates.is_empty() || self.is_finished() {
            return Ok(0);
        }
        trace!(dialog = %self.inner.id, count = updates.len(), "pumping progress updates");

        let mut finished = false;
        {
            let mut view = write_lock(&self.inner.view, "applying progress updates")?;
            for update in &updates {
                match update {
                    ProgressUpdate::Progress { current, total } => {
                        view.indeterminate = false;
                        view.current = *current;
                        view.total = *total;
                    }
                    ProgressUpdate::Log(line) => {
                        view.log_expanded = true;
                        view.log.push(line.clone());
                    }
                    ProgressUpdate::Done => {
                        view.indeterminate = false;
                        view.current = 1.0;
                        view.total = 1.0;
                        view.abort_visible = false;
                        view.done = true;
                        if self.inner.auto_dismiss {
                            finished = true;
                        } else {
                            view.dismiss_visible = true;
                        }
                    }
                }
            }
        }

        if finished {
            self.finish(SessionState::Confirmed)?;
        }
        Ok(updates.len())
    }

    /// The abort button. Runs the cancel callback and dismisses; does nothing
    /// when no callback was given or the work is already done.
    pub fn abort(&self) -> FormResult<bool> {
        {
            let view = read_lock(&self.inner.view, "checking abort button")?;
            if !view.abort_enabled || !view.abort_visible {
                return Ok(false);
            }
        }
        self.cancel_work()
    }

    /// The dismiss button shown once the work is done.
    pub fn dismiss(&self) -> FormResult<bool> {
        if !read_lock(&self.inner.view, "checking dismiss button")?.dismiss_visible {
            return Ok(false);
        }
        self.finish(SessionState::Confirmed)
    }

    pub fn is_finished(&self) -> bool {
        self.state().map(SessionState::is_terminal).unwrap_or(true)
    }

    fn cancel_work(&self) -> FormResult<bool> {
        if self.is_finished() {
            return Ok(false);
        }
        let cancel = lock_mutex(&self.inner.cancel, "taking progress cancel callback")?.take();
        if let Some(cancel) = cancel {
            cancel();
        }
        self.finish(SessionState::Cancelled)
    }

    fn finish(&self, terminal: SessionState) -> FormResult<bool> {
        if !self.inner.lifecycle.finish(terminal)? {
            return Ok(false);
        }
        debug!(dialog = %self.inner.id, state = ?terminal, "progress dialog finished");
        self.inner.lifecycle.dismiss(self.inner.id)?;
        Ok(true)
    }
}

impl ModalDialog for ProgressDialog {
    fn id(&self) -> DialogId {
        self.inner.id
    }

    fn kind(&self) -> DialogKind {
        DialogKind::Progress
    }

    fn header(&self) -> Option<String> {
        self.view().ok().map(|view| view.message)
    }

    fn present(&self) -> FormResult<()> {
        ProgressDialog::present(self)
    }

    /// Stops the work like the abort button, even without a callback.
    fn close(&self) -> FormResult<bool> {
        self.cancel_work()
    }

    fn attach_dismiss(&self, hook: DismissHook) -> FormResult<()> {
        self.inner.lifecycle.attach_dismiss(hook)
    }

    fn is_finished(&self) -> bool {
        ProgressDialog::is_finished(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn starts_indeterminate_and_becomes_determinate() {
        let (dialog, handle) = ProgressDialog::new(ProgressOptions::default(), None);
        dialog.present().expect("present");
        let view = dialog.view().expect("view");
        assert!(view.indeterminate);
        assert!(!view.abort_enabled);
        assert_eq!(view.fraction(), None);

        handle.update_progress_count(1, 4);
        assert_eq!(dialog.view().expect("view").fraction(), None);
        assert_eq!(dialog.pump().expect("pump"), 1);
        assert_eq!(dialog.view().expect("view").fraction(), Some(0.25));
    }

    #[test]
    fn log_lines_carry_style_prefixes() {
        let (dialog, handle) = ProgressDialog::new(ProgressOptions::default(), None);
        dialog.present().expect("present");
        handle.log("disk full", LogStyle::Error, true);
        handle.log("step 2", LogStyle::ProgressUpdate, false);
        handle.log("plain", LogStyle::Plain, true);
        dialog.pump().expect("pump");

        let view = dialog.view().expect("view");
        assert!(view.log_expanded);
        assert_eq!(view.log_text(), "⚠️ disk full\n➡️ step 2plain\n");
    }

    #[test]
    fn done_reveals_dismiss_unless_auto_dismissing() {
        let (dialog, handle) = ProgressDialog::new(ProgressOptions::default(), None);
        dialog.present().expect("present");
        assert!(!dialog.dismiss().expect("dismiss before done"));
        handle.done();
        dialog.pump().expect("pump");
        let view = dialog.view().expect("view");
        assert!(view.done && view.dismiss_visible && !view.abort_visible);
        assert_eq!(view.fraction(), Some(1.0));
        assert!(dialog.dismiss().expect("dismiss"));
        assert_eq!(dialog.state().expect("state"), SessionState::Confirmed);

        let options = ProgressOptions::default().auto_dismiss_when_done(true);
        let (auto, handle) = ProgressDialog::new(options, None);
        auto.present().expect("present");
        handle.done();
        auto.pump().expect("pump");
        assert!(auto.is_finished());
    }

    #[test]
    fn abort_runs_cancel_callback_once() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let (dialog, _handle) = ProgressDialog::new(
            ProgressOptions::default().message("Copying"),
            Some(Box::new(move || flag.store(true, Ordering::SeqCst))),
        );
        dialog.present().expect("present");
        assert_eq!(dialog.view().expect("view").message, "Copying");

        assert!(dialog.abort().expect("abort"));
        assert!(cancelled.load(Ordering::SeqCst));
        assert!(!dialog.abort().expect("second abort"));
        assert_eq!(dialog.state().expect("state"), SessionState::Cancelled);
    }

    #[test]
    fn abort_is_disabled_without_callback() {
        let (dialog, _handle) = ProgressDialog::new(ProgressOptions::default(), None);
        dialog.present().expect("present");
        assert!(!dialog.abort().expect("abort"));
        assert!(!dialog.is_finished());
    }
}
