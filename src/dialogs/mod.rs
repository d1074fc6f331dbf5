mod buttons;
mod progress;

pub use buttons::{ButtonsDialog, ButtonsDialogBuilder, DialogButton};
pub use progress::{
    CancelCallback, LogLine, LogStyle, ProgressDialog, ProgressHandle, ProgressMonitor,
    ProgressOptions, ProgressView,
};
