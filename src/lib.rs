pub mod ask;
pub mod controls;
pub mod dialogs;
pub mod form;
pub mod i18n;
pub mod modal;
pub mod prelude;
pub mod response;

pub use i18n::{I18nManager, Locale};
pub use modal::{DialogId, DialogScheduler};
pub use response::{AbortedError, InputFuture, InputResolver, InputResponse};

#[cfg(test)]
mod test_public_api;
