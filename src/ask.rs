//! "Ask the user for X" helpers.
//!
//! Every helper builds a one-input form (or a button dialog), presents it on
//! the given scheduler and routes the outcome through
//! [`InputResolver::into_handler`](crate::response::InputResolver::into_handler),
//! so cancellation always surfaces as [`AbortedError`].

use std::fmt::Display;
use std::future::IntoFuture;

use rust_decimal::Decimal;
use tracing::debug;
use url::Url;

use crate::controls::{CheckBox, ComboBox, SelectionTable, TextField};
use crate::dialogs::ButtonsDialog;
use crate::form::{BindableInput, FormResult, FormSession};
use crate::i18n::{I18nManager, keys};
use crate::modal::DialogScheduler;
use crate::response::{self, AbortedError, InputFuture, InputResponse};

const LONG_TEXT_MIN_HEIGHT: f32 = 300.0;

impl<V> BindableInput<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Presents this input alone in a form headed by `message`.
    pub fn ask_in_form(
        &self,
        dialogs: &DialogScheduler,
        message: impl Into<String>,
        handler: impl FnOnce(InputResponse<V>) + Send + 'static,
    ) -> FormResult<FormSession<V>> {
        let input = self.clone();
        let session = FormSession::builder([self.erased()], move || input.value())
            .header(message)
            .on_response(handler)
            .build();
        dialogs.present(session.clone())?;
        Ok(session)
    }

    pub fn ask_in_form_future(
        &self,
        dialogs: &DialogScheduler,
        message: impl Into<String>,
    ) -> FormResult<(FormSession<V>, InputFuture<V>)> {
        let (resolver, future) = response::channel();
        let session = self.ask_in_form(dialogs, message, resolver.into_handler())?;
        Ok((session, future))
    }
}

/// A presented one-input form: the control to drive, the session, and the
/// pending answer. Awaiting the prompt awaits the answer.
pub struct Prompt<C, T> {
    pub control: C,
    pub session: FormSession<T>,
    pub future: InputFuture<T>,
}

impl<C, T> IntoFuture for Prompt<C, T> {
    type Output = Result<T, AbortedError>;
    type IntoFuture = InputFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.future
    }
}

/// A presented button dialog and its pending answer.
pub struct ButtonsPrompt<T> {
    pub dialog: ButtonsDialog<T>,
    pub future: InputFuture<T>,
}

impl<T> IntoFuture for ButtonsPrompt<T> {
    type Output = Result<T, AbortedError>;
    type IntoFuture = InputFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.future
    }
}

fn value_field() -> String {
    I18nManager::global().text(keys::VALUE_FIELD)
}

fn prompt<C, V>(
    dialogs: &DialogScheduler,
    message: String,
    control: C,
    input: BindableInput<V>,
) -> FormResult<Prompt<C, V>>
where
    V: Clone + Send + Sync + 'static,
{
    debug!(message = %message, "asking in form");
    let (session, future) = input.ask_in_form_future(dialogs, message)?;
    Ok(Prompt {
        control,
        session,
        future,
    })
}

fn ask_text<V>(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    field: TextField<V>,
    initial: Option<V>,
) -> FormResult<Prompt<TextField<V>, V>>
where
    V: crate::form::TextConvertible + Clone + Send + Sync + 'static,
{
    let input = field.bindable(value_field()).with_value(initial);
    prompt(dialogs, message.into(), field, input)
}

/// Single-line text. An empty answer is accepted.
pub fn ask_string(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    initial: Option<String>,
) -> FormResult<Prompt<TextField<String>, String>> {
    ask_text(dialogs, message, TextField::new(), initial)
}

pub fn ask_long_string(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    initial: Option<String>,
) -> FormResult<Prompt<TextField<String>, String>> {
    let field = TextField::multiline().with_min_height(LONG_TEXT_MIN_HEIGHT);
    ask_text(dialogs, message, field, initial)
}

pub fn ask_integer(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    initial: Option<i64>,
) -> FormResult<Prompt<TextField<i64>, i64>> {
    ask_text(dialogs, message, TextField::new(), initial)
}

pub fn ask_decimal(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    initial: Option<Decimal>,
) -> FormResult<Prompt<TextField<Decimal>, Decimal>> {
    ask_text(dialogs, message, TextField::new(), initial)
}

pub fn ask_url(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    initial: Option<Url>,
) -> FormResult<Prompt<TextField<Url>, Url>> {
    ask_text(dialogs, message, TextField::new(), initial)
}

/// A check box titled with `message`.
pub fn ask_bool(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    initial: bool,
) -> FormResult<Prompt<CheckBox, bool>> {
    let message = message.into();
    let check = CheckBox::new(message.clone());
    let input = check.bindable(value_field()).with_value(Some(initial));
    prompt(dialogs, message, check, input)
}

/// Single choice; preselects `initial`, or the first option.
pub fn ask_choice<T>(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    options: impl IntoIterator<Item = T>,
    initial: Option<T>,
) -> FormResult<Prompt<ComboBox<T>, T>>
where
    T: Display + Clone + PartialEq + Send + Sync + 'static,
{
    let combo = ComboBox::new(options);
    let initial = initial.or_else(|| combo.options().first().cloned());
    let input = combo.bindable(value_field()).with_value(initial);
    prompt(dialogs, message.into(), combo, input)
}

/// Multiple choice; at least one option must be selected.
pub fn ask_choices<T>(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
    options: impl IntoIterator<Item = T>,
    initial: Vec<T>,
) -> FormResult<Prompt<SelectionTable<T>, Vec<T>>>
where
    T: Display + Clone + PartialEq + Send + Sync + 'static,
{
    let table = SelectionTable::new(options);
    let input = table.bindable(value_field()).with_value(Some(initial));
    prompt(dialogs, message.into(), table, input)
}

fn ask_buttons(
    dialogs: &DialogScheduler,
    dialog: ButtonsDialog<bool>,
    future: InputFuture<bool>,
) -> FormResult<ButtonsPrompt<bool>> {
    dialogs.present(dialog.clone())?;
    Ok(ButtonsPrompt { dialog, future })
}

/// Buttons "No", "Yes". Closing the window cancels.
pub fn ask_yes_no(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
) -> FormResult<ButtonsPrompt<bool>> {
    let i18n = I18nManager::global();
    let (dialog, future) = ButtonsDialog::builder()
        .header(message)
        .button(i18n.text(keys::NO), InputResponse::Confirmed(false))
        .button(i18n.text(keys::YES), InputResponse::Confirmed(true))
        .into_future();
    ask_buttons(dialogs, dialog, future)
}

/// Buttons "Cancel", "No", "Yes".
pub fn ask_yes_no_cancel(
    dialogs: &DialogScheduler,
    message: impl Into<String>,
) -> FormResult<ButtonsPrompt<bool>> {
    let i18n = I18nManager::global();
    let (dialog, future) = ButtonsDialog::builder()
        .header(message)
        .button(i18n.text(keys::CANCEL), InputResponse::Cancelled)
        .button(i18n.text(keys::NO), InputResponse::Confirmed(false))
        .button(i18n.text(keys::YES), InputResponse::Confirmed(true))
        .into_future();
    ask_buttons(dialogs, dialog, future)
}
