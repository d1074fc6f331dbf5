pub use crate::ask::{
    ButtonsPrompt, Prompt, ask_bool, ask_choice, ask_choices, ask_decimal, ask_integer,
    ask_long_string, ask_string, ask_url, ask_yes_no, ask_yes_no_cancel,
};
pub use crate::controls::{
    CheckBox, ColumnDefinition, ComboBox, CustomEditor, ListAction, ObjectList, SelectionTable,
    TextField,
};
pub use crate::dialogs::{
    ButtonsDialog, LogStyle, ProgressDialog, ProgressHandle, ProgressMonitor, ProgressOptions,
};
pub use crate::form::{
    BindableInput, BindingError, BindingSet, BindingsFactory, ConfirmOutcome, ControlSurface,
    FieldLens, FormError, FormModel, FormOptions, FormResult, FormSession, InputValidation,
    InputView, ObjectBinding, OptionalPropertyBinding, PropertyBinding, SessionState, Validation,
};
pub use crate::i18n::{I18nManager, Locale};
pub use crate::modal::{
    DialogEvent, DialogId, DialogScheduler, ModalDialog, Presentation, SchedulerPolicy,
};
pub use crate::response::{AbortedError, InputFuture, InputResponse};
