mod binding;
mod input;
mod object_form;
mod session;
mod validation;


pub use binding::{
    BindingError, BindingSet, BindingsFactory, FieldKey, FieldLens, FormModel, ObjectBinding,
    OptionalPropertyBinding, PropertyBinding,
};
pub use easydialogs_derive::FormModel;
pub use input::{BindableInput, ControlSurface, FnSurface, InputView, TextConvertible};
pub use object_form::{ObjectCreationHandler, ObjectEditHandler, ObjectReadyCallback};
pub use session::{
    ConfirmOutcome, FieldSnapshot, FormError, FormOptions, FormResult, FormSession,
    FormSessionBuilder, FormSnapshot, SessionState,
};
pub use validation::{
    AnyValidation, Custom, InputValidation, IsEmpty, NotEmptySequence, NotEmptyString, NotNil,
    Validation, ValidationRules,
};

pub(crate) use session::{Lifecycle, lock_mutex, read_lock, write_lock};
