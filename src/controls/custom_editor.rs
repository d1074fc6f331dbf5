use std::any::Any;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use super::{read_state, write_state};
use crate::form::{BindableInput, ControlSurface};
use crate::response::{AbortedError, InputFuture};

type EditorFn<T> = Arc<dyn Fn(Option<T>) -> InputFuture<T> + Send + Sync>;
type DescribeFn<T> = Arc<dyn Fn(Option<&T>) -> String + Send + Sync>;

/// A read-only value changed only through an external editor, such as
/// another dialog.
pub struct CustomEditor<T> {
    value: Arc<RwLock<Option<T>>>,
    editor: EditorFn<T>,
    describe: DescribeFn<T>,
}

impl<T> Clone for CustomEditor<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            editor: self.editor.clone(),
            describe: self.describe.clone(),
        }
    }
}

impl<T> CustomEditor<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(editor: impl Fn(Option<T>) -> InputFuture<T> + Send + Sync + 'static) -> Self
    where
        T: Debug,
    {
        Self::with_description(editor, |value: Option<&T>| {
            value.map(|value| format!("{value:?}")).unwrap_or_default()
        })
    }

    pub fn with_description(
        editor: impl Fn(Option<T>) -> InputFuture<T> + Send + Sync + 'static,
        describe: impl Fn(Option<&T>) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
            editor: Arc::new(editor),
            describe: Arc::new(describe),
        }
    }

    pub fn with_value(self, value: Option<T>) -> Self {
        *write_state(&self.value) = value;
        self
    }

    pub fn value(&self) -> Option<T> {
        read_state(&self.value).clone()
    }

    /// Text shown next to the edit button.
    pub fn display_text(&self) -> String {
        (self.describe)(read_state(&self.value).as_ref())
    }

    /// Opens the editor with the current value. A confirmed edit replaces the
    /// value; an aborted one leaves it untouched.
    pub async fn edit(&self) -> Result<T, AbortedError> {
        let edited = (self.editor)(self.value()).await?;
        *write_state(&self.value) = Some(edited.clone());
        Ok(edited)
    }

    pub fn bindable(&self, name: impl Into<String>) -> BindableInput<T> {
        BindableInput::new(name, self.clone())
    }
}

impl<T> ControlSurface<T> for CustomEditor<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn extract(&self) -> Option<T> {
        self.value()
    }

    fn display(&self, value: Option<&T>) {
        *write_state(&self.value) = value.cloned();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
