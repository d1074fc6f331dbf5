use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use super::{read_state, write_state};
use crate::form::{BindableInput, ControlSurface, TextConvertible};

#[derive(Clone, Debug, Default)]
struct TextState {
    text: String,
    placeholder: Option<String>,
    multiline: bool,
    min_height: Option<f32>,
}

/// Editable text parsed into `V` on extraction.
pub struct TextField<V> {
    state: Arc<RwLock<TextState>>,
    _value: PhantomData<fn() -> V>,
}

impl<V> Clone for TextField<V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            _value: PhantomData,
        }
    }
}

impl<V> std::fmt::Debug for TextField<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextField")
            .field("state", &*read_state(&self.state))
            .finish()
    }
}

impl<V> Default for TextField<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TextField<V> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(TextState::default())),
            _value: PhantomData,
        }
    }

    /// A scrolling multi-line text area.
    pub fn multiline() -> Self {
        let field = Self::new();
        write_state(&field.state).multiline = true;
        field
    }

    pub fn with_min_height(self, min_height: f32) -> Self {
        write_state(&self.state).min_height = Some(min_height);
        self
    }

    pub fn with_placeholder(self, placeholder: impl Into<String>) -> Self {
        write_state(&self.state).placeholder = Some(placeholder.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn text(&self) -> String {
        read_state(&self.state).text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        write_state(&self.state).text = text.into();
    }

    pub fn placeholder(&self) -> Option<String> {
        read_state(&self.state).placeholder.clone()
    }

    pub fn is_multiline(&self) -> bool {
        read_state(&self.state).multiline
    }

    pub fn min_height(&self) -> Option<f32> {
        read_state(&self.state).min_height
    }
}

impl<V> TextField<V>
where
    V: TextConvertible + Clone + Send + Sync + 'static,
{
    pub fn bindable(&self, name: impl Into<String>) -> BindableInput<V> {
        BindableInput::new(name, self.clone())
    }
}

impl<V> ControlSurface<V> for TextField<V>
where
    V: TextConvertible + 'static,
{
    fn extract(&self) -> Option<V> {
        V::from_text(&read_state(&self.state).text)
    }

    fn display(&self, value: Option<&V>) {
        write_state(&self.state).text = value.map(V::to_text).unwrap_or_default();
    }

    fn is_blank(&self) -> bool {
        read_state(&self.state).text.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Validation;

    #[test]
    fn unparsable_text_extracts_nothing() {
        let field = TextField::<i64>::new().with_text("12a");
        assert_eq!(field.extract(), None);
        field.set_text(" 12 ");
        assert_eq!(field.extract(), Some(12));
    }

    #[test]
    fn display_writes_text_and_clears_on_none() {
        let field = TextField::<String>::new();
        let input = field
            .bindable("Name")
            .rule(Validation::not_empty_string())
            .with_value(Some("Alice".to_string()));
        assert_eq!(field.text(), "Alice");
        input.set_value(None);
        assert_eq!(field.text(), "");
        assert!(!input.has_valid_value());
    }

    #[test]
    fn multiline_configuration() {
        let field = TextField::<String>::multiline().with_min_height(120.0);
        assert!(field.is_multiline());
        assert_eq!(field.min_height(), Some(120.0));
        assert!(!TextField::<String>::new().is_multiline());
    }
}
