use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use url::Url;

use super::validation::{AnyValidation, ValidationRules};

/// The narrow interface a host control offers to the binding layer.
///
/// Implementations are shared handles: `display` takes `&self` and must be
/// visible to the next `extract` immediately.
pub trait ControlSurface<V>: Send + Sync + 'static {
    /// Typed value currently shown, `None` when the control cannot produce one.
    fn extract(&self) -> Option<V>;
    fn display(&self, value: Option<&V>);
    fn as_any(&self) -> &dyn Any;

    /// Whether the control shows what `display(None)` leaves behind. Text
    /// fields override this, since their cleared text still extracts.
    fn is_blank(&self) -> bool {
        self.extract().is_none()
    }
}

/// Conversion between a value and the text shown in a text control.
pub trait TextConvertible: Sized {
    fn to_text(&self) -> String;
    fn from_text(text: &str) -> Option<Self>;
}

impl TextConvertible for String {
    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

macro_rules! impl_text_convertible_via_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TextConvertible for $ty {
                fn to_text(&self) -> String {
                    self.to_string()
                }

                fn from_text(text: &str) -> Option<Self> {
                    <$ty as FromStr>::from_str(text.trim()).ok()
                }
            }
        )*
    };
}

impl_text_convertible_via_from_str!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl TextConvertible for Decimal {
    fn to_text(&self) -> String {
        self.normalize().to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        Decimal::from_str(text.trim()).ok()
    }
}

impl TextConvertible for Url {
    fn to_text(&self) -> String {
        self.as_str().to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        Url::parse(text.trim()).ok()
    }
}

/// Type-erased view of a bindable input, as the form sees it.
pub trait InputView: Send + Sync {
    /// Identifier used in validation error messages.
    fn name(&self) -> String;
    fn label(&self) -> Option<String>;
    /// Recomputed on every call from the live control state.
    fn has_valid_value(&self) -> bool;
    fn clear(&self);
    /// The concrete control, for hosts that render it.
    fn control(&self) -> &dyn Any;
}

/// A control paired with typed extraction and validation rules.
///
/// Cloning yields another handle to the same control.
pub struct BindableInput<V> {
    name: Arc<str>,
    label: Arc<RwLock<Option<String>>>,
    surface: Arc<dyn ControlSurface<V>>,
    rules: ValidationRules<V>,
}

impl<V> Clone for BindableInput<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            label: self.label.clone(),
            surface: self.surface.clone(),
            rules: self.rules.clone(),
        }
    }
}

impl<V> fmt::Debug for BindableInput<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindableInput")
            .field("name", &self.name)
            .field("label", &self.label())
            .field("rules", &self.rules)
            .finish()
    }
}

impl<V> BindableInput<V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<String> {
        match self.label.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_label(&self, label: Option<String>) {
        let mut guard = match self.label.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = label;
    }
}

impl<V> BindableInput<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, surface: impl ControlSurface<V>) -> Self {
        Self {
            name: Arc::from(name.into()),
            label: Arc::new(RwLock::new(None)),
            surface: Arc::new(surface),
            rules: ValidationRules::new(),
        }
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.set_label(Some(label.into()));
        self
    }

    pub fn rule(mut self, rule: AnyValidation<V>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = AnyValidation<V>>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_value(self, value: Option<V>) -> Self {
        self.set_value(value);
        self
    }

    /// Raw extraction, before any rule is applied.
    pub fn raw_value(&self) -> Option<V> {
        self.surface.extract()
    }

    /// `None` whenever extraction fails or any rule rejects the extracted value.
    pub fn value(&self) -> Option<V> {
        let raw = self.surface.extract()?;
        self.rules.validate(Some(&raw)).then_some(raw)
    }

    pub fn set_value(&self, value: Option<V>) {
        self.surface.display(value.as_ref());
    }

    /// The control shows no value at all, as after `set_value(None)`.
    pub fn is_blank(&self) -> bool {
        self.surface.is_blank()
    }

    pub fn has_valid_value(&self) -> bool {
        let raw = self.surface.extract();
        raw.is_some() && self.rules.validate(raw.as_ref())
    }

    pub fn surface(&self) -> &dyn ControlSurface<V> {
        self.surface.as_ref()
    }

    /// The concrete control, if it is a `C`.
    pub fn control<C: 'static>(&self) -> Option<&C> {
        self.surface.as_any().downcast_ref::<C>()
    }

    pub fn erased(&self) -> Arc<dyn InputView> {
        Arc::new(self.clone())
    }
}

impl<V> InputView for BindableInput<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> String {
        self.name.to_string()
    }

    fn label(&self) -> Option<String> {
        BindableInput::label(self)
    }

    fn has_valid_value(&self) -> bool {
        BindableInput::has_valid_value(self)
    }

    fn clear(&self) {
        self.set_value(None);
    }

    fn control(&self) -> &dyn Any {
        self.surface.as_any()
    }
}

/// Adapts a pair of closures into a [`ControlSurface`].
pub struct FnSurface<V> {
    extract: Box<dyn Fn() -> Option<V> + Send + Sync>,
    display: Box<dyn Fn(Option<&V>) + Send + Sync>,
}

impl<V> FnSurface<V> {
    pub fn new(
        extract: impl Fn() -> Option<V> + Send + Sync + 'static,
        display: impl Fn(Option<&V>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            extract: Box::new(extract),
            display: Box::new(display),
        }
    }
}

impl<V: 'static> ControlSurface<V> for FnSurface<V> {
    fn extract(&self) -> Option<V> {
        (self.extract)()
    }

    fn display(&self, value: Option<&V>) {
        (self.display)(value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
