use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use super::input::{BindableInput, ControlSurface, InputView};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Getter/setter pair addressing one field of `T`.
pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    fn key(self) -> FieldKey;

    /// Name shown in validation errors.
    fn display_name(self) -> &'static str {
        self.key().as_str()
    }

    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

pub trait FormModel: Sized {
    type Fields;

    fn fields() -> Self::Fields;
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BindingError {
    #[error("field '{field}' has no valid value")]
    UnexpectedNilValue { field: String },
}

/// Type-erased link between one field of `T` and one input.
pub trait ObjectBinding<T>: Send + Sync {
    /// Pushes the field value into the input; `None` clears it. Never validates.
    fn read(&self, object: Option<&T>);
    fn write(&self, object: &mut T) -> Result<(), BindingError>;
    fn input(&self) -> Arc<dyn InputView>;
}

pub struct PropertyBinding<T, L>
where
    L: FieldLens<T>,
{
    lens: L,
    input: BindableInput<L::Value>,
}

impl<T, L> PropertyBinding<T, L>
where
    T: 'static,
    L: FieldLens<T>,
{
    pub fn new(lens: L, input: BindableInput<L::Value>) -> Self {
        Self { lens, input }
    }

    /// Binds `control` through an input named after the field.
    pub fn with_control(lens: L, control: impl ControlSurface<L::Value>) -> Self {
        Self::new(lens, BindableInput::new(lens.display_name(), control))
    }

    pub fn typed_input(&self) -> &BindableInput<L::Value> {
        &self.input
    }

    pub fn boxed(self) -> Box<dyn ObjectBinding<T>> {
        Box::new(self)
    }
}

impl<T, L> ObjectBinding<T> for PropertyBinding<T, L>
where
    T: 'static,
    L: FieldLens<T>,
{
    fn read(&self, object: Option<&T>) {
        self.input
            .set_value(object.map(|object| self.lens.get(object).clone()));
    }

    fn write(&self, object: &mut T) -> Result<(), BindingError> {
        let Some(value) = self.input.value() else {
            return Err(BindingError::UnexpectedNilValue {
                field: self.input.name().to_string(),
            });
        };
        self.lens.set(object, value);
        Ok(())
    }

    fn input(&self) -> Arc<dyn InputView> {
        self.input.erased()
    }
}

/// Binding for an optional field. A blank control or a missing value is
/// written as `None`, so `None` survives a read/write round trip. The price is
/// that `Some("")` in a text field comes back as `None`.
pub struct OptionalPropertyBinding<T, L, V>
where
    L: FieldLens<T, Value = Option<V>>,
{
    lens: L,
    input: BindableInput<V>,
    _object: PhantomData<fn(&mut T)>,
}

impl<T, L, V> OptionalPropertyBinding<T, L, V>
where
    T: 'static,
    L: FieldLens<T, Value = Option<V>>,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(lens: L, input: BindableInput<V>) -> Self {
        Self {
            lens,
            input,
            _object: PhantomData,
        }
    }

    pub fn with_control(lens: L, control: impl ControlSurface<V>) -> Self {
        Self::new(lens, BindableInput::new(lens.display_name(), control))
    }

    pub fn typed_input(&self) -> &BindableInput<V> {
        &self.input
    }

    pub fn boxed(self) -> Box<dyn ObjectBinding<T>> {
        Box::new(self)
    }
}

impl<T, L, V> ObjectBinding<T> for OptionalPropertyBinding<T, L, V>
where
    T: 'static,
    L: FieldLens<T, Value = Option<V>>,
    V: Clone + Send + Sync + 'static,
{
    fn read(&self, object: Option<&T>) {
        self.input
            .set_value(object.and_then(|object| self.lens.get(object).clone()));
    }

    fn write(&self, object: &mut T) -> Result<(), BindingError> {
        let value = if self.input.is_blank() {
            None
        } else {
            self.input.value()
        };
        self.lens.set(object, value);
        Ok(())
    }

    fn input(&self) -> Arc<dyn InputView> {
        self.input.erased()
    }
}

/// Ordered bindings over one object type.
pub struct BindingSet<T> {
    bindings: Vec<Box<dyn ObjectBinding<T>>>,
}

impl<T> Default for BindingSet<T> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<T> BindingSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, binding: impl ObjectBinding<T> + 'static) -> Self {
        self.bindings.push(Box::new(binding));
        self
    }

    pub fn push(&mut self, binding: Box<dyn ObjectBinding<T>>) {
        self.bindings.push(binding);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn inputs(&self) -> Vec<Arc<dyn InputView>> {
        self.bindings.iter().map(|binding| binding.input()).collect()
    }

    pub fn read_all(&self, object: Option<&T>) {
        for binding in &self.bindings {
            binding.read(object);
        }
    }

    /// Applies bindings in order and stops at the first failure. Bindings
    /// before the failing one have already mutated `object`; discard it.
    pub fn write_all(&self, object: &mut T) -> Result<(), BindingError> {
        for binding in &self.bindings {
            binding.write(object)?;
        }
        Ok(())
    }

    /// Materializes an object from `initial` (or `T::default()`) plus the
    /// current input values.
    pub fn create_object(&self, initial: Option<&T>) -> Result<T, BindingError>
    where
        T: Clone + Default,
    {
        let mut object = initial.cloned().unwrap_or_default();
        if let Err(error) = self.write_all(&mut object) {
            debug!(%error, "object materialization failed");
            return Err(error);
        }
        Ok(object)
    }
}

impl<T> FromIterator<Box<dyn ObjectBinding<T>>> for BindingSet<T> {
    fn from_iter<I: IntoIterator<Item = Box<dyn ObjectBinding<T>>>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

type BindingFactoryFn<T> = Arc<dyn Fn() -> Box<dyn ObjectBinding<T>> + Send + Sync>;

/// Produces a fresh [`BindingSet`] (with fresh controls) for every form.
pub struct BindingsFactory<T> {
    factories: Vec<BindingFactoryFn<T>>,
}

impl<T> Clone for BindingsFactory<T> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

impl<T> Default for BindingsFactory<T> {
    fn default() -> Self {
        Self {
            factories: Vec::new(),
        }
    }
}

impl<T> BindingsFactory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding<F, B>(mut self, factory: F) -> Self
    where
        F: Fn() -> B + Send + Sync + 'static,
        B: ObjectBinding<T> + 'static,
    {
        self.factories
            .push(Arc::new(move || Box::new(factory()) as Box<dyn ObjectBinding<T>>));
        self
    }

    pub fn instantiate(&self) -> BindingSet<T> {
        self.factories.iter().map(|factory| factory()).collect()
    }
}
