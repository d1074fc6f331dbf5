use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A pure predicate over a possibly missing value.
pub trait InputValidation<V>: Send + Sync {
    fn validate(&self, value: Option<&V>) -> bool;

    /// Type-erased form, storable next to rules of other concrete types.
    fn erased(self) -> AnyValidation<V>
    where
        Self: Sized + 'static,
        V: 'static,
    {
        AnyValidation::new(self)
    }
}

/// Collections with an emptiness check, for [`NotEmptySequence`].
pub trait IsEmpty {
    fn is_empty(&self) -> bool;
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T> IsEmpty for VecDeque<T> {
    fn is_empty(&self) -> bool {
        VecDeque::is_empty(self)
    }
}

impl<T> IsEmpty for BTreeSet<T> {
    fn is_empty(&self) -> bool {
        BTreeSet::is_empty(self)
    }
}

impl<T, S> IsEmpty for HashSet<T, S> {
    fn is_empty(&self) -> bool {
        HashSet::is_empty(self)
    }
}

impl IsEmpty for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NotNil;

impl<V> InputValidation<V> for NotNil {
    fn validate(&self, value: Option<&V>) -> bool {
        value.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NotEmptyString;

impl InputValidation<String> for NotEmptyString {
    fn validate(&self, value: Option<&String>) -> bool {
        value.is_some_and(|text| !text.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NotEmptySequence;

impl<S> InputValidation<S> for NotEmptySequence
where
    S: IsEmpty,
{
    fn validate(&self, value: Option<&S>) -> bool {
        value.is_some_and(|sequence| !sequence.is_empty())
    }
}

pub struct Custom<V, F> {
    predicate: F,
    _value: PhantomData<fn(&V)>,
}

impl<V, F> InputValidation<V> for Custom<V, F>
where
    F: Fn(Option<&V>) -> bool + Send + Sync,
{
    fn validate(&self, value: Option<&V>) -> bool {
        (self.predicate)(value)
    }
}

/// Constructors for the standard rules.
pub struct Validation;

impl Validation {
    pub fn not_nil<V: 'static>() -> AnyValidation<V> {
        NotNil.erased()
    }

    pub fn not_empty_string() -> AnyValidation<String> {
        NotEmptyString.erased()
    }

    pub fn not_empty_sequence<S: IsEmpty + 'static>() -> AnyValidation<S> {
        NotEmptySequence.erased()
    }

    pub fn custom<V, F>(predicate: F) -> AnyValidation<V>
    where
        V: 'static,
        F: Fn(Option<&V>) -> bool + Send + Sync + 'static,
    {
        Custom {
            predicate,
            _value: PhantomData,
        }
        .erased()
    }
}

type ValidateFn<V> = Arc<dyn Fn(Option<&V>) -> bool + Send + Sync>;

pub struct AnyValidation<V> {
    validate: ValidateFn<V>,
}

impl<V> AnyValidation<V> {
    pub fn new<U>(rule: U) -> Self
    where
        U: InputValidation<V> + 'static,
        V: 'static,
    {
        Self {
            validate: Arc::new(move |value: Option<&V>| rule.validate(value)),
        }
    }
}

impl<V> Clone for AnyValidation<V> {
    fn clone(&self) -> Self {
        Self {
            validate: self.validate.clone(),
        }
    }
}

impl<V> fmt::Debug for AnyValidation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnyValidation")
    }
}

impl<V> InputValidation<V> for AnyValidation<V> {
    fn validate(&self, value: Option<&V>) -> bool {
        (self.validate)(value)
    }

    fn erased(self) -> AnyValidation<V>
    where
        Self: Sized + 'static,
        V: 'static,
    {
        self
    }
}

/// Ordered rules; a value passes when every rule passes.
pub struct ValidationRules<V> {
    rules: Vec<AnyValidation<V>>,
}

impl<V> Default for ValidationRules<V> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<V> Clone for ValidationRules<V> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<V> fmt::Debug for ValidationRules<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRules")
            .field("len", &self.rules.len())
            .finish()
    }
}

impl<V> ValidationRules<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: AnyValidation<V>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: AnyValidation<V>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Short-circuits on the first failing rule.
    pub fn validate(&self, value: Option<&V>) -> bool {
        self.rules.iter().all(|rule| rule.validate(value))
    }
}

impl<V> FromIterator<AnyValidation<V>> for ValidationRules<V> {
    fn from_iter<I: IntoIterator<Item = AnyValidation<V>>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<V> Extend<AnyValidation<V>> for ValidationRules<V> {
    fn extend<I: IntoIterator<Item = AnyValidation<V>>>(&mut self, iter: I) {
        self.rules.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_rule_set_accepts_everything() {
        let rules = ValidationRules::<i32>::new();
        assert!(rules.validate(None));
        assert!(rules.validate(Some(&-1)));
    }

    #[test]
    fn standard_rules() {
        assert!(!Validation::not_nil::<i32>().validate(None));
        assert!(Validation::not_nil::<i32>().validate(Some(&0)));

        let not_empty = Validation::not_empty_string();
        assert!(!not_empty.validate(None));
        assert!(!not_empty.validate(Some(&String::new())));
        assert!(not_empty.validate(Some(&"x".to_string())));

        let sequence = Validation::not_empty_sequence::<Vec<u8>>();
        assert!(!sequence.validate(Some(&Vec::new())));
        assert!(sequence.validate(Some(&vec![1])));
    }

    #[test]
    fn rule_set_requires_every_rule() {
        let rules = ValidationRules::new()
            .with(Validation::not_nil())
            .with(Validation::custom(|value: Option<&i32>| {
                value.is_some_and(|v| *v > 10)
            }));
        assert!(!rules.validate(None));
        assert!(!rules.validate(Some(&5)));
        assert!(rules.validate(Some(&11)));
    }

    #[test]
    fn first_failure_stops_evaluation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let rules: ValidationRules<i32> = [
            Validation::custom(|_: Option<&i32>| false),
            Validation::custom(move |_: Option<&i32>| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        ]
        .into_iter()
        .collect();

        assert!(!rules.validate(Some(&1)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
