use std::any::Any;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::{Arc, RwLock};

use super::{TitleFn, read_state, write_state};
use crate::form::{BindableInput, ControlSurface, Validation};

struct ComboState {
    selected: Option<usize>,
}

/// Non-editable single selection among fixed options.
pub struct ComboBox<T> {
    options: Arc<Vec<T>>,
    titles: TitleFn<T>,
    state: Arc<RwLock<ComboState>>,
}

impl<T> Clone for ComboBox<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            titles: self.titles.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Display> ComboBox<T> {
    pub fn new(options: impl IntoIterator<Item = T>) -> Self {
        Self::with_titles(options, |option: &T| option.to_string())
    }
}

impl<T> ComboBox<T> {
    pub fn with_titles(
        options: impl IntoIterator<Item = T>,
        titles: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            options: Arc::new(options.into_iter().collect()),
            titles: Arc::new(titles),
            state: Arc::new(RwLock::new(ComboState { selected: None })),
        }
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn titles(&self) -> Vec<String> {
        self.options.iter().map(|option| (self.titles)(option)).collect()
    }

    pub fn selected_index(&self) -> Option<usize> {
        read_state(&self.state).selected
    }

    /// Returns `false` for an out of range index.
    pub fn select(&self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        write_state(&self.state).selected = Some(index);
        true
    }

    pub fn clear_selection(&self) {
        write_state(&self.state).selected = None;
    }
}

impl<T> ComboBox<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Bindable input requiring a selection.
    pub fn bindable(&self, name: impl Into<String>) -> BindableInput<T> {
        BindableInput::new(name, self.clone()).rule(Validation::not_nil())
    }
}

impl<T> ControlSurface<T> for ComboBox<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn extract(&self) -> Option<T> {
        self.selected_index()
            .and_then(|index| self.options.get(index).cloned())
    }

    fn display(&self, value: Option<&T>) {
        let selected = value.and_then(|value| self.options.iter().position(|option| option == value));
        write_state(&self.state).selected = selected;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Multiple selection among fixed options, rendered as a table.
pub struct SelectionTable<T> {
    options: Arc<Vec<T>>,
    titles: TitleFn<T>,
    selected: Arc<RwLock<BTreeSet<usize>>>,
}

impl<T> Clone for SelectionTable<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            titles: self.titles.clone(),
            selected: self.selected.clone(),
        }
    }
}

impl<T: Display> SelectionTable<T> {
    pub fn new(options: impl IntoIterator<Item = T>) -> Self {
        Self::with_titles(options, |option: &T| option.to_string())
    }
}

impl<T> SelectionTable<T> {
    pub fn with_titles(
        options: impl IntoIterator<Item = T>,
        titles: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            options: Arc::new(options.into_iter().collect()),
            titles: Arc::new(titles),
            selected: Arc::new(RwLock::new(BTreeSet::new())),
        }
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn titles(&self) -> Vec<String> {
        self.options.iter().map(|option| (self.titles)(option)).collect()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        read_state(&self.selected).iter().copied().collect()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        read_state(&self.selected).contains(&index)
    }

    pub fn select(&self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        write_state(&self.selected).insert(index);
        true
    }

    pub fn deselect(&self, index: usize) -> bool {
        write_state(&self.selected).remove(&index)
    }

    /// Flips one row; returns the new selection state of the row.
    pub fn toggle(&self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        let mut selected = write_state(&self.selected);
        if !selected.remove(&index) {
            selected.insert(index);
            return true;
        }
        false
    }

    /// Replaces the selection, ignoring out of range indices.
    pub fn set_selection(&self, indices: impl IntoIterator<Item = usize>) {
        let len = self.options.len();
        *write_state(&self.selected) = indices.into_iter().filter(|index| *index < len).collect();
    }

    pub fn clear_selection(&self) {
        write_state(&self.selected).clear();
    }
}

impl<T> SelectionTable<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Bindable input requiring at least one selected row.
    pub fn bindable(&self, name: impl Into<String>) -> BindableInput<Vec<T>> {
        BindableInput::new(name, self.clone()).rule(Validation::not_empty_sequence())
    }
}

impl<T> ControlSurface<Vec<T>> for SelectionTable<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Selected options in option order.
    fn extract(&self) -> Option<Vec<T>> {
        let selected = read_state(&self.selected);
        Some(
            selected
                .iter()
                .filter_map(|index| self.options.get(*index).cloned())
                .collect(),
        )
    }

    fn display(&self, value: Option<&Vec<T>>) {
        let selected = match value {
            Some(values) => self
                .options
                .iter()
                .enumerate()
                .filter(|(_, option)| values.contains(option))
                .map(|(index, _)| index)
                .collect(),
            None => BTreeSet::new(),
        };
        *write_state(&self.selected) = selected;
    }

    fn is_blank(&self) -> bool {
        read_state(&self.selected).is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_box_requires_selection() {
        let combo = ComboBox::new(["red", "green", "blue"]);
        let input = combo.bindable("Color");
        assert!(!input.has_valid_value());

        input.set_value(Some("green"));
        assert_eq!(combo.selected_index(), Some(1));
        assert_eq!(input.value(), Some("green"));

        input.set_value(Some("purple"));
        assert_eq!(combo.selected_index(), None);
        assert!(!combo.select(3));
    }

    #[test]
    fn selection_table_extracts_in_option_order() {
        let table = SelectionTable::new([1, 2, 3, 4]);
        let input = table.bindable("Numbers");
        assert_eq!(input.raw_value(), Some(Vec::new()));
        assert!(!input.has_valid_value());

        table.select(3);
        table.select(0);
        assert_eq!(input.value(), Some(vec![1, 4]));

        input.set_value(Some(vec![3, 2, 9]));
        assert_eq!(table.selected_indices(), vec![1, 2]);
        assert!(!table.toggle(1));
        assert_eq!(input.value(), Some(vec![3]));
    }

    #[test]
    fn custom_titles() {
        let table = SelectionTable::with_titles([1u8, 2], |value: &u8| format!("#{value}"));
        assert_eq!(table.titles(), vec!["#1".to_string(), "#2".to_string()]);
    }
}
