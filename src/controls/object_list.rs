use std::any::Any;
use std::collections::BTreeSet;
use std::fmt::{self, Display};
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::{SelectionTable, TitleFn, read_state, write_state};
use crate::form::{
    BindableInput, ControlSurface, FormResult, FormSession, ObjectCreationHandler,
    ObjectEditHandler,
};
use crate::i18n::{I18nManager, keys};
use crate::modal::DialogScheduler;
use crate::response::InputResponse;

pub type ListChangeListener<T> = Arc<dyn Fn(&[T]) + Send + Sync>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListAction {
    Create,
    Pick,
    Edit,
    Remove,
    MoveUp,
    MoveDown,
}

impl ListAction {
    fn tooltip_key(self) -> &'static str {
        match self {
            Self::Create => keys::LIST_CREATE,
            Self::Pick => keys::LIST_PICK,
            Self::Edit => keys::LIST_EDIT,
            Self::Remove => keys::LIST_REMOVE,
            Self::MoveUp => keys::LIST_MOVE_UP,
            Self::MoveDown => keys::LIST_MOVE_DOWN,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolbarButton {
    pub action: ListAction,
    pub tooltip: String,
    pub enabled: bool,
}

/// One table column: a header and the cell text of each row.
pub struct ColumnDefinition<T> {
    name: Option<String>,
    value: TitleFn<T>,
}

impl<T> Clone for ColumnDefinition<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("name", &self.name)
            .finish()
    }
}

impl<T> ColumnDefinition<T> {
    pub fn new(
        name: impl Into<String>,
        value: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Some(name.into()),
            value: Arc::new(value),
        }
    }

    /// The single default column, headed by the localized "Value".
    fn value_column(value: TitleFn<T>) -> Self {
        Self { name: None, value }
    }

    pub fn cell(&self, object: &T) -> String {
        (self.value)(object)
    }
}

fn cell_of<T>(column: Option<&ColumnDefinition<T>>, object: &T) -> String {
    column.map(|column| column.cell(object)).unwrap_or_default()
}

struct ListState<T> {
    entries: Vec<T>,
    selected: BTreeSet<usize>,
}

/// Ordered list editor with a create/pick/edit/remove/move toolbar.
pub struct ObjectList<T> {
    state: Arc<RwLock<ListState<T>>>,
    listener: Arc<RwLock<Option<ListChangeListener<T>>>>,
    columns: Arc<Vec<ColumnDefinition<T>>>,
    possible_objects: Arc<Vec<T>>,
    creation: Option<ObjectCreationHandler<T>>,
    edit: Option<ObjectEditHandler<T>>,
    max_rows: usize,
    i18n: I18nManager,
}

impl<T> Clone for ObjectList<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            listener: self.listener.clone(),
            columns: self.columns.clone(),
            possible_objects: self.possible_objects.clone(),
            creation: self.creation.clone(),
            edit: self.edit.clone(),
            max_rows: self.max_rows,
            i18n: self.i18n.clone(),
        }
    }
}

impl<T: Display> ObjectList<T> {
    pub fn new(initial: impl IntoIterator<Item = T>) -> Self {
        Self::with_titles(initial, |object: &T| object.to_string())
    }
}

impl<T> ObjectList<T> {
    pub fn with_titles(
        initial: impl IntoIterator<Item = T>,
        titles: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(ListState {
                entries: initial.into_iter().collect(),
                selected: BTreeSet::new(),
            })),
            listener: Arc::new(RwLock::new(None)),
            columns: Arc::new(vec![ColumnDefinition::value_column(Arc::new(titles))]),
            possible_objects: Arc::new(Vec::new()),
            creation: None,
            edit: None,
            max_rows: 10,
            i18n: I18nManager::global(),
        }
    }

    /// Replaces the default "Value" column. An empty list keeps it.
    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDefinition<T>>) -> Self {
        let columns: Vec<_> = columns.into_iter().collect();
        if !columns.is_empty() {
            self.columns = Arc::new(columns);
        }
        self
    }

    /// Objects offered by the pick action.
    pub fn possible_objects(mut self, objects: impl IntoIterator<Item = T>) -> Self {
        self.possible_objects = Arc::new(objects.into_iter().collect());
        self
    }

    pub fn creation_handler(mut self, handler: ObjectCreationHandler<T>) -> Self {
        self.creation = Some(handler);
        self
    }

    pub fn edit_handler(mut self, handler: ObjectEditHandler<T>) -> Self {
        self.edit = Some(handler);
        self
    }

    pub fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows;
        self
    }

    pub fn i18n(mut self, i18n: I18nManager) -> Self {
        self.i18n = i18n;
        self
    }

    pub fn on_change(self, listener: impl Fn(&[T]) + Send + Sync + 'static) -> Self {
        *write_state(&self.listener) = Some(Arc::new(listener));
        self
    }

    pub fn visible_rows(&self) -> usize {
        self.max_rows
    }

    pub fn len(&self) -> usize {
        read_state(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        read_state(&self.state).entries.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| match &column.name {
                Some(name) => name.clone(),
                None => self.i18n.text(keys::LIST_VALUE_COLUMN),
            })
            .collect()
    }

    /// Cell text of every row, one entry per column.
    pub fn cells(&self) -> Vec<Vec<String>> {
        read_state(&self.state)
            .entries
            .iter()
            .map(|entry| self.columns.iter().map(|column| column.cell(entry)).collect())
            .collect()
    }

    /// Text of the first column per row.
    pub fn titles(&self) -> Vec<String> {
        read_state(&self.state)
            .entries
            .iter()
            .map(|entry| cell_of(self.columns.first(), entry))
            .collect()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        read_state(&self.state).selected.iter().copied().collect()
    }

    pub fn select(&self, index: usize) -> bool {
        let mut state = write_state(&self.state);
        if index >= state.entries.len() {
            return false;
        }
        state.selected.insert(index);
        true
    }

    pub fn set_selection(&self, indices: impl IntoIterator<Item = usize>) {
        let mut state = write_state(&self.state);
        let len = state.entries.len();
        state.selected = indices.into_iter().filter(|index| *index < len).collect();
    }

    pub fn clear_selection(&self) {
        write_state(&self.state).selected.clear();
    }

    pub fn toolbar(&self) -> Vec<ToolbarButton> {
        let has_selection = !read_state(&self.state).selected.is_empty();
        let mut actions = Vec::with_capacity(6);
        if self.creation.is_some() {
            actions.push((ListAction::Create, true));
        }
        if !self.possible_objects.is_empty() {
            actions.push((ListAction::Pick, true));
        }
        if self.edit.is_some() {
            actions.push((ListAction::Edit, has_selection));
        }
        actions.extend([
            (ListAction::Remove, has_selection),
            (ListAction::MoveUp, has_selection),
            (ListAction::MoveDown, has_selection),
        ]);
        actions
            .into_iter()
            .map(|(action, enabled)| ToolbarButton {
                action,
                tooltip: self.i18n.text(action.tooltip_key()),
                enabled,
            })
            .collect()
    }
}

impl<T> ObjectList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn entries(&self) -> Vec<T> {
        read_state(&self.state).entries.clone()
    }

    pub fn bindable(&self, name: impl Into<String>) -> BindableInput<Vec<T>> {
        BindableInput::new(name, self.clone())
    }

    pub fn add(&self, object: T) {
        write_state(&self.state).entries.push(object);
        self.notify();
    }

    pub fn extend(&self, objects: impl IntoIterator<Item = T>) {
        write_state(&self.state).entries.extend(objects);
        self.notify();
    }

    /// Replaces `original` with `edited`, appending when `original` is gone.
    pub fn replace(&self, original: &T, edited: T) {
        {
            let mut state = write_state(&self.state);
            match state.entries.iter().position(|entry| entry == original) {
                Some(index) => state.entries[index] = edited,
                None => state.entries.push(edited),
            }
        }
        self.notify();
    }

    pub fn remove_selected(&self) -> usize {
        let removed = {
            let mut state = write_state(&self.state);
            let selected = std::mem::take(&mut state.selected);
            let before = state.entries.len();
            let mut index = 0;
            state.entries.retain(|_| {
                let keep = !selected.contains(&index);
                index += 1;
                keep
            });
            before - state.entries.len()
        };
        if removed > 0 {
            self.notify();
        }
        removed
    }

    /// Moves every selected row one step up. Rows already packed at the top
    /// stay put and the selection keeps its relative order.
    pub fn move_selected_up(&self) -> bool {
        let moved = {
            let mut state = write_state(&self.state);
            let ListState { entries, selected } = &mut *state;
            let mut next = BTreeSet::new();
            let mut min_target = 0;
            let mut moved = false;
            for &index in selected.iter() {
                if index > min_target {
                    entries.swap(index, index - 1);
                    next.insert(index - 1);
                    min_target = index;
                    moved = true;
                } else {
                    next.insert(index);
                    min_target = index + 1;
                }
            }
            *selected = next;
            moved
        };
        if moved {
            self.notify();
        }
        moved
    }

    pub fn move_selected_down(&self) -> bool {
        let moved = {
            let mut state = write_state(&self.state);
            let ListState { entries, selected } = &mut *state;
            let mut next = BTreeSet::new();
            let mut max_target = entries.len().saturating_sub(1);
            let mut moved = false;
            for &index in selected.iter().rev() {
                if index < max_target {
                    entries.swap(index, index + 1);
                    next.insert(index + 1);
                    max_target = index;
                    moved = true;
                } else {
                    next.insert(index);
                    max_target = index.saturating_sub(1);
                }
            }
            *selected = next;
            moved
        };
        if moved {
            self.notify();
        }
        moved
    }

    /// Runs the creation handler; the created object is appended.
    pub fn create(&self) -> bool {
        let Some(handler) = self.creation.clone() else {
            return false;
        };
        let list = self.clone();
        handler(Box::new(move |created| {
            if let Some(created) = created {
                list.add(created);
            }
        }));
        true
    }

    /// Edits the first selected row.
    pub fn edit_selected(&self) -> bool {
        let first = read_state(&self.state).selected.first().copied();
        first.is_some_and(|index| self.edit_at(index))
    }

    /// Edits the row at `index`, as a double click does.
    pub fn edit_at(&self, index: usize) -> bool {
        let Some(handler) = self.edit.clone() else {
            return false;
        };
        let Some(original) = read_state(&self.state).entries.get(index).cloned() else {
            return false;
        };
        let list = self.clone();
        let key = original.clone();
        handler(
            original,
            Box::new(move |edited| {
                if let Some(edited) = edited {
                    list.replace(&key, edited);
                }
            }),
        );
        true
    }

    /// Asks for a subset of the possible objects and appends the picks.
    pub fn pick(&self, dialogs: &DialogScheduler) -> FormResult<Option<FormSession<Vec<T>>>> {
        if self.possible_objects.is_empty() {
            return Ok(None);
        }
        let column = self.columns.first().cloned();
        let table = SelectionTable::with_titles(
            self.possible_objects.iter().cloned(),
            move |object: &T| cell_of(column.as_ref(), object),
        );
        let list = self.clone();
        let session = table.bindable(self.i18n.text(keys::VALUE_FIELD)).ask_in_form(
            dialogs,
            self.i18n.text(keys::LIST_PICK_ITEMS),
            move |response| {
                if let InputResponse::Confirmed(objects) = response {
                    list.extend(objects);
                }
            },
        )?;
        Ok(Some(session))
    }

    /// Toolbar dispatch. Returns whether the action did anything.
    pub fn perform(&self, action: ListAction, dialogs: &DialogScheduler) -> FormResult<bool> {
        debug!(?action, "object list action");
        Ok(match action {
            ListAction::Create => self.create(),
            ListAction::Pick => self.pick(dialogs)?.is_some(),
            ListAction::Edit => self.edit_selected(),
            ListAction::Remove => self.remove_selected() > 0,
            ListAction::MoveUp => self.move_selected_up(),
            ListAction::MoveDown => self.move_selected_down(),
        })
    }

    fn notify(&self) {
        let listener = read_state(&self.listener).clone();
        if let Some(listener) = listener {
            let entries = self.entries();
            listener(&entries);
        }
    }
}

impl<T> ControlSurface<Vec<T>> for ObjectList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn extract(&self) -> Option<Vec<T>> {
        Some(self.entries())
    }

    fn display(&self, value: Option<&Vec<T>>) {
        let mut state = write_state(&self.state);
        state.entries = value.cloned().unwrap_or_default();
        state.selected.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
