//! Headless controls.
//!
//! Each control is a cloneable handle to shared state that a host toolkit
//! renders and mutates. Controls implement
//! [`ControlSurface`](crate::form::ControlSurface), so they plug straight
//! into a [`BindableInput`](crate::form::BindableInput).

mod custom_editor;
mod object_list;
mod selection;
mod text;
mod toggle;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use custom_editor::CustomEditor;
pub use object_list::{
    ColumnDefinition, ListAction, ListChangeListener, ObjectList, ToolbarButton,
};
pub use selection::{ComboBox, SelectionTable};
pub use text::TextField;
pub use toggle::CheckBox;

type TitleFn<T> = std::sync::Arc<dyn Fn(&T) -> String + Send + Sync>;

// A control must stay renderable after a panicking listener, so poisoned
// locks are recovered rather than reported.
fn read_state<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_state<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
