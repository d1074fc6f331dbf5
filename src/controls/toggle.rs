use std::any::Any;
use std::sync::{Arc, RwLock};

use super::{read_state, write_state};
use crate::form::{BindableInput, ControlSurface};

#[derive(Clone, Debug, Default)]
struct CheckState {
    title: String,
    checked: bool,
}

/// A titled check box. Always extracts a value.
#[derive(Clone, Debug, Default)]
pub struct CheckBox {
    state: Arc<RwLock<CheckState>>,
}

impl CheckBox {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CheckState {
                title: title.into(),
                checked: false,
            })),
        }
    }

    pub fn title(&self) -> String {
        read_state(&self.state).title.clone()
    }

    pub fn is_checked(&self) -> bool {
        read_state(&self.state).checked
    }

    pub fn set_checked(&self, checked: bool) {
        write_state(&self.state).checked = checked;
    }

    pub fn toggle(&self) -> bool {
        let mut state = write_state(&self.state);
        state.checked = !state.checked;
        state.checked
    }

    pub fn bindable(&self, name: impl Into<String>) -> BindableInput<bool> {
        BindableInput::new(name, self.clone())
    }
}

impl ControlSurface<bool> for CheckBox {
    fn extract(&self) -> Option<bool> {
        Some(self.is_checked())
    }

    fn display(&self, value: Option<&bool>) {
        self.set_checked(value.copied().unwrap_or(false));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_unchecks() {
        let check = CheckBox::new("Remember me");
        let input = check.bindable("remember").with_value(Some(true));
        assert!(check.is_checked());
        input.set_value(None);
        assert_eq!(input.value(), Some(false));
        assert!(check.toggle());
    }
}
