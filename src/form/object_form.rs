use std::sync::Arc;

use tracing::warn;

use super::binding::{BindingSet, BindingsFactory};
use super::session::{FormSession, FormSessionBuilder};
use crate::modal::DialogScheduler;

/// Receives the created or edited object, `None` when the form was cancelled.
pub type ObjectReadyCallback<T> = Box<dyn FnOnce(Option<T>) + Send>;
pub type ObjectCreationHandler<T> = Arc<dyn Fn(ObjectReadyCallback<T>) + Send + Sync>;
pub type ObjectEditHandler<T> = Arc<dyn Fn(T, ObjectReadyCallback<T>) + Send + Sync>;

impl<T> BindingSet<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    /// Populates the inputs from `initial` and returns a form whose result is
    /// `initial` (or a default object) with every binding written into it.
    pub fn into_form(self, header: Option<String>, initial: Option<T>) -> FormSessionBuilder<T> {
        self.read_all(initial.as_ref());
        let inputs = self.inputs();
        FormSession::builder(inputs, move || self.create_object(initial.as_ref()).ok())
            .maybe_header(header)
    }
}

impl<T> BindingsFactory<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    pub fn object_form(&self, header: Option<String>, initial: Option<T>) -> FormSessionBuilder<T> {
        self.instantiate().into_form(header, initial)
    }

    pub fn creation_handler(
        &self,
        dialogs: DialogScheduler,
        header: Option<String>,
    ) -> ObjectCreationHandler<T> {
        let factory = self.clone();
        Arc::new(move |ready: ObjectReadyCallback<T>| {
            factory.present_form(&dialogs, header.clone(), None, ready)
        })
    }

    pub fn edit_handler(
        &self,
        dialogs: DialogScheduler,
        header: Option<String>,
    ) -> ObjectEditHandler<T> {
        let factory = self.clone();
        Arc::new(move |object: T, ready: ObjectReadyCallback<T>| {
            factory.present_form(&dialogs, header.clone(), Some(object), ready)
        })
    }

    fn present_form(
        &self,
        dialogs: &DialogScheduler,
        header: Option<String>,
        initial: Option<T>,
        ready: ObjectReadyCallback<T>,
    ) {
        let session = self
            .object_form(header, initial)
            .on_response(move |response| ready(response.into_value()))
            .build();
        if let Err(error) = dialogs.present(session.clone()) {
            warn!(dialog = %session.id(), %error, "object form could not be presented");
            if let Err(error) = session.cancel() {
                warn!(dialog = %session.id(), %error, "object form could not be cancelled");
            }
        }
    }
}
