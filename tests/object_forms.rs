use easydialogs::form::FormModel as _;
use easydialogs::prelude::*;
use futures::executor::block_on;

#[derive(Clone, Debug, Default, PartialEq, easydialogs::form::FormModel)]
struct Contact {
    #[field(name = "Name")]
    name: String,
    age: u32,
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.age)
    }
}

fn contact_factory() -> BindingsFactory<Contact> {
    let fields = Contact::fields();
    BindingsFactory::new()
        .binding(move || {
            PropertyBinding::new(
                fields.name(),
                TextField::<String>::new()
                    .bindable(fields.name().display_name())
                    .rule(Validation::not_empty_string()),
            )
        })
        .binding(move || PropertyBinding::with_control(fields.age(), TextField::<u32>::new()))
}

fn text_control<V: 'static>(session: &FormSession<Contact>, index: usize) -> TextField<V> {
    session.inputs()[index]
        .control()
        .downcast_ref::<TextField<V>>()
        .expect("text control")
        .clone()
}

fn active_contact_form(dialogs: &DialogScheduler) -> FormSession<Contact> {
    dialogs
        .active_form::<Contact>()
        .expect("scheduler")
        .expect("active contact form")
}

#[test]
fn object_form_creates_a_new_object() {
    let dialogs = DialogScheduler::new();
    let (session, future) = contact_factory()
        .object_form(Some("New contact".to_string()), None)
        .into_future();
    dialogs.present(session.clone()).expect("present");

    text_control::<String>(&session, 0).set_text("Ann");
    text_control::<u32>(&session, 1).set_text("29");
    assert_eq!(session.confirm().expect("confirm"), ConfirmOutcome::Confirmed);
    assert_eq!(
        block_on(future),
        Ok(Contact {
            name: "Ann".to_string(),
            age: 29,
        })
    );
}

#[test]
fn list_create_appends_confirmed_object() {
    let dialogs = DialogScheduler::new();
    let factory = contact_factory();
    let list = ObjectList::new(Vec::<Contact>::new())
        .creation_handler(factory.creation_handler(dialogs.clone(), None));

    assert!(list.perform(ListAction::Create, &dialogs).expect("create"));
    let form = active_contact_form(&dialogs);
    assert_eq!(form.confirm().expect("empty name"), ConfirmOutcome::InvalidField("Name".to_string()));

    text_control::<String>(&form, 0).set_text("Ben");
    text_control::<u32>(&form, 1).set_text("41");
    assert_eq!(form.confirm().expect("confirm"), ConfirmOutcome::Confirmed);
    assert_eq!(
        list.entries(),
        vec![Contact {
            name: "Ben".to_string(),
            age: 41,
        }]
    );
}

#[test]
fn cancelled_creation_leaves_list_untouched() {
    let dialogs = DialogScheduler::new();
    let list = ObjectList::new(Vec::<Contact>::new())
        .creation_handler(contact_factory().creation_handler(dialogs.clone(), None));

    assert!(list.create());
    dialogs.close_active().expect("close");
    assert!(list.is_empty());
}

#[test]
fn list_edit_replaces_the_selected_row() {
    let dialogs = DialogScheduler::new();
    let factory = contact_factory();
    let first = Contact {
        name: "Cy".to_string(),
        age: 20,
    };
    let second = Contact {
        name: "Di".to_string(),
        age: 30,
    };
    let list = ObjectList::new(vec![first.clone(), second.clone()])
        .edit_handler(factory.edit_handler(dialogs.clone(), Some("Edit".to_string())));

    assert!(!list.perform(ListAction::Edit, &dialogs).expect("edit without selection"));
    list.select(1);
    assert!(list.perform(ListAction::Edit, &dialogs).expect("edit"));

    let form = active_contact_form(&dialogs);
    assert_eq!(form.header(), Some("Edit"));
    let age = text_control::<u32>(&form, 1);
    assert_eq!(age.text(), "30");
    age.set_text("31");
    form.confirm().expect("confirm");

    assert_eq!(
        list.entries(),
        vec![
            first,
            Contact {
                age: 31,
                ..second
            }
        ]
    );
}

#[test]
fn list_pick_appends_selected_objects() {
    let dialogs = DialogScheduler::new();
    let pool = vec![
        Contact {
            name: "Eve".to_string(),
            age: 1,
        },
        Contact {
            name: "Fay".to_string(),
            age: 2,
        },
    ];
    let list = ObjectList::new(Vec::<Contact>::new()).possible_objects(pool.clone());

    let session = list
        .pick(&dialogs)
        .expect("pick")
        .expect("pick form for non-empty pool");
    let table = session.inputs()[0]
        .control()
        .downcast_ref::<SelectionTable<Contact>>()
        .expect("selection table")
        .clone();
    assert_eq!(table.titles(), vec!["Eve (1)", "Fay (2)"]);
    table.select(1);
    session.confirm().expect("confirm");
    assert_eq!(list.entries(), vec![pool[1].clone()]);
}

#[test]
fn list_as_form_field_round_trips() {
    let list = ObjectList::new(vec!["a".to_string()]);
    let input = list.bindable("Tags");
    let (session, future) =
        FormSession::builder([input.erased()], move || input.value()).into_future();
    session.present().expect("present");

    list.add("b".to_string());
    list.select(1);
    assert!(list.move_selected_up());
    session.confirm().expect("confirm");
    assert_eq!(
        block_on(future),
        Ok(vec!["b".to_string(), "a".to_string()])
    );
}
