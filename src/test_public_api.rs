use crate::form::FormModel as _;
use futures::executor::block_on;
use rust_decimal::Decimal;

fn assert_modal<T: crate::modal::ModalDialog>() {}

#[test]
fn dialog_types_are_modal() {
    assert_modal::<crate::form::FormSession<String>>();
    assert_modal::<crate::dialogs::ButtonsDialog<bool>>();
    assert_modal::<crate::dialogs::ProgressDialog>();
}

#[test]
fn prelude_smoke_builds_core_controls() {
    use crate::prelude::*;

    let _ = TextField::<String>::new().bindable("text");
    let _ = TextField::<String>::multiline().bindable("long text");
    let _ = CheckBox::new("check").bindable("flag");
    let _ = ComboBox::new(["a", "b"]).bindable("choice");
    let _ = SelectionTable::new([1, 2, 3]).bindable("choices");
    let _ = ObjectList::new(vec!["x".to_string()]).bindable("list");
    let _ = ProgressOptions::default().message("working");
    let _ = DialogScheduler::with_policy(SchedulerPolicy::Reject);
    let _ = LogStyle::Info.format("line");
}

#[derive(Clone, Default, crate::form::FormModel)]
struct ApiSmokeForm {
    title: String,
    enabled: bool,
    amount: Decimal,
}

#[test]
fn derived_model_binds_through_public_api() {
    use crate::prelude::*;

    let fields = ApiSmokeForm::fields();
    let title = TextField::<String>::new();
    let enabled = CheckBox::new("Enabled");
    let amount = TextField::<Decimal>::new();
    let bindings = BindingSet::new()
        .with(PropertyBinding::new(
            fields.title(),
            title
                .bindable(fields.title().display_name())
                .rule(Validation::not_empty_string()),
        ))
        .with(PropertyBinding::with_control(fields.enabled(), enabled.clone()))
        .with(PropertyBinding::with_control(fields.amount(), amount.clone()));

    let dialogs = DialogScheduler::new();
    let (session, future) = bindings.into_form(Some("Smoke".to_string()), None).into_future();
    dialogs.present(session.clone()).expect("present smoke form");
    assert_eq!(
        dialogs.active_id().expect("active"),
        Some(session.id())
    );

    title.set_text("Budget");
    enabled.set_checked(true);
    amount.set_text("12.50");
    assert_eq!(session.confirm().expect("confirm"), ConfirmOutcome::Confirmed);
    assert_eq!(dialogs.active_id().expect("active"), None);

    let form = block_on(future).expect("confirmed form");
    assert_eq!(form.title, "Budget");
    assert!(form.enabled);
    assert_eq!(form.amount, Decimal::new(1250, 2));
}
