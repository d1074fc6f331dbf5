use easydialogs::prelude::*;
use futures::executor::block_on;

fn english() {
    I18nManager::global().set_locale("en");
}

#[test]
fn ask_string_returns_typed_text() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_string(&dialogs, "Your name?", Some("Bob".to_string())).expect("ask");
    assert_eq!(prompt.control.text(), "Bob");
    assert_eq!(prompt.session.header(), Some("Your name?"));
    assert_eq!(dialogs.active_id().expect("active"), Some(prompt.session.id()));

    prompt.control.set_text("Alice");
    assert_eq!(
        prompt.session.confirm().expect("confirm"),
        ConfirmOutcome::Confirmed
    );
    assert_eq!(block_on(prompt.future), Ok("Alice".to_string()));
    assert_eq!(dialogs.active_id().expect("active"), None);
}

#[test]
fn ask_long_string_uses_multiline_field() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_long_string(&dialogs, "Notes", None).expect("ask");
    assert!(prompt.control.is_multiline());
    assert_eq!(prompt.control.min_height(), Some(300.0));

    prompt.control.set_text("line one\nline two");
    prompt.session.confirm().expect("confirm");
    assert_eq!(
        block_on(prompt.future),
        Ok("line one\nline two".to_string())
    );
}

#[test]
fn ask_integer_blocks_unparsable_input() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_integer(&dialogs, "How many?", None).expect("ask");

    prompt.control.set_text("twelve");
    assert_eq!(
        prompt.session.confirm().expect("confirm"),
        ConfirmOutcome::InvalidField("value".to_string())
    );
    assert_eq!(
        prompt.session.error_message().expect("error").as_deref(),
        Some("Error in field 'value'")
    );

    prompt.control.set_text(" 12 ");
    assert_eq!(
        prompt.session.confirm().expect("confirm"),
        ConfirmOutcome::Confirmed
    );
    assert_eq!(block_on(prompt.future), Ok(12));
}

#[test]
fn cancelled_question_aborts() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_decimal(&dialogs, "Amount?", None).expect("ask");
    assert_eq!(dialogs.close_active().expect("close"), Some(prompt.session.id()));
    assert_eq!(block_on(prompt.future), Err(AbortedError));
}

#[test]
fn ask_url_parses_on_confirm() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_url(&dialogs, "Where?", None).expect("ask");
    prompt.control.set_text("https://example.org/feed");
    prompt.session.confirm().expect("confirm");
    let url = block_on(prompt.future).expect("url");
    assert_eq!(url.host_str(), Some("example.org"));
}

#[test]
fn ask_bool_uses_message_as_check_box_title() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_bool(&dialogs, "Overwrite files", false).expect("ask");
    assert_eq!(prompt.control.title(), "Overwrite files");
    assert!(!prompt.control.is_checked());
    prompt.control.toggle();
    prompt.session.confirm().expect("confirm");
    assert_eq!(block_on(prompt.future), Ok(true));
}

#[test]
fn ask_choice_preselects_first_option() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_choice(&dialogs, "Color?", ["red", "green", "blue"], None).expect("ask");
    assert_eq!(prompt.control.selected_index(), Some(0));
    prompt.control.select(2);
    prompt.session.confirm().expect("confirm");
    assert_eq!(block_on(prompt.future), Ok("blue"));
}

#[test]
fn ask_choices_requires_a_selection() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_choices(&dialogs, "Pick some", [1, 2, 3, 4], Vec::new()).expect("ask");
    assert!(matches!(
        prompt.session.confirm().expect("confirm"),
        ConfirmOutcome::InvalidField(_)
    ));

    prompt.control.set_selection([3, 1]);
    assert_eq!(
        prompt.session.confirm().expect("confirm"),
        ConfirmOutcome::Confirmed
    );
    assert_eq!(block_on(prompt.future), Ok(vec![2, 4]));
}

#[test]
fn yes_no_cancel_buttons_in_order() {
    english();
    let dialogs = DialogScheduler::new();
    let prompt = ask_yes_no_cancel(&dialogs, "Save changes?").expect("ask");
    assert_eq!(prompt.dialog.titles(), vec!["Cancel", "No", "Yes"]);
    assert!(prompt.dialog.press(1).expect("press no"));
    assert_eq!(block_on(prompt.future), Ok(false));

    let prompt = ask_yes_no_cancel(&dialogs, "Save changes?").expect("ask");
    assert!(prompt.dialog.press(0).expect("press cancel"));
    assert_eq!(block_on(prompt.future), Err(AbortedError));
}

#[test]
fn second_question_waits_for_the_first() {
    english();
    let dialogs = DialogScheduler::new();
    let first = ask_yes_no(&dialogs, "First?").expect("first");
    let second = ask_string(&dialogs, "Second?", None).expect("second");
    assert_eq!(dialogs.active_id().expect("active"), Some(first.dialog.id()));
    assert_eq!(dialogs.queued_ids().expect("queued"), vec![second.session.id()]);
    assert_eq!(second.session.state().expect("state"), SessionState::Idle);

    first.dialog.press(1).expect("press yes");
    assert_eq!(second.session.state().expect("state"), SessionState::Presented);
    assert_eq!(block_on(first.future), Ok(true));

    second.control.set_text("later");
    second.session.confirm().expect("confirm");
    assert_eq!(block_on(second.future), Ok("later".to_string()));
}

#[test]
fn reject_policy_refuses_second_dialog() {
    english();
    let dialogs = DialogScheduler::with_policy(SchedulerPolicy::Reject);
    let first = ask_yes_no(&dialogs, "First?").expect("first");
    let Err(error) = ask_string(&dialogs, "Second?", None) else {
        panic!("second dialog should be rejected");
    };
    assert_eq!(
        error,
        FormError::ModalBusy {
            active: first.dialog.id()
        }
    );
    assert_eq!(dialogs.queued_len().expect("queued"), 0);
}
