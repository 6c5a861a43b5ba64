mod helpers;

use chrono::{Duration, NaiveDate};
use event_sessions_domain::RRuleFrequency;
use event_sessions_editor::{EndCondition, OccurrencePreview};
use helpers::setup::{mount_editor, rerender, TestForm};
use helpers::utils::datetime;

#[test]
fn test_new_event_gets_default_rule() {
    let form = TestForm::default();
    let mut editor = mount_editor(&form, datetime("2024-03-06", 17, 0));
    assert_eq!(
        form.value().as_deref(),
        Some("FREQ=WEEKLY;INTERVAL=1;BYDAY=WE;COUNT=10")
    );
    assert_eq!(editor.preview(), OccurrencePreview::Count(10));

    rerender(&mut editor, &form);
    assert_eq!(form.emissions(), 1);
}

#[test]
fn test_editing_does_not_loop_through_the_form() {
    let form = TestForm::with_value("FREQ=WEEKLY;BYDAY=MO;COUNT=4");
    let mut editor = mount_editor(&form, datetime("2024-03-04", 8, 30));
    // The inbound rule lacked INTERVAL, so the normalized form is emitted once
    assert_eq!(form.emissions(), 1);
    rerender(&mut editor, &form);

    editor.toggle_calendar_day(3); // Wednesday
    rerender(&mut editor, &form);
    editor.toggle_calendar_day(5); // Friday
    rerender(&mut editor, &form);
    editor.set_count(Some(6));
    rerender(&mut editor, &form);
    rerender(&mut editor, &form);

    assert_eq!(form.emissions(), 4);
    assert_eq!(
        form.value().as_deref(),
        Some("FREQ=WEEKLY;INTERVAL=1;BYDAY=MO,WE,FR;COUNT=6")
    );
    assert_eq!(editor.selected_calendar_days(), vec![1, 3, 5]);

    let sessions = editor.sessions(Duration::minutes(60));
    assert_eq!(sessions.len(), 6);
    assert_eq!(sessions[3].start, datetime("2024-03-11", 8, 30));
}

#[test]
fn test_switching_end_conditions() {
    let form = TestForm::with_value("FREQ=DAILY;INTERVAL=2;COUNT=3");
    let mut editor = mount_editor(&form, datetime("2024-01-01", 10, 0));

    editor.set_end_condition(EndCondition::Until);
    assert_eq!(editor.preview(), OccurrencePreview::Unknown);
    assert_eq!(form.value().as_deref(), Some("FREQ=DAILY;INTERVAL=2;COUNT=3"));

    editor.set_until(NaiveDate::from_ymd_opt(2024, 1, 11));
    assert_eq!(editor.preview(), OccurrencePreview::Count(6));
    assert_eq!(
        form.value().as_deref(),
        Some("FREQ=DAILY;INTERVAL=2;UNTIL=2024-01-11")
    );
    assert_eq!(editor.state().count, None);

    editor.set_until(NaiveDate::from_ymd_opt(2031, 1, 1));
    assert_eq!(editor.preview(), OccurrencePreview::VeryLarge);
    assert!(editor.is_large_result());

    editor.set_end_condition(EndCondition::Never);
    assert_eq!(form.value().as_deref(), Some("FREQ=DAILY;INTERVAL=2"));
    assert_eq!(editor.preview(), OccurrencePreview::Unknown);
}

#[test]
fn test_large_count_is_flagged() {
    let form = TestForm::with_value("FREQ=DAILY;INTERVAL=1;COUNT=100");
    let mut editor = mount_editor(&form, datetime("2024-01-01", 10, 0));
    assert!(!editor.is_large_result());
    editor.set_count(Some(101));
    assert!(editor.is_large_result());
}

#[test]
fn test_frequency_change_keeps_weekday_selection() {
    let form = TestForm::with_value("FREQ=WEEKLY;INTERVAL=1;BYDAY=TU,TH;COUNT=4");
    let mut editor = mount_editor(&form, datetime("2024-01-02", 10, 0));

    editor.set_frequency(RRuleFrequency::Monthly);
    assert_eq!(form.value().as_deref(), Some("FREQ=MONTHLY;INTERVAL=1;COUNT=4"));

    editor.set_frequency(RRuleFrequency::Weekly);
    assert_eq!(
        form.value().as_deref(),
        Some("FREQ=WEEKLY;INTERVAL=1;BYDAY=TU,TH;COUNT=4")
    );
}

#[test]
fn test_external_reset_is_applied() {
    let form = TestForm::with_value("FREQ=DAILY;INTERVAL=1;COUNT=5");
    let mut editor = mount_editor(&form, datetime("2024-01-01", 10, 0));
    editor.set_interval(Some(3));

    // The form was reset by something other than the editor
    editor.receive_rule(Some("garbage"));
    assert_eq!(
        editor.canonical(),
        Some("FREQ=WEEKLY;INTERVAL=1;BYDAY=MO;COUNT=10")
    );
    assert_eq!(editor.state().frequency, RRuleFrequency::Weekly);
}

#[test]
fn test_form_reset_after_edit_is_applied() {
    let mounted = "FREQ=DAILY;INTERVAL=1;COUNT=5";
    let form = TestForm::with_value(mounted);
    let mut editor = mount_editor(&form, datetime("2024-01-01", 10, 0));
    editor.set_interval(Some(3));
    rerender(&mut editor, &form);
    assert_eq!(form.value().as_deref(), Some("FREQ=DAILY;INTERVAL=3;COUNT=5"));

    // Undo in the form restores the value it was mounted with
    editor.receive_rule(Some(mounted));
    assert_eq!(editor.state().interval, Some(1));
    assert_eq!(editor.canonical(), Some(mounted));
    assert_eq!(form.emissions(), 1);
}

#[test]
fn test_moving_the_start_moves_the_default_weekday() {
    let form = TestForm::with_value("FREQ=WEEKLY;COUNT=3");
    let mut editor = mount_editor(&form, datetime("2024-01-01", 10, 0));
    rerender(&mut editor, &form);

    editor.receive_start(datetime("2024-01-03", 10, 0));
    rerender(&mut editor, &form);
    assert_eq!(
        form.value().as_deref(),
        Some("FREQ=WEEKLY;INTERVAL=1;BYDAY=WE;COUNT=3")
    );
    let sessions = editor.sessions(Duration::minutes(30));
    assert_eq!(sessions[0].start, datetime("2024-01-03", 10, 0));
    assert_eq!(sessions[2].start, datetime("2024-01-17", 10, 0));
}
