use chrono::NaiveDateTime;
use event_sessions_editor::{RuleEditor, RuleSubscriber};
use event_sessions_infra::Config;
use std::{cell::RefCell, rc::Rc};

/// Stands in for the event form that owns the rule string
#[derive(Clone, Default)]
pub struct TestForm {
    value: Rc<RefCell<Option<String>>>,
    emissions: Rc<RefCell<usize>>,
}

impl TestForm {
    pub fn with_value(value: &str) -> Self {
        let form = Self::default();
        *form.value.borrow_mut() = Some(value.to_string());
        form
    }

    pub fn value(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    pub fn emissions(&self) -> usize {
        *self.emissions.borrow()
    }
}

impl RuleSubscriber for TestForm {
    fn notify(&mut self, canonical: &str) {
        *self.value.borrow_mut() = Some(canonical.to_string());
        *self.emissions.borrow_mut() += 1;
    }
}

/// Mounts an editor the way the event form does
pub fn mount_editor(form: &TestForm, start: NaiveDateTime) -> RuleEditor<TestForm> {
    RuleEditor::new(
        form.value().as_deref(),
        start,
        &Config::default(),
        form.clone(),
    )
}

/// Passes the form value down again, like a re-render would
pub fn rerender(editor: &mut RuleEditor<TestForm>, form: &TestForm) {
    editor.receive_rule(form.value().as_deref());
}
