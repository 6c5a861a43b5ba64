mod editor;
mod preview;
mod state;

pub use editor::{RuleEditor, RuleSubscriber};
pub use preview::OccurrencePreview;
pub use state::{EditableRuleState, EndCondition};
