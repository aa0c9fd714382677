//! Composer core: pure submission-queue state machine, history recall and view-model helpers.
mod effect;
mod history;
mod msg;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use history::{HistoryDirection, HistoryNavigator, HistorySource};
pub use msg::Msg;
pub use settings::{is_interruption_command, ComposerSettings};
pub use state::{Activity, ComposerState, ControllerState, MessageId, QueuedMessage, TimerId};
pub use update::update;
pub use view_model::{ComposerViewModel, QueuedRowView};
