//! Composer engine: durable queue storage, the agent boundary and effect execution.
mod agent;
mod background;
mod channel;
mod document;
mod driver;
mod store;
mod timers;

pub use agent::{AgentError, AgentEvent, AgentSettings, ScriptedAgent};
pub use background::{BackgroundStore, BackgroundWriter};
pub use channel::SubmissionChannel;
pub use document::{RonDocument, StoreError};
pub use driver::ComposerDriver;
pub use store::{FileQueueStore, MemoryQueueStore, QueueStore, QUEUE_FILENAME};
pub use timers::{Clock, ManualClock, SystemClock, TimerSet};
