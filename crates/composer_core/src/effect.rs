use std::time::Duration;

use crate::{QueuedMessage, TimerId};

/// Side effects requested by [`crate::update`], executed by the host in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand the text to the submission channel. Fire-and-forget.
    Dispatch { text: String },
    /// Best-effort interrupt of whatever the agent is doing.
    CancelAgent,
    /// Replace the durable queue with this snapshot.
    PersistQueue(Vec<QueuedMessage>),
    /// Deliver `Msg::TimerFired(timer)` once `delay` has elapsed.
    ScheduleTimer { timer: TimerId, delay: Duration },
    /// Drop a previously scheduled timer if it has not fired yet.
    CancelTimer(TimerId),
}
