use crate::{Activity, MessageId, QueuedMessage, TimerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted an assembled, submit-ready string.
    Submit(String),
    /// User removed a queued message.
    RemoveFromQueue(MessageId),
    /// User cleared the whole queue.
    ClearQueue,
    /// User reordered the queue; must name every queued id exactly once.
    ReorderQueue(Vec<MessageId>),
    /// User committed an edit of a queued message.
    EditQueuedMessage { id: MessageId, content: String },
    /// User opened a queued message for editing.
    BeginEdit(MessageId),
    /// User closed the editor without committing.
    EndEdit,
    /// User asked to send a queued message right away.
    SendNow(MessageId),
    /// Latest value of the agent's activity signal.
    ActivityObserved(Activity),
    /// Stop triggered outside the input (toolbar button, shortcut).
    StopRequested,
    /// Replay of the durable queue on start-up.
    RestoreQueue(Vec<QueuedMessage>),
    /// A timer requested through `Effect::ScheduleTimer` elapsed.
    TimerFired(TimerId),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
