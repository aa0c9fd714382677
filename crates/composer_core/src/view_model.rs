use crate::{Activity, MessageId};

pub const PLACEHOLDER_IDLE: &str = "Type a message";
pub const PLACEHOLDER_PAUSED: &str = "Paused, send a message to resume";

/// What the chat input needs to render its status line and queue panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerViewModel {
    pub activity: Activity,
    pub paused: bool,
    pub editing_id: Option<MessageId>,
    pub queue: Vec<QueuedRowView>,
    pub queue_len: usize,
    pub placeholder: String,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedRowView {
    pub id: MessageId,
    pub content: String,
    pub is_head: bool,
    pub is_editing: bool,
}

impl ComposerViewModel {
    pub(crate) fn new(
        activity: Activity,
        paused: bool,
        editing_id: Option<MessageId>,
        queue: Vec<QueuedRowView>,
        dirty: bool,
    ) -> Self {
        let queue_len = queue.len();
        Self {
            activity,
            paused,
            editing_id,
            placeholder: placeholder(paused, queue_len),
            queue,
            queue_len,
            dirty,
        }
    }
}

fn placeholder(paused: bool, queue_len: usize) -> String {
    match (paused, queue_len) {
        (true, _) => PLACEHOLDER_PAUSED.to_string(),
        (false, 0) => PLACEHOLDER_IDLE.to_string(),
        (false, 1) => "1 message queued".to_string(),
        (false, n) => format!("{n} messages queued"),
    }
}
