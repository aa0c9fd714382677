use std::collections::HashSet;
use std::time::Duration;

use crate::view_model::{ComposerViewModel, QueuedRowView};
use crate::{ComposerSettings, Effect};

pub type MessageId = u64;
pub type TimerId = u64;

/// Last observed value of the agent's activity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub id: MessageId,
    pub content: String,
    /// Logical stamp, only used to break ties when ordering stored entries.
    pub enqueued_at: u64,
}

/// Guard flags of the controller. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerState {
    /// Set by an interruption until a message is actively sent again.
    pub paused: bool,
    /// Queued message currently open in the editor.
    pub editing_id: Option<MessageId>,
    /// Set by "send now" until its settle timer fires.
    pub send_now_in_flight: bool,
    /// Something was dispatched and the agent has not reported on it yet.
    pub awaiting_activity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerState {
    settings: ComposerSettings,
    queue: Vec<QueuedMessage>,
    controller: ControllerState,
    last_activity: Activity,
    resume_timer: Option<TimerId>,
    next_message_id: MessageId,
    next_timer_id: TimerId,
    clock: u64,
    dirty: bool,
}

impl ComposerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ComposerSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    pub fn queue(&self) -> &[QueuedMessage] {
        &self.queue
    }

    pub fn head(&self) -> Option<&QueuedMessage> {
        self.queue.first()
    }

    pub fn controller(&self) -> &ControllerState {
        &self.controller
    }

    pub fn activity(&self) -> Activity {
        self.last_activity
    }

    pub fn is_busy(&self) -> bool {
        self.last_activity == Activity::Busy
    }

    pub fn is_paused(&self) -> bool {
        self.controller.paused
    }

    pub fn editing_id(&self) -> Option<MessageId> {
        self.controller.editing_id
    }

    pub fn resume_timer(&self) -> Option<TimerId> {
        self.resume_timer
    }

    pub fn view(&self) -> ComposerViewModel {
        let head_id = self.head().map(|message| message.id);
        let queue = self
            .queue
            .iter()
            .map(|message| QueuedRowView {
                id: message.id,
                content: message.content.clone(),
                is_head: Some(message.id) == head_id,
                is_editing: self.controller.editing_id == Some(message.id),
            })
            .collect::<Vec<_>>();
        ComposerViewModel::new(
            self.last_activity,
            self.controller.paused,
            self.controller.editing_id,
            queue,
            self.dirty,
        )
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn persist_effect(&self) -> Effect {
        Effect::PersistQueue(self.queue.clone())
    }

    pub(crate) fn controller_mut(&mut self) -> &mut ControllerState {
        self.mark_dirty();
        &mut self.controller
    }

    /// Records the new activity value and returns the previous one.
    pub(crate) fn observe_activity(&mut self, activity: Activity) -> Activity {
        let previous = std::mem::replace(&mut self.last_activity, activity);
        if previous != activity {
            self.mark_dirty();
        }
        previous
    }

    pub(crate) fn head_is_being_edited(&self) -> bool {
        match (self.head(), self.controller.editing_id) {
            (Some(head), Some(editing)) => head.id == editing,
            _ => false,
        }
    }

    /// Appends `content` (already trimmed and non-empty) at the tail.
    pub(crate) fn enqueue(&mut self, content: &str) -> MessageId {
        self.next_message_id += 1;
        let id = self.next_message_id;
        let enqueued_at = self.stamp();
        self.queue.push(QueuedMessage {
            id,
            content: content.to_string(),
            enqueued_at,
        });
        self.mark_dirty();
        id
    }

    pub(crate) fn remove(&mut self, id: MessageId) -> Option<QueuedMessage> {
        let index = self.queue.iter().position(|message| message.id == id)?;
        let removed = self.queue.remove(index);
        if self.controller.editing_id == Some(id) {
            self.controller.editing_id = None;
        }
        self.mark_dirty();
        Some(removed)
    }

    pub(crate) fn pop_head(&mut self) -> Option<QueuedMessage> {
        let id = self.head()?.id;
        self.remove(id)
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.queue.len();
        self.queue.clear();
        self.controller.editing_id = None;
        self.mark_dirty();
        removed
    }

    /// Applies `order` when it names every queued id exactly once.
    pub(crate) fn reorder(&mut self, order: &[MessageId]) -> bool {
        if order.len() != self.queue.len() {
            return false;
        }
        let current: HashSet<MessageId> = self.queue.iter().map(|message| message.id).collect();
        let mut seen = HashSet::with_capacity(order.len());
        if !order
            .iter()
            .all(|id| current.contains(id) && seen.insert(*id))
        {
            return false;
        }

        let mut remaining = std::mem::take(&mut self.queue);
        for id in order {
            if let Some(index) = remaining.iter().position(|message| message.id == *id) {
                self.queue.push(remaining.swap_remove(index));
            }
        }
        self.mark_dirty();
        true
    }

    pub(crate) fn edit(&mut self, id: MessageId, content: &str) -> bool {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return false;
        }
        let Some(index) = self.queue.iter().position(|message| message.id == id) else {
            return false;
        };
        let enqueued_at = self.stamp();
        let message = &mut self.queue[index];
        message.content = trimmed.to_string();
        message.enqueued_at = enqueued_at;
        self.mark_dirty();
        true
    }

    pub(crate) fn begin_edit(&mut self, id: MessageId) -> bool {
        if !self.queue.iter().any(|message| message.id == id) {
            return false;
        }
        self.controller_mut().editing_id = Some(id);
        true
    }

    /// Replaces the queue with a persisted snapshot.
    ///
    /// Contents are trimmed, empty entries and repeated ids are dropped, and
    /// the id and stamp counters move past everything restored. Returns
    /// `true` when the snapshot had to be cleaned up.
    pub(crate) fn restore(&mut self, messages: Vec<QueuedMessage>) -> bool {
        let mut seen = HashSet::with_capacity(messages.len());
        let mut changed = false;
        let mut restored = Vec::with_capacity(messages.len());
        for message in messages {
            let content = message.content.trim();
            if content.is_empty() || !seen.insert(message.id) {
                changed = true;
                continue;
            }
            if content.len() != message.content.len() {
                changed = true;
            }
            self.next_message_id = self.next_message_id.max(message.id);
            self.clock = self.clock.max(message.enqueued_at);
            restored.push(QueuedMessage {
                id: message.id,
                content: content.to_string(),
                enqueued_at: message.enqueued_at,
            });
        }

        self.queue = restored;
        if let Some(editing) = self.controller.editing_id {
            if !self.queue.iter().any(|message| message.id == editing) {
                self.controller.editing_id = None;
            }
        }
        self.mark_dirty();
        changed
    }

    /// Arms the single resume timer, cancelling a pending one.
    pub(crate) fn schedule_resume(&mut self, delay: Duration) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(previous) = self.resume_timer.take() {
            effects.push(Effect::CancelTimer(previous));
        }
        self.next_timer_id += 1;
        let timer = self.next_timer_id;
        self.resume_timer = Some(timer);
        effects.push(Effect::ScheduleTimer { timer, delay });
        effects
    }

    /// Consumes the resume timer if `timer` is the pending one.
    pub(crate) fn take_resume_timer(&mut self, timer: TimerId) -> bool {
        if self.resume_timer == Some(timer) {
            self.resume_timer = None;
            true
        } else {
            false
        }
    }

    fn stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}
