use composer_logging::{composer_debug, composer_info};

use crate::{Activity, ComposerState, Effect, MessageId, Msg, QueuedMessage, TimerId};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ComposerState, msg: Msg) -> (ComposerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Submit(text) => submit(&mut state, &text),
        Msg::RemoveFromQueue(id) => {
            if state.remove(id).is_some() {
                vec![state.persist_effect()]
            } else {
                composer_debug!("Remove ignored, message {} is not queued", id);
                Vec::new()
            }
        }
        Msg::ClearQueue => {
            let removed = state.clear();
            composer_info!("Cleared {} queued message(s)", removed);
            vec![state.persist_effect()]
        }
        Msg::ReorderQueue(order) => {
            if state.reorder(&order) {
                vec![state.persist_effect()]
            } else {
                composer_debug!("Reorder ignored, {:?} is not a permutation of the queue", order);
                Vec::new()
            }
        }
        Msg::EditQueuedMessage { id, content } => edit_queued(&mut state, id, &content),
        Msg::BeginEdit(id) => {
            if !state.begin_edit(id) {
                composer_debug!("Edit ignored, message {} is not queued", id);
            }
            Vec::new()
        }
        Msg::EndEdit => end_edit(&mut state),
        Msg::SendNow(id) => send_now(&mut state, id),
        Msg::ActivityObserved(activity) => observe_activity(&mut state, activity),
        Msg::StopRequested => {
            state.controller_mut().paused = true;
            composer_info!("Stop requested, queue paused");
            vec![Effect::CancelAgent]
        }
        Msg::RestoreQueue(messages) => restore(&mut state, messages),
        Msg::TimerFired(timer) => timer_fired(&mut state, timer),
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut ComposerState, text: &str) -> Vec<Effect> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if !state.is_busy() {
        let controller = state.controller_mut();
        controller.paused = false;
        controller.awaiting_activity = true;
        return vec![Effect::Dispatch {
            text: text.to_string(),
        }];
    }

    if state.settings().is_interruption(text) {
        let controller = state.controller_mut();
        controller.paused = true;
        controller.awaiting_activity = true;
        composer_info!("Interruption command while busy, cancelling and pausing queue");
        return vec![
            Effect::CancelAgent,
            Effect::Dispatch {
                text: text.to_string(),
            },
        ];
    }

    let id = state.enqueue(text);
    composer_debug!("Queued message {} ({} pending)", id, state.queue().len());
    vec![state.persist_effect()]
}

fn edit_queued(state: &mut ComposerState, id: MessageId, content: &str) -> Vec<Effect> {
    if !state.edit(id, content) {
        composer_debug!("Edit of message {} rejected, keeping previous content", id);
        return Vec::new();
    }
    let mut effects = vec![state.persist_effect()];
    if state.editing_id() == Some(id) {
        effects.extend(end_edit(state));
    }
    effects
}

/// Closes the editor. When the head was held back and nothing else will
/// wake the queue (agent already idle), arm the resume timer.
fn end_edit(state: &mut ComposerState) -> Vec<Effect> {
    let held_head = state.head_is_being_edited();
    if state.editing_id().is_none() {
        return Vec::new();
    }
    state.controller_mut().editing_id = None;

    if held_head && !state.is_busy() && !state.is_paused() && !state.queue().is_empty() {
        let delay = state.settings().settle_delay;
        return state.schedule_resume(delay);
    }
    Vec::new()
}

fn send_now(state: &mut ComposerState, id: MessageId) -> Vec<Effect> {
    let Some(message) = state.remove(id) else {
        composer_debug!("Send now ignored, message {} is not queued", id);
        return Vec::new();
    };

    let mut effects = Vec::with_capacity(5);
    if state.is_busy() {
        effects.push(Effect::CancelAgent);
    }
    effects.push(Effect::Dispatch {
        text: message.content,
    });
    effects.push(state.persist_effect());

    let controller = state.controller_mut();
    controller.paused = false;
    controller.send_now_in_flight = true;
    controller.awaiting_activity = true;

    // Always armed: firing it is what releases the guard.
    let delay = state.settings().settle_delay;
    effects.extend(state.schedule_resume(delay));
    composer_info!("Sent message {} ahead of the queue", id);
    effects
}

fn observe_activity(state: &mut ComposerState, activity: Activity) -> Vec<Effect> {
    let previous = state.observe_activity(activity);
    let edge = (previous, activity) == (Activity::Busy, Activity::Idle);
    if activity == Activity::Busy || edge {
        state.controller_mut().awaiting_activity = false;
    }
    if !edge {
        return Vec::new();
    }

    if state.controller().send_now_in_flight {
        composer_debug!("Agent idle, auto-dispatch held while a send-now settles");
        return Vec::new();
    }
    if !can_auto_dispatch(state) {
        return Vec::new();
    }
    dispatch_head(state)
}

fn restore(state: &mut ComposerState, messages: Vec<QueuedMessage>) -> Vec<Effect> {
    let cleaned = state.restore(messages);
    let mut effects = Vec::new();
    if cleaned {
        effects.push(state.persist_effect());
    }
    if !state.queue().is_empty() {
        composer_info!("Restored {} queued message(s)", state.queue().len());
        let delay = state.settings().mount_drain_delay;
        effects.extend(state.schedule_resume(delay));
    }
    effects
}

fn timer_fired(state: &mut ComposerState, timer: TimerId) -> Vec<Effect> {
    if !state.take_resume_timer(timer) {
        composer_debug!("Ignoring stale timer {}", timer);
        return Vec::new();
    }
    if state.controller().send_now_in_flight {
        state.controller_mut().send_now_in_flight = false;
    }

    // Busy: the next busy -> idle edge drains instead.
    if state.is_busy() || state.controller().awaiting_activity || !can_auto_dispatch(state) {
        return Vec::new();
    }
    dispatch_head(state)
}

fn can_auto_dispatch(state: &ComposerState) -> bool {
    !state.queue().is_empty()
        && !state.is_paused()
        && !state.head_is_being_edited()
        && !state.controller().send_now_in_flight
}

fn dispatch_head(state: &mut ComposerState) -> Vec<Effect> {
    let Some(head) = state.pop_head() else {
        return Vec::new();
    };
    state.controller_mut().awaiting_activity = true;
    composer_debug!(
        "Dispatching queued message {} ({} left)",
        head.id,
        state.queue().len()
    );
    vec![
        Effect::Dispatch { text: head.content },
        state.persist_effect(),
    ]
}
