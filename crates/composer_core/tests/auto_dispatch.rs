use std::sync::Once;

use composer_core::{update, Activity, ComposerState, Effect, Msg, QueuedMessage};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(composer_logging::initialize_for_tests);
}

fn observe(state: ComposerState, activity: Activity) -> (ComposerState, Vec<Effect>) {
    update(state, Msg::ActivityObserved(activity))
}

/// Busy then idle; returns the effects of the idle observation.
fn agent_turn(state: ComposerState) -> (ComposerState, Vec<Effect>) {
    let (state, busy_effects) = observe(state, Activity::Busy);
    assert!(busy_effects.is_empty());
    observe(state, Activity::Idle)
}

fn dispatched(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Dispatch { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn queued(contents: &[&str]) -> ComposerState {
    let (mut state, _) = observe(ComposerState::new(), Activity::Busy);
    for content in contents {
        let (next, _) = update(state, Msg::Submit(content.to_string()));
        state = next;
    }
    state
}

fn message(id: u64, content: &str) -> QueuedMessage {
    QueuedMessage {
        id,
        content: content.to_string(),
        enqueued_at: id,
    }
}

#[test]
fn each_idle_edge_dispatches_one_head_in_fifo_order() {
    init_logging();
    let (state, _) = update(
        ComposerState::new(),
        Msg::RestoreQueue(vec![message(1, "A"), message(2, "B")]),
    );

    let (state, effects) = agent_turn(state);
    assert_eq!(
        effects,
        vec![
            Effect::Dispatch {
                text: "A".to_string()
            },
            Effect::PersistQueue(vec![message(2, "B")]),
        ]
    );

    let (state, effects) = agent_turn(state);
    assert_eq!(
        effects,
        vec![
            Effect::Dispatch {
                text: "B".to_string()
            },
            Effect::PersistQueue(Vec::new()),
        ]
    );
    assert!(state.queue().is_empty());

    let (_state, effects) = agent_turn(state);
    assert!(effects.is_empty());
}

#[test]
fn repeated_observations_do_not_dispatch_twice() {
    init_logging();
    let state = queued(&["one", "two", "three"]);

    let (state, effects) = observe(state, Activity::Busy);
    assert!(effects.is_empty());
    let (state, effects) = observe(state, Activity::Idle);
    assert_eq!(dispatched(&effects), vec!["one"]);

    // Duplicate idle renders are not edges.
    let (state, effects) = observe(state, Activity::Idle);
    assert!(effects.is_empty());
    let (state, effects) = observe(state, Activity::Idle);
    assert!(effects.is_empty());

    assert_eq!(state.queue().len(), 2);
}

#[test]
fn n_entries_drain_over_n_agent_turns() {
    init_logging();
    let mut state = queued(&["a", "b", "c", "d"]);
    // Already busy: the first idle observation is the first edge.
    let (next, effects) = observe(state, Activity::Idle);
    state = next;
    let mut sent = dispatched(&effects);

    for _ in 0..5 {
        let (next, effects) = agent_turn(state);
        state = next;
        sent.extend(dispatched(&effects));
    }

    assert_eq!(sent, vec!["a", "b", "c", "d"]);
    assert!(state.queue().is_empty());
}

#[test]
fn pause_suppresses_auto_dispatch_until_an_explicit_send() {
    init_logging();
    let state = queued(&["queued"]);
    let (state, _) = update(state, Msg::Submit("stop".to_string()));
    assert!(state.is_paused());

    let (state, effects) = agent_turn(state);
    assert!(effects.is_empty());
    assert_eq!(state.queue().len(), 1);

    // An explicit send while idle resumes processing.
    let (state, effects) = update(state, Msg::Submit("new instructions".to_string()));
    assert_eq!(dispatched(&effects), vec!["new instructions"]);
    assert!(!state.is_paused());

    let (state, effects) = agent_turn(state);
    assert_eq!(dispatched(&effects), vec!["queued"]);
    assert!(state.queue().is_empty());
}

#[test]
fn editing_the_head_holds_it_back() {
    init_logging();
    let state = queued(&["head", "tail"]);
    let head_id = state.queue()[0].id;

    let (state, _) = update(state, Msg::BeginEdit(head_id));
    let (state, effects) = observe(state, Activity::Idle);
    assert!(effects.is_empty());
    assert_eq!(state.queue().len(), 2);

    let (state, _) = update(state, Msg::EndEdit);
    assert_eq!(state.editing_id(), None);

    let (state, effects) = agent_turn(state);
    assert_eq!(dispatched(&effects), vec!["head"]);
    assert_eq!(state.queue().len(), 1);
}

#[test]
fn editing_a_non_head_entry_does_not_hold_the_queue() {
    init_logging();
    let state = queued(&["head", "tail"]);
    let tail_id = state.queue()[1].id;

    let (state, _) = update(state, Msg::BeginEdit(tail_id));
    let (state, effects) = observe(state, Activity::Idle);

    assert_eq!(dispatched(&effects), vec!["head"]);
    assert_eq!(state.editing_id(), Some(tail_id));
}

#[test]
fn submitting_while_the_head_is_edited_still_queues() {
    init_logging();
    let state = queued(&["head"]);
    let head_id = state.queue()[0].id;
    let (state, _) = update(state, Msg::BeginEdit(head_id));

    let (state, effects) = update(state, Msg::Submit("another".to_string()));
    assert_eq!(effects, vec![Effect::PersistQueue(state.queue().to_vec())]);
    assert_eq!(state.queue().len(), 2);
}

#[test]
fn ending_a_head_edit_while_idle_arms_the_resume_timer() {
    init_logging();
    let state = queued(&["head"]);
    let head_id = state.queue()[0].id;
    let (state, _) = update(state, Msg::BeginEdit(head_id));
    let (state, effects) = observe(state, Activity::Idle);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::EndEdit);
    let timer = match effects.as_slice() {
        [Effect::ScheduleTimer { timer, delay }] => {
            assert_eq!(*delay, state.settings().settle_delay);
            *timer
        }
        other => panic!("expected a single timer, got {other:?}"),
    };

    let (state, effects) = update(state, Msg::TimerFired(timer));
    assert_eq!(dispatched(&effects), vec!["head"]);
    assert!(state.queue().is_empty());
}

#[test]
fn committing_an_edit_of_the_head_releases_it() {
    init_logging();
    let state = queued(&["draft"]);
    let head_id = state.queue()[0].id;
    let (state, _) = update(state, Msg::BeginEdit(head_id));

    let (state, _) = update(
        state,
        Msg::EditQueuedMessage {
            id: head_id,
            content: "final".to_string(),
        },
    );
    assert_eq!(state.editing_id(), None);

    let (_state, effects) = observe(state, Activity::Idle);
    assert_eq!(dispatched(&effects), vec!["final"]);
}
