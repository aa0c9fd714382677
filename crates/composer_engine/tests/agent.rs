use std::time::Duration;

use composer_core::Activity;
use composer_engine::{AgentEvent, AgentSettings, ScriptedAgent, SubmissionChannel};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(5);

fn agent(reply_delay: Duration) -> ScriptedAgent {
    composer_logging::initialize_for_tests();
    ScriptedAgent::new(AgentSettings { reply_delay }).unwrap()
}

fn next(agent: &ScriptedAgent) -> AgentEvent {
    agent
        .recv_timeout(WAIT)
        .expect("agent event within the wait window")
}

#[test]
fn a_prompt_is_answered_between_busy_and_idle() {
    let agent = agent(Duration::from_millis(20));
    agent.dispatch("hello");

    assert_eq!(next(&agent), AgentEvent::Busy);
    assert_eq!(
        next(&agent),
        AgentEvent::Replied {
            prompt: "hello".into(),
            reply: "Done: hello".into(),
        }
    );
    assert_eq!(next(&agent), AgentEvent::Idle);
    assert!(agent.try_recv().is_none());
}

#[test]
fn back_to_back_prompts_share_one_busy_period() {
    let agent = agent(Duration::from_millis(50));
    agent.dispatch("first");
    agent.dispatch("second");

    let events: Vec<_> = (0..4).map(|_| next(&agent)).collect();
    let activities: Vec<_> = events.iter().filter_map(AgentEvent::activity).collect();
    assert_eq!(activities, vec![Activity::Busy, Activity::Idle]);
    assert!(matches!(&events[1], AgentEvent::Replied { prompt, .. } if prompt == "first"));
    assert!(matches!(&events[2], AgentEvent::Replied { prompt, .. } if prompt == "second"));
}

#[test]
fn cancel_interrupts_the_current_prompt() {
    let agent = agent(Duration::from_secs(30));
    agent.dispatch("slow");
    assert_eq!(next(&agent), AgentEvent::Busy);

    agent.cancel();
    assert_eq!(
        next(&agent),
        AgentEvent::Cancelled {
            prompt: "slow".into()
        }
    );
    assert_eq!(next(&agent), AgentEvent::Idle);
}
