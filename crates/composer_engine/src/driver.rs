use std::time::Instant;

use composer_core::{update, ComposerSettings, ComposerState, ComposerViewModel, Effect, Msg};
use composer_logging::{composer_debug, composer_info};

use crate::{Clock, QueueStore, SubmissionChannel, TimerSet};

/// Runs the controller: feeds messages through `update` and executes the
/// resulting effects against the store, the channel and the timers.
///
/// Everything happens on the caller's thread, one message at a time.
pub struct ComposerDriver<C> {
    state: ComposerState,
    store: Box<dyn QueueStore>,
    channel: C,
    timers: TimerSet,
    clock: Box<dyn Clock>,
}

impl<C: SubmissionChannel> ComposerDriver<C> {
    pub fn new(
        settings: ComposerSettings,
        store: Box<dyn QueueStore>,
        channel: C,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            state: ComposerState::with_settings(settings),
            store,
            channel,
            timers: TimerSet::new(),
            clock,
        }
    }

    /// Replays the stored queue. Draining starts once the mount timer fires.
    pub fn start(&mut self) {
        let restored = self.store.load();
        composer_info!("Starting composer with {} stored message(s)", restored.len());
        let sent = self.handle(Msg::RestoreQueue(restored));
        debug_assert!(sent.is_empty());
    }

    /// Applies one message. Returns the texts handed to the channel.
    pub fn handle(&mut self, msg: Msg) -> Vec<String> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.run_effects(effects)
    }

    /// Fires every timer that is due. Returns the texts handed to the channel.
    pub fn poll_timers(&mut self) -> Vec<String> {
        let due = self.timers.take_due(self.clock.now());
        let mut sent = Vec::new();
        for timer in due {
            sent.extend(self.handle(Msg::TimerFired(timer)));
        }
        sent
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn view(&self) -> ComposerViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Vec<String> {
        let mut sent = Vec::new();
        for effect in effects {
            match effect {
                Effect::Dispatch { text } => {
                    composer_info!("Dispatch text_len={}", text.len());
                    self.channel.dispatch(&text);
                    sent.push(text);
                }
                Effect::CancelAgent => {
                    composer_info!("Cancelling agent activity");
                    self.channel.cancel();
                }
                Effect::PersistQueue(messages) => {
                    composer_debug!("Persisting {} queued message(s)", messages.len());
                    self.store.save(&messages);
                }
                Effect::ScheduleTimer { timer, delay } => {
                    self.timers.schedule(timer, self.clock.now() + delay);
                }
                Effect::CancelTimer(timer) => {
                    self.timers.cancel(timer);
                }
            }
        }
        sent
    }
}
