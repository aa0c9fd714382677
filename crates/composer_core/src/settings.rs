use std::time::Duration;

/// Tunables for the submission queue controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerSettings {
    /// Wait after a "send now" before the next queued message may go out,
    /// so the cancellation it issued has taken effect upstream.
    pub settle_delay: Duration,
    /// Wait after restoring a persisted queue before draining it.
    pub mount_drain_delay: Duration,
    /// Lower-case words that interrupt the agent instead of queueing.
    pub interruption_words: Vec<String>,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1500),
            mount_drain_delay: Duration::from_millis(1000),
            interruption_words: vec!["stop".to_string(), "wait".to_string()],
        }
    }
}

impl ComposerSettings {
    pub fn is_interruption(&self, text: &str) -> bool {
        is_interruption_command(text, &self.interruption_words)
    }
}

/// True when `text`, trimmed and case-folded, is one of `words` or starts
/// with one of them followed by a space.
///
/// There is no escape hatch: a message that really begins with "stop "
/// can never be queued while the agent is busy.
pub fn is_interruption_command<S: AsRef<str>>(text: &str, words: &[S]) -> bool {
    let lowered = text.trim().to_lowercase();
    words.iter().any(|word| {
        let word = word.as_ref();
        lowered == word
            || lowered
                .strip_prefix(word)
                .is_some_and(|rest| rest.starts_with(' '))
    })
}
