use std::path::PathBuf;

use composer_engine::{BackgroundWriter, RonDocument};
use composer_logging::{composer_error, composer_info, composer_warn};
use serde::{Deserialize, Serialize};

const HISTORY_FILENAME: &str = "history.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedHistory {
    /// Oldest first.
    sent: Vec<String>,
}

/// Sent-message history shared across sessions, saved off the UI thread.
pub(crate) struct HistoryFile {
    document: RonDocument<PersistedHistory>,
    writer: BackgroundWriter<Vec<String>>,
}

impl HistoryFile {
    pub(crate) fn new(state_dir: impl Into<PathBuf>) -> Self {
        let document = RonDocument::new(state_dir, HISTORY_FILENAME);
        let target = document.clone();
        let writer = BackgroundWriter::spawn(move |sent: Vec<String>| {
            if let Err(err) = target.write(&PersistedHistory { sent }) {
                composer_error!("Failed to save history: {}", err);
            }
        });
        Self { document, writer }
    }

    /// Sent messages from earlier sessions, oldest first.
    pub(crate) fn load(&self) -> Vec<String> {
        self.writer.flush();
        match self.document.read() {
            Ok(Some(history)) => {
                composer_info!(
                    "Loaded {} history entries from {:?}",
                    history.sent.len(),
                    self.document.path()
                );
                history.sent
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                composer_warn!("Starting with an empty history: {}", err);
                Vec::new()
            }
        }
    }

    pub(crate) fn save(&self, sent: &[String]) {
        if !self.writer.submit(sent.to_vec()) {
            composer_warn!("History writer is gone, dropping {} entries", sent.len());
        }
    }
}
