//! Arrow-key recall over previously sent messages.
//!
//! Two most-recent-last histories are tracked: the current conversation
//! (`Local`) and everything sent from this machine (`Global`). A recall
//! session walks only one of them, local when it has entries. The text that
//! was in the input when the session started is kept as a draft and handed
//! back when the user walks past the newest entry.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Older,
    Newer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Local,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    source: HistorySource,
    index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryNavigator {
    global: Vec<String>,
    local: Vec<String>,
    cursor: Option<Cursor>,
    draft: Option<String>,
    dirty: bool,
    max_entries: usize,
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self {
            global: Vec::new(),
            local: Vec::new(),
            cursor: None,
            draft: None,
            dirty: false,
            max_entries: 100,
        }
    }
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries kept per history.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max.max(1);
        self
    }

    /// Replaces both histories and ends any recall session.
    pub fn set_histories(&mut self, global: Vec<String>, local: Vec<String>) {
        self.global = global;
        self.local = local;
        trim_front(&mut self.global, self.max_entries);
        trim_front(&mut self.local, self.max_entries);
        self.cursor = None;
    }

    pub fn global(&self) -> &[String] {
        &self.global
    }

    pub fn local(&self) -> &[String] {
        &self.local
    }

    /// Appends a sent message to both histories and resets recall.
    pub fn record_sent(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            push_entry(&mut self.global, text, self.max_entries);
            push_entry(&mut self.local, text, self.max_entries);
        }
        self.reset();
    }

    /// Moves through history.
    ///
    /// Returns the text the input should now show, or `None` when recall is
    /// not engaged (the user has typed, there is no history, or a newer move
    /// was made with nothing newer to show).
    pub fn navigate(&mut self, direction: HistoryDirection, current_text: &str) -> Option<String> {
        if self.dirty {
            return None;
        }

        let Some(cursor) = self.cursor else {
            if direction == HistoryDirection::Newer {
                return None;
            }
            let source = self.starting_source()?;
            let index = self.entries(source).len() - 1;
            self.draft = Some(current_text.to_string());
            self.cursor = Some(Cursor { source, index });
            return Some(self.entries(source)[index].clone());
        };

        let len = self.entries(cursor.source).len();
        match direction {
            HistoryDirection::Older => {
                let index = cursor.index.saturating_sub(1);
                self.cursor = Some(Cursor { index, ..cursor });
                Some(self.entries(cursor.source)[index].clone())
            }
            HistoryDirection::Newer if cursor.index + 1 < len => {
                let index = cursor.index + 1;
                self.cursor = Some(Cursor { index, ..cursor });
                Some(self.entries(cursor.source)[index].clone())
            }
            HistoryDirection::Newer => {
                self.cursor = None;
                Some(self.draft.take().unwrap_or_default())
            }
        }
    }

    /// Any non-navigation key. Leaves recall and re-arms the draft; a
    /// non-empty buffer also blocks recall until the next reset.
    pub fn note_keystroke(&mut self, current_text: &str) {
        self.cursor = None;
        self.draft = None;
        self.dirty = !current_text.is_empty();
    }

    /// Back to a clean input, e.g. after the message was sent.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.draft = None;
        self.dirty = false;
    }

    pub fn is_navigating(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn active_source(&self) -> Option<HistorySource> {
        self.cursor.map(|cursor| cursor.source)
    }

    fn starting_source(&self) -> Option<HistorySource> {
        if !self.local.is_empty() {
            Some(HistorySource::Local)
        } else if !self.global.is_empty() {
            Some(HistorySource::Global)
        } else {
            None
        }
    }

    fn entries(&self, source: HistorySource) -> &[String] {
        match source {
            HistorySource::Local => &self.local,
            HistorySource::Global => &self.global,
        }
    }
}

fn push_entry(entries: &mut Vec<String>, text: &str, max: usize) {
    if entries.last().map(String::as_str) != Some(text) {
        entries.push(text.to_string());
    }
    trim_front(entries, max);
}

fn trim_front(entries: &mut Vec<String>, max: usize) {
    if entries.len() > max {
        let excess = entries.len() - max;
        entries.drain(..excess);
    }
}
