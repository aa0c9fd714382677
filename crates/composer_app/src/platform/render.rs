use composer_core::{Activity, ComposerViewModel, QueuedRowView};

/// One-line status shown whenever the view changes.
pub fn status_line(view: &ComposerViewModel) -> String {
    let activity = match view.activity {
        Activity::Idle => "idle",
        Activity::Busy => "busy",
    };
    match view.editing_id {
        Some(id) => format!("[{activity}] {} (holding #{id})", view.placeholder),
        None => format!("[{activity}] {}", view.placeholder),
    }
}

pub fn queue_lines(view: &ComposerViewModel) -> Vec<String> {
    if view.queue.is_empty() {
        return vec!["  (queue is empty)".to_string()];
    }
    view.queue.iter().enumerate().map(row_line).collect()
}

fn row_line((index, row): (usize, &QueuedRowView)) -> String {
    let marker = if row.is_editing {
        "~"
    } else if row.is_head {
        ">"
    } else {
        " "
    };
    format!("{marker} {}. #{} {}", index + 1, row.id, row.content)
}
