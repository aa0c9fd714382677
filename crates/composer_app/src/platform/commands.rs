use composer_core::{MessageId, QueuedMessage};
use thiserror::Error;

pub const HELP: &str = "\
Type a message and press Enter to send it (queued while the agent is busy).
  /queue                 list queued messages
  /rm <id>               remove a queued message
  /clear                 remove every queued message
  /edit <id> <text>      replace a queued message
  /begin-edit <id>       hold a queued message while you edit it
  /end-edit              release the held message
  /move <id> <position>  move a queued message (1 = next to send)
  /send <id>             send a queued message right away
  /stop                  cancel the agent and pause the queue
  /up, /down             recall older or newer sent messages
  (empty line)           send the recalled message
  //text                 send text starting with a slash
  /help                  show this help
  /quit, /exit           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    SubmitRecalled,
    ShowQueue,
    Remove(MessageId),
    Clear,
    Edit { id: MessageId, text: String },
    BeginEdit(MessageId),
    EndEdit,
    Move { id: MessageId, position: usize },
    SendNow(MessageId),
    Stop,
    HistoryUp,
    HistoryDown,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command /{0}, try /help")]
    Unknown(String),
    #[error("/{command} expects {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },
}

/// Parses one input line.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Command::SubmitRecalled);
    }
    if let Some(literal) = line.strip_prefix("//") {
        return Ok(Command::Submit(format!("/{literal}")));
    }
    let Some(body) = line.trim_start().strip_prefix('/') else {
        return Ok(Command::Submit(line.to_string()));
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    match name {
        "queue" | "q" => Ok(Command::ShowQueue),
        "rm" => Ok(Command::Remove(id_arg(rest, "rm")?)),
        "clear" => Ok(Command::Clear),
        "edit" => {
            let (id, text) = rest.split_once(char::is_whitespace).ok_or(CommandError::Usage {
                command: "edit",
                expected: "<id> <text>",
            })?;
            Ok(Command::Edit {
                id: id_arg(id, "edit")?,
                text: text.trim().to_string(),
            })
        }
        "begin-edit" => Ok(Command::BeginEdit(id_arg(rest, "begin-edit")?)),
        "end-edit" => Ok(Command::EndEdit),
        "move" => {
            let usage = CommandError::Usage {
                command: "move",
                expected: "<id> <position>",
            };
            let mut parts = rest.split_whitespace();
            let (Some(id), Some(position), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(usage);
            };
            let id = id.parse().map_err(|_| usage.clone())?;
            let position = position
                .parse::<usize>()
                .ok()
                .filter(|position| *position > 0)
                .ok_or(usage)?;
            Ok(Command::Move { id, position })
        }
        "send" => Ok(Command::SendNow(id_arg(rest, "send")?)),
        "stop" => Ok(Command::Stop),
        "up" => Ok(Command::HistoryUp),
        "down" => Ok(Command::HistoryDown),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn id_arg(arg: &str, command: &'static str) -> Result<MessageId, CommandError> {
    arg.trim().parse().map_err(|_| CommandError::Usage {
        command,
        expected: "a numeric <id>",
    })
}

/// Queue order after moving `id` to the 1-based `position`.
///
/// Positions past the end move the entry to the tail. `None` when `id` is
/// not queued.
pub fn reordered_ids(
    queue: &[QueuedMessage],
    id: MessageId,
    position: usize,
) -> Option<Vec<MessageId>> {
    let mut ids: Vec<MessageId> = queue.iter().map(|message| message.id).collect();
    let from = ids.iter().position(|candidate| *candidate == id)?;
    let moved = ids.remove(from);
    let to = position.saturating_sub(1).min(ids.len());
    ids.insert(to, moved);
    Some(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn queue(ids: &[MessageId]) -> Vec<QueuedMessage> {
        ids.iter()
            .map(|id| QueuedMessage {
                id: *id,
                content: format!("m{id}"),
                enqueued_at: *id,
            })
            .collect()
    }

    #[test]
    fn plain_text_is_submitted_verbatim() {
        assert_eq!(parse("  hello there \n"), Ok(Command::Submit("  hello there ".into())));
        assert_eq!(parse("//etc/hosts"), Ok(Command::Submit("/etc/hosts".into())));
        assert_eq!(parse("   "), Ok(Command::SubmitRecalled));
    }

    #[test]
    fn queue_commands_take_ids() {
        assert_eq!(parse("/rm 4"), Ok(Command::Remove(4)));
        assert_eq!(parse("/send 2"), Ok(Command::SendNow(2)));
        assert_eq!(parse("/begin-edit 7"), Ok(Command::BeginEdit(7)));
        assert_eq!(
            parse("/edit 3   new words here"),
            Ok(Command::Edit {
                id: 3,
                text: "new words here".into()
            })
        );
        assert_eq!(parse("/move 5 1"), Ok(Command::Move { id: 5, position: 1 }));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/queue"), Ok(Command::ShowQueue));
        assert_eq!(parse("/clear"), Ok(Command::Clear));
        assert_eq!(parse("/end-edit"), Ok(Command::EndEdit));
        assert_eq!(parse("/stop"), Ok(Command::Stop));
        assert_eq!(parse("/up"), Ok(Command::HistoryUp));
        assert_eq!(parse("/down"), Ok(Command::HistoryDown));
        assert_eq!(parse("/exit"), Ok(Command::Quit));
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(matches!(parse("/rm"), Err(CommandError::Usage { command: "rm", .. })));
        assert!(matches!(parse("/rm x"), Err(CommandError::Usage { .. })));
        assert!(matches!(parse("/edit 3"), Err(CommandError::Usage { command: "edit", .. })));
        assert!(matches!(parse("/move 3 0"), Err(CommandError::Usage { command: "move", .. })));
        assert!(matches!(parse("/move 3 1 2"), Err(CommandError::Usage { .. })));
        assert_eq!(parse("/frobnicate"), Err(CommandError::Unknown("frobnicate".into())));
    }

    #[test]
    fn moving_rebuilds_the_order() {
        let queue = queue(&[1, 2, 3, 4]);
        assert_eq!(reordered_ids(&queue, 3, 1), Some(vec![3, 1, 2, 4]));
        assert_eq!(reordered_ids(&queue, 1, 3), Some(vec![2, 3, 1, 4]));
        assert_eq!(reordered_ids(&queue, 2, 99), Some(vec![1, 3, 4, 2]));
        assert_eq!(reordered_ids(&queue, 9, 1), None);
    }
}
