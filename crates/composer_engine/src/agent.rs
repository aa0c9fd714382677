use std::collections::VecDeque;
use std::io;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use composer_core::Activity;
use composer_logging::{composer_debug, composer_info};
use thiserror::Error;
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::SubmissionChannel;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to start agent runtime: {0}")]
    Runtime(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// How long the agent "thinks" before replying to a prompt.
    pub reply_delay: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    Busy,
    Idle,
    Replied { prompt: String, reply: String },
    Cancelled { prompt: String },
}

impl AgentEvent {
    /// Activity transition carried by this event, if any.
    pub fn activity(&self) -> Option<Activity> {
        match self {
            AgentEvent::Busy => Some(Activity::Busy),
            AgentEvent::Idle => Some(Activity::Idle),
            AgentEvent::Replied { .. } | AgentEvent::Cancelled { .. } => None,
        }
    }
}

enum AgentCommand {
    Prompt(String),
}

/// Stand-in agent for the terminal app: answers prompts one at a time after
/// a fixed delay and reports busy/idle transitions.
pub struct ScriptedAgent {
    cmd_tx: async_mpsc::UnboundedSender<AgentCommand>,
    current: Arc<Mutex<CancellationToken>>,
    event_rx: mpsc::Receiver<AgentEvent>,
}

impl ScriptedAgent {
    pub fn new(settings: AgentSettings) -> Result<Self, AgentError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let current = Arc::new(Mutex::new(CancellationToken::new()));
        let worker_current = current.clone();

        thread::spawn(move || {
            runtime.block_on(run_agent(settings, cmd_rx, event_tx, worker_current));
        });

        Ok(Self {
            cmd_tx,
            current,
            event_rx,
        })
    }

    pub fn try_recv(&self) -> Option<AgentEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<AgentEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl SubmissionChannel for ScriptedAgent {
    fn dispatch(&self, text: &str) {
        let _ = self.cmd_tx.send(AgentCommand::Prompt(text.to_string()));
    }

    fn cancel(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

async fn run_agent(
    settings: AgentSettings,
    mut cmd_rx: async_mpsc::UnboundedReceiver<AgentCommand>,
    event_tx: mpsc::Sender<AgentEvent>,
    current: Arc<Mutex<CancellationToken>>,
) {
    let mut pending: VecDeque<String> = VecDeque::new();
    let mut busy = false;

    loop {
        let prompt = match pending.pop_front() {
            Some(prompt) => prompt,
            None => match cmd_rx.recv().await {
                Some(AgentCommand::Prompt(prompt)) => prompt,
                None => break,
            },
        };

        // The token is in place before Busy goes out, so a cancel issued in
        // response to Busy always reaches this prompt.
        let token = {
            let mut slot = current.lock().unwrap_or_else(PoisonError::into_inner);
            *slot = CancellationToken::new();
            slot.clone()
        };

        if !busy {
            busy = true;
            let _ = event_tx.send(AgentEvent::Busy);
        }

        composer_debug!("Agent working on {:?}", prompt);
        let event = tokio::select! {
            _ = tokio::time::sleep(settings.reply_delay) => AgentEvent::Replied {
                reply: format!("Done: {prompt}"),
                prompt,
            },
            _ = token.cancelled() => {
                composer_info!("Agent cancelled while working on {:?}", prompt);
                AgentEvent::Cancelled { prompt }
            }
        };
        let _ = event_tx.send(event);

        while let Ok(AgentCommand::Prompt(prompt)) = cmd_rx.try_recv() {
            pending.push_back(prompt);
        }
        if pending.is_empty() {
            busy = false;
            let _ = event_tx.send(AgentEvent::Idle);
        }
    }
}
