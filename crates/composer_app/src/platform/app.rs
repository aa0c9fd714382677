use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use composer_core::{HistoryDirection, HistoryNavigator, MessageId, Msg};
use composer_engine::{
    AgentEvent, BackgroundStore, ComposerDriver, FileQueueStore, ScriptedAgent,
    SubmissionChannel, SystemClock,
};
use composer_logging::{composer_info, composer_warn};

use super::commands::{self, Command, HELP};
use super::config::{AppConfig, DEFAULT_CONFIG_FILE};
use super::persistence::HistoryFile;
use super::render;

enum AppEvent {
    Line(String),
    InputClosed,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let (config, config_error) = match AppConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    composer_logging::initialize(&config.log_destination(), config.level_filter());
    if let Some(err) = config_error {
        eprintln!("Warning: {err:#}; using the default configuration");
        composer_warn!("{:#}; using the default configuration", err);
    }
    composer_info!("Starting composer with config {:?}", config);

    fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("cannot use state directory {:?}", config.state_dir))?;
    let agent = ScriptedAgent::new(config.agent_settings()).context("failed to start the agent")?;
    let store = BackgroundStore::new(FileQueueStore::new(&config.state_dir));
    let driver = ComposerDriver::new(
        config.composer_settings(),
        Box::new(store),
        agent,
        Box::new(SystemClock),
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    spawn_input_reader(event_tx.clone());
    spawn_ticker(event_tx, config.tick_interval());

    let mut session = Session::new(driver, HistoryFile::new(&config.state_dir));
    session.start();

    while let Ok(event) = event_rx.recv() {
        let flow = match event {
            AppEvent::Line(line) => session.handle_line(&line),
            AppEvent::InputClosed => Flow::Quit,
            AppEvent::Tick => {
                session.tick();
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
        session.drain_agent();
        session.pump();
    }

    composer_info!("Shutting down");
    Ok(())
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if event_tx.send(AppEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    composer_warn!("Failed to read from stdin: {}", err);
                    break;
                }
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

// Drives agent polling and timers while the user is not typing.
fn spawn_ticker(event_tx: mpsc::Sender<AppEvent>, interval: Duration) {
    thread::spawn(move || {
        while event_tx.send(AppEvent::Tick).is_ok() {
            thread::sleep(interval);
        }
    });
}

struct Session<C> {
    driver: ComposerDriver<C>,
    history: HistoryNavigator,
    history_file: HistoryFile,
    /// Text brought back by `/up` and `/down`, sent by an empty line.
    recalled: String,
}

impl<C: SubmissionChannel> Session<C> {
    fn new(driver: ComposerDriver<C>, history_file: HistoryFile) -> Self {
        Self {
            driver,
            history: HistoryNavigator::new(),
            history_file,
            recalled: String::new(),
        }
    }

    fn start(&mut self) {
        self.history.set_histories(self.history_file.load(), Vec::new());
        self.driver.start();

        println!("composer ready, /help lists commands");
        let view = self.driver.view();
        if view.queue_len > 0 {
            println!("restored {} queued message(s)", view.queue_len);
            print_lines(render::queue_lines(&view));
        }
        self.driver.consume_dirty();
        println!("{}", render::status_line(&view));
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match commands::parse(line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                return Flow::Continue;
            }
        };

        match command {
            Command::Submit(text) => self.submit(text),
            Command::SubmitRecalled => {
                if !self.recalled.is_empty() {
                    let text = std::mem::take(&mut self.recalled);
                    self.submit(text);
                }
            }
            Command::ShowQueue => print_lines(render::queue_lines(&self.driver.view())),
            Command::Remove(id) => self.with_queued(id, Msg::RemoveFromQueue(id)),
            Command::Clear => self.apply(Msg::ClearQueue),
            Command::Edit { id, text } => {
                self.with_queued(id, Msg::EditQueuedMessage { id, content: text })
            }
            Command::BeginEdit(id) => self.with_queued(id, Msg::BeginEdit(id)),
            Command::EndEdit => self.apply(Msg::EndEdit),
            Command::Move { id, position } => {
                match commands::reordered_ids(self.driver.state().queue(), id, position) {
                    Some(order) => self.apply(Msg::ReorderQueue(order)),
                    None => println!("no queued message #{id}"),
                }
            }
            Command::SendNow(id) => self.with_queued(id, Msg::SendNow(id)),
            Command::Stop => self.apply(Msg::StopRequested),
            Command::HistoryUp => self.recall(HistoryDirection::Older),
            Command::HistoryDown => self.recall(HistoryDirection::Newer),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn submit(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        self.recalled.clear();
        // Whether this was sent or queued, the input is clean again.
        self.history.reset();
        self.apply(Msg::Submit(text));
    }

    fn recall(&mut self, direction: HistoryDirection) {
        match self.history.navigate(direction, &self.recalled) {
            Some(text) => {
                if text.is_empty() {
                    println!("(recall cleared)");
                } else {
                    println!("recalled: {text}  (empty line sends it)");
                }
                self.recalled = text;
            }
            None => println!("(nothing to recall)"),
        }
    }

    fn with_queued(&mut self, id: MessageId, msg: Msg) {
        if self.driver.state().queue().iter().any(|message| message.id == id) {
            self.apply(msg);
        } else {
            println!("no queued message #{id}");
        }
    }

    fn apply(&mut self, msg: Msg) {
        let sent = self.driver.handle(msg);
        self.record_sent(&sent);
    }

    /// Only text that actually went to the agent enters the history.
    fn record_sent(&mut self, sent: &[String]) {
        if sent.is_empty() {
            return;
        }
        report_sent(sent);
        for text in sent {
            self.history.record_sent(text);
        }
        self.history_file.save(self.history.global());
    }

    fn tick(&mut self) {
        self.apply(Msg::Tick);
    }

    /// Fires due timers, then redraws if anything changed.
    fn pump(&mut self) {
        let sent = self.driver.poll_timers();
        self.record_sent(&sent);

        if self.driver.consume_dirty() {
            println!("{}", render::status_line(&self.driver.view()));
        }
    }
}

impl Session<ScriptedAgent> {
    /// Feeds the agent's replies and busy/idle reports into the driver.
    fn drain_agent(&mut self) {
        while let Some(event) = self.driver.channel().try_recv() {
            match &event {
                AgentEvent::Replied { reply, .. } => println!("agent: {reply}"),
                AgentEvent::Cancelled { prompt } => println!("agent: cancelled {prompt:?}"),
                AgentEvent::Busy | AgentEvent::Idle => {}
            }
            if let Some(activity) = event.activity() {
                self.apply(Msg::ActivityObserved(activity));
            }
        }
    }
}

fn report_sent(sent: &[String]) {
    for text in sent {
        println!("sent: {text}");
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_core::{Activity, ComposerSettings};
    use composer_engine::{ManualClock, MemoryQueueStore};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingChannel {
        dispatched: Mutex<Vec<String>>,
    }

    impl SubmissionChannel for RecordingChannel {
        fn dispatch(&self, text: &str) {
            self.dispatched.lock().unwrap().push(text.to_string());
        }

        fn cancel(&self) {}
    }

    struct Fixture {
        session: Session<Arc<RecordingChannel>>,
        channel: Arc<RecordingChannel>,
        clock: ManualClock,
        _temp: TempDir,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let channel = Arc::new(RecordingChannel::default());
        let clock = ManualClock::new();
        let driver = ComposerDriver::new(
            ComposerSettings::default(),
            Box::new(MemoryQueueStore::default()),
            channel.clone(),
            Box::new(clock.clone()),
        );
        let session = Session::new(driver, HistoryFile::new(temp.path()));
        Fixture {
            session,
            channel,
            clock,
            _temp: temp,
        }
    }

    fn sent(fixture: &Fixture) -> Vec<String> {
        fixture.channel.dispatched.lock().unwrap().clone()
    }

    #[test]
    fn history_holds_the_edited_text_that_went_out() {
        let mut f = fixture();
        f.session.apply(Msg::ActivityObserved(Activity::Busy));
        f.session.handle_line("A");
        assert!(f.session.history.local().is_empty());

        let id = f.session.driver.state().queue()[0].id;
        f.session.handle_line(&format!("/edit {id} B"));
        f.session.apply(Msg::ActivityObserved(Activity::Idle));

        assert_eq!(sent(&f), vec!["B"]);
        assert_eq!(f.session.history.local(), ["B"]);
        assert_eq!(f.session.history.global(), ["B"]);
    }

    #[test]
    fn removed_and_cleared_messages_never_reach_history() {
        let mut f = fixture();
        f.session.apply(Msg::ActivityObserved(Activity::Busy));
        f.session.handle_line("dropped");
        f.session.handle_line("cleared");
        let id = f.session.driver.state().queue()[0].id;
        f.session.handle_line(&format!("/rm {id}"));
        f.session.handle_line("/clear");
        f.session.apply(Msg::ActivityObserved(Activity::Idle));

        assert!(sent(&f).is_empty());
        assert!(f.session.history.local().is_empty());
    }

    #[test]
    fn timer_driven_sends_are_recorded() {
        let mut f = fixture();
        f.session.apply(Msg::ActivityObserved(Activity::Busy));
        f.session.handle_line("first");
        f.session.handle_line("second");
        let second = f.session.driver.state().queue()[1].id;

        f.session.handle_line(&format!("/send {second}"));
        f.session.apply(Msg::ActivityObserved(Activity::Idle));
        assert_eq!(f.session.history.local(), ["second"]);

        f.clock.advance(ComposerSettings::default().settle_delay);
        f.session.pump();

        assert_eq!(sent(&f), vec!["second", "first"]);
        assert_eq!(f.session.history.local(), ["second", "first"]);
    }

    #[test]
    fn recorded_history_is_saved_for_the_next_session() {
        let mut f = fixture();
        f.session.handle_line("hello");
        assert_eq!(sent(&f), vec!["hello"]);

        f.session.handle_line("again");
        assert_eq!(
            f.session.history_file.load(),
            vec!["hello".to_string(), "again".to_string()]
        );
    }
}
