use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_logging::{engine_debug, engine_info};
use tubedrop_core::{update, AppState, Msg};

use super::effects::EffectRunner;
use super::ui::commands::{self, Command, HELP};
use super::ui::render::TerminalRenderer;
use crate::config::AppConfig;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the dispatch loop reacts to.
pub enum AppEvent {
    Msg(Msg),
    Line(String),
    InputClosed,
}

pub fn run_app(config: AppConfig) -> Result<()> {
    engine_logging::initialize(config.log_destination, config.log_level, &config.log_file);
    engine_info!("tubedrop starting against {}", config.client.server);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(config.client, config.player, event_tx.clone())
        .context("failed to start the request engine")?;

    spawn_ticker(event_tx.clone());
    spawn_input_reader(event_tx);

    let mut app = App {
        state: AppState::new(),
        runner,
        renderer: TerminalRenderer::new(),
    };
    app.renderer.say("tubedrop: paste a YouTube link, or type `help`.");
    app.dispatch(Msg::Started);
    if let Some(url) = config.initial_url {
        app.dispatch(Msg::InputChanged(url));
    }

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Msg(msg) => {
                let tick = matches!(msg, Msg::Tick(_));
                app.dispatch(msg);
                if tick {
                    if let Some(ended) = app.runner.poll_player() {
                        app.dispatch(ended);
                    }
                }
            }
            AppEvent::Line(line) => {
                if app.handle_line(&line) == Flow::Quit {
                    break;
                }
            }
            AppEvent::InputClosed => break,
        }
    }

    app.runner.shutdown();
    engine_info!("tubedrop exiting");
    Ok(())
}

fn spawn_ticker(tx: mpsc::Sender<AppEvent>) {
    let started = Instant::now();
    thread::spawn(move || loop {
        thread::sleep(TICK_INTERVAL);
        if tx.send(AppEvent::Msg(Msg::Tick(started.elapsed()))).is_err() {
            break;
        }
    });
}

fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            if !matches!(msg, Msg::Tick(_)) {
                engine_debug!("dispatch {:?}", msg);
            }
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            queue.extend(self.runner.run(effects));
        }

        if self.state.consume_dirty() {
            self.renderer.render(&self.state.view());
        }
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match commands::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(message) => {
                self.renderer.say(&message);
                return Flow::Continue;
            }
        };

        match command {
            Command::Quit => return Flow::Quit,
            Command::Help => self.renderer.say(HELP),
            command => match commands::to_msg(command, &self.state.view()) {
                Ok(msg) => self.dispatch(msg),
                Err(message) => self.renderer.say(&message),
            },
        }
        Flow::Continue
    }
}
