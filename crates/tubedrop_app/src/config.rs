use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use engine_logging::LogDestination;
use log::LevelFilter;
use tubedrop_engine::{ClientSettings, DEFAULT_SERVER};

const DEFAULT_PLAYER: &str = "ffplay -nodisp -autoexit -loglevel quiet";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientSettings,
    /// Program and leading arguments; the stream URL is appended.
    pub player: Vec<String>,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub initial_url: Option<String>,
}

pub fn build_cli() -> Command {
    Command::new("tubedrop")
        .about("Terminal front-end for an mp3 download server")
        .arg(
            Arg::new("url")
                .help("Video link to pre-fill the input with")
                .num_args(1),
        )
        .arg(
            Arg::new("server")
                .long("server")
                .help("Base URL of the download server")
                .default_value(DEFAULT_SERVER)
                .num_args(1),
        )
        .arg(
            Arg::new("download_dir")
                .long("download-dir")
                .help("Where saved files are written")
                .default_value("./downloads")
                .num_args(1),
        )
        .arg(
            Arg::new("player")
                .long("player")
                .help("Command used to play a stream URL")
                .default_value(DEFAULT_PLAYER)
                .num_args(1),
        )
        .arg(
            Arg::new("timeout_secs")
                .long("timeout-secs")
                .help("Timeout for JSON requests, in seconds")
                .default_value("30")
                .num_args(1),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .help("Log destination: file, terminal or both")
                .default_value("file")
                .num_args(1),
        )
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .help("Log file path")
                .default_value("./tubedrop.log")
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output")
                .action(ArgAction::SetTrue),
        )
}

impl AppConfig {
    pub fn from_args() -> Result<Self> {
        Self::from_matches(&build_cli().get_matches())
    }

    pub fn from_matches(m: &ArgMatches) -> Result<Self> {
        let value = |id: &str| -> Result<String> {
            m.get_one::<String>(id)
                .cloned()
                .ok_or_else(|| anyhow!("missing value for --{id}"))
        };

        let timeout_secs: u64 = value("timeout_secs")?
            .parse()
            .context("--timeout-secs must be a whole number")?;
        if timeout_secs == 0 {
            bail!("--timeout-secs must be greater than zero");
        }

        let player: Vec<String> = value("player")?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if player.is_empty() {
            bail!("--player must name a program");
        }

        let log = value("log")?;
        let log_destination = LogDestination::parse(&log)
            .ok_or_else(|| anyhow!("unknown log destination {log:?}"))?;

        let client = ClientSettings {
            server: value("server")?,
            request_timeout: Duration::from_secs(timeout_secs),
            download_dir: PathBuf::from(value("download_dir")?),
            ..ClientSettings::default()
        };

        Ok(Self {
            client,
            player,
            log_destination,
            log_file: PathBuf::from(value("log_file")?),
            log_level: if m.get_flag("verbose") {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            initial_url: m.get_one::<String>("url").cloned(),
        })
    }
}
