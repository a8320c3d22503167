mod config;
mod platform;

fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_args()?;
    platform::run_app(config)
}
