mod app;
mod effects;
mod player;
mod ui;

pub use app::run_app;
