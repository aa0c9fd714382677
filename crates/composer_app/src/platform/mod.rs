mod app;
mod commands;
mod config;
mod persistence;
mod render;

pub use app::run_app;
