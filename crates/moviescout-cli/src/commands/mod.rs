pub mod browse;
pub mod catalog;
pub mod config;
pub mod fetch_ui;
pub mod prompts;
