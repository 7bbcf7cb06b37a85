pub mod catalog;
pub mod config;
mod config_env;
pub mod diagnosis;
pub mod llm;
pub mod models;
pub mod sessions;
pub mod triage;
