pub mod app_dirs;
pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod logging;
pub mod profile;
pub mod reminders;
pub mod runtime;
pub mod session;
pub mod summary;
pub mod workout;
