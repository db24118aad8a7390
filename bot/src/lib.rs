pub mod api;
pub mod config;
pub mod event;
pub mod logging;
pub mod messages;
pub mod runner;
