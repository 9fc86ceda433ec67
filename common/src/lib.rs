// Common library for the recording-schedule daemon

pub mod config;
pub mod crontime;
pub mod errors;
pub mod loader;
pub mod models;
pub mod recorder;
pub mod scheduler;
pub mod stream;
pub mod telemetry;
pub mod validate;
