// Common library for shared code across the scheduler and API binaries

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod duration;
pub mod errors;
pub mod models;
pub mod notify;
pub mod ocr;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod telemetry;
