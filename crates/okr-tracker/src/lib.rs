pub mod config;
pub mod error;
pub mod okr;
pub mod scoring;
pub mod telemetry;
