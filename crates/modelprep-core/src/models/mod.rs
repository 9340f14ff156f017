//! Data models: run configuration and the loaded model handle.

pub mod config;
pub mod handle;
