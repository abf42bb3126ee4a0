//! tunedrop library interface
//!
//! Delivers new audio files from a watched directory to a Telegram channel,
//! exactly once per song, with tag-derived title/performer fields and an
//! optional generated caption. Designed to be invoked from cron; one call to
//! [`pipeline::Pipeline::run`] is one complete run.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod types;

pub use crate::error::{Error, Result};
