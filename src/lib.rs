//! subtrans - context-aware SRT subtitle translation
//!
//! Subtitles are parsed into per-line units, grouped into fixed-size context
//! windows and translated concurrently, with a fallback backend taking over
//! any window the primary backend fails on.

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod server;
pub mod subtitle;
pub mod translate;
pub mod window;
pub mod workflow;
