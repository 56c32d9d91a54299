//! Nutmeg - supervise media tools from the command line
//!
//! This library crate exposes configuration and the run loop for
//! integration testing. The supervision itself lives in `nutmeg-av`.

pub mod config;
pub mod runner;

pub use nutmeg_av as av;
