//! Session configuration and the preview driver.

pub mod config;
pub mod preview;
