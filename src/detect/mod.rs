//! Deterministic stand-ins for the capture and landmark-source capabilities.

pub mod scripted;
