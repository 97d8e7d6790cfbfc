pub mod calibration;
pub mod engine;
