pub mod frame;
pub mod topology;
