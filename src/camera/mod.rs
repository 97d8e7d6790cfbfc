pub mod capability;
pub mod platform;
pub mod session;
