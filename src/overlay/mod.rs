pub mod placement;
pub mod position;
