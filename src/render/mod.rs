//! CPU compositing of preview frames.

pub mod compositor;
