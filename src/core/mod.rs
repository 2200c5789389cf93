//! Core Module - the page renderer

pub mod escape;
pub mod render;

pub use escape::*;
pub use render::*;
