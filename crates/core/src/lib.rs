//! Shared types, output naming, and the image resize codec.

pub mod error;
pub mod naming;
pub mod resize;
pub mod types;
