//! Shared utilities for council-rs

pub mod logging;
pub mod text;

pub use logging::init_tracing;
pub use text::strip_comment_lines;
