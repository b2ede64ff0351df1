// File: snapgrade-tui/src/lib.rs

pub mod commands;
pub mod render;

pub use commands::dispatch;
