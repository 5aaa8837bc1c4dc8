//! Backend worker: owns the async runtime and the generation client.

pub mod commands;
pub mod runtime;
