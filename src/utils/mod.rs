//! Small helpers shared by the platform probes

pub mod command;
pub mod file;
pub mod parsing;
