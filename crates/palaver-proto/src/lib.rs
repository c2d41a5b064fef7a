//! # palaver-proto
//!
//! Shared wire protocol for the Palaver chat service: the text command
//! grammar spoken over newline-delimited TCP frames, plus the protocol
//! constants both the server and the client rely on.

pub mod command;
pub mod constants;

pub use command::Command;
