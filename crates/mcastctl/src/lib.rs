//! mcastctl - multicast state summaries for network operators
//!
//! Library half of the binary, split out so runs can be driven in tests.

pub mod app;
pub mod cli;
pub mod errors;
pub mod logging;
pub mod output;
pub mod ssh_session;
