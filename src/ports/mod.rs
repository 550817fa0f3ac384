//! Port traits: the narrow interfaces the pipeline talks to.

pub mod config_port;
pub mod price_port;
pub mod report_port;
pub mod universe_port;
