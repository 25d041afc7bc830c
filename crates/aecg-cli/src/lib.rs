//! Library side of the `aecg` command-line tool.

pub mod logging;
pub mod summary;
pub mod watchdog;
