//! Command line and HTTP front end for the `xsd-bridge` library.

pub mod cli;
pub mod logging;
pub mod server;
