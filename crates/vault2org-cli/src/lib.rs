//! vault2org command line front end
//!
//! Argument parsing, logging setup and progress output around
//! `vault2org-pipeline`.

pub mod cli;
pub mod convert;
pub mod logging;
pub mod progress;
