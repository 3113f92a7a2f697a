//! Extracts covered source lines from JaCoCo execution data.
//!
//! Execution data is loaded natively, class files are analyzed through
//! `jacococli.jar`, and every partly or fully covered line is written as
//! `<class>:<line>` into a single comma separated line.

pub mod argument_aggregator;
pub mod cli;
pub mod commands;
pub mod coverage;
pub mod error;
pub mod jacoco;
pub mod layout;
pub mod pipeline;
pub mod utils;
