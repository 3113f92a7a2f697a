//! Error types for each stage of the extraction pipeline.
//!
//! Every stage returns its own error kind so a failed run always says which
//! step broke: loading execution data, analyzing class files, rendering the
//! HTML report, or writing the CSV.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure while reading execution data into a store
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read execution data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid execution data file {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Incompatible execution data version {found:#06x} in {path} (expected {expected:#06x})")]
    IncompatibleVersion {
        path: PathBuf,
        found: u16,
        expected: u16,
    },

    #[error("Unknown block type {block:#04x} at offset {offset} in {path}")]
    UnknownBlock {
        path: PathBuf,
        block: u8,
        offset: u64,
    },

    #[error("Truncated execution data file {path} at offset {offset}")]
    Truncated { path: PathBuf, offset: u64 },

    #[error("Different class names {existing} and {incoming} for id {id:016x}")]
    ClassNameMismatch {
        id: u64,
        existing: String,
        incoming: String,
    },

    #[error("Incompatible execution data for class {name} with id {id:016x}")]
    ProbeCountMismatch { id: u64, name: String },

    #[error("No execution data files given")]
    NoInput,
}

/// Failure while building the coverage model from class files
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Class directory does not exist: {0}")]
    MissingClassDirectory(PathBuf),

    #[error("JaCoCo command line jar not found: {0}")]
    MissingJar(PathBuf),

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed ({status}): {stderr}")]
    ToolFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Malformed coverage report: {0}")]
    MalformedReport(String),

    #[error("Failed to prepare analyzer input: {0}")]
    Io(#[from] io::Error),
}

/// Failure while rendering the HTML report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Tool(#[from] AnalysisError),
}

/// Failure while writing the CSV output
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create output file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A pipeline failure tagged with the stage it happened in
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Loading execution data failed")]
    Load(#[from] LoadError),

    #[error("Analyzing {class_dir} failed")]
    Analysis {
        class_dir: PathBuf,
        #[source]
        source: AnalysisError,
    },

    #[error("Rendering HTML report failed")]
    Report(#[from] ReportError),

    #[error("Writing covered lines failed")]
    Write(#[from] WriteError),
}
