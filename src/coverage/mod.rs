//! Coverage model, covered-line extraction and CSV output.

pub mod csv;
pub mod extract;
pub mod model;

pub use csv::{render, write_records};
pub use extract::{covered_lines, extract, ExtractedRecord};
pub use model::{ClassCoverage, CoverageModel, LineStatus, PackageCoverage};
