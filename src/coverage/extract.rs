use std::fmt;

use super::model::CoverageModel;

/// A covered source line, rendered as `<class>:<line>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractedRecord {
    pub class_name: String,
    pub line: u32,
}

impl ExtractedRecord {
    pub fn new<S: Into<String>>(class_name: S, line: u32) -> Self {
        Self {
            class_name: class_name.into(),
            line,
        }
    }
}

impl fmt::Display for ExtractedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class_name, self.line)
    }
}

/// Lazily walks the model and yields every partly or fully covered line
///
/// Order is package order, then class order, then ascending line number.
pub fn covered_lines(model: &CoverageModel) -> impl Iterator<Item = ExtractedRecord> + '_ {
    model.classes().flat_map(|class| {
        class
            .lines()
            .filter(|(_, status)| status.is_covered())
            .map(move |(line, _)| ExtractedRecord::new(class.name(), line))
    })
}

/// Collects all covered lines of the model
pub fn extract(model: &CoverageModel) -> Vec<ExtractedRecord> {
    covered_lines(model).collect()
}
