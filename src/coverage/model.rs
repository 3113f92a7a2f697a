use std::collections::BTreeMap;

/// Coverage status of a single source line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStatus {
    /// No instruction on the line was executed
    NotCovered,
    /// Some instructions or branches on the line were executed
    PartlyCovered,
    /// Every instruction and branch on the line was executed
    FullyCovered,
}

const NOT_COVERED_BIT: u8 = 0x01;
const FULLY_COVERED_BIT: u8 = 0x02;

impl LineStatus {
    /// Returns true for partly and fully covered lines
    #[must_use]
    pub const fn is_covered(self) -> bool {
        !matches!(self, Self::NotCovered)
    }

    /// Derives a line status from its instruction and branch counters
    ///
    /// Each counter contributes "fully" when something was covered and "not"
    /// when something was missed; a line is partly covered when both show up.
    /// Returns `None` when the line holds no instructions at all.
    #[must_use]
    pub const fn from_counters(
        missed_instructions: u32,
        covered_instructions: u32,
        missed_branches: u32,
        covered_branches: u32,
    ) -> Option<Self> {
        let bits = counter_bits(missed_instructions, covered_instructions)
            | counter_bits(missed_branches, covered_branches);

        match bits {
            0 => None,
            NOT_COVERED_BIT => Some(Self::NotCovered),
            FULLY_COVERED_BIT => Some(Self::FullyCovered),
            _ => Some(Self::PartlyCovered),
        }
    }
}

const fn counter_bits(missed: u32, covered: u32) -> u8 {
    let mut bits = 0;
    if covered > 0 {
        bits |= FULLY_COVERED_BIT;
    }
    if missed > 0 {
        bits |= NOT_COVERED_BIT;
    }
    bits
}

/// Per-line coverage of one class
///
/// The line range is derived from the lines that carry code, so
/// `first_line <= last_line` always holds. Lines inside the range without
/// code report [`LineStatus::NotCovered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCoverage {
    name: String,
    source_file: Option<String>,
    lines: BTreeMap<u32, LineStatus>,
}

impl ClassCoverage {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            source_file: None,
            lines: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_source_file<S: Into<String>>(mut self, source_file: S) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: u32, status: LineStatus) -> Self {
        self.set_line(line, status);
        self
    }

    pub fn set_line(&mut self, line: u32, status: LineStatus) {
        self.lines.insert(line, status);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// First line with code, `None` for classes compiled without line info
    pub fn first_line(&self) -> Option<u32> {
        self.lines.keys().next().copied()
    }

    /// Last line with code, `None` for classes compiled without line info
    pub fn last_line(&self) -> Option<u32> {
        self.lines.keys().next_back().copied()
    }

    pub fn line(&self, line: u32) -> LineStatus {
        self.lines
            .get(&line)
            .copied()
            .unwrap_or(LineStatus::NotCovered)
    }

    /// Every line in `first_line..=last_line` with its status, ascending
    pub fn lines(&self) -> impl Iterator<Item = (u32, LineStatus)> + '_ {
        let range = match (self.first_line(), self.last_line()) {
            (Some(first), Some(last)) => first..=last,
            #[allow(clippy::reversed_empty_ranges)]
            _ => 1..=0,
        };
        range.map(|line| (line, self.line(line)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCoverage {
    name: String,
    classes: Vec<ClassCoverage>,
}

impl PackageCoverage {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: ClassCoverage) -> Self {
        self.classes.push(class);
        self
    }

    pub fn push(&mut self, class: ClassCoverage) {
        self.classes.push(class);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[ClassCoverage] {
        &self.classes
    }
}

/// Package, class and line tree produced by a structure analyzer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageModel {
    name: String,
    packages: Vec<PackageCoverage>,
}

impl CoverageModel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            packages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_package(mut self, package: PackageCoverage) -> Self {
        self.packages.push(package);
        self
    }

    pub fn push(&mut self, package: PackageCoverage) {
        self.packages.push(package);
    }

    /// Moves all packages of `other` behind the packages of `self`
    pub fn append(&mut self, other: Self) {
        self.packages.extend(other.packages);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn packages(&self) -> &[PackageCoverage] {
        &self.packages
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassCoverage> {
        self.packages.iter().flat_map(|p| p.classes.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_counters() {
        assert_eq!(LineStatus::from_counters(0, 0, 0, 0), None);
        assert_eq!(
            LineStatus::from_counters(3, 0, 0, 0),
            Some(LineStatus::NotCovered)
        );
        assert_eq!(
            LineStatus::from_counters(0, 4, 0, 2),
            Some(LineStatus::FullyCovered)
        );
        // All instructions ran but one branch was never taken
        assert_eq!(
            LineStatus::from_counters(0, 4, 1, 1),
            Some(LineStatus::PartlyCovered)
        );
        assert_eq!(
            LineStatus::from_counters(2, 2, 0, 0),
            Some(LineStatus::PartlyCovered)
        );
    }

    #[test]
    fn test_class_line_range() {
        let class = ClassCoverage::new("com/example/Foo")
            .with_line(12, LineStatus::FullyCovered)
            .with_line(10, LineStatus::NotCovered)
            .with_line(15, LineStatus::PartlyCovered);

        assert_eq!(class.first_line(), Some(10));
        assert_eq!(class.last_line(), Some(15));
        assert_eq!(class.line(13), LineStatus::NotCovered);

        let lines: Vec<_> = class.lines().map(|(nr, _)| nr).collect();
        assert_eq!(lines, vec![10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_class_without_line_info() {
        let class = ClassCoverage::new("com/example/Generated");
        assert_eq!(class.first_line(), None);
        assert_eq!(class.lines().count(), 0);
    }

    #[test]
    fn test_model_append_keeps_order() {
        let mut first = CoverageModel::new("bundle")
            .with_package(PackageCoverage::new("a").with_class(ClassCoverage::new("a/A")));
        let second = CoverageModel::new("other")
            .with_package(PackageCoverage::new("b").with_class(ClassCoverage::new("b/B")));

        first.append(second);

        let names: Vec<_> = first.classes().map(ClassCoverage::name).collect();
        assert_eq!(names, vec!["a/A", "b/B"]);
        assert_eq!(first.name(), "bundle");
    }
}
