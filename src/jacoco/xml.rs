//! Conversion of a JaCoCo XML report into a [`CoverageModel`].
//!
//! The report lists line counters per source file, not per class. Every
//! method carries its start line and, in its `LINE` counter, the number of
//! lines holding its code. Methods claim lines starting from their start
//! line, latest start first, so a class nested inside a method body claims
//! its lines before the enclosing method. The enclosing method then skips
//! over them and continues after the nested class. A line claimed by the
//! constructor of a nested class on its own start line is shared, since the
//! declaration `new T() {` holds code of both classes.
//!
//! Methods without a `LINE` counter claim lines until they reach a line
//! owned by another method. Lines left unclaimed go to the class with the
//! nearest preceding method start.

use std::collections::{BTreeMap, HashMap};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::coverage::{ClassCoverage, CoverageModel, LineStatus, PackageCoverage};
use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawMethod {
    start: u32,
    /// Lines with code, from the method's `LINE` counter
    lines: Option<u32>,
    constructor: bool,
}

#[derive(Debug, Default)]
struct RawClass {
    name: String,
    source_file: Option<String>,
    methods: Vec<RawMethod>,
}

#[derive(Debug, Default)]
struct RawPackage {
    name: String,
    classes: Vec<RawClass>,
    sources: HashMap<String, BTreeMap<u32, LineStatus>>,
}

impl RawPackage {
    /// Indices of the classes owning each line of `source`
    fn owners(
        &self,
        source: &str,
        lines: &BTreeMap<u32, LineStatus>,
    ) -> BTreeMap<u32, Vec<usize>> {
        let mut methods: Vec<(usize, RawMethod)> = self
            .classes
            .iter()
            .enumerate()
            .filter(|(_, class)| class.source_file.as_deref() == Some(source))
            .flat_map(|(idx, class)| class.methods.iter().map(move |&method| (idx, method)))
            .collect();
        methods.sort_by(|(_, a), (_, b)| b.start.cmp(&a.start));

        let mut claims: BTreeMap<u32, Vec<(usize, RawMethod)>> = BTreeMap::new();
        for &(class, method) in &methods {
            let mut taken = 0;
            for (&nr, _) in lines.range(method.start..) {
                if method.lines.is_some_and(|n| taken >= n) {
                    break;
                }
                let holders = claims.entry(nr).or_default();
                let shared = holders.iter().all(|(_, other)| {
                    other.start == nr && (other.constructor || other.start == method.start)
                });
                if shared {
                    holders.push((class, method));
                    taken += 1;
                } else if method.lines.is_none() {
                    break;
                }
            }
        }

        let mut starts: Vec<(u32, usize)> = methods
            .iter()
            .map(|&(class, method)| (method.start, class))
            .collect();
        starts.sort_unstable();

        lines
            .keys()
            .filter_map(|&nr| {
                let mut owners: Vec<usize> = claims
                    .get(&nr)
                    .map(|holders| holders.iter().map(|&(class, _)| class).collect())
                    .unwrap_or_default();
                if owners.is_empty() {
                    let pos = starts.partition_point(|&(start, _)| start <= nr);
                    owners.extend(
                        pos.checked_sub(1)
                            .and_then(|i| starts.get(i))
                            .map(|&(_, class)| class),
                    );
                }
                owners.sort_unstable();
                owners.dedup();
                (!owners.is_empty()).then_some((nr, owners))
            })
            .collect()
    }

    fn into_package(self) -> PackageCoverage {
        let mut classes: Vec<ClassCoverage> = self
            .classes
            .iter()
            .map(|raw| {
                let class = ClassCoverage::new(raw.name.as_str());
                match &raw.source_file {
                    Some(source) => class.with_source_file(source.as_str()),
                    None => class,
                }
            })
            .collect();

        for (source, lines) in &self.sources {
            let owners = self.owners(source, lines);
            for (&nr, &status) in lines {
                let Some(owned_by) = owners.get(&nr) else {
                    debug!(source = %source, line = nr, "line without owning class");
                    continue;
                };
                for &idx in owned_by {
                    classes[idx].set_line(nr, status);
                }
            }
        }

        classes
            .into_iter()
            .fold(PackageCoverage::new(self.name), PackageCoverage::with_class)
    }
}

fn malformed(err: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::MalformedReport(err.to_string())
}

fn attr(element: &BytesStart<'_>, key: &str) -> Result<Option<String>, AnalysisError> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(malformed)?;
        if attribute.key.as_ref() == key.as_bytes() {
            let value = attribute.unescape_value().map_err(malformed)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attr(element: &BytesStart<'_>, key: &str) -> Result<String, AnalysisError> {
    attr(element, key)?.ok_or_else(|| {
        malformed(format!(
            "<{}> without {key} attribute",
            String::from_utf8_lossy(element.name().as_ref())
        ))
    })
}

fn number_attr(element: &BytesStart<'_>, key: &str) -> Result<u32, AnalysisError> {
    let value = required_attr(element, key)?;
    value
        .parse()
        .map_err(|_| malformed(format!("invalid {key} value '{value}'")))
}

#[derive(Debug, Default)]
struct ReportParser {
    model: CoverageModel,
    package: Option<RawPackage>,
    class: Option<RawClass>,
    method: Option<RawMethod>,
    source: Option<String>,
}

impl ReportParser {
    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), AnalysisError> {
        match element.name().as_ref() {
            b"package" => {
                self.package = Some(RawPackage {
                    name: required_attr(element, "name")?,
                    ..RawPackage::default()
                });
            }
            b"class" if self.package.is_some() => {
                self.class = Some(RawClass {
                    name: required_attr(element, "name")?,
                    source_file: attr(element, "sourcefilename")?,
                    methods: Vec::new(),
                });
            }
            b"method" => {
                self.method = None;
                if let (Some(_), Some(line)) = (&self.class, attr(element, "line")?) {
                    let start = line
                        .parse()
                        .map_err(|_| malformed(format!("invalid method line '{line}'")))?;
                    self.method = Some(RawMethod {
                        start,
                        lines: None,
                        constructor: attr(element, "name")?.as_deref() == Some("<init>"),
                    });
                }
            }
            b"counter" => {
                if let Some(method) = self.method.as_mut() {
                    if attr(element, "type")?.as_deref() == Some("LINE") {
                        let missed = number_attr(element, "missed")?;
                        let covered = number_attr(element, "covered")?;
                        method.lines = Some(missed.saturating_add(covered));
                    }
                }
            }
            b"sourcefile" if self.package.is_some() => {
                self.source = Some(required_attr(element, "name")?);
            }
            b"line" => {
                if let (Some(package), Some(source)) = (self.package.as_mut(), &self.source) {
                    let nr = number_attr(element, "nr")?;
                    let status = LineStatus::from_counters(
                        number_attr(element, "mi")?,
                        number_attr(element, "ci")?,
                        number_attr(element, "mb")?,
                        number_attr(element, "cb")?,
                    );
                    if let Some(status) = status {
                        package
                            .sources
                            .entry(source.clone())
                            .or_default()
                            .insert(nr, status);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"method" => {
                if let (Some(class), Some(method)) = (self.class.as_mut(), self.method.take()) {
                    class.methods.push(method);
                }
            }
            b"class" => {
                if let (Some(package), Some(class)) = (self.package.as_mut(), self.class.take()) {
                    package.classes.push(class);
                }
            }
            b"sourcefile" => self.source = None,
            b"package" => {
                if let Some(package) = self.package.take() {
                    self.model.push(package.into_package());
                }
            }
            _ => {}
        }
    }
}

/// Parses a JaCoCo XML report
///
/// Packages and classes keep their document order; `group` elements are
/// flattened.
///
/// # Errors
/// * If the document is not well-formed or a required attribute is missing
pub fn parse_report(xml: &str, bundle: &str) -> Result<CoverageModel, AnalysisError> {
    let mut reader = Reader::from_str(xml);
    let mut parser = ReportParser {
        model: CoverageModel::new(bundle),
        ..ReportParser::default()
    };

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(element) => parser.open(&element)?,
            Event::Empty(element) => {
                parser.open(&element)?;
                parser.close(element.name().as_ref());
            }
            Event::End(element) => parser.close(element.name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    if parser.package.is_some() {
        return Err(malformed("unterminated <package> element"));
    }
    Ok(parser.model)
}
