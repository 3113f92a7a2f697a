//! The extraction pipeline: load execution data, analyze class directories,
//! optionally render the HTML report, then write the covered lines.
//!
//! Loading, analysis and rendering are capabilities behind traits so the
//! driver can run against the JaCoCo tooling or against test doubles.

use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn};

use crate::coverage::{extract, write_records, CoverageModel};
use crate::error::{AnalysisError, LoadError, PipelineError, ReportError};
use crate::jacoco::ExecutionStore;

/// Reads recorded execution data into a store
pub trait ExecutionDataLoader {
    /// Loads and merges all `paths` in order
    ///
    /// # Errors
    /// * If any file is missing, corrupt or conflicts with an earlier one
    fn load(&self, paths: &[PathBuf]) -> Result<ExecutionStore, LoadError>;
}

/// Builds a coverage model by matching execution data against class files
pub trait StructureAnalyzer {
    /// Analyzes every class below `class_dir`
    ///
    /// # Errors
    /// * If the class files cannot be analyzed
    fn analyze(
        &self,
        store: &ExecutionStore,
        class_dir: &Path,
        bundle: &str,
    ) -> Result<CoverageModel, AnalysisError>;
}

/// Renders an HTML coverage report
pub trait HtmlReporter {
    /// # Errors
    /// * If the report cannot be rendered
    fn render(
        &self,
        store: &ExecutionStore,
        class_dirs: &[PathBuf],
        report: &HtmlReport,
        bundle: &str,
    ) -> Result<(), ReportError>;
}

/// Settings for the optional HTML report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlReport {
    pub report_dir: PathBuf,
    pub source_dirs: Vec<PathBuf>,
    pub encoding: String,
    pub tab_width: u32,
}

/// Every path one pipeline run touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bundle name, shown in the HTML report
    pub title: String,
    /// Execution data files, merged in order
    pub exec_files: Vec<PathBuf>,
    /// Class directories, analyzed in order
    pub class_dirs: Vec<PathBuf>,
    pub html: Option<HtmlReport>,
    /// Destination of the covered-lines CSV
    pub output: PathBuf,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub output: PathBuf,
    pub report_dir: Option<PathBuf>,
}

pub struct Pipeline<'a> {
    loader: &'a dyn ExecutionDataLoader,
    analyzer: &'a dyn StructureAnalyzer,
    reporter: Option<&'a dyn HtmlReporter>,
}

impl<'a> Pipeline<'a> {
    pub fn new(loader: &'a dyn ExecutionDataLoader, analyzer: &'a dyn StructureAnalyzer) -> Self {
        Self {
            loader,
            analyzer,
            reporter: None,
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: &'a dyn HtmlReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Runs all stages once; the first failure aborts the run
    ///
    /// # Errors
    /// * [`PipelineError::Load`] if the execution data cannot be loaded
    /// * [`PipelineError::Analysis`] if any class directory fails to analyze
    /// * [`PipelineError::Report`] if the HTML report cannot be rendered
    /// * [`PipelineError::Write`] if the CSV cannot be written
    pub fn run(&self, config: &PipelineConfig) -> Result<Summary, PipelineError> {
        let _span = info_span!("pipeline", title = %config.title).entered();

        let store = self.loader.load(&config.exec_files)?;

        let mut model = CoverageModel::new(config.title.as_str());
        for class_dir in &config.class_dirs {
            let part = self
                .analyzer
                .analyze(&store, class_dir, &config.title)
                .map_err(|source| PipelineError::Analysis {
                    class_dir: class_dir.clone(),
                    source,
                })?;
            info!(
                class_dir = %class_dir.display(),
                classes = part.classes().count(),
                "analyzed class directory"
            );
            model.append(part);
        }

        let report_dir = match (&config.html, self.reporter) {
            (Some(html), Some(reporter)) => {
                reporter.render(&store, &config.class_dirs, html, &config.title)?;
                info!(report_dir = %html.report_dir.display(), "rendered HTML report");
                Some(html.report_dir.clone())
            }
            (Some(_), None) => {
                warn!("HTML report requested but no reporter available, skipping");
                None
            }
            (None, _) => None,
        };

        let records = extract(&model);
        write_records(&records, &config.output)?;
        info!(records = records.len(), output = %config.output.display(), "wrote covered lines");

        Ok(Summary {
            records: records.len(),
            output: config.output.clone(),
            report_dir,
        })
    }
}
