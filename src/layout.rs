//! Turns command line targets into explicit [`PipelineConfig`]s.
//!
//! Two layouts are supported: a project root holding the execution data,
//! classes and sources as named children, and an execution data directory
//! paired with a text file listing class roots.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use tracing::warn;

use crate::cli::constants;
use crate::pipeline::{HtmlReport, PipelineConfig};

/// Names of the well-known children of a project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub exec_file: String,
    pub classes_dir: String,
    pub source_dir: String,
    pub report_dir: String,
    pub output_file: String,
    /// Child appended to every root listed in a class-list file
    pub class_subdir: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            exec_file: constants::EXEC_FILE.into(),
            classes_dir: constants::CLASSES_DIR.into(),
            source_dir: constants::SOURCE_DIR.into(),
            report_dir: constants::REPORT_DIR.into(),
            output_file: constants::OUTPUT_FILE.into(),
            class_subdir: constants::CLASSES_DIR.into(),
        }
    }
}

/// HTML rendering switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub html: bool,
    pub encoding: String,
    pub tab_width: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            html: true,
            encoding: constants::SOURCE_ENCODING.into(),
            tab_width: constants::TAB_WIDTH,
        }
    }
}

/// Bundle title derived from a directory name
fn title_of(dir: &Path) -> String {
    let resolved = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| constants::DEFAULT_TITLE.to_string())
}

/// Builds the run configuration for one project root
///
/// # Arguments
/// * `root` - Project directory holding execution data, classes and sources
/// * `layout` - Names of the children of `root`
/// * `report` - Whether and how to render the HTML report
/// * `extra_exec` - Additional execution data files merged after the project's own
/// * `output` - Override for the CSV destination
pub fn project_config(
    root: &Path,
    layout: &Layout,
    report: &ReportSettings,
    extra_exec: &[PathBuf],
    output: Option<&Path>,
) -> PipelineConfig {
    let mut exec_files = vec![root.join(&layout.exec_file)];
    exec_files.extend_from_slice(extra_exec);

    let html = report.html.then(|| HtmlReport {
        report_dir: root.join(&layout.report_dir),
        source_dirs: vec![root.join(&layout.source_dir)],
        encoding: report.encoding.clone(),
        tab_width: report.tab_width,
    });

    PipelineConfig {
        title: title_of(root),
        exec_files,
        class_dirs: vec![root.join(&layout.classes_dir)],
        html,
        output: output.map_or_else(|| root.join(&layout.output_file), Path::to_path_buf),
    }
}

/// Reads a class-list file: one root per line, blank lines ignored
///
/// # Errors
/// * If the file cannot be read
pub fn read_class_list(path: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read class list: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Builds the run configuration for an execution data directory and a class
/// list; no HTML report is rendered in this layout
///
/// # Errors
/// * If the class list cannot be read or names no directories
pub fn class_list_config(
    exec_dir: &Path,
    class_list: &Path,
    layout: &Layout,
    output: Option<&Path>,
) -> Result<PipelineConfig> {
    let roots = read_class_list(class_list)?;
    if roots.is_empty() {
        anyhow::bail!("Class list {} names no directories", class_list.display());
    }

    Ok(PipelineConfig {
        title: title_of(exec_dir),
        exec_files: vec![exec_dir.join(&layout.exec_file)],
        class_dirs: roots
            .iter()
            .map(|root| root.join(&layout.class_subdir))
            .collect(),
        html: None,
        output: output.map_or_else(|| exec_dir.join(&layout.output_file), Path::to_path_buf),
    })
}

/// Expands glob patterns into a sorted, de-duplicated list of files
///
/// # Errors
/// * If a pattern is invalid
pub fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let before = files.len();
        files.extend(
            glob(pattern)
                .with_context(|| format!("Invalid glob pattern: {pattern}"))?
                .filter_map(Result::ok)
                .filter(|p| p.is_file()),
        );
        if files.len() == before {
            warn!(pattern = %pattern, "pattern matched no execution data files");
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_config_defaults() {
        let root = Path::new("/work/shop");
        let cfg = project_config(
            root,
            &Layout::default(),
            &ReportSettings::default(),
            &[],
            None,
        );

        assert_eq!(cfg.title, "shop");
        assert_eq!(cfg.exec_files, vec![root.join("jacoco.exec")]);
        assert_eq!(cfg.class_dirs, vec![root.join("classes")]);
        assert_eq!(cfg.output, root.join("output.csv"));

        let html = cfg.html.unwrap();
        assert_eq!(html.report_dir, root.join("coveragereport"));
        assert_eq!(html.source_dirs, vec![root.join("src")]);
        assert_eq!(html.encoding, "utf-8");
        assert_eq!(html.tab_width, 4);
    }

    #[test]
    fn test_project_config_overrides() {
        let root = Path::new("/work/shop");
        let layout = Layout {
            exec_file: "it.exec".into(),
            classes_dir: "target/classes".into(),
            ..Layout::default()
        };
        let report = ReportSettings {
            html: false,
            ..ReportSettings::default()
        };
        let extra = vec![PathBuf::from("/runs/a.exec")];

        let cfg = project_config(root, &layout, &report, &extra, Some(Path::new("/tmp/out.csv")));

        assert_eq!(
            cfg.exec_files,
            vec![root.join("it.exec"), PathBuf::from("/runs/a.exec")]
        );
        assert_eq!(cfg.class_dirs, vec![root.join("target/classes")]);
        assert_eq!(cfg.html, None);
        assert_eq!(cfg.output, PathBuf::from("/tmp/out.csv"));
    }

    #[test]
    fn test_class_list_config() -> Result<()> {
        let dir = tempdir()?;
        let list = dir.path().join("modules.txt");
        fs::write(&list, "/repo/core\n\n  /repo/web  \r\n")?;

        let cfg = class_list_config(dir.path(), &list, &Layout::default(), None)?;

        assert_eq!(
            cfg.class_dirs,
            vec![
                PathBuf::from("/repo/core/classes"),
                PathBuf::from("/repo/web/classes")
            ]
        );
        assert_eq!(cfg.exec_files, vec![dir.path().join("jacoco.exec")]);
        assert_eq!(cfg.output, dir.path().join("output.csv"));
        assert_eq!(cfg.html, None);
        Ok(())
    }

    #[test]
    fn test_empty_class_list_rejected() -> Result<()> {
        let dir = tempdir()?;
        let list = dir.path().join("modules.txt");
        fs::write(&list, "\n  \n")?;

        assert!(class_list_config(dir.path(), &list, &Layout::default(), None).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_class_list() {
        let dir = tempdir().unwrap();
        assert!(read_class_list(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_title_fallback() {
        assert_eq!(title_of(Path::new("/")), constants::DEFAULT_TITLE);
        assert_eq!(title_of(Path::new("../proj/")), "proj");
    }

    #[test]
    fn test_expand_globs() -> Result<()> {
        let dir = tempdir()?;
        for name in ["b.exec", "a.exec", "notes.txt"] {
            fs::write(dir.path().join(name), b"")?;
        }
        let pattern = dir.path().join("*.exec").to_string_lossy().into_owned();

        let files = expand_globs(&[pattern.clone(), pattern])?;

        assert_eq!(
            files,
            vec![dir.path().join("a.exec"), dir.path().join("b.exec")]
        );
        Ok(())
    }

    #[test]
    fn test_invalid_glob() {
        assert!(expand_globs(&["[".to_string()]).is_err());
    }
}
