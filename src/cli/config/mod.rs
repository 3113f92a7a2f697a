mod jacoco;
mod layout;
mod report;

pub use jacoco::JacocoConfig;
pub use layout::LayoutConfig;
pub use report::ReportConfig;

use std::path::PathBuf;

use serde::Deserialize;

use crate::cli::{ListArgs, ProjectArgs, ToolArgs};
use crate::layout::{Layout, ReportSettings};

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Names of the children of a project directory
    pub layout: LayoutConfig,
    /// HTML report configuration
    pub report: ReportConfig,
    /// JaCoCo tooling configuration
    pub jacoco: JacocoConfig,
}

impl Config {
    /// Directory layout with unset or empty names falling back to defaults
    pub fn layout(&self) -> Layout {
        let pick = |value: &Option<String>, default: String| {
            value.clone().filter(|v| !v.is_empty()).unwrap_or(default)
        };
        let defaults = Layout::default();

        Layout {
            exec_file: pick(&self.layout.exec_file, defaults.exec_file),
            classes_dir: pick(&self.layout.classes_dir, defaults.classes_dir),
            source_dir: pick(&self.layout.source_dir, defaults.source_dir),
            report_dir: pick(&self.layout.report_dir, defaults.report_dir),
            output_file: pick(&self.layout.output_file, defaults.output_file),
            class_subdir: pick(&self.layout.class_subdir, defaults.class_subdir),
        }
    }

    pub fn report_settings(&self) -> ReportSettings {
        let defaults = ReportSettings::default();
        ReportSettings {
            html: self.report.html.unwrap_or(defaults.html),
            encoding: self
                .report
                .encoding
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or(defaults.encoding),
            tab_width: self
                .report
                .tab_width
                .filter(|w| *w > 0)
                .unwrap_or(defaults.tab_width),
        }
    }
}

pub trait ConfigMerge<T> {
    fn merge_with_config(&self, config: &Config) -> T;
}

impl ConfigMerge<Self> for ToolArgs {
    fn merge_with_config(&self, config: &Config) -> Self {
        let merge_path = |opt: Option<PathBuf>, cfg_str: Option<String>| {
            opt.or_else(|| cfg_str.filter(|p| !p.is_empty()).map(PathBuf::from))
        };

        Self {
            java: merge_path(self.java.clone(), config.jacoco.java.clone()),
            jacococli: merge_path(self.jacococli.clone(), config.jacoco.cli_jar.clone()),
            config: self.config.clone(),
        }
    }
}

impl ConfigMerge<Self> for ProjectArgs {
    fn merge_with_config(&self, config: &Config) -> Self {
        Self {
            dirs: self.dirs.clone(),
            no_html: self.no_html || config.report.html == Some(false),
            merge: self.merge.clone(),
            output: self.output.clone(),
            tools: self.tools.merge_with_config(config),
        }
    }
}

impl ConfigMerge<Self> for ListArgs {
    fn merge_with_config(&self, config: &Config) -> Self {
        Self {
            exec_dir: self.exec_dir.clone(),
            class_list: self.class_list.clone(),
            output: self.output.clone(),
            tools: self.tools.merge_with_config(config),
        }
    }
}
