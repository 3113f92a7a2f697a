use serde::Deserialize;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct LayoutConfig {
    /// Execution data file name inside a project directory
    pub exec_file: Option<String>,
    /// Class directory name inside a project directory
    pub classes_dir: Option<String>,
    /// Source directory name inside a project directory
    pub source_dir: Option<String>,
    /// HTML report directory name inside a project directory
    pub report_dir: Option<String>,
    /// CSV file name
    pub output_file: Option<String>,
    /// Child appended to each class-list root
    pub class_subdir: Option<String>,
}
