use serde::Deserialize;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct ReportConfig {
    /// Render the HTML report for project directories
    pub html: Option<bool>,
    /// Source file encoding
    pub encoding: Option<String>,
    /// Tab width used when rendering sources
    pub tab_width: Option<u32>,
}
