use serde::Deserialize;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct JacocoConfig {
    /// Java executable
    pub java: Option<String>,
    /// Path to jacococli.jar
    pub cli_jar: Option<String>,
}
