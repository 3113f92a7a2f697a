/// Execution data file inside a project directory
pub const EXEC_FILE: &str = "jacoco.exec";
/// Compiled classes below a project directory or class-list root
pub const CLASSES_DIR: &str = "classes";
/// Sources rendered into the HTML report
pub const SOURCE_DIR: &str = "src";
/// HTML report destination inside a project directory
pub const REPORT_DIR: &str = "coveragereport";
/// Covered-lines CSV written into the project or execution data directory
pub const OUTPUT_FILE: &str = "output.csv";
pub const SOURCE_ENCODING: &str = "utf-8";
pub const TAB_WIDTH: u32 = 4;
/// Bundle name when none can be derived from a directory
pub const DEFAULT_TITLE: &str = "coverage";
/// Config file picked up from the working directory
pub const DEFAULT_CONFIG: &str = "covline.toml";
/// Environment variable pointing at `jacococli.jar`
pub const JACOCO_CLI_ENV: &str = "JACOCO_CLI";
