use clap::Args;
use std::path::PathBuf;

/// Options shared by every subcommand that runs the analyzer
#[derive(Args, Clone, Debug, Default)]
pub struct ToolArgs {
    /// Java executable used to run jacococli.jar
    #[arg(long, help = "Java executable (default: $JAVA_HOME/bin/java, then java)")]
    pub java: Option<PathBuf>,

    /// Path to jacococli.jar
    #[arg(long, help = "Path to jacococli.jar (default: $JACOCO_CLI)")]
    pub jacococli: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, help = "Path to TOML config file")]
    pub config: Option<PathBuf>,
}
