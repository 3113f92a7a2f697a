use clap::{ArgAction, Args};
use std::path::PathBuf;

use super::ToolArgs;

#[derive(Args, Clone, Debug, Default)]
pub struct ProjectArgs {
    /// Project directories
    #[arg(
        help = "Project directories containing jacoco.exec, classes/ and src/",
        required = true
    )]
    pub dirs: Vec<PathBuf>,

    /// Skip the HTML report
    #[arg(long, help = "Do not render the HTML coverage report", action = ArgAction::SetTrue)]
    pub no_html: bool,

    /// Additional execution data files
    #[arg(
        short,
        long,
        help = "Glob of additional execution data files merged into each project's data"
    )]
    pub merge: Vec<String>,

    /// CSV destination override
    #[arg(
        short,
        long,
        help = "Write the covered lines here instead of <DIR>/output.csv (single project only)"
    )]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,
}
