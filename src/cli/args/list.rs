use clap::Args;
use std::path::PathBuf;

use super::ToolArgs;

#[derive(Args, Clone, Debug, Default)]
pub struct ListArgs {
    /// Directory holding jacoco.exec
    #[arg(help = "Directory holding jacoco.exec; output.csv is written here")]
    pub exec_dir: PathBuf,

    /// Class-list file
    #[arg(help = "Text file with one class root per line; each gets classes/ appended")]
    pub class_list: PathBuf,

    /// CSV destination override
    #[arg(short, long, help = "Write the covered lines here instead of <EXEC_DIR>/output.csv")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,
}
