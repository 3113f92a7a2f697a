use clap::Args;
use std::path::PathBuf;

#[derive(Args, Clone, Debug, Default)]
pub struct ExecInfoArgs {
    /// Execution data files
    #[arg(help = "Execution data files to inspect", required = true)]
    pub files: Vec<PathBuf>,

    /// Print only the session table
    #[arg(long, help = "Only list sessions, not the per-class probe hits")]
    pub sessions_only: bool,
}
