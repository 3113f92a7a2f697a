use clap::{ArgAction, Parser, Subcommand};

pub mod args;
pub mod config;
pub mod constants;

pub use args::{ExecInfoArgs, ListArgs, ProjectArgs, ToolArgs};
pub use config::{Config, ConfigMerge, JacocoConfig, LayoutConfig, ReportConfig};

/// Command-line interface for the JaCoCo covered-line extractor
#[derive(Parser, Debug, Clone)]
#[command(name = "covline")]
#[command(about = "Extract covered source lines from JaCoCo execution data")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Process project directories holding jacoco.exec, classes/ and src/
    Project(ProjectArgs),
    /// Process an execution data directory against a list of class roots
    List(ListArgs),
    /// Print sessions and per-class probe hits of execution data files
    Execinfo(ExecInfoArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_project() {
        let cli = Cli::parse_from([
            "covline", "-vv", "project", "--no-html", "--merge", "runs/*.exec", "app", "lib",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.cmd {
            Commands::Project(args) => {
                assert_eq!(args.dirs, vec![PathBuf::from("app"), PathBuf::from("lib")]);
                assert!(args.no_html);
                assert_eq!(args.merge, vec!["runs/*.exec"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::parse_from([
            "covline",
            "list",
            "--jacococli",
            "/opt/jacococli.jar",
            "build",
            "modules.txt",
        ]);
        match cli.cmd {
            Commands::List(args) => {
                assert_eq!(args.exec_dir, PathBuf::from("build"));
                assert_eq!(args.class_list, PathBuf::from("modules.txt"));
                assert_eq!(args.tools.jacococli, Some(PathBuf::from("/opt/jacococli.jar")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_project_requires_directory() {
        assert!(Cli::try_parse_from(["covline", "project"]).is_err());
    }
}
