pub mod execinfo;
pub mod list;
pub mod project;

use anyhow::{Context, Result};

use crate::cli::ToolArgs;
use crate::jacoco::JacocoCli;
use crate::pipeline::Summary;
use crate::utils::system::{find_jacococli, find_java};

pub trait Command {
    /// Execute the command
    ///
    /// # Errors
    /// * If the command could not be executed
    fn execute(&self) -> Result<()>;
}

/// Locates the JVM and `jacococli.jar` and checks that they run
fn jacoco_from_args(tools: &ToolArgs) -> Result<JacocoCli> {
    let jar = find_jacococli(tools.jacococli.clone())?;
    let java = find_java(tools.java.clone());
    JacocoCli::new(&java, &jar).context("JaCoCo tooling is not usable")
}

fn print_summary(summary: &Summary) {
    println!(
        "[+] Wrote {} covered lines to {}",
        summary.records,
        summary.output.display()
    );
    if let Some(dir) = &summary.report_dir {
        println!("[+] Generated HTML coverage report in: {}", dir.display());
    }
}
