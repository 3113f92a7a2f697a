use std::fmt::Write;

use anyhow::{Context, Result};

use crate::{
    cli::ExecInfoArgs,
    commands::Command,
    jacoco::{ExecFileLoader, ExecutionStore, SessionInfo},
};

pub struct ExecInfoCommand<'a> {
    args: &'a ExecInfoArgs,
}

impl<'a> ExecInfoCommand<'a> {
    pub fn new(args: &'a ExecInfoArgs) -> Self {
        Self { args }
    }
}

fn format_timestamp(millis: i64, time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map_or_else(
        || millis.to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

fn describe_session(info: &SessionInfo) -> String {
    format!(
        "Session \"{}\": {} - {}",
        info.id,
        format_timestamp(info.start, info.start_time()),
        format_timestamp(info.dump, info.dump_time())
    )
}

/// Renders the session list and, unless `sessions_only`, one row per class
pub fn render_info(store: &ExecutionStore, sessions_only: bool) -> String {
    let mut out = String::new();
    for info in store.sessions() {
        let _ = writeln!(out, "{}", describe_session(info));
    }
    if sessions_only {
        return out;
    }

    let _ = writeln!(out, "{:<16}  {:>11}  CLASS NAME", "CLASS ID", "HITS/PROBES");
    for data in store.entries() {
        let _ = writeln!(
            out,
            "{:016x}  {:>5} of {:>3}  {}",
            data.id,
            data.hit_count(),
            data.probes.len(),
            data.name
        );
    }
    out
}

impl Command for ExecInfoCommand<'_> {
    fn execute(&self) -> Result<()> {
        for file in &self.args.files {
            let mut store = ExecutionStore::new();
            ExecFileLoader::load_file(file, &mut store)
                .with_context(|| format!("Failed to inspect {}", file.display()))?;

            println!(
                "[*] {}: {} sessions, {} classes",
                file.display(),
                store.sessions().len(),
                store.len()
            );
            print!("{}", render_info(&store, self.args.sessions_only));
        }
        Ok(())
    }
}
