use anyhow::{bail, Context, Result};

use crate::{
    argument_aggregator::ArgumentAggregator,
    cli::ProjectArgs,
    commands::{jacoco_from_args, print_summary, Command},
    jacoco::ExecFileLoader,
    layout::{expand_globs, project_config},
    pipeline::Pipeline,
};

pub struct ProjectCommand<'a> {
    args: &'a ProjectArgs,
    arg_aggregator: &'a ArgumentAggregator,
}

impl<'a> ProjectCommand<'a> {
    pub fn new(args: &'a ProjectArgs, arg_aggregator: &'a ArgumentAggregator) -> Self {
        Self {
            args,
            arg_aggregator,
        }
    }
}

impl Command for ProjectCommand<'_> {
    fn execute(&self) -> Result<()> {
        let merged_args = self.arg_aggregator.merge_project_args(self.args);
        if merged_args.output.is_some() && merged_args.dirs.len() > 1 {
            bail!("--output can only be used with a single project directory");
        }

        let layout = self.arg_aggregator.layout();
        let mut report = self.arg_aggregator.report_settings();
        report.html &= !merged_args.no_html;
        let extra_exec = expand_globs(&merged_args.merge)?;

        let jacoco = jacoco_from_args(&merged_args.tools)?;
        let loader = ExecFileLoader;
        let pipeline = Pipeline::new(&loader, &jacoco).with_reporter(&jacoco);

        for dir in &merged_args.dirs {
            println!("[*] Processing project: {}", dir.display());
            let config = project_config(
                dir,
                &layout,
                &report,
                &extra_exec,
                merged_args.output.as_deref(),
            );
            let summary = pipeline
                .run(&config)
                .with_context(|| format!("Failed to process project {}", dir.display()))?;
            print_summary(&summary);
        }
        Ok(())
    }
}
