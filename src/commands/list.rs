use anyhow::{Context, Result};

use crate::{
    argument_aggregator::ArgumentAggregator,
    cli::ListArgs,
    commands::{jacoco_from_args, print_summary, Command},
    jacoco::ExecFileLoader,
    layout::class_list_config,
    pipeline::Pipeline,
};

pub struct ListCommand<'a> {
    args: &'a ListArgs,
    arg_aggregator: &'a ArgumentAggregator,
}

impl<'a> ListCommand<'a> {
    pub fn new(args: &'a ListArgs, arg_aggregator: &'a ArgumentAggregator) -> Self {
        Self {
            args,
            arg_aggregator,
        }
    }
}

impl Command for ListCommand<'_> {
    fn execute(&self) -> Result<()> {
        let merged_args = self.arg_aggregator.merge_list_args(self.args);
        let config = class_list_config(
            &merged_args.exec_dir,
            &merged_args.class_list,
            &self.arg_aggregator.layout(),
            merged_args.output.as_deref(),
        )?;

        println!(
            "[*] Analyzing {} class directories against {}",
            config.class_dirs.len(),
            merged_args.exec_dir.display()
        );

        let jacoco = jacoco_from_args(&merged_args.tools)?;
        let summary = Pipeline::new(&ExecFileLoader, &jacoco)
            .run(&config)
            .with_context(|| {
                format!(
                    "Failed to process class list {}",
                    merged_args.class_list.display()
                )
            })?;
        print_summary(&summary);
        Ok(())
    }
}
