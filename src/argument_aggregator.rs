use crate::cli::{constants, Config, ConfigMerge, ListArgs, ProjectArgs};
use crate::layout::{Layout, ReportSettings};
use anyhow::{bail, Context, Result};
use std::{env, fs, path::PathBuf};

#[derive(Debug)]
pub struct ArgumentAggregator {
    config: Option<Config>,
    default_config_path: PathBuf,
}

impl Default for ArgumentAggregator {
    fn default() -> Self {
        let default_path = env::current_dir()
            .unwrap_or_default()
            .join(constants::DEFAULT_CONFIG);
        Self {
            config: None,
            default_config_path: default_path,
        }
    }
}

impl ArgumentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config from the provided path, or from `covline.toml` in the
    /// working directory if present
    ///
    /// # Errors
    /// * If the config file cannot be read or parsed
    /// * If an explicitly given config file does not exist
    pub fn load(&mut self, config_path: Option<&PathBuf>) -> Result<()> {
        let path = config_path.unwrap_or(&self.default_config_path);
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            self.config = Some(
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            );
        } else if config_path.is_some() {
            bail!("Config file not found: {}", path.display());
        }
        Ok(())
    }

    /// Merge the provided project arguments with the config
    pub fn merge_project_args(&self, args: &ProjectArgs) -> ProjectArgs {
        self.config
            .as_ref()
            .map_or_else(|| args.clone(), |config| args.merge_with_config(config))
    }

    /// Merge the provided class-list arguments with the config
    pub fn merge_list_args(&self, args: &ListArgs) -> ListArgs {
        self.config
            .as_ref()
            .map_or_else(|| args.clone(), |config| args.merge_with_config(config))
    }

    pub fn layout(&self) -> Layout {
        self.config.as_ref().map_or_else(Layout::default, Config::layout)
    }

    pub fn report_settings(&self) -> ReportSettings {
        self.config
            .as_ref()
            .map_or_else(ReportSettings::default, Config::report_settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_explicit_config() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("covline.toml");
        fs::write(&path, "[layout]\noutput_file = \"lines.csv\"\n")?;

        let mut aggregator = ArgumentAggregator::new();
        aggregator.load(Some(&path))?;

        assert_eq!(aggregator.layout().output_file, "lines.csv");
        Ok(())
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempdir().unwrap();
        let mut aggregator = ArgumentAggregator::new();
        assert!(aggregator
            .load(Some(&dir.path().join("missing.toml")))
            .is_err());
    }

    #[test]
    fn test_invalid_config_fails() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("covline.toml");
        fs::write(&path, "[report]\ntab_width = \"four\"\n")?;

        let mut aggregator = ArgumentAggregator::new();
        assert!(aggregator.load(Some(&path)).is_err());
        Ok(())
    }

    #[test]
    fn test_defaults_without_config() {
        let aggregator = ArgumentAggregator {
            config: None,
            default_config_path: PathBuf::from("/nonexistent/covline.toml"),
        };
        assert_eq!(aggregator.layout(), Layout::default());
        assert_eq!(aggregator.report_settings(), ReportSettings::default());

        let args = ProjectArgs {
            no_html: true,
            ..ProjectArgs::default()
        };
        assert!(aggregator.merge_project_args(&args).no_html);
    }
}
