use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, warn};

use super::exec::write_store;
use super::store::ExecutionStore;
use super::xml::parse_report;
use crate::coverage::CoverageModel;
use crate::error::{AnalysisError, ReportError};
use crate::pipeline::{HtmlReport, HtmlReporter, StructureAnalyzer};

/// Drives `jacococli.jar report` for structure analysis and HTML rendering
#[derive(Clone, Debug)]
pub struct JacocoCli {
    java: PathBuf,
    jar: PathBuf,
}

impl JacocoCli {
    /// Creates a driver for the given JVM and `jacococli.jar`
    ///
    /// # Errors
    /// * If the jar does not exist
    /// * If the JVM cannot be executed
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(java: P, jar: Q) -> Result<Self, AnalysisError> {
        let jar = jar.as_ref().to_path_buf();
        if !jar.is_file() {
            return Err(AnalysisError::MissingJar(jar));
        }
        let java = java.as_ref().to_path_buf();
        Self::is_java_runnable(&java)?;

        Ok(Self { java, jar })
    }

    fn is_java_runnable(java: &Path) -> Result<(), AnalysisError> {
        let program = java.display().to_string();
        let output = Command::new(java)
            .arg("-version")
            .output()
            .map_err(|source| AnalysisError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AnalysisError::ToolFailed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Writes the store into a temporary execution data file for the tool
    fn stage_store(store: &ExecutionStore) -> Result<(TempDir, PathBuf), AnalysisError> {
        let tmp_dir = TempDir::new()?;
        let exec_file = tmp_dir.path().join("merged.exec");
        write_store(store, File::create(&exec_file)?)?;
        Ok((tmp_dir, exec_file))
    }

    fn report_command(&self, exec_file: &Path, bundle: &str) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar")
            .arg(&self.jar)
            .arg("report")
            .arg(exec_file)
            .arg("--name")
            .arg(bundle)
            .arg("--quiet");
        cmd
    }

    fn run(&self, mut cmd: Command) -> Result<(), AnalysisError> {
        debug!(command = ?cmd, "running jacococli");
        let program = format!("{} -jar {}", self.java.display(), self.jar.display());
        let output = cmd.output().map_err(|source| AnalysisError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(AnalysisError::ToolFailed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl StructureAnalyzer for JacocoCli {
    fn analyze(
        &self,
        store: &ExecutionStore,
        class_dir: &Path,
        bundle: &str,
    ) -> Result<CoverageModel, AnalysisError> {
        if !class_dir.is_dir() {
            return Err(AnalysisError::MissingClassDirectory(class_dir.to_path_buf()));
        }

        let (tmp_dir, exec_file) = Self::stage_store(store)?;
        let xml_file = tmp_dir.path().join("report.xml");

        let mut cmd = self.report_command(&exec_file, bundle);
        cmd.arg("--classfiles").arg(class_dir).arg("--xml").arg(&xml_file);
        self.run(cmd)?;

        let xml = fs::read_to_string(&xml_file)?;
        parse_report(&xml, bundle)
    }
}

impl HtmlReporter for JacocoCli {
    fn render(
        &self,
        store: &ExecutionStore,
        class_dirs: &[PathBuf],
        report: &HtmlReport,
        bundle: &str,
    ) -> Result<(), ReportError> {
        fs::create_dir_all(&report.report_dir).map_err(|source| ReportError::CreateDir {
            path: report.report_dir.clone(),
            source,
        })?;

        let (_tmp_dir, exec_file) = Self::stage_store(store)?;
        let mut cmd = self.report_command(&exec_file, bundle);
        for dir in class_dirs {
            cmd.arg("--classfiles").arg(dir);
        }
        for dir in &report.source_dirs {
            if dir.is_dir() {
                cmd.arg("--sourcefiles").arg(dir);
            } else {
                warn!(dir = %dir.display(), "source directory missing, report will lack sources");
            }
        }
        cmd.arg("--encoding")
            .arg(&report.encoding)
            .arg("--tabwith")
            .arg(report.tab_width.to_string())
            .arg("--html")
            .arg(&report.report_dir);

        self.run(cmd)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacoco::store::ExecutionData;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    fn unchecked(java: &str) -> JacocoCli {
        JacocoCli {
            java: PathBuf::from(java),
            jar: PathBuf::from("/opt/jacoco/lib/jacococli.jar"),
        }
    }

    #[test]
    fn test_missing_jar() {
        let dir = tempdir().unwrap();
        let err = JacocoCli::new("java", dir.path().join("jacococli.jar")).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingJar(_)));
    }

    #[test]
    fn test_java_not_runnable() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let jar = dir.path().join("jacococli.jar");
        fs::write(&jar, b"")?;

        let err = JacocoCli::new(dir.path().join("no-such-java"), &jar).unwrap_err();
        assert!(matches!(err, AnalysisError::Spawn { .. }));
        Ok(())
    }

    #[test]
    fn test_report_command_arguments() {
        let cli = unchecked("/usr/bin/java");
        let cmd = cli.report_command(Path::new("/tmp/merged.exec"), "demo");

        assert_eq!(cmd.get_program(), OsStr::new("/usr/bin/java"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-jar",
                "/opt/jacoco/lib/jacococli.jar",
                "report",
                "/tmp/merged.exec",
                "--name",
                "demo",
                "--quiet"
            ]
        );
    }

    #[test]
    fn test_analyze_missing_class_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("classes");

        let err = unchecked("java")
            .analyze(&ExecutionStore::new(), &missing, "demo")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingClassDirectory(p) if p == missing));
    }

    #[test]
    fn test_stage_store_writes_execution_data() -> anyhow::Result<()> {
        let mut store = ExecutionStore::new();
        store.put(ExecutionData::new(9, "a/A", vec![true, false, true]))?;

        let (_tmp, exec_file) = JacocoCli::stage_store(&store)?;

        let mut reread = ExecutionStore::new();
        crate::jacoco::exec::ExecFileLoader::load_file(&exec_file, &mut reread)?;
        assert_eq!(reread, store);
        Ok(())
    }

    /// A stand-in JVM that answers `--xml <file>` with a canned report
    #[cfg(unix)]
    #[test]
    fn test_analyze_with_fake_jvm() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let fixture = dir.path().join("fixture.xml");
        fs::write(
            &fixture,
            r#"<report name="demo"><package name="p">
                <class name="p/A" sourcefilename="A.java"><method name="m" desc="()V" line="4"/></class>
                <sourcefile name="A.java">
                  <line nr="4" mi="0" ci="2" mb="0" cb="0"/>
                  <line nr="5" mi="3" ci="0" mb="0" cb="0"/>
                </sourcefile>
            </package></report>"#,
        )?;

        let java = dir.path().join("java");
        fs::write(
            &java,
            format!(
                "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--xml\" ]; then cp '{}' \"$2\"; fi\n  shift\ndone\n",
                fixture.display()
            ),
        )?;
        fs::set_permissions(&java, fs::Permissions::from_mode(0o755))?;
        let jar = dir.path().join("jacococli.jar");
        fs::write(&jar, b"")?;
        let classes = dir.path().join("classes");
        fs::create_dir(&classes)?;

        let cli = JacocoCli::new(&java, &jar)?;
        let model = cli.analyze(&ExecutionStore::new(), &classes, "demo")?;

        let rendered: Vec<_> = crate::coverage::extract(&model)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["p/A:4"]);
        Ok(())
    }
}
