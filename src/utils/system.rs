use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::cli::constants::JACOCO_CLI_ENV;

/// Validates if a path points to a jar file
#[inline]
fn is_valid_jar(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "jar")
}

/// Retrieves the Java executable
///
/// Falls back from the custom path to `$JAVA_HOME/bin/java` and finally to
/// plain `java`, resolved through `PATH` when it is executed.
pub fn find_java<P>(custom_path: Option<P>) -> PathBuf
where
    P: Into<PathBuf>,
{
    if let Some(path) = custom_path.map(Into::into) {
        return path;
    }

    if let Some(path) = std::env::var_os("JAVA_HOME")
        .map(|home| PathBuf::from(home).join("bin").join("java"))
        .filter(|p| p.is_file())
    {
        return path;
    }

    PathBuf::from("java")
}

/// Retrieves the path to `jacococli.jar`
///
/// # Errors
/// * If neither the custom path nor `$JACOCO_CLI` point to a jar file
pub fn find_jacococli<P>(custom_path: Option<P>) -> Result<PathBuf>
where
    P: Into<PathBuf>,
{
    if let Some(path) = custom_path.map(Into::into) {
        if is_valid_jar(&path) {
            return Ok(path);
        }
        bail!("Not a jar file: {}", path.display());
    }

    if let Some(path) = std::env::var_os(JACOCO_CLI_ENV)
        .map(PathBuf::from)
        .filter(|p| is_valid_jar(p))
    {
        return Ok(path);
    }

    bail!("Could not find jacococli.jar, pass --jacococli or set {JACOCO_CLI_ENV}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_find_jacococli_custom_path() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("jacococli.jar");
        File::create(&jar).unwrap();

        let result = find_jacococli(Some(jar.clone()));
        assert_eq!(result.unwrap(), jar);
    }

    #[test]
    fn test_find_jacococli_rejects_non_jar() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("jacococli.zip");
        File::create(&file).unwrap();

        assert!(find_jacococli(Some(file)).is_err());
    }

    #[test]
    fn test_find_jacococli_env_var() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("jacococli.jar");
        File::create(&jar).unwrap();

        unsafe { std::env::set_var(JACOCO_CLI_ENV, &jar) };
        let result = find_jacococli::<PathBuf>(None);
        unsafe { std::env::remove_var(JACOCO_CLI_ENV) };
        assert_eq!(result.unwrap(), jar);
    }

    #[test]
    fn test_find_java_custom_path() {
        assert_eq!(
            find_java(Some("/opt/jdk/bin/java")),
            PathBuf::from("/opt/jdk/bin/java")
        );
    }
}
