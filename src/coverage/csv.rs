use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::extract::ExtractedRecord;
use crate::error::WriteError;

/// Joins all records into a single line, `A:3,B:7`, without a trailing
/// separator or line terminator
pub fn render(records: &[ExtractedRecord]) -> String {
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Writes the rendered records to `path` in a single write
///
/// The file is closed when this returns, on success and on failure alike.
///
/// # Errors
/// * If the file cannot be created, e.g. its directory does not exist
/// * If writing the contents fails
pub fn write_records<P: AsRef<Path>>(records: &[ExtractedRecord], path: P) -> Result<(), WriteError> {
    let path = path.as_ref();
    let contents = render(records);

    let mut file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(contents.as_bytes())
        .map_err(|source| WriteError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote covered lines");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_render_two_records() {
        let records = vec![ExtractedRecord::new("A", 3), ExtractedRecord::new("B", 7)];
        assert_eq!(render(&records), "A:3,B:7");
    }

    #[test]
    fn test_write_exact_bytes() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("output.csv");

        write_records(
            &[ExtractedRecord::new("A", 3), ExtractedRecord::new("B", 7)],
            &out,
        )?;

        assert_eq!(fs::read(&out)?, b"A:3,B:7");
        Ok(())
    }

    #[test]
    fn test_write_no_records_creates_empty_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("output.csv");

        write_records(&[], &out)?;

        assert!(out.is_file());
        assert_eq!(fs::metadata(&out)?.len(), 0);
        Ok(())
    }

    #[test]
    fn test_write_single_record_has_no_separator() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("output.csv");

        write_records(&[ExtractedRecord::new("com/example/Foo", 11)], &out)?;

        assert_eq!(fs::read_to_string(&out)?, "com/example/Foo:11");
        Ok(())
    }

    #[test]
    fn test_write_overwrites_previous_output() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("output.csv");
        fs::write(&out, "stale,content,from,an,earlier,run")?;

        write_records(&[ExtractedRecord::new("A", 1)], &out)?;

        assert_eq!(fs::read_to_string(&out)?, "A:1");
        Ok(())
    }

    #[test]
    fn test_write_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("does_not_exist").join("output.csv");

        let result = write_records(&[ExtractedRecord::new("A", 1)], &out);
        assert!(matches!(result, Err(WriteError::Create { .. })));
        assert!(!out.exists());
    }
}
