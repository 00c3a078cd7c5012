use crate::shared::error::CuratorError;
use crate::shared::Result;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Upper bound for any POM, properties file or persisted model read from disk (64 MB)
pub const MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Upper bound for an extension descriptor read out of a jar (1 MB)
pub const MAX_DESCRIPTOR_SIZE: u64 = 1024 * 1024;

/// Validates that a path is not a symbolic link
///
/// `symlink_metadata()` is used so the link itself is inspected, not its target.
///
/// # Errors
/// Returns an error if the path is a symbolic link or if metadata cannot be read
pub fn validate_not_symlink(path: &Path, operation: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read metadata for {} operation on {}: {}",
            operation,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        return Err(CuratorError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("{} operations on symbolic links are not allowed", operation),
            hint: "Point the option at the real file or directory".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Reads a regular file into a string, refusing symlinks and oversized files.
///
/// # Arguments
/// * `path` - The file to read
/// * `file_description` - What the file is (e.g., "pom.xml"), used in error messages
/// * `max_size` - Maximum accepted size in bytes
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist or is not a regular file
/// - The path is a symbolic link
/// - The file exceeds `max_size`
pub fn read_bounded_to_string(path: &Path, file_description: &str, max_size: u64) -> Result<String> {
    let metadata = fs::symlink_metadata(path).map_err(|e| CuratorError::FileReadError {
        path: path.to_path_buf(),
        details: format!("Failed to read {} metadata: {}", file_description, e),
    })?;

    if metadata.is_symlink() {
        return Err(CuratorError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("{} is a symbolic link", file_description),
            hint: "Symbolic links are not followed when reading build inputs".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    validate_file_size(metadata.len(), path, max_size)?;

    fs::read_to_string(path).map_err(|e| {
        CuratorError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        }
        .into()
    })
}

/// Reads at most `max_size` bytes from a reader, failing if more are available.
pub fn read_limited<R: Read>(reader: R, what: &str, max_size: u64) -> Result<String> {
    let mut content = String::new();
    let read = reader
        .take(max_size + 1)
        .read_to_string(&mut content)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", what, e))?;
    if read as u64 > max_size {
        anyhow::bail!(
            "Security: {} is too large. Maximum allowed size is {} bytes.",
            what,
            max_size
        );
    }
    Ok(content)
}

/// Validates file size is within acceptable limits
///
/// # Errors
/// Returns an error if the file size exceeds the maximum
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_not_symlink_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("pom.xml");
        fs::write(&file_path, "<project/>").unwrap();

        assert!(validate_not_symlink(&file_path, "read").is_ok());
    }

    #[test]
    fn test_validate_not_symlink_nonexistent() {
        let path = PathBuf::from("/nonexistent/pom.xml");
        assert!(validate_not_symlink(&path, "read").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_bounded_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.xml");
        fs::write(&target, "<project/>").unwrap();
        let link = temp_dir.path().join("pom.xml");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = read_bounded_to_string(&link, "pom.xml", MAX_FILE_SIZE).unwrap_err();
        assert!(err.to_string().contains("Security violation"));
    }

    #[test]
    fn test_read_bounded_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_bounded_to_string(temp_dir.path(), "pom.xml", MAX_FILE_SIZE).unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[test]
    fn test_read_bounded_rejects_large_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("big.properties");
        fs::write(&file_path, "x".repeat(64)).unwrap();

        let err = read_bounded_to_string(&file_path, "properties", 16).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_read_limited() {
        assert_eq!(read_limited("abc".as_bytes(), "descriptor", 3).unwrap(), "abc");
        assert!(read_limited("abcd".as_bytes(), "descriptor", 3).is_err());
    }

    #[test]
    fn test_validate_file_size_exceeds_limit() {
        let path = PathBuf::from("/test/appmodel.dat");
        let result = validate_file_size(MAX_FILE_SIZE + 1, &path, MAX_FILE_SIZE);
        assert!(result.unwrap_err().to_string().contains("too large"));
    }
}
