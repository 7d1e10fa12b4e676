use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DATA_DIR_NAME: &str = ".dataman";

/// `~/.dataman`, or `./.dataman` when no home directory is known
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

/// `MM:SS`, minutes keep growing past 59
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00");
        assert_eq!(format_duration(Duration::from_millis(65_900)), "01:05");
        assert_eq!(format_duration(Duration::from_secs(3600)), "60:00");
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a").join("b").join("file.json");
        ensure_parent_dir(&file).unwrap();
        assert!(file.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new("relative.json")).unwrap();
    }

    #[test]
    fn test_default_data_dir_name() {
        assert!(default_data_dir().ends_with(".dataman"));
    }
}
