use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use logsieve_types::SourceLine;

use crate::error::SourceError;

/// Read a log file into lines, each ending with a single `\n`
///
/// `\r\n` endings are normalised and an unterminated final line gets its
/// `\n` added, so every line carries exactly one terminator character.
/// Invalid UTF-8 is replaced per line, so one bad byte only affects its own line.
pub fn read_lines(path: &Path) -> Result<Vec<SourceLine>, SourceError> {
    let content = fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let lines = split_lines(Arc::from(path), &content);
    debug!(file = %path.display(), lines = lines.len(), "read log file");
    Ok(lines)
}

/// Read several files, concatenating their lines in the given order
pub fn read_all(paths: &[PathBuf]) -> Result<Vec<SourceLine>, SourceError> {
    let mut lines = Vec::new();
    for path in paths {
        lines.extend(read_lines(path)?);
    }
    Ok(lines)
}

fn split_lines(path: Arc<Path>, content: &[u8]) -> Vec<SourceLine> {
    content
        .split_inclusive(|&b| b == b'\n')
        .enumerate()
        .map(|(idx, line)| {
            let body = line.strip_suffix(b"\n").unwrap_or(line);
            let body = body.strip_suffix(b"\r").unwrap_or(body);
            let text = String::from_utf8_lossy(body);
            if matches!(text, Cow::Owned(_)) {
                debug!(file = %path.display(), line = idx + 1, "replaced invalid UTF-8");
            }
            SourceLine::new(path.clone(), idx + 1, format!("{text}\n"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn texts(lines: &[SourceLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_split_keeps_one_terminator_per_line() {
        let lines = split_lines(Arc::from(Path::new("a.log")), b"one\ntwo\r\nthree");
        assert_eq!(texts(&lines), vec!["one\n", "two\n", "three\n"]);
        assert_eq!(
            lines.iter().map(|l| l.line_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_split_empty_content() {
        assert!(split_lines(Arc::from(Path::new("a.log")), b"").is_empty());
    }

    #[test]
    fn test_split_keeps_blank_lines() {
        let lines = split_lines(Arc::from(Path::new("a.log")), b"a\n\nb\n");
        assert_eq!(texts(&lines), vec!["a\n", "\n", "b\n"]);
    }

    #[test]
    fn test_split_strips_carriage_return_on_unterminated_last_line() {
        let lines = split_lines(Arc::from(Path::new("a.log")), b"one\r\ntwo\r");
        assert_eq!(texts(&lines), vec!["one\n", "two\n"]);
    }

    #[test]
    fn test_invalid_utf8_only_affects_its_own_line() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.log");
        fs::write(&file, b"good line\nbad \xff\nlast line\n").unwrap();

        let lines = read_lines(&file).unwrap();

        assert_eq!(
            texts(&lines),
            vec!["good line\n", "bad \u{FFFD}\n", "last line\n"]
        );
    }

    #[test]
    fn test_read_all_preserves_file_order() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("1.log");
        let second = dir.path().join("2.log");
        fs::write(&first, "a\nb\n").unwrap();
        fs::write(&second, "c\n").unwrap();

        let lines = read_all(&[second.clone(), first.clone()]).unwrap();

        assert_eq!(texts(&lines), vec!["c\n", "a\n", "b\n"]);
        assert_eq!(&*lines[0].path, second.as_path());
        assert_eq!(&*lines[2].path, first.as_path());
        assert_eq!(lines[2].line_number, 2);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_lines(&dir.path().join("gone.log")).unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }
}
