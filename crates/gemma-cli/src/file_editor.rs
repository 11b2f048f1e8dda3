//! A file with a selected line range, standing in for an editor selection.

use gemma_core::error::{AssistantError, Result};
use gemma_core::host::TextEditor;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Inclusive, 1-based line range written as `start:end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <start>:<end>, got '{s}'"))?;
        let start: usize = start
            .trim()
            .parse()
            .map_err(|_| format!("invalid start line '{start}'"))?;
        let end: usize = end
            .trim()
            .parse()
            .map_err(|_| format!("invalid end line '{end}'"))?;

        if start == 0 || end < start {
            return Err(format!("invalid line range {start}:{end}"));
        }
        Ok(Self { start, end })
    }
}

/// Selection over whole lines of a text file.
///
/// Lines are read fresh on every call; the replacement is written back with
/// a temp file and rename.
pub struct FileSelectionEditor {
    path: PathBuf,
    range: LineRange,
}

impl FileSelectionEditor {
    /// Opens `path` and checks that `range` lies inside it.
    pub fn open(path: impl Into<PathBuf>, range: LineRange) -> Result<Self> {
        let path = path.into();
        let line_count = fs::read_to_string(&path)?.lines().count();
        if range.end > line_count {
            return Err(AssistantError::invalid_input(format!(
                "{} has {} lines; cannot select {}:{}",
                path.display(),
                line_count,
                range.start,
                range.end
            )));
        }
        Ok(Self { path, range })
    }

    fn read_lines(&self) -> Result<(Vec<String>, bool)> {
        let content = fs::read_to_string(&self.path)?;
        let trailing_newline = content.ends_with('\n');
        Ok((content.lines().map(str::to_string).collect(), trailing_newline))
    }
}

impl TextEditor for FileSelectionEditor {
    fn selected_text(&self) -> String {
        match self.read_lines() {
            Ok((lines, _)) => lines
                .get(self.range.start - 1..self.range.end.min(lines.len()))
                .map(|selected| selected.join("\n"))
                .unwrap_or_default(),
            Err(e) => {
                tracing::error!("Failed to read {:?}: {}", self.path, e);
                String::new()
            }
        }
    }

    fn replace_selection(&self, replacement: &str) -> Result<()> {
        let (lines, trailing_newline) = self.read_lines()?;
        if self.range.end > lines.len() {
            return Err(AssistantError::invalid_input(format!(
                "{} changed on disk; selection {}:{} no longer exists",
                self.path.display(),
                self.range.start,
                self.range.end
            )));
        }

        let mut output: Vec<&str> = Vec::with_capacity(lines.len());
        output.extend(lines[..self.range.start - 1].iter().map(String::as_str));
        output.extend(replacement.lines());
        output.extend(lines[self.range.end..].iter().map(String::as_str));

        let mut content = output.join("\n");
        if trailing_newline {
            content.push('\n');
        }

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| AssistantError::io(format!("Path has no file name: {:?}", self.path)))?;
        let tmp_path = self
            .path
            .with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));
        fs::write(&tmp_path, content)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("main.rs");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_line_range() {
        assert_eq!("3:5".parse::<LineRange>().unwrap(), LineRange { start: 3, end: 5 });
        assert!("5:3".parse::<LineRange>().is_err());
        assert!("0:2".parse::<LineRange>().is_err());
        assert!("abc".parse::<LineRange>().is_err());
    }

    #[test]
    fn test_selected_text_is_inclusive() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a\nb\nc\nd\n");
        let editor = FileSelectionEditor::open(&path, LineRange { start: 2, end: 3 }).unwrap();
        assert_eq!(editor.selected_text(), "b\nc");
    }

    #[test]
    fn test_range_past_end_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a\nb\n");
        assert!(FileSelectionEditor::open(&path, LineRange { start: 1, end: 3 }).is_err());
    }

    #[test]
    fn test_replace_selection_keeps_surrounding_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a\nb\nc\nd\n");
        let editor = FileSelectionEditor::open(&path, LineRange { start: 2, end: 3 }).unwrap();

        editor.replace_selection("x\ny\nz").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nx\ny\nz\nd\n");
        assert!(!dir.path().join(".main.rs.tmp").exists());
    }
}
