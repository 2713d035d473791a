// Combined source text with a per-file segment table

use crate::path::ModulePath;
use std::fmt;

/// One module's body inside the combined text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: ModulePath,
    /// Byte offset of the first byte of the body (after the marker line)
    pub start: usize,
    /// Byte offset one past the body (before the separator)
    pub end: usize,
}

/// A resolved location in one of the original files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    pub path: ModulePath,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

/// The flattened compilation unit.
///
/// Each module contributes `// --- file: <path> ---\n`, its raw text, then a
/// blank-line separator, dependencies first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    combined: String,
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn combined(&self) -> &str {
        &self.combined
    }

    pub fn into_combined(self) -> String {
        self.combined
    }

    /// Emitted modules in output order
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Raw text of one emitted module
    pub fn text_of(&self, file: &SourceFile) -> &str {
        self.combined.get(file.start..file.end).unwrap_or_default()
    }

    pub(crate) fn append(&mut self, path: &ModulePath, text: &str) {
        self.combined.push_str(&file_marker(path));
        let start = self.combined.len();
        self.combined.push_str(text);
        let end = self.combined.len();
        self.combined.push_str("\n\n");

        self.files.push(SourceFile {
            path: path.clone(),
            start,
            end,
        });
    }

    /// File whose body contains the byte at `offset`.
    ///
    /// Offsets that fall on a marker line or a separator belong to no file.
    pub fn locate(&self, offset: usize) -> Option<&SourceFile> {
        self.files
            .iter()
            .find(|file| offset >= file.start && offset < file.end)
    }

    /// Map a byte offset in the combined text back to a 1-based line and
    /// column in the original file
    pub fn position(&self, offset: usize) -> Option<SourcePosition> {
        let file = self.locate(offset)?;
        let before = self.combined.get(file.start..offset)?;

        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before.get(newline + 1..)?.chars().count() + 1,
            None => before.chars().count() + 1,
        };

        Some(SourcePosition {
            path: file.path.clone(),
            line,
            column,
        })
    }
}

/// Provenance line written ahead of every module body
pub fn file_marker(path: &ModulePath) -> String {
    format!("// --- file: {} ---\n", path)
}
