// Bounded file locator
// Reads a module from disk, falling back to `../`-prefixed variants of the path

use crate::error::LoadError;
use crate::path::ModulePath;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// How many `../` prefixes the locator tries after the direct path fails
pub const MAX_PARENT_LEVELS: usize = 8;

/// Source of module text.
///
/// [`DiskReader`] is the real implementation; the flattener is generic over
/// this so traversal can be exercised against an in-memory file set.
pub trait SourceReader {
    fn read_source(&self, path: &Path) -> io::Result<String>;
}

/// Reads whole files from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskReader;

impl SourceReader for DiskReader {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(error) => {
                log::warn!(
                    "{} is not valid UTF-8; invalid sequences replaced",
                    path.display()
                );
                Ok(String::from_utf8_lossy(error.as_bytes()).into_owned())
            }
        }
    }
}

/// A module's text and where it was actually found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    pub location: PathBuf,
    pub text: String,
}

/// Paths tried for `path`, in order: the path itself, then `../path`,
/// `../../path`, ... up to [`MAX_PARENT_LEVELS`] prefixes.
pub fn search_candidates(path: &ModulePath) -> impl Iterator<Item = PathBuf> + '_ {
    (0..=MAX_PARENT_LEVELS).map(move |up| PathBuf::from(format!("{}{}", "../".repeat(up), path)))
}

/// Read `path`, searching parent directories if the direct read fails.
///
/// The upward search mirrors the bootstrap interpreter's import lookup.
/// The first readable candidate wins.
///
/// # Errors
/// Reports the failure of the *direct* read, naming `path` itself rather
/// than the last `../` variant tried.
pub fn locate_and_read<R: SourceReader + ?Sized>(
    reader: &R,
    path: &ModulePath,
) -> Result<LocatedSource, LoadError> {
    let mut direct_error = None;

    for candidate in search_candidates(path) {
        match reader.read_source(&candidate) {
            Ok(text) => {
                log::debug!("found {} at {}", path, candidate.display());
                return Ok(LocatedSource {
                    location: candidate,
                    text,
                });
            }
            Err(error) => {
                log::debug!("no module at {}: {}", candidate.display(), error);
                if direct_error.is_none() {
                    direct_error = Some(error);
                }
            }
        }
    }

    Err(match direct_error {
        Some(error) if error.kind() != io::ErrorKind::NotFound => LoadError::Io {
            path: path.to_string(),
            source: error,
        },
        _ => LoadError::FileNotFound {
            path: path.to_string(),
        },
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory file set that records every path it is asked for
    #[derive(Default)]
    pub(crate) struct MemoryReader {
        pub files: HashMap<PathBuf, String>,
        pub attempts: RefCell<Vec<PathBuf>>,
    }

    impl MemoryReader {
        pub fn with(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                    .collect(),
                attempts: RefCell::new(Vec::new()),
            }
        }
    }

    impl SourceReader for MemoryReader {
        fn read_source(&self, path: &Path) -> io::Result<String> {
            self.attempts.borrow_mut().push(path.to_path_buf());
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    #[test]
    fn test_direct_hit() {
        let reader = MemoryReader::with(&[("lib/a.kooix", "fn a();")]);
        let found = locate_and_read(&reader, &ModulePath::new("lib/a")).unwrap();

        assert_eq!(found.text, "fn a();");
        assert_eq!(found.location, PathBuf::from("lib/a.kooix"));
        assert_eq!(reader.attempts.borrow().len(), 1);
    }

    #[test]
    fn test_stops_at_first_ancestor_hit() {
        let reader = MemoryReader::with(&[
            ("../../lib/a.kooix", "two up"),
            ("../../../lib/a.kooix", "three up"),
        ]);
        let found = locate_and_read(&reader, &ModulePath::new("lib/a")).unwrap();

        assert_eq!(found.text, "two up");
        assert_eq!(
            *reader.attempts.borrow(),
            vec![
                PathBuf::from("lib/a.kooix"),
                PathBuf::from("../lib/a.kooix"),
                PathBuf::from("../../lib/a.kooix"),
            ]
        );
    }

    #[test]
    fn test_exhausts_exactly_nine_candidates() {
        let reader = MemoryReader::default();
        let error = locate_and_read(&reader, &ModulePath::new("missing")).unwrap_err();

        let attempts = reader.attempts.borrow();
        assert_eq!(attempts.len(), MAX_PARENT_LEVELS + 1);
        assert_eq!(
            attempts.last().unwrap(),
            &PathBuf::from(format!("{}missing.kooix", "../".repeat(8)))
        );
        assert_eq!(error.to_string(), "failed to read file 'missing.kooix'");
    }

    #[test]
    fn test_ninth_level_is_never_tried() {
        let deep = format!("{}x.kooix", "../".repeat(MAX_PARENT_LEVELS + 1));
        let reader = MemoryReader::with(&[(deep.as_str(), "too far")]);

        assert!(matches!(
            locate_and_read(&reader, &ModulePath::new("x")),
            Err(LoadError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_disk_reader_lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bin.kooix");
        fs::write(&file, b"fn a() {}\xff\n").unwrap();

        let text = DiskReader.read_source(&file).unwrap();
        assert!(text.starts_with("fn a() {}"));
        assert!(text.contains('\u{FFFD}'));
    }
}
