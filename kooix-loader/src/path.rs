// Module path resolution
// Joins import specifiers onto the importing file's directory and infers the extension

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Extension appended to module paths that have none
pub const SOURCE_EXTENSION: &str = ".kooix";

/// A resolved module path.
///
/// Always carries an extension: [`ModulePath::new`] appends
/// [`SOURCE_EXTENSION`] when the last path component has no `.` in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(raw: impl Into<String>) -> Self {
        let mut path = raw.into();
        if !has_extension(&path) {
            path.push_str(SOURCE_EXTENSION);
        }
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Directory portion including the trailing `/`, or `""` for a bare file name
    pub fn base_dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(slash) => self.0.get(..=slash).unwrap_or_default(),
            None => "",
        }
    }

    /// Key used to detect revisits within one flatten call.
    ///
    /// `.` components are dropped and `dir/..` pairs cancel, so `lib/./a.kooix`
    /// and `x/../lib/a.kooix` both key as `lib/a.kooix`. Leading `..` in a
    /// relative path is kept.
    pub fn visit_key(&self) -> String {
        let absolute = self.0.starts_with('/');
        let mut parts: Vec<&str> = Vec::new();

        for part in self.0.split('/') {
            match part {
                "" | "." => {}
                ".." => match parts.last() {
                    Some(&last) if last != ".." => {
                        parts.pop();
                    }
                    _ if absolute => {}
                    _ => parts.push(".."),
                },
                other => parts.push(other),
            }
        }

        let joined = parts.join("/");
        if absolute {
            format!("/{}", joined)
        } else {
            joined
        }
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for ModulePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Resolve an import specifier against the importing file's directory.
///
/// A specifier starting with `/` is absolute and ignores `base_dir`. Anything
/// else is appended to `base_dir` as written, so `base_dir` must end with `/`
/// (or be empty). No filesystem access happens here.
pub fn resolve(base_dir: &str, raw: &str) -> ModulePath {
    if raw.starts_with('/') {
        ModulePath::new(raw)
    } else {
        ModulePath::new(format!("{}{}", base_dir, raw))
    }
}

/// A `.` after the last `/` counts as an extension
fn has_extension(path: &str) -> bool {
    match (path.rfind('.'), path.rfind('/')) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(dot), Some(slash)) => dot > slash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_inference() {
        assert_eq!(resolve("src/", "foo/bar").as_str(), "src/foo/bar.kooix");
        assert_eq!(resolve("src/", "foo/bar.txt").as_str(), "src/foo/bar.txt");
    }

    #[test]
    fn test_absolute_specifier_ignores_base() {
        assert_eq!(resolve("src/", "/opt/lib/io").as_str(), "/opt/lib/io.kooix");
    }

    #[test]
    fn test_empty_base_dir() {
        assert_eq!(resolve("", "lib").as_str(), "lib.kooix");
    }

    #[test]
    fn test_dot_in_directory_is_not_extension() {
        assert_eq!(resolve("", "../lib").as_str(), "../lib.kooix");
        assert_eq!(resolve("v1.2/", "core").as_str(), "v1.2/core.kooix");
    }

    #[test]
    fn test_base_dir() {
        assert_eq!(ModulePath::new("src/app/main").base_dir(), "src/app/");
        assert_eq!(ModulePath::new("/main.kooix").base_dir(), "/");
        assert_eq!(ModulePath::new("main").base_dir(), "");
    }

    #[test]
    fn test_visit_key_normalization() {
        assert_eq!(ModulePath::new("lib/./a").visit_key(), "lib/a.kooix");
        assert_eq!(ModulePath::new("x/../lib/a").visit_key(), "lib/a.kooix");
        assert_eq!(ModulePath::new("../../a").visit_key(), "../../a.kooix");
        assert_eq!(ModulePath::new("/srv//app/../a").visit_key(), "/srv/a.kooix");
        assert_eq!(ModulePath::new("/../a").visit_key(), "/a.kooix");
    }
}
