//! Path resolution for depot storage.
//!
//! Every filesystem path the service touches is built here from the
//! configured roots plus client-supplied names. Client-supplied names are
//! first parsed into [`Segment`]s, which are guaranteed to be a single
//! normal path component, so a resolved path can never leave its root.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::config::Config;

/// Name of the per-user allow-list file under `users_dir/<identity>/`.
pub const PERMISSIONS_FILE: &str = "projects";

/// Prefix of in-flight upload files inside a project directory.
pub const UPLOAD_TEMP_PREFIX: &str = ".upload-";

/// Rejected path segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Segment is empty.
    #[error("path segment is empty")]
    Empty,

    /// Segment contains a NUL byte.
    #[error("path segment contains a NUL byte")]
    NulByte,

    /// Segment is absolute or starts with a root marker.
    #[error("path segment {0:?} is absolute")]
    Absolute(String),

    /// Segment references the current or parent directory.
    #[error("path segment {0:?} contains a directory traversal")]
    Traversal(String),

    /// Segment contains a path separator.
    #[error("path segment {0:?} contains a path separator")]
    Separator(String),

    /// Segment collides with a name the store uses internally.
    #[error("path segment {0:?} uses a reserved name")]
    Reserved(String),
}

/// A validated, single-component path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(String);

impl Segment {
    /// Parse an untrusted name into a segment.
    ///
    /// Rejects empty names, NUL bytes, absolute paths, any name containing
    /// `..`, the name `.`, and names containing `/` or `\`.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        if raw.contains('\0') {
            return Err(PathError::NulByte);
        }
        if raw.starts_with('/') || raw.starts_with('\\') || Path::new(raw).has_root() {
            return Err(PathError::Absolute(raw.to_string()));
        }
        if raw == "." || raw.contains("..") {
            return Err(PathError::Traversal(raw.to_string()));
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(PathError::Separator(raw.to_string()));
        }

        // Catches platform-specific prefixes (e.g. `C:` on Windows).
        let mut components = Path::new(raw).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(Self(raw.to_string())),
            _ => Err(PathError::Absolute(raw.to_string())),
        }
    }

    /// Parse an untrusted name for a stored file.
    ///
    /// Same rules as [`Segment::parse`], and additionally rejects names
    /// reserved for in-flight uploads.
    pub fn file_name(raw: &str) -> Result<Self, PathError> {
        let segment = Self::parse(raw)?;
        if segment.0.starts_with(UPLOAD_TEMP_PREFIX) {
            return Err(PathError::Reserved(segment.0));
        }
        Ok(segment)
    }

    /// The segment as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for Segment {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// Builds storage paths from configured roots.
#[derive(Debug, Clone)]
pub struct PathResolver {
    data_root: PathBuf,
    users_root: PathBuf,
}

impl PathResolver {
    /// Create a resolver over explicit roots.
    pub fn new(data_root: impl Into<PathBuf>, users_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            users_root: users_root.into(),
        }
    }

    /// Create a resolver for `root/data_dir` and `root/users_dir`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_root(), config.users_root())
    }

    /// Root directory holding all projects.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Root directory holding all per-user directories.
    pub fn users_root(&self) -> &Path {
        &self.users_root
    }

    /// `root/users_dir/<identity>/projects`
    ///
    /// The identity is untrusted and validated like any other segment.
    pub fn permissions_path(&self, identity: &str) -> Result<PathBuf, PathError> {
        let user = Segment::parse(identity)?;
        Ok(self.users_root.join(user).join(PERMISSIONS_FILE))
    }

    /// `root/data_dir/<project>`
    pub fn project_dir(&self, project: &Segment) -> PathBuf {
        self.data_root.join(project)
    }

    /// `root/data_dir/<project>/<file>`
    pub fn content_path(&self, project: &Segment, file: &Segment) -> PathBuf {
        self.project_dir(project).join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/srv/depot/data", "/srv/depot/users")
    }

    #[test]
    fn test_parse_plain_names() {
        for name in ["proj1", "notes.txt", ".hidden", "a b c", "日本語.txt", "x.tar.gz"] {
            let segment = Segment::parse(name).unwrap();
            assert_eq!(segment.as_str(), name);
        }
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(Segment::parse(""), Err(PathError::Empty));
    }

    #[test]
    fn test_parse_rejects_nul() {
        assert_eq!(Segment::parse("a\0b"), Err(PathError::NulByte));
    }

    #[test]
    fn test_parse_rejects_traversal() {
        for name in ["..", ".", "../../etc", "..\\etc", "a..b", "..."] {
            assert!(
                matches!(
                    Segment::parse(name),
                    Err(PathError::Traversal(_)) | Err(PathError::Separator(_))
                ),
                "{name:?} should be rejected as traversal"
            );
        }
        assert!(matches!(
            Segment::parse("../../etc"),
            Err(PathError::Traversal(_))
        ));
    }

    #[test]
    fn test_parse_rejects_absolute() {
        for name in ["/etc", "/", "\\windows", "/etc/passwd"] {
            assert!(
                matches!(Segment::parse(name), Err(PathError::Absolute(_))),
                "{name:?} should be rejected as absolute"
            );
        }
    }

    #[test]
    fn test_parse_rejects_separators() {
        assert!(matches!(
            Segment::parse("a/b"),
            Err(PathError::Separator(_))
        ));
        assert!(matches!(
            Segment::parse("a\\b"),
            Err(PathError::Separator(_))
        ));
    }

    #[test]
    fn test_file_name_rejects_reserved_prefix() {
        assert!(matches!(
            Segment::file_name(".upload-1234.tmp"),
            Err(PathError::Reserved(_))
        ));
        // Only file names are restricted
        assert!(Segment::parse(".upload-1234.tmp").is_ok());
        assert!(Segment::file_name(".uploads").is_ok());
    }

    #[test]
    fn test_permissions_path() {
        let path = resolver().permissions_path("alice").unwrap();
        assert_eq!(path, PathBuf::from("/srv/depot/users/alice/projects"));
    }

    #[test]
    fn test_permissions_path_rejects_bad_identity() {
        let resolver = resolver();
        assert_eq!(resolver.permissions_path(""), Err(PathError::Empty));
        assert!(resolver.permissions_path("../bob").is_err());
        assert!(resolver.permissions_path("/root").is_err());
    }

    #[test]
    fn test_project_and_content_paths() {
        let resolver = resolver();
        let project = Segment::parse("proj1").unwrap();
        let file = Segment::file_name("notes.txt").unwrap();

        assert_eq!(
            resolver.project_dir(&project),
            PathBuf::from("/srv/depot/data/proj1")
        );
        assert_eq!(
            resolver.content_path(&project, &file),
            PathBuf::from("/srv/depot/data/proj1/notes.txt")
        );
    }

    #[test]
    fn test_resolved_paths_stay_under_root() {
        let resolver = resolver();
        let inputs = [
            "proj", "..", "../x", "/abs", "a/../../b", "\\x", "x\0", ".", "ok.txt", "..hidden",
        ];

        for project in inputs {
            for file in inputs {
                let (Ok(p), Ok(f)) = (Segment::parse(project), Segment::file_name(file)) else {
                    continue;
                };
                let path = resolver.content_path(&p, &f);
                assert!(path.starts_with(resolver.data_root()));
                assert_eq!(path.components().count(), resolver.data_root().components().count() + 2);
                assert!(!path.components().any(|c| c == Component::ParentDir));
            }
        }
    }
}
