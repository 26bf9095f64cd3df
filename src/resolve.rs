//! Locating the executable behind a command name.

use crate::error::ShellError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Split a colon-separated search path into its directories, in order.
///
/// Empty segments are dropped, so an empty string yields no directories.
pub fn search_dirs(search_path: &str) -> impl Iterator<Item = &str> {
    search_path.split(':').filter(|dir| !dir.is_empty())
}

/// Resolve `name` to the file that should be executed.
///
/// Behavior:
/// - The name itself is tried first, relative to `cwd` unless absolute.
/// - Otherwise each directory of `search_path` is tried in order and the first
///   executable `dir/name` wins, so earlier directories shadow later ones.
/// - Only regular files with an execute bit qualify. When nothing qualifies but
///   a non-executable match was seen, that match is reported as
///   [`ShellError::NotExecutable`]; otherwise [`ShellError::CommandNotFound`].
///
/// Relative search-path entries are taken relative to `cwd` as well.
pub fn resolve(name: &str, search_path: &str, cwd: &Path) -> Result<PathBuf, ShellError> {
    if name.is_empty() {
        return Err(ShellError::CommandNotFound {
            name: name.to_owned(),
        });
    }

    let mut not_executable = None;
    let direct = std::iter::once(cwd.join(name));
    let searched = search_dirs(search_path).map(|dir| cwd.join(dir).join(name));

    for candidate in direct.chain(searched) {
        match probe(&candidate) {
            Probe::Executable => {
                trace!(candidate = %candidate.display(), "resolved");
                return Ok(candidate);
            }
            Probe::NotExecutable => {
                trace!(candidate = %candidate.display(), "exists but is not executable");
                not_executable.get_or_insert(candidate);
            }
            Probe::Missing => trace!(candidate = %candidate.display(), "missing"),
        }
    }

    Err(match not_executable {
        Some(path) => ShellError::NotExecutable { path },
        None => ShellError::CommandNotFound {
            name: name.to_owned(),
        },
    })
}

#[derive(Debug, PartialEq, Eq)]
enum Probe {
    Missing,
    NotExecutable,
    Executable,
}

fn probe(path: &Path) -> Probe {
    match fs::metadata(path) {
        Err(_) => Probe::Missing,
        Ok(meta) if meta.is_file() && is_executable(&meta) => Probe::Executable,
        Ok(_) => Probe::NotExecutable,
    }
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    true
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn two_dirs() -> (TempDir, PathBuf, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();
        (root, a, b)
    }

    #[test]
    fn test_search_dirs_skips_empty_segments() {
        assert_eq!(search_dirs("").count(), 0);
        assert_eq!(
            search_dirs("/bin::/usr/bin:").collect::<Vec<_>>(),
            ["/bin", "/usr/bin"]
        );
    }

    #[test]
    fn test_earlier_directory_shadows_later() {
        let (root, a, b) = two_dirs();
        let in_a = touch(&a, "tool", 0o755);
        touch(&b, "tool", 0o755);

        let path = format!("{}:{}", a.display(), b.display());
        let found = resolve("tool", &path, root.path()).unwrap();
        assert_eq!(found, in_a);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let (root, a, b) = two_dirs();
        touch(&b, "tool", 0o755);
        let path = format!("{}:{}", a.display(), b.display());

        let first = resolve("tool", &path, root.path()).unwrap();
        let second = resolve("tool", &path, root.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_search_path_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let err = resolve("nonexistentcmd123", "", root.path()).unwrap_err();
        assert!(matches!(err, ShellError::CommandNotFound { ref name } if name == "nonexistentcmd123"));
    }

    #[test]
    fn test_direct_name_in_cwd_wins() {
        let (root, a, _b) = two_dirs();
        let local = touch(root.path(), "tool", 0o755);
        touch(&a, "tool", 0o755);

        let found = resolve("tool", &a.display().to_string(), root.path()).unwrap();
        assert_eq!(found, local);
    }

    #[test]
    fn test_absolute_name() {
        let root = tempfile::tempdir().unwrap();
        let exe = touch(root.path(), "abs", 0o700);
        let found = resolve(exe.to_str().unwrap(), "", Path::new("/")).unwrap();
        assert_eq!(found, exe);
    }

    #[test]
    fn test_non_executable_is_skipped_for_later_match() {
        let (root, a, b) = two_dirs();
        touch(&a, "tool", 0o644);
        let in_b = touch(&b, "tool", 0o755);

        let path = format!("{}:{}", a.display(), b.display());
        assert_eq!(resolve("tool", &path, root.path()).unwrap(), in_b);
    }

    #[test]
    fn test_only_non_executable_match_is_reported() {
        let (root, a, _b) = two_dirs();
        let plain = touch(&a, "tool", 0o644);

        let err = resolve("tool", &a.display().to_string(), root.path()).unwrap_err();
        assert!(matches!(err, ShellError::NotExecutable { ref path } if *path == plain));
    }

    #[test]
    fn test_directory_is_not_a_command() {
        let (root, a, _b) = two_dirs();
        fs::create_dir(a.join("tool")).unwrap();

        let err = resolve("tool", &a.display().to_string(), root.path()).unwrap_err();
        assert!(matches!(err, ShellError::NotExecutable { .. }));
    }

    #[test]
    fn test_empty_name_is_not_found() {
        let err = resolve("", "/bin", Path::new("/")).unwrap_err();
        assert!(matches!(err, ShellError::CommandNotFound { .. }));
    }
}
