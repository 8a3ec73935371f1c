//! Local target derivation from a URL path.

use std::path::{Path, PathBuf};

use super::sanitize::sanitize_filename_for_linux;
use super::DEFAULT_FILENAME;

/// Maps a URL (and an optional server-suggested filename) to a file under `output_dir`.
///
/// The URL path's directory structure is mirrored below `output_dir`; the
/// suggested filename, when present, replaces only the final segment. Every
/// segment is sanitized and `.`/`..` segments are dropped, so the result
/// always stays inside `output_dir`. An empty path or a trailing slash falls
/// back to `download.bin`. Returns `None` if `url` does not parse.
pub fn local_target(
    url: &str,
    output_dir: &Path,
    suggested_filename: Option<&str>,
) -> Option<PathBuf> {
    let parsed = url::Url::parse(url).ok()?;
    let raw: Vec<&str> = parsed.path().trim_start_matches('/').split('/').collect();
    let (last, dirs) = raw.split_last()?;

    let mut target = output_dir.to_path_buf();
    for dir in dirs {
        let seg = sanitize_filename_for_linux(dir);
        if !seg.is_empty() {
            target.push(seg);
        }
    }

    let file_name = suggested_filename
        .map(sanitize_filename_for_linux)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| sanitize_filename_for_linux(last));
    if file_name.is_empty() {
        target.push(DEFAULT_FILENAME);
    } else {
        target.push(file_name);
    }
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str, suggested: Option<&str>) -> PathBuf {
        local_target(url, Path::new("/out"), suggested).unwrap()
    }

    #[test]
    fn mirrors_url_directories() {
        assert_eq!(
            target("https://example.com/a/b/file.deb", None),
            PathBuf::from("/out/a/b/file.deb")
        );
        assert_eq!(
            target("https://example.com/single", None),
            PathBuf::from("/out/single")
        );
    }

    #[test]
    fn suggested_filename_replaces_only_last_segment() {
        assert_eq!(
            target("https://example.com/a/b/get?id=7", Some("report.pdf")),
            PathBuf::from("/out/a/b/report.pdf")
        );
    }

    #[test]
    fn query_is_ignored() {
        assert_eq!(
            target("https://example.com/file.zip?token=abc", None),
            PathBuf::from("/out/file.zip")
        );
    }

    #[test]
    fn root_and_trailing_slash_fall_back() {
        assert_eq!(target("https://example.com/", None), PathBuf::from("/out/download.bin"));
        assert_eq!(target("https://example.com", None), PathBuf::from("/out/download.bin"));
        assert_eq!(
            target("https://example.com/dir/", None),
            PathBuf::from("/out/dir/download.bin")
        );
    }

    #[test]
    fn suggested_filename_cannot_escape() {
        assert_eq!(
            target("https://example.com/a/x", Some("../../etc/passwd")),
            PathBuf::from("/out/a/etc_passwd")
        );
        assert_eq!(target("https://example.com/a/x", Some("..")), PathBuf::from("/out/a/x"));
    }

    #[test]
    fn deterministic() {
        let a = target("https://example.com/p/q.iso", Some("r.iso"));
        let b = target("https://example.com/p/q.iso", Some("r.iso"));
        assert_eq!(a, b);
    }

    #[test]
    fn unparseable_url() {
        assert!(local_target("not a url", Path::new("/out"), None).is_none());
    }
}
