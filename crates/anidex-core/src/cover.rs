//! Cover art lookup.

use std::path::{Component, Path, PathBuf};

/// Extensions tried, in order. The first existing file wins.
pub const COVER_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".webp", ".avif", ".svg"];

/// URL served when a title has no cover on disk.
pub const PLACEHOLDER_URL: &str = "/static/placeholder.svg";

/// Resolves a title to the URL of its cover image.
///
/// Not cached: the filesystem is consulted on every call so covers dropped
/// into the directory show up immediately.
#[derive(Debug, Clone)]
pub struct CoverResolver {
    covers_dir: PathBuf,
    url_prefix: String,
}

impl CoverResolver {
    /// `covers_dir` is the directory on disk; covers are served under
    /// `/static/covers/`.
    pub fn new(covers_dir: impl Into<PathBuf>) -> Self {
        Self {
            covers_dir: covers_dir.into(),
            url_prefix: "/static/covers/".into(),
        }
    }

    /// URL path of the cover for `title`, or [`PLACEHOLDER_URL`].
    ///
    /// The returned path is not percent-encoded; the view layer encodes it.
    pub fn resolve(&self, title: &str) -> String {
        if !is_safe_relative(title) {
            return PLACEHOLDER_URL.to_string();
        }

        COVER_EXTENSIONS
            .iter()
            .map(|ext| format!("{title}{ext}"))
            .find(|name| self.covers_dir.join(name).is_file())
            .map(|name| format!("{}{name}", self.url_prefix))
            .unwrap_or_else(|| PLACEHOLDER_URL.to_string())
    }
}

/// A title maps onto the covers directory only as a relative path of plain
/// segments: no root, no drive prefix, no `.`/`..`, no empty segments and no
/// backslashes. `Fate/Zero` is fine and looks for `covers/Fate/Zero.jpg`.
fn is_safe_relative(title: &str) -> bool {
    !title.is_empty()
        && !title.contains('\\')
        && title
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
        && Path::new(title)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CoverResolver::new(dir.path());
        assert_eq!(resolver.resolve("Missing"), PLACEHOLDER_URL);
    }

    #[test]
    fn extension_order_prefers_jpg() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Frieren.png"), b"png").unwrap();
        std::fs::write(dir.path().join("Frieren.jpg"), b"jpg").unwrap();
        std::fs::write(dir.path().join("Frieren.svg"), b"svg").unwrap();

        let resolver = CoverResolver::new(dir.path());
        assert_eq!(resolver.resolve("Frieren"), "/static/covers/Frieren.jpg");
    }

    #[test]
    fn finds_later_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Mob Psycho.avif"), b"avif").unwrap();

        let resolver = CoverResolver::new(dir.path());
        assert_eq!(resolver.resolve("Mob Psycho"), "/static/covers/Mob Psycho.avif");
    }

    #[test]
    fn directories_do_not_count() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Odd.jpg")).unwrap();

        let resolver = CoverResolver::new(dir.path());
        assert_eq!(resolver.resolve("Odd"), PLACEHOLDER_URL);
    }

    #[test]
    fn traversal_titles_get_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let covers = dir.path().join("covers");
        std::fs::create_dir(&covers).unwrap();
        std::fs::write(dir.path().join("secret.jpg"), b"x").unwrap();

        let resolver = CoverResolver::new(&covers);
        assert_eq!(resolver.resolve("../secret"), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve("a/b"), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve(".."), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve(""), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve("/etc/passwd"), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve("a/../../secret"), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve("..\\secret"), PLACEHOLDER_URL);
    }

    #[test]
    fn titles_with_slashes_find_nested_covers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Fate")).unwrap();
        std::fs::write(dir.path().join("Fate").join("Zero.jpg"), b"jpg").unwrap();

        let resolver = CoverResolver::new(dir.path());
        assert_eq!(resolver.resolve("Fate/Zero"), "/static/covers/Fate/Zero.jpg");
        assert_eq!(resolver.resolve("Fate/Stay Night"), PLACEHOLDER_URL);
    }

    #[test]
    fn odd_segments_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Fate")).unwrap();
        std::fs::write(dir.path().join("Fate").join("Zero.jpg"), b"jpg").unwrap();

        let resolver = CoverResolver::new(dir.path());
        assert_eq!(resolver.resolve("Fate//Zero"), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve("./Fate/Zero"), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve("Fate/./Zero"), PLACEHOLDER_URL);
        assert_eq!(resolver.resolve("Fate/Zero/"), PLACEHOLDER_URL);
    }
}
