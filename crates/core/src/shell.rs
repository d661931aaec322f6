//! The application shell: paths that must be servable without network access.

use serde::{Deserialize, Serialize};

/// Ordered, de-duplicated list of shell paths to precache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ShellManifest {
    paths: Vec<String>,
}

impl ShellManifest {
    /// Build a manifest, keeping the first occurrence of each path.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into();
            if !out.contains(&path) {
                out.push(path);
            }
        }
        Self { paths: out }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl Default for ShellManifest {
    fn default() -> Self {
        Self::new(["/", "/index.html", "/manifest.json"])
    }
}

impl From<Vec<String>> for ShellManifest {
    fn from(paths: Vec<String>) -> Self {
        Self::new(paths)
    }
}

impl From<ShellManifest> for Vec<String> {
    fn from(manifest: ShellManifest) -> Self {
        manifest.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = ShellManifest::default();
        assert_eq!(manifest.iter().collect::<Vec<_>>(), ["/", "/index.html", "/manifest.json"]);
    }

    #[test]
    fn test_duplicates_collapsed_in_order() {
        let manifest = ShellManifest::new(["/index.html", "/", "/index.html"]);
        assert_eq!(manifest.iter().collect::<Vec<_>>(), ["/index.html", "/"]);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_serde_as_plain_list() {
        let manifest: ShellManifest = serde_json::from_str(r#"["/", "/app.js"]"#).unwrap();
        assert_eq!(manifest.iter().collect::<Vec<_>>(), ["/", "/app.js"]);
        assert_eq!(serde_json::to_string(&manifest).unwrap(), r#"["/","/app.js"]"#);
    }
}
