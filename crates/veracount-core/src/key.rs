use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// Remote object key that passed the prefix/extension filter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-encode the key for use as a URL path, keeping `/` separators.
    pub fn url_path(&self) -> String {
        self.0
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts keys under `prefix` ending with `extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFilter {
    prefix: String,
    extension: String,
}

impl KeyFilter {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn matches(&self, key: &str) -> bool {
        key.starts_with(&self.prefix) && key.ends_with(&self.extension)
    }

    /// Wrap `key` as an [`ObjectKey`] when it passes the filter.
    pub fn accept(&self, key: &str) -> Option<ObjectKey> {
        self.matches(key).then(|| ObjectKey(key.to_string()))
    }

    /// Local path of `key` relative to the staging root.
    ///
    /// Returns `None` when the remainder after the prefix is empty or would
    /// leave the staging root (absolute, `..`, or other non-normal parts).
    pub fn relative_path(&self, key: &ObjectKey) -> Option<PathBuf> {
        let rest = key.as_str().strip_prefix(&self.prefix)?;
        let relative = Path::new(rest.trim_start_matches('/'));

        let mut path = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }

        (!path.as_os_str().is_empty()).then_some(path)
    }
}
