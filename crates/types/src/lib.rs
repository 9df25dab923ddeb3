//! Validated text types shared across the docstore crates.
//!
//! Everything that arrives from a client (file names, extensions) is parsed into one of these
//! types before it reaches the filesystem.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input is not usable as a single flat file name
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}

/// Returns the final path component of a client-supplied name.
///
/// Both `/` and `\` count as separators, so `C:\scans\photo.jpg` and `docs/photo.jpg` both
/// yield `photo.jpg`. A name ending in a separator yields an empty string.
pub fn last_component(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// A file name that is safe to join onto a storage directory.
///
/// A `FileName` is exactly one normal path component: it is never empty, never `.` or `..`,
/// and never contains a path separator (`/` or `\`) or a NUL byte. The name is kept exactly as
/// given (no trimming, no case folding) because it is also the retrieval key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    /// Parses a file name that must already be a single path component.
    ///
    /// Use this for names that address stored content (e.g. the `{fileName}` path segment of a
    /// download request).
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for empty or whitespace-only input, and
    /// `TextError::InvalidFileName` for anything that would escape or nest below the storage
    /// directory.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let raw = input.as_ref();
        if raw.trim().is_empty() {
            return Err(TextError::Empty);
        }

        if raw == "." || raw == ".." {
            return Err(TextError::InvalidFileName(raw.to_owned()));
        }

        if raw.chars().any(|c| matches!(c, '/' | '\\' | '\0')) {
            return Err(TextError::InvalidFileName(raw.to_owned()));
        }

        Ok(Self(raw.to_owned()))
    }

    /// Parses a client-supplied upload name, keeping only its final path component.
    ///
    /// Browsers and HTTP clients sometimes send a full or relative path as the multipart file
    /// name (`C:\scans\photo.jpg`, `docs/photo.jpg`). Only the last component is kept, so both
    /// examples become `photo.jpg`.
    pub fn from_client(input: impl AsRef<str>) -> Result<Self, TextError> {
        Self::new(last_component(input.as_ref()))
    }

    /// Returns the extension of this name, including the leading dot.
    ///
    /// The extension starts at the last `.` of the name. A trailing dot yields no extension.
    pub fn extension(&self) -> Option<Extension> {
        Extension::of(&self.0)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for FileName {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for FileName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for FileName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A file extension with its leading dot, as given (e.g. `.PDF`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension(String);

impl Extension {
    /// Extracts the extension of a single name component, including the leading dot.
    ///
    /// The extension starts at the last `.` of `name`. A trailing dot, or no dot at all, yields
    /// no extension.
    pub fn of(name: &str) -> Option<Self> {
        let idx = name.rfind('.')?;
        if idx + 1 == name.len() {
            return None;
        }
        Some(Self(name[idx..].to_owned()))
    }

    /// Returns the extension exactly as it appeared in the file name, dot included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the extension without its leading dot (`.pdf` -> `pdf`).
    pub fn without_dot(&self) -> &str {
        self.0.trim_start_matches('.')
    }

    /// Case-insensitive comparison against an extension written with its dot.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl std::fmt::Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
