use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Collapse every run of non-word characters into a single `-` and trim
/// leading and trailing dashes.
///
/// Word characters are Unicode alphanumerics and `_`. The result is safe to
/// use as a single path component.
pub fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Stable identifier of a baseline: suite, test name, optional
/// discriminator, and format extension.
///
/// All components are sanitised on construction, so two ids built from the
/// same raw names always map to the same storage key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BaselineId {
    suite: String,
    test: String,
    discriminator: Option<String>,
    extension: String,
}

impl BaselineId {
    /// Build an id with no discriminator.
    ///
    /// Fails if any component sanitises to an empty string.
    pub fn new(
        suite: impl AsRef<str>,
        test: impl AsRef<str>,
        extension: impl AsRef<str>,
    ) -> TypeResult<Self> {
        Ok(Self {
            suite: non_empty("suite", suite.as_ref())?,
            test: non_empty("test", test.as_ref())?,
            discriminator: None,
            extension: non_empty("extension", extension.as_ref())?,
        })
    }

    /// Attach a discriminator (explicit name or automatic counter).
    pub fn with_discriminator(mut self, discriminator: impl AsRef<str>) -> TypeResult<Self> {
        self.discriminator = Some(non_empty("discriminator", discriminator.as_ref())?);
        Ok(self)
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn test(&self) -> &str {
        &self.test
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name: `<test>.<discriminator>.<extension>` or `<test>.<extension>`.
    pub fn file_name(&self) -> String {
        match &self.discriminator {
            Some(d) => format!("{}.{}.{}", self.test, d, self.extension),
            None => format!("{}.{}", self.test, self.extension),
        }
    }

    /// Path relative to a snapshot root: `<suite>/<file name>`.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.suite).join(self.file_name())
    }

    /// Recover an id from a path produced by [`relative_path`](Self::relative_path).
    pub fn from_relative_path(path: &Path) -> TypeResult<Self> {
        let mut components = path.iter().map(|c| c.to_string_lossy().into_owned());
        let (suite, file) = match (components.next(), components.next(), components.next()) {
            (Some(suite), Some(file), None) => (suite, file),
            _ => {
                return Err(TypeError::InvalidIdentifier(format!(
                    "expected <suite>/<file>, got {}",
                    path.display()
                )))
            }
        };

        let parts: Vec<&str> = file.split('.').collect();
        let id = match parts.as_slice() {
            [test, ext] => Self::new(&suite, test, ext)?,
            [test, discriminator, ext] => {
                Self::new(&suite, test, ext)?.with_discriminator(discriminator)?
            }
            _ => {
                return Err(TypeError::InvalidIdentifier(format!(
                    "unrecognised baseline file name: {file}"
                )))
            }
        };

        // Reject names that only parse because sanitising rewrote them.
        if id.suite != suite || id.file_name() != file {
            return Err(TypeError::InvalidIdentifier(format!(
                "non-canonical baseline path: {}",
                path.display()
            )));
        }
        Ok(id)
    }
}

impl fmt::Display for BaselineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.suite, self.file_name())
    }
}

fn non_empty(what: &str, raw: &str) -> TypeResult<String> {
    let clean = sanitize_component(raw);
    if clean.is_empty() {
        return Err(TypeError::InvalidIdentifier(format!(
            "{what} {raw:?} is empty after sanitising"
        )));
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sanitize_collapses_and_trims() {
        assert_eq!(sanitize_component("testLogin()"), "testLogin");
        assert_eq!(sanitize_component("  renders  header / dark  "), "renders-header-dark");
        assert_eq!(sanitize_component("snake_case_ok"), "snake_case_ok");
        assert_eq!(sanitize_component("a::b::c"), "a-b-c");
        assert_eq!(sanitize_component("---"), "");
    }

    #[test]
    fn file_name_without_discriminator() {
        let id = BaselineId::new("LoginTests", "test_form()", "txt").unwrap();
        assert_eq!(id.file_name(), "test_form.txt");
        assert_eq!(id.to_string(), "LoginTests/test_form.txt");
    }

    #[test]
    fn file_name_with_discriminator() {
        let id = BaselineId::new("LoginTests", "test_form", "json")
            .unwrap()
            .with_discriminator("iPhone SE")
            .unwrap();
        assert_eq!(id.file_name(), "test_form.iPhone-SE.json");
        assert_eq!(id.relative_path(), PathBuf::from("LoginTests/test_form.iPhone-SE.json"));
    }

    #[test]
    fn empty_components_rejected() {
        assert!(BaselineId::new("suite", "()", "txt").is_err());
        assert!(BaselineId::new("", "test", "txt").is_err());
        assert!(BaselineId::new("suite", "test", ".").is_err());
    }

    #[test]
    fn relative_path_round_trip() {
        let id = BaselineId::new("suite", "test", "txt")
            .unwrap()
            .with_discriminator("2")
            .unwrap();
        let parsed = BaselineId::from_relative_path(&id.relative_path()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn from_relative_path_rejects_odd_layouts() {
        assert!(BaselineId::from_relative_path(Path::new("only.txt")).is_err());
        assert!(BaselineId::from_relative_path(Path::new("a/b/c.txt")).is_err());
        assert!(BaselineId::from_relative_path(Path::new("suite/noext")).is_err());
        assert!(BaselineId::from_relative_path(Path::new("suite/bad name.txt")).is_err());
    }

    proptest! {
        #[test]
        fn sanitized_components_never_contain_separators(raw in ".{0,40}") {
            let clean = sanitize_component(&raw);
            prop_assert!(!clean.contains('/'));
            prop_assert!(!clean.contains('.'));
            prop_assert!(!clean.starts_with('-'));
            prop_assert!(!clean.ends_with('-'));
            prop_assert_eq!(sanitize_component(&clean), clean.clone());
        }
    }
}
