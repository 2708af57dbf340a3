//! Three-component semantic version with copy-on-increment semantics.

use crate::error::VersionError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// First `MAJOR.MINOR.PATCH` run anywhere in the text. Components are
/// multi-digit and separated by literal dots.
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("version pattern compiles"));

/// A `major.minor.patch` version as found in a manifest's `package.version`.
///
/// Pre-release and build metadata are not modelled: parsing reads the first
/// numeric triple in the text and ignores the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
}

impl SemanticVersion {
    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the first `MAJOR.MINOR.PATCH` occurrence in `text`.
    ///
    /// # Errors
    /// [`VersionError::Malformed`] when no triple is present,
    /// [`VersionError::ComponentOutOfRange`] when a component overflows `u64`.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let captures = VERSION_PATTERN
            .captures(text)
            .ok_or_else(|| VersionError::Malformed {
                text: text.to_string(),
            })?;

        let component = |index: usize| -> Result<u64, VersionError> {
            let raw = &captures[index];
            raw.parse::<u64>()
                .map_err(|_| VersionError::ComponentOutOfRange {
                    text: text.to_string(),
                    component: raw.to_string(),
                })
        };

        Ok(Self::new(component(1)?, component(2)?, component(3)?))
    }

    /// Return a copy with the patch component raised by one.
    ///
    /// # Errors
    /// [`VersionError::ComponentOutOfRange`] when the patch is already `u64::MAX`.
    pub fn increment_patch(&self) -> Result<Self, VersionError> {
        let patch = self
            .patch
            .checked_add(1)
            .ok_or_else(|| VersionError::ComponentOutOfRange {
                text: self.to_string(),
                component: self.patch.to_string(),
            })?;
        Ok(Self { patch, ..*self })
    }

    /// Convert to a [`semver::Version`] for requirement matching
    pub fn to_semver(&self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
