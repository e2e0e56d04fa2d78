use {
    crate::error::ReleaseError,
    std::{fmt, str::FromStr},
};

/// Plain decimal digits only; `str::parse` alone would also take a sign.
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// User-facing `major.minor.patch` version.
///
/// Keeps the text it was parsed from: the project file is patched by literal
/// substitution, and major/minor are carried over as written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarketingVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    text: String,
}

impl MarketingVersion {
    /// Only patch bumps are automated; major/minor bumps are edited into the
    /// project file by hand before a release.
    pub fn next_patch(&self) -> Result<Self, ReleaseError> {
        let patch = self.patch.checked_add(1).ok_or_else(|| {
            ReleaseError::config_format(
                "MARKETING_VERSION",
                format!("patch component overflows: {:?}", self.text),
            )
        })?;
        let line = self.text.rsplit_once('.').map_or("", |(line, _)| line);
        Ok(Self {
            patch,
            text: format!("{line}.{patch}"),
            ..*self
        })
    }

    pub fn tag(&self) -> String {
        format!("v{self}")
    }
}

impl FromStr for MarketingVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = |reason: &str| {
            ReleaseError::config_format("MARKETING_VERSION", format!("{reason}: {s:?}"))
        };

        let parts: Vec<&str> = text.split('.').collect();
        let &[major, minor, patch] = parts.as_slice() else {
            return Err(invalid("expected major.minor.patch"));
        };
        let component = |part: &str| {
            parse_digits(part).ok_or_else(|| invalid("version components must be numeric"))
        };

        Ok(Self {
            major: component(major)?,
            minor: component(minor)?,
            patch: component(patch)?,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for MarketingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&MarketingVersion> for semver::Version {
    fn from(version: &MarketingVersion) -> Self {
        semver::Version::new(version.major, version.minor, version.patch)
    }
}

/// Internal build counter, `CFBundleVersion`. Displays as written in the
/// project file; computed numbers have no leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildNumber {
    value: u64,
    text: String,
}

impl BuildNumber {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn next(&self) -> Result<Self, ReleaseError> {
        let value = self.value.checked_add(1).ok_or_else(|| {
            ReleaseError::config_format(
                "CURRENT_PROJECT_VERSION",
                format!("build number overflows: {:?}", self.text),
            )
        })?;
        Ok(Self::from(value))
    }
}

impl From<u64> for BuildNumber {
    fn from(value: u64) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }
}

impl FromStr for BuildNumber {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let value = parse_digits(text).ok_or_else(|| {
            ReleaseError::config_format(
                "CURRENT_PROJECT_VERSION",
                format!("build number must be a non-negative integer: {s:?}"),
            )
        })?;
        Ok(Self {
            value,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
