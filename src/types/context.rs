use {
    super::{
        notes::ReleaseNotes,
        version::{BuildNumber, MarketingVersion},
    },
    crate::error::ReleaseError,
    std::fmt,
};

/// Everything a run knows about the release it is producing.
///
/// Built once the versions are read and computed, then passed by reference
/// to every later stage. Notes are attached by value with [`with_notes`].
///
/// [`with_notes`]: ReleaseContext::with_notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    pub app_name: String,
    pub current_version: MarketingVersion,
    pub current_build: BuildNumber,
    pub new_version: MarketingVersion,
    pub new_build: BuildNumber,
    pub notes: ReleaseNotes,
}

impl ReleaseContext {
    /// Fails when the patch or build counter cannot be incremented.
    pub fn new(
        app_name: impl Into<String>,
        current_version: MarketingVersion,
        current_build: BuildNumber,
    ) -> Result<Self, ReleaseError> {
        Ok(Self {
            app_name: app_name.into(),
            new_version: current_version.next_patch()?,
            new_build: current_build.next()?,
            current_version,
            current_build,
            notes: ReleaseNotes::default(),
        })
    }

    pub fn with_notes(self, notes: ReleaseNotes) -> Self {
        Self { notes, ..self }
    }

    pub fn artifact_name(&self) -> String {
        format!("{}-{}.dmg", self.app_name, self.new_version)
    }

    pub fn tag(&self) -> String {
        self.new_version.tag()
    }

    pub fn commit_message(&self) -> String {
        commit_message(&self.new_version)
    }
}

/// Subject used for the version bump commit. Notes collection filters on it.
pub fn commit_message(version: &MarketingVersion) -> String {
    format!("Update version to {version} for release")
}

impl fmt::Display for ReleaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "   Current version: {} (build {})",
            self.current_version, self.current_build
        )?;
        writeln!(
            f,
            "   New version:     {} (build {})",
            self.new_version, self.new_build
        )?;
        writeln!(f, "   Disk image:      {}", self.artifact_name())?;
        if self.notes.is_empty() {
            write!(f, "   Release notes:   (none)")
        } else {
            writeln!(f, "   Release notes:")?;
            write!(f, "{}", indent(&self.notes.to_plain()))
        }
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("     {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
