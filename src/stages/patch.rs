//! In-place version rewrites of the project file and Info.plist.
//!
//! Every substitution is literal: the old value is regex-escaped and must be
//! found, and after rewriting the new value must be present and the old one
//! gone. Nothing is written until every file has passed those checks.

use {
    crate::{
        config::ReleaseConfig,
        error::ReleaseError,
        stages::version::{CURRENT_PROJECT_VERSION, MARKETING_VERSION},
        types::ReleaseContext,
    },
    anyhow::{Context, Result},
    log::{debug, info},
    regex::{Captures, Regex},
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

pub const SHORT_VERSION_KEY: &str = "CFBundleShortVersionString";
pub const BUNDLE_VERSION_KEY: &str = "CFBundleVersion";

/// Replace `old` with `new` wherever it sits between `prefix` and `suffix`
/// (both regex fragments).
#[derive(Debug, Clone)]
pub struct Substitution {
    pub label: String,
    prefix: String,
    suffix: String,
    pub old: String,
    pub new: String,
}

impl Substitution {
    /// `KEY = value;` in a project file.
    pub fn build_setting(key: &str, old: impl ToString, new: impl ToString) -> Self {
        Self {
            label: key.to_string(),
            prefix: format!(r"\b{}\s*=\s*", regex::escape(key)),
            suffix: ";".to_string(),
            old: old.to_string(),
            new: new.to_string(),
        }
    }

    /// `<key>KEY</key><string>value</string>` in a property list, any
    /// whitespace between the two elements.
    pub fn plist_string(key: &str, old: impl ToString, new: impl ToString) -> Self {
        Self {
            label: key.to_string(),
            prefix: plist_prefix(key),
            suffix: "</string>".to_string(),
            old: old.to_string(),
            new: new.to_string(),
        }
    }

    fn pattern(&self, value: &str) -> Result<Regex> {
        Ok(Regex::new(&format!(
            "({}){}({})",
            self.prefix,
            regex::escape(value),
            self.suffix
        ))?)
    }

    fn apply(&self, content: &str, file: &Path) -> Result<String> {
        let old = self.pattern(&self.old)?;
        if !old.is_match(content) {
            return Err(ReleaseError::config_format(
                file,
                format!("{} {:?} not found", self.label, self.old),
            )
            .into());
        }
        let patched = old
            .replace_all(content, |captures: &Captures| {
                format!("{}{}{}", &captures[1], self.new, &captures[2])
            })
            .into_owned();

        if !self.pattern(&self.new)?.is_match(&patched) {
            return Err(ReleaseError::config_format(
                file,
                format!("{} was not updated to {:?}", self.label, self.new),
            )
            .into());
        }
        if self.old != self.new && old.is_match(&patched) {
            return Err(ReleaseError::config_format(
                file,
                format!("{} still contains {:?}", self.label, self.old),
            )
            .into());
        }
        Ok(patched)
    }
}

fn plist_prefix(key: &str) -> String {
    format!(r"<key>{}</key>\s*<string>", regex::escape(key))
}

/// Current `<string>` value stored under `key`, if the key exists.
pub fn plist_value(content: &str, key: &str) -> Result<Option<String>> {
    let pattern = Regex::new(&format!("{}([^<]*)</string>", plist_prefix(key)))?;
    Ok(pattern
        .captures(content)
        .map(|captures| captures[1].trim().to_string()))
}

/// A verified rewrite that has not been written yet.
#[derive(Debug)]
pub struct PatchedFile {
    pub path: PathBuf,
    pub original: String,
    pub content: String,
}

impl PatchedFile {
    pub fn plan(path: &Path, display: &Path, substitutions: &[Substitution]) -> Result<Self> {
        let original =
            fs::read_to_string(path).context(format!("failed to read {}", path.display()))?;
        let mut content = original.clone();
        for substitution in substitutions {
            content = substitution.apply(&content, display)?;
            info!(
                "  {}: {} -> {}",
                substitution.label, substitution.old, substitution.new
            );
        }
        Ok(Self {
            path: path.to_path_buf(),
            original,
            content,
        })
    }

    pub fn write(&self) -> Result<()> {
        if self.content == self.original {
            debug!("{} unchanged", self.path.display());
            return Ok(());
        }
        fs::write(&self.path, &self.content)
            .context(format!("failed to write {}", self.path.display()))
    }
}

pub fn plan_project_file(config: &ReleaseConfig, ctx: &ReleaseContext) -> Result<PatchedFile> {
    info!("updating {}", config.project_file.display());
    PatchedFile::plan(
        &config.path(&config.project_file),
        &config.project_file,
        &[
            Substitution::build_setting(MARKETING_VERSION, &ctx.current_version, &ctx.new_version),
            Substitution::build_setting(
                CURRENT_PROJECT_VERSION,
                &ctx.current_build,
                &ctx.new_build,
            ),
        ],
    )
}

/// Plist fields holding a build-setting reference such as
/// `$(MARKETING_VERSION)` are left alone.
pub fn plan_info_plist(
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
    info_plist: &Path,
) -> Result<PatchedFile> {
    info!("updating {}", info_plist.display());
    let path = config.path(info_plist);
    let content =
        fs::read_to_string(&path).context(format!("failed to read {}", path.display()))?;

    let mut substitutions = vec![];
    for (key, old, new) in [
        (
            SHORT_VERSION_KEY,
            ctx.current_version.to_string(),
            ctx.new_version.to_string(),
        ),
        (
            BUNDLE_VERSION_KEY,
            ctx.current_build.to_string(),
            ctx.new_build.to_string(),
        ),
    ] {
        match plist_value(&content, key)? {
            Some(value) if value.starts_with("$(") => {
                info!("  {key}: {value} (resolved at build time)");
            }
            Some(_) => substitutions.push(Substitution::plist_string(key, old, new)),
            None => {
                return Err(
                    ReleaseError::config_format(info_plist, format!("{key} not found")).into(),
                )
            }
        }
    }

    PatchedFile::plan(&path, info_plist, &substitutions)
}

/// Rewrites the version in every configured file, or in none of them.
pub fn apply_version_bump(config: &ReleaseConfig, ctx: &ReleaseContext) -> Result<()> {
    let mut files = vec![plan_project_file(config, ctx)?];
    if let Some(info_plist) = &config.info_plist {
        files.push(plan_info_plist(config, ctx, info_plist)?);
    }
    for file in &files {
        file.write()?;
    }
    info!("version files updated to {} ({})", ctx.new_version, ctx.new_build);
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    const PBXPROJ: &str = "\
\t\t\t\tCURRENT_PROJECT_VERSION = 10;
\t\t\t\tMARKETING_VERSION = 1.0.0;
\t\t\t\tname = Debug;
\t\t\t\tCURRENT_PROJECT_VERSION = 10;
\t\t\t\tMARKETING_VERSION = 1.0.0;
\t\t\t\tname = Release;
";

    const PLIST: &str = "\
<dict>
\t<key>CFBundleShortVersionString</key>
\t<string>1.0.0</string>
\t<key>CFBundleVersion</key>
\t<string>10</string>
\t<key>LSMinimumSystemVersion</key>
\t<string>1.0.0</string>
</dict>
";

    fn setup(pbxproj: &str, plist: &str) -> (tempfile::TempDir, ReleaseConfig, ReleaseContext) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ReleaseConfig::for_app(temp_dir.path(), "MacSSH", "Solvetronix/MacSSH");
        fs::create_dir_all(temp_dir.path().join("MacSSH.xcodeproj")).unwrap();
        fs::create_dir_all(temp_dir.path().join("MacSSH")).unwrap();
        fs::write(config.path(&config.project_file), pbxproj).unwrap();
        fs::write(temp_dir.path().join("MacSSH/Info.plist"), plist).unwrap();
        let ctx = ReleaseContext::new("MacSSH", "1.0.0".parse().unwrap(), "10".parse().unwrap())
            .unwrap();
        (temp_dir, config, ctx)
    }

    #[test]
    fn test_apply_version_bump() {
        let (temp_dir, config, ctx) = setup(PBXPROJ, PLIST);
        apply_version_bump(&config, &ctx).unwrap();

        let pbxproj = fs::read_to_string(config.path(&config.project_file)).unwrap();
        assert_eq!(pbxproj, PBXPROJ.replace("1.0.0", "1.0.1").replace("10;", "11;"));

        let plist = fs::read_to_string(temp_dir.path().join("MacSSH/Info.plist")).unwrap();
        assert_eq!(plist_value(&plist, SHORT_VERSION_KEY).unwrap().unwrap(), "1.0.1");
        assert_eq!(plist_value(&plist, BUNDLE_VERSION_KEY).unwrap().unwrap(), "11");
        // unrelated keys with the same value are untouched
        assert_eq!(
            plist_value(&plist, "LSMinimumSystemVersion").unwrap().unwrap(),
            "1.0.0"
        );
    }

    #[test]
    fn test_missing_old_value_leaves_files_untouched() {
        let plist = PLIST.replace("<string>10</string>", "<string>9</string>");
        let (temp_dir, config, ctx) = setup(PBXPROJ, &plist);

        let err = apply_version_bump(&config, &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "MacSSH/Info.plist: CFBundleVersion \"10\" not found"
        );

        assert_eq!(
            fs::read_to_string(config.path(&config.project_file)).unwrap(),
            PBXPROJ
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("MacSSH/Info.plist")).unwrap(),
            plist
        );
    }

    #[test]
    fn test_build_setting_references_are_skipped() {
        let plist = PLIST
            .replacen("<string>1.0.0</string>", "<string>$(MARKETING_VERSION)</string>", 1)
            .replace("<string>10</string>", "<string>$(CURRENT_PROJECT_VERSION)</string>");
        let (temp_dir, config, ctx) = setup(PBXPROJ, &plist);

        apply_version_bump(&config, &ctx).unwrap();
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("MacSSH/Info.plist")).unwrap(),
            plist
        );
    }

    #[test]
    fn test_whitespace_between_key_and_string() {
        let substitution = Substitution::plist_string(BUNDLE_VERSION_KEY, "10", "11");
        let patched = substitution
            .apply(
                "<key>CFBundleVersion</key>\n\n    <string>10</string>",
                Path::new("Info.plist"),
            )
            .unwrap();
        assert_eq!(patched, "<key>CFBundleVersion</key>\n\n    <string>11</string>");
    }

    #[test]
    fn test_values_are_literal() {
        // "1.0.0" must not match "1x0x0"
        let substitution = Substitution::build_setting(MARKETING_VERSION, "1.0.0", "1.0.1");
        assert!(substitution
            .apply("MARKETING_VERSION = 1x0x0;", Path::new("project.pbxproj"))
            .is_err());
        // nor a longer version sharing the prefix
        assert!(substitution
            .apply("MARKETING_VERSION = 1.0.00;", Path::new("project.pbxproj"))
            .is_err());
    }

    #[test]
    fn test_same_value_is_noop() {
        let substitution = Substitution::build_setting(CURRENT_PROJECT_VERSION, "7", "7");
        let content = "CURRENT_PROJECT_VERSION = 7;";
        assert_eq!(
            substitution.apply(content, Path::new("project.pbxproj")).unwrap(),
            content
        );
    }

    #[test]
    fn test_values_are_patched_as_written() {
        let pbxproj = PBXPROJ.replace("1.0.0", "1.02.0").replace("= 10;", "= 007;");
        let plist = PLIST
            .replacen("<string>1.0.0</string>", "<string>1.02.0</string>", 1)
            .replace("<string>10</string>", "<string>007</string>");
        let (temp_dir, config, _) = setup(&pbxproj, &plist);

        let ctx = crate::stages::version::load(&config).unwrap();
        assert_eq!(ctx.new_version.to_string(), "1.02.1");
        assert_eq!(ctx.new_build.to_string(), "8");
        apply_version_bump(&config, &ctx).unwrap();

        assert_eq!(
            fs::read_to_string(config.path(&config.project_file)).unwrap(),
            PBXPROJ.replace("1.0.0", "1.02.1").replace("= 10;", "= 8;")
        );
        let plist = fs::read_to_string(temp_dir.path().join("MacSSH/Info.plist")).unwrap();
        assert_eq!(plist_value(&plist, SHORT_VERSION_KEY).unwrap().unwrap(), "1.02.1");
        assert_eq!(plist_value(&plist, BUNDLE_VERSION_KEY).unwrap().unwrap(), "8");
    }

    #[test]
    fn test_round_trip_through_reader() {
        let (_temp_dir, config, ctx) = setup(PBXPROJ, PLIST);
        apply_version_bump(&config, &ctx).unwrap();
        let reread = crate::stages::version::load(&config).unwrap();
        assert_eq!(reread.current_version, ctx.new_version);
        assert_eq!(reread.current_build, ctx.new_build);
    }
}
