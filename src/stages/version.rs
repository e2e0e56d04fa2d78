use {
    crate::{
        config::ReleaseConfig,
        error::ReleaseError,
        types::{BuildNumber, MarketingVersion, ReleaseContext},
    },
    anyhow::{Context, Result},
    log::info,
    regex::Regex,
    std::{fs, path::Path},
};

pub const MARKETING_VERSION: &str = "MARKETING_VERSION";
pub const CURRENT_PROJECT_VERSION: &str = "CURRENT_PROJECT_VERSION";

/// Raw right-hand sides of the two version settings, unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVersions {
    pub version: String,
    pub build: String,
}

fn setting_value(content: &str, key: &str) -> Result<Option<String>> {
    let pattern = Regex::new(&format!(r"\b{}\s*=\s*([^;\n]+);", regex::escape(key)))?;
    Ok(pattern
        .captures(content)
        .map(|captures| captures[1].trim().to_string()))
}

/// Extracts `MARKETING_VERSION` and `CURRENT_PROJECT_VERSION` from a project
/// file. The first assignment of each wins.
pub fn read_versions(content: &str, file: &Path) -> Result<RawVersions> {
    let missing = |key: &str| ReleaseError::config_format(file, format!("{key} not found"));

    let version = setting_value(content, MARKETING_VERSION)?
        .ok_or_else(|| missing(MARKETING_VERSION))?;
    let build = setting_value(content, CURRENT_PROJECT_VERSION)?
        .ok_or_else(|| missing(CURRENT_PROJECT_VERSION))?;

    Ok(RawVersions { version, build })
}

/// Validates the raw values and computes the next patch version and build.
pub fn calculate(app_name: &str, raw: &RawVersions, file: &Path) -> Result<ReleaseContext> {
    let relabel = |err: ReleaseError| match err {
        ReleaseError::ConfigFormat { message, .. } => ReleaseError::config_format(file, message),
        other => other,
    };
    let current_version: MarketingVersion = raw.version.parse().map_err(relabel)?;
    let current_build: BuildNumber = raw.build.parse().map_err(relabel)?;

    Ok(ReleaseContext::new(app_name, current_version, current_build).map_err(relabel)?)
}

/// Reads the project file and returns the context for the next release.
pub fn load(config: &ReleaseConfig) -> Result<ReleaseContext> {
    let project_file = config.path(&config.project_file);
    let content = fs::read_to_string(&project_file)
        .context(format!("failed to read {}", project_file.display()))?;

    let raw = read_versions(&content, &config.project_file)?;
    info!("current version: {} (build {})", raw.version, raw.build);

    let ctx = calculate(&config.app_name, &raw, &config.project_file)?;
    info!("new version: {} (build {})", ctx.new_version, ctx.new_build);
    Ok(ctx)
}
