//! Disk image packaging of the built `.app` bundle.

use {
    crate::{
        config::ReleaseConfig,
        error::ReleaseError,
        types::ReleaseContext,
        utils::{
            fs::{contains_component, copy_dir, find_dirs_by_name, modified, remove_dir_if_exists},
            CommandRunner, Invocation,
        },
    },
    anyhow::{Context, Result},
    log::{debug, info, warn},
    std::{
        cmp::Reverse,
        fs,
        path::{Path, PathBuf},
    },
};

/// Scratch directory, relative to the project root. `create-dmg` images the
/// whole directory, so it must hold nothing but the bundle.
pub const STAGING_DIR: &str = "dmg-staging";

/// 0: built for the release configuration, 1: some other products
/// directory, 2: anything else (intermediates, archives).
fn rank(path: &Path, configuration: &str) -> u8 {
    if contains_component(path, configuration) {
        0
    } else if contains_component(path, "Products") {
        1
    } else {
        2
    }
}

/// Best candidate by rank, newest first within a rank.
pub fn select_bundle(candidates: Vec<PathBuf>, configuration: &str) -> Option<PathBuf> {
    candidates
        .into_iter()
        .min_by_key(|path| (rank(path, configuration), Reverse(modified(path))))
}

pub fn locate_bundle(config: &ReleaseConfig) -> Result<PathBuf> {
    let bundle_name = config.bundle_name();
    let candidates = find_dirs_by_name(&config.derived_data, &bundle_name)?;
    debug!("found {} candidate(s) for {bundle_name}", candidates.len());

    let bundle = select_bundle(candidates, &config.configuration).ok_or_else(|| {
        ReleaseError::MissingArtifact {
            what: "built application bundle",
            path: config.derived_data.join("**").join(&bundle_name),
        }
    })?;
    info!("using {}", bundle.display());
    Ok(bundle)
}

pub fn dmg_invocation(config: &ReleaseConfig, ctx: &ReleaseContext) -> Invocation {
    let layout = &config.dmg;
    let bundle_name = config.bundle_name();
    let pair = |values: [u32; 2]| [values[0].to_string(), values[1].to_string()];

    Invocation::new("create-dmg")
        .args(["--volname".to_string(), config.volume_name()])
        .arg("--window-pos")
        .args(pair(layout.window_pos))
        .arg("--window-size")
        .args(pair(layout.window_size))
        .args(["--icon-size".to_string(), layout.icon_size.to_string()])
        .args(["--icon", bundle_name.as_str()])
        .args(pair(layout.icon_pos))
        .args(["--hide-extension", bundle_name.as_str()])
        .arg("--app-drop-link")
        .args(pair(layout.app_drop_link))
        .arg(ctx.artifact_name())
        .arg(STAGING_DIR)
}

/// Copies the bundle into a fresh staging directory and images it. The
/// staging directory is removed on every exit path.
pub fn package(
    runner: &mut dyn CommandRunner,
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
) -> Result<PathBuf> {
    let bundle = locate_bundle(config)?;
    let artifact = config.root.join(ctx.artifact_name());
    let staging = config.root.join(STAGING_DIR);

    remove_dir_if_exists(&staging)?;
    fs::create_dir_all(&staging).context(format!("failed to create {}", staging.display()))?;
    let _cleanup = scopeguard::guard(staging.clone(), |dir| {
        debug!("removing {}", dir.display());
        if let Err(err) = fs::remove_dir_all(&dir) {
            warn!("failed to remove {}: {err}", dir.display());
        }
    });

    copy_dir(&bundle, &staging.join(config.bundle_name()))?;

    if artifact.exists() {
        info!("removing previous {}", artifact.display());
        fs::remove_file(&artifact).context(format!("failed to remove {}", artifact.display()))?;
    }

    runner.run_checked(&dmg_invocation(config, ctx))?;

    if !artifact.is_file() {
        return Err(ReleaseError::MissingArtifact {
            what: "disk image",
            path: artifact,
        }
        .into());
    }
    info!("created {}", artifact.display());
    Ok(artifact)
}
