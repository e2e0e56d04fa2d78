use {
    crate::{
        config::{PublishMode, ReleaseConfig},
        types::ReleaseContext,
        utils::{git, CommandRunner, Invocation, Prompter},
    },
    anyhow::{Context, Result},
    log::{info, warn},
};

/// Symbolic release name the hosting CLI resolves to the newest release.
pub const LATEST_RELEASE: &str = "latest";

/// Stages the version files and the feed, commits and pushes.
pub fn commit_and_push(
    runner: &mut dyn CommandRunner,
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
) -> Result<()> {
    git::add(runner, &config.tracked_files())?;
    git::commit(runner, &ctx.commit_message())?;
    git::push(runner, &config.remote, &config.branch)
        .context(format!("failed to push to {}/{}", config.remote, config.branch))?;
    info!("pushed {} to {}/{}", ctx.new_version, config.remote, config.branch);
    Ok(())
}

pub fn release_body(ctx: &ReleaseContext) -> String {
    let mut body = format!("Version {} (build {})", ctx.new_version, ctx.new_build);
    if !ctx.notes.is_empty() {
        body.push_str("\n\n");
        body.push_str(&ctx.notes.to_plain());
    }
    body
}

pub fn create_release(
    runner: &mut dyn CommandRunner,
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
) -> Result<()> {
    let title = format!("{} {}", config.app_name, ctx.new_version);
    let create = Invocation::new("gh")
        .args(["release", "create"])
        .arg(ctx.tag())
        .args(["--title".to_string(), title])
        .args(["--notes".to_string(), release_body(ctx)]);
    runner.run_checked(&create)?;
    info!("created release {}", ctx.tag());
    Ok(())
}

/// Attaches the disk image to `target`. A missing image is reported and
/// skipped, the release itself is already public at this point.
pub fn upload_artifact(
    runner: &mut dyn CommandRunner,
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
    target: &str,
) -> Result<bool> {
    let artifact_name = ctx.artifact_name();
    if !config.root.join(&artifact_name).is_file() {
        warn!("disk image not found, skipping upload: {artifact_name}");
        return Ok(false);
    }

    let upload = Invocation::new("gh")
        .args(["release", "upload", target])
        .arg(artifact_name.as_str())
        .arg("--clobber");
    runner.run_checked(&upload)?;
    info!("uploaded {artifact_name} to release {target}");
    Ok(true)
}

pub fn publish(
    runner: &mut dyn CommandRunner,
    prompter: &mut dyn Prompter,
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
) -> Result<()> {
    commit_and_push(runner, config, ctx)?;

    let target = match config.publish_mode {
        PublishMode::Direct => {
            create_release(runner, config, ctx)?;
            ctx.tag()
        }
        PublishMode::CiAssisted => {
            prompter.wait(&format!(
                "Waiting for the release pipeline: {}\nContinue once it has published {}.",
                config.actions_url(),
                ctx.tag()
            ))?;
            LATEST_RELEASE.to_string()
        }
    };

    upload_artifact(runner, config, ctx, &target)?;
    Ok(())
}
