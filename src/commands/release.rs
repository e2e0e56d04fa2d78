use {
    crate::{
        config::ReleaseConfig,
        error::ReleaseError,
        stages::{build, feed, notes, package, patch, publish, version},
        types::ReleaseContext,
        utils::{CommandRunner, Prompter},
    },
    anyhow::{Context, Result},
    chrono::{DateTime, Utc},
    log::info,
};

/// Runs every stage in order. The only gate is the confirmation after the
/// plan is shown; declining ends the run with [`ReleaseError::UserCancelled`]
/// before any file is touched.
pub fn run(
    config: &ReleaseConfig,
    runner: &mut dyn CommandRunner,
    prompter: &mut dyn Prompter,
    clock: &dyn Fn() -> DateTime<Utc>,
) -> Result<ReleaseContext> {
    info!("starting release of {}", config.app_name);

    let ctx = version::load(config).context("failed to determine versions")?;

    let release_notes =
        notes::compose(runner, prompter, config, &ctx).context("failed to compose release notes")?;
    let ctx = ctx.with_notes(release_notes);

    prompter.show(&format!("\nRelease plan:\n{ctx}\n"))?;
    if !prompter.confirm("Continue?")? {
        return Err(ReleaseError::UserCancelled.into());
    }

    info!("step 1/5: updating versions");
    patch::apply_version_bump(config, &ctx).context("failed to update version files")?;

    info!("step 2/5: building");
    build::build(runner, config)?;

    info!("step 3/5: packaging");
    package::package(runner, config, &ctx).context("failed to create disk image")?;

    info!("step 4/5: updating feed");
    feed::update_feed(config, &ctx, clock()).context("failed to update feed")?;

    info!("step 5/5: publishing");
    publish::publish(runner, prompter, config, &ctx)?;

    info!("released {} {}", config.app_name, ctx.new_version);
    Ok(ctx)
}
