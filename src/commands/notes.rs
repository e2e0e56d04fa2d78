use {
    crate::{
        config::ReleaseConfig,
        stages::{notes, version},
        types::ReleaseNotes,
        utils::CommandRunner,
    },
    anyhow::{Context, Result},
};

/// Collects the notes the next release would get, without asking anything.
pub fn run(config: &ReleaseConfig, runner: &mut dyn CommandRunner) -> Result<ReleaseNotes> {
    let ctx = version::load(config).context("failed to determine versions")?;
    let release_notes = ReleaseNotes::new(notes::collect(runner, config, &ctx)?);

    println!("Release notes for {} {}:\n", config.app_name, ctx.new_version);
    if release_notes.is_empty() {
        println!("(no changes)");
    } else {
        println!("{}", release_notes.to_plain());
    }
    println!("\nFeed markup:\n{}", release_notes.to_markup());
    Ok(release_notes)
}
