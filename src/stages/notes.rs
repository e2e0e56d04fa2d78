//! Release notes from commit history, reviewed by the operator.

use {
    crate::{
        config::ReleaseConfig,
        types::{context::commit_message, ReleaseContext, ReleaseNotes},
        utils::{git, CommandRunner, Prompter},
    },
    anyhow::Result,
    log::{debug, info},
    semver::Version,
};

/// The most recent release tag: `git describe`, else the highest
/// version-like tag, else the first tag git lists.
pub fn last_release_tag(runner: &mut dyn CommandRunner) -> Result<Option<String>> {
    if let Some(tag) = git::describe_latest_tag(runner)? {
        return Ok(Some(tag));
    }

    let tags = git::list_tags(runner)?;
    let highest = tags
        .iter()
        .filter_map(|tag| {
            let version = tag.strip_prefix('v').unwrap_or(tag);
            Version::parse(version).ok().map(|version| (version, tag))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, tag)| tag.clone());

    Ok(highest.or_else(|| tags.into_iter().next()))
}

/// Commit subjects since the last release, minus our own version bump commits.
pub fn collect(
    runner: &mut dyn CommandRunner,
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
) -> Result<Vec<String>> {
    let since = last_release_tag(runner)?;
    match &since {
        Some(tag) => info!("collecting changes since {tag}"),
        None => info!(
            "no release tag found, using the last {} commits",
            config.notes_commit_limit
        ),
    }

    let bump = commit_message(&ctx.new_version);
    let subjects = git::commit_subjects(runner, since.as_deref(), config.notes_commit_limit)?;
    Ok(subjects
        .into_iter()
        .map(|subject| subject.trim().to_string())
        .filter(|subject| !subject.is_empty())
        .filter(|subject| {
            let ours = subject.contains(&bump);
            if ours {
                debug!("skipping {subject:?}");
            }
            !ours
        })
        .collect())
}

/// Lets the operator accept the collected lines or type replacements.
/// Empty manual input keeps the collected lines.
pub fn review(prompter: &mut dyn Prompter, collected: Vec<String>) -> Result<ReleaseNotes> {
    let proposed = ReleaseNotes::new(collected);
    if proposed.is_empty() {
        prompter.show("\nNo changes found since the last release.")?;
    } else {
        prompter.show(&format!("\nRelease notes:\n{}", proposed.to_plain()))?;
    }

    if prompter.confirm("Use these release notes?")? {
        return Ok(proposed);
    }

    let manual = ReleaseNotes::new(prompter.read_lines("Enter release notes, one per line:")?);
    if manual.is_empty() {
        info!("no notes entered, keeping the collected ones");
        return Ok(proposed);
    }
    Ok(manual)
}

pub fn compose(
    runner: &mut dyn CommandRunner,
    prompter: &mut dyn Prompter,
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
) -> Result<ReleaseNotes> {
    let collected = collect(runner, config, ctx)?;
    info!("collected {} change(s)", collected.len());
    review(prompter, collected)
}
