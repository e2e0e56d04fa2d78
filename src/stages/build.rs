use {
    crate::{
        config::ReleaseConfig,
        error::ReleaseError,
        utils::{CommandRunner, Invocation},
    },
    anyhow::Result,
    log::info,
};

/// Lines of build output kept in the error when `xcodebuild` fails.
const ERROR_LINES: usize = 20;

pub fn build_invocation(config: &ReleaseConfig) -> Result<Invocation> {
    Ok(Invocation::new("xcodebuild")
        .arg("-project")
        .arg(config.xcode_project()?.display().to_string())
        .args(["-scheme", config.scheme.as_str()])
        .args(["-configuration", config.configuration.as_str()])
        .args(["clean", "build"]))
}

/// `xcodebuild` reports compile errors on stdout, so both streams are
/// searched for `error:` lines; without any, the tail of stderr is used.
fn failure_summary(stdout: &str, stderr: &str) -> String {
    let errors: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .filter(|line| line.contains("error:"))
        .collect();
    let lines: Vec<&str> = if errors.is_empty() {
        stderr.lines().collect()
    } else {
        errors
    };
    let start = lines.len().saturating_sub(ERROR_LINES);
    lines[start..].join("\n")
}

/// Clean release build. Any failure ends the run.
pub fn build(runner: &mut dyn CommandRunner, config: &ReleaseConfig) -> Result<()> {
    let invocation = build_invocation(config)?;
    info!("building {} ({})", config.scheme, config.configuration);

    let output = runner.run(&invocation)?;
    if !output.success {
        return Err(ReleaseError::ExternalCommand {
            command: invocation.to_string(),
            status: output.status,
            stderr: failure_summary(&output.stdout, &output.stderr),
        }
        .into());
    }

    info!("build succeeded");
    Ok(())
}
