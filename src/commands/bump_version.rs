use {
    crate::{
        config::ReleaseConfig,
        error::ReleaseError,
        stages::{patch, version},
        types::ReleaseContext,
        utils::Prompter,
    },
    anyhow::{Context, Result},
    log::info,
};

/// Bumps the patch version and build number in the project files without
/// building or publishing.
pub fn run(config: &ReleaseConfig, prompter: &mut dyn Prompter) -> Result<ReleaseContext> {
    let ctx = version::load(config).context("failed to determine versions")?;

    prompter.show(&format!(
        "\n{} {} (build {}) -> {} (build {})\n",
        config.app_name, ctx.current_version, ctx.current_build, ctx.new_version, ctx.new_build
    ))?;
    if !prompter.confirm("Update version files?")? {
        return Err(ReleaseError::UserCancelled.into());
    }

    patch::apply_version_bump(config, &ctx).context("failed to update version files")?;
    info!("bumped {} to {} ({})", config.app_name, ctx.new_version, ctx.new_build);
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::utils::{AutoApprove, TerminalPrompter},
        pretty_assertions::assert_eq,
        std::{fs, io::Cursor},
    };

    fn setup() -> (tempfile::TempDir, ReleaseConfig) {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = ReleaseConfig::for_app(temp_dir.path(), "MacSSH", "Solvetronix/MacSSH");
        config.info_plist = None;
        fs::create_dir_all(temp_dir.path().join("MacSSH.xcodeproj")).unwrap();
        fs::write(
            config.path(&config.project_file),
            "MARKETING_VERSION = 3.2.9;\nCURRENT_PROJECT_VERSION = 41;\n",
        )
        .unwrap();
        (temp_dir, config)
    }

    #[test]
    fn test_bump_version() {
        let (_temp_dir, config) = setup();
        let ctx = run(&config, &mut AutoApprove).unwrap();
        assert_eq!(ctx.new_version.to_string(), "3.2.10");
        assert_eq!(
            fs::read_to_string(config.path(&config.project_file)).unwrap(),
            "MARKETING_VERSION = 3.2.10;\nCURRENT_PROJECT_VERSION = 42;\n"
        );
    }

    #[test]
    fn test_declined() {
        let (_temp_dir, config) = setup();
        let mut prompter = TerminalPrompter::new(Cursor::new(b"n\n".to_vec()), vec![]);
        let err = run(&config, &mut prompter).unwrap_err();
        assert!(ReleaseError::is_cancelled(&err));
        assert_eq!(
            String::from_utf8(prompter.into_output()).unwrap(),
            "\nMacSSH 3.2.9 (build 41) -> 3.2.10 (build 42)\n\nUpdate version files? (y/N): "
        );
        assert_eq!(
            fs::read_to_string(config.path(&config.project_file)).unwrap(),
            "MARKETING_VERSION = 3.2.9;\nCURRENT_PROJECT_VERSION = 41;\n"
        );
    }
}
