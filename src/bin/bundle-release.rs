use {
    anyhow::Result,
    bundle_release::{
        config::{ReleaseConfig, DEFAULT_CONFIG_FILE},
        utils::{interrupt, AutoApprove, Prompter, SystemRunner, TerminalPrompter},
        ReleaseError,
    },
    clap::{Args, Parser, Subcommand},
    log::{error, info},
    std::path::PathBuf,
};

const REQUIREMENTS: &str = "\
Runs from the project root and reads its settings from release.toml.

Without a subcommand the full release runs:
  1. bump MARKETING_VERSION / CURRENT_PROJECT_VERSION (project file, Info.plist)
  2. build the Release configuration
  3. package the .app into <app>-<version>.dmg
  4. regenerate the update feed
  5. commit, push, create release v<version> and upload the disk image

Requirements:
  - Xcode command line tools (xcodebuild)
  - create-dmg (brew install create-dmg)
  - GitHub CLI (gh), authenticated
  - git";

#[derive(Parser)]
#[command(
    name = "bundle-release",
    about = "Release automation for macOS application bundles",
    version,
    after_help = REQUIREMENTS
)]
struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Bump, build, package and publish a release (default)")]
    Release,
    #[command(about = "Only bump the version in the project files")]
    BumpVersion,
    #[command(about = "Preview the release notes of the next release")]
    Notes,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer yes to every confirmation and never wait for input
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Release settings [default: ./release.toml]
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = interrupt::install().and_then(|()| try_main(cli)) {
        let err = interrupt::as_cancellation(err, interrupt::interrupted());
        if ReleaseError::is_cancelled(&err) {
            interrupt::warn_cancelled();
            return;
        }
        error!("Error: {err}");
        for (i, cause) in err.chain().skip(1).enumerate() {
            error!("  {}: {}", i.saturating_add(1), cause);
        }
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> Result<()> {
    let root = std::env::current_dir()?;
    let config_path = cli
        .global
        .config
        .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));
    let config = ReleaseConfig::load(&config_path, &root)?;

    let mut runner = SystemRunner::new(&root);
    let mut prompter: Box<dyn Prompter> = if cli.global.yes {
        Box::new(AutoApprove)
    } else {
        Box::new(TerminalPrompter::stdio())
    };

    match cli.command.unwrap_or(Commands::Release) {
        Commands::Release => {
            let ctx = bundle_release::release::run(
                &config,
                &mut runner,
                prompter.as_mut(),
                &chrono::Utc::now,
            )?;
            info!(
                "{} {} is available at {}/releases/tag/{}",
                config.app_name,
                ctx.new_version,
                config.hosting_base,
                ctx.tag()
            );
        }
        Commands::BumpVersion => {
            bundle_release::bump_version::run(&config, prompter.as_mut())?;
        }
        Commands::Notes => {
            bundle_release::commands::notes::run(&config, &mut runner)?;
        }
    }

    Ok(())
}
