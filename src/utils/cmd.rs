use {
    crate::{error::ReleaseError, utils::interrupt},
    anyhow::{anyhow, Result},
    log::{debug, info},
    std::{fmt, path::PathBuf, process::Command},
};

/// An external program and its argument vector. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            status: "exit status: 1".to_string(),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs external tools from the project root. Implementations block until
/// the process exits.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Runs `invocation` and turns a nonzero exit into
    /// [`ReleaseError::ExternalCommand`].
    fn run_checked(&mut self, invocation: &Invocation) -> Result<CommandOutput> {
        let output = self.run(invocation)?;
        if !output.success {
            let stderr = if output.stderr.trim().is_empty() {
                output.stdout.trim()
            } else {
                output.stderr.trim()
            };
            return Err(ReleaseError::ExternalCommand {
                command: invocation.to_string(),
                status: output.status.clone(),
                stderr: stderr.to_string(),
            }
            .into());
        }
        Ok(output)
    }

    /// Runs `invocation` and returns trimmed stdout, or `None` when the tool
    /// exits nonzero or prints nothing. Used for lookups where "not found" is
    /// an answer.
    fn run_optional(&mut self, invocation: &Invocation) -> Result<Option<String>> {
        let output = self.run(invocation)?;
        if !output.success {
            debug!("`{invocation}` returned {}", output.status);
            return Ok(None);
        }
        let stdout = output.stdout.trim();
        Ok((!stdout.is_empty()).then(|| stdout.to_string()))
    }
}

/// Spawns real processes with [`std::process::Command`].
#[derive(Debug, Clone)]
pub struct SystemRunner {
    root: PathBuf,
}

impl SystemRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput> {
        info!("running `{invocation}`");
        let _child = interrupt::track_child();
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| anyhow!("failed to run `{}`, error: {e}", invocation.program))?;
        if interrupt::interrupted() {
            return Err(ReleaseError::UserCancelled.into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !stdout.trim().is_empty() {
            debug!("{}", stdout.trim_end());
        }

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
