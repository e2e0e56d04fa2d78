use {
    crate::error::ReleaseError,
    anyhow::{Context, Result},
    std::io::{self, BufRead, Write},
};

/// Operator interaction points of a release run.
pub trait Prompter {
    /// Text the operator reads before answering, such as the release plan.
    fn show(&mut self, text: &str) -> Result<()>;

    /// Yes/no question; only an explicit "y"/"yes" counts as yes.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Free-form lines until an empty line.
    fn read_lines(&mut self, header: &str) -> Result<Vec<String>>;

    /// Blocks until the operator is ready to continue.
    fn wait(&mut self, message: &str) -> Result<()>;
}

/// Asks on a terminal (or any reader/writer pair).
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// EOF means the terminal went away, which is handled like Ctrl-C.
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from terminal")?;
        if read == 0 {
            return Err(ReleaseError::UserCancelled.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        write!(self.output, "{text}").context("failed to write to terminal")?;
        self.output.flush().context("failed to write to terminal")?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn show(&mut self, text: &str) -> Result<()> {
        self.say(&format!("{text}\n"))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.say(&format!("{question} (y/N): "))?;
        let answer = self.read_line()?.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    fn read_lines(&mut self, header: &str) -> Result<Vec<String>> {
        self.say(&format!("{header}\n(finish with an empty line)\n"))?;
        let mut lines = vec![];
        loop {
            let line = match self.read_line() {
                Ok(line) => line,
                // end of input closes the list
                Err(err) if ReleaseError::is_cancelled(&err) => break,
                Err(err) => return Err(err),
            };
            if line.trim().is_empty() {
                break;
            }
            lines.push(line.trim().to_string());
        }
        Ok(lines)
    }

    fn wait(&mut self, message: &str) -> Result<()> {
        self.say(&format!("{message}\nPress Enter to continue..."))?;
        self.read_line()?;
        Ok(())
    }
}

/// Answers for unattended runs (`--yes`): approve everything, never ask for
/// manual notes, never block.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl Prompter for AutoApprove {
    fn show(&mut self, text: &str) -> Result<()> {
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            log::info!("{line}");
        }
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        log::info!("{question} -> yes (non-interactive)");
        Ok(true)
    }

    fn read_lines(&mut self, _header: &str) -> Result<Vec<String>> {
        Ok(vec![])
    }

    fn wait(&mut self, message: &str) -> Result<()> {
        log::info!("{message} (not waiting, non-interactive)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, std::io::Cursor};

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), vec![])
    }

    #[test]
    fn test_confirm() {
        assert!(prompter("y\n").confirm("Continue?").unwrap());
        assert!(prompter("YES\n").confirm("Continue?").unwrap());
        assert!(!prompter("n\n").confirm("Continue?").unwrap());
        assert!(!prompter("\n").confirm("Continue?").unwrap());

        let mut p = prompter("y\n");
        p.confirm("Continue?").unwrap();
        assert_eq!(
            String::from_utf8(p.into_output()).unwrap(),
            "Continue? (y/N): "
        );
    }

    #[test]
    fn test_show_precedes_question() {
        let mut p = prompter("y\n");
        p.show("Release plan:\n   New version:     1.0.1").unwrap();
        p.confirm("Continue?").unwrap();
        assert_eq!(
            String::from_utf8(p.into_output()).unwrap(),
            "Release plan:\n   New version:     1.0.1\nContinue? (y/N): "
        );
    }

    #[test]
    fn test_confirm_eof_cancels() {
        let err = prompter("").confirm("Continue?").unwrap_err();
        assert!(ReleaseError::is_cancelled(&err));
    }

    #[test]
    fn test_read_lines() {
        let lines = prompter("Fix crash\n  Add theme  \n\nignored\n")
            .read_lines("Notes:")
            .unwrap();
        assert_eq!(lines, vec!["Fix crash", "Add theme"]);

        let lines = prompter("only line").read_lines("Notes:").unwrap();
        assert_eq!(lines, vec!["only line"]);

        assert!(prompter("\n").read_lines("Notes:").unwrap().is_empty());
    }

    #[test]
    fn test_wait() {
        prompter("\n").wait("Waiting for CI").unwrap();
        assert!(ReleaseError::is_cancelled(
            &prompter("").wait("Waiting for CI").unwrap_err()
        ));
    }

    #[test]
    fn test_auto_approve() {
        let mut p = AutoApprove;
        p.show("Release plan:").unwrap();
        assert!(p.confirm("Continue?").unwrap());
        assert!(p.read_lines("Notes:").unwrap().is_empty());
        p.wait("Waiting").unwrap();
    }
}
