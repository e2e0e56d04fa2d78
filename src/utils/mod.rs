pub mod cmd;
pub mod fs;
pub mod git;
pub mod interrupt;
pub mod prompt;

pub use cmd::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use fs::{copy_dir, expand_home, find_dirs_by_name};
pub use prompt::{AutoApprove, Prompter, TerminalPrompter};
