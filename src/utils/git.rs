use {
    super::cmd::{CommandRunner, Invocation},
    anyhow::Result,
    std::path::Path,
};

fn git() -> Invocation {
    Invocation::new("git")
}

/// Nearest tag reachable from `HEAD`, if any.
pub fn describe_latest_tag(runner: &mut dyn CommandRunner) -> Result<Option<String>> {
    runner.run_optional(&git().args(["describe", "--tags", "--abbrev=0"]))
}

/// All tags, highest version first.
pub fn list_tags(runner: &mut dyn CommandRunner) -> Result<Vec<String>> {
    let tags = runner
        .run_optional(&git().args(["tag", "--list", "--sort=-version:refname"]))?
        .unwrap_or_default();
    Ok(tags
        .lines()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect())
}

/// Subjects of non-merge commits, oldest first.
///
/// With `since`, every commit in `since..HEAD`; otherwise the latest `limit`
/// commits. A repository without commits yields an empty list.
pub fn commit_subjects(
    runner: &mut dyn CommandRunner,
    since: Option<&str>,
    limit: usize,
) -> Result<Vec<String>> {
    let mut log = git().args(["log", "--no-merges", "--reverse", "--pretty=format:%s"]);
    log = match since {
        Some(reference) => log.arg(format!("{reference}..HEAD")),
        None => log.arg(format!("--max-count={limit}")),
    };
    let subjects = runner.run_optional(&log)?.unwrap_or_default();
    Ok(subjects.lines().map(str::to_string).collect())
}

pub fn add(runner: &mut dyn CommandRunner, paths: &[&Path]) -> Result<()> {
    let add = git()
        .arg("add")
        .args(paths.iter().map(|path| path.display().to_string()));
    runner.run_checked(&add)?;
    Ok(())
}

pub fn commit(runner: &mut dyn CommandRunner, message: &str) -> Result<()> {
    runner.run_checked(&git().args(["commit", "-m", message]))?;
    Ok(())
}

pub fn push(runner: &mut dyn CommandRunner, remote: &str, branch: &str) -> Result<()> {
    runner.run_checked(&git().args(["push", remote, branch]))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use {
        super::*,
        crate::utils::cmd::SystemRunner,
        pretty_assertions::assert_eq,
        std::{fs, process::Command},
    };

    pub(crate) fn init_repo(path: &Path) {
        Command::new("git")
            .args(["init", "-q"])
            .current_dir(path)
            .output()
            .unwrap();
    }

    pub(crate) fn commit_file(path: &Path, name: &str, subject: &str) {
        fs::write(path.join(name), subject).unwrap();
        Command::new("git")
            .args(["add", name])
            .current_dir(path)
            .output()
            .unwrap();
        let output = Command::new("git")
            .args([
                "-c",
                "user.name=Release Bot",
                "-c",
                "user.email=release@example.com",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "-m",
                subject,
            ])
            .current_dir(path)
            .output()
            .unwrap();
        assert!(output.status.success(), "{output:?}");
    }

    pub(crate) fn tag(path: &Path, name: &str) {
        Command::new("git")
            .args(["tag", name])
            .current_dir(path)
            .output()
            .unwrap();
    }

    pub(crate) fn git(path: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .unwrap();
        assert!(output.status.success(), "{output:?}");
    }

    #[test]
    fn test_tags_and_subjects() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        init_repo(root);
        let mut runner = SystemRunner::new(root);

        assert_eq!(describe_latest_tag(&mut runner).unwrap(), None);
        assert!(list_tags(&mut runner).unwrap().is_empty());
        assert!(commit_subjects(&mut runner, None, 20).unwrap().is_empty());

        commit_file(root, "a.txt", "Initial import");
        tag(root, "v1.0.0");
        commit_file(root, "b.txt", "Add key auth");
        commit_file(root, "c.txt", "Fix tab title");
        tag(root, "v1.0.10");
        tag(root, "v1.0.9");

        assert_eq!(
            list_tags(&mut runner).unwrap(),
            vec!["v1.0.10", "v1.0.9", "v1.0.0"]
        );
        assert!(describe_latest_tag(&mut runner).unwrap().is_some());

        assert_eq!(
            commit_subjects(&mut runner, Some("v1.0.0"), 20).unwrap(),
            vec!["Add key auth", "Fix tab title"]
        );
        assert_eq!(
            commit_subjects(&mut runner, None, 2).unwrap(),
            vec!["Add key auth", "Fix tab title"]
        );
    }
}
