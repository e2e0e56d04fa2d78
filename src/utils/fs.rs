use {
    anyhow::{Context, Result},
    std::{
        fs,
        path::{Component, Path, PathBuf},
        time::SystemTime,
    },
    walkdir::WalkDir,
};

/// Finds every directory named `name` below `root`, without descending into
/// matches or into other bundles.
pub fn find_dirs_by_name(root: &Path, name: &str) -> Result<Vec<PathBuf>> {
    let mut results = vec![];
    if !root.is_dir() {
        return Ok(results);
    }

    let mut walker = WalkDir::new(root).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_dir() || entry.depth() == 0 {
            continue;
        }
        if entry.file_name() == name {
            results.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        } else if entry.path().extension().is_some_and(|ext| ext == "app") {
            walker.skip_current_dir();
        }
    }

    Ok(results)
}

pub fn contains_component(path: &Path, name: &str) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(part) if part == name))
}

pub fn modified(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Recursively copies `src` into `dst`, recreating symlinks instead of
/// following them (frameworks inside `.app` bundles rely on them).
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.context(format!("failed to walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .context("walked outside of the source directory")?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .context(format!("failed to create {}", target.display()))?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())
                .context(format!("failed to read link {}", entry.path().display()))?;
            symlink(&link, &target)
                .context(format!("failed to create link {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target).context(format!(
                "failed to copy {} to {}",
                entry.path().display(),
                target.display()
            ))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    fs::copy(link, target).map(|_| ())
}

/// Removes `path` if it exists.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).context(format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Expands a leading `~/` to the current user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    }
}
