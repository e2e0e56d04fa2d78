use {
    crate::{error::ReleaseError, types::ReleaseContext, utils::fs::expand_home},
    anyhow::{Context, Result},
    serde::Deserialize,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

pub const DEFAULT_CONFIG_FILE: &str = "release.toml";
const DEFAULT_DERIVED_DATA: &str = "~/Library/Developer/Xcode/DerivedData";

/// What happens to entries already in the update feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedMode {
    /// The feed only ever lists the release being produced.
    #[default]
    Replace,
    /// The new entry goes first, older entries are kept.
    Prepend,
}

/// Who creates the hosted release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishMode {
    /// Create release `v<version>` with the hosting CLI and attach the image.
    #[default]
    Direct,
    /// A pipeline triggered by the push creates the release; wait for it and
    /// attach the image to `latest`.
    CiAssisted,
}

/// `create-dmg` window layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DmgLayout {
    pub volume_name: Option<String>,
    pub window_pos: [u32; 2],
    pub window_size: [u32; 2],
    pub icon_size: u32,
    pub icon_pos: [u32; 2],
    pub app_drop_link: [u32; 2],
}

impl Default for DmgLayout {
    fn default() -> Self {
        Self {
            volume_name: None,
            window_pos: [200, 120],
            window_size: [800, 400],
            icon_size: 100,
            icon_pos: [200, 190],
            app_drop_link: [600, 185],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    app_name: String,
    repository: String,
    project_file: Option<PathBuf>,
    info_plist: Option<String>,
    feed_file: Option<PathBuf>,
    scheme: Option<String>,
    configuration: Option<String>,
    derived_data: Option<String>,
    remote: Option<String>,
    branch: Option<String>,
    hosting_base: Option<String>,
    notes_commit_limit: Option<usize>,
    feed_title: Option<String>,
    feed_description: Option<String>,
    #[serde(default)]
    feed_mode: FeedMode,
    #[serde(default)]
    publish_mode: PublishMode,
    #[serde(default)]
    dmg: DmgLayout,
}

/// Resolved settings for one project. Relative paths are joined onto `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub root: PathBuf,
    pub app_name: String,
    /// `owner/name` on the hosting service.
    pub repository: String,
    pub project_file: PathBuf,
    /// `None` when the plist takes its versions from build settings.
    pub info_plist: Option<PathBuf>,
    pub feed_file: PathBuf,
    pub scheme: String,
    pub configuration: String,
    pub derived_data: PathBuf,
    pub remote: String,
    pub branch: String,
    pub hosting_base: String,
    pub notes_commit_limit: usize,
    pub feed_title: String,
    pub feed_description: String,
    pub feed_mode: FeedMode,
    pub publish_mode: PublishMode,
    pub dmg: DmgLayout,
}

impl ReleaseConfig {
    /// Defaults for an Xcode project laid out as `<app>.xcodeproj` + `<app>/Info.plist`.
    pub fn for_app(
        root: impl Into<PathBuf>,
        app_name: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        let app_name = app_name.into();
        let repository = repository.into();
        Self {
            root: root.into(),
            project_file: PathBuf::from(format!("{app_name}.xcodeproj/project.pbxproj")),
            info_plist: Some(PathBuf::from(format!("{app_name}/Info.plist"))),
            feed_file: PathBuf::from("appcast.xml"),
            scheme: app_name.clone(),
            configuration: "Release".to_string(),
            derived_data: expand_home(DEFAULT_DERIVED_DATA),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            hosting_base: format!("https://github.com/{repository}"),
            notes_commit_limit: 20,
            feed_title: format!("{app_name} Updates"),
            feed_description: format!("Most recent changes to {app_name}"),
            feed_mode: FeedMode::default(),
            publish_mode: PublishMode::default(),
            dmg: DmgLayout::default(),
            app_name,
            repository,
        }
    }

    pub fn load(path: &Path, root: impl Into<PathBuf>) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReleaseError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content, path, root)
    }

    pub fn from_toml(content: &str, path: &Path, root: impl Into<PathBuf>) -> Result<Self> {
        let file: ConfigFile =
            toml_edit::de::from_str(content).map_err(|e| ReleaseError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut config = Self::for_app(root, file.app_name, file.repository);
        if let Some(project_file) = file.project_file {
            config.project_file = project_file;
        }
        if let Some(info_plist) = file.info_plist {
            config.info_plist = (!info_plist.is_empty()).then(|| PathBuf::from(info_plist));
        }
        if let Some(feed_file) = file.feed_file {
            config.feed_file = feed_file;
        }
        if let Some(scheme) = file.scheme {
            config.scheme = scheme;
        }
        if let Some(configuration) = file.configuration {
            config.configuration = configuration;
        }
        if let Some(derived_data) = file.derived_data {
            config.derived_data = expand_home(&derived_data);
        }
        if let Some(remote) = file.remote {
            config.remote = remote;
        }
        if let Some(branch) = file.branch {
            config.branch = branch;
        }
        if let Some(hosting_base) = file.hosting_base {
            config.hosting_base = hosting_base.trim_end_matches('/').to_string();
        }
        if let Some(limit) = file.notes_commit_limit {
            config.notes_commit_limit = limit;
        }
        if let Some(feed_title) = file.feed_title {
            config.feed_title = feed_title;
        }
        if let Some(feed_description) = file.feed_description {
            config.feed_description = feed_description;
        }
        config.feed_mode = file.feed_mode;
        config.publish_mode = file.publish_mode;
        config.dmg = file.dmg;

        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| ReleaseError::Config {
            path: path.to_path_buf(),
            message,
        };
        if self.app_name.trim().is_empty() {
            return Err(invalid("app_name must not be empty".to_string()).into());
        }
        if self.repository.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(invalid(format!(
                "repository must be owner/name, got {:?}",
                self.repository
            ))
            .into());
        }
        if self.notes_commit_limit == 0 {
            return Err(invalid("notes_commit_limit must be at least 1".to_string()).into());
        }
        Ok(())
    }

    pub fn path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// The `.xcodeproj` directory that holds `project_file`.
    pub fn xcode_project(&self) -> Result<PathBuf> {
        self.project_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .context(format!(
                "cannot determine the Xcode project of {}",
                self.project_file.display()
            ))
    }

    pub fn bundle_name(&self) -> String {
        format!("{}.app", self.app_name)
    }

    pub fn volume_name(&self) -> String {
        self.dmg
            .volume_name
            .clone()
            .unwrap_or_else(|| format!("{} Installer", self.app_name))
    }

    pub fn download_url(&self, ctx: &ReleaseContext) -> String {
        format!(
            "{}/releases/download/{}/{}",
            self.hosting_base,
            ctx.tag(),
            ctx.artifact_name()
        )
    }

    pub fn actions_url(&self) -> String {
        format!("{}/actions", self.hosting_base)
    }

    /// Files the release commit contains.
    pub fn tracked_files(&self) -> Vec<&Path> {
        let mut files = vec![self.project_file.as_path()];
        if let Some(info_plist) = &self.info_plist {
            files.push(info_plist.as_path());
        }
        files.push(self.feed_file.as_path());
        files
    }
}
