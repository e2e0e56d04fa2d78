//! Sparkle-style appcast with one `<item>` per release.

use {
    crate::{
        config::{FeedMode, ReleaseConfig},
        error::ReleaseError,
        types::{notes::escape_html, ReleaseContext},
    },
    anyhow::{Context, Result},
    chrono::{DateTime, Utc},
    log::{info, warn},
    regex::Regex,
    std::{fs, path::PathBuf},
};

/// RFC 822 date as used by RSS `pubDate`.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";
pub const ENCLOSURE_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub version: String,
    pub build: String,
    pub notes_markup: String,
    pub publish_date: String,
    pub download_url: String,
    pub length: u64,
}

impl FeedEntry {
    pub fn new(
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
        length: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            title: format!("Version {}", ctx.new_version),
            version: ctx.new_version.to_string(),
            build: ctx.new_build.to_string(),
            notes_markup: ctx.notes.to_markup(),
            publish_date: now.format(PUB_DATE_FORMAT).to_string(),
            download_url: config.download_url(ctx),
            length,
        }
    }

    pub fn render(&self) -> String {
        format!(
            r#"<item>
            <title>{title}</title>
            <sparkle:version>{build}</sparkle:version>
            <sparkle:shortVersionString>{version}</sparkle:shortVersionString>
            <description><![CDATA[
{notes}
            ]]></description>
            <pubDate>{date}</pubDate>
            <enclosure url="{url}" sparkle:version="{build}" sparkle:shortVersionString="{version}" length="{length}" type="{ENCLOSURE_TYPE}"/>
        </item>"#,
            title = escape_html(&self.title),
            build = escape_html(&self.build),
            version = escape_html(&self.version),
            notes = self.notes_markup,
            date = self.publish_date,
            url = escape_html(&self.download_url),
            length = self.length,
        )
    }
}

/// Full document around already rendered `<item>` elements.
pub fn render_feed(title: &str, description: &str, items: &[String]) -> String {
    let items: String = items
        .iter()
        .map(|item| format!("        {item}\n"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:sparkle="http://www.andymatuschak.org/xml-namespaces/sparkle" xmlns:dc="http://purl.org/dc/elements/1.1/">
    <channel>
        <title>{title}</title>
        <description>{description}</description>
        <language>en</language>
{items}    </channel>
</rss>
"#,
        title = escape_html(title),
        description = escape_html(description),
    )
}

/// `<item>` elements of an existing feed, except the one for `version`.
pub fn existing_items(feed: &str, version: &str) -> Result<Vec<String>> {
    let item = Regex::new(r"(?s)<item>.*?</item>")?;
    let same_version = format!("<sparkle:shortVersionString>{version}</sparkle:shortVersionString>");
    Ok(item
        .find_iter(feed)
        .map(|m| m.as_str().to_string())
        .filter(|item| !item.contains(&same_version))
        .collect())
}

/// Rewrites the feed for the new release. The disk image must exist; its
/// size goes into the enclosure.
pub fn update_feed(
    config: &ReleaseConfig,
    ctx: &ReleaseContext,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let artifact = config.root.join(ctx.artifact_name());
    if !artifact.is_file() {
        return Err(ReleaseError::MissingArtifact {
            what: "disk image",
            path: artifact,
        }
        .into());
    }
    let length = fs::metadata(&artifact)
        .context(format!("failed to stat {}", artifact.display()))?
        .len();

    let entry = FeedEntry::new(config, ctx, length, now);
    let mut items = vec![entry.render()];

    let feed_path = config.path(&config.feed_file);
    match config.feed_mode {
        FeedMode::Replace => {
            warn!(
                "{} is replaced and will only list {}; set feed_mode = \"prepend\" to keep \
                 older releases",
                config.feed_file.display(),
                ctx.new_version
            );
        }
        FeedMode::Prepend => {
            if feed_path.exists() {
                let previous = fs::read_to_string(&feed_path)
                    .context(format!("failed to read {}", feed_path.display()))?;
                items.extend(existing_items(&previous, &entry.version)?);
            }
        }
    }

    fs::write(
        &feed_path,
        render_feed(&config.feed_title, &config.feed_description, &items),
    )
    .context(format!("failed to write {}", feed_path.display()))?;

    info!(
        "{} updated: {} ({} bytes)",
        config.feed_file.display(),
        entry.version,
        length
    );
    Ok(feed_path)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::types::ReleaseNotes,
        chrono::TimeZone,
        pretty_assertions::assert_eq,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn setup(mode: FeedMode) -> (tempfile::TempDir, ReleaseConfig, ReleaseContext) {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = ReleaseConfig::for_app(temp_dir.path(), "MacSSH", "Solvetronix/MacSSH");
        config.feed_mode = mode;
        let ctx = ReleaseContext::new("MacSSH", "1.0.0".parse().unwrap(), "10".parse().unwrap())
            .unwrap()
            .with_notes(ReleaseNotes::new(vec!["Fix <b>bold</b> titles".to_string()]));
        (temp_dir, config, ctx)
    }

    #[test]
    fn test_update_feed() {
        let (_temp_dir, config, ctx) = setup(FeedMode::Replace);
        fs::write(config.root.join("MacSSH-1.0.1.dmg"), vec![0u8; 4096]).unwrap();
        fs::write(config.root.join("appcast.xml"), "<rss>old</rss>").unwrap();

        let path = update_feed(&config, &ctx, now()).unwrap();
        let feed = fs::read_to_string(path).unwrap();

        assert_eq!(
            feed,
            r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:sparkle="http://www.andymatuschak.org/xml-namespaces/sparkle" xmlns:dc="http://purl.org/dc/elements/1.1/">
    <channel>
        <title>MacSSH Updates</title>
        <description>Most recent changes to MacSSH</description>
        <language>en</language>
        <item>
            <title>Version 1.0.1</title>
            <sparkle:version>11</sparkle:version>
            <sparkle:shortVersionString>1.0.1</sparkle:shortVersionString>
            <description><![CDATA[
<ul>
<li>Fix &lt;b&gt;bold&lt;/b&gt; titles</li>
</ul>
            ]]></description>
            <pubDate>Sat, 09 Mar 2024 14:05:07 +0000</pubDate>
            <enclosure url="https://github.com/Solvetronix/MacSSH/releases/download/v1.0.1/MacSSH-1.0.1.dmg" sparkle:version="11" sparkle:shortVersionString="1.0.1" length="4096" type="application/octet-stream"/>
        </item>
    </channel>
</rss>
"#
        );
    }

    #[test]
    fn test_update_feed_requires_artifact() {
        let (_temp_dir, config, ctx) = setup(FeedMode::Replace);
        let err = update_feed(&config, &ctx, now()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::MissingArtifact { .. })
        ));
        assert!(!config.root.join("appcast.xml").exists());
    }

    #[test]
    fn test_prepend_keeps_history() {
        let (_temp_dir, config, ctx) = setup(FeedMode::Prepend);
        fs::write(config.root.join("MacSSH-1.0.1.dmg"), b"dmg").unwrap();

        let older = FeedEntry {
            title: "Version 1.0.0".to_string(),
            version: "1.0.0".to_string(),
            build: "10".to_string(),
            notes_markup: ReleaseNotes::default().to_markup(),
            publish_date: "Fri, 01 Mar 2024 10:00:00 +0000".to_string(),
            download_url: "https://example.com/1.0.0.dmg".to_string(),
            length: 1,
        };
        // a rerun for 1.0.1 must not duplicate its own entry
        let rerun = FeedEntry {
            version: "1.0.1".to_string(),
            ..older.clone()
        };
        fs::write(
            config.root.join("appcast.xml"),
            render_feed("t", "d", &[rerun.render(), older.render()]),
        )
        .unwrap();

        update_feed(&config, &ctx, now()).unwrap();
        let feed = fs::read_to_string(config.root.join("appcast.xml")).unwrap();

        let items = existing_items(&feed, "none").unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].contains("<sparkle:version>11</sparkle:version>"));
        assert_eq!(items[1], older.render());
    }

    #[test]
    fn test_empty_notes_placeholder() {
        let (_temp_dir, config, ctx) = setup(FeedMode::Replace);
        let ctx = ctx.with_notes(ReleaseNotes::default());
        let entry = FeedEntry::new(&config, &ctx, 1, now());
        assert!(entry.render().contains("<li>No changes listed</li>"));
    }
}
