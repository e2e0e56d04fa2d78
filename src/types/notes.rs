/// List item rendered when a release has no collected changes.
pub const NO_CHANGES: &str = "No changes listed";

/// Human-readable changelog lines, in commit or entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseNotes {
    lines: Vec<String>,
}

impl ReleaseNotes {
    pub fn new(lines: Vec<String>) -> Self {
        let lines = lines
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// One line per entry, prefixed with `- `.
    pub fn to_plain(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `<ul>` list with each line escaped, or a single placeholder item.
    pub fn to_markup(&self) -> String {
        let items = if self.lines.is_empty() {
            format!("<li>{NO_CHANGES}</li>")
        } else {
            self.lines
                .iter()
                .map(|line| format!("<li>{}</li>", escape_html(line)))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!("<ul>\n{items}\n</ul>")
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
