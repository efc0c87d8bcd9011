use super::styles;
use chrono::{DateTime, Utc};
use pubsapp::broker::ListingEntry;
use pubsapp::model::Paper;
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE_WIDTH: usize = 60;
const ELLIPSIS: char = '…';

/// One paper in `pubs list --json`.
#[derive(Serialize, Debug, PartialEq)]
pub struct PaperJson {
    pub citekey: String,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub tags: Vec<String>,
    pub docfile: Option<String>,
    pub added: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl From<&ListingEntry> for PaperJson {
    fn from(row: &ListingEntry) -> Self {
        let entry = &row.bibentry;
        Self {
            citekey: row.citekey.clone(),
            entry_type: entry.entry_type().map(str::to_string),
            title: entry.title().map(str::to_string),
            authors: entry.authors(),
            year: entry.year(),
            tags: row.metadata.tags.iter().cloned().collect(),
            docfile: row.metadata.docfile.clone(),
            added: row.metadata.added,
            modified: row.stats.as_ref().and_then(|s| s.modified),
        }
    }
}

pub fn render_json(rows: &[ListingEntry]) -> serde_json::Result<String> {
    let papers: Vec<PaperJson> = rows.iter().map(PaperJson::from).collect();
    serde_json::to_string_pretty(&papers)
}

pub fn render_list(rows: &[ListingEntry], now: DateTime<Utc>) -> String {
    if rows.is_empty() {
        return format!("{}\n", styles::muted().apply_to("No papers found."));
    }
    let mut output = String::new();
    for row in rows {
        output.push_str(&format_row(row, now));
        output.push('\n');
    }
    output
}

/// `[Doe2013] Doe et al. (2013) Nice Results #tag  3 days ago`
fn format_row(row: &ListingEntry, now: DateTime<Utc>) -> String {
    let entry = &row.bibentry;
    let mut parts = vec![styles::citekey()
        .apply_to(format!("[{}]", row.citekey))
        .to_string()];

    let authors = short_authors(&entry.authors());
    if !authors.is_empty() {
        parts.push(styles::authors().apply_to(authors).to_string());
    }
    if let Some(year) = entry.year() {
        parts.push(styles::year().apply_to(format!("({})", year)).to_string());
    }
    if let Some(title) = entry.title() {
        parts.push(
            styles::title()
                .apply_to(truncate_to_width(title, TITLE_WIDTH))
                .to_string(),
        );
    }
    for tag in &row.metadata.tags {
        parts.push(styles::tag().apply_to(format!("#{}", tag)).to_string());
    }

    let when = row
        .metadata
        .added
        .or_else(|| row.stats.as_ref().and_then(|s| s.modified));
    let mut line = parts.join(" ");
    if let Some(when) = when {
        line.push_str("  ");
        line.push_str(
            &styles::time()
                .apply_to(format_time_ago(when, now))
                .to_string(),
        );
    }
    line
}

/// Surname of the first author, `A and B` for two, `A et al.` beyond.
pub fn short_authors(authors: &[String]) -> String {
    let surname = |author: &str| -> String {
        match author.split_once(',') {
            Some((last, _)) => last.trim().to_string(),
            None => author
                .split_whitespace()
                .last()
                .unwrap_or(author)
                .to_string(),
        }
    };
    match authors {
        [] => String::new(),
        [only] => surname(only),
        [first, second] => format!("{} and {}", surname(first), surname(second)),
        [first, ..] => format!("{} et al.", surname(first)),
    }
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    out
}

pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    formatter.convert(duration.to_std().unwrap_or_default())
}

pub fn added(paper: &Paper) -> String {
    let mut message = format!(
        "{} {}",
        styles::success().apply_to("added"),
        styles::citekey().apply_to(format!("[{}]", paper.citekey()))
    );
    if let Some(docfile) = paper.docfile() {
        message.push_str(&format!(" with {}", docfile));
    }
    message
}

pub fn renamed(old: &str, paper: &Paper) -> String {
    format!(
        "{} [{}] to {}",
        styles::success().apply_to("renamed"),
        old,
        styles::citekey().apply_to(format!("[{}]", paper.citekey()))
    )
}

pub fn removed(paper: &Paper) -> String {
    format!(
        "{} [{}]",
        styles::success().apply_to("removed"),
        paper.citekey()
    )
}

pub fn doc_attached(paper: &Paper) -> String {
    format!(
        "{} {} to {}",
        styles::success().apply_to("attached"),
        paper.docfile().unwrap_or_default(),
        styles::citekey().apply_to(format!("[{}]", paper.citekey()))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pubsapp::model::{BibEntry, Metadata};
    use pubsapp::store::FileStats;

    fn row(citekey: &str, yaml_fields: &str, tags: &str) -> ListingEntry {
        let raw = format!("{}:\n{}", citekey, yaml_fields);
        let bibentry: BibEntry = serde_yaml::from_str(&raw).unwrap();
        ListingEntry {
            citekey: citekey.to_string(),
            metadata: Metadata::default().with_tag_list(tags),
            bibentry,
            stats: None,
        }
    }

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).to_string()
    }

    #[test]
    fn test_short_authors() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(short_authors(&[]), "");
        assert_eq!(short_authors(&names(&["Doe, John"])), "Doe");
        assert_eq!(short_authors(&names(&["Alan Turing"])), "Turing");
        assert_eq!(
            short_authors(&names(&["Doe, John", "Roe, Jane"])),
            "Doe and Roe"
        );
        assert_eq!(
            short_authors(&names(&["Doe, John", "Roe, Jane", "Poe, E."])),
            "Doe et al."
        );
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        // Wide characters count double.
        assert_eq!(truncate_to_width("日本語テキスト", 6), "日本…");
    }

    #[test]
    fn test_format_time_ago() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::hours(2), now), "2 hours ago");
        // Clock skew does not produce negative durations.
        assert_eq!(format_time_ago(now + Duration::hours(1), now), "now");
    }

    #[test]
    fn test_render_list_line() {
        let rows = vec![row(
            "Doe2013",
            "  title: Nice Results\n  author: ['Doe, John']\n  year: 2013\n",
            "optics",
        )];
        let output = plain(&render_list(&rows, Utc::now()));
        assert_eq!(output, "[Doe2013] Doe (2013) Nice Results #optics\n");
    }

    #[test]
    fn test_render_list_uses_file_time_when_added_missing() {
        let now = Utc::now();
        let mut entry = row("k", "  title: T\n", "");
        entry.stats = Some(FileStats {
            size: 10,
            modified: Some(now - Duration::days(3)),
        });
        let output = plain(&render_list(&[entry], now));
        assert!(output.contains("3 days ago"), "got {:?}", output);
    }

    #[test]
    fn test_render_list_empty() {
        assert_eq!(plain(&render_list(&[], Utc::now())), "No papers found.\n");
    }

    #[test]
    fn test_render_json() {
        let rows = vec![row(
            "Doe2013",
            "  type: article\n  title: Nice\n  year: '2013'\n",
            "b,a",
        )];
        let json = render_json(&rows).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["citekey"], "Doe2013");
        assert_eq!(value[0]["type"], "article");
        assert_eq!(value[0]["year"], "2013");
        assert_eq!(value[0]["tags"], serde_json::json!(["a", "b"]));
        assert!(value[0]["docfile"].is_null());
    }
}
