//! # Domain Model: Papers, Bibentries and Metadata
//!
//! A [`Paper`] is the in-memory aggregate the repository hands out. It pairs a
//! citekey with two independently stored records:
//!
//! - [`BibEntry`]: the normalized bibliographic record, a single-key mapping
//!   `{citekey: {field: value, ...}}`. Field contents are opaque to the core.
//! - [`Metadata`]: per-paper bookkeeping (`tags`, `docfile`, `added`) plus any
//!   free-form keys a caller chose to keep.
//!
//! ## The Citekey Invariant
//!
//! The bibentry's only key always equals the paper's citekey. [`Paper`] keeps its
//! fields private so the two can only change together (see [`Paper::set_citekey`]).
//!
//! ## On-disk Shape
//!
//! ```text
//! bib/Doe2013.yaml             meta/Doe2013.yaml
//! ----------------             -----------------
//! Doe2013:                     tags:
//!   type: article              - optics
//!   title: Nice Results        docfile: docsdir://Doe2013.pdf
//!   author: [Doe, John]        added: 2014-03-02T10:00:00Z
//!   year: '2013'
//! ```

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// BibTeX-style fields of one entry (`type`, `title`, `author`, `year`, ...).
pub type Fields = BTreeMap<String, serde_yaml::Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct BibEntry {
    key: String,
    fields: Fields,
}

impl BibEntry {
    pub fn new(key: impl Into<String>, fields: Fields) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Same fields under a different key.
    pub fn rekeyed(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// String value of a field, if it is a scalar string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }

    pub fn set_str(&mut self, field: &str, value: impl Into<String>) {
        self.fields
            .insert(field.to_string(), serde_yaml::Value::String(value.into()));
    }

    pub fn entry_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// `year` as text; numeric years are rendered too.
    pub fn year(&self) -> Option<String> {
        match self.fields.get("year")? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Authors from either a list or an `and`-separated string.
    pub fn authors(&self) -> Vec<String> {
        match self.fields.get("author") {
            Some(serde_yaml::Value::Sequence(seq)) => seq
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(serde_yaml::Value::String(s)) => s
                .split(" and ")
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Serialize for BibEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.fields)?;
        map.end()
    }
}

// Accepts only a single-key mapping whose value is a mapping of fields.
impl<'de> Deserialize<'de> for BibEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = BTreeMap::<String, Fields>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(D::Error::custom(format!(
                "expected exactly one entry, found {}",
                map.len()
            )));
        }
        let (key, fields) = map
            .into_iter()
            .next()
            .ok_or_else(|| D::Error::custom("empty bibliographic record"))?;
        Ok(BibEntry { key, fields })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Document reference; see [`crate::store::docs::DocRef`] for its forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docfile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<DateTime<Utc>>,
    /// Keys the core does not interpret, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Metadata {
    /// Tags from a comma-separated list; blanks are dropped.
    pub fn with_tag_list(mut self, list: &str) -> Self {
        self.tags = parse_tag_list(list);
        self
    }
}

pub fn parse_tag_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    citekey: String,
    bibentry: BibEntry,
    metadata: Metadata,
}

impl Paper {
    pub fn new(citekey: impl Into<String>, fields: Fields) -> Self {
        let citekey = citekey.into();
        Self {
            bibentry: BibEntry::new(citekey.clone(), fields),
            citekey,
            metadata: Metadata::default(),
        }
    }

    /// Builds a paper from a record, keyed by `citekey` or, if absent, by the
    /// record's own key.
    pub fn from_bibentry(bibentry: BibEntry, citekey: Option<String>) -> Self {
        let citekey = citekey.unwrap_or_else(|| bibentry.key().to_string());
        Self {
            bibentry: bibentry.rekeyed(citekey.clone()),
            citekey,
            metadata: Metadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn citekey(&self) -> &str {
        &self.citekey
    }

    pub fn bibentry(&self) -> &BibEntry {
        &self.bibentry
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        self.bibentry.fields_mut()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn into_parts(self) -> (String, BibEntry, Metadata) {
        (self.citekey, self.bibentry, self.metadata)
    }

    /// Changes the citekey and the bibentry key together.
    pub fn set_citekey(&mut self, citekey: impl Into<String>) {
        let citekey = citekey.into();
        self.bibentry.key = citekey.clone();
        self.citekey = citekey;
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.metadata.tags
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.metadata.tags.insert(tag.into());
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.metadata.tags.remove(tag)
    }

    pub fn docfile(&self) -> Option<&str> {
        self.metadata.docfile.as_deref()
    }

    pub fn set_docfile(&mut self, docfile: Option<String>) {
        self.metadata.docfile = docfile;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_yaml::Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_paper_keeps_bibentry_key_in_sync() {
        let mut paper = Paper::new("Doe2013", fields(&[("title", "Nice")]));
        assert_eq!(paper.bibentry().key(), "Doe2013");

        paper.set_citekey("Doe2013a");
        assert_eq!(paper.citekey(), "Doe2013a");
        assert_eq!(paper.bibentry().key(), "Doe2013a");
    }

    #[test]
    fn test_from_bibentry_rekeys_when_citekey_given() {
        let entry = BibEntry::new("orig", fields(&[("year", "2013")]));
        let paper = Paper::from_bibentry(entry.clone(), Some("other".into()));
        assert_eq!(paper.citekey(), "other");
        assert_eq!(paper.bibentry().key(), "other");

        let paper = Paper::from_bibentry(entry, None);
        assert_eq!(paper.citekey(), "orig");
    }

    #[test]
    fn test_bibentry_yaml_shape() {
        let entry = BibEntry::new("Doe2013", fields(&[("title", "Nice Results")]));
        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert!(yaml.starts_with("Doe2013:"));

        let back: BibEntry = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_bibentry_rejects_multiple_entries() {
        let raw = "a:\n  title: x\nb:\n  title: y\n";
        let err = serde_yaml::from_str::<BibEntry>(raw).unwrap_err();
        assert!(err.to_string().contains("exactly one entry"));

        let err = serde_yaml::from_str::<BibEntry>("{}").unwrap_err();
        assert!(err.to_string().contains("found 0"));
    }

    #[test]
    fn test_bibentry_accessors() {
        let raw = "Turing1950:\n  type: article\n  title: Computing Machinery\n  author:\n    - Turing, Alan\n  year: 1950\n";
        let entry: BibEntry = serde_yaml::from_str(raw).unwrap();
        assert_eq!(entry.entry_type(), Some("article"));
        assert_eq!(entry.title(), Some("Computing Machinery"));
        assert_eq!(entry.year(), Some("1950".to_string()));
        assert_eq!(entry.authors(), vec!["Turing, Alan"]);
    }

    #[test]
    fn test_authors_from_and_separated_string() {
        let entry = BibEntry::new("k", fields(&[("author", "Doe, John and Roe, Jane")]));
        assert_eq!(entry.authors(), vec!["Doe, John", "Roe, Jane"]);
    }

    #[test]
    fn test_metadata_defaults_and_extra_keys() {
        let meta: Metadata = serde_yaml::from_str("rating: 5\n").unwrap();
        assert!(meta.tags.is_empty());
        assert!(meta.docfile.is_none());
        assert_eq!(
            meta.extra.get("rating"),
            Some(&serde_yaml::Value::Number(5.into()))
        );

        let yaml = serde_yaml::to_string(&meta).unwrap();
        let back: Metadata = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_tag_list_parsing() {
        let meta = Metadata::default().with_tag_list("optics, ,lasers,optics");
        let tags: Vec<&str> = meta.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["lasers", "optics"]);
    }
}
