//! Text encoding of records.
//!
//! The broker validates externally supplied bibliographic text through a
//! [`BibDecoder`]. The default [`YamlCodec`] reads the same single-entry YAML
//! shape the bib store writes (JSON input parses too, YAML being a superset).
//! Other formats plug in by implementing the trait.

use crate::error::{PubsError, Result};
use crate::model::{BibEntry, Metadata};

pub trait BibDecoder {
    /// Parses raw text into one record, or fails with [`PubsError::Validation`].
    fn decode(&self, raw: &str) -> Result<BibEntry>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl YamlCodec {
    pub fn decode_bibentry(&self, raw: &str) -> Result<BibEntry> {
        if raw.trim().is_empty() {
            return Err(PubsError::Validation("no bibliographic data".to_string()));
        }
        serde_yaml::from_str(raw).map_err(|e| PubsError::Validation(e.to_string()))
    }

    pub fn encode_bibentry(&self, entry: &BibEntry) -> Result<String> {
        serde_yaml::to_string(entry).map_err(PubsError::Yaml)
    }

    pub fn decode_metadata(&self, raw: &str) -> Result<Metadata> {
        if raw.trim().is_empty() {
            return Ok(Metadata::default());
        }
        serde_yaml::from_str(raw).map_err(|e| PubsError::Validation(e.to_string()))
    }

    pub fn encode_metadata(&self, metadata: &Metadata) -> Result<String> {
        serde_yaml::to_string(metadata).map_err(PubsError::Yaml)
    }
}

impl BibDecoder for YamlCodec {
    fn decode(&self, raw: &str) -> Result<BibEntry> {
        self.decode_bibentry(raw)
    }
}
