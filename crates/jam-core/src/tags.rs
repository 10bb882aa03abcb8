//! Facet tag codec.
//!
//! Facet tags are plain strings of the form `"type:value"` (e.g.
//! `"instrument:guitar"`). The encoding is advisory: nothing validates tags
//! at write time, and a value containing `:` survives encode/decode only
//! because the decoder splits on the first colon and keeps the rest intact.

use serde::{Deserialize, Serialize};

/// The three recognized facet dimensions, plus a sentinel for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Skill,
    Instrument,
    Genre,
    Unknown,
}

impl FacetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKind::Skill => "skill",
            FacetKind::Instrument => "instrument",
            FacetKind::Genre => "genre",
            FacetKind::Unknown => "unknown",
        }
    }

    fn from_prefix(prefix: &str) -> Option<FacetKind> {
        match prefix {
            "skill" => Some(FacetKind::Skill),
            "instrument" => Some(FacetKind::Instrument),
            "genre" => Some(FacetKind::Genre),
            _ => None,
        }
    }
}

/// A decoded `"type:value"` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTag {
    pub kind: FacetKind,
    pub value: String,
}

/// Produces `"<kind>:<value>"`. No escaping of `:` inside `value`.
pub fn encode_tag(kind: FacetKind, value: &str) -> String {
    match kind {
        FacetKind::Unknown => value.to_string(),
        known => format!("{}:{}", known.as_str(), value),
    }
}

/// Splits a tag on the first `:`. An unrecognized prefix decodes as
/// `Unknown` carrying the whole original string as the value.
pub fn decode_tag(tag: &str) -> DecodedTag {
    if let Some((prefix, rest)) = tag.split_once(':') {
        if let Some(kind) = FacetKind::from_prefix(prefix) {
            return DecodedTag {
                kind,
                value: rest.to_string(),
            };
        }
    }
    DecodedTag {
        kind: FacetKind::Unknown,
        value: tag.to_string(),
    }
}

/// Returns the value portion of every tag of the given kind, in original
/// order, without deduplication.
pub fn tags_of_type(tags: &[String], kind: FacetKind) -> Vec<String> {
    tags.iter()
        .map(|tag| decode_tag(tag))
        .filter(|decoded| decoded.kind == kind)
        .map(|decoded| decoded.value)
        .collect()
}
