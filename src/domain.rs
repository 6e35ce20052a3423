use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TransformerError;

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

/// The taxonomy an instance serves. Each kind fixes the `type` tag of its
/// entities and the path segment of its routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    AlphavilleSeries,
    Wsod,
}

impl EntityKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            EntityKind::AlphavilleSeries => "AlphavilleSeries",
            EntityKind::Wsod => "WSOD",
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityKind::AlphavilleSeries => "alphaville-series",
            EntityKind::Wsod => "wsod",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::AlphavilleSeries => "Alphaville Series",
            EntityKind::Wsod => "WSOD",
        }
    }

    pub fn default_taxonomy_name(&self) -> Option<&'static str> {
        match self {
            EntityKind::AlphavilleSeries => Some("AlphavilleSeriesClassification"),
            EntityKind::Wsod => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// Canonical identifier text: a hyphenated UUID, either case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identifier {
    type Err = TransformerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !IDENTIFIER_PATTERN.is_match(value) {
            return Err(TransformerError::InvalidIdentifier(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }
}

/// One term as delivered by the source taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTerm {
    #[serde(rename = "canonicalName", default)]
    pub canonical_name: String,
    #[serde(rename = "id", default)]
    pub raw_id: String,
}

impl RawTerm {
    pub fn new(canonical_name: impl Into<String>, raw_id: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            raw_id: raw_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeIdentifiers {
    #[serde(rename = "TME")]
    pub tme: Vec<String>,
    pub uuids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEntity {
    pub uuid: String,
    pub alternative_identifiers: AlternativeIdentifiers,
    pub pref_label: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// List-response reference to an entity. Only the URL is part of the wire
/// format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLink {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "apiUrl")]
    pub api_url: String,
}

impl EntityLink {
    pub fn new(base_url: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            api_url: format!("{base_url}{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdEntry {
    pub id: String,
}
