//! Read-only perfume catalog loaded once at startup

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Catalog errors
///
/// All variants are load-time failures. A catalog that loaded
/// successfully never errors at query time.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    ReadFailed(String),

    #[error("Invalid catalog format: {0}")]
    InvalidFormat(String),

    #[error("Duplicate item id: {0}")]
    DuplicateId(String),

    #[error("Item {0} is missing required field: {1}")]
    MissingField(String, String),
}

/// Price category stored on each item.
///
/// The category is authoritative: it is never recomputed from the
/// numeric price, even if the two disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceRange {
    Budget,
    Mid,
    Luxury,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    Unisex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Moderate,
    Strong,
}

impl FromStr for PriceRange {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "budget" => Ok(Self::Budget),
            "mid" => Ok(Self::Mid),
            "luxury" => Ok(Self::Luxury),
            _ => Err(()),
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "masculine" => Ok(Self::Masculine),
            "feminine" => Ok(Self::Feminine),
            "unisex" => Ok(Self::Unisex),
            _ => Err(()),
        }
    }
}

impl FromStr for Intensity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "moderate" => Ok(Self::Moderate),
            "strong" => Ok(Self::Strong),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Budget => "budget",
            Self::Mid => "mid",
            Self::Luxury => "luxury",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Masculine => "masculine",
            Self::Feminine => "feminine",
            Self::Unisex => "unisex",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        };
        f.write_str(s)
    }
}

/// Fragrance pyramid: top, middle and base notes in application order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notes {
    pub top: Vec<String>,
    pub middle: Vec<String>,
    pub base: Vec<String>,
}

impl Notes {
    /// Iterate over all notes across the three layers
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.top
            .iter()
            .chain(self.middle.iter())
            .chain(self.base.iter())
            .map(String::as_str)
    }
}

/// One perfume in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique, stable identifier
    pub id: String,

    pub name: String,

    pub brand: String,

    /// Free-form primary scent descriptor (e.g. "ocean", "coffee")
    pub scent_type: String,

    /// Scent family this item belongs to (taxonomy name)
    pub scent_family: String,

    pub notes: Notes,

    /// Numeric price, currency-agnostic
    pub price: f64,

    pub price_range: PriceRange,

    pub gender: Gender,

    pub intensity: Intensity,

    pub description: String,

    /// Occasion/mood/season/style descriptors
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub image_url: String,
}

/// Scent family with keywords used for fuzzy matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScentFamily {
    pub name: String,
    pub keywords: Vec<String>,
}

/// On-disk catalog document shape
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    items: Vec<CatalogItem>,
    scent_families: Vec<ScentFamily>,

    #[serde(default)]
    occasions: Vec<String>,

    #[serde(default)]
    moods: Vec<String>,

    #[serde(default)]
    seasons: Vec<String>,
}

/// Embedded default catalog data
const BUILTIN_CATALOG: &str = include_str!("../data/perfumes.json");

/// Immutable perfume catalog plus its scent-family taxonomy.
///
/// Loaded once at process start; safe to share across any number of
/// concurrent searches.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    families: Vec<ScentFamily>,
    occasions: Vec<String>,
    moods: Vec<String>,
    seasons: Vec<String>,
}

impl Catalog {
    /// Parse and validate a catalog document.
    ///
    /// Schema violations are rejected here rather than discovered
    /// mid-query: duplicate or empty ids and items with no top notes
    /// all fail the load.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidFormat(e.to_string()))?;

        let mut seen_ids = HashSet::new();

        for item in &doc.items {
            if item.id.trim().is_empty() {
                return Err(CatalogError::MissingField(item.name.clone(), "id".to_string()));
            }
            if !seen_ids.insert(item.id.clone()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            if item.notes.top.is_empty() {
                return Err(CatalogError::MissingField(item.id.clone(), "notes.top".to_string()));
            }
        }

        info!(
            "Catalog loaded: {} items, {} scent families",
            doc.items.len(),
            doc.scent_families.len()
        );

        Ok(Self {
            items: doc.items,
            families: doc.scent_families,
            occasions: doc.occasions,
            moods: doc.moods,
            seasons: doc.seasons,
        })
    }

    /// Load a catalog from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CatalogError::ReadFailed(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Load the embedded default catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// All items in catalog order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Look up a single item by id
    pub fn item_by_id(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// All scent families with their keyword sets
    pub fn scent_families(&self) -> &[ScentFamily] {
        &self.families
    }

    /// Find the taxonomy entry for a family name (exact match)
    pub fn family(&self, name: &str) -> Option<&ScentFamily> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Items whose family name contains `name` (case-insensitive)
    pub fn items_in_family(&self, name: &str) -> Vec<&CatalogItem> {
        let needle = name.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.scent_family.to_lowercase().contains(&needle))
            .collect()
    }

    /// All distinct scent types, in first-seen order
    pub fn scent_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(|item| item.scent_type.as_str())
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// All distinct tags, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .items
            .iter()
            .flat_map(|item| item.tags.iter().map(String::as_str))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        tags.sort_unstable();
        tags
    }

    pub fn occasions(&self) -> &[String] {
        &self.occasions
    }

    pub fn moods(&self) -> &[String] {
        &self.moods
    }

    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
