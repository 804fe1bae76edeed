//! Multi-attribute search over the perfume catalog
//!
//! Pure filtering: passes AND-compose, candidates within one field
//! OR-compose, catalog order is preserved and nothing is re-ranked.

use crate::catalog::{Catalog, CatalogItem, Gender, Intensity, PriceRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A structured query. Every field is optional; an absent field means
/// "no constraint on this attribute", not "match empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scent_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scent_family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,

    /// Free-text query, applied as the final narrowing pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl SearchParams {
    /// True when no field constrains the search
    pub fn is_empty(&self) -> bool {
        self.scent_type.is_none()
            && self.scent_family.is_none()
            && self.price_range.is_none()
            && self.notes.is_empty()
            && self.gender.is_none()
            && self.tags.is_empty()
            && self.occasion.is_none()
            && self.mood.is_none()
            && self.season.is_none()
            && self.intensity.is_none()
            && self.query.is_none()
    }

    /// Coerce untrusted tool-call arguments into search params.
    ///
    /// The language model's output is not type-checked against the tool
    /// schema, so nothing here is trusted: unknown fields are ignored,
    /// wrong-typed fields are dropped, and enum values that fail to
    /// parse are dropped rather than erroring.
    pub fn from_model_args(args: &Value) -> Self {
        fn text(args: &Value, key: &str) -> Option<String> {
            args.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        fn text_list(args: &Value, key: &str) -> Vec<String> {
            args.get(key)
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        }

        Self {
            scent_type: text(args, "scentType"),
            scent_family: text(args, "scentFamily"),
            price_range: text(args, "priceRange").and_then(|s| s.parse().ok()),
            notes: text_list(args, "notes"),
            gender: text(args, "gender").and_then(|s| s.parse().ok()),
            tags: text_list(args, "tags"),
            occasion: text(args, "occasion"),
            mood: text(args, "mood"),
            season: text(args, "season"),
            intensity: text(args, "intensity").and_then(|s| s.parse().ok()),
            query: text(args, "query"),
        }
    }
}

/// Search result: matching items in original catalog order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<CatalogItem>,
    pub count: usize,
    pub search_params: SearchParams,
}

/// Matcher over an immutable catalog.
///
/// Holds a shared handle so any number of searches can run
/// concurrently against the same catalog.
#[derive(Debug, Clone)]
pub struct Matcher {
    catalog: Arc<Catalog>,
}

/// Case-insensitive substring match in either direction
fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

impl Matcher {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run every requested filter pass against the catalog.
    ///
    /// Starts with the full catalog and narrows it one pass at a time;
    /// absent fields skip their pass entirely. The free-text `query`
    /// runs last. An empty result is a valid outcome, not an error.
    pub fn search(&self, params: &SearchParams) -> SearchResult {
        let mut results: Vec<&CatalogItem> = self.catalog.items().iter().collect();

        if let Some(ref scent_type) = params.scent_type {
            let term = scent_type.to_lowercase();
            results.retain(|item| self.matches_scent_type(item, &term));
        }

        if let Some(ref family) = params.scent_family {
            let needle = family.to_lowercase();
            results.retain(|item| item.scent_family.to_lowercase().contains(&needle));
        }

        if let Some(price_range) = params.price_range {
            results.retain(|item| item.price_range == price_range);
        }

        if !params.notes.is_empty() {
            let wanted: Vec<String> = params.notes.iter().map(|n| n.to_lowercase()).collect();
            results.retain(|item| {
                let item_notes: Vec<String> =
                    item.notes.all().map(str::to_lowercase).collect();
                wanted.iter().any(|wanted_note| {
                    item_notes
                        .iter()
                        .any(|note| contains_either(note, wanted_note))
                })
            });
        }

        if let Some(gender) = params.gender {
            // Unisex items pass every gender filter
            results.retain(|item| item.gender == gender || item.gender == Gender::Unisex);
        }

        if !params.tags.is_empty() {
            let wanted: Vec<String> = params.tags.iter().map(|t| t.to_lowercase()).collect();
            results.retain(|item| {
                wanted
                    .iter()
                    .any(|wanted_tag| Self::matches_tag(item, wanted_tag))
            });
        }

        // Occasion, mood and season are single-value conveniences over
        // the same tag predicate
        for term in [&params.occasion, &params.mood, &params.season]
            .into_iter()
            .flatten()
        {
            let needle = term.to_lowercase();
            results.retain(|item| Self::matches_tag(item, &needle));
        }

        if let Some(intensity) = params.intensity {
            results.retain(|item| item.intensity == intensity);
        }

        if let Some(ref query) = params.query {
            let words: Vec<String> = query
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            results.retain(|item| {
                let blob = Self::searchable_text(item);
                // OR across words: deliberately permissive
                words.iter().any(|word| blob.contains(word.as_str()))
            });
        }

        debug!(
            "Search matched {} of {} items",
            results.len(),
            self.catalog.len()
        );

        let items: Vec<CatalogItem> = results.into_iter().cloned().collect();
        SearchResult {
            count: items.len(),
            items,
            search_params: params.clone(),
        }
    }

    /// Scent-type pass: the item's own descriptor, its family's keyword
    /// set, its description, or any tag may satisfy the term.
    fn matches_scent_type(&self, item: &CatalogItem, term: &str) -> bool {
        if item.scent_type.to_lowercase().contains(term) {
            return true;
        }

        if let Some(family) = self.catalog.family(&item.scent_family) {
            if family
                .keywords
                .iter()
                .any(|kw| contains_either(&kw.to_lowercase(), term))
            {
                return true;
            }
        }

        if item.description.to_lowercase().contains(term) {
            return true;
        }

        item.tags
            .iter()
            .any(|tag| contains_either(&tag.to_lowercase(), term))
    }

    fn matches_tag(item: &CatalogItem, term: &str) -> bool {
        item.tags
            .iter()
            .any(|tag| contains_either(&tag.to_lowercase(), term))
    }

    /// Every textual field of an item concatenated into one lowercase
    /// blob for the free-text pass
    fn searchable_text(item: &CatalogItem) -> String {
        let mut parts: Vec<&str> = vec![
            &item.name,
            &item.brand,
            &item.scent_type,
            &item.scent_family,
            &item.description,
        ];
        parts.extend(item.notes.all());
        parts.extend(item.tags.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn matcher() -> Matcher {
        Matcher::new(Arc::new(Catalog::builtin().unwrap()))
    }

    #[test]
    fn test_no_constraints_returns_full_catalog() {
        let matcher = matcher();
        let result = matcher.search(&SearchParams::default());

        assert_eq!(result.count, matcher.catalog().len());
        assert_eq!(result.count, result.items.len());
    }

    #[test]
    fn test_scent_type_matches_family_keywords() {
        let matcher = matcher();

        // "sea" is a Fresh/Aquatic keyword, not a literal scentType
        let result = matcher.search(&SearchParams {
            scent_type: Some("sea".to_string()),
            ..Default::default()
        });

        assert!(result.items.iter().any(|item| item.id == "p001"));
    }

    #[test]
    fn test_price_range_is_exact() {
        let matcher = matcher();
        let result = matcher.search(&SearchParams {
            price_range: Some(PriceRange::Luxury),
            ..Default::default()
        });

        assert!(result.count > 0);
        assert!(result
            .items
            .iter()
            .all(|item| item.price_range == PriceRange::Luxury));
    }

    #[test]
    fn test_unisex_passes_any_gender_filter() {
        let matcher = matcher();

        for gender in [Gender::Masculine, Gender::Feminine, Gender::Unisex] {
            let result = matcher.search(&SearchParams {
                gender: Some(gender),
                ..Default::default()
            });
            assert!(
                result.items.iter().any(|item| item.gender == Gender::Unisex),
                "unisex items must pass the {gender} filter"
            );
        }
    }

    #[test]
    fn test_notes_match_any_layer_either_direction() {
        let matcher = matcher();
        let result = matcher.search(&SearchParams {
            notes: vec!["vanilla".to_string()],
            ..Default::default()
        });

        // "vanilla" appears in middle/base notes of the amber items
        assert!(result.items.iter().any(|item| item.id == "p004"));
        assert!(result.items.iter().any(|item| item.id == "p011"));
    }

    #[test]
    fn test_intensity_is_exact() {
        let matcher = matcher();
        let result = matcher.search(&SearchParams {
            intensity: Some(Intensity::Light),
            ..Default::default()
        });

        assert!(result.count > 0);
        assert!(result
            .items
            .iter()
            .all(|item| item.intensity == Intensity::Light));
    }

    #[test]
    fn test_query_is_or_over_words() {
        let matcher = matcher();

        // "espresso" matches, "zzzqqq" matches nothing; OR semantics
        // must still include the espresso item
        let result = matcher.search(&SearchParams {
            query: Some("zzzqqq espresso".to_string()),
            ..Default::default()
        });

        assert!(result.items.iter().any(|item| item.id == "p006"));
    }

    #[test]
    fn test_conflicting_filters_yield_empty_not_error() {
        let matcher = matcher();
        let result = matcher.search(&SearchParams {
            scent_type: Some("ocean".to_string()),
            price_range: Some(PriceRange::Luxury),
            intensity: Some(Intensity::Strong),
            query: Some("nonexistent-note".to_string()),
            ..Default::default()
        });

        assert_eq!(result.count, 0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_from_model_args_coerces_untrusted_input() {
        let args = serde_json::json!({
            "scentType": "  ocean ",
            "priceRange": "BUDGET",
            "gender": "feminine",
            "notes": ["vanilla", 42, ""],
            "tags": "not-an-array",
            "intensity": "overwhelming",
            "unknownField": {"nested": true},
            "query": 17
        });

        let params = SearchParams::from_model_args(&args);

        assert_eq!(params.scent_type.as_deref(), Some("ocean"));
        assert_eq!(params.price_range, Some(PriceRange::Budget));
        assert_eq!(params.gender, Some(Gender::Feminine));
        assert_eq!(params.notes, vec!["vanilla".to_string()]);
        assert!(params.tags.is_empty()); // wrong type dropped
        assert!(params.intensity.is_none()); // invalid enum dropped
        assert!(params.query.is_none()); // wrong type dropped
    }

    #[test]
    fn test_from_model_args_empty_object() {
        let params = SearchParams::from_model_args(&serde_json::json!({}));
        assert!(params.is_empty());
    }

    #[test]
    fn test_params_serialize_as_camel_case() {
        let params = SearchParams {
            scent_type: Some("ocean".to_string()),
            price_range: Some(PriceRange::Mid),
            ..Default::default()
        };

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["scentType"], "ocean");
        assert_eq!(json["priceRange"], "mid");
        assert!(json.get("scent_type").is_none());
    }
}
