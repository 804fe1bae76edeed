/// Integration tests for catalog search
///
/// Exercises the search invariants end-to-end against the built-in
/// catalog and small fixture catalogs.

use scent_catalog::{Catalog, Gender, Intensity, Matcher, PriceRange, SearchParams};
use std::sync::Arc;

fn builtin_matcher() -> Matcher {
    Matcher::new(Arc::new(Catalog::builtin().expect("builtin catalog")))
}

/// Minimal two-family fixture: one ocean item, nothing woody
fn ocean_fixture() -> Matcher {
    let json = r#"{
        "items": [
            {"id": "f1", "name": "Tide", "brand": "Blue", "scentType": "ocean",
             "scentFamily": "Fresh/Aquatic",
             "notes": {"top": ["sea salt"], "middle": [], "base": []},
             "price": 40, "priceRange": "budget", "gender": "unisex",
             "intensity": "light", "description": "A splash of cold water.",
             "tags": ["beach", "summer"]}
        ],
        "scentFamilies": [
            {"name": "Fresh/Aquatic", "keywords": ["ocean", "sea", "marine"]}
        ]
    }"#;
    Matcher::new(Arc::new(Catalog::from_json(json).expect("fixture catalog")))
}

#[test]
fn empty_params_return_entire_catalog_in_order() {
    let matcher = builtin_matcher();
    let result = matcher.search(&SearchParams::default());

    assert_eq!(result.count, matcher.catalog().len());

    let catalog_ids: Vec<&str> = matcher
        .catalog()
        .items()
        .iter()
        .map(|item| item.id.as_str())
        .collect();
    let result_ids: Vec<&str> = result.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(catalog_ids, result_ids);
}

#[test]
fn search_is_idempotent() {
    let matcher = builtin_matcher();
    let params = SearchParams {
        scent_family: Some("floral".to_string()),
        intensity: Some(Intensity::Light),
        ..Default::default()
    };

    let first = matcher.search(&params);
    let second = matcher.search(&params);

    let first_ids: Vec<&str> = first.items.iter().map(|item| item.id.as_str()).collect();
    let second_ids: Vec<&str> = second.items.iter().map(|item| item.id.as_str()).collect();

    assert_eq!(first.count, second.count);
    assert_eq!(first_ids, second_ids);
}

#[test]
fn results_are_a_subsequence_of_the_catalog() {
    let matcher = builtin_matcher();

    let queries = vec![
        SearchParams::default(),
        SearchParams {
            gender: Some(Gender::Feminine),
            ..Default::default()
        },
        SearchParams {
            query: Some("warm vanilla winter".to_string()),
            ..Default::default()
        },
        SearchParams {
            tags: vec!["cozy".to_string(), "fresh".to_string()],
            ..Default::default()
        },
    ];

    let catalog_ids: Vec<&str> = matcher
        .catalog()
        .items()
        .iter()
        .map(|item| item.id.as_str())
        .collect();

    for params in queries {
        let result = matcher.search(&params);
        assert_eq!(result.count, result.items.len());

        // Every result id must appear in the catalog, in the same
        // relative order
        let mut cursor = 0usize;
        for item in &result.items {
            let pos = catalog_ids[cursor..]
                .iter()
                .position(|id| *id == item.id)
                .unwrap_or_else(|| panic!("{} out of order or synthesized", item.id));
            cursor += pos + 1;
        }
    }
}

#[test]
fn adding_a_constraint_never_grows_the_result() {
    let matcher = builtin_matcher();

    let base = SearchParams {
        gender: Some(Gender::Feminine),
        ..Default::default()
    };
    let narrowed = SearchParams {
        gender: Some(Gender::Feminine),
        price_range: Some(PriceRange::Mid),
        ..Default::default()
    };
    let narrowed_again = SearchParams {
        gender: Some(Gender::Feminine),
        price_range: Some(PriceRange::Mid),
        season: Some("spring".to_string()),
        ..Default::default()
    };

    let a = matcher.search(&base).count;
    let b = matcher.search(&narrowed).count;
    let c = matcher.search(&narrowed_again).count;

    assert!(a >= b, "adding priceRange grew the result ({a} -> {b})");
    assert!(b >= c, "adding season grew the result ({b} -> {c})");
}

#[test]
fn free_text_query_includes_single_word_matches() {
    let matcher = builtin_matcher();

    let single = matcher.search(&SearchParams {
        query: Some("espresso".to_string()),
        ..Default::default()
    });
    let padded = matcher.search(&SearchParams {
        query: Some("espresso xylophone".to_string()),
        ..Default::default()
    });

    assert!(single.count > 0);
    for item in &single.items {
        assert!(
            padded.items.iter().any(|p| p.id == item.id),
            "OR-over-words must keep {}",
            item.id
        );
    }
}

#[test]
fn scent_type_scenario_ocean_vs_forest() {
    let matcher = ocean_fixture();

    let ocean = matcher.search(&SearchParams {
        scent_type: Some("ocean".to_string()),
        ..Default::default()
    });
    assert_eq!(ocean.count, 1);
    assert_eq!(ocean.items[0].id, "f1");

    let forest = matcher.search(&SearchParams {
        scent_type: Some("forest".to_string()),
        ..Default::default()
    });
    assert_eq!(forest.count, 0);
    assert!(forest.items.is_empty());
}

#[test]
fn price_range_scenario_two_budget_one_luxury() {
    let json = r#"{
        "items": [
            {"id": "b1", "name": "Cheap One", "brand": "X", "scentType": "citrus",
             "scentFamily": "Fresh/Citrus",
             "notes": {"top": ["lemon"], "middle": [], "base": []},
             "price": 30, "priceRange": "budget", "gender": "unisex",
             "intensity": "light", "description": "", "tags": []},
            {"id": "b2", "name": "Cheap Two", "brand": "X", "scentType": "musk",
             "scentFamily": "Musk",
             "notes": {"top": ["musk"], "middle": [], "base": []},
             "price": 50, "priceRange": "budget", "gender": "unisex",
             "intensity": "light", "description": "", "tags": []},
            {"id": "l1", "name": "Pricey", "brand": "Y", "scentType": "oud",
             "scentFamily": "Woody",
             "notes": {"top": ["oud"], "middle": [], "base": []},
             "price": 400, "priceRange": "luxury", "gender": "masculine",
             "intensity": "strong", "description": "", "tags": []}
        ],
        "scentFamilies": []
    }"#;
    let matcher = Matcher::new(Arc::new(Catalog::from_json(json).unwrap()));

    let result = matcher.search(&SearchParams {
        price_range: Some(PriceRange::Budget),
        ..Default::default()
    });

    assert_eq!(result.count, 2);
    let ids: Vec<&str> = result.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["b1", "b2"]);
}

#[test]
fn empty_catalog_returns_empty_result_without_error() {
    let matcher = Matcher::new(Arc::new(
        Catalog::from_json(r#"{"items": [], "scentFamilies": []}"#).unwrap(),
    ));

    let result = matcher.search(&SearchParams {
        scent_type: Some("ocean".to_string()),
        ..Default::default()
    });

    assert_eq!(result.count, 0);
    assert!(result.items.is_empty());
}

#[test]
fn params_echo_back_in_the_result() {
    let matcher = builtin_matcher();
    let params = SearchParams {
        mood: Some("cozy".to_string()),
        season: Some("winter".to_string()),
        ..Default::default()
    };

    let result = matcher.search(&params);
    assert_eq!(result.search_params, params);
}
