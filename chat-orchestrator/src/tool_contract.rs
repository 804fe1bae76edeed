//! Tool contract: the one callable capability advertised to the model
//!
//! The schema and the behavioral policy are data, not code. Both are
//! sent with every model request; the policy can be swapped out from a
//! file without touching orchestrator logic.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the single tool the model may invoke
pub const SEARCH_PERFUMES: &str = "searchPerfumes";

/// JSON-schema-style parameter description, serialized in the shape
/// the Generative Language API expects
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ParameterSchema>,
}

impl ParameterSchema {
    pub fn string(description: &str) -> Self {
        Self {
            schema_type: "string".to_string(),
            description: Some(description.to_string()),
            allowed_values: Vec::new(),
            items: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn string_enum(description: &str, values: &[&str]) -> Self {
        Self {
            allowed_values: values.iter().map(|v| v.to_string()).collect(),
            ..Self::string(description)
        }
    }

    pub fn string_array(description: &str) -> Self {
        Self {
            schema_type: "array".to_string(),
            description: Some(description.to_string()),
            allowed_values: Vec::new(),
            items: Some(Box::new(Self {
                schema_type: "string".to_string(),
                description: None,
                allowed_values: Vec::new(),
                items: None,
                properties: BTreeMap::new(),
            })),
            properties: BTreeMap::new(),
        }
    }

    pub fn object(properties: BTreeMap<String, ParameterSchema>) -> Self {
        Self {
            schema_type: "object".to_string(),
            description: None,
            allowed_values: Vec::new(),
            items: None,
            properties,
        }
    }
}

/// Declaration of one callable function
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// The `searchPerfumes` declaration: parameter shapes mirror
/// `SearchParams` field for field.
pub fn search_perfumes_declaration() -> FunctionDeclaration {
    let mut properties = BTreeMap::new();

    properties.insert(
        "scentType".to_string(),
        ParameterSchema::string(
            "The type of scent (e.g., ocean, floral, woody, citrus, vanilla, rose, \
             sandalwood, fresh, green, spicy, amber, musk, leather, fruity, coffee, \
             lavender, peach). Extract from user description.",
        ),
    );
    properties.insert(
        "scentFamily".to_string(),
        ParameterSchema::string(
            "The broader scent family category (Fresh/Aquatic, Floral, Woody, \
             Oriental/Amber, Fresh/Citrus, Fresh/Green, Musk, Fruity, Leather, Gourmand)",
        ),
    );
    properties.insert(
        "priceRange".to_string(),
        ParameterSchema::string_enum(
            "Price category: budget (under $70), mid ($70-$150), luxury (over $150)",
            &["budget", "mid", "luxury"],
        ),
    );
    properties.insert(
        "notes".to_string(),
        ParameterSchema::string_array(
            "Specific fragrance notes to search for (e.g., bergamot, sandalwood, vanilla, rose)",
        ),
    );
    properties.insert(
        "gender".to_string(),
        ParameterSchema::string_enum(
            "Gender preference for the fragrance",
            &["masculine", "feminine", "unisex"],
        ),
    );
    properties.insert(
        "occasion".to_string(),
        ParameterSchema::string(
            "The occasion or setting (e.g., date night, office, wedding, party, gym, \
             beach, vacation, everyday, formal, casual, meeting, club, night out, brunch)",
        ),
    );
    properties.insert(
        "mood".to_string(),
        ParameterSchema::string(
            "The mood or vibe (e.g., sexy, romantic, confident, elegant, playful, cozy, \
             fresh, clean, mysterious, bold, sophisticated, calm, energizing, seductive)",
        ),
    );
    properties.insert(
        "season".to_string(),
        ParameterSchema::string_enum(
            "Season the perfume is best suited for",
            &["spring", "summer", "fall", "winter"],
        ),
    );
    properties.insert(
        "intensity".to_string(),
        ParameterSchema::string_enum(
            "How strong/intense the fragrance should be",
            &["light", "moderate", "strong"],
        ),
    );
    properties.insert(
        "tags".to_string(),
        ParameterSchema::string_array(
            "General tags to search for (e.g., gourmand, tropical, zen, vintage, sporty, \
             professional, unique)",
        ),
    );
    properties.insert(
        "query".to_string(),
        ParameterSchema::string("Free text search query for general searches"),
    );

    FunctionDeclaration {
        name: SEARCH_PERFUMES.to_string(),
        description: "Search for perfumes based on scent type, price range, specific notes, \
                      occasion, mood, season, or other criteria. Use this when the user asks \
                      for perfume recommendations or wants to find specific types of fragrances."
            .to_string(),
        parameters: ParameterSchema::object(properties),
    }
}

/// Embedded default behavioral policy
const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../prompts/system_prompt.md");

/// Behavioral policy transmitted to the model on every request:
/// persona, when-to-call rules, keyword-to-parameter mappings, response
/// constraints for speech output, and guardrails against fabricating
/// catalog facts.
#[derive(Debug, Clone)]
pub struct AssistantPolicy {
    pub system_prompt: String,
}

impl Default for AssistantPolicy {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AssistantPolicy {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// Load a replacement policy from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self {
            system_prompt: std::fs::read_to_string(path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_shape() {
        let decl = search_perfumes_declaration();
        assert_eq!(decl.name, SEARCH_PERFUMES);
        assert_eq!(decl.parameters.schema_type, "object");
        assert_eq!(decl.parameters.properties.len(), 11);
    }

    #[test]
    fn test_declaration_serializes_with_enums() {
        let decl = search_perfumes_declaration();
        let json = serde_json::to_value(&decl).unwrap();

        assert_eq!(json["name"], "searchPerfumes");
        assert_eq!(json["parameters"]["type"], "object");
        assert_eq!(
            json["parameters"]["properties"]["priceRange"]["enum"],
            serde_json::json!(["budget", "mid", "luxury"])
        );
        assert_eq!(
            json["parameters"]["properties"]["notes"]["items"]["type"],
            "string"
        );
        // Plain string params carry no enum key at all
        assert!(json["parameters"]["properties"]["scentType"]
            .get("enum")
            .is_none());
    }

    #[test]
    fn test_default_policy_is_nonempty() {
        let policy = AssistantPolicy::default();
        assert!(policy.system_prompt.contains("searchPerfumes"));
        assert!(policy.system_prompt.contains("Sofia"));
    }
}
