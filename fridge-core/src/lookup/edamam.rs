//! Client for the Edamam food-database parser endpoint.
//!
//! Response shape (only the fields read here):
//!
//! ```json
//! {
//!   "parsed": [{"food": {"label": "Apple", "category": "Generic foods",
//!               "nutrients": {"ENERC_KCAL": 52, "PROCNT": 0.26}}}],
//!   "hints":  [ ...same entry shape... ]
//! }
//! ```
//!
//! `parsed` holds exact matches. When it is empty the `hints` list is used.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{FoodLookup, LookupError};
use crate::models::FoodItem;

/// Public Edamam API host.
pub const DEFAULT_BASE_URL: &str = "https://api.edamam.com";

const PARSER_PATH: &str = "/api/food-database/v2/parser";

#[derive(Deserialize)]
struct ParserResponse {
    parsed: Vec<Value>,
    hints: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct Entry {
    food: Food,
}

#[derive(Deserialize)]
struct Food {
    label: String,
    category: String,
    nutrients: Nutrients,
}

#[derive(Deserialize)]
struct Nutrients {
    #[serde(rename = "ENERC_KCAL")]
    energy: f64,
    #[serde(rename = "PROCNT")]
    protein: f64,
}

/// HTTP client for the food database.
#[derive(Debug, Clone)]
pub struct EdamamClient {
    base_url: String,
    app_id: String,
    app_key: String,
    client: reqwest::Client,
}

impl EdamamClient {
    /// Creates a client against the public API host.
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, app_id, app_key)
    }

    /// Creates a client against a custom host (proxies, test servers).
    pub fn with_base_url(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_id: app_id.into(),
            app_key: app_key.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, query: &str) -> String {
        format!(
            "{}{}?app_id={}&app_key={}&ingr={}",
            self.base_url.trim_end_matches('/'),
            PARSER_PATH,
            urlencoding::encode(&self.app_id),
            urlencoding::encode(&self.app_key),
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl FoodLookup for EdamamClient {
    async fn fetch_candidates(&self, query: &str) -> Result<Vec<FoodItem>, LookupError> {
        let response = self
            .client
            .get(self.build_url(query))
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        parse_candidates(&body)
    }
}

/// Extracts food items from a parser response body.
///
/// Any malformed entry fails the whole response.
pub fn parse_candidates(body: &str) -> Result<Vec<FoodItem>, LookupError> {
    let response: ParserResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    let entries = if response.parsed.is_empty() {
        response
            .hints
            .ok_or_else(|| LookupError::Parse("missing field `hints`".to_string()))?
    } else {
        response.parsed
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let entry: Entry = serde_json::from_value(value)
                .map_err(|e| LookupError::Parse(format!("entry {}: {}", index, e)))?;
            let food = entry.food;
            Ok(FoodItem::new(
                food.label,
                food.category,
                food.nutrients.energy as i32,
                food.nutrients.protein as i32,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parsed_entries() {
        let body = r#"{"parsed":[{"food":{"label":"Apple","category":"Generic foods","nutrients":{"ENERC_KCAL":52,"PROCNT":0}}}],"hints":[]}"#;
        let items = parse_candidates(body).unwrap();
        assert_eq!(items, vec![FoodItem::new("Apple", "Generic foods", 52, 0)]);
    }

    #[test]
    fn test_parse_falls_back_to_hints() {
        let body = r#"{
            "parsed": [],
            "hints": [
                {"food": {"label": "Apple Pie", "category": "Generic meals",
                          "nutrients": {"ENERC_KCAL": 237, "PROCNT": 1.9}}},
                {"food": {"label": "Apple Juice", "category": "Generic foods",
                          "nutrients": {"ENERC_KCAL": 46.0, "PROCNT": 0.1}}}
            ]
        }"#;
        let items = parse_candidates(body).unwrap();
        assert_eq!(
            items,
            vec![
                FoodItem::new("Apple Pie", "Generic meals", 237, 1),
                FoodItem::new("Apple Juice", "Generic foods", 46, 0),
            ]
        );
    }

    #[test]
    fn test_parse_prefers_parsed_over_hints() {
        let body = r#"{
            "parsed": [{"food": {"label": "Egg", "category": "Generic foods",
                                 "nutrients": {"ENERC_KCAL": 143, "PROCNT": 12.6}}}],
            "hints": [{"food": {"label": "Egg Salad", "category": "Generic meals",
                                "nutrients": {"ENERC_KCAL": 200, "PROCNT": 9}}}]
        }"#;
        let items = parse_candidates(body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Egg");
        assert_eq!(items[0].protein, 12);
    }

    #[test]
    fn test_parse_ignores_malformed_hints_when_parsed_present() {
        let body = r#"{"parsed":[{"food":{"label":"Egg","category":"Generic foods","nutrients":{"ENERC_KCAL":143,"PROCNT":12}}}],"hints":[{"bogus":true}]}"#;
        assert_eq!(parse_candidates(body).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_both_empty_is_no_matches() {
        let items = parse_candidates(r#"{"parsed":[],"hints":[]}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_candidates("Network Error! Please check network connection.").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_missing_parsed() {
        let err = parse_candidates(r#"{"hints":[]}"#).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_missing_hints_with_empty_parsed() {
        let err = parse_candidates(r#"{"parsed":[]}"#).unwrap_err();
        assert_eq!(err, LookupError::Parse("missing field `hints`".to_string()));
    }

    #[test]
    fn test_parse_entry_missing_nutrient() {
        let body = r#"{"parsed":[{"food":{"label":"Salt","category":"Generic foods","nutrients":{"ENERC_KCAL":0}}}],"hints":[]}"#;
        let err = parse_candidates(body).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_build_url_encodes_query() {
        let client = EdamamClient::with_base_url("https://food.example.com/", "id1", "key1");
        assert_eq!(
            client.build_url("green apple"),
            "https://food.example.com/api/food-database/v2/parser?app_id=id1&app_key=key1&ingr=green%20apple"
        );
    }

    #[test]
    fn test_default_base_url() {
        let client = EdamamClient::new("id", "key");
        assert_eq!(client.base_url(), "https://api.edamam.com");
    }

    #[test]
    fn test_error_kinds() {
        assert!(LookupError::Network("refused".into()).is_network());
        assert!(LookupError::Status(500).is_network());
        assert!(!LookupError::Status(500).is_parse());
    }
}
