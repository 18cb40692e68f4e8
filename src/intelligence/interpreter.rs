/// AI query interpreter
///
/// Turns a free-text query ("quick high protein chicken dinner") into a
/// structured `QueryInterpretation` by asking a generative-language model
/// for one JSON object. The model's answer is parsed leniently and
/// validated strictly; anything off yields no interpretation at all.

use crate::config::Config;
use crate::error::{RecipeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Used when the model leaves the time limit open
pub const DEFAULT_MAX_TIME_MINUTES: u32 = 60;

// Every one of these must appear in the model's object
const REQUIRED_KEYS: [&str; 7] = [
    "keywords",
    "cuisine",
    "diet",
    "type",
    "maxTime",
    "minProtein",
    "mood",
];

const PROMPT_TEMPLATE: &str = r#"You are a smart recipe assistant. Analyze the following user search query and extract structured data to help find the best recipes.

User Query: "{query}"

Return ONLY a JSON object with these fields:
- keywords (array of strings): Main ingredients or food terms (e.g., "paneer", "chicken").
- cuisine (string): e.g., Italian, Mexican, North Indian, or null.
- diet (string): e.g., Vegetarian, Vegan, Gluten Free, or null.
- type (string): e.g., Breakfast, Dinner, Snack, or null.
- maxTime (integer): Maximum cooking time in minutes guessed from query (default 60 if not specified).
- minProtein (integer): Minimum protein in grams if "high protein" is mentioned (default 0).
- mood (string): A fun, short 3-word description of the vibe of this meal (e.g., "Cozy Winter Night").

JSON:"#;

/// Structured filter derived from a free-text query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInterpretation {
    pub keywords: Vec<String>,
    pub cuisine: Option<String>,
    pub diet: Option<String>,
    pub meal_type: Option<String>,
    pub max_time_minutes: u32,
    pub min_protein_grams: u32,
    pub mood: String,
}

impl Default for QueryInterpretation {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            cuisine: None,
            diet: None,
            meal_type: None,
            max_time_minutes: DEFAULT_MAX_TIME_MINUTES,
            min_protein_grams: 0,
            mood: String::new(),
        }
    }
}

/// Anything that can interpret a query. Failure is `None`, never an error.
#[async_trait]
pub trait QueryInterpreter: Send + Sync {
    async fn interpret(&self, query: &str) -> Option<QueryInterpretation>;
}

/// The object the model is asked to produce, keys as in the prompt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelAnswer {
    keywords: Vec<String>,
    cuisine: Option<String>,
    diet: Option<String>,
    #[serde(rename = "type")]
    meal_type: Option<String>,
    max_time: Option<f64>,
    min_protein: Option<f64>,
    mood: String,
}

/// Parse the model's free-form reply into an interpretation
///
/// Code fences and any prose around the object are ignored. Every template
/// key must be present; only `cuisine`, `diet`, `type`, `maxTime` and
/// `minProtein` may be null.
pub fn parse_interpretation(text: &str) -> Result<QueryInterpretation> {
    let stripped = text.replace("```json", "").replace("```", "");
    let object = extract_object(&stripped)
        .ok_or_else(|| RecipeError::InterpretationUnavailable("no JSON object in reply".to_string()))?;

    let value: Value = serde_json::from_str(object)?;
    let Value::Object(map) = &value else {
        return Err(RecipeError::InterpretationUnavailable(
            "reply is not a JSON object".to_string(),
        ));
    };
    check_keys(map)?;

    let answer: ModelAnswer = serde_json::from_value(value)?;

    Ok(QueryInterpretation {
        keywords: dedup_keywords(answer.keywords),
        cuisine: non_empty(answer.cuisine),
        diet: non_empty(answer.diet),
        meal_type: non_empty(answer.meal_type),
        max_time_minutes: whole_minutes(answer.max_time).unwrap_or(DEFAULT_MAX_TIME_MINUTES),
        min_protein_grams: whole_minutes(answer.min_protein).unwrap_or(0),
        mood: answer.mood.trim().to_string(),
    })
}

fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn check_keys(map: &Map<String, Value>) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !map.contains_key(*key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RecipeError::InterpretationUnavailable(format!(
            "missing keys: {}",
            missing.join(", ")
        )))
    }
}

// Case-insensitive, first spelling wins
fn dedup_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn whole_minutes(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round().min(u32::MAX as f64) as u32)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Interpreter backed by the Gemini `generateContent` endpoint
pub struct GeminiInterpreter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiInterpreter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from config; `None` when no Gemini key is set
    pub fn from_config(config: &Config, client: reqwest::Client) -> Option<Self> {
        let key = config.gemini_key.as_ref()?;
        Some(Self::new(
            client,
            &config.gemini_base_url,
            &config.gemini_model,
            key,
        ))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response: GenerateContentResponse = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .text()
            .ok_or_else(|| RecipeError::InterpretationUnavailable("empty model reply".to_string()))
    }
}

#[async_trait]
impl QueryInterpreter for GeminiInterpreter {
    async fn interpret(&self, query: &str) -> Option<QueryInterpretation> {
        let prompt = PROMPT_TEMPLATE.replace("{query}", query.trim());

        let reply = match self.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Query interpretation request failed");
                return None;
            }
        };

        match parse_interpretation(&reply) {
            Ok(interpretation) => {
                debug!(?interpretation, "Query interpreted");
                Some(interpretation)
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed interpretation");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRY_REPLY: &str = r#"{
        "keywords": ["chicken", "curry", "Chicken"],
        "cuisine": "North Indian",
        "diet": null,
        "type": "Dinner",
        "maxTime": 45,
        "minProtein": 30,
        "mood": "Cozy Spicy Evening"
    }"#;

    #[test]
    fn test_parse_plain_object() {
        let interpretation = parse_interpretation(CURRY_REPLY).unwrap();

        assert_eq!(interpretation.keywords, vec!["chicken", "curry"]);
        assert_eq!(interpretation.cuisine.as_deref(), Some("North Indian"));
        assert_eq!(interpretation.diet, None);
        assert_eq!(interpretation.meal_type.as_deref(), Some("Dinner"));
        assert_eq!(interpretation.max_time_minutes, 45);
        assert_eq!(interpretation.min_protein_grams, 30);
        assert_eq!(interpretation.mood, "Cozy Spicy Evening");
    }

    #[test]
    fn test_parse_fenced_and_prose_wrapped() {
        let fenced = format!("```json\n{}\n```", CURRY_REPLY);
        assert!(parse_interpretation(&fenced).is_ok());

        let prose = format!("Sure! Here is the JSON you asked for:\n{}\nEnjoy your meal.", CURRY_REPLY);
        assert_eq!(
            parse_interpretation(&prose).unwrap(),
            parse_interpretation(CURRY_REPLY).unwrap()
        );
    }

    #[test]
    fn test_null_limits_take_defaults() {
        let reply = r#"{"keywords": [], "cuisine": null, "diet": null, "type": null,
                        "maxTime": null, "minProtein": null, "mood": "Lazy Sunday"}"#;
        let interpretation = parse_interpretation(reply).unwrap();

        assert!(interpretation.keywords.is_empty());
        assert_eq!(interpretation.max_time_minutes, DEFAULT_MAX_TIME_MINUTES);
        assert_eq!(interpretation.min_protein_grams, 0);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let reply = r#"{"keywords": ["rice"], "cuisine": null, "diet": null,
                        "maxTime": 20, "minProtein": 0, "mood": "Quick"}"#;

        match parse_interpretation(reply) {
            Err(RecipeError::InterpretationUnavailable(msg)) => assert!(msg.contains("type")),
            other => panic!("Expected InterpretationUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_null_mood_is_rejected() {
        let reply = r#"{"keywords": [], "cuisine": null, "diet": null, "type": null,
                        "maxTime": 20, "minProtein": 0, "mood": null}"#;
        assert!(parse_interpretation(reply).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_interpretation("I couldn't work that out, sorry.").is_err());
        assert!(parse_interpretation("} nope {").is_err());
        assert!(parse_interpretation("{ not json }").is_err());
    }

    #[test]
    fn test_generate_content_payload() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "```json\n{" }, { "text": "}\n```" }] }
            }]
        }))
        .unwrap();
        assert_eq!(response.text().unwrap(), "```json\n{}\n```");

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_from_config_needs_a_key() {
        let config = Config::default();
        assert!(GeminiInterpreter::from_config(&config, reqwest::Client::new()).is_none());

        let config = Config {
            gemini_key: Some("abc".to_string()),
            ..Config::default()
        };
        assert!(GeminiInterpreter::from_config(&config, reqwest::Client::new()).is_some());
    }

    #[tokio::test]
    async fn test_unreachable_service_yields_none() {
        let interpreter = GeminiInterpreter::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/v1beta",
            "gemini-pro",
            "key",
        );

        assert!(interpreter.interpret("high protein chicken curry").await.is_none());
    }
}
