use rand::seq::SliceRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    error::AppError,
    models::activity::{ActivityCategory, ActivityForm},
};

pub const SUGGESTION_COUNT: usize = 5;

const MOODS: [&str; 6] = [
    "hidden gems away from the crowds",
    "local food and markets",
    "relaxed and slow-paced",
    "history and culture",
    "outdoors and nature",
    "nightlife and evening atmosphere",
];

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "cost_text")]
    pub cost: Option<String>,
    #[serde(default, deserialize_with = "loose_category")]
    pub category: ActivityCategory,
}

impl Suggestion {
    pub fn into_form(self) -> ActivityForm {
        let mut notes = Vec::new();
        if !self.description.trim().is_empty() {
            notes.push(self.description.trim().to_string());
        }
        if let Some(cost) = self.cost.filter(|cost| !cost.trim().is_empty()) {
            notes.push(format!("Estimated cost: {}", cost.trim()));
        }
        ActivityForm {
            category: Some(self.category),
            title: self.title,
            start_time: None,
            duration_minutes: self.duration.or(Some(60)),
            notes: (!notes.is_empty()).then(|| notes.join("\n")),
        }
    }
}

fn loose_category<'de, D>(deserializer: D) -> Result<ActivityCategory, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(ActivityCategory::from_loose)
        .unwrap_or_default())
}

fn cost_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

#[derive(Debug, Clone)]
pub struct SuggestionRequest<'a> {
    pub destination: &'a str,
    pub lodging: Option<&'a str>,
    pub exclude: &'a [String],
}

pub fn pick_mood() -> &'static str {
    MOODS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MOODS[0])
}

pub fn build_prompt(request: &SuggestionRequest<'_>, mood: &str) -> String {
    let mut prompt = format!(
        "You are a travel assistant. Suggest exactly {SUGGESTION_COUNT} activities for a trip to {}.\n",
        request.destination
    );
    if let Some(lodging) = request.lodging.filter(|lodging| !lodging.trim().is_empty()) {
        prompt.push_str(&format!("The traveller is staying at {lodging}; prefer places nearby.\n"));
    }
    prompt.push_str(&format!("Theme for this batch: {mood}.\n"));
    if !request.exclude.is_empty() {
        prompt.push_str(&format!(
            "Do not suggest any of these: {}.\n",
            request.exclude.join(", ")
        ));
    }
    prompt.push_str(
        "Reply with a JSON array only. Each item has the fields \
         \"title\", \"description\", \"duration\" (minutes, number), \"cost\" \
         and \"category\" (one of culture, food, transport, hotel, leisure).",
    );
    prompt
}

pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_suggestions(text: &str) -> Result<Vec<Suggestion>, AppError> {
    serde_json::from_str(strip_code_fences(text))
        .map_err(|err| AppError::external("suggestions", format!("unreadable reply: {err}")))
}

#[derive(Clone)]
pub struct SuggestionService {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl SuggestionService {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            api_url: config.gemini_api_url.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    pub async fn suggest(&self, request: &SuggestionRequest<'_>) -> Result<Vec<Suggestion>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::external("suggestions", "assistant is not configured"))?;
        let mood = pick_mood();
        let prompt = build_prompt(request, mood);
        debug!(destination = request.destination, mood, "requesting suggestions");

        let response = self
            .client
            .post(&self.api_url)
            .header("x-goog-api-key", api_key)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external(
                "suggestions",
                format!("request failed with status {status}: {body}"),
            ));
        }

        let data: Value = response.json().await?;
        let text = data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| AppError::external("suggestions", "reply contained no text"))?;
        let suggestions = parse_suggestions(text)?;
        info!(destination = request.destination, count = suggestions.len(), "suggestions received");
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fences("  [2] "), "[2]");
    }

    #[test]
    fn parses_lenient_fields() {
        let text = r#"```json
[
  {"title":"Colosseum","description":"Arena","duration":90,"cost":"16 EUR","category":"culture"},
  {"title":"Gelato","description":"Snack","duration":"30","cost":4,"category":"dessert"}
]
```"#;
        let suggestions = parse_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].duration, Some(90));
        assert_eq!(suggestions[0].category, ActivityCategory::Culture);
        assert_eq!(suggestions[1].duration, Some(30));
        assert_eq!(suggestions[1].cost.as_deref(), Some("4"));
        assert_eq!(suggestions[1].category, ActivityCategory::Leisure);
    }

    #[test]
    fn garbage_is_an_external_error() {
        assert!(matches!(
            parse_suggestions("Sorry, I can't help"),
            Err(AppError::External { service: "suggestions", .. })
        ));
    }

    #[test]
    fn prompt_carries_context() {
        let exclude = vec!["Colosseum".to_string(), "Pantheon".to_string()];
        let prompt = build_prompt(
            &SuggestionRequest {
                destination: "Rome, Italy",
                lodging: Some("Hotel Forum"),
                exclude: &exclude,
            },
            "local food and markets",
        );
        assert!(prompt.contains("Rome, Italy"));
        assert!(prompt.contains("Hotel Forum"));
        assert!(prompt.contains("Colosseum, Pantheon"));
        assert!(prompt.contains("local food and markets"));
        assert!(MOODS.contains(&pick_mood()));
    }

    #[test]
    fn accepted_suggestion_prefills_form() {
        let form = Suggestion {
            title: "Trastevere dinner".into(),
            description: "Trattoria crawl".into(),
            duration: None,
            cost: Some("40 EUR".into()),
            category: ActivityCategory::Food,
        }
        .into_form();
        assert_eq!(form.category, Some(ActivityCategory::Food));
        assert_eq!(form.title, "Trastevere dinner");
        assert_eq!(form.start_time, None);
        assert_eq!(form.duration_minutes, Some(60));
        assert_eq!(
            form.notes.as_deref(),
            Some("Trattoria crawl\nEstimated cost: 40 EUR")
        );
    }
}
