use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::client::{ChatRequest, Message};
use crate::error::{Error, Result};
use crate::settings::Settings;

pub const SYSTEM_PROMPT: &str = "You are a factual geography, culture, and world affairs expert.";

/// Facts about one country as returned by the model.
///
/// Deserialization is lenient: every field is optional and scalars/lists are
/// coerced from whatever JSON shape the model chose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryRecord {
    #[serde(deserialize_with = "scalar")]
    pub country: String,
    #[serde(deserialize_with = "scalar")]
    pub continent: String,
    #[serde(deserialize_with = "list")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "scalar")]
    pub population: String,
    #[serde(deserialize_with = "scalar")]
    pub currency: String,
    #[serde(deserialize_with = "scalar")]
    pub area: String,
    #[serde(deserialize_with = "list")]
    pub landmarks: Vec<String>,
    #[serde(deserialize_with = "scalar")]
    pub head_of_state: String,
    #[serde(deserialize_with = "list")]
    pub cultural_events: Vec<String>,
    #[serde(deserialize_with = "scalar")]
    pub food_writeup: String,
    #[serde(deserialize_with = "scalar")]
    pub brief_history: String,
    #[serde(deserialize_with = "list")]
    pub important_people: Vec<String>,
    #[serde(deserialize_with = "scalar")]
    pub current_conflicts: String,
    #[serde(
        rename = "five_youtube_video_titles",
        alias = "youtube_links",
        deserialize_with = "list"
    )]
    pub youtube_links: Vec<String>,
}

impl CountryRecord {
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Name used for the document title and file name.
    pub fn display_name(&self) -> &str {
        match self.country.trim() {
            "" => "country",
            name => name,
        }
    }
}

/// Build the chat request asking for one country's facts.
pub fn country_request(settings: &Settings, country: &str) -> ChatRequest {
    ChatRequest::new(&settings.model)
        .message(Message::system(SYSTEM_PROMPT))
        .message(Message::user(country_prompt(country)))
        .temperature(settings.temperature)
}

pub fn country_prompt(country: &str) -> String {
    format!(
        r#"
Provide factual information for the country "{country}" strictly in JSON format with these fields:

country
continent
languages
population
currency
area
landmarks with small writeup for each landmark
head_of_state
cultural_events with small writeup for each event
food_writeup
brief_history
important_people
current_conflicts
5 youtube links that describe the country (field name: five_youtube_video_titles)

Area should be in square kilometers.
Population and area should be comma separated.
Keep responses concise, accurate, and neutral.
"#
    )
}

fn scalar<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(value_text(&Value::deserialize(d)?))
}

fn list<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(d)? {
        Value::Array(items) => items.iter().map(item_text).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, value_text(v)))
            .collect(),
        other => vec![value_text(&other)],
    };
    Ok(items.into_iter().filter(|s| !s.trim().is_empty()).collect())
}

fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, value_text(v)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

/// List entries that arrive as objects ({"name": .., "writeup": ..}) keep only their values,
/// in the order the reply gave them.
fn item_text(v: &Value) -> String {
    match v {
        Value::Object(map) => map
            .values()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" - "),
        other => value_text(other),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
