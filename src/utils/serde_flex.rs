//! Lenient serde adapters for job records. A field that cannot be read
//! becomes `None` (or empty) instead of failing the whole record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

pub fn deserialize_f64_flexible<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().replace(',', "").parse().ok(),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

pub fn deserialize_bool_flexible<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
        String(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<BoolOrInt>::deserialize(deserializer)? {
        Some(BoolOrInt::Bool(b)) => Some(b),
        Some(BoolOrInt::Int(i)) => Some(i != 0),
        Some(BoolOrInt::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Some(BoolOrInt::Other(_)) | None => None,
    })
}

/// Text fields that some providers occasionally send as numbers.
pub fn deserialize_string_flexible<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Skill lists: a JSON array (non-strings skipped) or a comma separated string.
pub fn deserialize_strings_flexible<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(serde_json::Value::String(s)) => s.split(',').map(|part| part.trim().to_string()).collect(),
        _ => Vec::new(),
    })
}

/// Ids arrive as numbers from some providers and strings from others.
pub fn deserialize_id_flexible<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Plain flag: anything unreadable counts as `false`.
pub fn deserialize_flag_flexible<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_bool_flexible(deserializer)?.unwrap_or(false))
}

pub fn deserialize_datetime_flexible<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "deserialize_f64_flexible")]
        salary: Option<f64>,
        #[serde(default, deserialize_with = "deserialize_bool_flexible")]
        remote: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_id_flexible")]
        id: Option<String>,
        #[serde(default, deserialize_with = "deserialize_string_flexible")]
        title: Option<String>,
        #[serde(default, deserialize_with = "deserialize_strings_flexible")]
        skills: Vec<String>,
        #[serde(default, deserialize_with = "deserialize_flag_flexible")]
        synthetic: bool,
        #[serde(default, deserialize_with = "deserialize_datetime_flexible")]
        fetched_at: Option<DateTime<Utc>>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).expect("sample parses")
    }

    #[test]
    fn numbers_survive_string_encoding() {
        assert_eq!(sample(r#"{"salary": "52,000"}"#).salary, Some(52_000.0));
        assert_eq!(sample(r#"{"salary": 41000.5}"#).salary, Some(41_000.5));
        assert_eq!(sample(r#"{"salary": "competitive"}"#).salary, None);
        assert_eq!(sample(r#"{"salary": {"amount": 1}}"#).salary, None);
        assert_eq!(sample(r#"{"salary": null}"#).salary, None);
        assert_eq!(sample(r#"{}"#).salary, None);
    }

    #[test]
    fn booleans_accept_ints_and_strings() {
        assert_eq!(sample(r#"{"remote": 1}"#).remote, Some(true));
        assert_eq!(sample(r#"{"remote": "false"}"#).remote, Some(false));
        assert_eq!(sample(r#"{"remote": "maybe"}"#).remote, None);
        assert!(sample(r#"{"synthetic": "yes"}"#).synthetic);
        assert!(!sample(r#"{"synthetic": [1]}"#).synthetic);
    }

    #[test]
    fn ids_accept_numbers() {
        assert_eq!(sample(r#"{"id": 4815}"#).id.as_deref(), Some("4815"));
        assert_eq!(sample(r#"{"id": " abc "}"#).id.as_deref(), Some("abc"));
        assert_eq!(sample(r#"{"id": ""}"#).id, None);
    }

    #[test]
    fn text_and_lists_tolerate_odd_shapes() {
        assert_eq!(sample(r#"{"title": 42}"#).title.as_deref(), Some("42"));
        assert_eq!(sample(r#"{"title": ["x"]}"#).title, None);
        assert_eq!(sample(r#"{"skills": ["Go", 3, "SQL"]}"#).skills, vec!["Go", "SQL"]);
        assert_eq!(sample(r#"{"skills": "Go, SQL"}"#).skills, vec!["Go", "SQL"]);
        assert!(sample(r#"{"skills": {"a": 1}}"#).skills.is_empty());
    }

    #[test]
    fn timestamps_fall_back_to_none() {
        assert!(sample(r#"{"fetched_at": "2024-05-01T10:00:00Z"}"#).fetched_at.is_some());
        assert!(sample(r#"{"fetched_at": "yesterday"}"#).fetched_at.is_none());
        assert!(sample(r#"{"fetched_at": 17}"#).fetched_at.is_none());
    }
}
