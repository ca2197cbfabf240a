use crate::error::CardParseError;
use crate::mochi::RawCard;
use crate::vocab::VocabEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

/// First parenthesised group, e.g. `méi` in `{没}(méi) {V}(V)`
static PINYIN_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.*?)\)").unwrap());

/// A `V` part-of-speech placeholder and the whitespace around it
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\s*)V(\s*)").unwrap());

const ADDED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type JsonObject = Map<String, Value>;

/// Turn one raw card into a vocabulary entry.
///
/// Returns `None` (and logs the raw card) when the card has no pinyin, hanzi
/// or meaning, or when its structure is not what the parser expects.
pub fn parse_card(card: &RawCard) -> Option<VocabEntry> {
    match extract(card) {
        Ok(Some(entry)) => Some(entry),
        Ok(None) => {
            warn!("Skipping card due to missing fields: {}", card);
            None
        }
        Err(e) => {
            warn!("Error parsing card: {}. Raw card: {}", e, card);
            None
        }
    }
}

fn extract(card: &RawCard) -> Result<Option<VocabEntry>, CardParseError> {
    let card = card
        .as_object()
        .ok_or_else(|| CardParseError::NotAnObject("card".to_string()))?;
    let cache = object_field(card, "component-cache")?;

    let pinyin = extract_pinyin(cache)?;
    let hanzi = extract_hanzi(object_field(card, "fields")?)?;
    let meaning = extract_meaning(card, cache)?;
    let added = extract_added(object_field(card, "created-at")?)?;

    if pinyin.is_empty() && hanzi.is_empty() && meaning.is_empty() {
        return Ok(None);
    }

    Ok(Some(VocabEntry {
        pinyin,
        hanzi,
        meaning,
        added,
    }))
}

fn extract_pinyin(cache: Option<&JsonObject>) -> Result<String, CardParseError> {
    let entries = match cache {
        Some(cache) => object_field(cache, "pinyin")?,
        None => None,
    };

    for (key, entry) in entries.into_iter().flatten() {
        let entry = entry
            .as_object()
            .ok_or_else(|| CardParseError::NotAnObject(format!("component-cache.pinyin.{}", key)))?;
        let text = string_field(entry, "text", "component-cache.pinyin.*.text")?;
        if let Some(caps) = PINYIN_GROUP.captures(text) {
            return Ok(caps.get(1).map_or("", |m| m.as_str()).to_string());
        }
    }

    Ok(String::new())
}

fn extract_hanzi(fields: Option<&JsonObject>) -> Result<String, CardParseError> {
    let first = fields
        .into_iter()
        .flatten()
        .find(|(field_id, _)| field_id.as_str() != "name");

    let Some((field_id, field)) = first else {
        return Ok(String::new());
    };
    let field = field
        .as_object()
        .ok_or_else(|| CardParseError::NotAnObject(format!("fields.{}", field_id)))?;

    Ok(strip_placeholders(string_field(field, "value", "fields.*.value")?))
}

fn extract_meaning(card: &JsonObject, cache: Option<&JsonObject>) -> Result<String, CardParseError> {
    let name = match card.get("name") {
        None | Some(Value::Null) => "",
        Some(Value::String(name)) => name.as_str(),
        Some(_) => return Err(CardParseError::NotAString("name".to_string())),
    };
    if !name.is_empty() {
        return Ok(name.to_string());
    }

    // the translate cache is keyed by the meaning text itself
    let translations = match cache {
        Some(cache) => object_field(cache, "translate")?,
        None => None,
    };
    Ok(translations
        .and_then(|t| t.keys().next())
        .cloned()
        .unwrap_or_default())
}

fn extract_added(created_at: Option<&JsonObject>) -> Result<String, CardParseError> {
    let date = match created_at {
        Some(created_at) if created_at.get("date").is_some_and(Value::is_null) => "",
        Some(created_at) => string_field(created_at, "date", "created-at.date")?,
        None => "",
    };
    if date.is_empty() {
        return Ok(String::new());
    }
    format_timestamp(date)
}

/// Reformat an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS` in its own offset
pub fn format_timestamp(raw: &str) -> Result<String, CardParseError> {
    let normalized = match raw.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.format(ADDED_FORMAT).to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.format(ADDED_FORMAT).to_string());
    }
    if let Some(dt) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt.format(ADDED_FORMAT).to_string());
    }

    Err(CardParseError::InvalidTimestamp(raw.to_string()))
}

/// Remove standalone `V` placeholders, then trim.
///
/// A `V` touching an ASCII letter or digit is part of a word and stays.
pub fn strip_placeholders(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(value) {
        let (Some(whole), Some(lead), Some(trail)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let before = if lead.is_empty() {
            value[..whole.start()].chars().next_back()
        } else {
            None
        };
        let after = if trail.is_empty() {
            value[whole.end()..].chars().next()
        } else {
            None
        };
        let in_word = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
        if in_word(before) || in_word(after) {
            continue;
        }

        out.push_str(&value[last..whole.start()]);
        last = whole.end();
    }
    out.push_str(&value[last..]);

    out.trim().to_string()
}

/// `map[key]` as an object. Missing means "nothing there"; any other type is an error.
fn object_field<'a>(map: &'a JsonObject, key: &str) -> Result<Option<&'a JsonObject>, CardParseError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(_) => Err(CardParseError::NotAnObject(key.to_string())),
    }
}

/// `map[key]` as a string, defaulting to empty when missing
fn string_field<'a>(map: &'a JsonObject, key: &str, path: &str) -> Result<&'a str, CardParseError> {
    match map.get(key) {
        None => Ok(""),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(CardParseError::NotAString(path.to_string())),
    }
}
