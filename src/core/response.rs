//! Parsers for model replies.
//!
//! The prompts ask for strict JSON, but models still wrap replies in Markdown
//! fences, add a sentence before the object, or fall back to the older flat
//! `{"entity": "transliteration"}` shape. These parsers normalise those cases
//! and report anything they cannot recover instead of dropping it.

use crate::domain::model::EntityExtraction;
use crate::utils::error::{Result, ServiceError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").unwrap());

/// Returns the contents of the first fenced block, or the whole reply,
/// trimmed either way.
pub fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

pub fn parse_transliteration(raw: &str) -> Result<String> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ServiceError::parse("model returned an empty reply"));
    }

    if !body.contains(['{', '[']) {
        // Plain-text reply: accept it as the transliteration itself.
        let text = strip_matching_quotes(body).trim();
        if text.is_empty() {
            return Err(ServiceError::parse("model returned an empty reply"));
        }
        return Ok(text.to_string());
    }

    let object = json_object_span(body)?;
    let value: Value = serde_json::from_str(object)
        .map_err(|e| ServiceError::parse(format!("reply looks like JSON but is invalid: {}", e)))?;

    match value.get("transliteration") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(ServiceError::parse("'transliteration' is empty")),
        Some(other) => Err(ServiceError::parse(format!(
            "'transliteration' must be a string, got {}",
            json_type(other)
        ))),
        None => Err(ServiceError::parse(
            "reply object has no 'transliteration' field",
        )),
    }
}

pub fn parse_entities(raw: &str) -> Result<EntityExtraction> {
    let body = strip_code_fence(raw);
    let object = json_object_span(body)?;

    let value: Value = serde_json::from_str(object).map_err(|e| {
        ServiceError::parse(format!("could not decode entity JSON: {}", e))
    })?;
    let object = value
        .as_object()
        .ok_or_else(|| ServiceError::parse("entity reply is not a JSON object"))?;

    let mut collector = EntityCollector::default();
    match object.get("entities") {
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                collector.add_item(index, item);
            }
        }
        Some(Value::Object(map)) => collector.add_map(map),
        Some(other) => {
            return Err(ServiceError::parse(format!(
                "'entities' must be an array or an object, got {}",
                json_type(other)
            )))
        }
        None => collector.add_map(object),
    }

    Ok(collector.finish())
}

#[derive(Default)]
struct EntityCollector {
    result: EntityExtraction,
}

impl EntityCollector {
    fn add_map(&mut self, map: &Map<String, Value>) {
        for (original, value) in map {
            match scalar_text(value) {
                Some(transliterated) => self.add_pair(original, &transliterated),
                None => self.warn(format!(
                    "entity '{}' has a non-text transliteration ({})",
                    original.trim(),
                    json_type(value)
                )),
            }
        }
    }

    fn add_item(&mut self, index: usize, item: &Value) {
        match item {
            Value::Object(fields) => {
                let original = first_text(fields, &["original", "entity", "text"]);
                let transliterated =
                    first_text(fields, &["transliterated", "transliteration", "value"]);
                match (original, transliterated) {
                    (Some(o), Some(t)) => self.add_pair(&o, &t),
                    (Some(o), None) => self.warn(format!(
                        "entity '{}' has no 'transliterated' value",
                        o.trim()
                    )),
                    (None, _) => self.warn(format!("entity #{} has no 'original' value", index)),
                }
            }
            Value::Array(pair) if pair.len() == 2 => {
                match (scalar_text(&pair[0]), scalar_text(&pair[1])) {
                    (Some(o), Some(t)) => self.add_pair(&o, &t),
                    _ => self.warn(format!("entity #{} is not a pair of strings", index)),
                }
            }
            Value::String(line) => match split_pair_line(line) {
                Some((o, t)) => self.add_pair(o, t),
                None => self.warn(format!(
                    "entity #{} could not be split into original and transliteration: {}",
                    index,
                    preview(line)
                )),
            },
            other => self.warn(format!(
                "entity #{} has unexpected type {}",
                index,
                json_type(other)
            )),
        }
    }

    fn add_pair(&mut self, original: &str, transliterated: &str) {
        let original = original.trim();
        let transliterated = transliterated.trim();

        if original.is_empty() {
            self.warn(format!(
                "skipped a transliteration '{}' with an empty original entity",
                transliterated
            ));
            return;
        }
        if transliterated.is_empty() {
            self.warn(format!("entity '{}' has an empty transliteration", original));
            return;
        }

        match self.result.entities.get(original) {
            Some(existing) if existing == transliterated => {}
            Some(existing) => {
                let message = format!(
                    "entity '{}' has conflicting transliterations; kept '{}', ignored '{}'",
                    original, existing, transliterated
                );
                self.warn(message);
            }
            None => {
                self.result
                    .entities
                    .insert(original.to_string(), transliterated.to_string());
            }
        }
    }

    fn warn(&mut self, message: String) {
        self.result.warnings.push(message);
    }

    fn finish(self) -> EntityExtraction {
        self.result
    }
}

/// Slices from the first `{` to the last `}`, dropping prose around the object.
fn json_object_span(body: &str) -> Result<&str> {
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&body[start..=end]),
        _ => Err(ServiceError::parse(format!(
            "no JSON object found in model reply: {}",
            preview(body)
        ))),
    }
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| fields.get(*key))
        .and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Recovers `"Guwahati -> গুৱাহাটী"`, `"Guwahati → গুৱাহাটী"` and
/// `"Guwahati: গুৱাহাটী"`.
fn split_pair_line(line: &str) -> Option<(&str, &str)> {
    ["->", "→", "=>", ":"].iter().find_map(|sep| {
        line.split_once(*sep)
            .filter(|(o, t)| !o.trim().is_empty() && !t.trim().is_empty())
    })
}

fn strip_matching_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 120;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{}…", head)
    }
}
