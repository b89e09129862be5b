use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::audiofile::{
    AudioKind, MetadataUpdate, NewAudioFile, NewAudiobook, NewPodcast, NewSong,
};

/// The longest permitted name, host, author, narrator or participant entry.
pub const MAX_TEXT_LENGTH: usize = 100;

/// The largest permitted duration, in seconds.
pub const MAX_DURATION: i64 = i32::MAX as i64;

/// The most participants a podcast may list.
pub const MAX_PARTICIPANTS: usize = 10;

const KIND_FIELD: &str = "audiofiletype";

const REQUIRED: &str = "This field is required.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const NOT_IN_PAST: &str = "Ensure this timestamp is in the past.";

/// Validation failures for a payload, keyed by field name. All failing
/// fields are reported together.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalizes a name by stripping surrounding whitespace and decomposing
/// it into Unicode Normalization Form D.
///
/// ```
/// use audiofile::validation::normalize_name;
/// assert_eq!(normalize_name(" hï "), "hï");
/// ```
pub fn normalize_name(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    name.as_ref().trim().nfd().to_string()
}

/// Validates the kind tag of a create request. This runs before any
/// table or ruleset is consulted.
pub fn validate_kind(body: &Value) -> Result<AudioKind, FieldErrors> {
    let value = match body.get(KIND_FIELD) {
        Some(value) => value,
        None => return Err(FieldErrors::single(KIND_FIELD, REQUIRED)),
    };

    value
        .as_str()
        .and_then(|tag| tag.parse::<AudioKind>().ok())
        .ok_or_else(|| {
            FieldErrors::single(
                KIND_FIELD,
                format!("\"{}\" is not a valid choice.", display_value(value)),
            )
        })
}

/// Validates a create payload for the given kind, producing the record
/// to insert or the collected field errors.
pub fn validate_new(kind: AudioKind, metadata: &Value) -> Result<NewAudioFile, FieldErrors> {
    let metadata = as_object(metadata)?;
    let mut fields = Collector::new(metadata);

    let name = fields.text("name", true);
    let duration = fields.integer("duration", true);

    match kind {
        AudioKind::Song => match (name, duration) {
            (Some(name), Some(duration)) if fields.errors.is_empty() => {
                Ok(NewAudioFile::Song(NewSong { name, duration }))
            }
            _ => Err(fields.errors),
        },
        AudioKind::Podcast => {
            let host = fields.text("host", true);
            let participants = fields.text_list("participants");

            match (name, duration, host) {
                (Some(name), Some(duration), Some(host)) if fields.errors.is_empty() => {
                    Ok(NewAudioFile::Podcast(NewPodcast {
                        name,
                        duration,
                        host,
                        participants: participants.unwrap_or_default(),
                    }))
                }
                _ => Err(fields.errors),
            }
        }
        AudioKind::Audiobook => {
            let author = fields.text("author", true);
            let narrator = fields.text("narrator", true);

            match (name, duration, author, narrator) {
                (Some(name), Some(duration), Some(author), Some(narrator))
                    if fields.errors.is_empty() =>
                {
                    Ok(NewAudioFile::Audiobook(NewAudiobook {
                        name,
                        duration,
                        author,
                        narrator,
                    }))
                }
                _ => Err(fields.errors),
            }
        }
    }
}

/// Validates a full (`partial = false`) or partial (`partial = true`)
/// update payload for the given kind. Fields that do not belong to the
/// kind are ignored.
pub fn validate_update(
    kind: AudioKind,
    payload: &Value,
    partial: bool,
) -> Result<MetadataUpdate, FieldErrors> {
    let payload = as_object(payload)?;
    let mut fields = Collector::new(payload);
    let required = !partial;

    let mut update = MetadataUpdate {
        name: fields.text("name", required),
        duration: fields.integer("duration", required),
        uploaded_time: fields.past_timestamp("uploaded_time"),
        ..MetadataUpdate::default()
    };

    match kind {
        AudioKind::Song => {}
        AudioKind::Podcast => {
            update.host = fields.text("host", required);
            update.participants = fields.text_list("participants");
        }
        AudioKind::Audiobook => {
            update.author = fields.text("author", required);
            update.narrator = fields.text("narrator", required);
        }
    }

    if fields.errors.is_empty() {
        Ok(update)
    } else {
        Err(fields.errors)
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    payload.as_object().ok_or_else(|| {
        FieldErrors::single(
            "non_field_errors",
            format!(
                "Invalid data. Expected an object, but got {}.",
                json_type_name(payload)
            ),
        )
    })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Walks one payload's fields, accumulating every failure.
struct Collector<'a> {
    payload: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Collector<'a> {
    fn new(payload: &'a Map<String, Value>) -> Self {
        Collector {
            payload,
            errors: FieldErrors::default(),
        }
    }

    fn text(&mut self, field: &str, required: bool) -> Option<String> {
        let value = match self.payload.get(field) {
            Some(value) => value,
            None => {
                if required {
                    self.errors.push(field, REQUIRED);
                }
                return None;
            }
        };

        let raw = match value.as_str() {
            Some(raw) => raw,
            None => {
                self.errors.push(field, NOT_A_STRING);
                return None;
            }
        };

        let normalized = normalize_name(raw);

        if normalized.chars().count() > MAX_TEXT_LENGTH {
            self.errors.push(
                field,
                format!(
                    "Ensure this field has no more than {} characters.",
                    MAX_TEXT_LENGTH
                ),
            );
            return None;
        }

        Some(normalized)
    }

    fn integer(&mut self, field: &str, required: bool) -> Option<i32> {
        let value = match self.payload.get(field) {
            Some(value) => value,
            None => {
                if required {
                    self.errors.push(field, REQUIRED);
                }
                return None;
            }
        };

        let n = match value.as_i64() {
            Some(n) => n,
            None => {
                self.errors.push(field, NOT_AN_INTEGER);
                return None;
            }
        };

        if n > MAX_DURATION {
            self.errors.push(
                field,
                format!("Ensure this value is less than or equal to {}.", MAX_DURATION),
            );
            return None;
        }

        if n < 0 {
            self.errors
                .push(field, "Ensure this value is greater than or equal to 0.");
            return None;
        }

        Some(n as i32)
    }

    fn text_list(&mut self, field: &str) -> Option<Vec<String>> {
        let value = self.payload.get(field)?;

        let items = match value.as_array() {
            Some(items) => items,
            None => {
                self.errors.push(
                    field,
                    format!(
                        "Expected a list of items but got type \"{}\".",
                        json_type_name(value)
                    ),
                );
                return None;
            }
        };

        if items.len() > MAX_PARTICIPANTS {
            self.errors.push(
                field,
                format!(
                    "List contains {} items, it should contain no more than {}.",
                    items.len(),
                    MAX_PARTICIPANTS
                ),
            );
            return None;
        }

        let mut entries = Vec::with_capacity(items.len());
        let mut valid = true;

        for item in items {
            match item.as_str() {
                Some(raw) => {
                    let normalized = normalize_name(raw);

                    if normalized.chars().count() > MAX_TEXT_LENGTH {
                        self.errors.push(
                            field,
                            format!(
                                "Ensure this field has no more than {} characters.",
                                MAX_TEXT_LENGTH
                            ),
                        );
                        valid = false;
                    } else {
                        entries.push(normalized);
                    }
                }
                None => {
                    self.errors.push(field, NOT_A_STRING);
                    valid = false;
                }
            }
        }

        if valid {
            Some(entries)
        } else {
            None
        }
    }

    fn past_timestamp(&mut self, field: &str) -> Option<OffsetDateTime> {
        let value = self.payload.get(field)?;

        let seconds = match value.as_i64() {
            Some(seconds) => seconds,
            None => {
                self.errors.push(field, NOT_AN_INTEGER);
                return None;
            }
        };

        let timestamp = OffsetDateTime::from_unix_timestamp(seconds);

        if timestamp > OffsetDateTime::now_utc() {
            self.errors.push(field, NOT_IN_PAST);
            return None;
        }

        Some(timestamp)
    }
}
