//! Lenient decoding for option-label arrays returned by listing endpoints.

use serde::de::Deserializer;
use serde::Deserialize;
use serde_json::Value;

/// Decodes a JSON array into trimmed labels, coercing numbers and booleans to
/// text and dropping nulls and blanks.
pub(crate) fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().filter_map(coerce_label).collect())
}

fn coerce_label(value: Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => None,
        other => serde_json::to_string(&other).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::deserialize_labels;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "deserialize_labels")]
        items: Vec<String>,
    }

    #[test]
    fn coerces_numbers_and_drops_blanks() {
        let parsed: Wrapper =
            serde_json::from_str(r#"{"items": [" P1 ", 2, null, "", "P3"]}"#).unwrap();
        assert_eq!(parsed.items, vec!["P1", "2", "P3"]);
    }

    #[test]
    fn null_array_is_empty() {
        let parsed: Wrapper = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(parsed.items.is_empty());
    }
}
