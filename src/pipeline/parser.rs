//! Response extraction: locate the JSON object embedded in raw model output,
//! parse it, and normalize medication names.
//!
//! The JSON is located with the outermost-brace heuristic: the span from the
//! *first* `{` to the *last* `}` in the reply. That tolerates prose
//! preambles, markdown fences, and trailing pleasantries, but a second
//! JSON-like block anywhere in the reply corrupts the slice. The fragility is
//! kept deliberately for compatibility (see the documenting test); do not
//! swap in a stricter JSON-in-text scanner without flagging the behavior
//! change.

use serde_json::Value;

use super::corrector::correct_name;
use super::prompt::SchemaVersion;
use super::types::StructuredRecord;
use super::ExtractError;
use crate::vocabulary::CanonicalVocabulary;

/// Slice the outermost `{`..`}` span out of the reply and parse it as JSON.
///
/// Pure function. Fails with [`ExtractError::MalformedResponse`] when either
/// brace is absent or the slice is not valid JSON; the parse detail is
/// carried in the error.
pub fn extract_json(reply: &str) -> Result<Value, ExtractError> {
    let start = reply.find('{').ok_or_else(|| {
        ExtractError::MalformedResponse("no JSON object boundary found in model reply".into())
    })?;
    let end = reply.rfind('}').ok_or_else(|| {
        ExtractError::MalformedResponse("no JSON object boundary found in model reply".into())
    })?;
    if end < start {
        return Err(ExtractError::MalformedResponse(
            "JSON object boundary is inverted: last '}' precedes first '{'".into(),
        ));
    }

    let slice = reply[start..=end].trim();
    serde_json::from_str(slice)
        .map_err(|e| ExtractError::MalformedResponse(format!("reply is not valid JSON: {e}")))
}

/// Full response-extraction pass: JSON slice, then per-entry medicine-name
/// correction against the vocabulary. Everything else in the object is
/// returned unchanged; the schema contract is enforced by the prompt, not
/// re-validated here.
pub fn parse_reply(
    reply: &str,
    vocabulary: &CanonicalVocabulary,
    schema: SchemaVersion,
) -> Result<StructuredRecord, ExtractError> {
    let mut value = extract_json(reply)?;
    correct_pharmacy_names(&mut value, vocabulary, schema);
    Ok(StructuredRecord::from_value(value, schema))
}

/// Replace each pharmacy entry's medicine name with the corrector's output,
/// preserving entry order and all other fields.
///
/// A single corrected token is stored back as a JSON string; multiple tokens
/// become a JSON array of strings (the corrector does not re-join multi-word
/// names). Entries without a string name, and names that tokenize to
/// nothing, are left untouched, never replaced with an empty string.
fn correct_pharmacy_names(
    value: &mut Value,
    vocabulary: &CanonicalVocabulary,
    schema: SchemaVersion,
) {
    let Some(entries) = value
        .get_mut(schema.pharmacy_key())
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    for entry in entries {
        let Some(object) = entry.as_object_mut() else {
            continue;
        };
        let Some(name) = object.get(schema.medicine_name_key()).and_then(Value::as_str) else {
            continue;
        };

        let mut corrected = correct_name(name, vocabulary);
        let replacement = match corrected.len() {
            0 => continue,
            1 => Value::String(corrected.remove(0)),
            _ => Value::Array(corrected.into_iter().map(Value::String).collect()),
        };
        object.insert(schema.medicine_name_key().to_string(), replacement);
    }
}
