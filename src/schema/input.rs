//! Mutation input builders

use super::types::{FieldPolicy, VERSION_FIELD};
use crate::types::{Identifier, JsonObject, JsonValue};

/// Copy of `data` without the fields `policy` strips
///
/// Every other field, `id` and `_version` included, is kept unchanged.
pub fn sanitize_update_input(data: &JsonObject, policy: &dyn FieldPolicy) -> JsonObject {
    data.iter()
        .filter(|(field, value)| !policy.strips(field, value))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

/// Update input for a bulk update: the sanitized data addressed to `id`
pub fn update_input(id: &Identifier, data: &JsonObject, policy: &dyn FieldPolicy) -> JsonObject {
    let mut input = sanitize_update_input(data, policy);
    input.insert("id".to_string(), id.to_value());
    input
}

/// Non-null `_version` of the record as the caller last saw it
pub fn previous_version(previous: Option<&JsonValue>) -> Option<&JsonValue> {
    previous
        .and_then(|record| record.get(VERSION_FIELD))
        .filter(|version| !version.is_null())
}

/// Put the prior record's `_version` into `input` unless it already has one
pub fn forward_version(input: &mut JsonObject, previous: Option<&JsonValue>) {
    if let Some(version) = previous_version(previous) {
        input
            .entry(VERSION_FIELD)
            .or_insert_with(|| version.clone());
    }
}

/// Delete input `{id}`, with `_version` forwarded from the prior record
pub fn delete_input(id: &Identifier, previous: Option<&JsonValue>) -> JsonObject {
    let mut input = JsonObject::new();
    input.insert("id".to_string(), id.to_value());
    forward_version(&mut input, previous);
    input
}
