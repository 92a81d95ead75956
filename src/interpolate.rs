//! `${name}` substitution in outgoing payloads.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{Result, TestSpecError};

/// Variable bindings available to payload interpolation.
pub type Variables = HashMap<String, String>;

/// Replace every `${name}` in the string leaves of `value`.
///
/// Object keys are left alone. A `${` without a closing brace is kept
/// literally; an unbound name is an error.
pub fn interpolate(value: &Value, variables: &Variables) -> Result<Value> {
    Ok(match value {
        Value::String(text) => Value::String(interpolate_str(text, variables)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate(item, variables))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, field) in fields {
                out.insert(key.clone(), interpolate(field, variables)?);
            }
            Value::Object(out)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    })
}

fn interpolate_str(text: &str, variables: &Variables) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let name = &after[..end];
        let value = variables
            .get(name)
            .ok_or_else(|| TestSpecError::UnknownVariable {
                name: name.to_string(),
            })?;
        out.push_str(value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
