use crate::error::Result;
use crate::pattern::Pattern;
use crate::runtime::value::Value;

/// Check whether `value` unifies with `pattern`
///
/// Lazy instance fields are evaluated along the way; their errors propagate.
pub fn unify(
    pattern: &Pattern,
    value: &Value,
) -> Result<bool> {
    match pattern {
        Pattern::Wildcard => Ok(true),
        Pattern::Literal(expected) => Ok(value == expected),
        Pattern::Kind(kind) => Ok(value.kind() == *kind),
        Pattern::Tag(tag) => Ok(value.as_instance().is_some_and(|i| i.tag() == tag)),
        Pattern::Data(data) => Ok(data.contains(value)),
        Pattern::Record(entries) => unify_record(entries, value),
        Pattern::List(items) => unify_list(items, value),
        Pattern::Variant { tag, fields } => match value.as_instance() {
            Some(instance) if instance.tag() == tag => {
                for (index, field) in fields.iter().enumerate() {
                    if !unify(field, &instance.field_at(index)?)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        },
    }
}

fn unify_record(
    entries: &[(std::sync::Arc<str>, Pattern)],
    value: &Value,
) -> Result<bool> {
    match value {
        Value::Record(record) => {
            for (key, pattern) in entries {
                match record.get(key) {
                    Some(field) if unify(pattern, field)? => {}
                    _ => return Ok(false),
                }
            }
            Ok(true)
        }
        Value::Instance(instance) => {
            for (key, pattern) in entries {
                if instance.tag().field_index(key).is_none() {
                    return Ok(false);
                }
                if !unify(pattern, &instance.get(key)?)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn unify_list(
    items: &[Pattern],
    value: &Value,
) -> Result<bool> {
    match value {
        Value::List(elements) => {
            if elements.len() != items.len() {
                return Ok(false);
            }
            for (pattern, element) in items.iter().zip(elements.iter()) {
                if !unify(pattern, element)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Value::Instance(instance) => {
            if instance.arity() != items.len() {
                return Ok(false);
            }
            for (pattern, field) in items.iter().zip(instance.fields()) {
                if !unify(pattern, &field?)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}
