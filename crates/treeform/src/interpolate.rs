//! `<% name %>` placeholder substitution
//!
//! Placeholders without a matching data bag entry are left verbatim, so a later pass with a
//! more complete data bag can still resolve them.
use crate::data_bag::DataBag;
use crate::value::Value;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"<%\s*([A-Za-z0-9_.:\-]+)\s*%>").expect("placeholder pattern must compile")
    })
}

/// Replace every known placeholder in `text`
pub fn interpolate<'t>(text: &'t str, data: &DataBag) -> Cow<'t, str> {
    placeholder().replace_all(text, |captures: &Captures| {
        let name = &captures[1];
        match data.get(name) {
            Some(value) => value.to_string(),
            None => {
                tracing::trace!(name, "placeholder left unresolved");
                captures[0].to_string()
            }
        }
    })
}

/// Names of all placeholders in `text`, in order of appearance
pub fn placeholders(text: &str) -> impl Iterator<Item = &str> {
    placeholder()
        .captures_iter(text)
        .filter_map(|captures| captures.get(1).map(|m| m.as_str()))
}

/// Deep copy of `value` with every string interpolated
pub fn resolve(value: &Value, data: &DataBag) -> Value {
    match value {
        Value::String(text) => Value::String(interpolate(text, data).into_owned()),
        Value::Array(items) => Value::Array(items.iter().map(|item| resolve(item, data)).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), resolve(item, data)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}
