use std::collections::HashMap;

use serde_json::Value;

/// Per-locale string tables. A regional locale such as `en-US` falls back
/// to its base language `en`, and a key missing everywhere resolves to the
/// key itself so a misconfigured table degrades visibly instead of
/// panicking mid-session.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    resources: HashMap<String, Value>,
}

impl Translator {
    pub fn new() -> Translator {
        Translator::default()
    }

    /// Registers the string table for a locale. The table is a JSON object
    /// whose values may be strings or structured data such as recipe maps.
    pub fn with_locale(mut self, locale: &str, table: Value) -> Translator {
        self.resources.insert(locale.to_string(), table);
        self
    }

    pub fn translate(&self, locale: &str, key: &str) -> Value {
        if let Some(value) = self.lookup(locale, key) {
            return value.clone();
        }
        if let Some((base_language, _)) = locale.split_once('-') {
            if let Some(value) = self.lookup(base_language, key) {
                return value.clone();
            }
        }
        Value::String(key.to_string())
    }

    pub fn translate_text(&self, locale: &str, key: &str) -> String {
        match self.translate(locale, key) {
            Value::String(text) => text,
            other => other.to_string(),
        }
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&Value> {
        self.resources.get(locale)?.get(key)
    }
}

/// Replaces each `%s` in the template with the next argument. Placeholders
/// without a matching argument are left as-is.
pub fn interpolate(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut parts = template.split("%s");
    if let Some(first) = parts.next() {
        result.push_str(first);
    }

    let mut remaining = args.iter();
    for part in parts {
        match remaining.next() {
            Some(argument) => result.push_str(argument),
            None => result.push_str("%s"),
        }
        result.push_str(part);
    }
    result
}
