//! `${KEY}` placeholder substitution for rendered email bodies.
//!
//! Keys match case-insensitively. Placeholders without a value are left as
//! they are so a later pass (or a reader) can spot them. Substituted values are
//! HTML-escaped.
//!
//! A placeholder is only found when it survives rendering as one text run:
//! a mark boundary inside `${...}` splits it across tags.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::render::escape_html;

fn placeholder_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Values to substitute, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    values: HashMap<String, String>,
}

impl TemplateValues {
    /// Create an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.values.insert(key.as_ref().to_lowercase(), value.into());
    }

    /// Add a value, builder style.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `KEY=VALUE` assignments.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Self::new();
        for assignment in assignments {
            let (key, value) = parse_assignment(assignment.as_ref())?;
            values.insert(key, value);
        }
        Ok(values)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TemplateValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut values = Self::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}

/// Split a `KEY=VALUE` assignment.
pub fn parse_assignment(assignment: &str) -> Result<(&str, &str)> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| Error::Template(format!("expected KEY=VALUE, got '{}'", assignment)))?;
    let key = key.trim();
    if key.is_empty() || key.contains('}') {
        return Err(Error::Template(format!("invalid placeholder key '{}'", key)));
    }
    Ok((key, value))
}

/// Replace every `${KEY}` that has a value.
pub fn fill_placeholders(html: &str, values: &TemplateValues) -> String {
    placeholder_regex()
        .replace_all(html, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => escape_html(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder keys in order of first appearance.
pub fn placeholders(html: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(html) {
        let key = &caps[1];
        if !keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            keys.push(key.to_string());
        }
    }
    keys
}
