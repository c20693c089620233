use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Boundary checks applied to decoded request bodies before they reach a service.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// A failed validation rule, rendered into the message clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    NotEmpty,
    GreaterThan(i64),
    AtLeast(i64),
    Email,
}

impl Rule {
    pub fn message(self) -> String {
        match self {
            Rule::Required => "This field is required".to_string(),
            Rule::NotEmpty => "Must not be empty".to_string(),
            Rule::GreaterThan(bound) => format!("Must be greater than {bound}"),
            Rule::AtLeast(bound) => format!("Must be greater than or equal to {bound}"),
            Rule::Email => "Must be a valid email address".to_string(),
        }
    }
}

/// Field name → message, keyed by the JSON field name. Only the first
/// failure per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, rule: Rule) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| rule.message());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn require_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, Rule::Required);
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|value| value.trim().is_empty()) {
            self.push(field, Rule::NotEmpty);
        }
    }

    pub fn require_gt(&mut self, field: &str, value: Option<i64>, bound: i64) {
        match value {
            None => self.push(field, Rule::Required),
            Some(_) => self.optional_gt(field, value, bound),
        }
    }

    pub fn optional_gt(&mut self, field: &str, value: Option<i64>, bound: i64) {
        if value.is_some_and(|value| value <= bound) {
            self.push(field, Rule::GreaterThan(bound));
        }
    }

    pub fn require_gte(&mut self, field: &str, value: Option<i64>, bound: i64) {
        match value {
            None => self.push(field, Rule::Required),
            Some(_) => self.optional_gte(field, value, bound),
        }
    }

    pub fn optional_gte(&mut self, field: &str, value: Option<i64>, bound: i64) {
        if value.is_some_and(|value| value < bound) {
            self.push(field, Rule::AtLeast(bound));
        }
    }

    pub fn require_email(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.push(field, Rule::Required);
        } else if !looks_like_email(value) {
            self.push(field, Rule::Email);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !value.chars().any(char::is_whitespace)
}
