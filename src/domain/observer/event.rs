//! Log levels, context and template rendering

use std::fmt;

use serde::Serialize;

use crate::domain::criteria::Criteria;

/// Severity of a repository event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// A value attached to an event's context
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    Criteria(Criteria),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(s) => write!(f, "{}", s),
            ContextValue::Criteria(c) => write!(f, "{}", c),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<Criteria> for ContextValue {
    fn from(value: Criteria) -> Self {
        ContextValue::Criteria(value)
    }
}

/// Ordered key/value context of an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    entries: Vec<(&'static str, ContextValue)>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<ContextValue>) -> Self {
        self.entries.push((key, value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl Serialize for LogContext {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Replaces `{name}` placeholders with context values
///
/// Placeholders without a matching key are left untouched.
pub fn render_template(template: &str, context: &LogContext) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('}') {
            Some(end) => {
                let key = &after[..end];

                match context.get(key) {
                    Some(value) => rendered.push_str(&value.to_string()),
                    None => {
                        rendered.push('{');
                        rendered.push_str(key);
                        rendered.push('}');
                    }
                }

                rest = &after[end + 1..];
            }
            None => {
                rendered.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let context = LogContext::new().with("model", "User").with("id", "id1");

        assert_eq!(
            render_template("find model {model} with id {id}", &context),
            "find model User with id id1"
        );
    }

    #[test]
    fn test_render_criteria() {
        let context = LogContext::new()
            .with("model", "User")
            .with("criteria", Criteria::new().eq("username", "user1"));

        assert_eq!(
            render_template("model {model} with criteria {criteria} not found", &context),
            r#"model User with criteria {"username":"user1"} not found"#
        );
    }

    #[test]
    fn test_unknown_placeholder_left_alone() {
        let context = LogContext::new().with("model", "User");

        assert_eq!(
            render_template("{model} {missing} {unterminated", &context),
            "User {missing} {unterminated"
        );
    }

    #[test]
    fn test_context_display_keeps_order() {
        let context = LogContext::new()
            .with("model", "User")
            .with("criteria", Criteria::new().eq("active", true));

        assert_eq!(
            context.to_string(),
            r#"{"model":"User","criteria":{"active":true}}"#
        );
        assert_eq!(context.keys().collect::<Vec<_>>(), vec!["model", "criteria"]);
    }
}
