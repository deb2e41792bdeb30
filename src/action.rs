//! Actions: named transforms applied to a file resource.
//!
//! An action flattens to `{action: name, ...args[, with_low_priority: 1]}`,
//! which is sent either as a query string (`apply_action`) or URL-encoded as
//! one `action[]` field of a template.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use url::form_urlencoded;

use crate::error::{Result, UnistorageError};

const ACTION_KEY: &str = "action";
const LOW_PRIORITY_KEY: &str = "with_low_priority";

/// A named operation with string-keyed scalar arguments.
///
/// # Examples
///
/// ```
/// # use unistorage::Action;
/// let action = Action::new("resize").arg("mode", "crop").arg("w", 100).arg("h", 100);
/// assert_eq!(action.encode(), "action=resize&mode=crop&w=100&h=100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    name: String,
    args: Vec<(String, String)>,
    low_priority: bool,
}

impl Action {
    /// Create an action without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            low_priority: false,
        }
    }

    /// Add an argument, replacing any previous value for the same key.
    ///
    /// The reserved keys `action` and `with_low_priority` are ignored.
    pub fn arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        if key == ACTION_KEY || key == LOW_PRIORITY_KEY {
            tracing::warn!(key = %key, action = %self.name, "Ignoring reserved action argument");
            return self;
        }
        let value = value.to_string();
        match self.args.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.args.push((key, value)),
        }
        self
    }

    /// Ask the service to schedule this action with low priority.
    pub fn with_low_priority(mut self) -> Self {
        self.low_priority = true;
        self
    }

    /// The action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arguments in insertion order.
    pub fn args(&self) -> &[(String, String)] {
        &self.args
    }

    /// Look up a single argument.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the low priority flag is set.
    pub fn is_low_priority(&self) -> bool {
        self.low_priority
    }

    /// The flat key/value mapping sent to the API.
    pub fn to_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::with_capacity(self.args.len() + 2);
        pairs.push((ACTION_KEY, self.name.as_str()));
        pairs.extend(self.args.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if self.low_priority {
            pairs.push((LOW_PRIORITY_KEY, "1"));
        }
        pairs
    }

    /// URL-encode the flat mapping.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }

    /// Parse a URL-encoded action produced by [`Action::encode`].
    pub fn decode(encoded: &str) -> Result<Self> {
        let mut name = None;
        let mut action = Action::new("");
        for (key, value) in form_urlencoded::parse(encoded.as_bytes()) {
            if key == ACTION_KEY {
                name = Some(value.into_owned());
            } else if key == LOW_PRIORITY_KEY {
                action.low_priority = value != "0";
            } else {
                action = action.arg(key.into_owned(), value);
            }
        }
        action.name = name.ok_or_else(|| {
            UnistorageError::InvalidAction(format!("missing `action` key in {encoded:?}"))
        })?;
        Ok(action)
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let pairs = self.to_pairs();
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (key, value) in pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
