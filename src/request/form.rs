//! Form-urlencoded payloads.
//!
//! Payload types declare their own flat field projection through
//! [`FormEncode`]; nothing is discovered at runtime.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Ordered flat `name → value` fields of a form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Later fields with the same name replace earlier ones.
    pub fn push(&mut self, name: impl Into<String>, value: impl Display) -> &mut Self {
        let name = name.into();
        let value = value.to_string();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Append an optional field; `None` is sent as an empty string.
    pub fn push_opt<V: Display>(&mut self, name: impl Into<String>, value: Option<V>) -> &mut Self {
        match value {
            Some(v) => self.push(name, v),
            None => self.push(name, ""),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.fields {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// JSON object view, used for diagnostics.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(n, v)| (n.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(object)
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (k, v) in iter {
            fields.push(k, v);
        }
        fields
    }
}

/// Flat field projection of a payload sent as a form body.
///
/// ```
/// use multihost_dispatch::request::{FormEncode, FormFields};
///
/// struct Login {
///     user: String,
///     remember: Option<bool>,
/// }
///
/// impl FormEncode for Login {
///     fn form_fields(&self) -> FormFields {
///         let mut fields = FormFields::new();
///         fields.push("user", &self.user).push_opt("remember", self.remember);
///         fields
///     }
/// }
/// ```
pub trait FormEncode {
    fn form_fields(&self) -> FormFields;
}

impl FormEncode for FormFields {
    fn form_fields(&self) -> FormFields {
        self.clone()
    }
}

impl<K: AsRef<str>, V: Display> FormEncode for BTreeMap<K, V> {
    fn form_fields(&self) -> FormFields {
        self.iter().map(|(k, v)| (k.as_ref(), v)).collect()
    }
}

impl<K: AsRef<str>, V: Display, S> FormEncode for HashMap<K, V, S> {
    fn form_fields(&self) -> FormFields {
        self.iter().map(|(k, v)| (k.as_ref(), v)).collect()
    }
}

impl<K: AsRef<str>, V: Display> FormEncode for [(K, V)] {
    fn form_fields(&self) -> FormFields {
        self.iter().map(|(k, v)| (k.as_ref(), v)).collect()
    }
}

impl<K: AsRef<str>, V: Display> FormEncode for Vec<(K, V)> {
    fn form_fields(&self) -> FormFields {
        self.as_slice().form_fields()
    }
}
