//! Intrinsic visual configuration of a node.
//!
//! A [`ViewConfiguration`] names the native view class backing a node and the attributes to
//! apply to it. Arbor treats it as opaque data and hands it to the host as-is.

use std::borrow::Cow;

/// Class name and attributes of the native view behind a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewConfiguration {
    class: Cow<'static, str>,
    attributes: Vec<(Cow<'static, str>, String)>,
}

impl ViewConfiguration {
    /// Creates a configuration for the given native view class.
    #[must_use]
    pub fn new(class: impl Into<Cow<'static, str>>) -> Self {
        Self {
            class: class.into(),
            attributes: Vec::new(),
        }
    }

    /// Sets an attribute, replacing an earlier value with the same name.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
        self
    }

    /// Returns the native view class.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_ref(), value.as_str()))
    }

    /// Whether no attributes are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
