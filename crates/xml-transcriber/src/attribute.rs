/*
 * attribute.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Element attributes.

use crate::{Error, Result};
use std::fmt;

/// An immutable `name="value"` pair attached to an element.
///
/// Two attributes are equal (and hash equally) when their names and values
/// are equal, which is the same as comparing their canonical `name="value"`
/// forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: String,
    value: String,
}

impl Attribute {
    /// Create a new attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is empty.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("attribute name cannot be empty"));
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// Create an attribute with an empty value.
    pub fn named(name: impl Into<String>) -> Result<Self> {
        Self::new(name, String::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Return a copy of this attribute carrying a different value.
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            value: value.into(),
        }
    }

    /// Split the attribute into its name and value.
    pub fn into_parts(self) -> (String, String) {
        (self.name, self.value)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}
