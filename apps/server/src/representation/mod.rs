//! Representation engine
//!
//! Converts entity views into ordered JSON objects at a requested detail level.

pub mod custom;
mod engine;

pub use custom::{CustomField, CustomRepresentation};
pub use engine::{
    audit_object, nested, nested_list, represent, Property, Representable,
    RepresentationContext, SimpleObject,
};

use crate::{Error, Result};

/// Detail level requested through the `v` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Representation {
    Ref,
    #[default]
    Default,
    Full,
    Custom(CustomRepresentation),
}

/// Fixed levels used by per-resource property tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ref,
    Default,
    Full,
}

impl From<Level> for Representation {
    fn from(level: Level) -> Self {
        match level {
            Level::Ref => Representation::Ref,
            Level::Default => Representation::Default,
            Level::Full => Representation::Full,
        }
    }
}

impl Representation {
    /// Parse a `v` parameter value; absent means `default`.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(Representation::Default);
        };

        if let Some(rest) = value.strip_prefix("custom:") {
            return Ok(Representation::Custom(CustomRepresentation::parse(rest)?));
        }

        Self::named(value).ok_or_else(|| {
            Error::BadRequest(format!(
                "Unknown representation '{value}', expected ref, default, full or custom:(...)"
            ))
        })
    }

    /// Look up a fixed level by name.
    pub fn named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ref" => Some(Representation::Ref),
            "default" => Some(Representation::Default),
            "full" => Some(Representation::Full),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self {
            Representation::Ref => Some(Level::Ref),
            Representation::Default => Some(Level::Default),
            Representation::Full => Some(Level::Full),
            Representation::Custom(_) => None,
        }
    }
}
