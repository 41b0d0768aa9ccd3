//! Person demographics

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditInfo, VoidInfo};

/// Administrative gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Gender {
    M,
    F,
    #[default]
    U,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
            Gender::U => "U",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default)]
    pub preferred: bool,
}

impl PersonName {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            given_name: Some(given_name.into()),
            middle_name: None,
            family_name: Some(family_name.into()),
            preferred: false,
        }
    }

    /// Non-empty name parts in given/middle/family order.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        [&self.given_name, &self.middle_name, &self.family_name]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
    }

    /// "Given Middle Family", skipping missing parts.
    pub fn full_name(&self) -> String {
        self.parts().collect::<Vec<_>>().join(" ")
    }

    pub fn is_blank(&self) -> bool {
        self.parts().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub uuid: Uuid,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub birthdate_estimated: bool,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub names: Vec<PersonName>,
    #[serde(default)]
    pub audit: AuditInfo,
    #[serde(default)]
    pub void_info: VoidInfo,
}

impl Person {
    pub fn new(gender: Gender, names: Vec<PersonName>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            gender,
            birthdate: None,
            birthdate_estimated: false,
            dead: false,
            names,
            audit: AuditInfo::default(),
            void_info: VoidInfo::default(),
        }
    }

    /// The name flagged preferred, else the first one.
    pub fn preferred_name(&self) -> Option<&PersonName> {
        self.names
            .iter()
            .find(|name| name.preferred)
            .or_else(|| self.names.first())
    }

    /// Age in whole years on `today`, if the birthdate is known.
    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        let birthdate = self.birthdate?;
        if birthdate > today {
            return None;
        }
        let mut years = today.year() - birthdate.year();
        if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

crate::impl_record!(Person, void_info);
