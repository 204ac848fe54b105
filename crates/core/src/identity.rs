//! Stable identity of a class occurrence.
//!
//! An occurrence is identified by the composite `(kind, source_id, date)`.
//! Regular and special instances live in disjoint namespaces because the
//! kind is part of the key itself, so two distinct triples can never map to
//! the same identity regardless of how large the source ids grow.
//!
//! The canonical text form is `<kind>:<source_id>:<YYYY-MM-DD>`, e.g.
//! `regular:12:2025-07-05`. It is used as the storage primary key and as a
//! URL path segment, and parses back to the same key.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::types::DbId;

/// Date format used inside the canonical key text.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which kind of template an instance was projected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    /// Weekly recurring schedule slot.
    Regular,
    /// One-off special session.
    Special,
}

impl InstanceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceKind::Regular => "regular",
            InstanceKind::Special => "special",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(InstanceKind::Regular),
            "special" => Ok(InstanceKind::Special),
            other => Err(CoreError::Validation(format!(
                "Invalid instance kind '{other}'. Must be one of: regular, special"
            ))),
        }
    }
}

/// Identity of one class occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
    pub kind: InstanceKind,
    /// Id of the schedule template (regular) or special session (special).
    pub source_id: DbId,
    pub date: NaiveDate,
}

impl InstanceKey {
    pub fn regular(template_id: DbId, date: NaiveDate) -> Self {
        Self {
            kind: InstanceKind::Regular,
            source_id: template_id,
            date,
        }
    }

    pub fn special(session_id: DbId, date: NaiveDate) -> Self {
        Self {
            kind: InstanceKind::Special,
            source_id: session_id,
            date,
        }
    }
}

/// Derive the identity of the occurrence of `source_id` on `date`.
///
/// Injective over `(kind, source_id, date)`: the key *is* the triple.
pub fn derive_identity(kind: InstanceKind, source_id: DbId, date: NaiveDate) -> InstanceKey {
    InstanceKey {
        kind,
        source_id,
        date,
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.kind,
            self.source_id,
            self.date.format(DATE_FORMAT)
        )
    }
}

impl FromStr for InstanceKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Invalid instance identity '{s}'"));

        let mut parts = s.splitn(3, ':');
        let (Some(kind), Some(source_id), Some(date)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let kind = kind.parse::<InstanceKind>()?;
        // Reject "+12" and friends so the text form stays canonical.
        if source_id.starts_with('+') {
            return Err(invalid());
        }
        let source_id = source_id.parse::<DbId>().map_err(|_| invalid())?;
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;

        Ok(derive_identity(kind, source_id, date))
    }
}

impl Serialize for InstanceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InstanceKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_inputs_produce_same_identity() {
        let a = derive_identity(InstanceKind::Regular, 7, date(2025, 7, 5));
        let b = derive_identity(InstanceKind::Regular, 7, date(2025, 7, 5));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn kind_separates_namespaces() {
        let regular = InstanceKey::regular(7, date(2025, 7, 5));
        let special = InstanceKey::special(7, date(2025, 7, 5));
        assert_ne!(regular, special);
        assert_ne!(regular.to_string(), special.to_string());
    }

    #[test]
    fn ids_sharing_digit_prefixes_do_not_collide() {
        // Unpadded "1" + "1/1/2025" and "11" + "1/2025"-style digit runs are
        // ambiguous as strings; the composite key keeps them apart.
        let a = InstanceKey::regular(1, date(2025, 11, 1));
        let b = InstanceKey::regular(11, date(2025, 1, 1));
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn large_ids_stay_disjoint_across_kinds() {
        let regular = InstanceKey::regular(10_001, date(2025, 7, 5));
        let special = InstanceKey::special(1, date(2025, 7, 5));
        assert_ne!(regular, special);
    }

    #[test]
    fn canonical_text_form() {
        let key = InstanceKey::special(42, date(2025, 7, 5));
        assert_eq!(key.to_string(), "special:42:2025-07-05");
    }

    #[test]
    fn text_form_parses_back() {
        let key = InstanceKey::regular(3, date(2026, 1, 31));
        let parsed: InstanceKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!("".parse::<InstanceKey>().is_err());
        assert!("regular:3".parse::<InstanceKey>().is_err());
        assert!("weekly:3:2025-07-05".parse::<InstanceKey>().is_err());
        assert!("regular:abc:2025-07-05".parse::<InstanceKey>().is_err());
        assert!("regular:+3:2025-07-05".parse::<InstanceKey>().is_err());
        assert!("regular:3:2025-13-05".parse::<InstanceKey>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let key = InstanceKey::regular(9, date(2025, 7, 7));
        let json = serde_json::to_value(key).unwrap();
        assert_eq!(json, serde_json::json!("regular:9:2025-07-07"));

        let back: InstanceKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }
}
