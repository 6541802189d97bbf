// ── Core identity types ──
//
// EntityId names one user-facing object ("climate.living_room") and
// MacAddress identifies the physical controller behind it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

// ── Domain ──────────────────────────────────────────────────────────

/// Namespace part of an [`EntityId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Domain {
    Climate,
    Number,
    Select,
    Switch,
    Time,
    Sensor,
}

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical `domain.object_id` identifier.
///
/// Parsing never fails: strings without a known domain prefix and a
/// non-empty object id are kept as [`EntityId::Foreign`] so batch operations
/// can report and skip them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EntityId {
    Known { domain: Domain, object_id: String },
    Foreign(String),
}

impl EntityId {
    pub fn climate(object_id: impl Into<String>) -> Self {
        Self::Known {
            domain: Domain::Climate,
            object_id: object_id.into(),
        }
    }

    /// Climate id derived from a free-form device name, e.g.
    /// `"Living Room"` becomes `climate.living_room`.
    pub fn climate_for_name(name: &str) -> Self {
        let mut object_id = String::with_capacity(name.len());
        for c in name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                object_id.push(c.to_ascii_lowercase());
            } else if !object_id.ends_with('_') {
                object_id.push('_');
            }
        }
        let object_id = object_id.trim_matches('_');
        Self::climate(if object_id.is_empty() {
            "hysen"
        } else {
            object_id
        })
    }

    pub fn domain(&self) -> Option<Domain> {
        match self {
            Self::Known { domain, .. } => Some(*domain),
            Self::Foreign(_) => None,
        }
    }

    pub fn is_climate(&self) -> bool {
        self.domain() == Some(Domain::Climate)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { domain, object_id } => write!(f, "{domain}.{object_id}"),
            Self::Foreign(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        let parsed = s.split_once('.').and_then(|(domain, object_id)| {
            let domain = domain.parse::<Domain>().ok()?;
            (!object_id.is_empty()).then(|| (domain, object_id.to_owned()))
        });
        match parsed {
            Some((domain, object_id)) => Self::Known { domain, object_id },
            None => Self::Foreign(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Accepts colon-separated, dash-separated, or bare 12-digit hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lower = raw.as_ref().trim().to_lowercase().replace('-', ":");
        if lower.len() == 12 && lower.chars().all(|c| c.is_ascii_hexdigit()) {
            let pairs: Vec<&str> = (0..6).filter_map(|i| lower.get(i * 2..i * 2 + 2)).collect();
            return Self(pairs.join(":"));
        }
        Self(lower)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Six two-digit hex groups after normalization.
    pub fn is_valid(&self) -> bool {
        let groups: Vec<&str> = self.0.split(':').collect();
        groups.len() == 6
            && groups
                .iter()
                .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_parses_climate() {
        let id: EntityId = "climate.living_room".parse().unwrap();
        assert!(id.is_climate());
        assert_eq!(id, EntityId::climate("living_room"));
        assert_eq!(id.to_string(), "climate.living_room");
    }

    #[test]
    fn entity_id_other_domain_is_not_climate() {
        let id = EntityId::from("number.living_room_hysteresis");
        assert_eq!(id.domain(), Some(Domain::Number));
        assert!(!id.is_climate());
    }

    #[test]
    fn entity_id_unknown_domain_is_foreign() {
        let id = EntityId::from("light.kitchen");
        assert_eq!(id, EntityId::Foreign("light.kitchen".into()));
        assert_eq!(EntityId::from("climate."), EntityId::Foreign("climate.".into()));
        assert_eq!(
            EntityId::from("Climate.Living Room"),
            EntityId::Foreign("Climate.Living Room".into())
        );
    }

    #[test]
    fn entity_id_keeps_free_form_object_id() {
        let id = EntityId::from("climate.Office");
        assert!(id.is_climate());
        assert_eq!(id.to_string(), "climate.Office");
        assert!(EntityId::from("climate.living-room").is_climate());
    }

    #[test]
    fn climate_id_from_display_name() {
        assert_eq!(
            EntityId::climate_for_name("Living Room #2"),
            EntityId::climate("living_room_2")
        );
        assert_eq!(EntityId::climate_for_name("  "), EntityId::climate("hysen"));
    }

    #[test]
    fn entity_id_serde_as_string() {
        let id = EntityId::climate("office");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"climate.office\"");
    }

    #[test]
    fn mac_address_normalizes() {
        assert_eq!(MacAddress::new("AA-BB-CC-DD-EE-FF").as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(MacAddress::new("34EA34B43B5A").as_str(), "34:ea:34:b4:3b:5a");
        assert!(MacAddress::new("34EA34B43B5A").is_valid());
        assert!(!MacAddress::new("34:ea:34").is_valid());
    }
}
