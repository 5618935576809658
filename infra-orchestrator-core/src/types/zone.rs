//! Zone-side type definitions

use serde::{Deserialize, Serialize};

use infra_orchestrator_provider::{Zone, ZoneStatus};

/// Application layer zone (carries the local credential it was listed with)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppZone {
    #[serde(flatten)]
    pub zone: Zone,
    /// Local account ID
    pub credential_id: String,
}

impl AppZone {
    /// Construct application layer zone from provider layer zone
    #[must_use]
    pub fn from_provider(zone: Zone, credential_id: impl Into<String>) -> Self {
        Self {
            zone,
            credential_id: credential_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.zone.id
    }

    pub fn name(&self) -> &str {
        &self.zone.name
    }
}

/// Active zone filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneFilter {
    /// Case-insensitive substring over the domain name
    pub search: String,
    /// Local account ID
    pub credential_id: Option<String>,
    /// Provider-side owner account ID
    pub owner_id: Option<String>,
    pub status: Option<ZoneStatus>,
}

impl ZoneFilter {
    pub fn accepts(&self, zone: &AppZone) -> bool {
        let needle = self.search.trim().to_lowercase();
        (needle.is_empty() || zone.zone.name.to_lowercase().contains(&needle))
            && self
                .credential_id
                .as_ref()
                .is_none_or(|id| *id == zone.credential_id)
            && self
                .owner_id
                .as_ref()
                .is_none_or(|id| *id == zone.zone.owner.id)
            && self.status.is_none_or(|status| status == zone.zone.status)
    }
}
