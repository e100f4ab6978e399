//! Deserializable representation of a resource SKU record.
//!
//! The types mirror the provider's `resourceSkus` payload field-for-field so
//! catalog dumps and client responses can be consumed without ad-hoc JSON
//! handling. Every field is optional: absence is kept distinct from an empty
//! collection, and nothing here fills in defaults. Query logic lives on
//! [`Sku`](crate::sku::Sku); these structs only carry data.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One catalog entry as returned by the provider.
pub struct ResourceSku {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_info: Option<Vec<ResourceSkuLocationInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_versions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<ResourceSkuCapability>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<ResourceSkuRestriction>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Named capability; the value encodes a flag, a quantity, or a list.
pub struct ResourceSkuCapability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-location availability: zones and optional per-zone capability overrides.
pub struct ResourceSkuLocationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_details: Option<Vec<ResourceSkuZoneDetails>>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_locations: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Capabilities that only hold for the listed zones.
pub struct ResourceSkuZoneDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<ResourceSkuCapability>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Declared limitation on deploying the SKU somewhere.
///
/// `values` holds the locations the restriction applies to; for zone
/// restrictions `restriction_info.zones` names the affected zones.
pub struct ResourceSkuRestriction {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub restriction_type: Option<RestrictionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction_info: Option<ResourceSkuRestrictionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSkuRestrictionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
}

/// Scope of a restriction.
///
/// `Other` keeps unknown provider values intact so newer catalogs still
/// deserialize and re-serialize unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RestrictionType {
    Location,
    Zone,
    Other(String),
}

impl RestrictionType {
    pub fn as_str(&self) -> &str {
        match self {
            RestrictionType::Location => "Location",
            RestrictionType::Zone => "Zone",
            RestrictionType::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "Location" => RestrictionType::Location,
            "Zone" => RestrictionType::Zone,
            other => RestrictionType::Other(other.to_string()),
        }
    }
}

impl Serialize for RestrictionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RestrictionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

impl ResourceSkuRestriction {
    /// True when the restriction blocks a whole location.
    pub fn is_location_restriction(&self) -> bool {
        self.restriction_type == Some(RestrictionType::Location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn restriction_type_round_trips_known_and_unknown() {
        let known = RestrictionType::Zone;
        let json = serde_json::to_string(&known).unwrap();
        assert_eq!(json, "\"Zone\"");
        let back: RestrictionType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, known);

        let parsed: RestrictionType = serde_json::from_str("\"Subscription\"").unwrap();
        assert_eq!(parsed, RestrictionType::Other("Subscription".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Subscription\"");
    }

    #[test]
    fn record_uses_provider_field_names() {
        let value = json!({
            "resourceType": "virtualMachines",
            "name": "Standard_D2s_v3",
            "locations": ["eastus"],
            "locationInfo": [{
                "location": "eastus",
                "zones": ["1", "2"],
                "zoneDetails": [{
                    "name": ["2"],
                    "capabilities": [{"name": "UltraSSDAvailable", "value": "True"}]
                }]
            }],
            "capabilities": [{"name": "vCPUs", "value": "2"}],
            "restrictions": [{
                "type": "Zone",
                "values": ["eastus"],
                "restrictionInfo": {"locations": ["eastus"], "zones": ["1"]},
                "reasonCode": "NotAvailableForSubscription"
            }]
        });

        let sku: ResourceSku = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(sku.resource_type.as_deref(), Some("virtualMachines"));
        let info = &sku.location_info.as_ref().unwrap()[0];
        assert_eq!(info.zones.as_ref().unwrap().len(), 2);
        let restriction = &sku.restrictions.as_ref().unwrap()[0];
        assert_eq!(restriction.restriction_type, Some(RestrictionType::Zone));
        assert!(!restriction.is_location_restriction());
        assert_eq!(serde_json::to_value(&sku).unwrap(), value);
    }

    #[test]
    fn absent_collections_stay_absent() {
        let sku: ResourceSku = serde_json::from_value(json!({"name": "bare"})).unwrap();
        assert!(sku.capabilities.is_none());
        assert!(sku.locations.is_none());

        let empty: ResourceSku =
            serde_json::from_value(json!({"name": "empty", "capabilities": []})).unwrap();
        assert_eq!(empty.capabilities, Some(Vec::new()));
    }
}
