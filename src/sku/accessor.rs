//! Read-only queries over a single wrapped SKU.
//!
//! [`Sku`] owns one raw [`ResourceSku`] and answers capability, availability,
//! restriction and zone questions against it. All name comparisons go through
//! [`names_match`]; all lists are scanned linearly and the first matching
//! capability wins. Predicates degrade to `false` on missing data, while
//! quantity lookups and location resolution return a [`SkuError`].

use crate::sku::error::{NumberParseError, SkuError, SkuResult};
use crate::sku::model::{ResourceSku, ResourceSkuCapability};
use crate::sku::normalize::names_match;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

/// Resource type of virtual machine sizes.
pub const VIRTUAL_MACHINES: &str = "virtualMachines";
/// Resource type of managed disks.
pub const DISKS: &str = "disks";

/// Value the provider reports when a binary capability is supported.
pub const CAPABILITY_SUPPORTED: &str = "True";
/// Value the provider reports when a binary capability is not supported.
pub const CAPABILITY_UNSUPPORTED: &str = "False";

pub const EPHEMERAL_OS_DISK: &str = "EphemeralOSDiskSupported";
pub const ACCELERATED_NETWORKING: &str = "AcceleratedNetworkingEnabled";
pub const VCPUS: &str = "vCPUs";
pub const MEMORY_GB: &str = "MemoryGB";
/// Comma-joined list such as `V1,V2`.
pub const HYPERV_GENERATIONS: &str = "HyperVGenerations";
pub const ENCRYPTION_AT_HOST: &str = "EncryptionAtHostSupported";
/// Only reported under per-zone details.
pub const ULTRA_SSD_AVAILABLE: &str = "UltraSSDAvailable";
pub const CACHED_DISK_BYTES: &str = "CachedDiskBytes";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// A resource SKU with query helpers.
pub struct Sku(ResourceSku);

impl From<ResourceSku> for Sku {
    fn from(raw: ResourceSku) -> Self {
        Sku(raw)
    }
}

impl Sku {
    pub fn new(raw: ResourceSku) -> Self {
        Sku(raw)
    }

    /// The wrapped provider record.
    pub fn raw(&self) -> &ResourceSku {
        &self.0
    }

    pub fn into_raw(self) -> ResourceSku {
        self.0
    }

    /// Name of the SKU (e.g. `Standard_D8s_v3`), or `""` when absent.
    pub fn name(&self) -> &str {
        self.0.name.as_deref().unwrap_or_default()
    }

    /// Resource type (e.g. `virtualMachines`), or `""` when absent.
    pub fn resource_type(&self) -> &str {
        self.0.resource_type.as_deref().unwrap_or_default()
    }

    /// The single location this SKU describes.
    pub fn location(&self) -> SkuResult<&str> {
        match self.0.locations.as_deref() {
            None => Err(SkuError::LocationUnset),
            Some([]) => Err(SkuError::NoLocations),
            Some([location]) => Ok(location.as_str()),
            Some(many) => Err(SkuError::MultipleLocations { count: many.len() }),
        }
    }

    /// True when the resource type matches `resource_type`, e.g. `"disks"`
    /// or `"hostGroups/hosts"`.
    pub fn is_resource_type(&self, resource_type: &str) -> bool {
        self.0
            .resource_type
            .as_deref()
            .is_some_and(|own| names_match(own, resource_type))
    }

    pub fn vcpus(&self) -> SkuResult<i64> {
        self.integer_capability(VCPUS)
    }

    pub fn memory_gb(&self) -> SkuResult<f64> {
        self.float_capability(MEMORY_GB)
    }

    pub fn max_cached_disk_bytes(&self) -> SkuResult<i64> {
        self.integer_capability(CACHED_DISK_BYTES)
    }

    pub fn is_encryption_at_host_supported(&self) -> bool {
        self.has_capability(ENCRYPTION_AT_HOST)
    }

    pub fn is_ephemeral_os_disk_supported(&self) -> bool {
        self.has_capability(EPHEMERAL_OS_DISK)
    }

    pub fn is_accelerated_networking_supported(&self) -> bool {
        self.has_capability(ACCELERATED_NETWORKING)
    }

    pub fn is_ultra_ssd_available(&self) -> bool {
        self.has_zonal_capability(ULTRA_SSD_AVAILABLE)
    }

    pub fn is_hyperv_gen1_supported(&self) -> bool {
        self.has_capability_with_separator(HYPERV_GENERATIONS, "V1")
    }

    pub fn is_hyperv_gen2_supported(&self) -> bool {
        self.has_capability_with_separator(HYPERV_GENERATIONS, "V2")
    }

    /// Parse the named capability as a base-10 integer.
    pub fn integer_capability(&self, name: &str) -> SkuResult<i64> {
        let value = self.capability_value(name)?;
        value
            .parse::<i64>()
            .map_err(|err| parse_failure(name, value, err.into()))
    }

    /// Parse the named capability as a floating point number.
    pub fn float_capability(&self, name: &str) -> SkuResult<f64> {
        let value = self.capability_value(name)?;
        value
            .parse::<f64>()
            .map_err(|err| parse_failure(name, value, err.into()))
    }

    /// True when the capability is present and its value is `True`.
    ///
    /// Suits flags such as `EphemeralOSDiskSupported`,
    /// `EncryptionAtHostSupported` or `RdmaEnabled`.
    pub fn has_capability(&self, name: &str) -> bool {
        self.find_capability(name).is_some_and(is_supported)
    }

    /// True when any zone of any location reports the capability as
    /// supported.
    ///
    /// The answer is location-wide: one supporting zone is enough. Use
    /// [`Sku::zones_with_capability`] to see which zones qualify.
    pub fn has_zonal_capability(&self, name: &str) -> bool {
        self.zonal_capabilities(name)
            .any(|(_, capability)| is_supported(capability))
    }

    /// Zones whose zone details list the capability as supported.
    pub fn zones_with_capability(&self, name: &str) -> BTreeSet<String> {
        self.zonal_capabilities(name)
            .filter(|(_, capability)| is_supported(capability))
            .flat_map(|(zones, _)| zones.iter().cloned())
            .collect()
    }

    /// True when a list-valued capability (e.g. `HyperVGenerations` =
    /// `V1,V2`) contains `substring`. Plain substring containment.
    pub fn has_capability_with_separator(&self, name: &str, substring: &str) -> bool {
        self.find_capability(name)
            .and_then(|capability| capability.value.as_deref())
            .is_some_and(|value| value.contains(substring))
    }

    /// True when the numeric capability is at least `threshold`.
    ///
    /// Missing data is `Ok(false)`; only an unparseable value errors.
    /// Applies to `vCPUs`, `MemoryGB`, `MaxDataDiskCount`, `UncachedDiskIOPS`
    /// and similar quantities.
    pub fn has_capability_with_capacity(&self, name: &str, threshold: i64) -> SkuResult<bool> {
        let Some(value) = self
            .find_capability(name)
            .and_then(|capability| capability.value.as_deref())
        else {
            return Ok(false);
        };
        let quantity = value
            .parse::<i64>()
            .map_err(|err| parse_failure(name, value, err.into()))?;
        Ok(quantity >= threshold)
    }

    /// True when the SKU lists `location` and carries no location
    /// restriction at all.
    ///
    /// Any location restriction disqualifies every location, whichever
    /// location it names.
    pub fn is_available(&self, location: &str) -> bool {
        if !self.lists_location(location) {
            return false;
        }
        !self
            .0
            .restrictions
            .iter()
            .flatten()
            .any(|restriction| restriction.is_location_restriction())
    }

    /// True when a location restriction names `location`.
    pub fn is_restricted(&self, location: &str) -> bool {
        self.0
            .restrictions
            .iter()
            .flatten()
            .filter(|restriction| restriction.is_location_restriction())
            .flat_map(|restriction| restriction.values.iter().flatten())
            .any(|candidate| names_match(candidate, location))
    }

    /// Unrestricted availability zones in `location`.
    ///
    /// Returns `None` when a location restriction covers `location`; zones
    /// named by other restrictions on `location` are removed from the set.
    pub fn availability_zones(&self, location: &str) -> Option<BTreeSet<String>> {
        let mut available = BTreeSet::new();
        let mut restricted = BTreeSet::new();

        for info in self.0.location_info.iter().flatten() {
            if !info
                .location
                .as_deref()
                .is_some_and(|own| names_match(own, location))
            {
                continue;
            }
            available.extend(info.zones.iter().flatten().cloned());

            for restriction in self.0.restrictions.iter().flatten() {
                let names_location = restriction
                    .values
                    .iter()
                    .flatten()
                    .any(|candidate| names_match(candidate, location));
                if !names_location {
                    continue;
                }
                if restriction.is_location_restriction() {
                    return None;
                }
                if let Some(zones) = restriction
                    .restriction_info
                    .as_ref()
                    .and_then(|info| info.zones.as_ref())
                {
                    restricted.extend(zones.iter().cloned());
                }
            }
        }

        available.retain(|zone| !restricted.contains(zone));
        Some(available)
    }

    /// True when both SKUs share resource type, name and location.
    ///
    /// Both locations must resolve; a SKU without exactly one location is
    /// never the same as another, itself included.
    pub fn same_sku(&self, other: &Sku) -> bool {
        let (Ok(location), Ok(other_location)) = (self.location(), other.location()) else {
            return false;
        };
        names_match(self.resource_type(), other.resource_type())
            && names_match(self.name(), other.name())
            && names_match(location, other_location)
    }

    fn find_capability(&self, name: &str) -> Option<&ResourceSkuCapability> {
        self.0.capabilities.as_ref()?.iter().find(|capability| {
            capability
                .name
                .as_deref()
                .is_some_and(|own| names_match(own, name))
        })
    }

    fn capability_value(&self, name: &str) -> SkuResult<&str> {
        let capability = self
            .find_capability(name)
            .ok_or_else(|| SkuError::CapabilityNotFound {
                name: name.to_string(),
            })?;
        capability
            .value
            .as_deref()
            .ok_or_else(|| SkuError::CapabilityValueNil {
                name: name.to_string(),
            })
    }

    fn lists_location(&self, location: &str) -> bool {
        self.0
            .location_info
            .iter()
            .flatten()
            .filter_map(|info| info.location.as_deref())
            .any(|own| names_match(own, location))
    }

    // Every zone-detail capability named `name`, paired with its zones.
    fn zonal_capabilities<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a [String], &'a ResourceSkuCapability)> + 'a {
        self.0
            .location_info
            .iter()
            .flatten()
            .flat_map(|info| info.zone_details.iter().flatten())
            .flat_map(|details| {
                let zones = details.name.as_deref().unwrap_or_default();
                details
                    .capabilities
                    .iter()
                    .flatten()
                    .map(move |capability| (zones, capability))
            })
            .filter(move |(_, capability)| {
                capability
                    .name
                    .as_deref()
                    .is_some_and(|own| names_match(own, name))
            })
    }
}

fn is_supported(capability: &ResourceSkuCapability) -> bool {
    capability
        .value
        .as_deref()
        .is_some_and(|value| names_match(value, CAPABILITY_SUPPORTED))
}

fn parse_failure(name: &str, value: &str, source: NumberParseError) -> SkuError {
    trace!(capability = name, value, %source, "capability value is not numeric");
    SkuError::CapabilityValueParse {
        name: name.to_string(),
        value: value.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn sku(value: Value) -> Sku {
        serde_json::from_value(value).expect("fixture deserializes")
    }

    fn vm(capabilities: Value) -> Sku {
        sku(json!({
            "resourceType": "virtualMachines",
            "name": "Standard_D8s_v3",
            "locations": ["eastus"],
            "capabilities": capabilities,
        }))
    }

    fn zones(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|z| z.to_string()).collect()
    }

    #[test]
    fn integer_capability_parses_and_reports_failures() {
        let sku = vm(json!([
            {"name": "vCPUs", "value": "8"},
            {"name": "MaxDataDiskCount", "value": "eight"},
            {"name": "CachedDiskBytes"}
        ]));
        assert_eq!(sku.integer_capability("vCPUs"), Ok(8));
        assert_eq!(sku.vcpus(), Ok(8));
        assert_eq!(sku.integer_capability("v_cpus"), Ok(8));

        match sku.integer_capability("MaxDataDiskCount") {
            Err(SkuError::CapabilityValueParse { name, value, source }) => {
                assert_eq!(name, "MaxDataDiskCount");
                assert_eq!(value, "eight");
                assert!(matches!(source, NumberParseError::Int(_)));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(
            sku.max_cached_disk_bytes(),
            Err(SkuError::CapabilityValueNil {
                name: CACHED_DISK_BYTES.to_string()
            })
        );
        assert_eq!(
            sku.integer_capability("MemoryGB"),
            Err(SkuError::CapabilityNotFound {
                name: "MemoryGB".to_string()
            })
        );
    }

    #[test]
    fn float_capability_parses_fractional_values() {
        let sku = vm(json!([{"name": "MemoryGB", "value": "0.75"}, {"name": "vCPUs", "value": "x"}]));
        assert_eq!(sku.memory_gb(), Ok(0.75));
        assert!(matches!(
            sku.float_capability("vCPUs"),
            Err(SkuError::CapabilityValueParse {
                source: NumberParseError::Float(_),
                ..
            })
        ));
    }

    #[test]
    fn absent_capabilities_short_circuit() {
        let bare = sku(json!({"name": "bare"}));
        assert_eq!(
            bare.integer_capability("vCPUs"),
            Err(SkuError::CapabilityNotFound {
                name: "vCPUs".to_string()
            })
        );
        assert!(!bare.has_capability(EPHEMERAL_OS_DISK));
        assert!(!bare.has_capability_with_separator(HYPERV_GENERATIONS, "V1"));
        assert_eq!(bare.has_capability_with_capacity(MEMORY_GB, 1), Ok(false));
    }

    #[test]
    fn has_capability_accepts_true_variants_only() {
        let sku = vm(json!([
            {"name": "EncryptionAtHostSupported", "value": "TRUE"},
            {"name": "EphemeralOSDiskSupported", "value": "False"},
            {"name": "accelerated_networking_enabled", "value": "true"},
            {"name": "RdmaEnabled"}
        ]));
        assert!(sku.is_encryption_at_host_supported());
        assert!(!sku.is_ephemeral_os_disk_supported());
        assert!(sku.is_accelerated_networking_supported());
        assert!(sku.has_capability("AcceleratedNetworkingEnabled"));
        assert!(sku.has_capability("Accelerated-Networking-Enabled"));
        assert!(!sku.has_capability("RdmaEnabled"));
        assert!(!sku.has_capability("LowPriorityCapable"));
    }

    #[test]
    fn first_matching_capability_wins() {
        let sku = vm(json!([
            {"name": "vCPUs", "value": "4"},
            {"name": "VCPUS", "value": "16"},
            {"name": "PremiumIO", "value": "False"},
            {"name": "PremiumIO", "value": "True"}
        ]));
        assert_eq!(sku.vcpus(), Ok(4));
        assert!(!sku.has_capability("PremiumIO"));
    }

    #[test]
    fn separator_capability_is_substring_match() {
        let sku = vm(json!([{"name": "HyperVGenerations", "value": "V1,V2"}]));
        assert!(sku.is_hyperv_gen1_supported());
        assert!(sku.is_hyperv_gen2_supported());
        assert!(sku.has_capability_with_separator(HYPERV_GENERATIONS, "1,V"));
        assert!(!sku.has_capability_with_separator(HYPERV_GENERATIONS, "V3"));

        let gen2 = vm(json!([{"name": "HyperVGenerations", "value": "V2"}]));
        assert!(!gen2.is_hyperv_gen1_supported());
    }

    #[test]
    fn capacity_threshold_comparisons() {
        let sku = vm(json!([
            {"name": "MemoryGB", "value": "16"},
            {"name": "vCPUs", "value": "lots"},
            {"name": "MaxDataDiskCount"}
        ]));
        assert_eq!(sku.has_capability_with_capacity("MemoryGB", 16), Ok(true));
        assert_eq!(sku.has_capability_with_capacity("MemoryGB", 8), Ok(true));
        assert_eq!(sku.has_capability_with_capacity("MemoryGB", 32), Ok(false));
        assert_eq!(sku.has_capability_with_capacity("OSVhdSizeMB", 1), Ok(false));
        assert_eq!(sku.has_capability_with_capacity("MaxDataDiskCount", 1), Ok(false));
        assert!(matches!(
            sku.has_capability_with_capacity("vCPUs", 2),
            Err(SkuError::CapabilityValueParse { .. })
        ));
    }

    #[test]
    fn zonal_capability_collapses_to_location_wide_answer() {
        let sku = sku(json!({
            "name": "UltraSSD_LRS",
            "locations": ["westus2"],
            "locationInfo": [{
                "location": "westus2",
                "zones": ["1", "2", "3"],
                "zoneDetails": [
                    {"name": ["3"], "capabilities": [{"name": "UltraSSDAvailable", "value": "True"}]},
                    {"name": ["1"], "capabilities": [{"name": "UltraSSDAvailable", "value": "False"}]},
                    {"name": ["2"]}
                ]
            }]
        }));
        assert!(sku.is_ultra_ssd_available());
        assert!(sku.has_zonal_capability("ultra_ssd_available"));
        assert_eq!(sku.zones_with_capability(ULTRA_SSD_AVAILABLE), zones(&["3"]));
        assert!(!sku.has_zonal_capability("EncryptionAtHostSupported"));
        assert!(!vm(json!([])).has_zonal_capability(ULTRA_SSD_AVAILABLE));
    }

    fn restricted_sku(restrictions: Value) -> Sku {
        sku(json!({
            "resourceType": "virtualMachines",
            "name": "Standard_NC6",
            "locations": ["eastus"],
            "locationInfo": [
                {"location": "eastus", "zones": ["1", "2", "3"]},
                {"location": "westus", "zones": ["1"]}
            ],
            "restrictions": restrictions
        }))
    }

    #[test]
    fn any_location_restriction_blocks_availability() {
        let open = restricted_sku(json!([]));
        assert!(open.is_available("eastus"));
        assert!(open.is_available("East US"));
        assert!(!open.is_available("northeurope"));

        let elsewhere = restricted_sku(json!([{"type": "Location", "values": ["westus"]}]));
        assert!(!elsewhere.is_available("eastus"));
        assert!(!elsewhere.is_restricted("eastus"));
        assert!(elsewhere.is_restricted("West_US"));

        let zonal = restricted_sku(json!([{"type": "Zone", "values": ["eastus"]}]));
        assert!(zonal.is_available("eastus"));
        assert!(!zonal.is_restricted("eastus"));
    }

    #[test]
    fn availability_zones_subtract_zone_restrictions() {
        let sku = restricted_sku(json!([
            {"type": "Zone", "values": ["eastus"], "restrictionInfo": {"zones": ["2"]}},
            {"type": "Zone", "values": ["westus"], "restrictionInfo": {"zones": ["3"]}},
            {"type": "Zone", "values": ["eastus"]}
        ]));
        assert_eq!(sku.availability_zones("EastUS"), Some(zones(&["1", "3"])));
        assert_eq!(sku.availability_zones("westus"), Some(zones(&["1"])));
        assert_eq!(sku.availability_zones("centralus"), Some(BTreeSet::new()));
    }

    #[test]
    fn availability_zones_empty_signal_on_location_restriction() {
        let sku = restricted_sku(json!([
            {"type": "Location", "values": ["eastus"], "reasonCode": "NotAvailableForSubscription"}
        ]));
        assert_eq!(sku.availability_zones("eastus"), None);
        assert_eq!(sku.availability_zones("westus"), Some(zones(&["1"])));
    }

    #[test]
    fn availability_zones_tolerates_missing_data() {
        let bare = sku(json!({"name": "bare"}));
        assert_eq!(bare.availability_zones("eastus"), Some(BTreeSet::new()));
        assert!(!bare.is_available("eastus"));
        assert!(!bare.is_restricted("eastus"));
    }

    #[test]
    fn location_resolution_errors() {
        assert_eq!(sku(json!({})).location(), Err(SkuError::LocationUnset));
        assert_eq!(sku(json!({"locations": []})).location(), Err(SkuError::NoLocations));
        assert_eq!(
            sku(json!({"locations": ["eastus", "westus"]})).location(),
            Err(SkuError::MultipleLocations { count: 2 })
        );
        assert_eq!(vm(json!([])).location(), Ok("eastus"));
    }

    #[test]
    fn raw_accessors_default_to_empty() {
        let bare = sku(json!({}));
        assert_eq!(bare.name(), "");
        assert_eq!(bare.resource_type(), "");
        assert!(!bare.is_resource_type(VIRTUAL_MACHINES));

        let vm = vm(json!([]));
        assert_eq!(vm.name(), "Standard_D8s_v3");
        assert!(vm.is_resource_type("VirtualMachines"));
        assert!(!vm.is_resource_type(DISKS));
    }

    #[test]
    fn same_sku_requires_resolved_locations() {
        let a = vm(json!([{"name": "vCPUs", "value": "8"}]));
        let b = sku(json!({
            "resourceType": "VIRTUAL_MACHINES",
            "name": "standard_d8s_v3",
            "locations": ["EastUS"]
        }));
        assert!(a.same_sku(&b));
        assert!(b.same_sku(&a));

        let other_location = sku(json!({
            "resourceType": "virtualMachines",
            "name": "Standard_D8s_v3",
            "locations": ["westus"]
        }));
        assert!(!a.same_sku(&other_location));

        let unlocated = sku(json!({"resourceType": "virtualMachines", "name": "Standard_D8s_v3"}));
        assert!(!a.same_sku(&unlocated));
        assert!(!unlocated.same_sku(&unlocated));
    }
}
