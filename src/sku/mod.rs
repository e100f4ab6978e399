//! Resource SKU records and the queries answered against them.
//!
//! `model` mirrors the provider payload; `accessor` wraps one record as a
//! [`Sku`] and exposes capability, availability and zone lookups. Matching
//! rules shared by every lookup live in `normalize`.

pub mod accessor;
pub mod error;
pub mod model;
pub mod normalize;

pub use accessor::{
    ACCELERATED_NETWORKING, CACHED_DISK_BYTES, CAPABILITY_SUPPORTED, CAPABILITY_UNSUPPORTED,
    DISKS, ENCRYPTION_AT_HOST, EPHEMERAL_OS_DISK, HYPERV_GENERATIONS, MEMORY_GB, Sku,
    ULTRA_SSD_AVAILABLE, VCPUS, VIRTUAL_MACHINES,
};
pub use error::{NumberParseError, SkuError, SkuResult};
pub use model::{
    ResourceSku, ResourceSkuCapability, ResourceSkuLocationInfo, ResourceSkuRestriction,
    ResourceSkuRestrictionInfo, ResourceSkuZoneDetails, RestrictionType,
};
pub use normalize::{names_match, normalize};
