//! Device registry: which (vendor, product) pairs are known displays.
//!
//! The registry is built once from a fixed table and only read afterwards.
//! Lookups are exact matches on the 16-bit USB IDs.

use crate::error::{Error, Result};
use crate::{pids, APPLE_VID, SAMSUNG_VID};
use std::collections::BTreeMap;
use std::fmt;

/// USB vendor/product pair of a HID device.
///
/// Ordering is by vendor, then product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// Build from the driver's raw identifiers, keeping the low 16 bits.
    pub fn from_raw(vendor: i32, product: i32) -> Self {
        Self {
            vendor_id: (vendor & 0xFFFF) as u16,
            product_id: (product & 0xFFFF) as u16,
        }
    }
}

/// A known display model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRecord {
    pub vendor_id: u16,
    pub product_id: u16,
    pub description: &'static str,
}

impl DeviceRecord {
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.vendor_id, self.product_id)
    }
}

/// A known vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorRecord {
    pub vendor_id: u16,
    pub name: &'static str,
}

/// Vendors shown by name in device listings.
pub static BUILTIN_VENDORS: &[VendorRecord] = &[
    VendorRecord {
        vendor_id: APPLE_VID,
        name: "Apple",
    },
    VendorRecord {
        vendor_id: SAMSUNG_VID,
        name: "Samsung Electronics",
    },
];

/// Displays known to expose the brightness feature report.
///
/// The newer revisions of the 20" and 23" Cinema Displays reuse the product
/// IDs of the old ones, so one entry covers both.
pub static BUILTIN_DEVICES: &[DeviceRecord] = &[
    DeviceRecord {
        vendor_id: APPLE_VID,
        product_id: pids::STUDIO_DISPLAY_15,
        description: "Apple Studio Display 15\"",
    },
    DeviceRecord {
        vendor_id: APPLE_VID,
        product_id: pids::STUDIO_DISPLAY_17,
        description: "Apple Studio Display 17\"",
    },
    DeviceRecord {
        vendor_id: APPLE_VID,
        product_id: pids::CINEMA_DISPLAY_20,
        description: "Apple Cinema Display 20\" (old)",
    },
    DeviceRecord {
        vendor_id: APPLE_VID,
        product_id: pids::CINEMA_DISPLAY_23,
        description: "Apple Cinema Display 23\" (old)",
    },
    DeviceRecord {
        vendor_id: APPLE_VID,
        product_id: pids::CINEMA_DISPLAY_24,
        description: "Apple Cinema Display 24\"",
    },
    DeviceRecord {
        vendor_id: APPLE_VID,
        product_id: pids::CINEMA_HD_DISPLAY_30,
        description: "Apple Cinema HD Display 30\"",
    },
    DeviceRecord {
        vendor_id: SAMSUNG_VID,
        product_id: pids::SYNCMASTER_757NF,
        description: "Samsung SyncMaster 757NF",
    },
];

/// Immutable lookup tables for devices and vendors.
#[derive(Debug, Clone)]
pub struct Registry {
    devices: BTreeMap<DeviceIdentity, DeviceRecord>,
    vendors: BTreeMap<u16, VendorRecord>,
}

impl Registry {
    /// Build a registry, rejecting duplicate device keys.
    ///
    /// A vendor listed twice keeps its last name.
    pub fn new(vendors: &[VendorRecord], devices: &[DeviceRecord]) -> Result<Self> {
        let mut map = BTreeMap::new();
        for record in devices {
            if map.insert(record.identity(), *record).is_some() {
                return Err(Error::DuplicateRecord {
                    vendor_id: record.vendor_id,
                    product_id: record.product_id,
                });
            }
        }

        Ok(Self {
            devices: map,
            vendors: vendors.iter().map(|v| (v.vendor_id, *v)).collect(),
        })
    }

    /// The built-in display table.
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_VENDORS, BUILTIN_DEVICES)
    }

    pub fn is_supported(&self, identity: DeviceIdentity) -> bool {
        self.devices.contains_key(&identity)
    }

    /// Description of a supported device.
    pub fn describe(&self, identity: DeviceIdentity) -> Option<&'static str> {
        self.devices.get(&identity).map(|r| r.description)
    }

    pub fn is_known_vendor(&self, vendor_id: u16) -> bool {
        self.vendors.contains_key(&vendor_id)
    }

    pub fn vendor_name(&self, vendor_id: u16) -> Option<&'static str> {
        self.vendors.get(&vendor_id).map(|v| v.name)
    }

    /// All device records, ordered by vendor then product.
    pub fn list_all(&self) -> impl Iterator<Item = &DeviceRecord> + '_ {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Human-readable rendering of an identity, e.g.
    /// `Vendor=0x05ac (Apple), Product=0x9219 [Apple Cinema Display 20" (old)]`.
    pub fn display(&self, identity: DeviceIdentity) -> IdentityDisplay<'_> {
        IdentityDisplay {
            registry: self,
            identity,
        }
    }
}

/// [`fmt::Display`] adapter returned by [`Registry::display`].
pub struct IdentityDisplay<'a> {
    registry: &'a Registry,
    identity: DeviceIdentity,
}

impl fmt::Display for IdentityDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DeviceIdentity {
            vendor_id,
            product_id,
        } = self.identity;
        write!(f, "Vendor={vendor_id:#06x}")?;
        if let Some(name) = self.registry.vendor_name(vendor_id) {
            write!(f, " ({name})")?;
        }
        write!(f, ", Product={product_id:#06x}")?;
        if let Some(description) = self.registry.describe(self.identity) {
            write!(f, " [{description}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_no_duplicates() {
        let checked = Registry::new(BUILTIN_VENDORS, BUILTIN_DEVICES).unwrap();
        assert_eq!(checked.len(), BUILTIN_DEVICES.len());
        assert_eq!(Registry::builtin().unwrap().len(), BUILTIN_DEVICES.len());
    }

    #[test]
    fn duplicate_records_rejected() {
        let devices = [
            DeviceRecord {
                vendor_id: APPLE_VID,
                product_id: 0x9219,
                description: "first",
            },
            DeviceRecord {
                vendor_id: APPLE_VID,
                product_id: 0x9219,
                description: "second",
            },
        ];
        let err = Registry::new(BUILTIN_VENDORS, &devices).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateRecord {
                vendor_id: APPLE_VID,
                product_id: 0x9219
            }
        ));
    }

    #[test]
    fn known_display_is_supported() {
        let registry = Registry::builtin().unwrap();
        let cinema = DeviceIdentity::new(0x05ac, 0x9219);
        assert!(registry.is_supported(cinema));
        assert_eq!(
            registry.describe(cinema),
            Some("Apple Cinema Display 20\" (old)")
        );
    }

    #[test]
    fn unknown_device_is_not_supported() {
        let registry = Registry::builtin().unwrap();
        let unknown = DeviceIdentity::new(0x1234, 0x0001);
        assert!(!registry.is_supported(unknown));
        assert_eq!(registry.describe(unknown), None);
        // Known vendor, unknown product
        assert!(!registry.is_supported(DeviceIdentity::new(APPLE_VID, 0x0001)));
    }

    #[test]
    fn classification_is_deterministic() {
        let registry = Registry::builtin().unwrap();
        for record in BUILTIN_DEVICES {
            for _ in 0..3 {
                assert!(registry.is_supported(record.identity()));
            }
        }
        let unknown = DeviceIdentity::new(0x046d, 0xc08b);
        for _ in 0..3 {
            assert!(!registry.is_supported(unknown));
        }
    }

    #[test]
    fn vendor_lookup() {
        let registry = Registry::builtin().unwrap();
        assert!(registry.is_known_vendor(APPLE_VID));
        assert!(registry.is_known_vendor(SAMSUNG_VID));
        assert!(!registry.is_known_vendor(0x046d));
        assert_eq!(registry.vendor_name(SAMSUNG_VID), Some("Samsung Electronics"));
    }

    #[test]
    fn raw_identifiers_are_masked() {
        // The driver reports vendor/product as signed 16-bit values.
        let id = DeviceIdentity::from_raw(0x05ac, 0x9219u16 as i16 as i32);
        assert_eq!(id, DeviceIdentity::new(0x05ac, 0x9219));
        let id = DeviceIdentity::from_raw(0x7_05ac, -1);
        assert_eq!(id, DeviceIdentity::new(0x05ac, 0xFFFF));
    }

    #[test]
    fn list_all_ordered_by_vendor_then_product() {
        let registry = Registry::builtin().unwrap();
        let ids: Vec<_> = registry.list_all().map(|r| r.identity()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        // Samsung (0x0419) sorts before Apple (0x05ac)
        assert_eq!(ids[0], DeviceIdentity::new(SAMSUNG_VID, 0x8002));
        assert_eq!(ids.last(), Some(&DeviceIdentity::new(APPLE_VID, 0x9232)));
    }

    #[test]
    fn display_supported_identity() {
        let registry = Registry::builtin().unwrap();
        let text = registry
            .display(DeviceIdentity::new(0x05ac, 0x9219))
            .to_string();
        assert_eq!(
            text,
            "Vendor=0x05ac (Apple), Product=0x9219 [Apple Cinema Display 20\" (old)]"
        );
    }

    #[test]
    fn display_unknown_identity() {
        let registry = Registry::builtin().unwrap();
        let text = registry
            .display(DeviceIdentity::new(0x1234, 0x0001))
            .to_string();
        assert_eq!(text, "Vendor=0x1234, Product=0x0001");

        let text = registry
            .display(DeviceIdentity::new(0x05ac, 0x0001))
            .to_string();
        assert_eq!(text, "Vendor=0x05ac (Apple), Product=0x0001");
    }
}
