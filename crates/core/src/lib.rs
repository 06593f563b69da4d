//! acdcontrol-core: display registry, hiddev probing, and brightness transactions.
//!
//! This crate holds the logic for recognizing USB-HID displays (Apple
//! Cinema/Studio Displays and compatibles) among hiddev nodes and for reading
//! and writing their backlight brightness through the HID feature report.

pub mod brightness;
pub mod config;
pub mod error;
#[cfg(target_os = "linux")]
pub mod hiddev;
pub mod probe;
pub mod registry;
pub mod report;
pub mod request;
pub mod safety;
pub mod session;
pub mod transport;

/// Apple USB Vendor ID.
pub const APPLE_VID: u16 = 0x05AC;
/// Samsung Electronics USB Vendor ID.
pub const SAMSUNG_VID: u16 = 0x0419;

/// Known display product IDs.
pub mod pids {
    /// Apple Studio Display 15".
    pub const STUDIO_DISPLAY_15: u16 = 0x9215;
    /// Apple Studio Display 17".
    pub const STUDIO_DISPLAY_17: u16 = 0x9217;
    /// Apple Cinema Display 23" (old and new revisions).
    pub const CINEMA_DISPLAY_23: u16 = 0x9218;
    /// Apple Cinema Display 20" (old and new revisions).
    pub const CINEMA_DISPLAY_20: u16 = 0x9219;
    /// Apple Cinema Display 24".
    pub const CINEMA_DISPLAY_24: u16 = 0x921E;
    /// Apple Cinema HD Display 30".
    pub const CINEMA_HD_DISPLAY_30: u16 = 0x9232;
    /// Samsung SyncMaster 757NF.
    pub const SYNCMASTER_757NF: u16 = 0x8002;
}
