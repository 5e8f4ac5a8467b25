//! Identifier module.
//! Derives the gateway EUI from a network interface's hardware address.
//! The 6-byte MAC is padded to EUI-64 style by inserting `FFFE` between its halves:
//! `aa:bb:cc:dd:ee:ff` becomes `AABBCCFFFEDDEEFF`.
//! The primary interface (usually ethernet) is tried first, then the fallback (usually wlan).

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::ProvisionError;

const SYSFS_NET: &str = "/sys/class/net";
const MAC_HEX_LEN: usize = 12;
const EUI_PADDING: &str = "FFFE";

/// Source of raw hardware addresses, keyed by interface name.
pub trait InterfaceLookup {
    /// Returns the textual hardware address of `interface`, or `None` when the
    /// interface is absent or has no hardware address.
    fn hardware_address(&self, interface: &str) -> Option<String>;
}

/// Reads addresses from the Linux sysfs tree (`<root>/<iface>/address`).
#[derive(Debug, Clone)]
pub struct SysfsInterfaces {
    root: PathBuf,
}

impl SysfsInterfaces {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsInterfaces {
    fn default() -> Self {
        Self::new(SYSFS_NET)
    }
}

impl InterfaceLookup for SysfsInterfaces {
    fn hardware_address(&self, interface: &str) -> Option<String> {
        let path = self.root.join(interface).join("address");
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(interface, path = %path.display(), error = %e, "interface not readable");
                return None;
            }
        };

        let address = raw.trim();
        // loopback and tunnels report an empty or all-zero address
        let is_unset = address
            .chars()
            .all(|c| c == '0' || c == ':' || c == '-');
        if is_unset {
            debug!(interface, "interface has no hardware address");
            return None;
        }

        Some(address.to_string())
    }
}

/// Why a single interface produced no identifier.
#[derive(Debug, PartialEq, Eq)]
enum Miss {
    Absent,
    Malformed { address: String },
}

/// Derives the 16-character gateway identifier, trying `primary` then `fallback`.
///
/// The fallback is consulted only when the primary yields no usable identifier.
/// When both fail, a malformed address is reported ahead of a missing interface.
pub fn derive_identifier(
    lookup: &impl InterfaceLookup,
    primary: &str,
    fallback: &str,
) -> Result<String, ProvisionError> {
    let primary_miss = match identifier_for(lookup, primary) {
        Ok(id) => {
            info!(interface = primary, gateway_id = %id, "derived gateway identifier");
            return Ok(id);
        }
        Err(miss) => miss,
    };

    warn!(interface = primary, reason = ?primary_miss, "primary interface unusable, trying {}", fallback);

    let fallback_miss = match identifier_for(lookup, fallback) {
        Ok(id) => {
            info!(interface = fallback, gateway_id = %id, "derived gateway identifier");
            return Ok(id);
        }
        Err(miss) => miss,
    };

    match (primary_miss, fallback_miss) {
        (_, Miss::Malformed { address }) => Err(ProvisionError::MalformedAddress {
            interface: fallback.to_string(),
            address,
        }),
        (Miss::Malformed { address }, Miss::Absent) => Err(ProvisionError::MalformedAddress {
            interface: primary.to_string(),
            address,
        }),
        (Miss::Absent, Miss::Absent) => Err(ProvisionError::InterfaceNotFound {
            primary: primary.to_string(),
            fallback: fallback.to_string(),
        }),
    }
}

fn identifier_for(lookup: &impl InterfaceLookup, interface: &str) -> Result<String, Miss> {
    let address = lookup.hardware_address(interface).ok_or(Miss::Absent)?;
    format_identifier(&address).ok_or(Miss::Malformed { address })
}

/// Converts a `:`/`-` separated 48-bit address into the padded identifier.
/// Returns `None` unless exactly 12 hex digits remain after removing separators.
pub fn format_identifier(address: &str) -> Option<String> {
    let hex: String = address
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect();

    if hex.len() != MAC_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let hex = hex.to_ascii_uppercase();
    let (oui, nic) = hex.split_at(MAC_HEX_LEN / 2);
    Some(format!("{oui}{EUI_PADDING}{nic}"))
}
