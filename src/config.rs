//! Config module.
//! Builds the packet forwarder's local_conf.json (gateway id, forwarding server, location, GPS mode).
//! Uses serde for JSON serialization; field names follow the forwarder's own keys.
//! The document is a single `gateway_conf` object and is rewritten in full on every run.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::error::ProvisionError;

/// Forwarding server the gateway sends uplinks to and pulls downlinks from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServerEndpoint {
    #[serde(rename = "server_address")]
    pub address: String,
    #[serde(rename = "serv_port_up")]
    pub port_up: u16,
    #[serde(rename = "serv_port_down")]
    pub port_down: u16,
    #[serde(rename = "serv_enabled")]
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GatewayConfiguration {
    #[serde(rename = "gateway_ID")]
    pub gateway_id: String,
    pub servers: Vec<ServerEndpoint>,
    pub ref_latitude: f64,
    pub ref_longitude: f64,
    pub ref_altitude: i32,
    pub contact_email: String,
    pub description: String,
    pub fake_gps: bool,
    pub gps: bool,
    pub gps_tty_path: String,
}

#[derive(Serialize)]
struct LocalConf<'a> {
    gateway_conf: &'a GatewayConfiguration,
}

/// GPS mode requested on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GpsMode {
    #[default]
    Gps,
    Fake,
    None,
}

impl FromStr for GpsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gps" => Ok(GpsMode::Gps),
            "fake" => Ok(GpsMode::Fake),
            "none" => Ok(GpsMode::None),
            other => Err(format!("unknown GPS mode `{other}` (expected gps, fake or none)")),
        }
    }
}

impl std::fmt::Display for GpsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpsMode::Gps => write!(f, "gps"),
            GpsMode::Fake => write!(f, "fake"),
            GpsMode::None => write!(f, "none"),
        }
    }
}

/// Resolved GPS behaviour; exactly one of these ends up in the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GpsSelection {
    Real { tty_path: String },
    Fake,
    Disabled,
}

impl GpsSelection {
    /// Real GPS needs a device path; without one the gateway runs with GPS disabled.
    pub fn select(mode: GpsMode, tty_path: &str) -> Self {
        match mode {
            GpsMode::Gps if !tty_path.is_empty() => GpsSelection::Real {
                tty_path: tty_path.to_string(),
            },
            GpsMode::Fake => GpsSelection::Fake,
            GpsMode::Gps | GpsMode::None => GpsSelection::Disabled,
        }
    }
}

/// Caller-supplied inputs for [`assemble`].
#[derive(Clone, Debug)]
pub struct AssembleParams {
    pub gateway_id: String,
    pub server_address: String,
    pub port_up: u16,
    pub port_down: u16,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: i32,
    pub contact_email: String,
    pub description: String,
    pub gps: GpsSelection,
}

pub fn assemble(params: AssembleParams) -> GatewayConfiguration {
    let (gps, fake_gps, gps_tty_path) = match params.gps {
        GpsSelection::Real { tty_path } => (true, false, tty_path),
        GpsSelection::Fake => (false, true, String::new()),
        GpsSelection::Disabled => (false, false, String::new()),
    };

    GatewayConfiguration {
        gateway_id: params.gateway_id,
        servers: vec![ServerEndpoint {
            address: params.server_address,
            port_up: params.port_up,
            port_down: params.port_down,
            enabled: true,
        }],
        ref_latitude: params.latitude,
        ref_longitude: params.longitude,
        ref_altitude: params.altitude,
        contact_email: params.contact_email,
        description: params.description,
        fake_gps,
        gps,
        gps_tty_path,
    }
}

/// Serializes the configuration under `gateway_conf` and overwrites `path`.
pub fn persist(config: &GatewayConfiguration, path: &Path) -> Result<(), ProvisionError> {
    let json = serde_json::to_vec_pretty(&LocalConf {
        gateway_conf: config,
    })?;

    fs::write(path, json).map_err(|e| ProvisionError::io(path, e))?;
    info!(path = %path.display(), gateway_id = %config.gateway_id, "wrote local configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn params(gps: GpsSelection) -> AssembleParams {
        AssembleParams {
            gateway_id: "B827EBFFFE123456".to_string(),
            server_address: "router.eu.thethings.network".to_string(),
            port_up: 1700,
            port_down: 1701,
            latitude: -33.433567,
            longitude: -70.6217137,
            altitude: 600,
            contact_email: "contacto@manglar.cl".to_string(),
            description: "Manglar GW".to_string(),
            gps,
        }
    }

    #[test]
    fn test_gps_mode_parse() {
        assert_eq!("gps".parse::<GpsMode>(), Ok(GpsMode::Gps));
        assert_eq!("fake".parse::<GpsMode>(), Ok(GpsMode::Fake));
        assert_eq!("none".parse::<GpsMode>(), Ok(GpsMode::None));
        assert!("glonass".parse::<GpsMode>().is_err());
    }

    #[test]
    fn test_gps_selection_is_exclusive() {
        assert_eq!(GpsSelection::select(GpsMode::Fake, "/dev/ttyS0"), GpsSelection::Fake);
        assert_eq!(
            GpsSelection::select(GpsMode::Gps, "/dev/ttyS0"),
            GpsSelection::Real { tty_path: "/dev/ttyS0".to_string() }
        );
        assert_eq!(GpsSelection::select(GpsMode::Gps, ""), GpsSelection::Disabled);
        assert_eq!(GpsSelection::select(GpsMode::None, "/dev/ttyS0"), GpsSelection::Disabled);
    }

    #[test]
    fn test_assemble_gps_flags() {
        let real = assemble(params(GpsSelection::Real { tty_path: "/dev/ttyAMA0".to_string() }));
        assert!(real.gps && !real.fake_gps);
        assert_eq!(real.gps_tty_path, "/dev/ttyAMA0");

        let fake = assemble(params(GpsSelection::Fake));
        assert!(!fake.gps && fake.fake_gps);
        assert!(fake.gps_tty_path.is_empty());

        let off = assemble(params(GpsSelection::Disabled));
        assert!(!off.gps && !off.fake_gps);
    }

    #[test]
    fn test_assemble_single_enabled_server() {
        let conf = assemble(params(GpsSelection::Disabled));
        assert_eq!(
            conf.servers,
            vec![ServerEndpoint {
                address: "router.eu.thethings.network".to_string(),
                port_up: 1700,
                port_down: 1701,
                enabled: true,
            }]
        );
        assert_eq!(conf.gateway_id, "B827EBFFFE123456");
        assert_eq!(conf.ref_altitude, 600);
    }

    #[test]
    fn test_persist_writes_forwarder_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_conf.json");
        let conf = assemble(params(GpsSelection::Fake));

        persist(&conf, &path).unwrap();

        let doc: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let gw = &doc["gateway_conf"];
        assert_eq!(doc.as_object().unwrap().len(), 1);
        assert_eq!(gw["gateway_ID"], "B827EBFFFE123456");
        assert_eq!(gw["servers"][0]["server_address"], "router.eu.thethings.network");
        assert_eq!(gw["servers"][0]["serv_port_up"], 1700);
        assert_eq!(gw["servers"][0]["serv_port_down"], 1701);
        assert_eq!(gw["servers"][0]["serv_enabled"], true);
        assert_eq!(gw["ref_latitude"], -33.433567);
        assert_eq!(gw["ref_longitude"], -70.6217137);
        assert_eq!(gw["ref_altitude"], 600);
        assert_eq!(gw["contact_email"], "contacto@manglar.cl");
        assert_eq!(gw["description"], "Manglar GW");
        assert_eq!(gw["fake_gps"], true);
        assert_eq!(gw["gps"], false);
        assert_eq!(gw["gps_tty_path"], "");
    }

    #[test]
    fn test_persist_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_conf.json");
        fs::write(&path, "x".repeat(4096)).unwrap();

        persist(&assemble(params(GpsSelection::Disabled)), &path).unwrap();

        let doc: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(doc["gateway_conf"]["gps"], false);
    }

    #[test]
    fn test_persist_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("local_conf.json");

        let err = persist(&assemble(params(GpsSelection::Disabled)), &path).unwrap_err();
        assert!(matches!(err, ProvisionError::Io { .. }));
    }
}
