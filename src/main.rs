mod bands;
mod config;
mod error;
mod host;
mod identifier;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{AssembleParams, GpsMode, GpsSelection};
use identifier::{InterfaceLookup, SysfsInterfaces};

fn cli() -> Command {
    Command::new("gateway-provision")
        .version(env!("CARGO_PKG_VERSION"))
        .about("First-boot provisioning for LoRaWAN packet forwarder gateways")
        .arg(Arg::new("eth").long("eth").value_name("IFACE").help("eth interface name").default_value("eth0"))
        .arg(Arg::new("wlan").long("wlan").value_name("IFACE").help("wlan interface name").default_value("wlan0"))
        .arg(
            Arg::new("gc")
                .long("gc")
                .value_name("PATH")
                .help("global conf path")
                .default_value("/opt/ttn-gateway/bin/global_conf.json")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("lc")
                .long("lc")
                .value_name("PATH")
                .help("local conf path")
                .default_value("/opt/ttn-gateway/bin/local_conf.json")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("gpso")
                .long("gpso")
                .value_name("MODE")
                .help("GPS mode")
                .default_value("gps")
                .value_parser(["gps", "fake", "none"]),
        )
        .arg(Arg::new("gpsp").long("gpsp").value_name("PATH").help("gps tty path when using a gps").default_value("/dev/ttyS0"))
        .arg(Arg::new("host").long("host").value_name("NAME").help("set host name (prompts when omitted)"))
        .arg(
            Arg::new("no-set-hostname")
                .long("no-set-hostname")
                .help("resolve the hostname but leave the machine's hostname untouched")
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("server").long("server").value_name("HOST").help("server to forward packets to").default_value("localhost"))
        .arg(
            Arg::new("up")
                .long("up")
                .value_name("PORT")
                .help("udp up port")
                .default_value("1700")
                .value_parser(value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("down")
                .long("down")
                .value_name("PORT")
                .help("udp down port")
                .default_value("1700")
                .value_parser(value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("band")
                .long("band")
                .value_name("REGION")
                .help("band for global_conf.json: AS1, AS2, AU, CN, EU, IN, KR, RU or US")
                .default_value("AU"),
        )
        .arg(
            Arg::new("bands-dir")
                .long("bands-dir")
                .value_name("DIR")
                .help("directory holding the packaged band files")
                .default_value("bands")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("lat")
                .long("lat")
                .help("ref latitude")
                .default_value("-33.433567")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("lng")
                .long("lng")
                .help("ref longitude")
                .default_value("-70.6217137")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("alt")
                .long("alt")
                .help("ref altitude")
                .default_value("600")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32)),
        )
        .arg(Arg::new("contact-email").long("contact-email").value_name("EMAIL").default_value("contacto@manglar.cl"))
        .arg(Arg::new("description").long("description").value_name("TEXT").default_value("Manglar GW"))
}

/// Reads a defaulted argument; absence means the command definition and lookup disagree.
fn arg<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, id: &str) -> Result<&'a T> {
    matches
        .get_one::<T>(id)
        .with_context(|| format!("missing value for --{id}"))
}

fn run(matches: &ArgMatches, interfaces: &impl InterfaceLookup) -> Result<()> {
    let eth = arg::<String>(matches, "eth")?;
    let wlan = arg::<String>(matches, "wlan")?;

    // Step 1: gateway identifier from the ethernet MAC, wlan as fallback
    let gateway_id = identifier::derive_identifier(interfaces, eth, wlan)
        .context("Failed to derive gateway identifier")?;

    // Step 2: hostname, prompting with the identifier as default
    let hostname = host::resolve_hostname(
        matches.get_one::<String>("host").map(String::as_str),
        &gateway_id,
    )
    .context("Failed to resolve hostname")?;
    if matches.get_flag("no-set-hostname") {
        info!(hostname = %hostname, "leaving machine hostname unchanged");
    } else {
        host::apply_hostname(&hostname);
    }

    // Step 3: local configuration
    let gps_mode: GpsMode = arg::<String>(matches, "gpso")?
        .parse()
        .map_err(anyhow::Error::msg)?;
    let gps = GpsSelection::select(gps_mode, arg::<String>(matches, "gpsp")?);
    info!(mode = %gps_mode, selection = ?gps, "gps mode selected");

    let conf = config::assemble(AssembleParams {
        gateway_id: gateway_id.clone(),
        server_address: arg::<String>(matches, "server")?.clone(),
        port_up: *arg::<u16>(matches, "up")?,
        port_down: *arg::<u16>(matches, "down")?,
        latitude: *arg::<f64>(matches, "lat")?,
        longitude: *arg::<f64>(matches, "lng")?,
        altitude: *arg::<i32>(matches, "alt")?,
        contact_email: arg::<String>(matches, "contact-email")?.clone(),
        description: arg::<String>(matches, "description")?.clone(),
        gps,
    });

    let lc_path = arg::<PathBuf>(matches, "lc")?;
    println!("Your Gateway ID is {}", gateway_id);
    config::persist(&conf, lc_path)
        .with_context(|| format!("Failed to write local configuration to {}", lc_path.display()))?;

    // Step 4: regional band plan; the local conf above stays written if this fails
    let band = arg::<String>(matches, "band")?;
    bands::install_band_file(band, arg::<PathBuf>(matches, "bands-dir")?, arg::<PathBuf>(matches, "gc")?)
        .with_context(|| format!("Failed to install band configuration for {band}"))?;

    info!(gateway_id = %gateway_id, hostname = %hostname, band = %band, "provisioning complete");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let matches = cli().get_matches();
    run(&matches, &SysfsInterfaces::default())
}
