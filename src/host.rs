//! Hostname module.
//! Picks the machine hostname: the `--host` override, else an interactive prompt that
//! offers the gateway identifier as the default.
//! Applying it to the running system is best effort; a failure only affects the live session.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::Input;
use tracing::{info, warn};

use crate::error::ProvisionError;

/// Entered text wins when non-empty, otherwise the identifier is used.
pub fn choose_hostname(default: &str, entered: &str) -> String {
    if entered.is_empty() {
        default.to_string()
    } else {
        entered.to_string()
    }
}

/// Resolves the hostname, prompting on the terminal only when no override was given.
/// A non-terminal stdin is read as a single line instead.
pub fn resolve_hostname(supplied: Option<&str>, gateway_id: &str) -> Result<String, ProvisionError> {
    if !io::stdin().is_terminal() {
        return resolve_hostname_from(supplied, gateway_id, io::stdin().lock());
    }
    if let Some(name) = override_name(supplied) {
        return Ok(name);
    }

    let entered = Input::<String>::new()
        .with_prompt("Enter hostname")
        .default(gateway_id.to_string())
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ProvisionError::Prompt(e.to_string()))?;

    Ok(choose_hostname(gateway_id, &entered))
}

/// Same as [`resolve_hostname`], reading the answer from `reader` instead of a terminal.
pub fn resolve_hostname_from(
    supplied: Option<&str>,
    gateway_id: &str,
    reader: impl BufRead,
) -> Result<String, ProvisionError> {
    if let Some(name) = override_name(supplied) {
        return Ok(name);
    }

    let entered = read_line(reader)?;
    Ok(choose_hostname(gateway_id, &entered))
}

fn override_name(supplied: Option<&str>) -> Option<String> {
    supplied.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Reads one line without its line terminator; EOF yields an empty string.
fn read_line(mut reader: impl BufRead) -> Result<String, ProvisionError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| ProvisionError::Prompt(e.to_string()))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Sets the machine hostname. Failures are logged and swallowed.
pub fn apply_hostname(name: &str) {
    match hostname::set(name) {
        Ok(()) => info!(hostname = name, "hostname set"),
        Err(e) => warn!(hostname = name, error = %e, "failed to set hostname, continuing"),
    }
}
