//! Band module.
//! Installs the packaged regional global_conf.json (radio channel plan) for the packet forwarder.
//! The region table is compiled in; the files themselves ship in the `bands/` directory.
//! Contents are copied byte for byte and never parsed.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::ProvisionError;

/// Region code to packaged band file name.
pub const BAND_FILES: &[(&str, &str)] = &[
    ("AS1", "AS1-global_conf.json"),
    ("AS2", "AS2-global_conf.json"),
    ("AU", "AU-global_conf.json"),
    ("CN", "CN-global_conf.json"),
    ("EU", "EU-global_conf.json"),
    ("IN", "IN-global_conf.json"),
    ("KR", "KR-global_conf.json"),
    ("RU", "RU-global_conf.json"),
    ("US", "US-global_conf.json"),
];

/// Looks up the band file for `region`; codes match exactly.
pub fn band_file_name(region: &str) -> Option<&'static str> {
    BAND_FILES
        .iter()
        .find(|(code, _)| *code == region)
        .map(|(_, file)| *file)
}

pub fn known_regions() -> String {
    BAND_FILES
        .iter()
        .map(|(code, _)| *code)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Copies the packaged band file for `region` from `bands_dir` to `target`.
/// Nothing is written when the region is unknown or the source can't be read.
pub fn install_band_file(region: &str, bands_dir: &Path, target: &Path) -> Result<(), ProvisionError> {
    let file_name =
        band_file_name(region).ok_or_else(|| ProvisionError::UnknownRegion(region.to_string()))?;

    let source = bands_dir.join(file_name);
    let content = fs::read(&source).map_err(|e| ProvisionError::io(&source, e))?;
    fs::write(target, &content).map_err(|e| ProvisionError::io(target, e))?;

    info!(
        region,
        source = %source.display(),
        target = %target.display(),
        bytes = content.len(),
        "installed band configuration"
    );
    Ok(())
}
