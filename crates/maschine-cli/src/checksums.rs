//! Release checksum files
//!
//! Parses `<sha256>  <filename>` listings and maps release archive names
//! (`<project>_<version>_<os>_<arch>.tar.gz|zip`) to manifest platform keys
//! (`<os>-<arch>`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::CliError;

static LINE_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([a-f0-9]{64})\s+(.+)$").ok());

/// Filename to hex digest for every well-formed line
pub fn parse_checksums(text: &str) -> BTreeMap<String, String> {
    let Some(re) = LINE_RE.as_ref() else {
        return BTreeMap::new();
    };
    text.lines()
        .filter_map(|line| re.captures(line.trim_end()))
        .map(|caps| (caps[2].to_string(), caps[1].to_string()))
        .collect()
}

pub fn read_checksums(path: &Path) -> Result<BTreeMap<String, String>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Checksums {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_checksums(&text))
}

/// Platform key for a release archive of `project`, if the name matches
pub fn extract_platform(filename: &str, project: &str) -> Option<String> {
    let pattern = format!(
        r"^{}_.*?_([^_]+)_([^.]+)\.(tar\.gz|zip)$",
        regex::escape(project)
    );
    let caps = Regex::new(&pattern).ok()?.captures(filename)?;

    let os = &caps[1];
    let arch = match &caps[2] {
        "x86_64" => "amd64",
        "i386" => "386",
        other => other,
    };
    Some(format!("{}-{}", os, arch))
}

/// Manifest checksum entries (`platform -> sha256:<hex>`) for `project`
pub fn platform_checksums(
    checksums: &BTreeMap<String, String>,
    project: &str,
) -> BTreeMap<String, String> {
    checksums
        .iter()
        .filter_map(|(filename, hash)| {
            extract_platform(filename, project).map(|platform| (platform, format!("sha256:{}", hash)))
        })
        .collect()
}
