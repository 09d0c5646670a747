use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ConfigError;
use crate::options::OptionMap;

pub const INPUT_KEY: &str = "input";
pub const COUNTRY_KEY: &str = "country";

/// Used when no country is given; the reader then applies country-neutral defaults
pub const GLOBAL_COUNTRY: &str = "Global";

pub fn resolve_country(options: &OptionMap) -> String {
    options
        .non_blank(COUNTRY_KEY)
        .unwrap_or(GLOBAL_COUNTRY)
        .to_string()
}

/// The input is required. Anything that names an existing local file, including `file://` URLs,
/// becomes an absolute path. Everything else, like `https://` URLs, is passed on unchanged for the
/// reader to stream.
pub fn resolve_input_source(
    options: &OptionMap,
    working_dir: &Path,
) -> Result<String, ConfigError> {
    let Some(input) = options.non_blank(INPUT_KEY) else {
        return Err(ConfigError::MissingRequiredOption(INPUT_KEY));
    };

    if let Some(path) = as_local_file(input, working_dir) {
        return Ok(path.display().to_string());
    }
    Ok(input.to_string())
}

fn as_local_file(input: &str, working_dir: &Path) -> Option<PathBuf> {
    // A single letter scheme is a Windows drive, not a URL
    if let Ok(url) = Url::parse(input) {
        if url.scheme() == "file" {
            return url.to_file_path().ok();
        }
        if url.scheme().len() > 1 {
            return None;
        }
    }

    let path = working_dir.join(input);
    if !path.is_file() {
        return None;
    }
    Some(std::fs::canonicalize(&path).unwrap_or(path))
}

/// Is this input something to fetch over the network, rather than read from disk?
pub fn is_remote(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
