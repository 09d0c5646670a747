use std::path::{Path, PathBuf};

use crate::error::{parse_yes_no, ConfigError};
use crate::options::OptionMap;

pub const BOUNDING_BOX_KEY: &str = "bbox";
pub const OUTPUT_KEY: &str = "output";
pub const CLEAN_KEY: &str = "clean";
/// Older name for `--clean`, still accepted
pub const CLEAN_ALIAS_KEY: &str = "clean_network";

/// Restricts what is read from the input. The ordinates are kept in the order given; nothing
/// checks that min is below max.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// `None` means read everything
pub fn resolve_bounding_box(options: &OptionMap) -> Result<Option<BoundingBox>, ConfigError> {
    let Some(raw) = options.non_blank(BOUNDING_BOX_KEY) else {
        return Ok(None);
    };

    let malformed = || ConfigError::MalformedBoundingBox(raw.to_string());
    let ordinates = raw
        .split(',')
        .map(|x| x.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed())?;
    let &[min_x, min_y, max_x, max_y] = ordinates.as_slice() else {
        return Err(malformed());
    };

    Ok(Some(BoundingBox {
        min_x,
        min_y,
        max_x,
        max_y,
    }))
}

pub fn resolve_output_directory(options: &OptionMap, default: &Path) -> PathBuf {
    match options.non_blank(OUTPUT_KEY) {
        Some(output) => PathBuf::from(output),
        None => default.to_path_buf(),
    }
}

/// Clean unless told not to
pub fn resolve_clean_network_flag(options: &OptionMap) -> Result<bool, ConfigError> {
    if let Some(value) = options.non_blank(CLEAN_KEY) {
        return parse_yes_no(CLEAN_KEY, Some(value), true);
    }
    parse_yes_no(CLEAN_ALIAS_KEY, options.non_blank(CLEAN_ALIAS_KEY), true)
}
