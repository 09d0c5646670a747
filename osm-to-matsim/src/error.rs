use thiserror::Error;

/// Why a set of command line options couldn't be turned into a configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("--{0} option missing, this is required")]
    MissingRequiredOption(&'static str),

    #[error("unknown value {value} for --{key}, choose from {}", .allowed.join(", "))]
    UnknownOptionValue {
        key: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("bounding box is expected to have 4 comma separated numbers but found {0}")]
    MalformedBoundingBox(String),
}

/// The values accepted by every yes/no option
pub const YES_NO: &[&str] = &["yes", "no"];

/// Parse a yes/no option. Absent or blank values fall back to `default`; anything else than
/// "yes" or "no" is rejected.
pub fn parse_yes_no(
    key: &'static str,
    value: Option<&str>,
    default: bool,
) -> Result<bool, ConfigError> {
    match value {
        None => Ok(default),
        Some("yes") => Ok(true),
        Some("no") => Ok(false),
        Some(other) => Err(ConfigError::UnknownOptionValue {
            key,
            value: other.to_string(),
            allowed: YES_NO,
        }),
    }
}
