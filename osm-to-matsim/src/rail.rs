use crate::error::{parse_yes_no, ConfigError};
use crate::options::OptionMap;

pub const RAIL_KEY: &str = "rail";
pub const PT_INFRASTRUCTURE_KEY: &str = "ptinfra";

/// Parse stops, stations and platforms? Off unless asked for.
pub fn resolve_pt_infrastructure_flag(options: &OptionMap) -> Result<bool, ConfigError> {
    parse_yes_no(
        PT_INFRASTRUCTURE_KEY,
        options.non_blank(PT_INFRASTRUCTURE_KEY),
        false,
    )
}

/// Public transport infrastructure is mostly useless without the tracks, so asking for it
/// switches rail on, unless `--rail` says otherwise.
pub fn resolve_default_rail_activation(options: &OptionMap) -> Result<bool, ConfigError> {
    resolve_pt_infrastructure_flag(options)
}

pub fn resolve_rail_activation(options: &OptionMap) -> Result<bool, ConfigError> {
    let default = resolve_default_rail_activation(options)?;
    parse_yes_no(RAIL_KEY, options.non_blank(RAIL_KEY), default)
}
