//! Centralized constants for names and well-known services

/// Separator between namespace segments in service names
pub const SEPARATOR: char = '.';

/// Well-known service name injected into container-aware types
pub const CONTAINER_SERVICE: &str = "container";

/// Well-known service name injected into logger-aware types
pub const LOGGER_SERVICE: &str = "logger";

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "WIREBOX";

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "WIREBOX_LOG";

/// Normalize a service name by stripping leading separators
pub fn normalize(name: &str) -> &str {
    name.trim_start_matches(SEPARATOR)
}
