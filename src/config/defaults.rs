use super::Config;

/// Settings written on first run.
pub fn defaults() -> Config {
    Config::default()
}
