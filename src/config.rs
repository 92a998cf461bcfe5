use std::collections::HashMap;

pub const CONF_FILE_NAME: &str = "countdown.ini";
const SECTION: &str = "countdown";

pub const DEFAULT_WARN_AT: u64 = 15;           // Yellow below this many seconds
pub const DEFAULT_ALERT_AT: u64 = 5;           // Red below this many seconds

const MIN_DURATION: i64 = 1;                   // Minimum pre-filled duration
const MAX_SECONDS: u64 = 86_400;               // One day

type IniMap = HashMap<String, HashMap<String, Option<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
  /// Pre-fills the duration input. Not applied until Set.
  pub duration: Option<i64>,
  pub warn_at: u64,
  pub alert_at: u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self { duration: None, warn_at: DEFAULT_WARN_AT, alert_at: DEFAULT_ALERT_AT }
  }
}

impl Settings {
  /// Read settings from an ini file, falling back to defaults for anything missing or invalid.
  pub fn load(path: &str) -> Self {
    info!("Reading config from {}", path);
    match ini!(safe path) {
      Ok(map) => Self::from_map(&map),
      Err(error) => {
        eprintln!("Warning: Couldn't load config file '{}': {}", path, error);
        info!("Using default configuration");
        Self::default()
      }
    }
  }

  pub fn from_map(map: &IniMap) -> Self {
    let mut settings = Self::default();
    let Some(section) = map.get(SECTION) else {
      info!("No [{}] section, using defaults", SECTION);
      return settings;
    };
    let value = |key: &str| section.get(key).and_then(|v| v.as_deref());

    if let Some(val) = value("duration") {
      settings.duration = parse_duration_config(val);
    }
    if let Some(val) = value("warn") {
      settings.warn_at = parse_seconds_config(val, "warn", DEFAULT_WARN_AT);
    }
    if let Some(val) = value("alert") {
      settings.alert_at = parse_seconds_config(val, "alert", DEFAULT_ALERT_AT);
    }
    if settings.alert_at > settings.warn_at {
      warn!("alert ({}) is above warn ({}), using defaults for both", settings.alert_at, settings.warn_at);
      eprintln!("Warning: alert threshold above warn threshold, using defaults");
      settings.warn_at = DEFAULT_WARN_AT;
      settings.alert_at = DEFAULT_ALERT_AT;
    }
    info!("Loaded {:?}", settings);
    settings
  }
}

fn parse_duration_config(value: &str) -> Option<i64> {
  match value.trim().parse::<i64>() {
    Ok(secs) if (MIN_DURATION..=MAX_SECONDS as i64).contains(&secs) => Some(secs),
    Ok(secs) => {
      warn!("Config value 'duration' = {} is out of valid range [{}, {}], ignoring", secs, MIN_DURATION, MAX_SECONDS);
      eprintln!("Warning: duration value {} out of range, ignoring", secs);
      None
    }
    Err(e) => {
      warn!("Failed to parse config value 'duration' = '{}': {}, ignoring", value, e);
      eprintln!("Warning: Invalid duration value '{}', ignoring", value);
      None
    }
  }
}

fn parse_seconds_config(value: &str, config_name: &str, default: u64) -> u64 {
  match value.trim().parse::<u64>() {
    Ok(secs) if secs <= MAX_SECONDS => secs,
    Ok(secs) => {
      warn!("Config value '{}' = {} is out of valid range [0, {}], using default {}",
            config_name, secs, MAX_SECONDS, default);
      eprintln!("Warning: {} value {} out of range, using default {}", config_name, secs, default);
      default
    }
    Err(e) => {
      warn!("Failed to parse config value '{}' = '{}': {}, using default {}",
            config_name, value, e, default);
      eprintln!("Warning: Invalid {} value '{}', using default {}", config_name, value, default);
      default
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ini(entries: &[(&str, &str)]) -> IniMap {
    let section = entries
      .iter()
      .map(|(k, v)| (k.to_string(), Some(v.to_string())))
      .collect();
    HashMap::from([(SECTION.to_string(), section)])
  }

  #[test]
  fn test_defaults_without_section() {
    let settings = Settings::from_map(&HashMap::new());
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.duration, None);
  }

  #[test]
  fn test_all_values() {
    let settings = Settings::from_map(&ini(&[("duration", "90"), ("warn", "30"), ("alert", "10")]));
    assert_eq!(settings.duration, Some(90));
    assert_eq!(settings.warn_at, 30);
    assert_eq!(settings.alert_at, 10);
  }

  #[test]
  fn test_duration_out_of_range() {
    assert_eq!(Settings::from_map(&ini(&[("duration", "0")])).duration, None);
    assert_eq!(Settings::from_map(&ini(&[("duration", "-3")])).duration, None);
    assert_eq!(Settings::from_map(&ini(&[("duration", "86401")])).duration, None);
    assert_eq!(Settings::from_map(&ini(&[("duration", "86400")])).duration, Some(86_400));
  }

  #[test]
  fn test_duration_invalid() {
    assert_eq!(Settings::from_map(&ini(&[("duration", "soon")])).duration, None);
  }

  #[test]
  fn test_threshold_invalid_uses_default() {
    let settings = Settings::from_map(&ini(&[("warn", "lots"), ("alert", "999999")]));
    assert_eq!(settings.warn_at, DEFAULT_WARN_AT);
    assert_eq!(settings.alert_at, DEFAULT_ALERT_AT);
  }

  #[test]
  fn test_alert_above_warn() {
    let settings = Settings::from_map(&ini(&[("warn", "3"), ("alert", "8")]));
    assert_eq!(settings.warn_at, DEFAULT_WARN_AT);
    assert_eq!(settings.alert_at, DEFAULT_ALERT_AT);
  }

  #[test]
  fn test_zero_thresholds_allowed() {
    let settings = Settings::from_map(&ini(&[("warn", "0"), ("alert", "0")]));
    assert_eq!(settings.warn_at, 0);
    assert_eq!(settings.alert_at, 0);
  }

  #[test]
  fn test_missing_file() {
    let settings = Settings::load("does-not-exist.ini");
    assert_eq!(settings, Settings::default());
  }
}
