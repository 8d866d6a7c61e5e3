use figment::{
    providers::Env,
    Figment,
};

use crate::selector::InstanceCap;

use super::{Config, ConfigError, InstanceConfig, InstanceId, InstanceKind, Settings};

/// Environment variables the scalar settings are read from.
const SETTINGS_VARS: &[&str] = &[
    "max_upgrades",
    "dry_run",
    "debug_mode",
    "delay_between_instances",
    "history_cooldown_days",
    "history_file",
    "debug_dir",
    "http_timeout_secs",
];

/// Load the full configuration from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let settings = settings_from(Figment::new().merge(Env::raw().only(SETTINGS_VARS)))?;
    let instances = scan_instances(|var| std::env::var(var).ok())?;
    Ok(Config {
        settings,
        instances,
    })
}

/// Extract scalar settings from a prepared figment (useful for testing).
pub fn settings_from(figment: Figment) -> Result<Settings, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::Settings(e.to_string()))
}

/// Discover numbered instance blocks (`RADARR0_URL`, `SONARR1_API_KEY`, ...)
/// through `lookup`. Discovery stops per kind at the first ordinal missing
/// either the URL or the API key.
pub fn scan_instances<F>(lookup: F) -> Result<Vec<InstanceConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut instances = Vec::new();

    for kind in [InstanceKind::Radarr, InstanceKind::Sonarr] {
        let mut ordinal = 0;
        loop {
            let prefix = format!("{}{}", kind.env_prefix(), ordinal);
            let (url, api_key) = match (
                lookup(&format!("{prefix}_URL")),
                lookup(&format!("{prefix}_API_KEY")),
            ) {
                (Some(url), Some(api_key)) => (url, api_key),
                _ => break,
            };

            let cap_var = format!("{prefix}_NUM_TO_UPGRADE");
            let upgrade_cap = match lookup(&cap_var) {
                None => InstanceCap::Unlimited,
                Some(raw) => raw
                    .trim()
                    .parse::<i64>()
                    .map(InstanceCap::from_configured)
                    .map_err(|_| ConfigError::InvalidValue {
                        var: cap_var,
                        value: raw,
                    })?,
            };

            instances.push(InstanceConfig {
                id: InstanceId::new(kind, ordinal),
                url: url.trim_end_matches('/').to_string(),
                api_key,
                upgrade_cap,
            });
            ordinal += 1;
        }
    }

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;
    use serde_json::json;
    use std::collections::HashMap;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |var| {
            pairs
                .iter()
                .find(|(name, _)| *name == var)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_settings_from_defaults() {
        let settings = settings_from(Figment::new()).unwrap();
        assert_eq!(settings.max_upgrades, 20);
        assert_eq!(settings.history_cooldown_days, 30);
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_settings_from_overrides() {
        let figment = Figment::from(Serialized::defaults(json!({
            "max_upgrades": -1,
            "dry_run": true,
            "delay_between_instances": 0,
            "history_cooldown_days": 7,
            "history_file": "/data/history.json",
        })));
        let settings = settings_from(figment).unwrap();
        assert_eq!(settings.max_upgrades, -1);
        assert!(settings.dry_run);
        assert_eq!(settings.delay_between_instances, 0);
        assert_eq!(settings.history_cooldown_days, 7);
        assert_eq!(settings.history_file.to_str().unwrap(), "/data/history.json");
    }

    #[test]
    fn test_settings_from_malformed_value_fails() {
        let figment = Figment::from(Serialized::defaults(json!({
            "max_upgrades": "plenty",
        })));
        let result = settings_from(figment);
        assert!(matches!(result, Err(ConfigError::Settings(_))));
    }

    #[test]
    fn test_scan_instances_empty_environment() {
        let instances = scan_instances(|_| None).unwrap();
        assert!(instances.is_empty());
    }

    #[test]
    fn test_scan_instances_orders_radarr_before_sonarr() {
        let vars = [
            ("RADARR0_URL", "http://radarr:7878"),
            ("RADARR0_API_KEY", "aaa"),
            ("SONARR0_URL", "http://sonarr:8989"),
            ("SONARR0_API_KEY", "bbb"),
            ("SONARR1_URL", "http://sonarr-4k:8989"),
            ("SONARR1_API_KEY", "ccc"),
            ("SONARR1_NUM_TO_UPGRADE", "3"),
        ];
        let instances = scan_instances(env(&vars)).unwrap();
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].id.to_string(), "radarr0");
        assert_eq!(instances[1].id.to_string(), "sonarr0");
        assert_eq!(instances[2].id.to_string(), "sonarr1");
        assert_eq!(instances[0].upgrade_cap, InstanceCap::Unlimited);
        assert_eq!(instances[2].upgrade_cap, InstanceCap::Limit(3));
    }

    #[test]
    fn test_scan_instances_stops_at_first_gap() {
        // RADARR2 exists but RADARR1 is incomplete, so discovery ends at 1.
        let vars = [
            ("RADARR0_URL", "http://radarr:7878"),
            ("RADARR0_API_KEY", "aaa"),
            ("RADARR1_URL", "http://radarr-4k:7878"),
            ("RADARR2_URL", "http://radarr-8k:7878"),
            ("RADARR2_API_KEY", "ccc"),
        ];
        let instances = scan_instances(env(&vars)).unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].id.ordinal, 0);
    }

    #[test]
    fn test_scan_instances_trims_trailing_slash() {
        let vars = [
            ("RADARR0_URL", "http://radarr:7878/"),
            ("RADARR0_API_KEY", "aaa"),
        ];
        let instances = scan_instances(env(&vars)).unwrap();
        assert_eq!(instances[0].url, "http://radarr:7878");
    }

    #[test]
    fn test_scan_instances_cap_semantics() {
        let mut vars = HashMap::new();
        vars.insert("RADARR0_URL", "http://r0:7878");
        vars.insert("RADARR0_API_KEY", "k0");
        vars.insert("RADARR0_NUM_TO_UPGRADE", "0");
        vars.insert("RADARR1_URL", "http://r1:7878");
        vars.insert("RADARR1_API_KEY", "k1");
        vars.insert("RADARR1_NUM_TO_UPGRADE", "-1");
        let instances =
            scan_instances(|var| vars.get(var).map(|v| v.to_string())).unwrap();
        assert_eq!(instances[0].upgrade_cap, InstanceCap::Limit(0));
        assert_eq!(instances[1].upgrade_cap, InstanceCap::Unlimited);
    }

    #[test]
    fn test_scan_instances_malformed_cap_fails() {
        let vars = [
            ("SONARR0_URL", "http://sonarr:8989"),
            ("SONARR0_API_KEY", "bbb"),
            ("SONARR0_NUM_TO_UPGRADE", "lots"),
        ];
        let result = scan_instances(env(&vars));
        match result {
            Err(ConfigError::InvalidValue { var, value }) => {
                assert_eq!(var, "SONARR0_NUM_TO_UPGRADE");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
