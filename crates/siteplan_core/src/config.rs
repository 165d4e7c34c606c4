use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::matcher::MatchSettings;
use crate::overlay::OverlaySettings;
use crate::plan::PlanSettings;

pub const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".siteplan/config.toml";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub matching: MatchingSection,
    #[serde(default)]
    pub overlay: OverlaySection,
    #[serde(default)]
    pub plan: PlanSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct MatchingSection {
    pub match_threshold: Option<f64>,
    pub cannibalization_threshold: Option<f64>,
    pub h1_weight: Option<f64>,
    pub title_weight: Option<f64>,
    pub url_weight: Option<f64>,
    pub query_weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct OverlaySection {
    pub aligned_threshold: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct PlanSection {
    pub keep_min_score: Option<f64>,
    pub optimize_min_score: Option<f64>,
    pub redirect_min_clicks: Option<u64>,
    pub prune_max_score: Option<f64>,
}

/// Settings after env > config > default resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSettings {
    pub matching: MatchSettings,
    pub overlay: OverlaySettings,
    pub plan: PlanSettings,
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl EngineConfig {
    /// Matching settings: env SITEPLAN_MATCH_THRESHOLD / SITEPLAN_CANNIBALIZATION_THRESHOLD
    /// > config > built-in defaults.
    pub fn match_settings(&self) -> MatchSettings {
        self.match_settings_from(&env_value)
    }

    /// Overlay settings: env SITEPLAN_ALIGNED_THRESHOLD > config > default.
    pub fn overlay_settings(&self) -> OverlaySettings {
        self.overlay_settings_from(&env_value)
    }

    /// Plan settings: env SITEPLAN_REDIRECT_MIN_CLICKS > config > defaults.
    pub fn plan_settings(&self) -> PlanSettings {
        self.plan_settings_from(&env_value)
    }

    /// Resolve every section against the process environment and validate the
    /// result, so out-of-range env overrides fail like out-of-range file values.
    pub fn resolve(&self) -> Result<ResolvedSettings> {
        self.resolve_from(&env_value)
    }

    /// Validate the file values on their own, before any env override.
    pub fn validate(&self) -> Result<()> {
        self.resolve_from(&|_: &str| None).map(|_| ())
    }

    fn resolve_from(&self, lookup: EnvLookup<'_>) -> Result<ResolvedSettings> {
        let resolved = ResolvedSettings {
            matching: self.match_settings_from(lookup),
            overlay: self.overlay_settings_from(lookup),
            plan: self.plan_settings_from(lookup),
        };
        validate_settings(&resolved)?;
        Ok(resolved)
    }

    fn match_settings_from(&self, lookup: EnvLookup<'_>) -> MatchSettings {
        let defaults = MatchSettings::default();
        let section = &self.matching;
        MatchSettings {
            match_threshold: resolve_f64(
                lookup("SITEPLAN_MATCH_THRESHOLD"),
                section.match_threshold,
                defaults.match_threshold,
            ),
            cannibalization_threshold: resolve_f64(
                lookup("SITEPLAN_CANNIBALIZATION_THRESHOLD"),
                section.cannibalization_threshold,
                defaults.cannibalization_threshold,
            ),
            h1_weight: section.h1_weight.unwrap_or(defaults.h1_weight),
            title_weight: section.title_weight.unwrap_or(defaults.title_weight),
            url_weight: section.url_weight.unwrap_or(defaults.url_weight),
            query_weight: section.query_weight.unwrap_or(defaults.query_weight),
        }
    }

    fn overlay_settings_from(&self, lookup: EnvLookup<'_>) -> OverlaySettings {
        let defaults = OverlaySettings::default();
        OverlaySettings {
            aligned_threshold: resolve_f64(
                lookup("SITEPLAN_ALIGNED_THRESHOLD"),
                self.overlay.aligned_threshold,
                defaults.aligned_threshold,
            ),
        }
    }

    fn plan_settings_from(&self, lookup: EnvLookup<'_>) -> PlanSettings {
        let defaults = PlanSettings::default();
        let section = &self.plan;
        PlanSettings {
            keep_min_score: section.keep_min_score.unwrap_or(defaults.keep_min_score),
            optimize_min_score: section
                .optimize_min_score
                .unwrap_or(defaults.optimize_min_score),
            redirect_min_clicks: resolve_u64(
                lookup("SITEPLAN_REDIRECT_MIN_CLICKS"),
                section.redirect_min_clicks,
                defaults.redirect_min_clicks,
            ),
            prune_max_score: section.prune_max_score.unwrap_or(defaults.prune_max_score),
        }
    }
}

pub fn validate_settings(settings: &ResolvedSettings) -> Result<()> {
    let matching = &settings.matching;
    for (name, value) in [
        ("matching.match_threshold", matching.match_threshold),
        (
            "matching.cannibalization_threshold",
            matching.cannibalization_threshold,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("{name} must be between 0 and 1, got {value}");
        }
    }

    let weights = [
        ("matching.h1_weight", matching.h1_weight),
        ("matching.title_weight", matching.title_weight),
        ("matching.url_weight", matching.url_weight),
        ("matching.query_weight", matching.query_weight),
    ];
    for (name, value) in weights {
        if !value.is_finite() || value < 0.0 {
            bail!("{name} must be a non-negative number, got {value}");
        }
    }
    if weights.iter().map(|(_, value)| value).sum::<f64>() <= 0.0 {
        bail!("matching weights must not all be zero");
    }

    let plan = &settings.plan;
    for (name, value) in [
        ("overlay.aligned_threshold", settings.overlay.aligned_threshold),
        ("plan.keep_min_score", plan.keep_min_score),
        ("plan.optimize_min_score", plan.optimize_min_score),
        ("plan.prune_max_score", plan.prune_max_score),
    ] {
        if !(0.0..=100.0).contains(&value) {
            bail!("{name} must be between 0 and 100, got {value}");
        }
    }

    if plan.optimize_min_score > plan.keep_min_score {
        bail!(
            "plan.optimize_min_score ({}) cannot exceed plan.keep_min_score ({})",
            plan.optimize_min_score,
            plan.keep_min_score
        );
    }
    Ok(())
}

/// Load, parse and validate an EngineConfig. Returns default if the file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<EngineConfig> {
    if !config_path.exists() {
        return Ok(EngineConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: EngineConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    parsed
        .validate()
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    Ok(parsed)
}

/// Config path: explicit flag > env SITEPLAN_CONFIG > `<root>/.siteplan/config.toml`.
pub fn resolve_config_path(explicit: Option<&Path>, project_root: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(value) = env_value("SITEPLAN_CONFIG") {
        return PathBuf::from(value);
    }
    project_root.join(DEFAULT_CONFIG_RELATIVE_PATH)
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_f64(env_value: Option<String>, configured: Option<f64>, default: f64) -> f64 {
    if let Some(raw) = env_value {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => return value,
            _ => warn!(value = %raw, "ignoring non-numeric environment override"),
        }
    }
    configured.unwrap_or(default)
}

fn resolve_u64(env_value: Option<String>, configured: Option<u64>, default: u64) -> u64 {
    if let Some(raw) = env_value {
        match raw.parse::<u64>() {
            Ok(value) => return value,
            Err(_) => warn!(value = %raw, "ignoring non-integer environment override"),
        }
    }
    configured.unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_has_no_overrides() {
        let config = EngineConfig::default();
        assert!(config.matching.match_threshold.is_none());
        assert!(config.plan.redirect_min_clicks.is_none());
        config.validate().expect("default config is valid");
    }

    #[test]
    fn load_config_returns_default_for_missing_file() {
        let config = load_config(Path::new("/nonexistent/config.toml")).expect("load config");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn load_config_parses_sections() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[matching]
match_threshold = 0.5
h1_weight = 0.4

[overlay]
aligned_threshold = 65.0

[plan]
redirect_min_clicks = 25
prune_max_score = 20.0
"#,
        )
        .expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(config.matching.match_threshold, Some(0.5));
        assert_eq!(config.matching.h1_weight, Some(0.4));
        assert_eq!(config.overlay.aligned_threshold, Some(65.0));
        assert_eq!(config.plan.redirect_min_clicks, Some(25));
        assert_eq!(config.plan.prune_max_score, Some(20.0));
        assert!(config.matching.title_weight.is_none());
    }

    #[test]
    fn load_config_tolerates_unrelated_sections() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[crawl]\nmax_pages = 10\n").expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn load_config_returns_error_for_invalid_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[matching\nmatch_threshold = 0.4").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn load_config_rejects_out_of_range_threshold() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[matching]\nmatch_threshold = 1.5\n").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(format!("{error:#}").contains("matching.match_threshold"));
    }

    #[test]
    fn validate_rejects_negative_weights_and_inverted_scores() {
        let mut config = EngineConfig::default();
        config.matching.query_weight = Some(-0.1);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.plan.optimize_min_score = Some(80.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn configured_values_override_defaults() {
        let mut config = EngineConfig::default();
        config.matching.url_weight = Some(0.5);
        config.plan.keep_min_score = Some(75.0);
        assert_eq!(config.match_settings().url_weight, 0.5);
        assert_eq!(config.match_settings().h1_weight, 0.30);
        assert_eq!(config.plan_settings().keep_min_score, 75.0);
        assert_eq!(config.plan_settings().optimize_min_score, 40.0);
    }

    #[test]
    fn env_value_wins_over_config_and_default() {
        assert_eq!(resolve_f64(Some("0.55".into()), Some(0.5), 0.4), 0.55);
        assert_eq!(resolve_f64(None, Some(0.5), 0.4), 0.5);
        assert_eq!(resolve_f64(None, None, 0.4), 0.4);
        assert_eq!(resolve_f64(Some("abc".into()), Some(0.5), 0.4), 0.5);
        assert_eq!(resolve_u64(Some("30".into()), Some(20), 10), 30);
        assert_eq!(resolve_u64(Some("-1".into()), None, 10), 10);
    }

    #[test]
    fn validate_rejects_all_zero_weights() {
        let mut config = EngineConfig::default();
        config.matching.h1_weight = Some(0.0);
        config.matching.title_weight = Some(0.0);
        config.matching.url_weight = Some(0.0);
        config.matching.query_weight = Some(0.0);
        let error = config.validate().expect_err("must fail");
        assert!(error.to_string().contains("weights must not all be zero"));

        config.matching.url_weight = Some(1.0);
        config.validate().expect("one live weight is enough");
    }

    #[test]
    fn env_overrides_are_range_checked() {
        let config = EngineConfig::default();
        let lookup = |name: &str| (name == "SITEPLAN_MATCH_THRESHOLD").then(|| "1.5".to_string());
        let error = config.resolve_from(&lookup).expect_err("must fail");
        assert!(error.to_string().contains("matching.match_threshold"));

        let lookup = |name: &str| (name == "SITEPLAN_ALIGNED_THRESHOLD").then(|| "140".to_string());
        let error = config.resolve_from(&lookup).expect_err("must fail");
        assert!(error.to_string().contains("overlay.aligned_threshold"));
    }

    #[test]
    fn env_overrides_within_range_resolve() {
        let mut config = EngineConfig::default();
        config.matching.match_threshold = Some(0.5);
        let lookup = |name: &str| match name {
            "SITEPLAN_MATCH_THRESHOLD" => Some("0.45".to_string()),
            "SITEPLAN_REDIRECT_MIN_CLICKS" => Some("25".to_string()),
            _ => None,
        };
        let resolved = config.resolve_from(&lookup).expect("resolve");
        assert_eq!(resolved.matching.match_threshold, 0.45);
        assert_eq!(resolved.plan.redirect_min_clicks, 25);
        assert_eq!(resolved.overlay.aligned_threshold, 60.0);
    }

    #[test]
    fn explicit_config_path_wins() {
        let explicit = Path::new("/tmp/custom.toml");
        assert_eq!(
            resolve_config_path(Some(explicit), Path::new("/repo")),
            PathBuf::from("/tmp/custom.toml")
        );
    }
}
