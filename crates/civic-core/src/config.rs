use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::Coordinates;
use crate::model::Priority;

pub const DATA_DIR_ENV: &str = "CIVIC_DIR";
pub const DEFAULT_DATA_DIR: &str = ".civic";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Fallback position for reports filed without `--lat/--lng`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

impl LocationConfig {
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Sleep for a notice's delay before printing it.
    #[serde(default)]
    pub simulate_delay: bool,
}

impl NotificationConfig {
    /// How long to wait before showing a notice with `delay`.
    #[must_use]
    pub fn wait_for(&self, delay: Option<Duration>) -> Option<Duration> {
        delay.filter(|_| self.simulate_delay)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub default_priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub data_dir: PathBuf,
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// `--data-dir`, then `CIVIC_DIR`, then `./.civic`.
#[must_use]
pub fn resolve_data_dir(cli: Option<&Path>) -> PathBuf {
    resolve_data_dir_from(cli, env::var_os(DATA_DIR_ENV).map(PathBuf::from))
}

fn resolve_data_dir_from(cli: Option<&Path>, env_dir: Option<PathBuf>) -> PathBuf {
    cli.map(Path::to_path_buf)
        .or_else(|| env_dir.filter(|p| !p.as_os_str().is_empty()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// # Errors
///
/// Unreadable or malformed `<data_dir>/config.toml`.
pub fn load_project_config(data_dir: &Path) -> Result<ProjectConfig> {
    let path = data_dir.join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Unreadable or malformed `<config_dir>/civic/config.toml`.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("civic/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Config file read/parse errors.
pub fn resolve_config(
    cli_data_dir: Option<&Path>,
    cli_format: Option<&str>,
) -> Result<EffectiveConfig> {
    let data_dir = resolve_data_dir(cli_data_dir);
    let project = load_project_config(&data_dir)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_format, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        data_dir,
        project,
        user,
        resolved_output,
    })
}

fn output_mode_name(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" => Some("pretty"),
        "text" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn resolve_output(
    cli_format: Option<&str>,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    let chosen = [cli_format, env_format, user_output]
        .into_iter()
        .flatten()
        .find_map(output_mode_name);

    if let Some(mode) = chosen {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir must be created");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.location.coordinates().is_none());
        assert!(!cfg.notifications.simulate_delay);
        assert_eq!(cfg.report.default_priority, Priority::Medium);
    }

    #[test]
    fn project_config_parses_sections() {
        let root = tempfile::tempdir().expect("temp dir must be created");
        std::fs::write(
            root.path().join("config.toml"),
            r#"
[location]
lat = 23.03
lng = 72.58
address = "Ward 5, Ahmedabad"

[notifications]
simulate_delay = true

[report]
default_priority = "high"
"#,
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("parse");
        let coords = cfg.location.coordinates().expect("coordinates");
        assert!((coords.lat - 23.03).abs() < f64::EPSILON);
        assert_eq!(cfg.location.address.as_deref(), Some("Ward 5, Ahmedabad"));
        assert_eq!(cfg.report.default_priority, Priority::High);
        assert_eq!(
            cfg.notifications.wait_for(Some(Duration::from_secs(1))),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let root = tempfile::tempdir().expect("temp dir must be created");
        std::fs::write(root.path().join("config.toml"), "[report\n").expect("write");
        let err = load_project_config(root.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn delays_skipped_unless_simulated() {
        let cfg = NotificationConfig::default();
        assert_eq!(cfg.wait_for(Some(Duration::from_secs(2))), None);
        assert_eq!(cfg.wait_for(None), None);
    }

    #[test]
    fn cli_format_overrides_env_and_config() {
        let output = resolve_output(Some("json"), Some("pretty"), Some("text"));
        assert_eq!(output, "json");
        let output = resolve_output(None, Some("pretty"), Some("text"));
        assert_eq!(output, "text");
        let output = resolve_output(None, Some("json"), Some("bogus"));
        assert_eq!(output, "json");
    }

    #[test]
    fn output_names_are_case_insensitive_and_closed() {
        assert_eq!(output_mode_name(" JSON "), Some("json"));
        assert_eq!(output_mode_name("Pretty"), Some("pretty"));
        assert_eq!(output_mode_name("human"), None);
        assert_eq!(resolve_output(None, Some("table"), Some("text")), "text");
    }

    #[test]
    fn data_dir_precedence() {
        let cli = PathBuf::from("/tmp/cli");
        assert_eq!(
            resolve_data_dir_from(Some(&cli), Some(PathBuf::from("/tmp/env"))),
            cli
        );
        assert_eq!(
            resolve_data_dir_from(None, Some(PathBuf::from("/tmp/env"))),
            PathBuf::from("/tmp/env")
        );
        assert_eq!(
            resolve_data_dir_from(None, Some(PathBuf::new())),
            PathBuf::from(".civic")
        );
        assert_eq!(resolve_data_dir_from(None, None), PathBuf::from(".civic"));
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"\n").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
