use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::capture::{SimulatedConfig, SimulatedOutcome};
use crate::session::SessionConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub session: SessionSettings,
    pub platforms: PlatformSettings,
    pub simulator: SimulatorSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub restart_grace_ms: u64,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub connect_placeholder_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    pub outcome: SimulatedOutcome,
    pub acquire_latency_ms: u64,
    pub release_cooldown_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "stream-studio".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            restart_grace_ms: 500,
            tick_interval_ms: 1000,
        }
    }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            connect_placeholder_ms: 2000,
        }
    }
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            outcome: SimulatedOutcome::Granted,
            acquire_latency_ms: 150,
            release_cooldown_ms: 0,
        }
    }
}

impl Config {
    /// Load from an optional config file, then `STREAM_STUDIO__*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("STREAM_STUDIO").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        settings
            .try_deserialize()
            .context("Failed to parse stream studio config")
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            restart_grace: Duration::from_millis(self.session.restart_grace_ms),
            tick_interval: Duration::from_millis(self.session.tick_interval_ms.max(1)),
        }
    }

    pub fn connect_placeholder(&self) -> Duration {
        Duration::from_millis(self.platforms.connect_placeholder_ms)
    }

    pub fn simulated_config(&self) -> SimulatedConfig {
        SimulatedConfig {
            outcome: self.simulator.outcome,
            acquire_latency: Duration::from_millis(self.simulator.acquire_latency_ms),
            release_cooldown: Duration::from_millis(self.simulator.release_cooldown_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing");
        let cfg = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(cfg.service.name, "stream-studio");
        assert_eq!(cfg.service.http.port, 8787);
        assert_eq!(cfg.session_config().restart_grace, Duration::from_millis(500));
        assert_eq!(cfg.session_config().tick_interval, Duration::from_secs(1));
        assert_eq!(cfg.connect_placeholder(), Duration::from_secs(2));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("studio.toml");
        fs::write(
            &path,
            r#"
[service]
name = "studio-test"

[service.http]
port = 9100

[session]
restart_grace_ms = 750
"#,
        )
        .unwrap();

        let cfg = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(cfg.service.name, "studio-test");
        assert_eq!(cfg.service.http.port, 9100);
        assert_eq!(cfg.service.http.bind, "127.0.0.1");
        assert_eq!(cfg.session.restart_grace_ms, 750);
        assert_eq!(cfg.session.tick_interval_ms, 1000);
    }
}
