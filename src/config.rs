use crate::cli::BackendArgs;
use crate::paths;
use crate::provider::{
    DEFAULT_RULER_PREFIX, DashboardProvider, DatasourceProvider, RuleGroupProvider,
};
use anyhow::{Context, Result, bail};
use reconcile::Registry;
use restkit::{Auth, Endpoint, HttpClient, Transport, Unconfigured};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Config File
// ============================================================================

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grafana: GrafanaConfig,
    pub ruler: RulerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrafanaConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Folder dashboards are written to (0 is General)
    pub folder_id: i64,
    /// Lifetime of preview snapshots in seconds
    pub snapshot_expires: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulerConfig {
    pub url: Option<String>,
    pub tenant_id: Option<String>,
    pub api_key: Option<String>,
    pub prefix: String,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            url: None,
            tenant_id: None,
            api_key: None,
            prefix: DEFAULT_RULER_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load config from an explicit path, or from the config dir if it exists
    ///
    /// An explicit path must exist. A missing default file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = paths::config_file()?;
                if !path.exists() {
                    log::debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay command-line and environment settings
    pub fn apply_overrides(&mut self, args: &BackendArgs) {
        fn set(target: &mut Option<String>, value: Option<&String>) {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        set(&mut self.grafana.url, args.grafana_url.as_ref());
        set(&mut self.grafana.token, args.grafana_token.as_ref());
        set(&mut self.grafana.user, args.grafana_user.as_ref());
        set(&mut self.grafana.password, args.grafana_password.as_ref());
        set(&mut self.ruler.url, args.ruler_url.as_ref());
        set(&mut self.ruler.tenant_id, args.ruler_tenant_id.as_ref());
        set(&mut self.ruler.api_key, args.ruler_api_key.as_ref());
    }

    /// Build the provider registry with a transport per backend
    pub fn registry(&self) -> Result<Registry> {
        let grafana = self.grafana.transport();
        let ruler = self.ruler.transport();
        log::debug!("Grafana: {}", grafana.describe());
        log::debug!("Ruler: {}", ruler.describe());

        let registry = Registry::new()
            .with(Box::new(
                DashboardProvider::new(grafana.clone())
                    .with_folder(self.grafana.folder_id)
                    .with_snapshot_expiry(self.grafana.snapshot_expires),
            ))?
            .with(Box::new(DatasourceProvider::new(grafana)))?
            .with(Box::new(
                RuleGroupProvider::new(ruler).with_prefix(self.ruler.prefix.as_str()),
            ))?;
        Ok(registry)
    }
}

// ============================================================================
// Endpoints
// ============================================================================

impl GrafanaConfig {
    /// Endpoint for the Grafana HTTP API, if a URL is configured
    pub fn endpoint(&self) -> Option<Endpoint> {
        let url = self.url.as_deref().filter(|u| !u.is_empty())?;
        let mut endpoint = Endpoint::new(url);

        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            endpoint = endpoint.with_auth(Auth::Bearer(token.to_string()));
        } else if let Some(user) = &self.user {
            endpoint = endpoint.with_auth(Auth::Basic {
                username: user.clone(),
                password: self.password.clone().unwrap_or_default(),
            });
        }
        Some(endpoint)
    }

    fn transport(&self) -> Arc<dyn Transport> {
        match self.endpoint() {
            Some(endpoint) => Arc::new(HttpClient::new(endpoint)),
            None => Arc::new(Unconfigured::new(
                "Grafana URL not set (use --grafana-url, GRAFANA_URL or [grafana] url)",
            )),
        }
    }
}

impl RulerConfig {
    /// Endpoint for the ruler API, if a URL is configured
    pub fn endpoint(&self) -> Option<Endpoint> {
        let url = self.url.as_deref().filter(|u| !u.is_empty())?;
        let mut endpoint = Endpoint::new(url);
        let tenant = self.tenant_id.clone().unwrap_or_default();

        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            endpoint = endpoint.with_auth(Auth::Basic {
                username: tenant.clone(),
                password: key.to_string(),
            });
        }
        if !tenant.is_empty() {
            endpoint = endpoint.with_header("X-Scope-OrgID", tenant);
        }
        Some(endpoint)
    }

    fn transport(&self) -> Arc<dyn Transport> {
        match self.endpoint() {
            Some(endpoint) => Arc::new(HttpClient::new(endpoint)),
            None => Arc::new(Unconfigured::new(
                "Ruler URL not set (use --ruler-url, CORTEX_ADDRESS or [ruler] url)",
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
[grafana]
url = "http://localhost:3000"
token = "glsa_abc"
folder_id = 4
snapshot_expires = 3600

[ruler]
url = "http://cortex:9009"
tenant_id = "team"
api_key = "secret"
prefix = "prometheus/config/v1/rules"
"#,
        )
        .unwrap();

        assert_eq!(config.grafana.url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.grafana.folder_id, 4);
        assert_eq!(config.grafana.snapshot_expires, Some(3600));
        assert_eq!(config.ruler.tenant_id.as_deref(), Some("team"));
        assert_eq!(config.ruler.prefix, "prometheus/config/v1/rules");
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.grafana.folder_id, 0);
        assert_eq!(config.ruler.prefix, "api/v1/rules");
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(Config::parse("[grafana]\nfolder_id = \"general\"").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/gauge.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grafana]\nurl = \"http://g\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.grafana.url.as_deref(), Some("http://g"));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = Config::parse("[grafana]\nurl = \"http://file\"\ntoken = \"t\"").unwrap();
        let args = BackendArgs {
            grafana_url: Some("http://flag".into()),
            ruler_tenant_id: Some("tenant".into()),
            ..BackendArgs::default()
        };

        config.apply_overrides(&args);
        assert_eq!(config.grafana.url.as_deref(), Some("http://flag"));
        assert_eq!(config.grafana.token.as_deref(), Some("t"));
        assert_eq!(config.ruler.tenant_id.as_deref(), Some("tenant"));
    }

    #[test]
    fn test_grafana_prefers_token_over_basic() {
        let grafana = GrafanaConfig {
            url: Some("http://g/".into()),
            token: Some("tok".into()),
            user: Some("admin".into()),
            password: Some("admin".into()),
            ..GrafanaConfig::default()
        };
        let endpoint = grafana.endpoint().unwrap();
        assert_eq!(endpoint.base_url(), "http://g");
        assert!(matches!(endpoint.auth(), Some(Auth::Bearer(t)) if t == "tok"));
    }

    #[test]
    fn test_grafana_basic_auth() {
        let grafana = GrafanaConfig {
            url: Some("http://g".into()),
            user: Some("admin".into()),
            ..GrafanaConfig::default()
        };
        let endpoint = grafana.endpoint().unwrap();
        assert!(matches!(
            endpoint.auth(),
            Some(Auth::Basic { username, password }) if username == "admin" && password.is_empty()
        ));
    }

    #[test]
    fn test_no_url_no_endpoint() {
        assert!(GrafanaConfig::default().endpoint().is_none());
        assert!(RulerConfig::default().endpoint().is_none());
    }

    #[test]
    fn test_ruler_tenant_header_and_auth() {
        let ruler = RulerConfig {
            url: Some("http://cortex".into()),
            tenant_id: Some("team".into()),
            api_key: Some("key".into()),
            ..RulerConfig::default()
        };
        let endpoint = ruler.endpoint().unwrap();

        assert!(
            endpoint
                .headers()
                .iter()
                .any(|(name, value)| name == "X-Scope-OrgID" && value == "team")
        );
        assert!(matches!(
            endpoint.auth(),
            Some(Auth::Basic { username, password }) if username == "team" && password == "key"
        ));
    }

    #[test]
    fn test_ruler_without_key_has_no_auth() {
        let ruler = RulerConfig {
            url: Some("http://cortex".into()),
            tenant_id: Some("team".into()),
            ..RulerConfig::default()
        };
        assert!(ruler.endpoint().unwrap().auth().is_none());
    }

    #[test]
    fn test_registry_claims_all_paths() {
        let registry = Config::default().registry().unwrap();
        assert_eq!(registry.len(), 3);
        for path in [
            "grafanaDashboards",
            "grafanaDatasources",
            "prometheusAlerts",
            "prometheusRules",
        ] {
            assert!(registry.for_path(path).is_some(), "{path} unclaimed");
        }
    }

    #[test]
    fn test_unconfigured_backend_fails_on_use() {
        let registry = Config::default().registry().unwrap();
        let provider = registry.get("datasource").unwrap();
        let err = provider.get_by_uid("prom-1").unwrap_err();
        assert!(err.to_string().contains("GRAFANA_URL"));
    }
}
