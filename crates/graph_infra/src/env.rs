use std::path::{Path, PathBuf};
use std::str::FromStr;

use graph_domain::{GraphConfig, HttpConfig, TlsBackend, TlsVersion};
use tracing::warn;
use url::Url;

/// Resolves [`GraphConfig`] from `GRAPH_*` environment variables, after
/// loading `.env` files from the working directory and its ancestors.
#[derive(Clone)]
pub struct GraphEnvironment {
    cwd: PathBuf,
}

impl GraphEnvironment {
    pub fn new(cwd: PathBuf) -> Self {
        Self::dot_env(&cwd);
        Self { cwd }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> GraphConfig {
        let defaults = GraphConfig::default();

        GraphConfig {
            graph_endpoint_url: parse_url("GRAPH_ENDPOINT_URL")
                .unwrap_or(defaults.graph_endpoint_url),
            read_only_endpoint_url: parse_url("GRAPH_READ_ONLY_ENDPOINT_URL")
                .unwrap_or(defaults.read_only_endpoint_url),
            video_endpoint_url: parse_url("GRAPH_VIDEO_ENDPOINT_URL")
                .unwrap_or(defaults.video_endpoint_url),
            access_token: parse_env::<String>("GRAPH_ACCESS_TOKEN"),
            app_secret: parse_env::<String>("GRAPH_APP_SECRET"),
            http_delete_fallback: parse_env::<bool>("GRAPH_HTTP_DELETE_FALLBACK")
                .unwrap_or(defaults.http_delete_fallback),
            user_agent: parse_env::<String>("GRAPH_USER_AGENT").unwrap_or(defaults.user_agent),
            http: resolve_http_config(),
        }
    }

    /// Load all `.env` files with priority to lower (closer) files.
    fn dot_env(cwd: &Path) -> Option<()> {
        let mut paths = vec![];
        let mut current = PathBuf::new();

        for component in cwd.components() {
            current.push(component);
            paths.push(current.clone());
        }

        paths.reverse();

        for path in paths {
            let env_file = path.join(".env");
            if env_file.is_file() {
                dotenvy::from_path(&env_file).ok();
            }
        }

        Some(())
    }
}

/// Trait for parsing environment variable values with custom logic for
/// different types
trait FromEnvStr: Sized {
    fn from_env_str(s: &str) -> Option<Self>;
}

/// Supports: "true", "1", "yes" (case-insensitive) as true; everything else as
/// false
impl FromEnvStr for bool {
    fn from_env_str(s: &str) -> Option<Self> {
        Some(matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
    }
}

macro_rules! impl_from_env_str_via_from_str {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromEnvStr for $t {
                fn from_env_str(s: &str) -> Option<Self> {
                    <$t as FromStr>::from_str(s).ok()
                }
            }
        )*
    };
}

impl_from_env_str_via_from_str! {
    u64, usize,
    String,
    TlsBackend,
    TlsVersion,
}

fn parse_env<T: FromEnvStr>(name: &str) -> Option<T> {
    std::env::var(name)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .and_then(|val| T::from_env_str(&val))
}

fn parse_url(name: &str) -> Option<Url> {
    let raw = parse_env::<String>(name)?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(error) => {
            warn!(variable = name, error = %error, "Ignoring invalid endpoint URL");
            None
        }
    }
}

fn resolve_http_config() -> HttpConfig {
    let mut config = HttpConfig::default();

    if let Some(parsed) = parse_env::<u64>("GRAPH_HTTP_CONNECT_TIMEOUT") {
        config.connect_timeout = parsed;
    }
    if let Some(parsed) = parse_env::<u64>("GRAPH_HTTP_READ_TIMEOUT") {
        config.read_timeout = parsed;
    }
    if let Some(parsed) = parse_env::<u64>("GRAPH_HTTP_POOL_IDLE_TIMEOUT") {
        config.pool_idle_timeout = parsed;
    }
    if let Some(parsed) = parse_env::<usize>("GRAPH_HTTP_POOL_MAX_IDLE_PER_HOST") {
        config.pool_max_idle_per_host = parsed;
    }
    if let Some(parsed) = parse_env::<usize>("GRAPH_HTTP_MAX_REDIRECTS") {
        config.max_redirects = parsed;
    }
    if let Some(parsed) = parse_env::<bool>("GRAPH_HTTP_USE_HICKORY") {
        config.hickory = parsed;
    }
    if let Some(parsed) = parse_env::<TlsBackend>("GRAPH_HTTP_TLS_BACKEND") {
        config.tls_backend = parsed;
    }
    if let Some(parsed) = parse_env::<TlsVersion>("GRAPH_HTTP_MIN_TLS_VERSION") {
        config.min_tls_version = Some(parsed);
    }
    if let Some(parsed) = parse_env::<TlsVersion>("GRAPH_HTTP_MAX_TLS_VERSION") {
        config.max_tls_version = Some(parsed);
    }

    config
}
