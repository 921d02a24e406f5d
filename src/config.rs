//! Environment-driven settings.
//!
//! Settings are read from process environment variables, after loading a
//! `.env` file from the working directory if one exists. Every variable has a
//! default, so an empty environment yields a usable configuration.
//!
//! ```rust
//! use steadfast::config::Settings;
//! use std::time::Duration;
//!
//! let settings = Settings::from_lookup(|key| match key {
//!     "TIMEOUT" => Some("10000".to_string()),
//!     "HEADLESS" => Some("false".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(settings.timeout, Duration::from_secs(10));
//! assert!(!settings.headless);
//! assert_eq!(settings.base_url, "http://localhost:3000");
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scenario::{LaunchOptions, Scenario, Viewport};

/// A variable that was present but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    variable: &'static str,
    value: String,
}

impl ConfigError {
    /// The offending variable.
    pub fn variable(&self) -> &'static str {
        self.variable
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} has an invalid value: {:?}", self.variable, self.value)
    }
}

impl std::error::Error for ConfigError {}

/// Suite settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Deployment name (`ENV`).
    pub env: String,
    /// Base URL for relative navigation (`BASE_URL`).
    pub base_url: String,
    /// Per-scenario timeout, also used for element waits (`TIMEOUT`, ms).
    pub timeout: Duration,
    /// Navigation timeout (`NAV_TIMEOUT`, ms).
    pub navigation_timeout: Duration,
    /// Timeout for visibility and text assertions.
    pub expect_timeout: Duration,
    /// Whole-scenario retries granted by the runner (`RETRIES`).
    pub retries: u32,
    /// Whether network failures should be retried (`RETRY_ON_NETWORK`).
    pub retry_on_network_failure: bool,
    /// Run the browser headless (`HEADLESS`).
    pub headless: bool,
    /// Driver slow-motion delay (`SLOWMO`, ms).
    pub slow_mo: Duration,
    /// Browser window size (`VIEWPORT_WIDTH`, `VIEWPORT_HEIGHT`).
    pub viewport: Viewport,
    /// Log filter directive (`LOG_LEVEL`).
    pub log_level: String,
    /// Directory for log files (`LOG_DIR`).
    pub log_dir: PathBuf,
    /// Directory holding the HTML report (`REPORT_DIR`).
    pub report_dir: PathBuf,
    /// Emit Allure results (`ENABLE_ALLURE`).
    pub enable_allure: bool,
    /// Allure output directory (`ALLURE_DIR`).
    pub allure_dir: PathBuf,
    /// Trace capture mode (`TRACE`).
    pub trace: String,
    /// Screenshot capture mode (`SCREENSHOT`).
    pub screenshot: String,
    /// Video capture mode (`VIDEO`).
    pub video: String,
}

impl Default for Settings {
    fn default() -> Self {
        // an empty lookup cannot fail to parse
        Self::from_lookup(|_| None).unwrap_or_else(|_| unreachable!())
    }
}

struct Reader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Reader<F> {
    fn string(&self, key: &str, default: &str) -> String {
        (self.lookup)(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match (self.lookup)(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                variable: key,
                value: raw,
            }),
        }
    }

    fn millis(&self, key: &'static str, default: u64) -> Result<Duration, ConfigError> {
        self.parse(key, default).map(Duration::from_millis)
    }

    /// True unless the variable is exactly `false`.
    fn enabled_unless_false(&self, key: &str) -> bool {
        (self.lookup)(key).as_deref() != Some("false")
    }

    /// False unless the variable is exactly `true`.
    fn disabled_unless_true(&self, key: &str) -> bool {
        (self.lookup)(key).as_deref() == Some("true")
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let r = Reader { lookup };
        Ok(Self {
            env: r.string("ENV", "test"),
            base_url: r.string("BASE_URL", "http://localhost:3000"),
            timeout: r.millis("TIMEOUT", 30_000)?,
            navigation_timeout: r.millis("NAV_TIMEOUT", 30_000)?,
            expect_timeout: Duration::from_millis(5_000),
            retries: r.parse("RETRIES", 2)?,
            retry_on_network_failure: r.enabled_unless_false("RETRY_ON_NETWORK"),
            headless: r.enabled_unless_false("HEADLESS"),
            slow_mo: r.millis("SLOWMO", 0)?,
            viewport: Viewport {
                width: r.parse("VIEWPORT_WIDTH", 1280)?,
                height: r.parse("VIEWPORT_HEIGHT", 720)?,
            },
            log_level: r.string("LOG_LEVEL", "info"),
            log_dir: PathBuf::from(r.string("LOG_DIR", "logs")),
            report_dir: PathBuf::from(r.string("REPORT_DIR", "playwright-report")),
            enable_allure: r.disabled_unless_true("ENABLE_ALLURE"),
            allure_dir: PathBuf::from(r.string("ALLURE_DIR", "allure-results")),
            trace: r.string("TRACE", "on-first-retry"),
            screenshot: r.string("SCREENSHOT", "only-on-failure"),
            video: r.string("VIDEO", "retain-on-failure"),
        })
    }

    /// Options for launching the browser.
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            headless: self.headless,
            slow_mo: self.slow_mo,
            viewport: self.viewport,
        }
    }

    /// A scenario whose element waits and assertions use these timeouts.
    pub fn scenario(&self, name: impl Into<String>) -> Scenario {
        Scenario::new(name)
            .with_element_timeout(self.timeout)
            .with_expect_timeout(self.expect_timeout)
    }

    /// Resolve `path` against [`Settings::base_url`]; absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Path of the HTML report's index page.
    pub fn report_index(&self) -> PathBuf {
        self.report_dir.join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.env, "test");
        assert_eq!(s.timeout, Duration::from_secs(30));
        assert_eq!(s.navigation_timeout, Duration::from_secs(30));
        assert_eq!(s.retries, 2);
        assert!(s.retry_on_network_failure);
        assert!(s.headless);
        assert_eq!(s.slow_mo, Duration::ZERO);
        assert_eq!(s.viewport, Viewport::default());
        assert_eq!(s.log_level, "info");
        assert_eq!(s.log_dir, PathBuf::from("logs"));
        assert!(!s.enable_allure);
        assert_eq!(s.trace, "on-first-retry");
        assert_eq!(s.screenshot, "only-on-failure");
        assert_eq!(s.video, "retain-on-failure");
    }

    #[test]
    fn test_boolean_flags_only_flip_on_exact_values() {
        let s = settings(&[
            ("HEADLESS", "FALSE"),
            ("RETRY_ON_NETWORK", "false"),
            ("ENABLE_ALLURE", "yes"),
        ])
        .unwrap();
        assert!(s.headless);
        assert!(!s.retry_on_network_failure);
        assert!(!s.enable_allure);

        let s = settings(&[("ENABLE_ALLURE", "true")]).unwrap();
        assert!(s.enable_allure);
    }

    #[test]
    fn test_numbers_are_parsed() {
        let s = settings(&[
            ("TIMEOUT", "1500"),
            ("SLOWMO", "250"),
            ("VIEWPORT_WIDTH", "1920"),
            ("VIEWPORT_HEIGHT", " 1080 "),
            ("RETRIES", "0"),
        ])
        .unwrap();
        assert_eq!(s.timeout, Duration::from_millis(1500));
        assert_eq!(s.slow_mo, Duration::from_millis(250));
        assert_eq!(s.viewport, Viewport { width: 1920, height: 1080 });
        assert_eq!(s.retries, 0);
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = settings(&[("NAV_TIMEOUT", "soon")]).unwrap_err();
        assert_eq!(err.variable(), "NAV_TIMEOUT");
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_launch_options_follow_settings() {
        let s = settings(&[("HEADLESS", "false"), ("SLOWMO", "100")]).unwrap();
        let options = s.launch_options();
        assert!(!options.headless);
        assert_eq!(options.slow_mo, Duration::from_millis(100));
    }

    #[test]
    fn test_url_resolution() {
        let s = settings(&[("BASE_URL", "https://shop.test/")]).unwrap();
        assert_eq!(s.url("/cart"), "https://shop.test/cart");
        assert_eq!(s.url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_report_index() {
        let s = settings(&[("REPORT_DIR", "out")]).unwrap();
        assert_eq!(s.report_index(), PathBuf::from("out").join("index.html"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_uses_configured_timeout() {
        use crate::page::PageError;
        use crate::testing::{Element, SiteBuilder};

        let s = settings(&[("TIMEOUT", "1200")]).unwrap();
        let browser = SiteBuilder::new()
            .page("https://example.com", "Example", vec![Element::new("h1", "Example")])
            .browser();

        let result = s
            .scenario("slow element")
            .run(
                || async move { Ok(browser) },
                |ctx| {
                    Box::pin(async move {
                        let actions = ctx.actions();
                        actions.goto("https://example.com").await?;
                        actions.wait_for_element("#never").await
                    })
                },
            )
            .await;

        match result {
            Err(crate::scenario::ScenarioError::Failed(PageError::Timeout { timeout, .. })) => {
                assert_eq!(timeout, Duration::from_millis(1200))
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_settings_serialize() {
        let s = Settings::default();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["base_url"], "http://localhost:3000");
        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
