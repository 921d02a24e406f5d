//! Per-scenario browser context with guaranteed teardown.
//!
//! Each scenario gets its own [`ScenarioContext`]: a launched browser, one
//! open page and the retry configuration for page actions. Nothing is shared
//! between scenarios, so independent scenarios can run concurrently.
//!
//! [`Scenario::run`] follows the acquire/use/release shape:
//!
//! 1. **Acquire**: launch the browser and open a page
//! 2. **Use**: run the scenario body against the context
//! 3. **Release**: close the page and the browser, whether the body
//!    succeeded, failed or panicked
//!
//! # Example
//!
//! ```rust
//! use steadfast::scenario::Scenario;
//! use steadfast::testing::{Element, SiteBuilder};
//!
//! # tokio_test::block_on(async {
//! let browser = SiteBuilder::new()
//!     .page("https://example.com", "Example Domain", vec![Element::new("h1", "Example Domain")])
//!     .browser();
//! let handle = browser.clone();
//!
//! let heading = Scenario::new("heading")
//!     .run(
//!         || async move { Ok(browser) },
//!         |ctx| {
//!             Box::pin(async move {
//!                 let actions = ctx.actions();
//!                 actions.goto("https://example.com").await?;
//!                 Ok::<_, steadfast::page::PageError>(actions.text_content("h1").await)
//!             })
//!         },
//!     )
//!     .await
//!     .unwrap();
//!
//! assert_eq!(heading.as_deref(), Some("Example Domain"));
//! assert!(handle.is_closed());
//! # });
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::page::{
    Browser, Page, PageActions, PageError, RetryPolicies, DEFAULT_ELEMENT_TIMEOUT,
    DEFAULT_EXPECT_TIMEOUT,
};

/// Browser window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Options handed to whatever launches the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Pause inserted by the driver between operations.
    pub slow_mo: Duration,
    /// Window size.
    pub viewport: Viewport,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            slow_mo: Duration::ZERO,
            viewport: Viewport::default(),
        }
    }
}

/// Error from a scenario run.
///
/// Each variant identifies which phase failed. When both the body and the
/// teardown fail, the body's error is kept and the teardown failure is
/// only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError<E> {
    /// Launching the browser or opening the page failed.
    Setup(PageError),
    /// The scenario body failed.
    Failed(E),
    /// The body succeeded but closing the page or browser failed.
    Teardown(PageError),
}

impl<E> ScenarioError<E> {
    /// Returns the body error, if any.
    pub fn failure(&self) -> Option<&E> {
        match self {
            ScenarioError::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for ScenarioError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Setup(e) => write!(f, "scenario setup failed: {}", e),
            ScenarioError::Failed(e) => write!(f, "{}", e),
            ScenarioError::Teardown(e) => write!(f, "scenario teardown failed: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ScenarioError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Setup(e) | ScenarioError::Teardown(e) => Some(e),
            ScenarioError::Failed(e) => Some(e),
        }
    }
}

/// Everything one scenario needs: its browser, its page and its action settings.
pub struct ScenarioContext<B: Browser> {
    name: String,
    browser: B,
    page: B::Page,
    policies: RetryPolicies,
    element_timeout: Duration,
    expect_timeout: Duration,
}

impl<B: Browser> std::fmt::Debug for ScenarioContext<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("name", &self.name)
            .field("browser", &"<browser>")
            .field("page", &"<page>")
            .field("policies", &self.policies)
            .finish()
    }
}

impl<B: Browser> ScenarioContext<B> {
    /// Open a page on `browser` and build a context around it.
    ///
    /// If the page cannot be opened the browser is closed before returning.
    pub async fn open(scenario: &Scenario, browser: B) -> Result<Self, PageError> {
        let page = match browser.new_page().await {
            Ok(page) => page,
            Err(error) => {
                tracing::error!(scenario = %scenario.name, %error, "failed to open page");
                if let Err(close_error) = browser.close().await {
                    tracing::warn!(scenario = %scenario.name, error = %close_error, "failed to close browser");
                }
                return Err(error);
            }
        };
        tracing::info!(scenario = %scenario.name, "browser launched for scenario");
        Ok(Self {
            name: scenario.name.clone(),
            browser,
            page,
            policies: scenario.policies.clone(),
            element_timeout: scenario.element_timeout,
            expect_timeout: scenario.expect_timeout,
        })
    }

    /// The scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scenario's page.
    pub fn page(&self) -> &B::Page {
        &self.page
    }

    /// Retrying actions against the scenario's page.
    pub fn actions(&self) -> PageActions<'_, B::Page> {
        PageActions::new(&self.page)
            .with_policies(self.policies.clone())
            .with_element_timeout(self.element_timeout)
            .with_expect_timeout(self.expect_timeout)
    }

    /// Close the page, then the browser.
    ///
    /// Both are attempted even if the first fails; the first failure is returned.
    pub async fn close(self) -> Result<(), PageError> {
        let page_result = self.page.close().await;
        if let Err(error) = &page_result {
            tracing::warn!(scenario = %self.name, %error, "failed to close page");
        }
        let browser_result = self.browser.close().await;
        if let Err(error) = &browser_result {
            tracing::warn!(scenario = %self.name, %error, "failed to close browser");
        }
        tracing::info!(scenario = %self.name, "browser closed after scenario");
        page_result.and(browser_result)
    }
}

/// Configuration for one scenario run.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    policies: RetryPolicies,
    element_timeout: Duration,
    expect_timeout: Duration,
}

impl Scenario {
    /// A scenario with default retry policies and timeouts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policies: RetryPolicies::default(),
            element_timeout: DEFAULT_ELEMENT_TIMEOUT,
            expect_timeout: DEFAULT_EXPECT_TIMEOUT,
        }
    }

    /// The scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Use a different policy set for page actions.
    pub fn with_policies(mut self, policies: RetryPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Timeout for element waits.
    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Timeout for visibility and text assertions.
    pub fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.expect_timeout = timeout;
        self
    }

    /// Launch a browser, run `body` against a fresh context, then tear down.
    ///
    /// Teardown runs on every exit path. A panic in `body` is resumed after
    /// teardown completes.
    pub async fn run<B, L, LFut, F, T, E>(self, launch: L, body: F) -> Result<T, ScenarioError<E>>
    where
        B: Browser,
        L: FnOnce() -> LFut,
        LFut: Future<Output = Result<B, PageError>>,
        F: for<'c> FnOnce(&'c ScenarioContext<B>) -> BoxFuture<'c, Result<T, E>>,
        E: std::fmt::Display,
    {
        tracing::info!(scenario = %self.name, "=== scenario started ===");

        let browser = match launch().await {
            Ok(browser) => browser,
            Err(error) => {
                tracing::error!(scenario = %self.name, %error, "failed to launch browser");
                return Err(ScenarioError::Setup(error));
            }
        };
        let ctx = ScenarioContext::open(&self, browser)
            .await
            .map_err(ScenarioError::Setup)?;

        let outcome = AssertUnwindSafe(body(&ctx)).catch_unwind().await;
        let teardown = ctx.close().await;

        let result = match outcome {
            Err(panic) => {
                tracing::error!(scenario = %self.name, "scenario status: panicked");
                std::panic::resume_unwind(panic);
            }
            Ok(Err(error)) => {
                tracing::error!(scenario = %self.name, %error, "scenario status: failed");
                Err(ScenarioError::Failed(error))
            }
            Ok(Ok(value)) => match teardown {
                Ok(()) => {
                    tracing::info!(scenario = %self.name, "scenario status: passed");
                    Ok(value)
                }
                Err(error) => {
                    tracing::error!(scenario = %self.name, %error, "scenario status: teardown failed");
                    Err(ScenarioError::Teardown(error))
                }
            },
        };

        tracing::info!(scenario = %self.name, "=== scenario completed ===");
        result
    }
}

/// Shorthand for `Scenario::new(name).run(launch, body)`.
pub async fn run_scenario<B, L, LFut, F, T, E>(
    name: &str,
    launch: L,
    body: F,
) -> Result<T, ScenarioError<E>>
where
    B: Browser,
    L: FnOnce() -> LFut,
    LFut: Future<Output = Result<B, PageError>>,
    F: for<'c> FnOnce(&'c ScenarioContext<B>) -> BoxFuture<'c, Result<T, E>>,
    E: std::fmt::Display,
{
    Scenario::new(name).run(launch, body).await
}
