//! Retry-wrapped page interactions.

use std::time::Duration;

use super::{Page, PageError};
use crate::retry::{ConfigurationError, OperationKind, RetryPolicy};

/// Default timeout for element waits.
pub const DEFAULT_ELEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for visibility and text assertions.
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One retry policy per [`OperationKind`].
///
/// The default set is the per-kind table from [`OperationKind::policy`].
///
/// ```rust
/// use steadfast::page::RetryPolicies;
/// use steadfast::retry::OperationKind;
///
/// let policies = RetryPolicies::default()
///     .with_attempt_limit(OperationKind::Click, 4)
///     .unwrap();
///
/// assert_eq!(policies.get(OperationKind::Click).attempt_limit(), 4);
/// assert_eq!(policies.get(OperationKind::Navigate).attempt_limit(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicies {
    navigate: RetryPolicy,
    set_input: RetryPolicy,
    click: RetryPolicy,
    read_text: RetryPolicy,
    wait_for_element: RetryPolicy,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            navigate: OperationKind::Navigate.policy(),
            set_input: OperationKind::SetInput.policy(),
            click: OperationKind::Click.policy(),
            read_text: OperationKind::ReadText.policy(),
            wait_for_element: OperationKind::WaitForElement.policy(),
        }
    }
}

impl RetryPolicies {
    /// The policy used for `kind`.
    pub fn get(&self, kind: OperationKind) -> &RetryPolicy {
        match kind {
            OperationKind::Navigate => &self.navigate,
            OperationKind::SetInput => &self.set_input,
            OperationKind::Click => &self.click,
            OperationKind::ReadText => &self.read_text,
            OperationKind::WaitForElement => &self.wait_for_element,
        }
    }

    /// Replace the policy used for `kind`.
    pub fn with_policy(mut self, kind: OperationKind, policy: RetryPolicy) -> Self {
        let slot = match kind {
            OperationKind::Navigate => &mut self.navigate,
            OperationKind::SetInput => &mut self.set_input,
            OperationKind::Click => &mut self.click,
            OperationKind::ReadText => &mut self.read_text,
            OperationKind::WaitForElement => &mut self.wait_for_element,
        };
        *slot = policy;
        self
    }

    /// Change only the attempt limit for `kind`.
    pub fn with_attempt_limit(
        self,
        kind: OperationKind,
        attempt_limit: u32,
    ) -> Result<Self, ConfigurationError> {
        let policy = self.get(kind).clone().with_attempt_limit(attempt_limit)?;
        Ok(self.with_policy(kind, policy))
    }
}

/// Retry-capable actions against one page.
///
/// Page objects hold a `PageActions` and their own selectors; every fallible
/// call goes through the policy for its operation kind.
#[derive(Debug)]
pub struct PageActions<'p, P> {
    page: &'p P,
    policies: RetryPolicies,
    element_timeout: Duration,
    expect_timeout: Duration,
}

impl<'p, P> Clone for PageActions<'p, P> {
    fn clone(&self) -> Self {
        Self {
            page: self.page,
            policies: self.policies.clone(),
            element_timeout: self.element_timeout,
            expect_timeout: self.expect_timeout,
        }
    }
}

impl<'p, P: Page> PageActions<'p, P> {
    /// Wrap `page` with the default policies and timeouts.
    pub fn new(page: &'p P) -> Self {
        Self {
            page,
            policies: RetryPolicies::default(),
            element_timeout: DEFAULT_ELEMENT_TIMEOUT,
            expect_timeout: DEFAULT_EXPECT_TIMEOUT,
        }
    }

    /// Use a different policy set.
    pub fn with_policies(mut self, policies: RetryPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Timeout handed to the driver for each element wait.
    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Timeout handed to the driver for visibility and text assertions.
    pub fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.expect_timeout = timeout;
        self
    }

    /// The underlying page.
    pub fn page(&self) -> &'p P {
        self.page
    }

    /// The policies in use.
    pub fn policies(&self) -> &RetryPolicies {
        &self.policies
    }

    /// Navigate to `url`, backing off between attempts.
    pub async fn goto(&self, url: &str) -> Result<(), PageError> {
        let page = self.page;
        let label = format!("navigate to {}", url);
        self.policies
            .get(OperationKind::Navigate)
            .execute(&label, || page.goto(url))
            .await?;
        tracing::info!(url, "navigation complete");
        Ok(())
    }

    /// Fill the input matched by `selector` with `text`.
    pub async fn fill_input(&self, selector: &str, text: &str) -> Result<(), PageError> {
        let page = self.page;
        let label = format!("fill [{}]", selector);
        tracing::info!(selector, text, "filling input");
        self.policies
            .get(OperationKind::SetInput)
            .execute(&label, || page.fill(selector, text))
            .await
    }

    /// Click the element matched by `selector`.
    pub async fn click_element(&self, selector: &str) -> Result<(), PageError> {
        let page = self.page;
        let label = format!("click [{}]", selector);
        self.policies
            .get(OperationKind::Click)
            .execute(&label, || page.click(selector))
            .await
    }

    /// Click the `index`-th element matched by `selector`.
    pub async fn click_nth(&self, selector: &str, index: usize) -> Result<(), PageError> {
        let page = self.page;
        let label = format!("click [{}] #{}", selector, index);
        self.policies
            .get(OperationKind::Click)
            .execute(&label, || page.click_nth(selector, index))
            .await
    }

    /// Text content of the element matched by `selector`.
    ///
    /// Unlike the other actions this never fails: when every attempt errors
    /// the text is reported as absent.
    pub async fn text_content(&self, selector: &str) -> Option<String> {
        let page = self.page;
        let label = format!("read text [{}]", selector);
        let text = self
            .policies
            .get(OperationKind::ReadText)
            .execute_or_absent(&label, || page.text_content(selector))
            .await
            .flatten();
        match &text {
            Some(t) => tracing::info!(selector, text = %t, "retrieved text"),
            None => tracing::info!(selector, "no text available"),
        }
        text
    }

    /// The document title, read under the text-read policy.
    pub async fn title(&self) -> Result<String, PageError> {
        let page = self.page;
        self.policies
            .get(OperationKind::ReadText)
            .execute("read title", || page.title())
            .await
    }

    /// Wait until an element matches `selector`.
    pub async fn wait_for_element(&self, selector: &str) -> Result<(), PageError> {
        let page = self.page;
        let timeout = self.element_timeout;
        let label = format!("wait for [{}]", selector);
        self.policies
            .get(OperationKind::WaitForElement)
            .execute(&label, || page.wait_for_selector(selector, timeout))
            .await?;
        tracing::info!(selector, "element found");
        Ok(())
    }

    /// Assert the element matched by `selector` becomes visible.
    ///
    /// Single attempt; the driver's own wait bounds how long this takes.
    pub async fn assert_element_visible(&self, selector: &str) -> Result<(), PageError> {
        tracing::info!(selector, "asserting element is visible");
        match self.page.is_visible(selector, self.expect_timeout).await {
            Ok(true) => {
                tracing::info!(selector, "element is visible");
                Ok(())
            }
            Ok(false) => {
                tracing::error!(selector, "element is not visible");
                Err(PageError::NotVisible {
                    selector: selector.to_string(),
                })
            }
            Err(error) => {
                tracing::error!(selector, %error, "element is not visible");
                Err(error)
            }
        }
    }

    /// Assert the element matched by `selector` contains `expected`.
    pub async fn assert_text_contains(
        &self,
        selector: &str,
        expected: &str,
    ) -> Result<(), PageError> {
        tracing::info!(selector, expected, "asserting element text");
        match self
            .page
            .contains_text(selector, expected, self.expect_timeout)
            .await
        {
            Ok(true) => {
                tracing::info!(selector, "element contains expected text");
                Ok(())
            }
            Ok(false) => {
                tracing::error!(selector, expected, "text assertion failed");
                Err(PageError::TextMismatch {
                    selector: selector.to_string(),
                    expected: expected.to_string(),
                })
            }
            Err(error) => {
                tracing::error!(selector, %error, "text assertion failed");
                Err(error)
            }
        }
    }
}
