//! Page objects for the amazon.in product search flow.

use regex::Regex;

use crate::page::{Page, PageActions, PageError};

/// The storefront home page with the search bar.
#[derive(Debug)]
pub struct AmazonHomePage<'p, P> {
    actions: PageActions<'p, P>,
}

impl<'p, P: Page> AmazonHomePage<'p, P> {
    /// Storefront URL.
    pub const URL: &'static str = "https://www.amazon.in";
    /// Search box.
    pub const SEARCH_INPUT: &'static str = "input#twotabsearchtextbox";
    /// Search submit button.
    pub const SEARCH_BUTTON: &'static str = "input#nav-search-submit-button";

    /// Wrap `actions`.
    pub fn new(actions: PageActions<'p, P>) -> Self {
        Self { actions }
    }

    /// Open the storefront.
    pub async fn goto(&self) -> Result<(), PageError> {
        tracing::info!("navigating to amazon.in");
        self.actions.goto(Self::URL).await
    }

    /// Search for `query`.
    pub async fn search(&self, query: &str) -> Result<(), PageError> {
        tracing::info!(query, "searching");
        self.actions.fill_input(Self::SEARCH_INPUT, query).await?;
        self.actions.click_element(Self::SEARCH_BUTTON).await?;
        tracing::info!("search completed");
        Ok(())
    }
}

/// The search results listing.
#[derive(Debug)]
pub struct AmazonSearchResultsPage<'p, P> {
    actions: PageActions<'p, P>,
}

impl<'p, P: Page> AmazonSearchResultsPage<'p, P> {
    /// One search result card.
    pub const RESULT_ITEMS: &'static str =
        r#"div.s-main-slot > div[data-component-type="s-search-result"]"#;

    /// Wrap `actions`.
    pub fn new(actions: PageActions<'p, P>) -> Self {
        Self { actions }
    }

    /// Wait for results, then open the first one.
    pub async fn click_first_result(&self) -> Result<(), PageError> {
        tracing::info!("clicking first search result");
        self.actions.wait_for_element(Self::RESULT_ITEMS).await?;
        self.actions.click_nth(Self::RESULT_ITEMS, 0).await?;
        tracing::info!("opened first result");
        Ok(())
    }
}

/// A product detail page.
#[derive(Debug)]
pub struct AmazonProductPage<'p, P> {
    actions: PageActions<'p, P>,
}

impl<'p, P: Page> AmazonProductPage<'p, P> {
    /// Product title.
    pub const TITLE: &'static str = "#productTitle";
    /// Feature bullet list.
    pub const FEATURES: &'static str = "#feature-bullets";
    /// Regular or deal price.
    pub const PRICE: &'static str = "#priceblock_ourprice, #priceblock_dealprice";

    /// Wrap `actions`.
    pub fn new(actions: PageActions<'p, P>) -> Self {
        Self { actions }
    }

    /// Product title, if readable.
    pub async fn title(&self) -> Option<String> {
        tracing::info!("retrieving product title");
        self.actions.text_content(Self::TITLE).await
    }

    /// Feature bullets, one per non-empty line; empty when unreadable.
    pub async fn features(&self) -> Vec<String> {
        tracing::info!("retrieving product features");
        self.actions
            .text_content(Self::FEATURES)
            .await
            .map(|content| split_features(&content))
            .unwrap_or_default()
    }

    /// Price text, if readable.
    pub async fn price(&self) -> Option<String> {
        tracing::info!("retrieving product price");
        self.actions.text_content(Self::PRICE).await
    }
}

/// Split a feature block into trimmed, non-empty lines.
pub fn split_features(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring check on a product title.
pub fn title_contains(title: &str, expected: &str) -> bool {
    title.to_lowercase().contains(&expected.to_lowercase())
}

/// Whether any feature mentions `word`, ignoring case.
pub fn has_feature(features: &[String], word: &str) -> bool {
    match Regex::new(&format!("(?i){}", regex::escape(word))) {
        Ok(re) => features.iter().any(|f| re.is_match(f)),
        Err(_) => false,
    }
}

/// Whether a price string carries at least one digit.
pub fn price_has_digits(price: &str) -> bool {
    Regex::new(r"\d+").is_ok_and(|re| re.is_match(price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_features_trims_and_drops_blank_lines() {
        let content = "\n  Storage: 256 GB  \n\n Color: Desert Titanium\n   \n";
        assert_eq!(
            split_features(content),
            vec!["Storage: 256 GB", "Color: Desert Titanium"]
        );
        assert!(split_features("   \n").is_empty());
    }

    #[test]
    fn test_title_contains_ignores_case() {
        assert!(title_contains(
            "Apple iPhone 17 Pro Max (256 GB)",
            "iphone 17 pro max"
        ));
        assert!(!title_contains("Apple iPhone 16", "iphone 17"));
    }

    #[test]
    fn test_has_feature() {
        let features = split_features("STORAGE 1TB\ncolour options");
        assert!(has_feature(&features, "storage"));
        assert!(!has_feature(&features, "color"));
        assert!(!has_feature(&[], "storage"));
    }

    #[test]
    fn test_feature_word_is_literal() {
        let features = vec!["5.0 (a+b)".to_string()];
        assert!(has_feature(&features, "(a+b)"));
        assert!(!has_feature(&features, "5x0"));
    }

    #[test]
    fn test_price_has_digits() {
        assert!(price_has_digits("₹1,49,900"));
        assert!(!price_has_digits("Currently unavailable"));
    }
}
