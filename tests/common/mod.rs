//! A scripted amazon.in: storefront, one results listing, two products.

#![allow(dead_code)]

use steadfast::testing::{Element, ScriptedBrowser, SiteBuilder};

pub const HOME: &str = "https://www.amazon.in";
pub const RESULTS: &str = "https://www.amazon.in/s?k=iphone+17+pro+max";
pub const FIRST_PRODUCT: &str = "https://www.amazon.in/dp/B0FQFXT2KG";
pub const SECOND_PRODUCT: &str = "https://www.amazon.in/dp/B0DGHYDZR9";

const RESULT_ITEMS: &str = r#"div.s-main-slot > div[data-component-type="s-search-result"]"#;

pub fn amazon_site() -> ScriptedBrowser {
    SiteBuilder::new()
        .page(
            HOME,
            "Online Shopping site in India",
            vec![
                Element::empty("input#twotabsearchtextbox"),
                Element::empty("input#nav-search-submit-button").navigates_to(RESULTS),
            ],
        )
        .page(
            RESULTS,
            "Amazon.in : iphone 17 pro max",
            vec![
                Element::new(RESULT_ITEMS, "Apple iPhone 17 Pro Max 256 GB").navigates_to(FIRST_PRODUCT),
                Element::new(RESULT_ITEMS, "Apple iPhone 16 128 GB").navigates_to(SECOND_PRODUCT),
            ],
        )
        .page(
            FIRST_PRODUCT,
            "Apple iPhone 17 Pro Max",
            vec![
                Element::new("#productTitle", "  Apple iPhone 17 Pro Max (256 GB) - Cosmic Orange  "),
                Element::new(
                    "#feature-bullets",
                    "\n  Storage: 256 GB of internal storage  \n\n  Color: Cosmic Orange\n  6.9-inch display\n",
                ),
                Element::new("#priceblock_dealprice", "₹1,49,900"),
            ],
        )
        .page(
            SECOND_PRODUCT,
            "Apple iPhone 16",
            vec![
                Element::new("#productTitle", "Apple iPhone 16 (128 GB) - Black"),
                Element::new("#feature-bullets", "A18 chip"),
                Element::new("#priceblock_ourprice", "Currently unavailable"),
            ],
        )
        .browser()
}
