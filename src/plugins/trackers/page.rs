use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::ExtractionResult;
use crate::plugins::trackers::price::assemble_price;

const AVAILABILITY_SELECTOR: &str = "#availability";
const PRICE_REGION_SELECTOR: &str = "#corePriceDisplay_desktop_feature_div";
const PRICE_WHOLE_SELECTOR: &str = "span.a-price-whole";
const PRICE_FRACTION_SELECTOR: &str = "span.a-price-fraction";
const COUPON_LABEL_SELECTOR: &str = "span.couponLabelText";
const UNAVAILABLE_MARKER: &str = "currently unavailable";

enum CouponMatcher {
    /// First element matching the selector, by its trimmed text.
    Element(Selector),
    /// First text-only `<span>` whose text matches the pattern.
    SpanText(Regex),
}

/// One entry of the coupon fallback table.
pub struct CouponRule {
    pub name: &'static str,
    matcher: CouponMatcher,
}

impl CouponRule {
    fn find(&self, document: &Html, span_selector: &Selector) -> Option<String> {
        match &self.matcher {
            CouponMatcher::Element(selector) => document
                .select(selector)
                .map(|element| element_text(&element))
                .find(|text| !text.is_empty()),
            CouponMatcher::SpanText(pattern) => document
                .select(span_selector)
                .filter(|span| span.children().all(|child| child.value().is_text()))
                .map(|span| element_text(&span))
                .find(|text| pattern.is_match(text)),
        }
    }
}

/// Reads availability, price and coupon text off a product page.
///
/// Extraction never fails: anything it cannot read comes back absent.
pub struct PageExtractor {
    availability: Selector,
    price_region: Selector,
    price_whole: Selector,
    price_fraction: Selector,
    span: Selector,
    coupon_rules: Vec<CouponRule>,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExtractor {
    pub fn new() -> Self {
        PageExtractor {
            availability: selector(AVAILABILITY_SELECTOR),
            price_region: selector(PRICE_REGION_SELECTOR),
            price_whole: selector(PRICE_WHOLE_SELECTOR),
            price_fraction: selector(PRICE_FRACTION_SELECTOR),
            span: selector("span"),
            coupon_rules: vec![
                CouponRule {
                    name: "coupon_label",
                    matcher: CouponMatcher::Element(selector(COUPON_LABEL_SELECTOR)),
                },
                CouponRule {
                    name: "flat_phrase",
                    matcher: CouponMatcher::SpanText(
                        Regex::new(r"(?i)save\s*[₹$£€¥]\s*\d+").expect("flat phrase pattern"),
                    ),
                },
                CouponRule {
                    name: "percent_phrase",
                    matcher: CouponMatcher::SpanText(
                        Regex::new(r"(?i)save\s*\d+\s*%").expect("percent phrase pattern"),
                    ),
                },
            ],
        }
    }

    /// Coupon rules in the order they are tried.
    pub fn coupon_rules(&self) -> &[CouponRule] {
        &self.coupon_rules
    }

    pub fn extract(&self, raw_content: &str) -> ExtractionResult {
        let document = Html::parse_document(raw_content);

        if self.is_unavailable(&document) {
            return ExtractionResult::unavailable();
        }

        ExtractionResult::available(self.extract_price(&document), self.extract_coupon(&document))
    }

    fn is_unavailable(&self, document: &Html) -> bool {
        document
            .select(&self.availability)
            .next()
            .map(|element| element_text(&element).to_lowercase().contains(UNAVAILABLE_MARKER))
            .unwrap_or(false)
    }

    fn extract_price(&self, document: &Html) -> Option<rust_decimal::Decimal> {
        let region = document.select(&self.price_region).next()?;
        let whole = region.select(&self.price_whole).next()?;
        let fraction = region
            .select(&self.price_fraction)
            .next()
            .map(|element| element_text(&element));

        assemble_price(&element_text(&whole), fraction.as_deref())
    }

    fn extract_coupon(&self, document: &Html) -> Option<String> {
        self.coupon_rules
            .iter()
            .find_map(|rule| rule.find(document, &self.span))
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
