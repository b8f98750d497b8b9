// Page reading, pricing and classification stages of the pipeline
pub mod page;
pub mod price;
pub mod tier;

pub use page::PageExtractor;
pub use price::{CouponEffect, DiscountEngine, PriceEvaluation};
pub use tier::TierThresholds;
