use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

/// A tracked listing as supplied by the product list.
///
/// Records are read-only once loaded; workers receive them by value and never
/// write back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    pub previous_price: Option<Decimal>,
    pub link: Url,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>, previous_price: Option<Decimal>, link: Url) -> Self {
        Self {
            name: name.into(),
            previous_price,
            link,
        }
    }

    /// The recorded baseline, if it can be used as a divisor.
    pub fn baseline(&self) -> Option<Decimal> {
        self.previous_price.filter(|price| *price > Decimal::ZERO)
    }
}
