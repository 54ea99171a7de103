//! Splitting a combined "make model" title into its parts.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Result of resolving a title against the known brand list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandMatch {
    /// `None` only for an empty title
    pub make: Option<String>,
    pub model: String,
}

/// Resolves titles against brands in catalogue order.
///
/// Matching is by substring and the first brand in list order wins. A brand that
/// is a substring of a longer brand listed later ("Rover" before "Land Rover")
/// therefore shadows it; callers control this only through the list order.
#[derive(Debug, Clone, Default)]
pub struct BrandResolver {
    brands: Vec<String>,
}

impl BrandResolver {
    /// Creates a resolver; blank entries are dropped, order is kept.
    pub fn new<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let brands = brands
            .into_iter()
            .map(|b| b.into().trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        Self { brands }
    }

    /// Known brands, in the order they are tried.
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    /// Splits a title into (make, model).
    ///
    /// Falls back to "first word is the make" when no known brand occurs in the
    /// title. Never fails.
    pub fn resolve(&self, title: &str) -> BrandMatch {
        let title = title.trim();
        if title.is_empty() {
            return BrandMatch { make: None, model: String::new() };
        }

        if let Some(brand) = self.brands.iter().find(|b| title.contains(b.as_str())) {
            let model = title.replace(brand.as_str(), "").trim().to_string();
            trace!("Resolved '{}' as brand '{}'", title, brand);
            return BrandMatch { make: Some(brand.clone()), model };
        }

        let (make, model) = match title.split_once(char::is_whitespace) {
            Some((make, rest)) => (make, rest.trim()),
            None => (title, ""),
        };
        trace!("No known brand in '{}', split as '{}' / '{}'", title, make, model);
        BrandMatch { make: Some(make.to_string()), model: model.to_string() }
    }
}
