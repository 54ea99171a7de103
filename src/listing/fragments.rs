//! Raw text fragments captured from catalogue pages.
//!
//! These are what the page extractor hands to the normalizer: untyped strings,
//! possibly multi-line, possibly carrying annotations such as "(w/o COE)".

/// One variant row of a new-car listing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantFragments {
    /// Combined make + model title of the enclosing listing
    pub title: String,
    pub specification: String,
    /// Price cell text, e.g. "$152,888\n$98,888 (w/o COE)"
    pub price: String,
    /// Power cell text, e.g. "201 bhp"
    pub power: String,
    /// Overview page of the model, if linked
    pub link: Option<String>,
}

/// Label/value pairs scraped from a used-car detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFragments {
    /// Combined make + model title
    pub title: String,
    fields: Vec<(String, String)>,
}

impl DetailFragments {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), fields: Vec::new() }
    }

    /// Records a label/value pair; the first value seen for a label wins.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() || self.fields.iter().any(|(l, _)| l == label) {
            return;
        }
        self.fields.push((label.to_string(), value.into().trim().to_string()));
    }

    /// Looks up a value by exact label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Looks up a value by exact label, then by label prefix ("Engine Cap" finds
    /// "Engine Capacity").
    pub fn get_by_prefix(&self, prefix: &str) -> Option<&str> {
        self.get(prefix).or_else(|| {
            self.fields
                .iter()
                .find(|(l, _)| l.starts_with(prefix))
                .map(|(_, v)| v.as_str())
                .filter(|v| !v.is_empty())
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
