//! Fragment extraction from catalogue pages.
//!
//! Listing-page parsers return `None` when the page has no results at all,
//! which is how pagination finds its end. A results page whose rows are all
//! unusable still returns `Some` (possibly empty).

use crate::error::FetchError;
use crate::listing::fragments::{DetailFragments, VariantFragments};
use crate::sgcarmart::catalogue::Catalogue;
use crate::sgcarmart::selectors::{brands, detail, new_listing, used_listing};
use scraper::{ElementRef, Html};
use tracing::{debug, trace};

/// Parser for catalogue HTML pages.
pub struct CatalogueParser {
    catalogue: Catalogue,
}

impl Default for CatalogueParser {
    fn default() -> Self {
        Self::new(Catalogue::default())
    }
}

impl CatalogueParser {
    /// Creates a parser that resolves relative links against `catalogue`.
    pub fn new(catalogue: Catalogue) -> Self {
        Self { catalogue }
    }

    /// Brand names from the brand landing page, in page order.
    pub fn parse_brands(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let names: Vec<String> = document
            .select(&brands::LINK)
            .map(inline_text)
            .map(|text| text.strip_suffix(brands::SUFFIX).unwrap_or(text.as_str()).trim().to_string())
            .filter(|brand| !brand.is_empty())
            .collect();

        debug!("Parsed {} brands", names.len());
        names
    }

    /// Variant rows from a new-catalogue listing page.
    ///
    /// Every variant row of a result table becomes one fragment set, titled
    /// with the table's first model title. Rows without both a price cell and
    /// a power cell are skipped.
    pub fn parse_new_listing(&self, html: &str) -> Option<Vec<VariantFragments>> {
        let document = Html::parse_document(html);

        let mut tables = 0;
        let mut variants = Vec::new();

        for table in document.select(&new_listing::RESULT_TABLE) {
            tables += 1;

            let Some(title) = table.select(&new_listing::MODEL_TITLE).next().map(inline_text) else {
                trace!("Result table without a model title");
                continue;
            };

            let link = table
                .select(&new_listing::MODEL_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| self.catalogue.absolute(href));

            for label in table.select(&new_listing::SPECIFICATION) {
                let Some(row) = enclosing_row(label) else {
                    continue;
                };

                let price = cell_containing(row, new_listing::PRICE_MARK);
                let power = cell_containing(row, new_listing::POWER_MARK);

                match (price, power) {
                    (Some(price), Some(power)) => {
                        variants.push(VariantFragments {
                            title: title.clone(),
                            specification: inline_text(label),
                            price,
                            power,
                            link: link.clone(),
                        });
                    }
                    _ => debug!("Skipping variant row of '{}' without price or power", title),
                }
            }
        }

        debug!("Parsed {} variants from {} result tables", variants.len(), tables);
        (tables > 0).then_some(variants)
    }

    /// Model titles from a listing page, one per result table.
    pub fn parse_model_titles(&self, html: &str) -> Option<Vec<String>> {
        let document = Html::parse_document(html);

        let mut tables = 0;
        let mut titles = Vec::new();
        for table in document.select(&new_listing::RESULT_TABLE) {
            tables += 1;
            if let Some(title) = table.select(&new_listing::MODEL_TITLE).next().map(inline_text) {
                titles.push(title);
            }
        }

        (tables > 0).then_some(titles)
    }

    /// Detail-page links from a used-catalogue listing page.
    pub fn parse_used_links(&self, html: &str) -> Option<Vec<String>> {
        let document = Html::parse_document(html);

        let links: Vec<String> = document
            .select(&used_listing::DETAIL_LINK)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| self.catalogue.absolute(href))
            .collect();

        debug!("Parsed {} detail links", links.len());
        (!links.is_empty()).then_some(links)
    }

    /// Label/value pairs from a used-car detail page.
    ///
    /// A page without any label cell has not finished rendering and is
    /// reported as a timeout. A rendered page without a title is unusable.
    pub fn parse_detail(&self, html: &str, link: &str) -> Result<DetailFragments, FetchError> {
        let document = Html::parse_document(html);

        if document.select(&detail::LABEL).next().is_none() {
            return Err(FetchError::timeout(link));
        }

        let title = document
            .select(&detail::TITLE)
            .next()
            .map(inline_text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FetchError::hard(link, "detail page has no listing title"))?;

        let mut fragments = DetailFragments::new(title);

        // Main table: label cell followed by its value cell
        for label in document.select(&detail::LABEL) {
            let value = label
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "td");
            if let Some(value) = value {
                fragments.insert(inline_text(label), inline_text(value));
            }
        }

        // Title/info blocks
        let mut pending: Option<String> = None;
        for block in document.select(&detail::ROW_BLOCK) {
            if has_class(block, detail::ROW_TITLE_CLASS) {
                pending = Some(inline_text(block));
            } else if has_class(block, detail::ROW_INFO_CLASS) {
                if let Some(label) = pending.take() {
                    fragments.insert(label, inline_text(block));
                }
            }
        }

        if fragments.get("Depreciation").is_none() {
            if let Some(cell) = document
                .select(&detail::CELL)
                .filter(|td| is_leaf_cell(*td))
                .map(inline_text)
                .find(|text| text.contains(detail::PER_YEAR_MARK))
            {
                fragments.insert("Depreciation", cell);
            }
        }

        trace!("Detail page {}: {} fields", link, fragments.len());
        Ok(fragments)
    }
}

/// Text of an element on one line, whitespace-collapsed between text nodes.
fn inline_text(element: ElementRef) -> String {
    element.text().map(str::trim).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Text of an element with one line per text node.
fn multiline_text(element: ElementRef) -> String {
    element.text().map(str::trim).filter(|s| !s.is_empty()).collect::<Vec<_>>().join("\n")
}

fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn enclosing_row(element: ElementRef) -> Option<ElementRef> {
    element.ancestors().filter_map(ElementRef::wrap).find(|e| e.value().name() == "tr")
}

/// True if the cell has no nested cells.
fn is_leaf_cell(cell: ElementRef) -> bool {
    !cell
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|e| e.value().name() == "td")
}

/// Text of the innermost cell of `row` whose text contains `mark`.
fn cell_containing(row: ElementRef, mark: &str) -> Option<String> {
    row.select(&new_listing::CELL)
        .filter(|td| is_leaf_cell(*td))
        .find(|td| td.text().any(|t| t.contains(mark)))
        .map(multiline_text)
}
