//! CSS selectors for catalogue pages.
//!
//! Update this file when the catalogue changes its markup.

use scraper::Selector;
use std::sync::LazyLock;

/// Brand landing page.
pub mod brands {
    use super::*;

    pub static LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#rightside_content td a").unwrap());

    /// Suffix on every brand link text ("Toyota cars").
    pub const SUFFIX: &str = " cars";
}

/// New-car and commercial listing pages.
pub mod new_listing {
    use super::*;

    /// One result table per model.
    pub static RESULT_TABLE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "table[width='100%'][bgcolor='#FFFFFF'], \
             table[width='100%'][bgcolor='#F6FDFF']",
        )
        .unwrap()
    });

    /// Model title inside a result table.
    pub static MODEL_TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[href*='newcars_overview.php?CarCode='] strong").unwrap());

    /// Link carrying the model title.
    pub static MODEL_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[href*='newcars_overview.php?CarCode=']").unwrap());

    /// Variant specification, one per variant row.
    pub static SPECIFICATION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("label").unwrap());

    pub static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

    /// Text marking the price cell.
    pub const PRICE_MARK: &str = "$";
    /// Text marking the power cell.
    pub const POWER_MARK: &str = "bhp";
}

/// Used-car listing pages.
pub mod used_listing {
    use super::*;

    pub static DETAIL_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a.car-model-title").unwrap());
}

/// Used-car detail pages.
pub mod detail {
    use super::*;

    /// Label cell. Its presence marks the page as fully rendered.
    pub static LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.label").unwrap());

    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a.globaltitle").unwrap());

    pub static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

    /// Label/value blocks outside the main table, in document order.
    pub static ROW_BLOCK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".row_title, .row_info").unwrap());

    pub const ROW_TITLE_CLASS: &str = "row_title";
    pub const ROW_INFO_CLASS: &str = "row_info";

    /// Text marking the depreciation cell when it is not labelled.
    pub const PER_YEAR_MARK: &str = "/yr";
}
