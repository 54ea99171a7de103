//! CSS selectors for the COE results page.

use scraper::Selector;
use std::sync::LazyLock;

/// Month and year of the latest round, e.g. "October 2026".
pub static MONTH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main h2 > span:nth-of-type(2)").unwrap());

/// Whole heading, used when it has no month span.
pub static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("main h2").unwrap());

/// Bidding round, e.g. "2nd Bidding".
pub static ROUND: LazyLock<Selector> = LazyLock::new(|| Selector::parse("main h2 ~ p").unwrap());

/// Latest results row (the first row is the column header).
pub static RESULT_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main table tbody tr:nth-of-type(2)").unwrap());

pub static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
