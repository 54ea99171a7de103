//! COE benchmark source.

pub mod parser;
pub mod selectors;

pub use parser::{fetch_benchmark, parse_benchmark};

pub const DEFAULT_BENCHMARK_URL: &str = "https://www.motorist.sg/coe-results";
