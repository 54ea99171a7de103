//! Per-group accumulation of records into fixed-schema rows.

use crate::listing::models::{LevyCategory, VehicleRecord};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

/// Text rendered for an absent value.
pub const NIL: &str = "NIL";

/// One output column. Each maps to exactly one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Make,
    Model,
    Specification,
    Price,
    WithCoe,
    CoeCategory,
    PriceWithCoe,
    FuelType,
    Depreciation,
    RegistrationDate,
    CoeLeft,
    Mileage,
    RoadTax,
    DeregValue,
    Omv,
    Coe,
    Arf,
    PowerBhp,
    PowerKw,
    Owners,
    Link,
    EngineCapacity,
    BodyType,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Make => "Make",
            Column::Model => "Model",
            Column::Specification => "Specification",
            Column::Price => "Price (From SGCarMart)",
            Column::WithCoe => "With COE (Y/N)",
            Column::CoeCategory => "COE Category",
            Column::PriceWithCoe => "Price with COE (SGD)",
            Column::FuelType => "Vehicle Type",
            Column::Depreciation => "Depreciation (SGD)",
            Column::RegistrationDate => "Registration Date",
            Column::CoeLeft => "Duration of COE Left",
            Column::Mileage => "Mileage (km)",
            Column::RoadTax => "Road Tax",
            Column::DeregValue => "Dereg Value",
            Column::Omv => "OMV",
            Column::Coe => "COE",
            Column::Arf => "ARF",
            Column::PowerBhp => "Power (bhp)",
            Column::PowerKw => "Power (kW)",
            Column::Owners => "Number of Owners",
            Column::Link => "Link",
            Column::EngineCapacity => "Engine Capacity",
            Column::BodyType => "Vehicle Type",
        }
    }
}

/// Column layout of a report, one per catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    NewCatalogue,
    UsedCatalogue,
}

const NEW_COLUMNS: &[Column] = &[
    Column::Make,
    Column::Model,
    Column::Specification,
    Column::Price,
    Column::WithCoe,
    Column::CoeCategory,
    Column::PriceWithCoe,
    Column::FuelType,
];

const USED_COLUMNS: &[Column] = &[
    Column::Make,
    Column::Model,
    Column::Price,
    Column::Depreciation,
    Column::RegistrationDate,
    Column::CoeLeft,
    Column::Mileage,
    Column::RoadTax,
    Column::DeregValue,
    Column::Omv,
    Column::Coe,
    Column::Arf,
    Column::PowerBhp,
    Column::PowerKw,
    Column::Owners,
    Column::Link,
    Column::EngineCapacity,
    Column::BodyType,
    Column::CoeCategory,
];

impl Schema {
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Schema::NewCatalogue => NEW_COLUMNS,
            Schema::UsedCatalogue => USED_COLUMNS,
        }
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.header().to_string()).collect()
    }
}

/// A rendered value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Money(f64),
    Decimal(f64),
    Integer(i64),
    Nil,
}

impl Cell {
    pub fn is_nil(&self) -> bool {
        matches!(self, Cell::Nil)
    }

    fn text(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.is_empty() => Cell::Text(s.to_string()),
            _ => Cell::Nil,
        }
    }

    fn money(value: Option<f64>) -> Self {
        value.map(Cell::Money).unwrap_or(Cell::Nil)
    }

    fn integer(value: Option<u32>) -> Self {
        value.map(|v| Cell::Integer(i64::from(v))).unwrap_or(Cell::Nil)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Money(v) => write!(f, "{:.2}", v),
            Cell::Decimal(v) => write!(f, "{}", v),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Nil => write!(f, "{}", NIL),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Money(v) | Cell::Decimal(v) => serializer.serialize_f64(*v),
            Cell::Integer(v) => serializer.serialize_i64(*v),
            Cell::Nil => serializer.serialize_str(NIL),
        }
    }
}

/// The value a record exposes under a column. Never fails; absent is [`Cell::Nil`].
pub fn cell_for(record: &VehicleRecord, column: Column) -> Cell {
    match column {
        Column::Make => Cell::text(record.make.as_deref()),
        Column::Model => Cell::text(record.model.as_deref()),
        Column::Specification => Cell::text(record.specification.as_deref()),
        Column::Price => Cell::money(record.listed_price),
        Column::WithCoe => {
            if record.is_placeholder() {
                Cell::Nil
            } else {
                Cell::Text(if record.price_includes_levy { "Y" } else { "N" }.to_string())
            }
        }
        Column::CoeCategory => match record.levy_category {
            LevyCategory::Unknown => Cell::Nil,
            category => Cell::Text(category.to_string()),
        },
        Column::PriceWithCoe => Cell::money(record.price_with_levy),
        Column::FuelType => {
            if record.is_placeholder() {
                Cell::Nil
            } else {
                Cell::Text(record.fuel_type.label().to_string())
            }
        }
        Column::Depreciation => Cell::money(record.depreciation_per_year),
        Column::RegistrationDate => match record.registration_date {
            Some(date) => Cell::Text(date.format("%d-%b-%Y").to_string()),
            None => Cell::Nil,
        },
        Column::CoeLeft => Cell::text(record.levy_duration_remaining.as_deref()),
        Column::Mileage => Cell::integer(record.mileage_km),
        Column::RoadTax => Cell::money(record.road_tax_per_year),
        Column::DeregValue => Cell::money(record.dereg_value),
        Column::Omv => Cell::money(record.omv),
        Column::Coe => Cell::money(record.coe),
        Column::Arf => Cell::money(record.arf),
        Column::PowerBhp => Cell::integer(record.power_bhp),
        Column::PowerKw => record.power_kw.map(Cell::Decimal).unwrap_or(Cell::Nil),
        Column::Owners => Cell::integer(record.owner_count),
        Column::Link => Cell::text(Some(record.source_link.as_str())),
        Column::EngineCapacity => Cell::integer(record.engine_capacity_cc),
        Column::BodyType => Cell::text(record.body_type.as_deref()),
    }
}

/// One named group of fully-schematized rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportGroup {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportGroup {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A labeled scalar shown alongside the groups, e.g. a benchmark value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub label: String,
    pub value: Cell,
}

impl Annotation {
    pub fn new(label: impl Into<String>, value: Cell) -> Self {
        Self { label: label.into(), value }
    }
}

/// Everything the report writer receives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub groups: Vec<ReportGroup>,
    pub annotations: Vec<Annotation>,
}

impl Report {
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(ReportGroup::len).sum()
    }

    pub fn group(&self, name: &str) -> Option<&ReportGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Collects finished records per group, in the order groups were first seen.
#[derive(Debug)]
pub struct ListingAggregator {
    schema: Schema,
    groups: Vec<(String, Vec<VehicleRecord>)>,
}

impl ListingAggregator {
    pub fn new(schema: Schema) -> Self {
        Self { schema, groups: Vec::new() }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Makes sure a group appears in the report even if it ends up empty.
    pub fn declare_group(&mut self, name: &str) {
        if !self.groups.iter().any(|(g, _)| g == name) {
            self.groups.push((name.to_string(), Vec::new()));
        }
    }

    pub fn push(&mut self, group: &str, record: VehicleRecord) {
        match self.groups.iter_mut().find(|(g, _)| g == group) {
            Some((_, records)) => records.push(record),
            None => self.groups.push((group.to_string(), vec![record])),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, r)| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders every record against the schema and closes the run.
    pub fn finish(self, annotations: Vec<Annotation>) -> Report {
        let columns = self.schema.columns();
        let groups = self
            .groups
            .into_iter()
            .map(|(name, records)| {
                debug!("Group '{}': {} rows", name, records.len());
                let rows = records
                    .iter()
                    .map(|record| columns.iter().map(|&c| cell_for(record, c)).collect())
                    .collect();
                ReportGroup { name, columns: self.schema.headers(), rows }
            })
            .collect();

        Report { groups, annotations }
    }
}
