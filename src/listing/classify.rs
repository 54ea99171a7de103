//! COE category assignment.
//!
//! Classification runs in two passes. Pass 1 is local to a record and depends on
//! which catalogue the record came from. Pass 2 forces every model that also
//! appears in the commercial catalogue into category C; it can only run once the
//! full listing set and the full commercial set are both known, so it is the
//! [`PendingListings::finalize`] step that turns pending records into
//! [`ClassifiedListings`].

use crate::listing::models::{LevyCategory, VehicleRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// New-catalogue EVs up to this bhp are category A.
pub const NEW_EV_MAX_BHP_CAT_A: u32 = 147;

/// Used cars below all three of these limits are category A.
pub const USED_CAT_A_MAX_CC: u32 = 1600;
pub const USED_CAT_A_MAX_KW: f64 = 97.0;
pub const USED_CAT_A_MAX_BHP: u32 = 130;

/// Used EVs below both of these limits are category A.
pub const USED_EV_CAT_A_MAX_KW: f64 = 110.0;
pub const USED_EV_CAT_A_MAX_BHP: u32 = 147;

/// Which catalogue a record was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogueFlow {
    /// New-car catalogue. Non-EV queries are run per band and every record
    /// inherits the band of its query.
    New { band: Option<LevyCategory> },
    /// Used-car catalogue, classified from engine capacity and power.
    Used,
}

/// Pass 1: the category implied by the record's own fields.
pub fn classify(record: &VehicleRecord, flow: CatalogueFlow) -> LevyCategory {
    match flow {
        CatalogueFlow::New { band } => {
            if record.fuel_type.is_electric() {
                match record.power_bhp {
                    Some(bhp) if bhp <= NEW_EV_MAX_BHP_CAT_A => LevyCategory::A,
                    Some(_) => LevyCategory::B,
                    None => LevyCategory::Unknown,
                }
            } else {
                band.unwrap_or_default()
            }
        }
        CatalogueFlow::Used => {
            if record.fuel_type.is_electric() {
                match (record.power_kw, record.power_bhp) {
                    (Some(kw), Some(bhp)) => {
                        if kw < USED_EV_CAT_A_MAX_KW && bhp < USED_EV_CAT_A_MAX_BHP {
                            LevyCategory::A
                        } else {
                            LevyCategory::B
                        }
                    }
                    _ => LevyCategory::Unknown,
                }
            } else {
                match (record.engine_capacity_cc, record.power_kw, record.power_bhp) {
                    (Some(cc), Some(kw), Some(bhp)) => {
                        if cc < USED_CAT_A_MAX_CC
                            && kw < USED_CAT_A_MAX_KW
                            && bhp < USED_CAT_A_MAX_BHP
                        {
                            LevyCategory::A
                        } else {
                            LevyCategory::B
                        }
                    }
                    _ => LevyCategory::Unknown,
                }
            }
        }
    }
}

/// Model names listed in the commercial catalogue.
#[derive(Debug, Clone, Default)]
pub struct CommercialModels {
    models: HashSet<String>,
}

impl CommercialModels {
    /// Collects model names; blank names are dropped so that a title with no
    /// model part cannot match every such record.
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models = models
            .into_iter()
            .map(|m| m.into().trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        Self { models }
    }

    /// Exact model-name membership.
    pub fn contains(&self, model: &str) -> bool {
        self.models.contains(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CommercialModels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Pass 2 for a single record. Returns true if the record is commercial.
///
/// Only ever moves a record to C.
pub fn apply_commercial_override(record: &mut VehicleRecord, commercial: &CommercialModels) -> bool {
    let is_commercial = record.model.as_deref().is_some_and(|m| commercial.contains(m));
    if is_commercial {
        record.commercial = true;
        record.levy_category = LevyCategory::C;
    }
    is_commercial
}

/// Records that have been through pass 1 and are waiting for the commercial set.
#[derive(Debug, Default)]
pub struct PendingListings {
    entries: Vec<(String, VehicleRecord)>,
}

impl PendingListings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs pass 1 on a record and holds it under its group.
    pub fn admit(&mut self, group: &str, mut record: VehicleRecord, flow: CatalogueFlow) {
        record.levy_category = classify(&record, flow);
        debug!("{} [{}] -> category {}", record.display_name(), group, record.levy_category);
        self.entries.push((group.to_string(), record));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pass 2 over the complete set.
    pub fn finalize(self, commercial: &CommercialModels) -> ClassifiedListings {
        let mut overridden = 0;
        let entries = self
            .entries
            .into_iter()
            .map(|(group, mut record)| {
                if apply_commercial_override(&mut record, commercial) {
                    overridden += 1;
                }
                (group, record)
            })
            .collect::<Vec<_>>();

        info!(
            "Classified {} listings ({} commercial models, {} forced to category C)",
            entries.len(),
            commercial.len(),
            overridden
        );
        ClassifiedListings { entries, overridden }
    }
}

/// Records with their final category, in admission order.
#[derive(Debug, Default)]
pub struct ClassifiedListings {
    entries: Vec<(String, VehicleRecord)>,
    overridden: usize,
}

impl ClassifiedListings {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records moved to category C by the commercial override.
    pub fn overridden(&self) -> usize {
        self.overridden
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VehicleRecord)> {
        self.entries.iter().map(|(g, r)| (g.as_str(), r))
    }
}

impl IntoIterator for ClassifiedListings {
    type Item = (String, VehicleRecord);
    type IntoIter = std::vec::IntoIter<(String, VehicleRecord)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
