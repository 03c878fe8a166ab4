//! Birth and death accounting across a run.

use crate::types::OrganismKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why an organism was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeathCause {
    /// Age exceeded the kind's maximum lifetime
    OldAge,
    /// Bacteria: produced nutrient above the ceiling
    Pollution,
    /// Plant: a watched nutrient at or below the floor
    Starvation,
    /// Plant: too many of its kind in one cell
    Overcrowding,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeathCause::OldAge => "old_age",
            DeathCause::Pollution => "pollution",
            DeathCause::Starvation => "starvation",
            DeathCause::Overcrowding => "overcrowding",
        };
        f.write_str(name)
    }
}

/// Counters for a single organism kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindTally {
    /// Children produced by reproduction
    pub births: u64,
    /// Reproductions skipped because the target cell was full
    pub crowded_births: u64,
    /// Organisms added by seeding events or decomposition
    pub spawned: u64,
    pub deaths: BTreeMap<DeathCause, u64>,
}

impl KindTally {
    pub fn total_deaths(&self) -> u64 {
        self.deaths.values().sum()
    }

    pub fn deaths_by(&self, cause: DeathCause) -> u64 {
        self.deaths.get(&cause).copied().unwrap_or(0)
    }
}

/// Population statistics aggregated over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub kinds: BTreeMap<OrganismKind, KindTally>,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self, kind: OrganismKind) -> KindTally {
        self.kinds.get(&kind).cloned().unwrap_or_default()
    }

    pub fn record_birth(&mut self, kind: OrganismKind) {
        self.kinds.entry(kind).or_default().births += 1;
    }

    pub fn record_crowded_birth(&mut self, kind: OrganismKind) {
        self.kinds.entry(kind).or_default().crowded_births += 1;
    }

    pub fn record_spawn(&mut self, kind: OrganismKind) {
        self.kinds.entry(kind).or_default().spawned += 1;
    }

    pub fn record_death(&mut self, kind: OrganismKind, cause: DeathCause) {
        *self
            .kinds
            .entry(kind)
            .or_default()
            .deaths
            .entry(cause)
            .or_insert(0) += 1;
    }

    pub fn total_births(&self) -> u64 {
        self.kinds.values().map(|tally| tally.births).sum()
    }

    pub fn total_deaths(&self) -> u64 {
        self.kinds.values().map(KindTally::total_deaths).sum()
    }

    /// Deaths of every kind from one cause
    pub fn deaths_by(&self, cause: DeathCause) -> u64 {
        self.kinds.values().map(|tally| tally.deaths_by(cause)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_query() {
        let mut stats = PopulationStats::new();
        stats.record_birth(OrganismKind::GrassPlant);
        stats.record_birth(OrganismKind::GrassPlant);
        stats.record_death(OrganismKind::GrassPlant, DeathCause::Starvation);
        stats.record_death(OrganismKind::NitrogenBacteria, DeathCause::OldAge);
        stats.record_death(OrganismKind::NitrogenBacteria, DeathCause::OldAge);

        assert_eq!(stats.total_births(), 2);
        assert_eq!(stats.total_deaths(), 3);
        assert_eq!(stats.deaths_by(DeathCause::OldAge), 2);
        assert_eq!(
            stats
                .tally(OrganismKind::GrassPlant)
                .deaths_by(DeathCause::Starvation),
            1
        );
    }

    #[test]
    fn test_unknown_kind_has_empty_tally() {
        let stats = PopulationStats::new();
        let tally = stats.tally(OrganismKind::TreePlant);
        assert_eq!(tally.births, 0);
        assert_eq!(tally.total_deaths(), 0);
    }
}
