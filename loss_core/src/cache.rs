//! # Loss Caches
//!
//! Two independent memo tables owned by a loss engineer.
//!
//! - [`PersistedLossCache`]: losses under the project configuration, keyed
//!   by POI identity and interval. Entries live until the engineer is
//!   invalidated.
//! - [`DesignLossCache`]: losses under a trial configuration, one live entry
//!   per POI. A request with an equal configuration reuses the entry, a
//!   different configuration replaces it. Staleness beyond configuration
//!   equality is the caller's concern; [`DesignLossCache::clear`] is the only
//!   other invalidation.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::GirderConfiguration;
use crate::intervals::IntervalIndex;
use crate::losses::LossDetails;
use crate::poi::PoiId;

/// Hit, miss and computation counters of one cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheCounters {
    pub hits: usize,
    pub misses: usize,
    /// Strategy evaluations performed to fill misses
    pub computations: usize,
    /// Entries currently held
    pub entries: usize,
}

/// Counters of both caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    pub persisted: CacheCounters,
    pub design: CacheCounters,
}

#[derive(Debug, Default)]
pub struct PersistedLossCache {
    entries: HashMap<PoiId, BTreeMap<IntervalIndex, Rc<LossDetails>>>,
    counters: CacheCounters,
}

impl PersistedLossCache {
    pub fn get(&mut self, poi: PoiId, interval: IntervalIndex) -> Option<Rc<LossDetails>> {
        let found = self
            .entries
            .get(&poi)
            .and_then(|by_interval| by_interval.get(&interval))
            .cloned();
        match found {
            Some(_) => self.counters.hits += 1,
            None => self.counters.misses += 1,
        }
        found
    }

    /// Store a computed series; intervals already cached keep their entry.
    /// Returns the stored losses for the last interval of the series.
    pub fn insert_series(&mut self, poi: PoiId, series: Vec<LossDetails>) -> Option<Rc<LossDetails>> {
        self.counters.computations += 1;
        let by_interval = self.entries.entry(poi).or_default();
        let mut last = None;
        for details in series {
            let stored = by_interval
                .entry(details.interval)
                .or_insert_with(|| Rc::new(details));
            last = Some(Rc::clone(stored));
        }
        self.counters.entries = self.entries.values().map(BTreeMap::len).sum();
        last
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.counters.entries = 0;
    }

    pub fn counters(&self) -> CacheCounters {
        self.counters
    }
}

#[derive(Debug)]
struct DesignEntry {
    config: GirderConfiguration,
    losses: BTreeMap<IntervalIndex, Rc<LossDetails>>,
}

#[derive(Debug, Default)]
pub struct DesignLossCache {
    entries: HashMap<PoiId, DesignEntry>,
    counters: CacheCounters,
}

impl DesignLossCache {
    /// Cached losses for the POI if its live entry was computed for an equal configuration
    pub fn get(
        &mut self,
        poi: PoiId,
        config: &GirderConfiguration,
        interval: IntervalIndex,
    ) -> Option<Rc<LossDetails>> {
        let found = self
            .entries
            .get(&poi)
            .filter(|entry| entry.config == *config)
            .and_then(|entry| entry.losses.get(&interval))
            .cloned();
        match found {
            Some(_) => self.counters.hits += 1,
            None => self.counters.misses += 1,
        }
        found
    }

    /// Store a computed series. An entry for a different configuration is
    /// replaced wholesale; an entry for an equal configuration is extended.
    pub fn insert_series(
        &mut self,
        poi: PoiId,
        config: &GirderConfiguration,
        series: Vec<LossDetails>,
    ) -> Option<Rc<LossDetails>> {
        self.counters.computations += 1;
        let entry = self.entries.entry(poi).or_insert_with(|| DesignEntry {
            config: config.clone(),
            losses: BTreeMap::new(),
        });
        if entry.config != *config {
            entry.config = config.clone();
            entry.losses.clear();
        }
        let mut last = None;
        for details in series {
            let stored = entry
                .losses
                .entry(details.interval)
                .or_insert_with(|| Rc::new(details));
            last = Some(Rc::clone(stored));
        }
        self.counters.entries = self.entries.len();
        last
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.counters.entries = 0;
    }

    pub fn counters(&self) -> CacheCounters {
        self.counters
    }
}
