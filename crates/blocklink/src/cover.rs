//! Covers: which records (or labeled pairs) each predicate groups together.
//!
//! Covers are read-only snapshots. They are rebuilt whenever the predicate
//! set or the dataset changes.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::predicates::{IndexService, Predicate};
use crate::record::{IdentifiedRecord, Keys, RecordId};

/// Tunables for cover building.
#[derive(Debug, Clone)]
pub struct CoverConfig {
    /// Records per worker shard.
    pub shard_size: usize,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self { shard_size: 1024 }
    }
}

/// Per-predicate map of block key to the records carrying it.
type BlockMap = Vec<HashMap<String, BTreeSet<RecordId>>>;

fn merge_blocks(mut left: BlockMap, right: BlockMap) -> BlockMap {
    for (into, from) in left.iter_mut().zip(right) {
        for (key, ids) in from {
            into.entry(key).or_default().extend(ids);
        }
    }
    left
}

/// One predicate's coverage, for reports.
#[derive(Debug, Clone, Serialize)]
pub struct CoverEntry<T> {
    pub predicate: String,
    pub fingerprint: String,
    pub size: usize,
    pub covered: Vec<T>,
}

/// Predicate to the set of records that share a block key with another
/// record under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cover {
    blocks: HashMap<Predicate, BTreeSet<RecordId>>,
}

impl Cover {
    /// Build a cover with the default configuration.
    pub fn build(
        predicates: &[Predicate],
        records: &[IdentifiedRecord],
        index: Option<&dyn IndexService>,
    ) -> Result<Self> {
        Self::build_with_config(predicates, records, index, &CoverConfig::default())
    }

    /// Build a cover, evaluating record shards in parallel.
    ///
    /// Each shard produces its own key map; maps are merged by key-wise
    /// union, so the result does not depend on the shard size.
    #[instrument(
        skip_all,
        fields(predicates = predicates.len(), records = records.len()),
        level = "debug"
    )]
    pub fn build_with_config(
        predicates: &[Predicate],
        records: &[IdentifiedRecord],
        index: Option<&dyn IndexService>,
        config: &CoverConfig,
    ) -> Result<Self> {
        let shard_size = config.shard_size.max(1);

        let shards: Vec<BlockMap> = records
            .par_chunks(shard_size)
            .map(|shard| -> Result<BlockMap> {
                let mut blocks: BlockMap = vec![HashMap::new(); predicates.len()];
                for record in shard {
                    for (slot, predicate) in predicates.iter().enumerate() {
                        for key in predicate.keys(&record.fields, index)? {
                            blocks[slot].entry(key).or_default().insert(record.id);
                        }
                    }
                }
                Ok(blocks)
            })
            .collect::<Result<Vec<BlockMap>>>()?;

        debug!(shards = shards.len(), "merging shard block maps");
        let merged = shards
            .into_iter()
            .reduce(merge_blocks)
            .unwrap_or_else(|| vec![HashMap::new(); predicates.len()]);

        let mut blocks = HashMap::new();
        for (predicate, keyed) in predicates.iter().zip(merged) {
            let covered: BTreeSet<RecordId> = keyed
                .into_values()
                .filter(|ids| ids.len() > 1)
                .flatten()
                .collect();
            if !covered.is_empty() {
                blocks.insert(predicate.clone(), covered);
            }
        }

        debug!(covering = blocks.len(), "built cover");
        Ok(Self { blocks })
    }

    pub fn get(&self, predicate: &Predicate) -> Option<&BTreeSet<RecordId>> {
        self.blocks.get(predicate)
    }

    /// Number of predicates that cover at least one record.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Predicate, &BTreeSet<RecordId>)> {
        self.blocks.iter()
    }

    /// Entries ordered by coverage size, largest first, then by name.
    pub fn ranked(&self) -> Vec<CoverEntry<RecordId>> {
        ranked_entries(&self.blocks)
    }
}

/// Predicate to the labeled pairs whose records share a block key under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonCover {
    pairs: HashMap<Predicate, BTreeSet<(RecordId, RecordId)>>,
}

impl ComparisonCover {
    /// Evaluate every predicate against every pair, predicates in parallel.
    #[instrument(
        skip_all,
        fields(predicates = predicates.len(), pairs = pairs.len()),
        level = "debug"
    )]
    pub fn build(
        predicates: &[Predicate],
        pairs: &[(IdentifiedRecord, IdentifiedRecord)],
        index: Option<&dyn IndexService>,
    ) -> Result<Self> {
        let covered: Vec<(Predicate, BTreeSet<(RecordId, RecordId)>)> = predicates
            .par_iter()
            .map(|predicate| -> Result<(Predicate, BTreeSet<(RecordId, RecordId)>)> {
                let mut covered = BTreeSet::new();
                for (a, b) in pairs {
                    let keys_a: Keys = predicate.keys(&a.fields, index)?;
                    if keys_a.is_empty() {
                        continue;
                    }
                    let keys_b = predicate.keys(&b.fields, index)?;
                    if !keys_a.is_disjoint(&keys_b) {
                        covered.insert((a.id, b.id));
                    }
                }
                Ok((predicate.clone(), covered))
            })
            .collect::<Result<Vec<_>>>()?;

        let pairs: HashMap<_, _> = covered
            .into_iter()
            .filter(|(_, covered)| !covered.is_empty())
            .collect();
        debug!(covering = pairs.len(), "built comparison cover");
        Ok(Self { pairs })
    }

    pub fn get(&self, predicate: &Predicate) -> Option<&BTreeSet<(RecordId, RecordId)>> {
        self.pairs.get(predicate)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Predicate, &BTreeSet<(RecordId, RecordId)>)> {
        self.pairs.iter()
    }

    /// Entries ordered by coverage size, largest first, then by name.
    pub fn ranked(&self) -> Vec<CoverEntry<(RecordId, RecordId)>> {
        ranked_entries(&self.pairs)
    }
}

fn ranked_entries<T: Copy>(map: &HashMap<Predicate, BTreeSet<T>>) -> Vec<CoverEntry<T>> {
    let mut entries: Vec<CoverEntry<T>> = map
        .iter()
        .map(|(predicate, covered)| CoverEntry {
            predicate: predicate.to_string(),
            fingerprint: predicate.fingerprint(),
            size: covered.len(),
            covered: covered.iter().copied().collect(),
        })
        .collect();
    entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.predicate.cmp(&b.predicate)));
    entries
}
