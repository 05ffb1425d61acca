use crate::error::PipelineError;
use crate::pipeline::{AnalysisParams, Pipeline};
use crate::report::AnalysisReport;
use core_types::{MacroRow, PriceRow};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Hex-encoded SHA-256 digest of an analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hashes the raw input rows together with the parameters.
    ///
    /// Rows are serialized as JSON in input order, so reordering the input
    /// yields a different key even when the merged result would match.
    pub fn new(prices: &[PriceRow], macros: &[MacroRow], params: &AnalysisParams) -> Result<Self, PipelineError> {
        #[derive(Serialize)]
        struct Request<'a> {
            prices: &'a [PriceRow],
            macros: &'a [MacroRow],
            params: &'a AnalysisParams,
        }

        let payload = serde_json::to_vec(&Request { prices, macros, params })?;
        Ok(Self(hex::encode(Sha256::digest(&payload))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// A bounded memo of analysis reports keyed by content hash.
///
/// When full, the entry inserted first is evicted. Lookups do not refresh an
/// entry's position.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: VecDeque<(CacheKey, Arc<AnalysisReport>)>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl AnalysisCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<AnalysisReport>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, report)| Arc::clone(report))
    }

    pub fn insert(&mut self, key: CacheKey, report: Arc<AnalysisReport>) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = report;
            return;
        }
        if self.entries.len() == self.capacity {
            if let Some((evicted, _)) = self.entries.pop_front() {
                tracing::debug!(key = %evicted, "Evicted analysis from cache.");
            }
        }
        self.entries.push_back((key, report));
    }

    /// Returns the cached report for these inputs, computing and storing it on a miss.
    pub fn get_or_compute(
        &mut self,
        prices: &[PriceRow],
        macros: &[MacroRow],
        params: &AnalysisParams,
    ) -> Result<Arc<AnalysisReport>, PipelineError> {
        let key = CacheKey::new(prices, macros, params)?;
        if let Some(report) = self.get(&key) {
            self.hits += 1;
            tracing::debug!(%key, "Analysis cache hit.");
            return Ok(report);
        }

        self.misses += 1;
        tracing::debug!(%key, "Analysis cache miss.");
        let report = Arc::new(Pipeline::run(prices, macros, params)?);
        self.insert(key, Arc::clone(&report));
        Ok(report)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            capacity: self.capacity,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
