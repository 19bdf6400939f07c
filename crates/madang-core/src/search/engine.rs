//! Intent-routed search.
//!
//! Routes a classified question to the retrieval settings configured for
//! its intent: which files to search, which chunking strategies to accept,
//! how many results to return, and whether to apply hybrid re-ranking.
//! One intent, merchant lookup, bypasses the vector index entirely and runs
//! a structured scan over the stored row records.

use crate::config::{DocProfile, DocProfiles};
use crate::error::SearchError;
use crate::index::{SearchHit, SharedIndex};
use crate::search::ranking::hybrid_rank;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Intent name routed to the structured row lookup.
pub const MERCHANT_INTENT: &str = "MERCHANT_DATA";

/// Strategy tag row records carry in the store.
const STRUCTURED_STRATEGY: &str = "csv";

/// Row fields the structured lookup matches tokens against, in priority
/// order: merchant code, merchant name, business registration number.
const DEFAULT_LOOKUP_FIELDS: [&str; 3] = ["가맹점코드", "가맹점명", "사업자등록번호"];

/// Profile-driven search frontend over a shared [`VectorIndex`].
///
/// [`VectorIndex`]: crate::index::VectorIndex
pub struct SearchEngine {
    index: SharedIndex,
    profiles: DocProfiles,
    profiles_path: PathBuf,
    lookup_fields: Vec<String>,
}

impl SearchEngine {
    /// Creates an engine reading profiles from the given path.
    ///
    /// A missing or malformed profile file yields an empty mapping, so
    /// every intent resolves to no profile and returns empty results.
    pub fn new<P: AsRef<Path>>(index: SharedIndex, profiles_path: P) -> Self {
        let profiles_path = profiles_path.as_ref().to_path_buf();
        let profiles = DocProfiles::load(&profiles_path);
        Self {
            index,
            profiles,
            profiles_path,
            lookup_fields: DEFAULT_LOOKUP_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Overrides the fields the structured lookup matches against.
    pub fn with_lookup_fields(mut self, fields: Vec<String>) -> Self {
        self.lookup_fields = fields;
        self
    }

    /// Re-reads the profile file. Call after editing profiles to pick up
    /// changes without restarting.
    pub fn reload_profiles(&mut self) {
        self.profiles = DocProfiles::load(&self.profiles_path);
        info!(intents = self.profiles.intents.len(), "profiles reloaded");
    }

    /// Searches with the profile configured for `intent`.
    ///
    /// Unconfigured intents return empty results rather than erroring; a
    /// blank question is rejected. The merchant intent routes to the
    /// structured lookup, everything else to semantic retrieval.
    #[instrument(skip(self))]
    pub fn search(&self, question: &str, intent: &str) -> Result<Vec<SearchHit>, SearchError> {
        if question.trim().is_empty() {
            return Err(SearchError::InvalidQuery(
                "question must not be blank".to_string(),
            ));
        }

        let Some(profile) = self.profiles.get(intent) else {
            debug!(intent, "no profile for intent");
            return Ok(Vec::new());
        };

        if intent == MERCHANT_INTENT {
            return Ok(self.structured_lookup(question, profile));
        }

        self.semantic_search(question, profile)
    }

    /// Dense retrieval with per-strategy fan-out.
    ///
    /// A single configured strategy issues one filtered search. Multiple
    /// strategies (or none) fan out one search each, concatenated in
    /// strategy order and deduplicated by fingerprint, keeping the first
    /// occurrence. Hybrid re-ranking, when enabled, runs over the combined
    /// candidate list before truncation to `top_k`.
    fn semantic_search(
        &self,
        question: &str,
        profile: &DocProfile,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let top_k = profile.top_k;
        let files = profile.files.as_deref();
        let strategies = profile.strategies.as_deref().unwrap_or(&[]);

        let index = self.index.read();

        let mut candidates = if strategies.len() == 1 {
            index.search(question, top_k, Some(strategies[0].as_str()), files)?
        } else {
            let passes: Vec<Option<&str>> = if strategies.is_empty() {
                vec![None]
            } else {
                strategies.iter().map(|s| Some(s.as_str())).collect()
            };

            let mut combined = Vec::new();
            for strategy in passes {
                combined.extend(index.search(question, top_k, strategy, files)?);
            }

            let mut seen = HashSet::new();
            combined.retain(|hit| seen.insert(hit.chunk.hash.clone()));
            combined
        };
        drop(index);

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if profile.use_hybrid_rank {
            candidates = hybrid_rank(question, candidates);
        }

        let reason = match_reason(strategies);
        candidates.truncate(top_k);
        for hit in &mut candidates {
            hit.matched_by = vec![reason.clone()];
        }

        Ok(candidates)
    }

    /// Token-based scan over stored row records.
    ///
    /// The question is split into tokens (commas and colons count as
    /// separators) and matched against the lookup fields of records from
    /// the profile's allowed files. An exact token match anywhere wins at
    /// score 1.0; otherwise the first substring match scores 0.8. At most
    /// one record is returned, and a profile without a file allow-list
    /// matches nothing.
    fn structured_lookup(&self, question: &str, profile: &DocProfile) -> Vec<SearchHit> {
        let Some(allowed) = profile.files.as_deref().filter(|f| !f.is_empty()) else {
            return Vec::new();
        };

        let tokens: Vec<String> = question
            .replace([',', ':'], " ")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let index = self.index.read();
        let eligible = index.records().iter().filter(|r| {
            allowed.iter().any(|f| f == &r.file_name)
                && r.strategy() == Some(STRUCTURED_STRATEGY)
        });

        // exact pass first, then a separate partial pass
        for record in eligible.clone() {
            for token in &tokens {
                let exact = self
                    .lookup_fields
                    .iter()
                    .any(|field| record.get_str(field) == Some(token.as_str()));
                if exact {
                    return vec![SearchHit {
                        chunk: record.clone(),
                        score: 1.0,
                        matched_by: vec!["csv.exact".to_string()],
                    }];
                }
            }
        }

        for record in eligible {
            for token in &tokens {
                let partial = self.lookup_fields.iter().any(|field| {
                    record
                        .get_str(field)
                        .map(|value| value.contains(token.as_str()))
                        .unwrap_or(false)
                });
                if partial {
                    return vec![SearchHit {
                        chunk: record.clone(),
                        score: 0.8,
                        matched_by: vec!["csv.partial".to_string()],
                    }];
                }
            }
        }

        Vec::new()
    }
}

/// Provenance tag for semantic results: `semantic:law,regular` when
/// strategies are configured, bare `semantic` otherwise.
fn match_reason(strategies: &[String]) -> String {
    if strategies.is_empty() {
        "semantic".to_string()
    } else {
        format!("semantic:{}", strategies.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_reason_with_strategies() {
        let strategies = vec!["law".to_string(), "regular".to_string()];
        assert_eq!(match_reason(&strategies), "semantic:law,regular");
    }

    #[test]
    fn test_match_reason_without_strategies() {
        assert_eq!(match_reason(&[]), "semantic");
    }
}
