//! Dense + sparse hybrid re-ranking.
//!
//! Re-orders a dense candidate list by fusing the cosine scores with BM25
//! lexical scores computed over the candidates themselves. The sparse side
//! uses the [`bm25`](https://crates.io/crates/bm25) crate; the corpus is
//! ephemeral, built per query from the candidate texts, so no second
//! persistent index is maintained.

use crate::index::SearchHit;
use bm25::{Document, Language, SearchEngineBuilder};

/// Weight of the dense (cosine) score in the fused ranking.
pub const W_DENSE: f32 = 0.6;

/// Weight of the sparse (BM25) score in the fused ranking.
pub const W_SPARSE: f32 = 0.4;

/// Fuses dense and BM25 scores over the candidate list and re-sorts it.
///
/// Both score vectors are independently max-normalized before the weighted
/// sum, so the fusion compares relative standings rather than raw
/// magnitudes. The sort is stable and descending: equal fused scores keep
/// the incoming dense order.
///
/// Each returned hit carries its fused score in place of the raw cosine
/// value. The fused value is what ordered the list, so consumers must not
/// read hybrid scores as cosine similarities.
///
/// Candidate lists that cannot be lexically scored pass through unchanged:
/// an empty list, a list whose candidates all lack text (pure row-record
/// results), or one where any candidate tokenizes to nothing.
pub fn hybrid_rank(query: &str, hits: Vec<SearchHit>) -> Vec<SearchHit> {
    if hits.is_empty() {
        return hits;
    }

    let texts: Vec<&str> = hits
        .iter()
        .map(|h| h.chunk.get_str("text").unwrap_or(""))
        .collect();

    if texts.iter().all(|t| t.trim().is_empty()) {
        return hits;
    }
    if texts.iter().any(|t| t.split_whitespace().count() == 0) {
        return hits;
    }

    let documents: Vec<Document<usize>> = texts
        .iter()
        .enumerate()
        .map(|(id, text)| Document {
            id,
            contents: text.to_string(),
        })
        .collect();
    let engine = SearchEngineBuilder::<usize>::with_documents(Language::English, documents).build();

    let mut sparse = vec![0.0f32; hits.len()];
    for result in engine.search(query, hits.len()) {
        sparse[result.document.id] = result.score;
    }
    max_normalize(&mut sparse);

    let mut dense: Vec<f32> = hits.iter().map(|h| h.score).collect();
    max_normalize(&mut dense);

    let mut fused: Vec<(usize, SearchHit)> = hits.into_iter().enumerate().collect();
    for (idx, hit) in fused.iter_mut() {
        hit.score = W_DENSE * dense[*idx] + W_SPARSE * sparse[*idx];
    }

    let mut ranked: Vec<SearchHit> = fused.into_iter().map(|(_, hit)| hit).collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Divides by the maximum when it is positive; otherwise leaves the scores
/// untouched (an all-zero or negative vector has no meaningful scale).
fn max_normalize(scores: &mut [f32]) {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > 0.0 {
        for s in scores.iter_mut() {
            *s /= max;
        }
    }
}
