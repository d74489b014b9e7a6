//! Result diversification across fragment types.

use finqa_core::types::{FragmentType, RetrievalResult};

/// Reorder `results` so each fragment type is represented before score order
/// fills the remainder; returns at most `k`. A result set already within
/// budget passes through untouched.
pub fn diversify(results: &[RetrievalResult], k: usize) -> Vec<RetrievalResult> {
    if results.len() <= k {
        return results.to_vec();
    }

    let mut picked = vec![false; results.len()];
    let mut seen_types: Vec<FragmentType> = Vec::new();
    let mut out = Vec::with_capacity(k);

    for (i, result) in results.iter().enumerate() {
        if !seen_types.contains(&result.source.fragment_type) {
            seen_types.push(result.source.fragment_type);
            picked[i] = true;
            out.push(result.clone());
            if out.len() >= k {
                return out;
            }
        }
    }
    for (i, result) in results.iter().enumerate() {
        if !picked[i] {
            out.push(result.clone());
            if out.len() >= k {
                break;
            }
        }
    }
    out
}
