//! Score ordering shared by every ranker.

use std::cmp::Ordering;

use webqa_core::types::ScoredCandidate;

/// Pair each text with its score and keep the best `k`, highest first.
/// The sort is stable, so equal scores keep their input order. NaN sorts last.
pub fn select_top_k<S: AsRef<str>>(texts: &[S], scores: &[f32], k: usize) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = texts
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(i, (t, s))| ScoredCandidate::new(i, t.as_ref(), *s))
        .collect();
    scored.sort_by(|a, b| descending(a.score, b.score));
    scored.truncate(k);
    scored
}

pub fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_input_order() {
        let top = select_top_k(&["a", "b", "c", "d"], &[0.2, 0.9, 0.2, f32::NAN], 3);
        let order: Vec<usize> = top.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }
}
