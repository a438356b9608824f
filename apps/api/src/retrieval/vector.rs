//! In-memory vector ranking over caller-supplied items.
//!
//! Pure functions only: no shared index state, safe to call from any session.

use serde::{Deserialize, Serialize};

/// Dimension of the fallback hash embedding.
pub const HASH_DIM: usize = 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// A text snippet with its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub text: String,
    pub embedding: Vec<f32>,
}

impl RetrievedItem {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }
}

/// Cosine similarity of `a` and `b`.
/// Zero-norm input, or vectors from different embedding spaces (unequal
/// lengths), yield 0.0.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

/// Returns the `k` items most similar to `query`, best first.
///
/// `k` is clamped to `items.len()`. Equal scores keep their input order
/// (`sort_by` is stable), so results are reproducible.
pub fn rank(items: &[RetrievedItem], query: &[f32], k: usize) -> Vec<RetrievedItem> {
    let mut scored: Vec<(usize, f64)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (i, cosine(&item.embedding, query)))
        .collect();

    // NaN cannot come out of `cosine` for finite input; treat it as lowest if it does.
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or_else(|| a.1.is_nan().cmp(&b.1.is_nan()))
    });

    scored
        .into_iter()
        .take(k.min(items.len()))
        .map(|(i, _)| items[i].clone())
        .collect()
}

/// Deterministic, order-sensitive bag-of-hashes embedding used when no
/// embedding backend is available. FNV-1a over the characters, each prefix
/// hash bumps one of `HASH_DIM` buckets; the result is L2-normalised.
pub fn text_hash(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; HASH_DIM];
    let mut hash = FNV_OFFSET;
    for ch in text.chars() {
        hash ^= u64::from(u32::from(ch));
        hash = hash.wrapping_mul(FNV_PRIME);
        vector[(hash % HASH_DIM as u64) as usize] += 1.0;
    }

    let norm = vector
        .iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        let scale = (1.0 / norm) as f32;
        vector.iter_mut().for_each(|x| *x *= scale);
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, embedding: Vec<f32>) -> RetrievedItem {
        RetrievedItem::new(text, embedding)
    }

    #[test]
    fn test_cosine_self_is_one() {
        let v = vec![0.3, -1.2, 4.0, 0.0];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine(&v, &[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine(&[], &v), 0.0);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_mismatched_lengths_is_zero() {
        // a shared prefix alone would score 1.0
        assert_eq!(cosine(&[1.0, 0.0], &[1.0, 0.0, 5.0]), 0.0);
        assert_eq!(cosine(&text_hash("rust api"), &[1.0; 8]), 0.0);
    }

    #[test]
    fn test_rank_puts_other_dimension_items_last() {
        let items = vec![
            item("backend dims", vec![1.0, 0.0, 0.0]),
            item("same dims", vec![0.5, 0.5]),
        ];
        let ranked = rank(&items, &[1.0, 0.0], 2);
        assert_eq!(ranked[0].text, "same dims");
        assert_eq!(ranked[1].text, "backend dims");
    }

    #[test]
    fn test_rank_orders_by_similarity_descending() {
        let items = vec![
            item("orthogonal", vec![0.0, 1.0]),
            item("exact", vec![1.0, 0.0]),
            item("close", vec![0.9, 0.1]),
            item("opposite", vec![-1.0, 0.0]),
        ];
        let query = [1.0, 0.0];
        let ranked = rank(&items, &query, 4);
        let texts: Vec<&str> = ranked.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["exact", "close", "orthogonal", "opposite"]);

        let scores: Vec<f64> = ranked.iter().map(|i| cosine(&i.embedding, &query)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_rank_clamps_k() {
        let items = vec![item("a", vec![1.0]), item("b", vec![0.5])];
        assert_eq!(rank(&items, &[1.0], 10).len(), 2);
        assert_eq!(rank(&items, &[1.0], 1).len(), 1);
        assert!(rank(&items, &[1.0], 0).is_empty());
        assert!(rank(&[], &[1.0], 3).is_empty());
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let items = vec![
            item("first", vec![1.0, 0.0]),
            item("second", vec![2.0, 0.0]),
            item("zero", vec![0.0, 0.0]),
            item("third", vec![3.0, 0.0]),
        ];
        let ranked = rank(&items, &[1.0, 0.0], 4);
        let texts: Vec<&str> = ranked.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third", "zero"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let items: Vec<RetrievedItem> = ["rust backend", "graphic design", "api integration", "marketing"]
            .iter()
            .map(|t| item(t, text_hash(t)))
            .collect();
        let query = text_hash("backend api");
        assert_eq!(rank(&items, &query, 3), rank(&items, &query, 3));
    }

    #[test]
    fn test_text_hash_is_stable_and_normalised() {
        let a = text_hash("Senior backend engineer");
        let b = text_hash("Senior backend engineer");
        assert_eq!(a, b);
        assert_eq!(a.len(), HASH_DIM);
        let norm: f64 = a.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_text_hash_is_order_sensitive() {
        assert_ne!(text_hash("ab"), text_hash("ba"));
    }

    #[test]
    fn test_text_hash_empty_is_zero_vector() {
        let v = text_hash("");
        assert!(v.iter().all(|x| *x == 0.0));
        assert_eq!(cosine(&v, &text_hash("anything")), 0.0);
    }
}
