//! Sparse vector similarity functions.

use std::collections::BTreeMap;

/// Sparse vector keyed by vocabulary column.
pub type SparseVector = BTreeMap<usize, f32>;

/// Calculate cosine similarity between two sparse vectors.
///
/// Returns 0.0 when either vector is empty or has zero norm.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // Iterate the shorter vector, probe the longer one
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot_product: f32 = short
        .iter()
        .filter_map(|(col, x)| long.get(col).map(|y| x * y))
        .sum();

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Normalize a vector to unit length in place.
pub fn normalize(v: &mut SparseVector) {
    let n = norm(v);
    if n > 0.0 {
        for val in v.values_mut() {
            *val /= n;
        }
    }
}

fn norm(v: &SparseVector) -> f32 {
    v.values().map(|x| x * x).sum::<f32>().sqrt()
}
