//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

/// A sparse vector of fixed dimension with entries sorted by index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// The all-zero vector of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a vector from `(index, value)` entries.
    ///
    /// Entries are sorted by index, duplicate indices are summed, zero values
    /// and indices outside `0..dim` are dropped.
    pub fn from_entries<I>(dim: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut entries: Vec<(usize, f64)> = entries
            .into_iter()
            .filter(|&(index, _)| index < dim)
            .collect();
        entries.sort_by_key(|&(index, _)| index);

        let mut indices: Vec<usize> = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        for (index, value) in entries {
            match indices.last() {
                Some(&last) if last == index => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(index);
                    values.push(value);
                }
            }
        }

        let mut vector = SparseVector {
            dim,
            indices,
            values,
        };
        vector.drop_zeros();
        vector
    }

    fn drop_zeros(&mut self) {
        let mut keep = 0;
        for i in 0..self.indices.len() {
            if self.values[i] != 0.0 {
                self.indices[keep] = self.indices[i];
                self.values[keep] = self.values[i];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }

    /// Dimension of the vector.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Whether every entry is zero.
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over the non-zero `(index, value)` entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `index` (zero when absent).
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit Euclidean norm. The zero vector stays zero.
    pub fn normalize_l2(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.values {
                *value /= norm;
            }
        }
    }

    /// Dot product with a dense slice of at least `dim` values.
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(index, value)| dense[index] * value).sum()
    }

    /// Expand into a dense vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (index, value) in self.iter() {
            dense[index] = value;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_sorts_and_merges() {
        let vector = SparseVector::from_entries(5, vec![(3, 1.0), (1, 2.0), (3, 0.5), (9, 1.0)]);

        assert_eq!(vector.dim(), 5);
        assert_eq!(vector.nnz(), 2);
        assert_eq!(vector.iter().collect::<Vec<_>>(), vec![(1, 2.0), (3, 1.5)]);
        assert_eq!(vector.get(3), 1.5);
        assert_eq!(vector.get(0), 0.0);
    }

    #[test]
    fn test_zero_entries_are_dropped() {
        let vector = SparseVector::from_entries(3, vec![(0, 1.0), (0, -1.0), (2, 0.0)]);
        assert!(vector.is_zero());
        assert_eq!(vector, SparseVector::zeros(3));
    }

    #[test]
    fn test_normalize_l2() {
        let mut vector = SparseVector::from_entries(4, vec![(0, 3.0), (2, 4.0)]);
        vector.normalize_l2();

        assert!((vector.norm() - 1.0).abs() < 1e-12);
        assert_eq!(vector.to_dense(), vec![0.6, 0.0, 0.8, 0.0]);

        let mut zero = SparseVector::zeros(4);
        zero.normalize_l2();
        assert!(zero.is_zero());
    }

    #[test]
    fn test_dot_dense() {
        let vector = SparseVector::from_entries(3, vec![(0, 2.0), (2, 1.0)]);
        assert_eq!(vector.dot_dense(&[1.0, 10.0, 3.0]), 5.0);
    }
}
