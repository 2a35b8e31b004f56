//! Exact L2 index over row-major `f32` vectors.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

/// A candidate ordered by distance, then by row so that earlier rows win ties.
#[derive(Debug, Clone, Copy)]
struct Neighbor {
    distance: f32,
    row: usize,
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance).then(self.row.cmp(&other.row))
    }
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(StoreError::InvalidDimension(dim));
        }
        Ok(Self { dim, data: Vec::new() })
    }

    /// Rebuild from a flat buffer; `data.len()` must be a multiple of `dim`.
    pub(crate) fn from_raw(dim: usize, data: Vec<f32>) -> Result<Self> {
        if dim == 0 {
            return Err(StoreError::InvalidDimension(dim));
        }
        if data.len() % dim != 0 {
            return Err(StoreError::DimensionMismatch { expected: dim, actual: data.len() % dim });
        }
        Ok(Self { dim, data })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Check every row's width without touching the index.
    pub fn check_rows(&self, rows: &[Vec<f32>]) -> Result<()> {
        match rows.iter().find(|r| r.len() != self.dim) {
            Some(bad) => Err(StoreError::DimensionMismatch { expected: self.dim, actual: bad.len() }),
            None => Ok(()),
        }
    }

    /// Append rows in order. All rows are validated before any is appended.
    pub fn add(&mut self, rows: &[Vec<f32>]) -> Result<()> {
        self.check_rows(rows)?;
        self.data.reserve(rows.len() * self.dim);
        for r in rows {
            self.data.extend_from_slice(r);
        }
        Ok(())
    }

    /// The `k` rows closest to `query`, as `(row, squared distance)` in
    /// ascending distance order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(StoreError::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        // max-heap of the k best so far; the root is the current worst
        let mut heap: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k + 1);
        for (row, vector) in self.data.chunks_exact(self.dim).enumerate() {
            let candidate = Neighbor { distance: squared_l2(query, vector), row };
            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }
        Ok(heap.into_sorted_vec().into_iter().map(|n| (n.row, n.distance)).collect())
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
