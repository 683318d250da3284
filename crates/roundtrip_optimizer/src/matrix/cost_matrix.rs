use roundtrip_providers::{cache::CachedMatrix, cost::Cost};
use thiserror::Error;

use super::LocationIdx;

#[derive(Debug, Error, PartialEq)]
pub enum CostMatrixError {
    #[error("A cost matrix needs at least one location")]
    Empty,

    #[error("Row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Diagonal entry {index} is {cost}, expected 0")]
    NonZeroDiagonal { index: usize, cost: Cost },
}

/// Directed travel costs between every pair of locations.
///
/// Stored flat, row-major: the cost from `from` to `to` lives at
/// `from * num_locations + to`. The diagonal is always zero, the matrix is
/// not required to be symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    costs: Vec<Cost>,
    num_locations: usize,
}

impl CostMatrix {
    pub fn new(rows: Vec<Vec<Cost>>) -> Result<Self, CostMatrixError> {
        let num_locations = rows.len();

        for (row, costs) in rows.iter().enumerate() {
            if costs.len() != num_locations {
                return Err(CostMatrixError::NotSquare {
                    row,
                    len: costs.len(),
                    expected: num_locations,
                });
            }
        }

        Self::from_flat(rows.into_iter().flatten().collect(), num_locations)
    }

    /// Builds a matrix from raw values; non-finite values become
    /// [`Cost::Unreachable`].
    pub fn from_values(rows: Vec<Vec<f64>>) -> Result<Self, CostMatrixError> {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Cost::new).collect())
                .collect(),
        )
    }

    pub(crate) fn from_flat(costs: Vec<Cost>, num_locations: usize) -> Result<Self, CostMatrixError> {
        if num_locations == 0 {
            return Err(CostMatrixError::Empty);
        }

        if costs.len() != num_locations * num_locations {
            return Err(CostMatrixError::NotSquare {
                row: costs.len() / num_locations,
                len: costs.len() % num_locations,
                expected: num_locations,
            });
        }

        for index in 0..num_locations {
            let cost = costs[index * num_locations + index];
            if cost != Cost::ZERO {
                return Err(CostMatrixError::NonZeroDiagonal { index, cost });
            }
        }

        Ok(Self {
            costs,
            num_locations,
        })
    }

    #[inline(always)]
    fn index(&self, from: LocationIdx, to: LocationIdx) -> usize {
        from.get() * self.num_locations + to.get()
    }

    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline(always)]
    pub fn get(&self, from: LocationIdx, to: LocationIdx) -> Cost {
        self.costs[self.index(from, to)]
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cost]> {
        self.costs.chunks(self.num_locations)
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.num_locations).all(|i| {
            (0..i).all(|j| {
                self.costs[i * self.num_locations + j] == self.costs[j * self.num_locations + i]
            })
        })
    }

    /// Number of off-diagonal cells without a feasible path.
    pub fn unreachable_cells(&self) -> usize {
        self.costs.iter().filter(|cost| cost.is_unreachable()).count()
    }

    pub fn to_cached(&self) -> CachedMatrix {
        CachedMatrix {
            num_locations: self.num_locations,
            costs: self.costs.clone(),
        }
    }

    pub fn from_cached(cached: CachedMatrix) -> Result<Self, CostMatrixError> {
        Self::from_flat(cached.costs, cached.num_locations)
    }
}
