use serde::Serialize;
use thiserror::Error;

use crate::matrix::LocationIdx;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TourError {
    #[error("Tour has {found} stops, expected {expected}")]
    WrongLength { expected: usize, found: usize },

    #[error("Tour must start and end at {expected}, found {first} .. {last}")]
    NotClosed {
        expected: LocationIdx,
        first: LocationIdx,
        last: LocationIdx,
    },

    #[error("Location {index} is out of range for {num_locations} locations")]
    OutOfRange {
        index: LocationIdx,
        num_locations: usize,
    },

    #[error("Location {0} is visited more than once")]
    Duplicate(LocationIdx),
}

/// A closed circuit: starts at [`Tour::START`], visits every location exactly
/// once and returns to the start. A tour over `n` locations has `n + 1` stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tour(Vec<LocationIdx>);

impl Tour {
    pub const START: LocationIdx = LocationIdx::new(0);

    pub fn new(stops: Vec<LocationIdx>, num_locations: usize) -> Result<Self, TourError> {
        if stops.len() != num_locations + 1 {
            return Err(TourError::WrongLength {
                expected: num_locations + 1,
                found: stops.len(),
            });
        }

        let (first, last) = (stops[0], stops[num_locations]);
        if first != Self::START || last != Self::START {
            return Err(TourError::NotClosed {
                expected: Self::START,
                first,
                last,
            });
        }

        let mut visited = vec![false; num_locations];
        for &index in &stops[..num_locations] {
            if index.get() >= num_locations {
                return Err(TourError::OutOfRange {
                    index,
                    num_locations,
                });
            }
            if visited[index.get()] {
                return Err(TourError::Duplicate(index));
            }
            visited[index.get()] = true;
        }

        Ok(Self(stops))
    }

    pub fn from_indices(indices: Vec<usize>, num_locations: usize) -> Result<Self, TourError> {
        Self::new(indices.into_iter().map(LocationIdx::new).collect(), num_locations)
    }

    pub fn stops(&self) -> &[LocationIdx] {
        &self.0
    }

    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(LocationIdx::get).collect()
    }

    /// Number of stops, start counted twice.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn num_locations(&self) -> usize {
        self.0.len() - 1
    }

    /// Directed edges in travel order, closing edge included.
    pub fn edges(&self) -> impl Iterator<Item = (LocationIdx, LocationIdx)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tour() {
        let tour = Tour::from_indices(vec![0, 2, 1, 3, 0], 4).unwrap();

        assert_eq!(tour.len(), 5);
        assert_eq!(tour.num_locations(), 4);
        assert_eq!(tour.indices(), vec![0, 2, 1, 3, 0]);
        assert_eq!(
            tour.edges().map(|(a, b)| (a.get(), b.get())).collect::<Vec<_>>(),
            vec![(0, 2), (2, 1), (1, 3), (3, 0)]
        );
    }

    #[test]
    fn test_single_location_tour() {
        let tour = Tour::from_indices(vec![0, 0], 1).unwrap();
        assert_eq!(tour.edges().count(), 1);
    }

    #[test]
    fn test_invalid_tours() {
        assert_eq!(
            Tour::from_indices(vec![0, 1, 0], 3),
            Err(TourError::WrongLength {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            Tour::from_indices(vec![1, 0, 2, 1], 3),
            Err(TourError::NotClosed {
                expected: Tour::START,
                first: LocationIdx::new(1),
                last: LocationIdx::new(1)
            })
        );
        assert_eq!(
            Tour::from_indices(vec![0, 1, 1, 0], 3),
            Err(TourError::Duplicate(LocationIdx::new(1)))
        );
        assert_eq!(
            Tour::from_indices(vec![0, 5, 1, 0], 3),
            Err(TourError::OutOfRange {
                index: LocationIdx::new(5),
                num_locations: 3
            })
        );
    }

    #[test]
    fn test_serializes_as_indices() {
        let tour = Tour::from_indices(vec![0, 1, 0], 2).unwrap();
        assert_eq!(serde_json::to_string(&tour).unwrap(), "[0,1,0]");
    }
}
