use crate::matrix::{CostMatrix, LocationIdx};

use super::{Tour, TourConstructionError, TourConstructor};

pub const NEAREST_NEIGHBOR: &str = "nearest-neighbor";

/// **Greedy nearest neighbor**
///
/// Starting at [`Tour::START`], repeatedly moves to the cheapest unvisited
/// location, then returns to the start. Ties go to the lowest index, which
/// makes the output fully determined by the matrix.
///
/// Unreachable candidates are only picked when every remaining candidate is
/// unreachable, in which case the lowest index wins like any other tie. The
/// tour is still built; its total cost reports the gap.
///
/// O(n²), never backtracks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestNeighbor;

impl TourConstructor for NearestNeighbor {
    fn name(&self) -> &str {
        NEAREST_NEIGHBOR
    }

    fn construct(&self, matrix: &CostMatrix) -> Result<Tour, TourConstructionError> {
        let num_locations = matrix.num_locations();

        let mut visited = vec![false; num_locations];
        let mut stops = Vec::with_capacity(num_locations + 1);

        let mut current = Tour::START;
        visited[current.get()] = true;
        stops.push(current);

        for _ in 1..num_locations {
            // min_by keeps the first of equal elements, candidates come in
            // ascending index order
            let next = (0..num_locations)
                .filter(|&index| !visited[index])
                .map(LocationIdx::new)
                .min_by(|&a, &b| matrix.get(current, a).total_cmp(&matrix.get(current, b)));

            let Some(next) = next else {
                break;
            };

            visited[next.get()] = true;
            stops.push(next);
            current = next;
        }

        stops.push(Tour::START);

        Ok(Tour::new(stops, num_locations)?)
    }
}
