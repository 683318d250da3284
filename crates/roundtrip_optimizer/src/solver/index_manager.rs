use crate::matrix::LocationIdx;

/// Translates between matrix indices and solver node ids.
///
/// The start location is always solver node 0, the remaining locations
/// follow in matrix order.
#[derive(Debug, Clone)]
pub struct NodeIndexManager {
    node_to_location: Vec<LocationIdx>,
    location_to_node: Vec<usize>,
}

impl NodeIndexManager {
    /// # Panics
    ///
    /// Panics if `start` is not one of the `num_locations` locations.
    pub fn new(num_locations: usize, start: LocationIdx) -> Self {
        assert!(
            start.get() < num_locations,
            "start location {start} out of range for {num_locations} locations"
        );

        let node_to_location: Vec<LocationIdx> = std::iter::once(start)
            .chain(
                (0..num_locations)
                    .map(LocationIdx::new)
                    .filter(|&location| location != start),
            )
            .collect();

        let mut location_to_node = vec![0; num_locations];
        for (node, location) in node_to_location.iter().enumerate() {
            location_to_node[location.get()] = node;
        }

        Self {
            node_to_location,
            location_to_node,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.node_to_location.len()
    }

    pub fn start_node(&self) -> usize {
        0
    }

    pub fn node_to_location(&self, node: usize) -> LocationIdx {
        self.node_to_location[node]
    }

    pub fn location_to_node(&self, location: LocationIdx) -> usize {
        self.location_to_node[location.get()]
    }
}
