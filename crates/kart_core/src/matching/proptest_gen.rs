//! Property-based test generators and reference computations for matching

use super::graph::{BipartiteGraph, CarNumber, PilotId};
use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Random graph over distinct cars `1..=n`, every edge pointing into the
/// returned car list.
pub fn graph_strategy(
    max_pilots: usize,
    max_cars: usize,
) -> impl Strategy<Value = (BipartiteGraph<'static>, Vec<CarNumber>)> {
    (0..=max_pilots, 0..=max_cars).prop_flat_map(|(pilots, cars)| {
        let car_ids: Vec<CarNumber> = (1..=cars as CarNumber).collect();
        proptest::collection::vec(proptest::sample::subsequence(car_ids.clone(), 0..=cars), pilots)
            .prop_map(move |edges| {
                let graph = BipartiteGraph::from_edges(
                    edges.into_iter().enumerate().map(|(pilot, reachable)| (pilot as PilotId, reachable)),
                );
                (graph, car_ids.clone())
            })
    })
}

/// Maximum matching size via Kuhn-Munkres on a 0/1 weight matrix.
pub fn reference_maximum(graph: &BipartiteGraph<'_>) -> usize {
    if graph.edge_count() == 0 {
        return 0;
    }

    let pilots: Vec<PilotId> = graph.pilots().collect();
    let cars: Vec<CarNumber> =
        graph.iter().flat_map(|(_, cars)| cars.iter().copied()).collect::<BTreeSet<_>>().into_iter().collect();
    let size = pilots.len().max(cars.len());

    let weights = Matrix::from_fn(size, size, |(row, col)| {
        match (pilots.get(row), cars.get(col)) {
            (Some(&pilot), Some(&car)) if graph.has_edge(pilot, car) => 1i64,
            _ => 0,
        }
    });

    let (total, _) = kuhn_munkres(&weights);
    total as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_maximum_on_bottleneck() {
        let graph = BipartiteGraph::from_edges([(0, vec![2]), (1, vec![2]), (2, vec![1, 2])]);
        assert_eq!(reference_maximum(&graph), 2);
    }

    #[test]
    fn test_reference_maximum_without_edges() {
        let graph = BipartiteGraph::from_edges([(0, Vec::<CarNumber>::new())]);
        assert_eq!(reference_maximum(&graph), 0);
    }
}
