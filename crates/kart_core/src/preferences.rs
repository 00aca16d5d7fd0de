//! Per-pilot set of cars not yet driven this session
//!
//! At session start every pilot may take any available car. Each recorded
//! race removes the edge-backed car a pilot received, so successive races
//! push every pilot through distinct cars. Fallback cars are never removed:
//! they already are repeats. Sets only grow back on a full reset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::matching::{BipartiteGraph, CarNumber, CarSet, MatchingOutcome, PilotId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceGraph {
    preferred: BTreeMap<PilotId, CarSet>,
}

impl PreferenceGraph {
    /// Pilots `0..pilot_count`, each allowed every car in `cars`.
    pub fn new(pilot_count: u32, cars: &[CarNumber]) -> Self {
        let mut graph = Self::default();
        graph.reset(pilot_count, cars);
        graph
    }

    pub fn reset(&mut self, pilot_count: u32, cars: &[CarNumber]) {
        let all: CarSet = cars.iter().copied().collect();
        self.preferred = (0..pilot_count).map(|pilot| (pilot, all.clone())).collect();
        debug!(pilot_count, car_count = all.len(), "preference graph reset");
    }

    pub fn pilot_count(&self) -> usize {
        self.preferred.len()
    }

    /// Cars `pilot` has not driven yet.
    pub fn cars_for(&self, pilot: PilotId) -> Option<&CarSet> {
        self.preferred.get(&pilot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PilotId, &CarSet)> + '_ {
        self.preferred.iter().map(|(pilot, cars)| (*pilot, cars))
    }

    /// Graph restricted to `pilots`, borrowing the edge sets.
    ///
    /// A pilot unknown to the preference graph is kept with no edge, so the
    /// engine still gives it a fallback car.
    pub fn group_graph<I>(&self, pilots: I) -> BipartiteGraph<'_>
    where
        I: IntoIterator<Item = PilotId>,
    {
        let mut graph = BipartiteGraph::new();
        for pilot in pilots {
            match self.preferred.get(&pilot) {
                Some(cars) => graph.insert_view(pilot, cars),
                None => graph.insert_isolated(pilot),
            }
        }
        graph
    }

    /// Remove each edge-backed car of `outcome` from its pilot's set.
    ///
    /// Must run at most once per race: a second call finds nothing left to
    /// remove but the race would be counted twice by the caller.
    pub fn apply_outcome(&mut self, outcome: &MatchingOutcome) {
        let mut removed = 0usize;
        for (pilot, car) in &outcome.matching {
            if let Some(cars) = self.preferred.get_mut(pilot) {
                if cars.remove(car) {
                    removed += 1;
                }
            }
        }
        debug!(removed, skipped_fallback = outcome.unmatched.len(), "preferences updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatchingEngine;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_initial_sets_equal_available_cars() {
        let prefs = PreferenceGraph::new(3, &[2, 5, 9]);

        assert_eq!(prefs.pilot_count(), 3);
        for (_, cars) in prefs.iter() {
            assert_eq!(cars.iter().copied().collect::<Vec<_>>(), vec![2, 5, 9]);
        }
        assert!(prefs.cars_for(3).is_none());
    }

    #[test]
    fn test_group_graph_is_a_view() {
        let prefs = PreferenceGraph::new(4, &[1, 2]);
        let graph = prefs.group_graph([1, 3, 8]);

        assert_eq!(graph.pilots().collect::<Vec<_>>(), vec![1, 3, 8]);
        assert!(graph.is_view(1));
        assert!(std::ptr::eq(graph.cars(3).unwrap(), prefs.cars_for(3).unwrap()));
        // Unknown pilot keeps an empty edge set
        assert!(!graph.is_view(8));
        assert!(graph.cars(8).unwrap().is_empty());
    }

    #[test]
    fn test_fallback_pairs_do_not_shrink_sets() {
        let mut prefs = PreferenceGraph::new(2, &[1, 2]);
        let outcome = MatchingOutcome {
            perfect: false,
            matching: [(0, 1)].into_iter().collect(),
            unmatched: [(1, 2)].into_iter().collect(),
        };

        prefs.apply_outcome(&outcome);

        assert_eq!(prefs.cars_for(0).unwrap().len(), 1);
        assert_eq!(prefs.cars_for(1).unwrap().len(), 2);
    }

    #[test]
    fn test_two_races_three_pilots_two_cars() {
        let cars = [1, 2];
        let mut prefs = PreferenceGraph::new(3, &cars);

        // Race 1: pilots 0 and 1 drive
        let race1 = MatchingOutcome {
            perfect: true,
            matching: [(0, 1), (1, 2)].into_iter().collect(),
            unmatched: BTreeMap::new(),
        };
        // Race 2: pilots 0 and 2 drive
        let race2 = MatchingOutcome {
            perfect: true,
            matching: [(0, 2), (2, 1)].into_iter().collect(),
            unmatched: BTreeMap::new(),
        };
        prefs.apply_outcome(&race1);
        prefs.apply_outcome(&race2);

        assert!(prefs.cars_for(0).unwrap().is_empty());
        assert_eq!(prefs.cars_for(1).unwrap().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(prefs.cars_for(2).unwrap().iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_applying_twice_removes_nothing_more() {
        let mut prefs = PreferenceGraph::new(1, &[1, 2, 3]);
        let outcome = MatchingOutcome {
            perfect: false,
            matching: [(0, 2)].into_iter().collect(),
            unmatched: BTreeMap::new(),
        };
        prefs.apply_outcome(&outcome);
        prefs.apply_outcome(&outcome);
        assert_eq!(prefs.cars_for(0).unwrap().len(), 2);
    }

    #[test]
    fn test_full_rotation_before_repeat() {
        let cars: Vec<CarNumber> = (1..=4).collect();
        let mut prefs = PreferenceGraph::new(4, &cars);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..cars.len() {
            let outcome = {
                let graph = prefs.group_graph(0..4);
                MatchingEngine::find_maximum_matching_with_rng(&graph, &cars, true, &mut rng).unwrap()
            };
            assert!(outcome.perfect);
            prefs.apply_outcome(&outcome);
        }

        for (_, remaining) in prefs.iter() {
            assert!(remaining.is_empty());
        }
    }

    proptest! {
        #[test]
        fn prop_sets_shrink_by_edge_backed_assignments(
            pilots in 1u32..6,
            car_count in 1u32..6,
            races in 1usize..8,
            seed in any::<u64>(),
        ) {
            let cars: Vec<CarNumber> = (1..=car_count).collect();
            let mut prefs = PreferenceGraph::new(pilots, &cars);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut received = vec![0usize; pilots as usize];

            for _ in 0..races {
                let before: Vec<usize> = prefs.iter().map(|(_, c)| c.len()).collect();
                let outcome = {
                    let graph = prefs.group_graph(0..pilots);
                    MatchingEngine::find_maximum_matching_with_rng(&graph, &cars, true, &mut rng).unwrap()
                };
                prefs.apply_outcome(&outcome);
                for pilot in outcome.matching.keys() {
                    received[*pilot as usize] += 1;
                }

                for (index, (_, now)) in prefs.iter().enumerate() {
                    prop_assert!(now.len() <= before[index]);
                }
            }

            for (pilot, remaining) in prefs.iter() {
                prop_assert_eq!(remaining.len(), cars.len() - received[pilot as usize]);
            }
        }
    }
}
