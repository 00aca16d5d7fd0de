//! Hopcroft-Karp maximum matching with optional randomization
//!
//! Each round builds alternating layers from the free pilots, then commits
//! one vertex-disjoint shortest augmenting path per free car found in the
//! last layer. Rounds stop when no free car is reachable. With `randomize`
//! set, the free cars and every predecessor list are visited in shuffled
//! order, so the returned maximum matching varies from call to call.
//!
//! Pilots left without a graph edge are then given a leftover car
//! (fallback pairing) so that every pilot drives something.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace, warn};

use super::graph::{BipartiteGraph, CarNumber, Matching, MatchingOutcome, PilotId};
use super::layers::LayeredSearch;
use crate::error::MatchingError;

pub struct MatchingEngine;

impl MatchingEngine {
    /// Maximum matching of `graph`, drawing randomness from the thread RNG.
    ///
    /// `all_cars` is the full car list of the session; cars missing from
    /// every edge set still take part in fallback pairing.
    pub fn find_maximum_matching(
        graph: &BipartiteGraph<'_>,
        all_cars: &[CarNumber],
        randomize: bool,
    ) -> Result<MatchingOutcome, MatchingError> {
        let mut rng = rand::thread_rng();
        Self::find_maximum_matching_with_rng(graph, all_cars, randomize, &mut rng)
    }

    /// Same as [`find_maximum_matching`](Self::find_maximum_matching) with a
    /// caller-owned random source. With a seeded RNG the outcome is
    /// reproducible.
    pub fn find_maximum_matching_with_rng<R: Rng + ?Sized>(
        graph: &BipartiteGraph<'_>,
        all_cars: &[CarNumber],
        randomize: bool,
        rng: &mut R,
    ) -> Result<MatchingOutcome, MatchingError> {
        let mut matching = Matching::new();
        let mut round = 0usize;

        while let Some(mut search) = LayeredSearch::build(graph, &matching) {
            round += 1;

            let mut frontier = search.free_cars().to_vec();
            if randomize {
                frontier.shuffle(rng);
            }

            let mut committed = 0usize;
            for car in frontier {
                if search.augment(car, &mut matching, randomize, rng)? {
                    trace!(round, car = search.car_number(car), "augmenting path committed");
                    committed += 1;
                }
            }

            let (pilot_entries, car_entries) = search.layer_sizes();
            debug!(
                round,
                layers = search.depth(),
                pilot_entries,
                car_entries,
                free_cars = search.free_cars().len(),
                committed,
                "augmenting round"
            );

            // The first free car of a fresh round always has a path back to
            // layer 0; a round without progress would loop forever.
            if committed == 0 {
                return Err(MatchingError::invariant(
                    search.depth(),
                    "round found free cars but committed no augmenting path",
                ));
            }
        }

        let cars = distinct_cars(all_cars);
        let matched = matching.len();
        let perfect = graph.pilot_count() == cars.len() && graph.pilot_count() == matched;
        let matching = matching.into_pairs();

        let unmatched = if perfect {
            BTreeMap::new()
        } else {
            fallback_pairing(graph, &matching, &cars, randomize, rng)
        };

        debug!(
            rounds = round,
            pilots = graph.pilot_count(),
            cars = cars.len(),
            matched,
            fallback = unmatched.len(),
            perfect,
            "maximum matching computed"
        );

        Ok(MatchingOutcome { perfect, matching, unmatched })
    }
}

/// Pair every pilot missing from `matching` with a car nobody got.
///
/// Pilots are served in graph-key order. When leftover cars run out the
/// remaining pilots get no fallback entry; deciding whether that is
/// acceptable is up to the caller.
pub fn fallback_pairing<R: Rng + ?Sized>(
    graph: &BipartiteGraph<'_>,
    matching: &BTreeMap<PilotId, CarNumber>,
    all_cars: &[CarNumber],
    randomize: bool,
    rng: &mut R,
) -> BTreeMap<PilotId, CarNumber> {
    let taken: HashSet<CarNumber> = matching.values().copied().collect();
    let mut leftovers: Vec<CarNumber> =
        distinct_cars(all_cars).into_iter().filter(|car| !taken.contains(car)).collect();
    if randomize {
        leftovers.shuffle(rng);
    }

    let mut leftovers = leftovers.into_iter();
    let mut pairs = BTreeMap::new();
    for pilot in graph.pilots().filter(|p| !matching.contains_key(p)) {
        match leftovers.next() {
            Some(car) => {
                trace!(pilot, car, "fallback pair");
                pairs.insert(pilot, car);
            }
            None => {
                warn!(pilot, "no leftover car for fallback pairing");
                break;
            }
        }
    }
    pairs
}

/// Car list without repeats, first occurrence kept.
fn distinct_cars(all_cars: &[CarNumber]) -> Vec<CarNumber> {
    let mut seen = HashSet::with_capacity(all_cars.len());
    all_cars.iter().copied().filter(|car| seen.insert(*car)).collect()
}
