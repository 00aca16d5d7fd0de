//! Alternating-layer search for Hopcroft-Karp rounds
//!
//! One [`LayeredSearch`] lives for exactly one round. The BFS phase fills two
//! arenas (pilot entries and car entries) layer by layer; the DFS phase walks
//! back from every free car to a free pilot and commits the path into the
//! [`Matching`]. Vertices used by a committed path, and dead ends, are marked
//! dead in the arena instead of being removed, so indices stay valid while
//! the traversal is in flight.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

use super::graph::{BipartiteGraph, CarNumber, Matching, PilotId};
use crate::error::MatchingError;

#[derive(Debug, Clone)]
struct PilotEntry {
    pilot: PilotId,
    /// U-layer index (k of the V-layer it was reached through, 0 if free).
    depth: usize,
    /// Matched car this pilot was reached through; `None` in layer 0.
    via: Option<usize>,
    alive: bool,
}

#[derive(Debug, Clone)]
struct CarEntry {
    car: CarNumber,
    /// Pilot entries of the previous U-layer with an unmatched edge to this car.
    predecessors: Vec<usize>,
    alive: bool,
}

/// One step of the backward walk: a car and the predecessors left to try.
#[derive(Debug)]
struct Frame {
    car: usize,
    candidates: Vec<usize>,
    cursor: usize,
    chosen: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct LayeredSearch {
    pilots: Vec<PilotEntry>,
    cars: Vec<CarEntry>,
    free_cars: Vec<usize>,
    depth: usize,
}

impl LayeredSearch {
    /// Build alternating layers from the current matching.
    ///
    /// Returns `None` when no free car is reachable from a free pilot, i.e.
    /// the matching is already maximum.
    pub(crate) fn build(graph: &BipartiteGraph<'_>, matching: &Matching) -> Option<Self> {
        let mut pilots = Vec::new();
        let mut current = Vec::new();
        for pilot in graph.pilots().filter(|p| !matching.is_pilot_matched(*p)) {
            current.push(pilots.len());
            pilots.push(PilotEntry { pilot, depth: 0, via: None, alive: true });
        }

        let mut cars: Vec<CarEntry> = Vec::new();
        let mut placed: HashMap<CarNumber, usize> = HashMap::new();
        let mut free_cars = Vec::new();
        let mut depth = 0;

        while !current.is_empty() && free_cars.is_empty() {
            // V-layer 2k+1: unmatched edges out of the current U-layer
            let mut layer: BTreeMap<CarNumber, Vec<usize>> = BTreeMap::new();
            for &entry in &current {
                let pilot = pilots[entry].pilot;
                for &car in graph.cars(pilot).into_iter().flatten() {
                    if placed.contains_key(&car) || matching.pilot_of(car) == Some(pilot) {
                        continue;
                    }
                    layer.entry(car).or_default().push(entry);
                }
            }

            depth += 1;

            // U-layer 2k+2: matched edges reversed
            let mut next = Vec::new();
            for (car, predecessors) in layer {
                let index = cars.len();
                placed.insert(car, index);
                cars.push(CarEntry { car, predecessors, alive: true });

                match matching.pilot_of(car) {
                    Some(owner) => {
                        next.push(pilots.len());
                        pilots.push(PilotEntry { pilot: owner, depth, via: Some(index), alive: true });
                    }
                    None => free_cars.push(index),
                }
            }
            current = next;
        }

        if free_cars.is_empty() {
            None
        } else {
            Some(Self { pilots, cars, free_cars, depth })
        }
    }

    /// Number of V-layers built before free cars were found.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Arena indices of the free cars in the last V-layer.
    pub(crate) fn free_cars(&self) -> &[usize] {
        &self.free_cars
    }

    pub(crate) fn car_number(&self, index: usize) -> CarNumber {
        self.cars[index].car
    }

    pub(crate) fn layer_sizes(&self) -> (usize, usize) {
        (self.pilots.len(), self.cars.len())
    }

    fn open_frame<R: Rng + ?Sized>(&self, car: usize, randomize: bool, rng: &mut R) -> Frame {
        let mut candidates = self.cars[car].predecessors.clone();
        if randomize {
            candidates.shuffle(rng);
        }
        Frame { car, candidates, cursor: 0, chosen: None }
    }

    /// Find one vertex-disjoint augmenting path ending at free car `start`
    /// and commit it into `matching`.
    ///
    /// Returns `Ok(false)` when every route back to layer 0 is already used
    /// by a path committed earlier in this round.
    pub(crate) fn augment<R: Rng + ?Sized>(
        &mut self,
        start: usize,
        matching: &mut Matching,
        randomize: bool,
        rng: &mut R,
    ) -> Result<bool, MatchingError> {
        if self.depth == 0 {
            return Err(MatchingError::invariant(0, "augmenting path search requested at layer 0"));
        }
        if !self.cars[start].alive {
            return Ok(false);
        }

        let mut stack = vec![self.open_frame(start, randomize, rng)];

        while let Some(top) = stack.last_mut() {
            let mut next = None;
            while top.cursor < top.candidates.len() {
                let candidate = top.candidates[top.cursor];
                top.cursor += 1;
                if self.pilots[candidate].alive {
                    next = Some(candidate);
                    break;
                }
            }

            let Some(pilot) = next else {
                // Dead end: nothing behind this car reaches a free pilot
                if let Some(frame) = stack.pop() {
                    self.cars[frame.car].alive = false;
                }
                continue;
            };

            top.chosen = Some(pilot);
            self.pilots[pilot].alive = false;

            let expected = self.depth.checked_sub(stack.len()).ok_or_else(|| {
                MatchingError::invariant(self.depth, "path deeper than the layer count")
            })?;
            let PilotEntry { pilot: id, depth, via, .. } = self.pilots[pilot];
            if depth != expected {
                return Err(MatchingError::invariant(
                    depth,
                    format!("pilot {} found in layer {} instead of {}", id, depth, expected),
                ));
            }

            match via {
                None if depth == 0 => {
                    self.commit(&stack, matching);
                    return Ok(true);
                }
                None => {
                    return Err(MatchingError::invariant(depth, "free pilot outside layer 0"));
                }
                Some(_) if depth == 0 => {
                    return Err(MatchingError::invariant(0, "matched pilot in layer 0"));
                }
                Some(previous) => {
                    if self.cars[previous].alive {
                        let frame = self.open_frame(previous, randomize, rng);
                        stack.push(frame);
                    }
                }
            }
        }

        Ok(false)
    }

    fn commit(&mut self, stack: &[Frame], matching: &mut Matching) {
        for frame in stack {
            if let Some(pilot) = frame.chosen {
                matching.assign(self.pilots[pilot].pilot, self.cars[frame.car].car);
            }
            self.cars[frame.car].alive = false;
        }
    }
}
