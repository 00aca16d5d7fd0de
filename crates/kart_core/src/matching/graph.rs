//! Bipartite graph and matching outcome types
//!
//! U-vertices are pilots, V-vertices are cars. A graph maps every pilot that
//! needs a car to the cars it may receive; pilots with no candidate car stay
//! in the graph with an empty edge set so they still get a fallback car.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// U-vertex key (pilot index within the session).
pub type PilotId = u32;

/// V-vertex key (car number as painted on the kart).
pub type CarNumber = u32;

/// Candidate cars for one pilot.
pub type CarSet = BTreeSet<CarNumber>;

/// Pilot-to-cars adjacency, iterated in ascending pilot order.
///
/// Edge sets are either borrowed from a [`PreferenceGraph`](crate::PreferenceGraph)
/// (a group view) or owned (graphs built directly by callers and tests).
/// The engine only ever reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BipartiteGraph<'a> {
    adjacency: BTreeMap<PilotId, Cow<'a, CarSet>>,
}

impl BipartiteGraph<'static> {
    /// Build an owned graph from `(pilot, cars)` pairs.
    ///
    /// A pilot listed twice keeps the union of its edges.
    pub fn from_edges<I, C>(edges: I) -> Self
    where
        I: IntoIterator<Item = (PilotId, C)>,
        C: IntoIterator<Item = CarNumber>,
    {
        let mut graph = BipartiteGraph::new();
        for (pilot, cars) in edges {
            graph
                .adjacency
                .entry(pilot)
                .or_insert_with(|| Cow::Owned(CarSet::new()))
                .to_mut()
                .extend(cars);
        }
        graph
    }
}

impl<'a> BipartiteGraph<'a> {
    pub fn new() -> Self {
        Self { adjacency: BTreeMap::new() }
    }

    /// Add a pilot whose candidate cars are borrowed from elsewhere.
    pub fn insert_view(&mut self, pilot: PilotId, cars: &'a CarSet) {
        self.adjacency.insert(pilot, Cow::Borrowed(cars));
    }

    /// Add a pilot with no candidate car.
    pub fn insert_isolated(&mut self, pilot: PilotId) {
        self.adjacency.insert(pilot, Cow::Owned(CarSet::new()));
    }

    pub fn pilot_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|cars| cars.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains_pilot(&self, pilot: PilotId) -> bool {
        self.adjacency.contains_key(&pilot)
    }

    /// Candidate cars for `pilot`; `None` if the pilot is not in the graph.
    pub fn cars(&self, pilot: PilotId) -> Option<&CarSet> {
        self.adjacency.get(&pilot).map(|cars| cars.as_ref())
    }

    pub fn has_edge(&self, pilot: PilotId, car: CarNumber) -> bool {
        self.cars(pilot).is_some_and(|cars| cars.contains(&car))
    }

    /// Pilots in graph-key order.
    pub fn pilots(&self) -> impl Iterator<Item = PilotId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PilotId, &CarSet)> + '_ {
        self.adjacency.iter().map(|(pilot, cars)| (*pilot, cars.as_ref()))
    }

    /// True when the candidate set of `pilot` is borrowed rather than owned.
    pub fn is_view(&self, pilot: PilotId) -> bool {
        matches!(self.adjacency.get(&pilot), Some(Cow::Borrowed(_)))
    }
}

/// Working matching, kept consistent in both directions.
#[derive(Debug, Clone, Default)]
pub(crate) struct Matching {
    car_to_pilot: HashMap<CarNumber, PilotId>,
    pilot_to_car: HashMap<PilotId, CarNumber>,
}

impl Matching {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pilot_of(&self, car: CarNumber) -> Option<PilotId> {
        self.car_to_pilot.get(&car).copied()
    }

    pub(crate) fn is_pilot_matched(&self, pilot: PilotId) -> bool {
        self.pilot_to_car.contains_key(&pilot)
    }

    /// Edge `pilot -> car` replaces whatever edge `car` had.
    ///
    /// Along an augmenting path every pilot's previous car is reassigned by
    /// another hop of the same path, so both maps stay functional once the
    /// whole path is committed.
    pub(crate) fn assign(&mut self, pilot: PilotId, car: CarNumber) {
        self.car_to_pilot.insert(car, pilot);
        self.pilot_to_car.insert(pilot, car);
    }

    pub(crate) fn len(&self) -> usize {
        self.car_to_pilot.len()
    }

    pub(crate) fn into_pairs(self) -> BTreeMap<PilotId, CarNumber> {
        self.car_to_pilot.into_iter().map(|(car, pilot)| (pilot, car)).collect()
    }
}

/// Car given to one pilot in a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarAssignment {
    pub pilot: PilotId,
    pub car: CarNumber,
    /// True for a fallback pair: the pilot had no unused car left and
    /// repeats one.
    pub forced: bool,
}

/// Result of one matching computation.
///
/// `matching` holds edge-backed pairs, `unmatched` the fallback pairs that
/// are not graph edges. A pilot appears in at most one of the two maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingOutcome {
    pub perfect: bool,
    pub matching: BTreeMap<PilotId, CarNumber>,
    pub unmatched: BTreeMap<PilotId, CarNumber>,
}

impl MatchingOutcome {
    pub fn car_for(&self, pilot: PilotId) -> Option<CarAssignment> {
        if let Some(&car) = self.matching.get(&pilot) {
            Some(CarAssignment { pilot, car, forced: false })
        } else {
            self.unmatched.get(&pilot).map(|&car| CarAssignment { pilot, car, forced: true })
        }
    }

    /// Number of pilots that received a car.
    pub fn pilot_count(&self) -> usize {
        self.matching.len() + self.unmatched.len()
    }

    pub fn contains_pilot(&self, pilot: PilotId) -> bool {
        self.matching.contains_key(&pilot) || self.unmatched.contains_key(&pilot)
    }

    pub fn is_forced(&self, pilot: PilotId) -> bool {
        self.unmatched.contains_key(&pilot)
    }

    /// Every pair, in pilot order.
    pub fn assignments(&self) -> Vec<CarAssignment> {
        let mut all: Vec<CarAssignment> = self
            .matching
            .iter()
            .map(|(&pilot, &car)| CarAssignment { pilot, car, forced: false })
            .chain(self.unmatched.iter().map(|(&pilot, &car)| CarAssignment { pilot, car, forced: true }))
            .collect();
        all.sort_by_key(|a| a.pilot);
        all
    }
}
