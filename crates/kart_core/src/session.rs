//! Championship session
//!
//! Holds everything that lives between two validations of the roster: the
//! car selection, the pilot-to-group split, the preference graph and the
//! race history. The UI layer drives a session through these calls and
//! reads results back; it never touches the preference graph directly.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::history::{RaceHistory, RaceRecord, RaceSummary};
use crate::matching::{CarNumber, MatchingEngine, MatchingOutcome, PilotId};
use crate::preferences::PreferenceGraph;

#[derive(Debug, Clone)]
pub struct ChampionshipSession {
    config: SessionConfig,
    rng: ChaCha8Rng,
    pilot_count: u32,
    /// Selected car numbers, ascending
    cars: Vec<CarNumber>,
    group_count: u32,
    /// Group of each pilot, indexed by pilot id
    pilot_groups: Vec<u32>,
    preferences: PreferenceGraph,
    history: RaceHistory,
}

impl Default for ChampionshipSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ChampionshipSession {
    pub fn new(config: SessionConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pilot_count: 0,
            cars: Vec::new(),
            group_count: 1,
            pilot_groups: Vec::new(),
            preferences: PreferenceGraph::default(),
            history: RaceHistory::new(),
        }
    }

    /// Start a new session with `pilot_count` pilots and the given cars.
    ///
    /// Every pilot may take any car again, all pilots go back to group 1
    /// and the history is cleared.
    pub fn reset_session(&mut self, pilot_count: u32, cars: &[CarNumber]) -> Result<()> {
        let mut selected = cars.to_vec();
        selected.sort_unstable();
        selected.dedup();
        if selected.is_empty() {
            return Err(SessionError::NoCarsSelected);
        }

        self.pilot_count = pilot_count;
        self.cars = selected;
        self.group_count = 1;
        self.pilot_groups = vec![1; pilot_count as usize];
        self.preferences.reset(pilot_count, &self.cars);
        self.history.clear();

        info!(pilot_count, car_count = self.cars.len(), "session reset");
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pilot_count(&self) -> u32 {
        self.pilot_count
    }

    pub fn cars(&self) -> &[CarNumber] {
        &self.cars
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn preferences(&self) -> &PreferenceGraph {
        &self.preferences
    }

    pub fn history(&self) -> &RaceHistory {
        &self.history
    }

    pub fn race(&self, index: usize) -> Option<&RaceRecord> {
        self.history.get(index)
    }

    // ========================
    // Groups
    // ========================

    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Change the number of groups. Pilots of a removed group move to the
    /// last remaining one.
    ///
    /// A new grouping starts the championship over: every pilot may take
    /// any car again and the history is cleared.
    pub fn set_group_count(&mut self, group_count: u32) -> Result<()> {
        if group_count == 0 {
            return Err(SessionError::InvalidGroup { group: 0, group_count: self.group_count });
        }
        self.group_count = group_count;
        for group in &mut self.pilot_groups {
            if *group > group_count {
                *group = group_count;
            }
        }
        self.preferences.reset(self.pilot_count, &self.cars);
        self.history.clear();

        info!(group_count, "groups changed, preferences and history reset");
        Ok(())
    }

    pub fn assign_pilot_to_group(&mut self, pilot: PilotId, group: u32) -> Result<()> {
        self.check_group(group)?;
        let pilot_count = self.pilot_count;
        let slot = self
            .pilot_groups
            .get_mut(pilot as usize)
            .ok_or(SessionError::UnknownPilot { pilot, pilot_count })?;
        *slot = group;
        Ok(())
    }

    pub fn group_of(&self, pilot: PilotId) -> Option<u32> {
        self.pilot_groups.get(pilot as usize).copied()
    }

    pub fn pilots_in_group(&self, group: u32) -> Vec<PilotId> {
        self.pilot_groups
            .iter()
            .enumerate()
            .filter(|(_, g)| **g == group)
            .map(|(pilot, _)| pilot as PilotId)
            .collect()
    }

    pub fn group_size(&self, group: u32) -> usize {
        self.pilot_groups.iter().filter(|g| **g == group).count()
    }

    /// A group fits when every pilot can get a distinct car.
    pub fn is_group_size_ok(&self, group: u32) -> bool {
        self.group_size(group) <= self.cars.len()
    }

    pub fn all_group_sizes_ok(&self) -> bool {
        (1..=self.group_count).all(|group| self.is_group_size_ok(group))
    }

    fn check_group(&self, group: u32) -> Result<()> {
        if group == 0 || group > self.group_count {
            return Err(SessionError::InvalidGroup { group, group_count: self.group_count });
        }
        Ok(())
    }

    // ========================
    // Races
    // ========================

    pub fn next_race_number(&self, group: u32) -> u32 {
        self.history.next_race_number(group)
    }

    /// Compute a car for every pilot of `group`.
    ///
    /// Nothing is recorded: the caller may show the result, regenerate it,
    /// and only then pass it to [`record_race`](Self::record_race).
    pub fn generate_race(&mut self, group: u32) -> Result<MatchingOutcome> {
        self.check_group(group)?;
        if self.cars.is_empty() {
            return Err(SessionError::NoCarsSelected);
        }
        if self.config.enforce_group_size {
            if let Some(oversized) = (1..=self.group_count).find(|g| !self.is_group_size_ok(*g)) {
                return Err(SessionError::GroupTooLarge {
                    group: oversized,
                    size: self.group_size(oversized),
                    cars: self.cars.len(),
                });
            }
        }

        let pilots = self.pilots_in_group(group);
        let graph = self.preferences.group_graph(pilots);
        let outcome = MatchingEngine::find_maximum_matching_with_rng(
            &graph,
            &self.cars,
            self.config.randomize,
            &mut self.rng,
        )?;

        if !outcome.unmatched.is_empty() {
            info!(group, forced = outcome.unmatched.len(), "race needs repeated cars");
        }
        Ok(outcome)
    }

    /// Append `outcome` as the next race of `group` and strike the cars it
    /// handed out from the pilots' preferences.
    pub fn record_race(&mut self, group: u32, outcome: MatchingOutcome) -> Result<RaceSummary> {
        self.check_group(group)?;
        let stray = outcome
            .assignments()
            .into_iter()
            .find(|assignment| self.group_of(assignment.pilot) != Some(group));
        if let Some(stray) = stray {
            return Err(SessionError::PilotNotInGroup { pilot: stray.pilot, group });
        }
        let race_number = self.history.next_race_number(group);
        let record = self.history.append(group, race_number, outcome)?;
        self.preferences.apply_outcome(&record.outcome);

        info!(group, race_number, pilots = record.pilot_count(), "race recorded");
        Ok(record.summary())
    }

    /// Undo the most recent race.
    ///
    /// The preference graph keeps the cars that race removed; only a session
    /// reset restores them.
    pub fn delete_last_race(&mut self) -> Result<RaceRecord> {
        let record = self.history.delete_last()?;
        warn!(
            group = record.group_number,
            race_number = record.race_number,
            "last race deleted; preferences are not rewound"
        );
        Ok(record)
    }
}
