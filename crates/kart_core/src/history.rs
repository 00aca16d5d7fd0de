//! Race history ledger
//!
//! Append-only list of recorded races in chronological order. Only the most
//! recent race can be removed (undo).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::matching::{MatchingOutcome, PilotId};

/// One recorded race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    /// Starts at 1.
    pub group_number: u32,
    /// Starts at 1, counted within `group_number`.
    pub race_number: u32,
    pub outcome: MatchingOutcome,
}

impl RaceRecord {
    pub fn pilot_count(&self) -> usize {
        self.outcome.pilot_count()
    }

    pub fn contains_pilot(&self, pilot: PilotId) -> bool {
        self.outcome.contains_pilot(pilot)
    }

    pub fn summary(&self) -> RaceSummary {
        RaceSummary { group_number: self.group_number, race_number: self.race_number }
    }
}

/// Group and race number of a record, as shown in a history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub group_number: u32,
    pub race_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceHistory {
    records: Vec<RaceRecord>,
}

impl RaceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1 + number of races already recorded for `group_number`.
    pub fn next_race_number(&self, group_number: u32) -> u32 {
        let recorded = self.records.iter().filter(|r| r.group_number == group_number).count();
        recorded as u32 + 1
    }

    /// Append a race. `race_number` must be the group's next race number.
    pub fn append(
        &mut self,
        group_number: u32,
        race_number: u32,
        outcome: MatchingOutcome,
    ) -> Result<&RaceRecord> {
        if group_number == 0 {
            return Err(SessionError::InvalidGroup { group: 0, group_count: 0 });
        }
        let expected = self.next_race_number(group_number);
        if race_number != expected {
            return Err(SessionError::RaceNumberMismatch {
                group: group_number,
                expected,
                found: race_number,
            });
        }

        self.records.push(RaceRecord { group_number, race_number, outcome });
        self.records.last().ok_or(SessionError::EmptyHistory)
    }

    /// Remove the most recent race.
    pub fn delete_last(&mut self) -> Result<RaceRecord> {
        self.records.pop().ok_or(SessionError::EmptyHistory)
    }

    /// Group and race numbers in append order.
    pub fn list(&self) -> Vec<RaceSummary> {
        self.records.iter().map(RaceRecord::summary).collect()
    }

    pub fn records(&self) -> &[RaceRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&RaceRecord> {
        self.records.get(index)
    }

    pub fn last(&self) -> Option<&RaceRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
