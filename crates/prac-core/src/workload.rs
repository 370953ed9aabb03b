//! Row selection policies.
//!
//! The workload decides which row the next ACTIVATE opens. The set of
//! policies is closed: round-robin, feinting and mixed. In feinting and mixed
//! mode a row is retired once any RFM touches it, so these policies only ever
//! pick rows that are still active.

use crate::rows::RowTable;
use crate::util::{BANK_ROWS, Rng};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Workload policy used by the row selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workload {
    /// Cycle through all rows, never retiring any.
    #[default]
    RoundRobin,
    /// Cycle through the rows that no RFM has touched yet.
    Feinting,
    /// With probability `pct`% behave like feinting, otherwise access a
    /// random row of the whole bank.
    Mixed {
        /// Share of feinting accesses in percent (0..=100)
        pct: u8,
    },
}

/// Outcome of one row selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// ACTIVATE this tracked row.
    Row(usize),
    /// ACTIVATE a row outside the tracked set. It consumes tRC and counts
    /// toward tFAW but never touches a counter.
    Untracked,
    /// No active row is left.
    Exhausted,
}

impl Workload {
    /// Whether RFMs retire the rows they target under this workload.
    pub fn retires_rows(&self) -> bool {
        !matches!(self, Workload::RoundRobin)
    }

    /// Picks the row for the next ACTIVATE.
    ///
    /// `cursor` is the round-robin position. Feinting moves it onto the row it
    /// picks, the caller advances it after the ACTIVATE.
    pub(crate) fn select(&self, rows: &RowTable, cursor: &mut usize, rng: &mut Rng) -> Selection {
        match *self {
            Workload::RoundRobin => round_robin(*cursor),
            Workload::Feinting => feinting(rows, cursor),
            Workload::Mixed { pct } => mixed(pct, rows, cursor, rng),
        }
    }
}

fn round_robin(cursor: usize) -> Selection {
    Selection::Row(cursor)
}

fn feinting(rows: &RowTable, cursor: &mut usize) -> Selection {
    let n = rows.len();
    match (0..n).map(|i| (*cursor + i) % n).find(|&r| rows.is_active(r)) {
        Some(row) => {
            *cursor = row;
            Selection::Row(row)
        }
        None => Selection::Exhausted,
    }
}

fn mixed(pct: u8, rows: &RowTable, cursor: &mut usize, rng: &mut Rng) -> Selection {
    if rng.percent() <= pct {
        return feinting(rows, cursor);
    }
    let row = rng.index_below(BANK_ROWS);
    if row < rows.len() && rows.is_active(row) {
        Selection::Row(row)
    } else {
        Selection::Untracked
    }
}

/// Errors when parsing a workload name.
#[derive(Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum WorkloadParseError {
    #[error("Unknown workload '{0}', expected round-robin, feinting or mixed:<pct>")]
    Unknown(String),
    #[error("Invalid mixed percentage '{0}', expected an integer in 0..=100")]
    InvalidPercentage(String),
}

impl FromStr for Workload {
    type Err = WorkloadParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "round-robin" | "roundrobin" | "rr" => return Ok(Workload::RoundRobin),
            "feinting" => return Ok(Workload::Feinting),
            _ => {}
        }
        let Some(pct) = s.strip_prefix("mixed:") else {
            return Err(WorkloadParseError::Unknown(s));
        };
        match pct.trim().parse::<u8>() {
            Ok(pct) if pct <= 100 => Ok(Workload::Mixed { pct }),
            _ => Err(WorkloadParseError::InvalidPercentage(pct.to_string())),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workload::RoundRobin => write!(f, "round-robin"),
            Workload::Feinting => write!(f, "feinting"),
            Workload::Mixed { pct } => write!(f, "mixed:{pct}"),
        }
    }
}

impl Serialize for Workload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_follows_cursor() {
        let rows = RowTable::new(4);
        let mut rng = Rng::from_seed(0);
        let mut cursor = 2;
        assert_eq!(
            Workload::RoundRobin.select(&rows, &mut cursor, &mut rng),
            Selection::Row(2)
        );
        assert_eq!(cursor, 2);
    }

    #[test]
    fn feinting_skips_retired_rows() {
        let mut rows = RowTable::new(4);
        rows.retire(1);
        rows.retire(2);
        let mut rng = Rng::from_seed(0);
        let mut cursor = 1;
        assert_eq!(
            Workload::Feinting.select(&rows, &mut cursor, &mut rng),
            Selection::Row(3)
        );
        assert_eq!(cursor, 3);

        let mut cursor = 3;
        rows.retire(3);
        assert_eq!(
            Workload::Feinting.select(&rows, &mut cursor, &mut rng),
            Selection::Row(0)
        );
        rows.retire(0);
        assert_eq!(
            Workload::Feinting.select(&rows, &mut cursor, &mut rng),
            Selection::Exhausted
        );
    }

    #[test]
    fn mixed_full_percentage_is_feinting() {
        let rows = RowTable::new(3);
        let mut rng = Rng::from_seed(9);
        let mut cursor = 0;
        for expected in [0, 1, 2, 0, 1] {
            let sel = Workload::Mixed { pct: 100 }.select(&rows, &mut cursor, &mut rng);
            assert_eq!(sel, Selection::Row(expected));
            cursor = (cursor + 1) % rows.len();
        }
    }

    #[test]
    fn mixed_zero_percentage_is_mostly_untracked() {
        let rows = RowTable::new(2);
        let mut rng = Rng::from_seed(3);
        let mut cursor = 0;
        let untracked = (0..1000)
            .filter(|_| {
                Workload::Mixed { pct: 0 }.select(&rows, &mut cursor, &mut rng)
                    == Selection::Untracked
            })
            .count();
        // 2 of 131072 rows are tracked
        assert!(untracked >= 990, "untracked = {untracked}");
        assert_eq!(cursor, 0);
    }

    #[test]
    fn parses_and_displays() {
        for w in [
            Workload::RoundRobin,
            Workload::Feinting,
            Workload::Mixed { pct: 0 },
            Workload::Mixed { pct: 35 },
            Workload::Mixed { pct: 100 },
        ] {
            assert_eq!(w.to_string().parse::<Workload>(), Ok(w));
        }
        assert_eq!("RR".parse::<Workload>(), Ok(Workload::RoundRobin));
        assert!(matches!(
            "mixed:101".parse::<Workload>(),
            Err(WorkloadParseError::InvalidPercentage(_))
        ));
        assert!(matches!(
            "mixed".parse::<Workload>(),
            Err(WorkloadParseError::Unknown(_))
        ));
        assert!(!Workload::RoundRobin.retires_rows());
        assert!(Workload::Feinting.retires_rows());
    }
}
