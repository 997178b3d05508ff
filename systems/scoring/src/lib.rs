#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scoring system for finished rounds and finished games.
//!
//! Every function takes read-only [`LineView`] snapshots together with a
//! station lookup closure mirroring the world's `query::station` helper, so
//! the formulas can be exercised without constructing a world.

use std::collections::{BTreeMap, BTreeSet};

use metro_core::{GameSummary, JunctionCounts, LineId, LineView, RoundResult, Station, StationId};

/// Scores the round in which `line` was built.
///
/// `PK` counts distinct districts among visited stations, `PM` is the size of
/// the largest district group, and `PD` counts segments whose endpoints sit on
/// different, known river banks. Stations without a district are ignored by
/// `PK` and `PM`.
pub fn score_round<'a, F>(line: &LineView, mut station: F) -> RoundResult
where
    F: FnMut(StationId) -> Option<&'a Station>,
{
    let mut districts: BTreeMap<_, u32> = BTreeMap::new();
    for id in &line.visited {
        if let Some(district) = station(*id).and_then(|record| record.district) {
            *districts.entry(district).or_default() += 1;
        }
    }

    let district_count = count(districts.len());
    let max_in_district = districts.values().copied().max().unwrap_or(0);

    let river_crossings = count(
        line.segments
            .iter()
            .filter(|segment| {
                let origin = station(segment.origin()).and_then(|record| record.river_bank);
                let target = station(segment.target()).and_then(|record| record.river_bank);
                matches!((origin, target), (Some(a), Some(b)) if a != b)
            })
            .count(),
    );

    RoundResult {
        line: line.line,
        districts: district_count,
        max_in_district,
        river_crossings,
        points: district_count * max_in_district + river_crossings,
    }
}

/// Buckets stations by how many distinct lines visit them.
#[must_use]
pub fn junction_counts(lines: &[LineView]) -> JunctionCounts {
    let mut visits: BTreeMap<StationId, BTreeSet<LineId>> = BTreeMap::new();
    for line in lines {
        for station in &line.visited {
            let _ = visits.entry(*station).or_default().insert(line.line);
        }
    }

    let mut counts = JunctionCounts::default();
    for owners in visits.values() {
        match owners.len() {
            0 | 1 => {}
            2 => counts.double += 1,
            3 => counts.triple += 1,
            _ => counts.quadruple += 1,
        }
    }
    counts
}

/// Counts distinct train hubs visited by any line (`PP`).
pub fn train_hubs_visited<'a, F>(lines: &[LineView], mut station: F) -> u32
where
    F: FnMut(StationId) -> Option<&'a Station>,
{
    let visited: BTreeSet<StationId> = lines
        .iter()
        .flat_map(|line| line.visited.iter().copied())
        .collect();
    count(
        visited
            .into_iter()
            .filter(|id| station(*id).is_some_and(|record| record.train_hub))
            .count(),
    )
}

/// Produces the end-of-game breakdown.
///
/// `FinalScore = Σ FP + PP + 2·P2 + 5·P3 + 9·P4`.
pub fn score_game<'a, F>(rounds: &[RoundResult], lines: &[LineView], station: F) -> GameSummary
where
    F: FnMut(StationId) -> Option<&'a Station>,
{
    let train_hubs = train_hubs_visited(lines, station);
    let junctions = junction_counts(lines);
    let round_points: u32 = rounds.iter().map(|round| round.points).sum();

    GameSummary {
        rounds: rounds.to_vec(),
        train_hubs,
        junctions,
        total: round_points + train_hubs + junctions.points(),
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
