use metro_core::{Card, ConnectionRejection, LineConfig, StationId};
use metro_system_geometry::{first_blocked_cell, is_aligned, segments_intersect};

use crate::{network::Network, stations::StationIndex};

/// Decides whether `line` may connect `from` to `to` using `card`.
///
/// Checks run in a fixed order and stop at the first failure. Nothing is
/// mutated.
pub(crate) fn validate_connection(
    stations: &StationIndex,
    network: &Network,
    transfer: StationId,
    line: &LineConfig,
    card: Card,
    from: StationId,
    to: StationId,
) -> Result<(), ConnectionRejection> {
    if from == to {
        return Err(ConnectionRejection::SameStation);
    }
    let origin = stations
        .get(from)
        .ok_or(ConnectionRejection::UnknownStation(from))?;
    let target = stations
        .get(to)
        .ok_or(ConnectionRejection::UnknownStation(to))?;

    for station in [from, to] {
        if station == transfer || station == line.start {
            continue;
        }
        if let Some(owner) = network.owner(station) {
            if owner != line.id {
                return Err(ConnectionRejection::OwnedByOtherLine { station, owner });
            }
        }
    }

    if !is_aligned(origin.position, target.position) {
        return Err(ConnectionRejection::NotAligned);
    }

    let build = network.line(line.id);
    match build {
        Some(build) if !build.segments().is_empty() => {
            if !build.is_endpoint(from) {
                return Err(ConnectionRejection::NotAnEndpoint);
            }
        }
        _ => {
            if from != line.start {
                return Err(ConnectionRejection::NotFromStart);
            }
        }
    }

    if to != transfer && !card.symbol.accepts(target.symbol) {
        return Err(ConnectionRejection::SymbolMismatch);
    }

    if let Some(cell) = first_blocked_cell(origin.position, target.position, |cell| {
        stations.at(cell).is_some()
    }) {
        let blocker = stations.at(cell).map_or(to, |station| station.id);
        return Err(ConnectionRejection::PassesThroughStation(blocker));
    }

    if network.contains_pair(from, to) {
        return Err(ConnectionRejection::DuplicateSegment);
    }

    for (owner, segment) in network.segments() {
        if segment.touches(from) || segment.touches(to) {
            continue;
        }
        let (Some(a), Some(b)) = (stations.get(segment.origin()), stations.get(segment.target()))
        else {
            continue;
        };
        if segments_intersect(origin.position, target.position, a.position, b.position) {
            return Err(ConnectionRejection::CrossesSegment {
                line: owner,
                segment,
            });
        }
    }

    if build.is_some_and(|build| build.has_visited(to)) {
        return Err(ConnectionRejection::AlreadyVisited);
    }

    Ok(())
}
