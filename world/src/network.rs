use std::collections::{BTreeMap, BTreeSet};

use metro_core::{LineId, LineView, Segment, StationId};

/// Build state of a single line.
#[derive(Clone, Debug)]
pub(crate) struct LineBuild {
    segments: Vec<Segment>,
    endpoints: BTreeSet<StationId>,
    visited: BTreeSet<StationId>,
}

impl LineBuild {
    fn seeded(start: StationId) -> Self {
        Self {
            segments: Vec::new(),
            endpoints: BTreeSet::new(),
            visited: BTreeSet::from([start]),
        }
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn is_endpoint(&self, station: StationId) -> bool {
        self.endpoints.contains(&station)
    }

    pub(crate) fn has_visited(&self, station: StationId) -> bool {
        self.visited.contains(&station)
    }

    fn toggle_endpoint(&mut self, station: StationId) {
        if !self.endpoints.remove(&station) {
            let _ = self.endpoints.insert(station);
        }
    }

    fn view(&self, line: LineId) -> LineView {
        LineView {
            line,
            segments: self.segments.clone(),
            endpoints: self.endpoints.iter().copied().collect(),
            visited: self.visited.iter().copied().collect(),
        }
    }
}

/// Every line's build state plus the global station ownership map.
#[derive(Clone, Debug)]
pub(crate) struct Network {
    transfer: StationId,
    lines: BTreeMap<LineId, LineBuild>,
    owners: BTreeMap<StationId, LineId>,
}

impl Network {
    pub(crate) fn new(transfer: StationId) -> Self {
        Self {
            transfer,
            lines: BTreeMap::new(),
            owners: BTreeMap::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
        self.owners.clear();
    }

    /// Creates the line's state on first use; later calls leave it untouched.
    pub(crate) fn ensure_line(&mut self, line: LineId, start: StationId) {
        let _ = self.build_mut(line, start);
    }

    fn build_mut(&mut self, line: LineId, start: StationId) -> &mut LineBuild {
        self.lines
            .entry(line)
            .or_insert_with(|| LineBuild::seeded(start))
    }

    pub(crate) fn line(&self, line: LineId) -> Option<&LineBuild> {
        self.lines.get(&line)
    }

    pub(crate) fn owner(&self, station: StationId) -> Option<LineId> {
        self.owners.get(&station).copied()
    }

    pub(crate) fn owners(&self) -> impl Iterator<Item = (StationId, LineId)> + '_ {
        self.owners.iter().map(|(station, line)| (*station, *line))
    }

    pub(crate) fn segments(&self) -> impl Iterator<Item = (LineId, Segment)> + '_ {
        self.lines.iter().flat_map(|(line, build)| {
            build.segments.iter().map(move |segment| (*line, *segment))
        })
    }

    pub(crate) fn contains_pair(&self, a: StationId, b: StationId) -> bool {
        self.segments().any(|(_, segment)| segment.connects(a, b))
    }

    /// Records a validated segment and claims both stations for the line.
    ///
    /// Claims are first-come except for the transfer station, which is never
    /// owned, and the line's own start, which the line always holds.
    pub(crate) fn add_segment(&mut self, line: LineId, start: StationId, from: StationId, to: StationId) {
        let build = self.build_mut(line, start);
        build.segments.push(Segment::new(from, to));
        for station in [from, to] {
            build.toggle_endpoint(station);
            let _ = build.visited.insert(station);
        }

        for station in [from, to] {
            if station == self.transfer {
                continue;
            }
            if station == start {
                let _ = self.owners.insert(station, line);
            } else {
                let _ = self.owners.entry(station).or_insert(line);
            }
        }
    }

    pub(crate) fn view(&self, line: LineId) -> Option<LineView> {
        self.lines.get(&line).map(|build| build.view(line))
    }

    pub(crate) fn views(&self) -> Vec<LineView> {
        self.lines
            .iter()
            .map(|(line, build)| build.view(*line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u32) -> StationId {
        StationId::new(value)
    }

    const RED: LineId = LineId::new(1);
    const BLUE: LineId = LineId::new(2);

    #[test]
    fn ensure_line_seeds_visited_with_start_once() {
        let mut network = Network::new(id(50));
        network.ensure_line(RED, id(1));
        assert_eq!(
            network.view(RED).map(|view| view.visited),
            Some(vec![id(1)])
        );
        network.add_segment(RED, id(1), id(1), id(2));
        network.ensure_line(RED, id(1));

        let view = network.view(RED).expect("line exists");
        assert_eq!(view.visited, vec![id(1), id(2)]);
        assert_eq!(view.segments.len(), 1);
    }

    #[test]
    fn endpoints_toggle_with_each_incident_segment() {
        let mut network = Network::new(id(50));
        network.add_segment(RED, id(1), id(1), id(2));
        network.add_segment(RED, id(1), id(2), id(3));
        network.add_segment(RED, id(1), id(1), id(4));

        let view = network.view(RED).expect("line exists");
        assert_eq!(view.endpoints, vec![id(3), id(4)]);
        assert_eq!(view.visited, vec![id(1), id(2), id(3), id(4)]);
    }

    #[test]
    fn first_claim_wins_except_for_start_and_transfer() {
        let mut network = Network::new(id(50));
        network.add_segment(RED, id(1), id(1), id(7));
        network.add_segment(BLUE, id(9), id(9), id(7));
        network.add_segment(BLUE, id(9), id(9), id(50));
        network.add_segment(RED, id(1), id(7), id(9));

        assert_eq!(network.owner(id(7)), Some(RED));
        assert_eq!(network.owner(id(50)), None);
        assert_eq!(
            network.owner(id(9)),
            Some(BLUE),
            "a line keeps its own start even after another line touches it",
        );
    }

    #[test]
    fn pair_lookup_ignores_direction_and_line() {
        let mut network = Network::new(id(50));
        network.add_segment(RED, id(1), id(1), id(2));

        assert!(network.contains_pair(id(2), id(1)));
        assert!(!network.contains_pair(id(1), id(3)));
    }

    #[test]
    fn clear_discards_lines_and_owners() {
        let mut network = Network::new(id(50));
        network.add_segment(RED, id(1), id(1), id(2));
        network.clear();

        assert!(network.views().is_empty());
        assert_eq!(network.owners().count(), 0);
    }
}
