use std::collections::{BTreeMap, HashMap};

use metro_core::{GridCoord, Station, StationId};

use crate::WorldError;

/// Read-only lookup of stations by identifier and by grid position.
#[derive(Clone, Debug)]
pub(crate) struct StationIndex {
    by_id: BTreeMap<StationId, Station>,
    by_position: HashMap<GridCoord, StationId>,
}

impl StationIndex {
    /// Builds the index, refusing duplicate ids, shared cells, or off-board stations.
    pub(crate) fn new(stations: Vec<Station>) -> Result<Self, WorldError> {
        let mut by_id = BTreeMap::new();
        let mut by_position = HashMap::with_capacity(stations.len());

        for station in stations {
            if !station.position.on_board() {
                return Err(WorldError::OffBoard {
                    station: station.id,
                    x: station.position.x(),
                    y: station.position.y(),
                });
            }
            if let Some(existing) = by_position.insert(station.position, station.id) {
                return Err(WorldError::SharedPosition {
                    first: existing,
                    second: station.id,
                });
            }
            let id = station.id;
            if by_id.insert(id, station).is_some() {
                return Err(WorldError::DuplicateStation(id));
            }
        }

        if by_id.is_empty() {
            return Err(WorldError::NoStations);
        }

        Ok(Self { by_id, by_position })
    }

    /// Station with the provided identifier.
    #[must_use]
    pub(crate) fn get(&self, id: StationId) -> Option<&Station> {
        self.by_id.get(&id)
    }

    /// Station occupying the provided cell.
    #[must_use]
    pub(crate) fn at(&self, position: GridCoord) -> Option<&Station> {
        self.by_position
            .get(&position)
            .and_then(|id| self.by_id.get(id))
    }

    /// Reports whether a station with the identifier exists.
    #[must_use]
    pub(crate) fn contains(&self, id: StationId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Stations in ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Station> {
        self.by_id.values()
    }
}
