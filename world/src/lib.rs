#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for the metro line builder.
//!
//! A [`World`] owns one game session: the station index, every line's build
//! state, the ownership map, the round and deck counters, and the score
//! history. All mutation goes through [`apply`]; reads go through [`query`].

mod network;
mod round;
mod stations;
mod validation;

use std::collections::BTreeSet;

use metro_core::{
    Command, ConnectionRejection, Event, GameSummary, LineConfig, LineId, LineView, RoundResult,
    RuleConfig, Segment, Station, StationId, LINE_COUNT,
};
use metro_system_scoring::{score_game, score_round};
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    network::Network,
    round::{derive_stream_seed, line_order_rng, Deck, RoundState, RNG_STREAM_DECK},
    stations::StationIndex,
};

/// Reasons a world cannot be built from the supplied stations and rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The dataset contained no stations.
    #[error("station dataset is empty")]
    NoStations,
    /// Two records share an identifier.
    #[error("station id {0} appears more than once")]
    DuplicateStation(StationId),
    /// Two stations occupy the same cell.
    #[error("stations {first} and {second} share a grid cell")]
    SharedPosition {
        /// Station indexed first.
        first: StationId,
        /// Station that collided with it.
        second: StationId,
    },
    /// A station lies outside the board.
    #[error("station {station} at ({x}, {y}) lies outside the board")]
    OffBoard {
        /// Offending station.
        station: StationId,
        /// Column of the station.
        x: u32,
        /// Row of the station.
        y: u32,
    },
    /// The rules do not describe exactly four lines.
    #[error("expected {expected} lines, found {found}")]
    LineCount {
        /// Lines a game requires.
        expected: usize,
        /// Lines present in the rules.
        found: usize,
    },
    /// Two lines share an identifier.
    #[error("line id {0} appears more than once")]
    DuplicateLine(LineId),
    /// A line starts at a station missing from the dataset.
    #[error("line {line} starts at unknown station {station}")]
    UnknownStart {
        /// Line with the bad start.
        line: LineId,
        /// Missing station.
        station: StationId,
    },
    /// Two lines share a start station.
    #[error("station {0} is the start of more than one line")]
    SharedStart(StationId),
    /// The transfer station is missing from the dataset.
    #[error("transfer station {0} is not in the dataset")]
    UnknownTransfer(StationId),
    /// A round limit is zero.
    #[error("draw and platform limits must be positive")]
    InvalidLimits,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Playing,
    Finished,
}

/// Represents one game session over a fixed station dataset.
#[derive(Debug)]
pub struct World {
    stations: StationIndex,
    rules: RuleConfig,
    network: Network,
    phase: Phase,
    player_name: Option<String>,
    seed: u64,
    line_order: Vec<LineId>,
    round_index: usize,
    round: RoundState,
    results: Vec<RoundResult>,
    summary: Option<GameSummary>,
}

impl World {
    /// Creates a world with no game in progress.
    pub fn new(stations: Vec<Station>, rules: RuleConfig) -> Result<Self, WorldError> {
        let stations = StationIndex::new(stations)?;
        validate_rules(&stations, &rules)?;
        Ok(Self {
            network: Network::new(rules.transfer_station),
            stations,
            rules,
            phase: Phase::Idle,
            player_name: None,
            seed: 0,
            line_order: Vec::new(),
            round_index: 0,
            round: RoundState::new(Deck::seeded(0)),
            results: Vec::new(),
            summary: None,
        })
    }

    fn reset(&mut self) {
        self.network.clear();
        self.phase = Phase::Idle;
        self.player_name = None;
        self.seed = 0;
        self.line_order.clear();
        self.round_index = 0;
        self.round = RoundState::new(Deck::seeded(0));
        self.results.clear();
        self.summary = None;
    }

    fn start_game(&mut self, player_name: String, seed: u64, out_events: &mut Vec<Event>) {
        self.reset();
        self.phase = Phase::Playing;
        self.player_name = Some(player_name.clone());
        self.seed = seed;
        self.line_order = self.rules.lines.iter().map(|line| line.id).collect();
        self.line_order.shuffle(&mut line_order_rng(seed));
        info!(player = %player_name, seed, "game started");
        out_events.push(Event::GameStarted {
            player_name,
            line_order: self.line_order.clone(),
        });
        self.begin_round(out_events);
    }

    fn current_line(&self) -> Option<&LineConfig> {
        if self.phase != Phase::Playing {
            return None;
        }
        self.line_order
            .get(self.round_index)
            .and_then(|id| self.rules.line(*id))
    }

    fn begin_round(&mut self, out_events: &mut Vec<Event>) {
        let Some(line) = self.current_line().cloned() else {
            return;
        };
        let round_seed = derive_stream_seed(self.seed, RNG_STREAM_DECK, self.round_index as u64);
        self.round = RoundState::new(Deck::seeded(round_seed));
        self.network.ensure_line(line.id, line.start);
        out_events.push(Event::RoundStarted {
            line: line.id,
            round: self.round_index,
        });
    }

    fn draw(&mut self, out_events: &mut Vec<Event>) {
        let Some(line) = self.current_line().map(|line| line.id) else {
            return;
        };
        let Some((card, ended)) = self
            .round
            .draw(self.rules.draw_limit, self.rules.platform_limit)
        else {
            return;
        };
        let draws = self.round.view(self.round_index, line).draws;
        out_events.push(Event::CardDrawn { card, draws });
        if ended {
            info!(line = line.get(), draws, "round reached its draw limit");
            out_events.push(Event::RoundEnded { line });
        }
    }

    fn switch_card(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Playing {
            return;
        }
        if let Some(card) = self.round.switch() {
            out_events.push(Event::CardSwitched { card });
        }
    }

    fn end_round(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Playing && self.round.ended() {
            self.advance_round(out_events);
        }
    }

    fn check_connection(
        &self,
        from: StationId,
        to: StationId,
    ) -> Result<&LineConfig, ConnectionRejection> {
        let line = self.current_line().ok_or(ConnectionRejection::NoGame)?;
        let card = self.round.card().ok_or(ConnectionRejection::NoActiveCard)?;
        if self.round.card_used() {
            return Err(ConnectionRejection::CardAlreadyUsed);
        }
        validation::validate_connection(
            &self.stations,
            &self.network,
            self.rules.transfer_station,
            line,
            card,
            from,
            to,
        )?;
        Ok(line)
    }

    fn attempt_connection(&mut self, from: StationId, to: StationId, out_events: &mut Vec<Event>) {
        let line = match self.check_connection(from, to) {
            Ok(line) => line.clone(),
            Err(reason) => {
                debug!(from = from.get(), to = to.get(), ?reason, "connection rejected");
                out_events.push(Event::ConnectionRejected { from, to, reason });
                return;
            }
        };

        self.network.add_segment(line.id, line.start, from, to);
        self.round.consume_card();
        out_events.push(Event::SegmentPlaced {
            line: line.id,
            segment: Segment::new(from, to),
        });

        if self.round.ended() {
            self.advance_round(out_events);
        }
    }

    fn advance_round(&mut self, out_events: &mut Vec<Event>) {
        let Some(line) = self.current_line().map(|line| line.id) else {
            return;
        };
        let view = self
            .network
            .view(line)
            .unwrap_or_else(|| empty_view(line, &self.rules));
        let stations = &self.stations;
        let result = score_round(&view, |id| stations.get(id));
        info!(line = line.get(), points = result.points, "round scored");
        self.results.push(result);
        out_events.push(Event::RoundScored { result });

        self.round_index += 1;
        if self.round_index < self.line_order.len() {
            self.begin_round(out_events);
            return;
        }

        let lines = self.network.views();
        let summary = score_game(&self.results, &lines, |id| stations.get(id));
        info!(total = summary.total, "game finished");
        self.phase = Phase::Finished;
        self.summary = Some(summary.clone());
        out_events.push(Event::GameFinished { summary });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame { player_name, seed } => world.start_game(player_name, seed, out_events),
        Command::ResetGame => {
            world.reset();
            out_events.push(Event::GameReset);
        }
        Command::Draw | Command::Skip => world.draw(out_events),
        Command::SwitchCard => world.switch_card(out_events),
        Command::EndRound => world.end_round(out_events),
        Command::AttemptConnection { from, to } => world.attempt_connection(from, to, out_events),
    }
}

fn empty_view(line: LineId, rules: &RuleConfig) -> LineView {
    LineView {
        line,
        segments: Vec::new(),
        endpoints: Vec::new(),
        visited: rules
            .line(line)
            .map(|config| vec![config.start])
            .unwrap_or_default(),
    }
}

fn validate_rules(stations: &StationIndex, rules: &RuleConfig) -> Result<(), WorldError> {
    if rules.draw_limit == 0 || rules.platform_limit == 0 {
        return Err(WorldError::InvalidLimits);
    }
    if rules.lines.len() != LINE_COUNT {
        return Err(WorldError::LineCount {
            expected: LINE_COUNT,
            found: rules.lines.len(),
        });
    }
    if !stations.contains(rules.transfer_station) {
        return Err(WorldError::UnknownTransfer(rules.transfer_station));
    }

    let mut ids = BTreeSet::new();
    let mut starts = BTreeSet::new();
    for line in &rules.lines {
        if !ids.insert(line.id) {
            return Err(WorldError::DuplicateLine(line.id));
        }
        if !stations.contains(line.start) {
            return Err(WorldError::UnknownStart {
                line: line.id,
                station: line.start,
            });
        }
        if !starts.insert(line.start) {
            return Err(WorldError::SharedStart(line.start));
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use metro_core::{
        ConnectionRejection, GameSummary, GridCoord, LineConfig, LineId, LineView, RoundResult,
        RoundView, RuleConfig, Station, StationId,
    };

    use super::{Phase, World};

    /// Station with the provided identifier.
    #[must_use]
    pub fn station(world: &World, id: StationId) -> Option<&Station> {
        world.stations.get(id)
    }

    /// Station occupying the provided cell.
    #[must_use]
    pub fn station_at(world: &World, position: GridCoord) -> Option<&Station> {
        world.stations.at(position)
    }

    /// Every station in ascending id order.
    pub fn stations(world: &World) -> impl Iterator<Item = &Station> {
        world.stations.iter()
    }

    /// Rules the world was built with.
    #[must_use]
    pub fn rules(world: &World) -> &RuleConfig {
        &world.rules
    }

    /// Name of the player whose game is in progress or finished.
    #[must_use]
    pub fn player_name(world: &World) -> Option<&str> {
        world.player_name.as_deref()
    }

    /// Whether a game is being played.
    #[must_use]
    pub fn is_playing(world: &World) -> bool {
        world.phase == Phase::Playing
    }

    /// Whether the last round has been scored.
    #[must_use]
    pub fn is_finished(world: &World) -> bool {
        world.phase == Phase::Finished
    }

    /// Order in which lines are built this game.
    #[must_use]
    pub fn line_order(world: &World) -> &[LineId] {
        &world.line_order
    }

    /// Line being built in the current round.
    #[must_use]
    pub fn current_line(world: &World) -> Option<&LineConfig> {
        world.current_line()
    }

    /// Counters and card state of the current round.
    #[must_use]
    pub fn round_view(world: &World) -> Option<RoundView> {
        world
            .current_line()
            .map(|line| world.round.view(world.round_index, line.id))
    }

    /// Build state of a line, if it has been started.
    #[must_use]
    pub fn line_view(world: &World, line: LineId) -> Option<LineView> {
        world.network.view(line)
    }

    /// Build state of every started line, ordered by line id.
    #[must_use]
    pub fn line_views(world: &World) -> Vec<LineView> {
        world.network.views()
    }

    /// Line controlling the station, if any.
    #[must_use]
    pub fn owner(world: &World, station: StationId) -> Option<LineId> {
        world.network.owner(station)
    }

    /// Every owned station with its owner, ordered by station id.
    #[must_use]
    pub fn ownership(world: &World) -> Vec<(StationId, LineId)> {
        world.network.owners().collect()
    }

    /// Results of every round scored so far.
    #[must_use]
    pub fn round_results(world: &World) -> &[RoundResult] {
        &world.results
    }

    /// Final breakdown once the game has finished.
    #[must_use]
    pub fn summary(world: &World) -> Option<&GameSummary> {
        world.summary.as_ref()
    }

    /// Explains why the current line could not connect `from` to `to` right now.
    pub fn check_connection(
        world: &World,
        from: StationId,
        to: StationId,
    ) -> Result<(), ConnectionRejection> {
        world.check_connection(from, to).map(|_| ())
    }

    /// Reports whether the current line could connect `from` to `to` right now.
    #[must_use]
    pub fn can_connect(world: &World, from: StationId, to: StationId) -> bool {
        check_connection(world, from, to).is_ok()
    }
}
