#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the metro line builder.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Illegal moves are ordinary inputs: they surface as
//! [`Event::ConnectionRejected`] rather than as errors.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Largest coordinate value a station may occupy on either axis.
pub const GRID_MAX: u32 = 9;

/// Number of lines built during a single game.
pub const LINE_COUNT: usize = 4;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Discards any previous session and starts a new game.
    StartGame {
        /// Name recorded against the final score.
        player_name: String,
        /// Seed driving line order and deck shuffles.
        seed: u64,
    },
    /// Clears all session state without starting a new game.
    ResetGame,
    /// Draws the next card for the active round.
    Draw,
    /// Discards the current card and draws the next one; identical to [`Command::Draw`].
    Skip,
    /// Replaces the current card without counting as a draw. Once per round.
    SwitchCard,
    /// Closes a round that has reached its draw limit.
    EndRound,
    /// Requests a segment between two stations for the active line.
    AttemptConnection {
        /// Station the segment extends from.
        from: StationId,
        /// Station the segment extends to.
        to: StationId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new game began with the provided line order.
    GameStarted {
        /// Player the game is recorded against.
        player_name: String,
        /// Order in which lines will be built, one per round.
        line_order: Vec<LineId>,
    },
    /// A round opened for the provided line.
    RoundStarted {
        /// Line built during this round.
        line: LineId,
        /// Zero-based index of the round within the game.
        round: usize,
    },
    /// A card was drawn and counted against the round limits.
    CardDrawn {
        /// Card that became active.
        card: Card,
        /// Total draws counted this round, including this one.
        draws: u32,
    },
    /// The active card was replaced without counting as a draw.
    CardSwitched {
        /// Card that became active.
        card: Card,
    },
    /// A segment was added to a line. Adapters should redraw.
    SegmentPlaced {
        /// Line that received the segment.
        line: LineId,
        /// Segment that was placed.
        segment: Segment,
    },
    /// A proposed connection was refused and no state changed.
    ConnectionRejected {
        /// Station the segment would have extended from.
        from: StationId,
        /// Station the segment would have extended to.
        to: StationId,
        /// First check that failed.
        reason: ConnectionRejection,
    },
    /// The round reached a draw limit. Drawing and switching are locked.
    RoundEnded {
        /// Line built during the round.
        line: LineId,
    },
    /// A finished round was scored.
    RoundScored {
        /// Score breakdown for the round.
        result: RoundResult,
    },
    /// The last round was scored and the game is over.
    GameFinished {
        /// Final score breakdown.
        summary: GameSummary,
    },
    /// All session state was discarded.
    GameReset,
}

/// Unique identifier assigned to a station by the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StationId {
    /// Creates a new station identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a metro line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u32);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl LineId {
    /// Creates a new line identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a city district used for round scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictId(u32);

impl DistrictId {
    /// Creates a new district identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a station on the board expressed as grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the coordinate.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the coordinate.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Reports whether the coordinate lies on the playable board.
    #[must_use]
    pub const fn on_board(&self) -> bool {
        self.x <= GRID_MAX && self.y <= GRID_MAX
    }
}

/// Symbol printed on stations and cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    /// Letter symbol `A`.
    A,
    /// Letter symbol `B`.
    B,
    /// Letter symbol `C`.
    C,
    /// Letter symbol `D`.
    D,
    /// Matches every other symbol. Printed as `?` on stations, "Joker" on cards.
    Wildcard,
}

impl Symbol {
    /// All symbols in deck order.
    pub const ALL: [Symbol; 5] = [
        Symbol::A,
        Symbol::B,
        Symbol::C,
        Symbol::D,
        Symbol::Wildcard,
    ];

    /// Parses the one-character dataset representation.
    #[must_use]
    pub fn from_char(value: char) -> Option<Self> {
        match value.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            '?' => Some(Self::Wildcard),
            _ => None,
        }
    }

    /// One-character representation used by the dataset and adapters.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::Wildcard => '?',
        }
    }

    /// Reports whether a card showing `self` may be used to reach a station showing `station`.
    #[must_use]
    pub fn accepts(self, station: Symbol) -> bool {
        self == Self::Wildcard || station == Self::Wildcard || self == station
    }
}

/// Bank of the river a station lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiverBank {
    /// Northern bank.
    North,
    /// Southern bank.
    South,
}

/// Immutable station record supplied by the dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Unique identifier of the station.
    pub id: StationId,
    /// Position of the station on the board.
    pub position: GridCoord,
    /// Symbol printed on the station.
    pub symbol: Symbol,
    /// Whether the station is a train hub counted by the end-of-game bonus.
    pub train_hub: bool,
    /// River bank the station lies on, if any.
    pub river_bank: Option<RiverBank>,
    /// District the station belongs to, if any.
    pub district: Option<DistrictId>,
}

impl Station {
    /// Creates a station with no optional metadata.
    #[must_use]
    pub const fn basic(id: StationId, position: GridCoord, symbol: Symbol) -> Self {
        Self {
            id,
            position,
            symbol,
            train_hub: false,
            river_bank: None,
            district: None,
        }
    }

    /// Marks the station as a train hub.
    #[must_use]
    pub const fn with_train_hub(mut self) -> Self {
        self.train_hub = true;
        self
    }

    /// Places the station on a river bank.
    #[must_use]
    pub const fn with_river_bank(mut self, bank: RiverBank) -> Self {
        self.river_bank = Some(bank);
        self
    }

    /// Assigns the station to a district.
    #[must_use]
    pub const fn with_district(mut self, district: DistrictId) -> Self {
        self.district = Some(district);
        self
    }
}

/// Category of a card, used only for the alternate round-ending trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// Center-platform card.
    Center,
    /// Side-platform card.
    Side,
}

impl PlatformType {
    /// Both platform types in deck order.
    pub const ALL: [PlatformType; 2] = [PlatformType::Center, PlatformType::Side];
}

/// Card drawn from the deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Platform category of the card.
    pub platform: PlatformType,
    /// Symbol the target station must match.
    pub symbol: Symbol,
}

impl Card {
    /// Creates a card.
    #[must_use]
    pub const fn new(platform: PlatformType, symbol: Symbol) -> Self {
        Self { platform, symbol }
    }

    /// The ten cards that make up a fresh deck, in canonical order.
    #[must_use]
    pub fn full_deck() -> Vec<Card> {
        PlatformType::ALL
            .iter()
            .flat_map(|platform| {
                Symbol::ALL
                    .iter()
                    .map(move |symbol| Card::new(*platform, *symbol))
            })
            .collect()
    }
}

/// Connection between two stations owned by a single line.
///
/// Segments are unordered for duplicate detection, but keep placement order
/// so adapters can draw them as built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    from: StationId,
    to: StationId,
}

impl Segment {
    /// Creates a segment in placement order.
    #[must_use]
    pub const fn new(from: StationId, to: StationId) -> Self {
        Self { from, to }
    }

    /// Station the segment was built from.
    #[must_use]
    pub const fn origin(&self) -> StationId {
        self.from
    }

    /// Station the segment was built to.
    #[must_use]
    pub const fn target(&self) -> StationId {
        self.to
    }

    /// Order-independent key identifying the station pair.
    #[must_use]
    pub fn key(&self) -> (StationId, StationId) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    /// Reports whether the segment links the same pair of stations, in either direction.
    #[must_use]
    pub fn connects(&self, a: StationId, b: StationId) -> bool {
        self.key() == Segment::new(a, b).key()
    }

    /// Reports whether `station` is one of the segment's endpoints.
    #[must_use]
    pub fn touches(&self, station: StationId) -> bool {
        self.from == station || self.to == station
    }
}

/// Static configuration of a metro line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Identifier of the line.
    pub id: LineId,
    /// Name shown to the player.
    pub name: String,
    /// Colour adapters use to draw the line.
    pub color: String,
    /// Station every segment of the line must grow from.
    pub start: StationId,
}

/// Tunable rules for a game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Total draws after which a round ends.
    pub draw_limit: u32,
    /// Draws of a single platform type after which a round ends.
    pub platform_limit: u32,
    /// Interchange station exempt from ownership and symbol checks.
    pub transfer_station: StationId,
    /// The lines built during a game.
    pub lines: Vec<LineConfig>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            draw_limit: 8,
            platform_limit: 5,
            transfer_station: StationId::new(45),
            lines: vec![
                LineConfig {
                    id: LineId::new(1),
                    name: "Red".to_owned(),
                    color: "#d32f2f".to_owned(),
                    start: StationId::new(1),
                },
                LineConfig {
                    id: LineId::new(2),
                    name: "Blue".to_owned(),
                    color: "#1976d2".to_owned(),
                    start: StationId::new(10),
                },
                LineConfig {
                    id: LineId::new(3),
                    name: "Green".to_owned(),
                    color: "#388e3c".to_owned(),
                    start: StationId::new(91),
                },
                LineConfig {
                    id: LineId::new(4),
                    name: "Yellow".to_owned(),
                    color: "#fbc02d".to_owned(),
                    start: StationId::new(100),
                },
            ],
        }
    }
}

impl RuleConfig {
    /// Looks up a line's configuration.
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&LineConfig> {
        self.lines.iter().find(|line| line.id == id)
    }
}

/// Reasons a proposed connection may be rejected by the world.
///
/// Variants after the card preconditions follow the order in which the
/// checks run; only the first failure is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionRejection {
    /// No game is in progress.
    NoGame,
    /// No card has been drawn this turn.
    NoActiveCard,
    /// The active card was already spent on a segment.
    CardAlreadyUsed,
    /// Origin and target are the same station.
    SameStation,
    /// A station id does not resolve to a known station.
    UnknownStation(StationId),
    /// A station is controlled by another line.
    OwnedByOtherLine {
        /// Station that is controlled elsewhere.
        station: StationId,
        /// Line that controls it.
        owner: LineId,
    },
    /// The stations are not on a straight or 45° diagonal.
    NotAligned,
    /// The first segment of a line must leave its start station.
    NotFromStart,
    /// The origin is not an open endpoint of the line.
    NotAnEndpoint,
    /// The target symbol does not match the active card.
    SymbolMismatch,
    /// Another station lies strictly between origin and target.
    PassesThroughStation(StationId),
    /// Some line already connects this pair.
    DuplicateSegment,
    /// The segment would cross an existing one.
    CrossesSegment {
        /// Line owning the crossed segment.
        line: LineId,
        /// Segment that would be crossed.
        segment: Segment,
    },
    /// The line already visits the target.
    AlreadyVisited,
}

/// Read-only snapshot of a line's build state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineView {
    /// Line the snapshot describes.
    pub line: LineId,
    /// Segments in placement order.
    pub segments: Vec<Segment>,
    /// Stations with odd degree, sorted by id.
    pub endpoints: Vec<StationId>,
    /// Stations touched by the line, sorted by id.
    pub visited: Vec<StationId>,
}

/// Read-only snapshot of the active round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundView {
    /// Zero-based round index.
    pub round: usize,
    /// Line built during the round.
    pub line: LineId,
    /// Draws counted this round.
    pub draws: u32,
    /// Center-platform draws counted this round.
    pub center_draws: u32,
    /// Side-platform draws counted this round.
    pub side_draws: u32,
    /// Card currently in play.
    pub card: Option<Card>,
    /// Whether the current card was spent on a segment.
    pub card_used: bool,
    /// Whether the switch ability was used this round.
    pub switch_used: bool,
    /// Whether the round reached a draw limit.
    pub ended: bool,
}

/// Score breakdown for one finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Line that was built.
    pub line: LineId,
    /// Distinct districts visited (PK).
    pub districts: u32,
    /// Largest number of visited stations in one district (PM).
    pub max_in_district: u32,
    /// Segments crossing the river (PD).
    pub river_crossings: u32,
    /// Round total, `PK * PM + PD` (FP).
    pub points: u32,
}

/// Stations shared between several lines, bucketed by how many lines visit them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionCounts {
    /// Stations visited by exactly two lines (P2).
    pub double: u32,
    /// Stations visited by exactly three lines (P3).
    pub triple: u32,
    /// Stations visited by four or more lines (P4).
    pub quadruple: u32,
}

impl JunctionCounts {
    /// Bonus points awarded for shared stations.
    #[must_use]
    pub const fn points(&self) -> u32 {
        2 * self.double + 5 * self.triple + 9 * self.quadruple
    }
}

/// End-of-game score breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// One entry per finished round, in play order.
    pub rounds: Vec<RoundResult>,
    /// Distinct train hubs visited by any line (PP).
    pub train_hubs: u32,
    /// Shared-station counts.
    pub junctions: JunctionCounts,
    /// Final score.
    pub total: u32,
}

/// Finished-game record handed to an external leaderboard store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Player name.
    pub name: String,
    /// Final score.
    pub score: u32,
    /// Elapsed play time in whole seconds.
    pub seconds: u64,
    /// Completion timestamp in ISO-8601 form.
    pub date: String,
}

/// Orders records for leaderboard display: score descending, then time ascending.
#[must_use]
pub fn leaderboard_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.seconds.cmp(&b.seconds))
}
