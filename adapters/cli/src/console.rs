use metro_core::{
    Card, Command, ConnectionRejection, Event, GameSummary, LineId, PlatformType, RoundView,
    StationId, Symbol,
};
use metro_world::{query, World};
use thiserror::Error;

/// Help text printed by the `help` command.
pub(crate) const HELP: &str = "\
commands:
  draw | d            draw the next card
  skip | s            discard the card and draw again
  switch | w          replace the card once per round without counting
  connect A B | c A B build a segment from station A to station B
  end | e             close a round that reached its draw limit
  moves | m           list segments the current card allows
  status              show the round and line state
  scores              show this session's finished games, best first
  new [SEED]          start a new game
  reset               discard the current game
  help | h            show this help
  quit | q            leave";

/// Line of console input after parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Command forwarded to the world unchanged.
    Game(Command),
    /// Start a new game, optionally with an explicit seed.
    NewGame(Option<u64>),
    /// Print the current round and line state.
    Status,
    /// List every legal connection for the current card.
    Moves,
    /// Print the finished games of this session in leaderboard order.
    Scores,
    /// Print the command summary.
    Help,
    /// Stop reading input.
    Quit,
}

/// Reasons a console line could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum InputError {
    /// The first word is not a known command.
    #[error("unknown command `{0}`; type `help` for a list")]
    UnknownCommand(String),
    /// A command received the wrong number of arguments.
    #[error("`{command}` expects {expected}")]
    Arity {
        /// Command that was misused.
        command: &'static str,
        /// Description of the expected arguments.
        expected: &'static str,
    },
    /// An argument is not a number.
    #[error("`{0}` is not a number")]
    NotANumber(String),
}

/// Parses one line of console input. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_input(line: &str) -> Result<Option<Input>, InputError> {
    let line = line.split('#').next().unwrap_or_default();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let input = match head.to_ascii_lowercase().as_str() {
        "draw" | "d" => Input::Game(Command::Draw),
        "skip" | "s" => Input::Game(Command::Skip),
        "switch" | "w" => Input::Game(Command::SwitchCard),
        "end" | "e" => Input::Game(Command::EndRound),
        "reset" => Input::Game(Command::ResetGame),
        "connect" | "c" => {
            let [from, to] = args.as_slice() else {
                return Err(InputError::Arity {
                    command: "connect",
                    expected: "two station ids",
                });
            };
            Input::Game(Command::AttemptConnection {
                from: StationId::new(number(from)?),
                to: StationId::new(number(to)?),
            })
        }
        "new" => match args.as_slice() {
            [] => Input::NewGame(None),
            [seed] => Input::NewGame(Some(number(seed)?)),
            _ => {
                return Err(InputError::Arity {
                    command: "new",
                    expected: "at most one seed",
                })
            }
        },
        "status" => Input::Status,
        "moves" | "m" => Input::Moves,
        "scores" => Input::Scores,
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(InputError::UnknownCommand(other.to_owned())),
    };
    Ok(Some(input))
}

fn number<T: std::str::FromStr>(text: &str) -> Result<T, InputError> {
    text.parse()
        .map_err(|_| InputError::NotANumber(text.to_owned()))
}

fn line_name(world: &World, line: LineId) -> String {
    query::rules(world)
        .line(line)
        .map_or_else(|| format!("line {line}"), |config| config.name.clone())
}

fn card_label(card: Card) -> String {
    let platform = match card.platform {
        PlatformType::Center => "center",
        PlatformType::Side => "side",
    };
    let symbol = match card.symbol {
        Symbol::Wildcard => "joker".to_owned(),
        other => other.as_char().to_string(),
    };
    format!("{platform} {symbol}")
}

fn rejection_label(world: &World, reason: ConnectionRejection) -> String {
    match reason {
        ConnectionRejection::NoGame => "no game is running".to_owned(),
        ConnectionRejection::NoActiveCard => "draw a card first".to_owned(),
        ConnectionRejection::CardAlreadyUsed => "this card was already used".to_owned(),
        ConnectionRejection::SameStation => "a station cannot connect to itself".to_owned(),
        ConnectionRejection::UnknownStation(id) => format!("there is no station {id}"),
        ConnectionRejection::OwnedByOtherLine { station, owner } => {
            format!("station {station} belongs to {}", line_name(world, owner))
        }
        ConnectionRejection::NotAligned => {
            "stations must share a row, a column or a diagonal".to_owned()
        }
        ConnectionRejection::NotFromStart => "the first segment must leave the start".to_owned(),
        ConnectionRejection::NotAnEndpoint => "segments extend from an end of the line".to_owned(),
        ConnectionRejection::SymbolMismatch => "the card does not match that station".to_owned(),
        ConnectionRejection::PassesThroughStation(id) => {
            format!("the segment would pass through station {id}")
        }
        ConnectionRejection::DuplicateSegment => "those stations are already connected".to_owned(),
        ConnectionRejection::CrossesSegment { line, segment } => format!(
            "the segment would cross {} between {} and {}",
            line_name(world, line),
            segment.origin(),
            segment.target(),
        ),
        ConnectionRejection::AlreadyVisited => "the line already visits that station".to_owned(),
    }
}

/// Human-readable rendering of a world event.
pub(crate) fn render_event(world: &World, event: &Event) -> String {
    match event {
        Event::GameStarted {
            player_name,
            line_order,
        } => {
            let order: Vec<String> = line_order
                .iter()
                .map(|line| line_name(world, *line))
                .collect();
            format!("{player_name} starts a game: {}", order.join(" -> "))
        }
        Event::RoundStarted { line, round } => {
            format!("round {} builds {}", round + 1, line_name(world, *line))
        }
        Event::CardDrawn { card, draws } => {
            format!("drew {} (draw {draws})", card_label(*card))
        }
        Event::CardSwitched { card } => format!("switched to {}", card_label(*card)),
        Event::SegmentPlaced { line, segment } => format!(
            "{} connects {} -> {}",
            line_name(world, *line),
            segment.origin(),
            segment.target(),
        ),
        Event::ConnectionRejected { from, to, reason } => format!(
            "cannot connect {from} -> {to}: {}",
            rejection_label(world, *reason)
        ),
        Event::RoundEnded { line } => format!(
            "{} drew its last card; build once more or `end`",
            line_name(world, *line)
        ),
        Event::RoundScored { result } => format!(
            "{} scores {} ({} districts x {} + {} river crossings)",
            line_name(world, result.line),
            result.points,
            result.districts,
            result.max_in_district,
            result.river_crossings,
        ),
        Event::GameFinished { summary } => render_summary(world, summary),
        Event::GameReset => "game discarded".to_owned(),
    }
}

/// Final score breakdown, one component per line.
pub(crate) fn render_summary(world: &World, summary: &GameSummary) -> String {
    let mut lines = vec!["final score".to_owned()];
    for round in &summary.rounds {
        lines.push(format!(
            "  {:<10} {:>3}",
            line_name(world, round.line),
            round.points
        ));
    }
    lines.push(format!("  {:<10} {:>3}", "hubs", summary.train_hubs));
    lines.push(format!(
        "  {:<10} {:>3}  ({} x2, {} x3, {} x4)",
        "junctions",
        summary.junctions.points(),
        summary.junctions.double,
        summary.junctions.triple,
        summary.junctions.quadruple,
    ));
    lines.push(format!("  {:<10} {:>3}", "total", summary.total));
    lines.join("\n")
}

/// Current round counters and the active line's shape.
pub(crate) fn render_status(world: &World) -> String {
    let Some(round) = query::round_view(world) else {
        return match query::summary(world) {
            Some(summary) => render_summary(world, summary),
            None => "no game is running; type `new` to start".to_owned(),
        };
    };
    let mut lines = vec![round_line(world, &round)];
    if let Some(view) = query::line_view(world, round.line) {
        let ids = |stations: &[StationId]| {
            stations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };
        lines.push(format!("  endpoints: {}", ids(&view.endpoints)));
        lines.push(format!("  visited:   {}", ids(&view.visited)));
    }
    lines.join("\n")
}

fn round_line(world: &World, round: &RoundView) -> String {
    let card = round.card.map_or_else(
        || "none".to_owned(),
        |card| {
            let state = if round.card_used { " (used)" } else { "" };
            format!("{}{state}", card_label(card))
        },
    );
    format!(
        "round {} {}: draws {} (center {}, side {}), card {card}{}{}",
        round.round + 1,
        line_name(world, round.line),
        round.draws,
        round.center_draws,
        round.side_draws,
        if round.switch_used { ", switch used" } else { "" },
        if round.ended { ", ended" } else { "" },
    )
}

/// Every connection the current line may make with the current card.
pub(crate) fn legal_moves(world: &World) -> Vec<(StationId, StationId)> {
    let ids: Vec<StationId> = query::stations(world).map(|station| station.id).collect();
    ids.iter()
        .flat_map(|from| ids.iter().map(move |to| (*from, *to)))
        .filter(|(from, to)| query::can_connect(world, *from, *to))
        .collect()
}
