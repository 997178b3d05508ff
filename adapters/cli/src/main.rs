#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays the metro line builder in a terminal.

mod console;

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Parser;
use metro_core::{leaderboard_order, Command, Event, GameSummary, ScoreRecord};
use metro_system_bootstrap::Bootstrap;
use metro_world::{self as world, query, World};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::console::{Input, HELP};

#[derive(Debug, Parser)]
#[command(name = "metro", version, about = "Build four metro lines on a shared board")]
struct CliArgs {
    /// Station dataset in JSON form.
    #[arg(long, default_value = "data/stations.json")]
    stations: PathBuf,
    /// Rules file in TOML form. Built-in rules apply when omitted.
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Seed for line order and card shuffles. Taken from the clock when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Name recorded against the final score.
    #[arg(long, default_value = "player")]
    player: String,
    /// Reads console commands from a file instead of standard input.
    #[arg(long)]
    script: Option<PathBuf>,
}

/// Entry point for the metro command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();
    let mut world = Bootstrap
        .load_world(&args.stations, args.rules.as_deref())
        .with_context(|| {
            format!(
                "failed to set up a game from {}",
                args.stations.display()
            )
        })?;
    info!(
        stations = query::stations(&world).count(),
        "station dataset loaded"
    );

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut session = Session::new(args.player, args.seed.unwrap_or_else(clock_seed));
    session.run(&mut world, input, &mut io::stdout().lock())
}

fn clock_seed() -> u64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as u64
}

/// Console session: one player, any number of consecutive games.
struct Session {
    player: String,
    next_seed: u64,
    started: Instant,
    scores: Vec<ScoreRecord>,
}

impl Session {
    fn new(player: String, seed: u64) -> Self {
        Self {
            player,
            next_seed: seed,
            started: Instant::now(),
            scores: Vec::new(),
        }
    }

    fn run(
        &mut self,
        world: &mut World,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> Result<()> {
        self.new_game(world, None, out)?;
        for line in input.lines() {
            let line = line.context("failed to read console input")?;
            match console::parse_input(&line) {
                Ok(None) => {}
                Ok(Some(Input::Quit)) => break,
                Ok(Some(Input::Help)) => writeln!(out, "{HELP}")?,
                Ok(Some(Input::Status)) => writeln!(out, "{}", console::render_status(world))?,
                Ok(Some(Input::Moves)) => self.print_moves(world, out)?,
                Ok(Some(Input::Scores)) => self.print_scores(out)?,
                Ok(Some(Input::NewGame(seed))) => self.new_game(world, seed, out)?,
                Ok(Some(Input::Game(command))) => self.apply(world, command, out)?,
                Err(error) => writeln!(out, "{error}")?,
            }
        }
        Ok(())
    }

    fn new_game(
        &mut self,
        world: &mut World,
        seed: Option<u64>,
        out: &mut impl Write,
    ) -> Result<()> {
        let seed = seed.unwrap_or(self.next_seed);
        self.next_seed = seed.wrapping_add(1);
        self.started = Instant::now();
        debug!(seed, "starting game");
        self.apply(
            world,
            Command::StartGame {
                player_name: self.player.clone(),
                seed,
            },
            out,
        )
    }

    fn apply(&mut self, world: &mut World, command: Command, out: &mut impl Write) -> Result<()> {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        for event in &events {
            writeln!(out, "{}", console::render_event(world, event))?;
            if let Event::GameFinished { summary } = event {
                let record = self.score_record(summary)?;
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
                self.record(record);
            }
        }
        Ok(())
    }

    fn score_record(&self, summary: &GameSummary) -> Result<ScoreRecord> {
        Ok(ScoreRecord {
            name: self.player.clone(),
            score: summary.total,
            seconds: self.started.elapsed().as_secs(),
            date: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .context("failed to format completion time")?,
        })
    }

    fn record(&mut self, record: ScoreRecord) {
        self.scores.push(record);
        self.scores.sort_by(leaderboard_order);
    }

    fn print_scores(&self, out: &mut impl Write) -> Result<()> {
        if self.scores.is_empty() {
            writeln!(out, "no finished games yet")?;
            return Ok(());
        }
        for (rank, record) in self.scores.iter().enumerate() {
            writeln!(
                out,
                "  {}. {:<12} {:>3}  {}s  {}",
                rank + 1,
                record.name,
                record.score,
                record.seconds,
                record.date,
            )?;
        }
        Ok(())
    }

    fn print_moves(&self, world: &World, out: &mut impl Write) -> Result<()> {
        let moves = console::legal_moves(world);
        if moves.is_empty() {
            writeln!(out, "no legal connections")?;
            return Ok(());
        }
        for (from, to) in moves {
            writeln!(out, "  {from} -> {to}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLED_STATIONS: &str = include_str!("../../../data/stations.json");

    fn play(script: &str) -> String {
        let mut world = Bootstrap
            .world_from_str(BUNDLED_STATIONS, None)
            .expect("bundled dataset loads");
        let mut session = Session::new("tester".to_owned(), 7);
        let mut out = Vec::new();
        session
            .run(&mut world, script.as_bytes(), &mut out)
            .expect("session runs");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn session_starts_a_game_and_reports_bad_input() {
        let output = play("status\nfly\n");

        assert!(output.contains("tester starts a game"));
        assert!(output.contains("round 1 builds"));
        assert!(output.contains("unknown command `fly`"));
    }

    #[test]
    fn quit_stops_reading_input() {
        let output = play("quit\ndraw\n");

        assert!(!output.contains("drew"));
    }

    #[test]
    fn skipping_through_every_round_prints_a_score_record() {
        let script = "d\n".repeat(8) + "e\n";
        let output = play(&script.repeat(4));

        assert!(output.contains("final score"));
        let record = output
            .lines()
            .find(|line| line.starts_with('{'))
            .expect("score record line");
        let record: ScoreRecord = serde_json::from_str(record).expect("record parses");
        assert_eq!(record.name, "tester");
        assert_eq!(record.score, 4);
    }

    #[test]
    fn finished_games_are_ranked_by_score_then_time() {
        let record = |name: &str, score, seconds| ScoreRecord {
            name: name.to_owned(),
            score,
            seconds,
            date: "2026-01-01T00:00:00Z".to_owned(),
        };
        let mut session = Session::new("tester".to_owned(), 1);
        session.record(record("slow", 20, 300));
        session.record(record("low", 12, 60));
        session.record(record("fast", 20, 90));

        let names: Vec<&str> = session
            .scores
            .iter()
            .map(|record| record.name.as_str())
            .collect();
        assert_eq!(names, vec!["fast", "slow", "low"]);

        let mut out = Vec::new();
        session.print_scores(&mut out).expect("write to buffer");
        let listing = String::from_utf8(out).expect("utf-8 output");
        assert!(listing.starts_with("  1. fast"));
    }

    #[test]
    fn scores_command_lists_finished_games() {
        let game = "d\n".repeat(8) + "e\n";
        let output = play(&format!("scores\n{}scores\n", game.repeat(4)));

        assert!(output.contains("no finished games yet"));
        assert!(output.contains("  1. tester"));
    }
}
