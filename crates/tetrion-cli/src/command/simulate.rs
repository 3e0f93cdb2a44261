use log::{debug, info};
use rand::Rng as _;
use tetrion_achievements::{AchievementEngine, GameEvent};
use tetrion_engine::{GameSession, PieceSeed, TurnOutcome};
use tetrion_store::{KeyValueStore, SpeedSetting};

use super::Store;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Seed for the piece sequence (32 hex digits); random when omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Stop after this many pieces even if the game is not over
    #[arg(long, default_value_t = 500)]
    max_pieces: u64,
    /// Simulated frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=1000))]
    fps: u64,
}

impl Default for SimulateArg {
    fn default() -> Self {
        Self {
            seed: None,
            max_pieces: 500,
            fps: 60,
        }
    }
}

/// Frames the bot waits after positioning a piece before hard dropping it.
const MAX_THINK_FRAMES: u64 = 45;

pub(crate) fn run(arg: &SimulateArg, store: Store) -> anyhow::Result<()> {
    let SimulateArg {
        seed,
        max_pieces,
        fps,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let speed = SpeedSetting::load(store.clone());
    let mut achievements = AchievementEngine::new(store);

    let mut session = GameSession::with_seed(*fps, seed);
    session.set_speed_multiplier(speed.multiplier());
    info!(
        "simulating with seed {seed} at speed x{}",
        speed.multiplier()
    );

    let summary = play(&mut session, &mut achievements, *max_pieces);

    let stats = session.stats();
    println!("Seed:     {seed}");
    println!("Pieces:   {}", stats.completed_pieces());
    println!("Lines:    {} ({} tetrises)", stats.total_cleared_lines(), stats.tetrises());
    println!("Score:    {}", stats.score());
    println!("Level:    {}", stats.level());
    println!("Time:     {}s", session.elapsed_seconds());
    println!("Result:   {}", if summary.game_over { "game over" } else { "piece limit reached" });
    println!();
    println!("{}", session.board());

    let notifications = achievements.take_notifications();
    if notifications.is_empty() {
        println!("No new achievements.");
    } else {
        println!("New achievements:");
        for notification in &notifications {
            println!("  {} [{}]", notification.name, notification.rarity);
        }
    }
    if let Some(error) = achievements.last_save_error() {
        eprintln!("warning: {error}");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Summary {
    game_over: bool,
}

/// Plays until game over or `max_pieces` locks, forwarding gameplay events
/// to `achievements`.
fn play<S>(
    session: &mut GameSession,
    achievements: &mut AchievementEngine<S>,
    max_pieces: u64,
) -> Summary
where
    S: KeyValueStore,
{
    let mut rng = rand::rng();
    achievements.handle_event(GameEvent::GameStarted);

    while session.stats().completed_pieces() < max_pieces {
        place_randomly(session, &mut rng);

        let think_frames = rng.random_range(0..=MAX_THINK_FRAMES);
        let mut outcome = None;
        for _ in 0..think_frames {
            let before = session.elapsed_seconds();
            outcome = session.increment_frame();
            if session.elapsed_seconds() > before {
                achievements.handle_event(GameEvent::TimeTick);
            }
            if outcome.is_some() {
                break;
            }
        }
        let Some(outcome) = outcome.or_else(|| session.hard_drop_and_complete()) else {
            break;
        };
        report(achievements, session, &outcome);
        if outcome.game_over {
            return Summary { game_over: true };
        }
    }
    Summary { game_over: false }
}

fn place_randomly<R>(session: &mut GameSession, rng: &mut R)
where
    R: rand::Rng + ?Sized,
{
    for _ in 0..rng.random_range(0..4) {
        if session.try_rotate_right().is_err() {
            break;
        }
    }
    let shift: i32 = rng.random_range(-5..=5);
    for _ in 0..shift.unsigned_abs() {
        let moved = if shift < 0 {
            session.try_move_left()
        } else {
            session.try_move_right()
        };
        if moved.is_err() {
            break;
        }
    }
}

fn report<S>(achievements: &mut AchievementEngine<S>, session: &GameSession, outcome: &TurnOutcome)
where
    S: KeyValueStore,
{
    debug!("piece locked: {outcome:?}");
    if outcome.cleared_lines > 0 {
        achievements.handle_event(GameEvent::LinesCleared(outcome.cleared_lines as u64));
    }
    let stats = session.stats();
    achievements.handle_event(GameEvent::ScoreUpdated {
        score: stats.score(),
        level: stats.level(),
    });
    achievements.handle_event(GameEvent::ComboUpdated(u64::from(outcome.combo)));
}
