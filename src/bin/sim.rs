use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tycoon_rs::cli::{PlayerInstance, StatisticsAccumulator, create_player, print_player_help};
use tycoon_rs::game::{Game, GameConfig, GameError};

#[derive(Debug, Parser, Clone)]
#[command(name = "tycoon-sim")]
#[command(about = "Tycoon simulator - play batches of games between agent strategies")]
struct Args {
    /// JSON game configuration; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Comma-separated player codes (e.g., R,R,H,H)
    /// Use ':' to set player-specific params (e.g., H:300 for the cash reserve)
    #[arg(long, default_value = "R,R,R,R")]
    players: String,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Turns before a game is called for the richest player
    #[arg(long)]
    turns_limit: Option<u32>,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence console output
    #[arg(long)]
    quiet: bool,

    /// Number of worker threads for parallel execution
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

/// A player code with its params, parsed once and instantiated fresh for every game.
#[derive(Debug, Clone)]
struct PlayerArg {
    code: String,
    params: Vec<String>,
}

impl PlayerArg {
    fn instantiate(&self, seed: u64) -> Option<PlayerInstance> {
        let params: Vec<&str> = self.params.iter().map(String::as_str).collect();
        create_player(&self.code, seed, &params)
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.quiet);

    if args.help_players {
        print_player_help();
        return;
    }

    let player_args: Vec<PlayerArg> = args
        .players
        .split(',')
        .map(|key| {
            let mut parts = key.trim().split(':');
            PlayerArg {
                code: parts.next().unwrap_or_default().to_string(),
                params: parts.map(str::to_string).collect(),
            }
        })
        .collect();
    if !(2..=8).contains(&player_args.len()) {
        eprintln!("Error: Must specify 2-8 players");
        std::process::exit(1);
    }
    if let Some(arg) = player_args.iter().find(|arg| arg.instantiate(0).is_none()) {
        eprintln!("Error: Unknown player code '{}'", arg.code);
        eprintln!("Use --help-players to see available codes");
        std::process::exit(1);
    }

    let mut config = match &args.config {
        Some(path) => match GameConfig::from_json_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    config.num_players = player_args.len();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(limit) = args.turns_limit {
        config.turns_limit = limit;
    }
    if let Err(err) = config.validate() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let mut stats = StatisticsAccumulator::new();
    let result = if args.workers > 1 {
        run_parallel_simulations(&args, &config, &player_args, &mut stats)
    } else {
        run_sequential_simulations(&args, &config, &player_args, &mut stats)
    };
    if let Err(err) = result {
        error!(%err, "simulation aborted");
        std::process::exit(1);
    }

    if !args.quiet {
        print_summary(&stats, &player_args);
    }
}

/// Plays game `game_idx` of the batch: the config seed is offset per game and
/// every seat gets its own agent seed.
fn play_one(
    config: &GameConfig,
    player_args: &[PlayerArg],
    game_idx: u64,
) -> Result<Game, GameError> {
    let seed = config.seed.wrapping_add(game_idx);
    let mut players: Vec<PlayerInstance> = player_args
        .iter()
        .enumerate()
        .filter_map(|(seat, arg)| arg.instantiate(seed.wrapping_mul(31).wrapping_add(seat as u64)))
        .collect();
    let mut game = Game::new(GameConfig {
        seed,
        ..config.clone()
    })?;
    game.play(&mut players)?;
    Ok(game)
}

fn run_sequential_simulations(
    args: &Args,
    config: &GameConfig,
    player_args: &[PlayerArg],
    stats: &mut StatisticsAccumulator,
) -> Result<(), GameError> {
    for game_idx in 0..args.num {
        let start = Instant::now();
        let game = play_one(config, player_args, game_idx as u64)?;
        let duration = start.elapsed();
        stats.after(&game, duration);

        if !args.quiet {
            let last_n = 10;
            if game_idx < last_n || game_idx >= args.num.saturating_sub(last_n) {
                let outcome = game
                    .outcome()
                    .map(|outcome| format!("{outcome:?}"))
                    .unwrap_or_else(|| "None".to_string());
                println!(
                    "Game {:>4}: Outcome={:<28} Turns={:>4}, Actions={:>6}, Duration={:?}",
                    game_idx + 1,
                    outcome,
                    game.state.turn,
                    game.state.history.len(),
                    duration
                );
            } else if (game_idx + 1) % 100 == 0 {
                print!(".");
                use std::io::Write;
                let _ = std::io::stdout().flush();
            }
        }
    }
    Ok(())
}

fn run_parallel_simulations(
    args: &Args,
    config: &GameConfig,
    player_args: &[PlayerArg],
    stats: &mut StatisticsAccumulator,
) -> Result<(), GameError> {
    use std::thread;

    let games_per_worker = args.num as usize / args.workers;
    let remainder = args.num as usize % args.workers;
    info!(workers = args.workers, games = args.num, "running in parallel");

    let results: Vec<Result<StatisticsAccumulator, GameError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..args.workers)
            .map(|worker_id| {
                let num_games = games_per_worker + usize::from(worker_id < remainder);
                let start_idx = worker_id * games_per_worker + worker_id.min(remainder);
                scope.spawn(move || -> Result<StatisticsAccumulator, GameError> {
                    let mut local_stats = StatisticsAccumulator::new();
                    for game_idx in start_idx..start_idx + num_games {
                        let start = Instant::now();
                        let game = play_one(config, player_args, game_idx as u64)?;
                        local_stats.after(&game, start.elapsed());
                    }
                    Ok(local_stats)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    for worker in results {
        let worker = worker?.stats;
        for (player, wins) in worker.wins {
            *stats.stats.wins.entry(player).or_insert(0) += wins;
        }
        for (player, worths) in worker.net_worth_by_player {
            stats.stats.net_worth_by_player.entry(player).or_default().extend(worths);
        }
        for (kind, count) in worker.outcomes {
            *stats.stats.outcomes.entry(kind).or_insert(0) += count;
        }
        stats.stats.games += worker.games;
        stats.stats.total_turns += worker.total_turns;
        stats.stats.total_actions += worker.total_actions;
        stats.stats.total_duration += worker.total_duration;
    }
    Ok(())
}

fn print_summary(stats: &StatisticsAccumulator, player_args: &[PlayerArg]) {
    let stats = &stats.stats;
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    println!("\nPlayer Summary:");
    println!("{:<20} {:<10} {:<12} {:<14}", "Player", "Wins", "Win Rate", "Avg Net Worth");
    println!("{}", "-".repeat(58));
    for (seat, arg) in player_args.iter().enumerate() {
        let wins = stats.wins_for(seat);
        let win_rate = if stats.games > 0 {
            (wins as f64 / stats.games as f64) * 100.0
        } else {
            0.0
        };
        let label = if arg.params.is_empty() {
            format!("{} (seat {})", arg.code, seat)
        } else {
            format!("{}:{} (seat {})", arg.code, arg.params.iter().join(":"), seat)
        };
        println!(
            "{:<20} {:<10} {:<11.1}% {:<14.1}",
            label,
            wins,
            win_rate,
            stats.get_avg_net_worth(seat)
        );
    }

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.games);
    println!(
        "  Outcomes: {}",
        stats
            .outcomes
            .iter()
            .map(|(kind, count)| format!("{kind:?}={count}"))
            .join(", ")
    );
    println!("  Avg Turns: {:.2}", stats.get_avg_turns());
    println!("  Avg Actions: {:.2}", stats.get_avg_actions());
    println!("  Avg Duration: {:.2?}", stats.get_avg_duration());
}
