//! Railscout CLI - Run the evolutionary search from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use railscout::{
    evolve::{MlpFactory, StopReason, TournamentEngine},
    schema::RunConfig,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [generations]", args[0]);
        eprintln!();
        eprintln!("Evolve sensor-steering strategies from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to run configuration file");
        eprintln!("  generations  Override the configured generation count");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let mut config: RunConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Some(generations) = args.get(2).and_then(|s| s.parse().ok()) {
        config.tournament.generations = generations;
    }

    println!("Railscout Evolutionary Search");
    println!("=============================");
    println!("Generations: {}", config.tournament.generations);
    println!(
        "Strategy length: start {}, max {}",
        config.strategy.starting_length, config.strategy.max_length
    );
    println!(
        "Sessions: {} training, {} testing",
        config.training.training_sessions, config.training.testing_sessions
    );
    println!();

    let model_seed = config.tournament.random_seed.unwrap_or_else(rand::random);
    config.tournament.random_seed = Some(model_seed);
    let factory = MlpFactory::new(config.training.hidden_extra, model_seed);

    let mut engine = TournamentEngine::new(config, factory).unwrap_or_else(|e| {
        eprintln!("Error setting up run: {}", e);
        std::process::exit(1);
    });
    println!("Seed: {}", engine.seed());
    println!();

    println!("Running tournament...");
    let start = Instant::now();

    let result = engine
        .run_with_callback(|progress| {
            println!(
                "  Generation {}/{}: fitness {:.6} vs {:.6}, strategy {} wins",
                progress.generation + 1,
                progress.total_generations,
                progress.first_fitness,
                progress.second_fitness,
                if progress.winner_is_first { 1 } else { 2 },
            );
        })
        .unwrap_or_else(|e| {
            eprintln!("Error during run: {}", e);
            std::process::exit(1);
        });

    let elapsed = start.elapsed();

    println!();
    if result.stop_reason == StopReason::PopulationExhausted {
        println!("Stopped early: no further distinct strategies available.");
    }
    println!(
        "Completed {} generations, {} distinct strategies admitted.",
        result.generations,
        engine.population_size()
    );
    match (result.best, result.best_fitness) {
        (Some(best), Some(fitness)) => {
            println!("Best strategy (fitness {:.6}): {}", fitness, best);
        }
        _ => println!("No strategy"),
    }
    println!(
        "Time: {:.2}s ({:.2} generations/s)",
        elapsed.as_secs_f32(),
        result.generations as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = RunConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap_or_default());
}
