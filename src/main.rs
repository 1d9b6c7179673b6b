//! hedging-engine CLI
//!
//! Hedge a liability schedule with a bond universe from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Run every strategy on a scenario file
//! hedging-engine hedge --input scenario.json
//!
//! # Duration matching only, as JSON
//! hedging-engine hedge --input scenario.json --strategy duration --format json
//!
//! # Rate sensitivity of the cash-flow matched portfolio
//! hedging-engine sensitivity --input scenario.json --strategy cashflow
//!
//! # Generate a random scenario
//! hedging-engine generate --liabilities 5 --bonds 8 --seed 42
//! ```
//!
//! Set `RUST_LOG=debug` to trace solver iterations.

use hedging_engine::core::scenario::Scenario;
use hedging_engine::optimization::{HedgeResult, HedgingOptimizer, OptimizerConfig, Strategy};
use hedging_engine::simulation::comparison::PortfolioComparison;
use hedging_engine::simulation::scenario_generator::{generate_random_scenario, ScenarioConfig};
use hedging_engine::simulation::sensitivity::{linspace, sensitivity_analysis};
use serde::Serialize;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"hedging-engine - liability hedging with coupon bonds

USAGE:
    hedging-engine <COMMAND> [OPTIONS]

COMMANDS:
    hedge         Build hedging portfolios for a scenario
    sensitivity   Revalue a hedge under parallel curve shifts
    generate      Generate a random scenario (for testing)
    help          Show this message

OPTIONS (hedge):
    --input <FILE>        Path to JSON scenario file
    --strategy <NAME>     initial, duration, cashflow or all (default: all)
    --config <FILE>       JSON optimizer configuration
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (sensitivity):
    --input <FILE>        Path to JSON scenario file
    --strategy <NAME>     initial, duration (default) or cashflow
    --config <FILE>       JSON optimizer configuration
    --min-shift <RATE>    Smallest shift as a decimal (default: -0.02)
    --max-shift <RATE>    Largest shift as a decimal (default: 0.02)
    --steps <N>           Number of shifts (default: 9)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (generate):
    --liabilities <N>     Number of liabilities (default: 5)
    --bonds <N>           Number of bonds (default: 8)
    --horizon <YEARS>     Latest liability date (default: 10)
    --seed <N>            Seed for a reproducible scenario
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    hedging-engine hedge --input scenario.json
    hedging-engine hedge --input scenario.json --strategy cashflow --format json
    hedging-engine sensitivity --input scenario.json --steps 17
    hedging-engine generate --liabilities 8 --horizon 15 --output scenario.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

/// Advance past `flag` and return its value.
fn next_value(args: &[String], i: &mut usize, expected: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires {}", args[*i - 1], expected)))
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, expected: &str) -> T {
    let raw = next_value(args, i, expected);
    raw.parse()
        .unwrap_or_else(|_| fail(format!("{} requires {}, got '{}'", args[*i - 1], expected, raw)))
}

fn parse_strategy(name: &str) -> Option<Strategy> {
    match name {
        "initial" | "bucketing" => Some(Strategy::MaturityBucketing),
        "duration" => Some(Strategy::DurationMatching),
        "cashflow" | "cash-flow" => Some(Strategy::CashFlowMatching),
        _ => None,
    }
}

fn load_scenario(path: &str) -> Scenario {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading file '{}': {}", path, e)));

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing scenario: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "liabilities": [{{ "time_years": 1, "amount": 1000000 }}],
  "bonds": [{{ "maturity_years": 2, "coupon_rate": 0.03, "face_value": 1000 }}],
  "curve": {{ "times": [1, 2, 5, 10], "rates": [0.02, 0.025, 0.03, 0.035] }}
}}"#
        );
        process::exit(1);
    })
}

fn load_config(path: Option<&str>) -> OptimizerConfig {
    let Some(path) = path else {
        return OptimizerConfig::default();
    };
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading config '{}': {}", path, e)));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| fail(format!("Error parsing config '{}': {}", path, e)))
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(format!("Error serializing output: {}", e)));
    println!("{}", json);
}

fn run_strategy(optimizer: &HedgingOptimizer<'_>, strategy: Strategy) -> HedgeResult {
    optimizer
        .run(strategy)
        .unwrap_or_else(|e| fail(format!("{} failed: {}", strategy, e)))
}

fn cmd_hedge(args: &[String]) {
    let mut input_path = None;
    let mut config_path = None;
    let mut strategy_name = "all".to_string();
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(next_value(args, &mut i, "a file path")),
            "--config" => config_path = Some(next_value(args, &mut i, "a file path")),
            "--strategy" => strategy_name = next_value(args, &mut i, "a strategy name"),
            "--format" => format = next_value(args, &mut i, "'text' or 'json'"),
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("Error: --input <FILE> is required"));
    let strategies = if strategy_name == "all" {
        Strategy::ALL.to_vec()
    } else {
        match parse_strategy(&strategy_name) {
            Some(strategy) => vec![strategy],
            None => fail(format!("Unknown strategy: {}", strategy_name)),
        }
    };

    let scenario = load_scenario(&path);
    let config = load_config(config_path.as_deref());
    let optimizer = HedgingOptimizer::from_scenario(&scenario).with_config(config);
    log::info!(
        "hedging {} liabilities with {} bonds",
        scenario.liabilities.len(),
        scenario.bonds.len()
    );

    let results: Vec<HedgeResult> = strategies
        .iter()
        .map(|&strategy| run_strategy(&optimizer, strategy))
        .collect();

    if format == "json" {
        print_json(&results);
        return;
    }

    for result in &results {
        println!("{}", result);
    }

    let initial = results
        .iter()
        .find(|r| r.strategy == Strategy::MaturityBucketing);
    let optimized = results
        .iter()
        .find(|r| r.strategy == Strategy::DurationMatching && r.success);
    if let (Some(initial), Some(optimized)) = (initial, optimized) {
        let comparison = PortfolioComparison::new(
            &scenario.liabilities,
            &scenario.bonds,
            &initial.quantities,
            &optimized.quantities,
            &scenario.curve,
        );
        println!("{}", comparison);
    }
}

fn cmd_sensitivity(args: &[String]) {
    let mut input_path = None;
    let mut config_path = None;
    let mut strategy_name = "duration".to_string();
    let mut format = "text".to_string();
    let mut min_shift = -0.02;
    let mut max_shift = 0.02;
    let mut steps = 9usize;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(next_value(args, &mut i, "a file path")),
            "--config" => config_path = Some(next_value(args, &mut i, "a file path")),
            "--strategy" => strategy_name = next_value(args, &mut i, "a strategy name"),
            "--format" => format = next_value(args, &mut i, "'text' or 'json'"),
            "--min-shift" => min_shift = parse_value(args, &mut i, "a number"),
            "--max-shift" => max_shift = parse_value(args, &mut i, "a number"),
            "--steps" => steps = parse_value(args, &mut i, "a number"),
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("Error: --input <FILE> is required"));
    let strategy = parse_strategy(&strategy_name)
        .unwrap_or_else(|| fail(format!("Unknown strategy: {}", strategy_name)));

    let scenario = load_scenario(&path);
    let config = load_config(config_path.as_deref());
    let optimizer = HedgingOptimizer::from_scenario(&scenario).with_config(config);
    let hedge = run_strategy(&optimizer, strategy);
    if !hedge.success {
        fail(format!("{} did not produce a hedge: {}", strategy, hedge.message));
    }

    let report = sensitivity_analysis(
        &scenario.liabilities,
        &scenario.bonds,
        &hedge.quantities,
        &scenario.curve,
        &linspace(min_shift, max_shift, steps),
    );

    if format == "json" {
        print_json(&report);
    } else {
        println!("Strategy: {}\n", strategy);
        println!("{}", report);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = ScenarioConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--liabilities" => config.liability_count = parse_value(args, &mut i, "a number"),
            "--bonds" => config.bond_count = parse_value(args, &mut i, "a number"),
            "--horizon" => config.horizon_years = parse_value(args, &mut i, "a number"),
            "--seed" => config.seed = Some(parse_value(args, &mut i, "a number")),
            "--output" => output_path = Some(next_value(args, &mut i, "a file path")),
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let scenario = generate_random_scenario(&config)
        .unwrap_or_else(|e| fail(format!("Error generating scenario: {}", e)));
    let json = serde_json::to_string_pretty(&scenario)
        .unwrap_or_else(|e| fail(format!("Error serializing scenario: {}", e)));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("Error writing to '{}': {}", path, e)));
        eprintln!(
            "Generated {} liabilities and {} bonds → {}",
            scenario.liabilities.len(),
            scenario.bonds.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "hedge" => cmd_hedge(rest),
        "sensitivity" => cmd_sensitivity(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
