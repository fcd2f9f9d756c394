//! omd: CLI binary for the one-marked dice simulator.
//!
//! Subcommands:
//! - sim
//! - schemes

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use omd_core::{entropy_seed, Config, RawOrientation, ValueScheme};
use omd_logging::{
    hash_config_bytes, now_ms, NdjsonError, NdjsonWriter, RunSummaryEventV1, TrialEventV1,
    EVENT_SCHEMA_VERSION,
};
use omd_sim::{
    simulate_config, AggregateResult, BuiltinStrategy, NoopObserver, SimError, TrialObserver,
    TrialOutcome,
};

/// Writes one `trial` event per finished trial. Keeps the first write error for later.
struct EventLog {
    w: NdjsonWriter,
    run_id: String,
    error: Option<NdjsonError>,
}

impl EventLog {
    fn open(path: &Path, run_id: String) -> Result<Self, NdjsonError> {
        Ok(Self {
            w: NdjsonWriter::open_append_with_flush(path, 256)?,
            run_id,
            error: None,
        })
    }

    fn finish(mut self, summary: &RunSummaryEventV1) -> Result<(), NdjsonError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.w.write_event(summary)?;
        self.w.flush()
    }
}

impl TrialObserver for EventLog {
    fn on_trial(&mut self, trial: u32, outcome: &TrialOutcome) {
        if self.error.is_some() {
            return;
        }
        let (name, prediction, roll) = match outcome {
            TrialOutcome::Converged {
                prediction, roll, ..
            } => (
                "converged",
                Some(prediction.value()),
                Some(roll.iter().map(RawOrientation::to_string).collect()),
            ),
            TrialOutcome::Exhausted { .. } => ("exhausted", None, None),
        };
        let ev = TrialEventV1 {
            event: "trial".to_string(),
            v: EVENT_SCHEMA_VERSION,
            ts_ms: now_ms(),
            run_id: self.run_id.clone(),
            trial,
            outcome: name.to_string(),
            attempts: outcome.attempts(),
            prediction,
            roll,
        };
        if let Err(e) = self.w.write_event(&ev) {
            self.error = Some(e);
        }
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    if i + 1 >= args.len() {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    }
    args[i + 1].parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {}", args[i + 1]);
        process::exit(1);
    })
}

fn cmd_sim(args: &[String]) {
    let mut config_path: Option<PathBuf> = None;
    let mut trials: Option<u32> = None;
    let mut max_rerolls: Option<u32> = None;
    let mut seed: Option<u64> = None;
    let mut values: Option<String> = None;
    let mut no_position = false;
    let mut hidden_visible = false;
    let mut strategy_name = "single-up".to_string();
    let mut events: Option<PathBuf> = None;
    let mut json = false;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"omd sim

USAGE:
    omd sim [OPTIONS]

OPTIONS:
    --config PATH        YAML config (default: built-in defaults)
    --trials N           Number of independent trials (default: 1000)
    --max-rerolls R      Attempts per trial before giving up (default: 100)
    --seed S             RNG seed (default: config seed, else random)
    --values SCHEME      up-other | up-side-down | up-4-down | up-360-down
    --no-position        Do not report face positions
    --hidden-visible     Mask values of downward faces, present faces unordered
    --strategy NAME      single-up | always-reroll | fixed:<1-6> (default: single-up)
    --events PATH        Append NDJSON trial/run_summary events to PATH
    --json               Print the full result as JSON
"#
                );
                return;
            }
            "--config" => {
                config_path = Some(parse_value(args, i, "--config"));
                i += 2;
            }
            "--trials" => {
                trials = Some(parse_value(args, i, "--trials"));
                i += 2;
            }
            "--max-rerolls" => {
                max_rerolls = Some(parse_value(args, i, "--max-rerolls"));
                i += 2;
            }
            "--seed" => {
                seed = Some(parse_value(args, i, "--seed"));
                i += 2;
            }
            "--values" => {
                values = Some(parse_value(args, i, "--values"));
                i += 2;
            }
            "--strategy" => {
                strategy_name = parse_value(args, i, "--strategy");
                i += 2;
            }
            "--events" => {
                events = Some(parse_value(args, i, "--events"));
                i += 2;
            }
            "--no-position" => {
                no_position = true;
                i += 1;
            }
            "--hidden-visible" => {
                hidden_visible = true;
                i += 1;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown option for `omd sim`: {}", other);
                eprintln!("Run `omd sim --help` for usage.");
                process::exit(1);
            }
        }
    }

    let mut cfg = match &config_path {
        Some(p) => Config::load(p).unwrap_or_else(|e| {
            eprintln!("error: {}: {e}", p.display());
            process::exit(1);
        }),
        None => Config::default(),
    };
    if let Some(n) = trials {
        cfg.run.trials = n;
    }
    if let Some(r) = max_rerolls {
        cfg.run.max_rerolls = r;
    }
    if seed.is_some() {
        cfg.run.seed = seed;
    }
    if let Some(v) = values {
        cfg.options.values = v.parse().unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });
    }
    if no_position {
        cfg.options.position = false;
    }
    if hidden_visible {
        cfg.options.hidden_visible = true;
    }
    if let Err(e) = cfg.validate() {
        eprintln!("error: {e}");
        process::exit(1);
    }
    // Fixed up front so failed runs are replayable from the event log too.
    let seed = *cfg.run.seed.get_or_insert_with(entropy_seed);

    let mut strategy: BuiltinStrategy = strategy_name.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    let run_id = format!("omd-{}", now_ms());
    let mut log = events.as_ref().map(|p| {
        EventLog::open(p, run_id.clone()).unwrap_or_else(|e| {
            eprintln!("error: {}: {e}", p.display());
            process::exit(1);
        })
    });

    eprintln!(
        "Running simulation ({} trials, max {} attempts, scheme {})...",
        cfg.run.trials, cfg.run.max_rerolls, cfg.options.values
    );
    let result = match log.as_mut() {
        Some(l) => simulate_config(&mut strategy, &cfg, l),
        None => simulate_config(&mut strategy, &cfg, &mut NoopObserver),
    };

    if let Some(l) = log {
        let config_hash = cfg.to_yaml().ok().map(|y| hash_config_bytes(y.as_bytes()));
        let summary = summary_event(&run_id, &cfg, &strategy_name, config_hash, &result);
        if let Err(e) = l.finish(&summary) {
            eprintln!("warning: event log incomplete: {e}");
        }
    }

    match result {
        Ok(r) => {
            if json {
                match serde_json::to_string_pretty(&r) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        process::exit(1);
                    }
                }
            } else {
                print_report(&r);
            }
        }
        Err(e) => {
            if let SimError::EmptyConvergence { trials, .. } = e {
                println!("seed: {seed}");
                println!("converged trials: 0% 0 of {trials}");
            }
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn summary_event(
    run_id: &str,
    cfg: &Config,
    strategy: &str,
    config_hash: Option<String>,
    result: &Result<AggregateResult, SimError>,
) -> RunSummaryEventV1 {
    let mut ev = RunSummaryEventV1 {
        event: "run_summary".to_string(),
        v: EVENT_SCHEMA_VERSION,
        ts_ms: now_ms(),
        run_id: run_id.to_string(),
        seed: cfg.run.seed,
        config_hash,
        scheme: cfg.options.values.to_string(),
        strategy: strategy.to_string(),
        trials: cfg.run.trials,
        converged: 0,
        exhausted: 0,
        attempts: 0,
        histogram: Vec::new(),
        chi2: None,
        cdf: None,
        error: None,
    };
    match result {
        Ok(r) => {
            ev.seed = r.seed;
            ev.converged = r.stats.converged;
            ev.exhausted = r.stats.exhausted;
            ev.attempts = r.stats.attempts;
            ev.histogram = r.histogram.to_vec();
            ev.chi2 = Some(r.chi2);
            ev.cdf = Some(r.cdf);
        }
        Err(e) => {
            if let SimError::EmptyConvergence { stats, .. } = e {
                ev.converged = stats.converged;
                ev.exhausted = stats.exhausted;
                ev.attempts = stats.attempts;
            }
            ev.error = Some(e.to_string());
        }
    }
    ev
}

fn print_report(r: &AggregateResult) {
    let s = r.stats;
    if let Some(seed) = r.seed {
        println!("seed: {seed}");
    }
    println!(
        "converged trials: {}% {}",
        100.0 * s.convergence_rate(),
        s.converged
    );
    println!("mean attempts per trial: {:.2}", s.mean_attempts());
    println!("histogram");
    for (v, (p, c)) in r.histogram.iter().zip(r.counts.iter()).enumerate() {
        println!("\t{}: {:.4} ({})", v + 1, p, c);
    }
    println!("chi2: {}\tcdf: {}", r.chi2, r.cdf);
}

fn cmd_schemes() {
    for s in ValueScheme::ALL {
        println!("{:<14} {}", s.name(), s.description());
    }
}

fn print_help() {
    eprintln!(
        r#"omd - one-marked dice simulator

USAGE:
    omd <COMMAND> [OPTIONS]

COMMANDS:
    sim         Run a simulation and print the goodness-of-fit report
    schemes     List observability schemes

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `omd sim --help` for simulation options.
"#
    );
}

fn print_version() {
    println!("omd {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_help();
        process::exit(1);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => print_help(),
        "-V" | "--version" => print_version(),
        "sim" => cmd_sim(&args[2..]),
        "schemes" => cmd_schemes(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            process::exit(1);
        }
    }
}
