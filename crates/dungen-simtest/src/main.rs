//! Dungen Headless Generation Harness
//!
//! Generates seeded dungeons from the demo catalog (or a spec file) and
//! checks every layout. Runs entirely in-process, no rendering.
//!
//! Usage:
//!   cargo run -p dungen-simtest
//!   cargo run -p dungen-simtest -- --seed 7 --runs 50 --verbose
//!   cargo run -p dungen-simtest -- --spec my_dungeon.json --json layout.json

use dungen_core::persistence::{export_json, load_dungeon, save_dungeon};
use dungen_core::prelude::*;
use dungen_core::validation::{validate_layout, Severity};
use dungen_logic::selection::{pick_weighted, total_weight};
use tracing_subscriber::EnvFilter;

// ── Demo catalog (embedded so the harness runs anywhere) ────────────────
const DEMO_SPEC_JSON: &str = include_str!("../../../data/demo_catalog.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    seed: u64,
    runs: u64,
    verbose: bool,
    json_out: Option<String>,
    spec_path: Option<String>,
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_options() -> Result<Options, String> {
    let args: Vec<String> = std::env::args().collect();
    let number = |flag: &str, default: u64| -> Result<u64, String> {
        match arg_value(&args, flag) {
            Some(v) => v
                .parse()
                .map_err(|_| format!("{} expects a number, got `{}`", flag, v)),
            None => Ok(default),
        }
    };
    Ok(Options {
        seed: number("--seed", 1)?,
        runs: number("--runs", 20)?,
        verbose: args.iter().any(|a| a == "--verbose"),
        json_out: arg_value(&args, "--json"),
        spec_path: arg_value(&args, "--spec"),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let options = match parse_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    log::info!(
        "Harness starting at seed {} for {} runs",
        options.seed,
        options.runs
    );
    println!("=== Dungen Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Spec loading
    let spec = match load_spec(&options) {
        Ok(spec) => {
            results.push(TestResult {
                name: "spec_valid".into(),
                passed: true,
                detail: format!(
                    "{} root(s), {} room template(s), target {}",
                    spec.catalog.roots.len(),
                    spec.catalog.rooms.len(),
                    spec.config.target_tile_size
                ),
            });
            Some(spec)
        }
        Err(detail) => {
            results.push(TestResult {
                name: "spec_valid".into(),
                passed: false,
                detail,
            });
            None
        }
    };

    if let Some(spec) = &spec {
        // 2. Seeded generation sweep
        results.extend(validate_seeded_runs(spec, &options));

        // 3. Determinism and path policies
        results.extend(validate_determinism(spec, options.seed));

        // 4. Save/load round trip
        results.extend(validate_persistence(spec, options.seed));
    }

    // 5. Weighted selection statistics
    results.extend(validate_weighted_selection(options.verbose));

    // 6. Retry budget under an always-blocked oracle
    results.extend(validate_retry_budget());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_spec(options: &Options) -> Result<DungeonSpec, String> {
    let json = match &options.spec_path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?,
        None => DEMO_SPEC_JSON.to_string(),
    };
    let spec = DungeonSpec::from_json(&json).map_err(|e| e.to_string())?;
    spec.validate().map_err(|e| e.to_string())?;
    Ok(spec)
}

// ── 2. Seeded runs ──────────────────────────────────────────────────────

fn validate_seeded_runs(spec: &DungeonSpec, options: &Options) -> Vec<TestResult> {
    println!("--- Seeded Generation ({} runs) ---", options.runs);
    let mut results = Vec::new();
    let target = spec.config.target_tile_size;
    let tolerance = spec.config.overlap_tolerance;
    let mut generator = DungeonGenerator::from_spec(spec.clone());

    let mut succeeded = 0u64;
    let mut failures = Vec::new();
    let mut layout_errors = Vec::new();
    let mut path_warnings = 0usize;
    let mut total_attempts = 0u64;
    let mut deepest = 0u32;

    for seed in options.seed..options.seed + options.runs {
        let graph = match generator.generate_seeded(seed) {
            Ok(g) => g,
            Err(e) => {
                failures.push(format!("seed {}: {}", seed, e));
                continue;
            }
        };
        succeeded += 1;
        total_attempts += graph.report().attempts as u64;
        deepest = deepest.max(graph.report().max_depth);

        for issue in validate_layout(&graph, target, tolerance) {
            match issue.severity {
                Severity::Error => layout_errors.push(format!("seed {}: {}", seed, issue.message)),
                Severity::Warning => path_warnings += 1,
            }
        }

        if options.verbose {
            println!(
                "  seed {:>4}: {} tiles, {} attempt(s), depth {}, path {}",
                seed,
                graph.len(),
                graph.report().attempts,
                graph.report().max_depth,
                graph.main_path().len()
            );
        }

        if seed == options.seed {
            if let Some(path) = &options.json_out {
                let written = export_json(&graph)
                    .map_err(|e| e.to_string())
                    .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
                results.push(TestResult {
                    name: "json_export".into(),
                    passed: written.is_ok(),
                    detail: match written {
                        Ok(()) => format!("seed {} layout written to {}", seed, path),
                        Err(e) => e,
                    },
                });
            }
        }
    }

    results.push(TestResult {
        name: "runs_complete".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!(
                "{} runs reached {} tiles, {:.2} attempts on average",
                succeeded,
                target,
                total_attempts as f64 / succeeded.max(1) as f64
            )
        } else {
            failures.join("; ")
        },
    });

    results.push(TestResult {
        name: "layouts_valid".into(),
        passed: layout_errors.is_empty(),
        detail: if layout_errors.is_empty() {
            format!(
                "no overlaps, open sockets or broken doorways; max depth {}",
                deepest
            )
        } else {
            layout_errors.join("; ")
        },
    });

    results.push(TestResult {
        name: "main_path_adjacent".into(),
        passed: path_warnings == 0,
        detail: format!("{} main path warnings", path_warnings),
    });

    results
}

// ── 3. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(spec: &DungeonSpec, seed: u64) -> Vec<TestResult> {
    println!("--- Determinism & Path Policy ---");
    let mut results = Vec::new();

    let mut scan = DungeonGenerator::from_spec(spec.clone());
    let mut replay = DungeonGenerator::from_spec(spec.clone());
    let mut chain_spec = spec.clone();
    chain_spec.config.path_policy = PathPolicy::ParentChain;
    let mut chain = DungeonGenerator::from_spec(chain_spec);

    match (
        scan.generate_seeded(seed),
        replay.generate_seeded(seed),
        chain.generate_seeded(seed),
    ) {
        (Ok(a), Ok(b), Ok(c)) => {
            results.push(TestResult {
                name: "same_seed_same_layout".into(),
                passed: a.snapshots() == b.snapshots(),
                detail: format!("seed {} replayed {} tiles", seed, a.len()),
            });
            results.push(TestResult {
                name: "depth_scan_equals_parent_chain".into(),
                passed: a.main_path() == c.main_path(),
                detail: format!(
                    "depth scan {:?} / parent chain {:?}",
                    a.main_path().iter().map(|t| t.0).collect::<Vec<_>>(),
                    c.main_path().iter().map(|t| t.0).collect::<Vec<_>>()
                ),
            });
        }
        (a, b, c) => {
            let err = [a.err(), b.err(), c.err()]
                .into_iter()
                .flatten()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            results.push(TestResult {
                name: "same_seed_same_layout".into(),
                passed: false,
                detail: err,
            });
        }
    }

    results
}

// ── 4. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(spec: &DungeonSpec, seed: u64) -> Vec<TestResult> {
    println!("--- Save / Load ---");
    let mut generator = DungeonGenerator::from_spec(spec.clone());
    let outcome = generator
        .generate_seeded(seed)
        .map_err(|e| e.to_string())
        .and_then(|graph| {
            let mut buffer = Vec::new();
            save_dungeon(&mut buffer, &graph, Some(seed)).map_err(|e| e.to_string())?;
            let loaded = load_dungeon(&buffer[..]).map_err(|e| e.to_string())?;
            let same = loaded.graph.snapshots() == graph.snapshots()
                && loaded.graph.main_path() == graph.main_path();
            Ok((same, buffer.len()))
        });

    vec![match outcome {
        Ok((same, bytes)) => TestResult {
            name: "save_load_roundtrip".into(),
            passed: same,
            detail: format!("{} bytes", bytes),
        },
        Err(e) => TestResult {
            name: "save_load_roundtrip".into(),
            passed: false,
            detail: e,
        },
    }]
}

// ── 5. Weighted selection ───────────────────────────────────────────────

fn validate_weighted_selection(verbose: bool) -> Vec<TestResult> {
    println!("--- Weighted Selection ---");
    let mut results = Vec::new();

    let weights = [1.0f32, 2.0, 1.0];
    let total = total_weight(&weights);
    let mut rng = seeded(2024);
    let draws = 100_000;
    let mut counts = [0usize; 3];
    let mut fell_through = 0usize;
    for _ in 0..draws {
        match pick_weighted(&weights, rng.next_unit() * total) {
            Some(i) => counts[i] += 1,
            None => fell_through += 1,
        }
    }
    let freqs: Vec<f64> = counts.iter().map(|c| *c as f64 / draws as f64).collect();
    let expected = [0.25, 0.5, 0.25];
    let converged = freqs
        .iter()
        .zip(expected)
        .all(|(f, e)| (f - e).abs() < 0.01);

    results.push(TestResult {
        name: "selection_converges".into(),
        passed: converged && fell_through == 0,
        detail: format!(
            "[{:.3}, {:.3}, {:.3}] over {} draws",
            freqs[0], freqs[1], freqs[2], draws
        ),
    });

    let skipped = pick_weighted(&[0.0, 1.0], 0.0);
    results.push(TestResult {
        name: "selection_skips_zero_weight".into(),
        passed: skipped == Some(1),
        detail: format!("draw 0 over [0, 1] → {:?}", skipped),
    });

    if verbose {
        println!("  counts: {:?}", counts);
    }

    results
}

// ── 6. Retry budget ─────────────────────────────────────────────────────

struct AlwaysBlocked;

impl OccupancyOracle for AlwaysBlocked {
    fn query_overlap(&self, _volume: &Aabb, _pose: &Pose) -> Vec<TileId> {
        vec![TileId(u32::MAX)]
    }
    fn insert(&mut self, _id: TileId, _volume: &Aabb, _pose: &Pose) {}
    fn clear(&mut self) {}
}

#[derive(Default)]
struct AttemptCounter {
    started: u32,
    failed: u32,
}

impl EventSink for AttemptCounter {
    fn send(&mut self, event: GenerationEvent) {
        match event {
            GenerationEvent::AttemptStarted { .. } => self.started += 1,
            GenerationEvent::AttemptFailed { .. } => self.failed += 1,
            _ => {}
        }
    }
}

fn validate_retry_budget() -> Vec<TestResult> {
    println!("--- Retry Budget ---");
    let catalog = Catalog::new()
        .with_root(TileTemplate::room("hub", 4.0, 3.0, 4.0).with_face_sockets(&Face::ALL))
        .with_room(TileTemplate::room("cell", 4.0, 3.0, 4.0).with_face_sockets(&Face::ALL), 1.0);
    let config = GeneratorConfig::default()
        .with_target(5)
        .with_max_attempts(3)
        .with_chance(ChanceCurve::constant(1.0));
    let mut generator = DungeonGenerator::with_oracle(config, catalog, AlwaysBlocked);
    let mut counter = AttemptCounter::default();

    let outcome = generator.generate_with(
        &mut seeded(0),
        &mut counter,
        &mut dungen_core::events::Unpaced,
    );
    let exhausted = matches!(outcome, Err(GenerationError::RetryBudgetExceeded { attempts: 3 }));

    vec![TestResult {
        name: "retry_budget_exact".into(),
        passed: exhausted && counter.started == 3 && counter.failed == 3,
        detail: format!(
            "{} attempts started, {} failed, outcome {}",
            counter.started,
            counter.failed,
            match outcome {
                Ok(_) => "success".to_string(),
                Err(e) => e.to_string(),
            }
        ),
    }]
}
