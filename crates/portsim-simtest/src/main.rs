//! PortSim Headless Simulation Harness
//!
//! Drives the port controller in-process against a recording stage and
//! checks its behavior scenario by scenario. No window, no renderer.
//!
//! Usage:
//!   cargo run -p portsim-simtest
//!   cargo run -p portsim-simtest -- --verbose
//!   cargo run -p portsim-simtest -- --config port.json --json
//!
//! Set `RUST_LOG=portsim_core=debug` to watch the controller work.

use portsim_core::prelude::*;

const FRAME_MS: f64 = 1000.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    config: PortConfig,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        verbose: false,
        json: false,
        config: PortConfig {
            seed: Some(42),
            ..Default::default()
        },
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            "--config" => {
                let path = args.next().ok_or_else(|| {
                    PortError::InvalidConfig("--config needs a path".into())
                })?;
                options.config = PortConfig::from_json_file(path)?;
            }
            other => log::warn!("ignoring unknown argument {}", other),
        }
    }
    Ok(options)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    let verbose = options.verbose;
    println!("=== PortSim Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_config(verbose));

    // 2. Port layout
    results.extend(validate_layout(verbose));

    // 3. Dock assignment
    results.extend(validate_dock_assignment(verbose));

    // 4. Queueing and promotion
    results.extend(validate_queueing(verbose));

    // 5. Gate congestion
    results.extend(validate_gate(verbose));

    // 6. Ship removal
    results.extend(validate_removal(verbose));

    // 7. Long seeded run
    let snapshot = validate_long_run(&options.config, verbose, &mut results);

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if options.json {
        if let Some(snapshot) = snapshot {
            match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("failed to encode snapshot: {}", e),
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn quiet_port(config: PortConfig) -> Result<PortController<RecordingStage>> {
    let mut port = PortController::with_stage(config, RecordingStage::new())?;
    port.stop_arrivals();
    Ok(port)
}

fn run_for<S: Stage>(port: &mut PortController<S>, ms: f64) {
    let mut elapsed = 0.0;
    while elapsed < ms {
        port.update(FRAME_MS);
        elapsed += FRAME_MS;
    }
}

fn run_until<S: Stage>(
    port: &mut PortController<S>,
    limit_ms: f64,
    done: impl Fn(&PortController<S>) -> bool,
) -> bool {
    let mut elapsed = 0.0;
    while elapsed < limit_ms && !done(port) {
        port.update(FRAME_MS);
        elapsed += FRAME_MS;
    }
    done(port)
}

fn all_docks(cargo: CargoState) -> PortConfig {
    PortConfig {
        dock_cargo: vec![cargo; 4],
        seed: Some(1),
        ..Default::default()
    }
}

fn setup_failed(name: &str, e: PortError) -> Vec<TestResult> {
    vec![TestResult {
        name: name.into(),
        passed: false,
        detail: format!("port setup failed: {}", e),
    }]
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let default = PortConfig::default();
    results.push(TestResult {
        name: "config_default_valid".into(),
        passed: default.validate().is_ok(),
        detail: format!(
            "{} docks, arrival every {} ms, dwell {} ms",
            default.dock_count, default.ship_arrival_period_ms, default.ship_dwell_ms
        ),
    });

    let partial = PortConfig::from_json_str(r#"{ "dock_count": 3, "seed": 9 }"#);
    results.push(TestResult {
        name: "config_partial_json".into(),
        passed: partial
            .as_ref()
            .is_ok_and(|c| c.dock_count == 3 && c.width == 800.0),
        detail: match &partial {
            Ok(c) => format!("dock_count {} with defaults elsewhere", c.dock_count),
            Err(e) => format!("parse failed: {}", e),
        },
    });

    let rejected = PortConfig::from_json_str(r#"{ "empty_probability": 2.0 }"#);
    results.push(TestResult {
        name: "config_rejects_bad_probability".into(),
        passed: matches!(rejected, Err(PortError::InvalidConfig(_))),
        detail: match &rejected {
            Err(e) => e.to_string(),
            Ok(_) => "accepted probability 2.0".into(),
        },
    });

    if verbose {
        println!("  config checks done");
    }
    results
}

// ── 2. Port Layout ──────────────────────────────────────────────────────

fn validate_layout(verbose: bool) -> Vec<TestResult> {
    println!("--- Port Layout ---");
    let mut results = Vec::new();

    let port = match quiet_port(PortConfig::default()) {
        Ok(port) => port,
        Err(e) => return setup_failed("layout_setup", e),
    };

    let docks = port.dock_states();
    let alternating = docks.iter().all(|d| {
        d.cargo
            == if d.index % 2 == 0 {
                CargoState::Full
            } else {
                CargoState::Empty
            }
    });
    results.push(TestResult {
        name: "layout_docks_alternate".into(),
        passed: docks.len() == 4 && alternating,
        detail: format!(
            "{:?}",
            docks.iter().map(|d| d.cargo).collect::<Vec<_>>()
        ),
    });

    results.push(TestResult {
        name: "layout_all_open".into(),
        passed: docks.iter().all(|d| d.admission.is_open()) && port.gate_open(),
        detail: "docks and gate start open".into(),
    });

    let stage = port.stage();
    let scenery = stage.count(VisualKind::Water)
        + stage.count(VisualKind::GateBarrier)
        + stage.count(VisualKind::QueueMarker)
        + stage.count(VisualKind::Dock);
    results.push(TestResult {
        name: "layout_scenery_drawn".into(),
        passed: scenery == 9,
        detail: format!("{} scenery visuals", scenery),
    });

    if verbose {
        for dock in port.docks() {
            println!("  dock {} at {:?}", dock.index(), dock.position());
        }
    }
    results
}

// ── 3. Dock Assignment ──────────────────────────────────────────────────

fn validate_dock_assignment(verbose: bool) -> Vec<TestResult> {
    println!("--- Dock Assignment ---");
    let mut results = Vec::new();

    let mut port = match quiet_port(all_docks(CargoState::Full)) {
        Ok(port) => port,
        Err(e) => return setup_failed("dock_setup", e),
    };

    // Empty ship, all docks full and open: lowest index wins
    let ship = port.admit_ship(CargoState::Empty);
    run_for(&mut port, 4100.0);
    results.push(TestResult {
        name: "dock_lowest_index".into(),
        passed: port.ship_dock(ship) == Some(0) && !port.docks()[0].is_open(),
        detail: format!("assigned {:?}", port.ship_dock(ship)),
    });

    // Two same-tick arrivals get different docks
    let a = port.admit_ship(CargoState::Empty);
    let b = port.admit_ship(CargoState::Empty);
    run_for(&mut port, 4100.0);
    let (da, db) = (port.ship_dock(a), port.ship_dock(b));
    results.push(TestResult {
        name: "dock_same_tick_distinct".into(),
        passed: da.is_some() && db.is_some() && da != db,
        detail: format!("{:?} and {:?}", da, db),
    });

    // Cargo flips exactly once per visit
    let flipped = run_until(&mut port, 10_000.0, |p| {
        p.ship_phase(ship) == Some(ShipPhase::CrossingGateOut)
    });
    results.push(TestResult {
        name: "dock_cargo_exchanged_once".into(),
        passed: flipped
            && port.ship_cargo(ship) == Some(CargoState::Full)
            && port.ship_exchanges(ship) == Some(1)
            && port.docks()[0].cargo() == CargoState::Empty,
        detail: format!(
            "ship {:?} after {:?} exchanges, dock 0 {:?}",
            port.ship_cargo(ship),
            port.ship_exchanges(ship),
            port.docks()[0].cargo()
        ),
    });

    results.push(TestResult {
        name: "dock_reopens_on_departure".into(),
        passed: port.docks()[0].is_open(),
        detail: format!("dock 0 {:?}", port.docks()[0].admission()),
    });

    if verbose {
        println!("  {} events journaled", port.events().count());
    }
    results
}

// ── 4. Queueing & Promotion ─────────────────────────────────────────────

fn validate_queueing(verbose: bool) -> Vec<TestResult> {
    println!("--- Queueing & Promotion ---");
    let mut results = Vec::new();

    let mut port = match quiet_port(all_docks(CargoState::Full)) {
        Ok(port) => port,
        Err(e) => return setup_failed("queue_setup", e),
    };
    for i in 0..4 {
        if let Err(e) = port.close_dock(i) {
            return setup_failed("queue_close_docks", e);
        }
    }

    let ships: Vec<ShipId> = (0..3).map(|_| port.admit_ship(CargoState::Empty)).collect();
    run_for(&mut port, 5200.0);
    let lengths = port.queue_lengths();
    results.push(TestResult {
        name: "queue_no_open_dock".into(),
        passed: lengths.empty == 3 && lengths.full == 0,
        detail: format!("{:?}", lengths),
    });

    let queue = port.queue(CargoState::Empty);
    let ordered = ships
        .iter()
        .enumerate()
        .all(|(i, &s)| queue.available_position(s) == Some(queue.slot_position(i)));
    results.push(TestResult {
        name: "queue_slots_in_arrival_order".into(),
        passed: ordered,
        detail: format!("slot width {}", ShipQueue::slot_width()),
    });

    let released = port.release_dock(1);
    let queue = port.queue(CargoState::Empty);
    results.push(TestResult {
        name: "queue_promotes_front".into(),
        passed: released.is_ok()
            && port.ship_phase(ships[0]) == Some(ShipPhase::CrossingGateIn)
            && queue.first_ship() == Some(ships[1])
            && queue.available_position(ships[2]) == Some(queue.slot_position(1)),
        detail: format!(
            "front ship {:?}, {} still waiting",
            port.ship_phase(ships[0]),
            queue.len()
        ),
    });

    run_for(&mut port, 1100.0);
    results.push(TestResult {
        name: "queue_promoted_ship_docks".into(),
        passed: port.ship_dock(ships[0]) == Some(1),
        detail: format!("promoted ship at dock {:?}", port.ship_dock(ships[0])),
    });

    if verbose {
        println!("  stats {:?}", port.stats());
    }
    results
}

// ── 5. Gate Congestion ──────────────────────────────────────────────────

fn validate_gate(verbose: bool) -> Vec<TestResult> {
    println!("--- Gate Congestion ---");
    let mut results = Vec::new();

    let mut port = match quiet_port(all_docks(CargoState::Full)) {
        Ok(port) => port,
        Err(e) => return setup_failed("gate_setup", e),
    };

    let ship = port.admit_ship(CargoState::Empty);
    run_for(&mut port, 2400.0);
    port.set_gate_open(false);
    port.update(FRAME_MS);
    let held_at = port.ship_progress(ship).unwrap_or(0.0);
    run_for(&mut port, 3000.0);
    results.push(TestResult {
        name: "gate_holds_inbound".into(),
        passed: port.ship_paused(ship)
            && port.ship_progress(ship) == Some(held_at)
            && held_at > 0.5,
        detail: format!("held at progress {:.3}", held_at),
    });

    port.set_gate_open(true);
    port.update(FRAME_MS);
    let resumed = port.ship_progress(ship).unwrap_or(0.0);
    results.push(TestResult {
        name: "gate_resumes_inbound".into(),
        passed: !port.ship_paused(ship) && resumed > held_at,
        detail: format!("resumed at {:.3}", resumed),
    });

    // Outbound ship claims the lane past halfway and frees it on the way out
    let claimed = run_until(&mut port, 20_000.0, |p| !p.gate_open());
    let claim_progress = port.ship_progress(ship).unwrap_or(0.0);
    results.push(TestResult {
        name: "gate_outbound_claims_lane".into(),
        passed: claimed
            && port.ship_phase(ship) == Some(ShipPhase::CrossingGateOut)
            && claim_progress > 0.5,
        detail: format!("claimed at progress {:.3}", claim_progress),
    });

    let freed = run_until(&mut port, 5_000.0, |p| p.gate_open());
    results.push(TestResult {
        name: "gate_freed_after_crossing".into(),
        passed: freed && port.ship_phase(ship) == Some(ShipPhase::Exiting),
        detail: format!("ship {:?}", port.ship_phase(ship)),
    });

    if verbose {
        let stats = port.stats();
        println!(
            "  {} pauses, {} resumes",
            stats.gate_pauses, stats.gate_resumes
        );
    }
    results
}

// ── 6. Ship Removal ─────────────────────────────────────────────────────

fn validate_removal(verbose: bool) -> Vec<TestResult> {
    println!("--- Ship Removal ---");
    let mut results = Vec::new();

    let mut port = match quiet_port(all_docks(CargoState::Empty)) {
        Ok(port) => port,
        Err(e) => return setup_failed("removal_setup", e),
    };

    let ship = port.admit_ship(CargoState::Full);
    run_for(&mut port, 6000.0);
    let dock = port.ship_dock(ship);
    port.remove_ship(ship);
    run_for(&mut port, 10_000.0);
    results.push(TestResult {
        name: "removal_strands_dock".into(),
        passed: dock == Some(0) && !port.docks()[0].is_open() && port.active_ship_count() == 0,
        detail: format!("dock {:?} left {:?}", dock, port.docks()[0].admission()),
    });

    let released = port.release_dock(0);
    results.push(TestResult {
        name: "removal_release_recovers".into(),
        passed: released.is_ok() && port.docks()[0].is_open(),
        detail: "release_dock reopened the stranded dock".into(),
    });

    results.push(TestResult {
        name: "removal_visual_destroyed".into(),
        passed: port.stage().count(VisualKind::Ship) == 0,
        detail: format!("{} visuals destroyed", port.stage().destroyed()),
    });

    if verbose {
        for record in port.events() {
            println!("  {:>8.0} ms {:?}", record.at_ms, record.event);
        }
    }
    results
}

// ── 7. Long Seeded Run ──────────────────────────────────────────────────

fn validate_long_run(
    config: &PortConfig,
    verbose: bool,
    results: &mut Vec<TestResult>,
) -> Option<PortSnapshot> {
    println!("--- Long Run ---");

    let mut port = match PortController::with_stage(config.clone(), RecordingStage::new()) {
        Ok(port) => port,
        Err(e) => {
            results.extend(setup_failed("long_run_setup", e));
            return None;
        }
    };

    // Ten simulated minutes with an invariant check every simulated second
    let mut violations = Vec::new();
    let mut peak_ships = 0;
    for second in 0..600 {
        run_for(&mut port, 1000.0);
        peak_ships = peak_ships.max(port.active_ship_count());
        for v in port.invariant_violations() {
            violations.push(format!("t={}s {}", second + 1, v));
        }
    }
    results.push(TestResult {
        name: "long_run_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!("600 s clean, peak {} ships in port", peak_ships)
        } else {
            format!("{} violations, first: {}", violations.len(), violations[0])
        },
    });

    let stats = port.stats();
    results.push(TestResult {
        name: "long_run_traffic".into(),
        passed: stats.arrived >= 70 && stats.departed > 0,
        detail: format!(
            "{} arrived, {} docked, {} queued, {} departed",
            stats.arrived, stats.docked, stats.queued, stats.departed
        ),
    });

    results.push(TestResult {
        name: "long_run_exchange_per_dock".into(),
        passed: stats.exchanges >= stats.departed,
        detail: format!("{} exchanges for {} departures", stats.exchanges, stats.departed),
    });

    let snapshot = port.snapshot();

    // Stop arrivals and let traffic settle. Ships may be left waiting for a
    // dock class nobody will produce any more, but nothing else stays.
    port.stop_arrivals();
    run_for(&mut port, 120_000.0);
    let waiting = port.queue_lengths();
    let stuck_classes_have_no_dock = [CargoState::Empty, CargoState::Full]
        .into_iter()
        .filter(|&cargo| !port.queue(cargo).is_empty())
        .all(|cargo| !port.docks().iter().any(|d| d.accepts(cargo)));
    results.push(TestResult {
        name: "long_run_settles".into(),
        passed: port.active_ship_count() == waiting.total() && stuck_classes_have_no_dock,
        detail: format!(
            "{} ships left, queues {:?}",
            port.active_ship_count(),
            waiting
        ),
    });
    let stats = port.stats();

    let stage = port.shutdown();
    results.push(TestResult {
        name: "long_run_shutdown_clean".into(),
        passed: stage.live() == 0,
        detail: format!("{} visuals destroyed in total", stage.destroyed()),
    });

    if verbose {
        println!("  final stats {:?}", stats);
    }
    Some(snapshot)
}
