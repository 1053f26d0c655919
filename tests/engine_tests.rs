//! Engine behavior validation tests
//!
//! Exercises the public simulation API: lifecycle control, the
//! traffic-light state machine, the rule agent's priority order, bounded
//! histories, and the shared handle.

use std::collections::HashMap;
use std::time::Duration;

use smart_intersection::sim::{
    Axis, DecisionRule, Direction, EngineError, LightColor, LightController, LightView,
    MetricsRecorder, MetricsSnapshot, PerDirection, Perception, RuleAgent, RunStatus, SimConfig,
    SimEngine, SimHandle, Vehicle, VehicleId, VehicleKind, VehiclePopulation, CsvLog,
    DECISION_HISTORY_CAP, METRICS_HISTORY_CAP, SPEED_SCALE,
};

fn default_engine() -> SimEngine {
    SimEngine::new(SimConfig::default()).expect("default config is valid")
}

// ── Lifecycle ─────────────────────────────────────────────────────────────

#[test]
fn lifecycle_transitions_and_rejections() {
    let mut engine = default_engine();
    assert_eq!(engine.status(), RunStatus::Idle);

    // Stepping before start is rejected without mutating anything.
    assert!(matches!(
        engine.step(0.1),
        Err(EngineError::Lifecycle { op: "step", .. })
    ));
    assert_eq!(engine.sim_time(), 0.0);

    assert_eq!(engine.start().unwrap(), RunStatus::Running);
    assert!(matches!(
        engine.start(),
        Err(EngineError::Lifecycle { op: "start", .. })
    ));

    assert_eq!(engine.pause().unwrap(), RunStatus::Paused);
    let frozen = engine.sim_time();
    engine.step(0.1).unwrap(); // no-op while paused
    assert_eq!(engine.sim_time(), frozen);

    assert_eq!(engine.resume().unwrap(), RunStatus::Running);
    assert_eq!(engine.stop().unwrap(), RunStatus::Stopped);
    assert!(engine.resume().is_err());

    // A stopped engine can be started again.
    assert_eq!(engine.start().unwrap(), RunStatus::Running);
}

#[test]
fn queries_before_first_tick_report_no_data() {
    let engine = default_engine();
    assert!(matches!(engine.summary(), Err(EngineError::NoData)));
    assert!(matches!(engine.timeseries(), Err(EngineError::NoData)));
    assert!(matches!(
        engine.decision_history(),
        Err(EngineError::NoData)
    ));
    assert!(matches!(engine.vehicle_stats(), Err(EngineError::NoData)));
}

#[test]
fn invalid_step_is_rejected() {
    let mut engine = default_engine();
    engine.start().unwrap();

    assert!(matches!(engine.step(0.0), Err(EngineError::InvalidStep(_))));
    assert!(matches!(
        engine.step(-0.5),
        Err(EngineError::InvalidStep(_))
    ));
    assert!(matches!(
        engine.step(f64::NAN),
        Err(EngineError::InvalidStep(_))
    ));
    assert_eq!(engine.sim_time(), 0.0);
}

#[test]
fn reset_restores_a_fresh_idle_engine() {
    let mut engine = default_engine();
    engine.start().unwrap();
    for _ in 0..20 {
        engine.step(0.1).unwrap();
    }
    assert!(engine.sim_time() > 0.0);

    assert_eq!(engine.reset(), RunStatus::Idle);
    assert_eq!(engine.sim_time(), 0.0);
    assert_eq!(*engine.config(), SimConfig::default());
    assert!(matches!(engine.summary(), Err(EngineError::NoData)));
}

// ── Configuration ─────────────────────────────────────────────────────────

#[test]
fn invalid_config_rejected_and_state_unchanged() {
    let mut engine = default_engine();

    let bad = SimConfig {
        spawn_rate: 0.0,
        ..SimConfig::default()
    };
    assert!(matches!(
        engine.update_config(bad),
        Err(EngineError::InvalidConfig(_))
    ));

    let bad = SimConfig {
        queue_threshold: 0,
        ..SimConfig::default()
    };
    assert!(matches!(
        engine.update_config(bad),
        Err(EngineError::InvalidConfig(_))
    ));

    engine.start().unwrap();
    engine.step(0.1).unwrap();
    assert_eq!(*engine.config(), SimConfig::default());
}

#[test]
fn config_update_takes_effect_on_next_tick() {
    let mut engine = default_engine();
    engine.start().unwrap();

    let updated = SimConfig {
        queue_threshold: 3,
        green_time: 45.0,
        ..SimConfig::default()
    };
    engine.update_config(updated.clone()).unwrap();

    // Staged, not yet active.
    assert_eq!(*engine.config(), SimConfig::default());
    engine.step(0.1).unwrap();
    assert_eq!(*engine.config(), updated);
}

// ── Traffic-light state machine ───────────────────────────────────────────

/// Advance the controller by `seconds` using an exactly-representable dt.
fn advance_by(lights: &mut LightController, seconds: f64, green_time: f64) {
    let steps = (seconds / 0.25).round() as usize;
    for _ in 0..steps {
        lights.advance(0.25, green_time);
    }
}

#[test]
fn light_cycle_follows_four_phases() {
    let mut lights = LightController::new(30.0);
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Green);
    assert_eq!(lights.axis_color(Axis::EastWest), LightColor::Red);
    assert!(lights.can_go(Direction::North));
    assert!(lights.can_go(Direction::South));
    assert!(!lights.can_go(Direction::East));

    advance_by(&mut lights, 30.0, 30.0);
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Yellow);
    assert!(!lights.can_go(Direction::North)); // yellow is not go

    advance_by(&mut lights, 5.0, 30.0);
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Red);
    assert_eq!(lights.axis_color(Axis::EastWest), LightColor::Green);

    advance_by(&mut lights, 30.0, 30.0);
    assert_eq!(lights.axis_color(Axis::EastWest), LightColor::Yellow);

    advance_by(&mut lights, 5.0, 30.0);
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Green);
    assert_eq!(lights.axis_color(Axis::EastWest), LightColor::Red);
}

fn exactly_one_axis_non_red(lights: &LightView) -> bool {
    let ns_non_red = lights.north_south != LightColor::Red;
    let ew_non_red = lights.east_west != LightColor::Red;
    ns_non_red != ew_non_red
}

#[test]
fn exactly_one_axis_is_non_red_across_many_ticks() {
    let mut lights = LightController::new(30.0);
    for _ in 0..2000 {
        lights.advance(0.25, 30.0);
        let ns_non_red = lights.axis_color(Axis::NorthSouth) != LightColor::Red;
        let ew_non_red = lights.axis_color(Axis::EastWest) != LightColor::Red;
        assert!(ns_non_red != ew_non_red);
    }
}

#[test]
fn emergency_override_pre_empts_yellow_and_freezes_timer() {
    let mut lights = LightController::new(30.0);
    advance_by(&mut lights, 30.0, 30.0); // NS yellow
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Yellow);

    lights.activate_emergency(Direction::North);
    assert!(lights.emergency_mode());
    assert_eq!(lights.emergency_direction(), Some(Direction::North));
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Green);
    assert_eq!(lights.axis_color(Axis::EastWest), LightColor::Red);

    // Timer is frozen: no amount of advancing transitions the lights.
    let remaining = lights.time_remaining();
    advance_by(&mut lights, 120.0, 30.0);
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Green);
    assert_eq!(lights.time_remaining(), remaining);

    // Extension requests during the override are ignored.
    let duration = lights.phase_duration();
    lights.extend_current_phase(10.0);
    assert_eq!(lights.phase_duration(), duration);

    lights.deactivate_emergency();
    assert!(!lights.emergency_mode());
    assert_eq!(lights.emergency_direction(), None);
    // Duration retained, timer restarted.
    assert_eq!(lights.phase_duration(), duration);
    assert_eq!(lights.time_remaining(), duration);
}

// ── Rule agent ────────────────────────────────────────────────────────────

#[test]
fn emergency_scenario_forces_east_west_green() {
    let mut lights = LightController::new(30.0); // EW starts red
    let mut agent = RuleAgent::new();

    let perception = Perception {
        queues: PerDirection {
            east: 1,
            ..PerDirection::default()
        },
        emergency: Some(Direction::East),
        ..Perception::default()
    };

    agent.decide(10.0, &perception, &mut lights, &SimConfig::default());

    assert!(lights.emergency_mode());
    assert_eq!(lights.axis_color(Axis::EastWest), LightColor::Green);
    assert_eq!(lights.axis_color(Axis::NorthSouth), LightColor::Red);

    let decision = agent.last_decision().unwrap();
    assert_eq!(decision.rule, DecisionRule::Emergency);
    assert_eq!(decision.action, "green_east");
}

#[test]
fn emergency_wins_over_simultaneous_queue_pressure() {
    let mut lights = LightController::new(30.0);
    let mut agent = RuleAgent::new();

    let perception = Perception {
        queues: PerDirection {
            north: 50, // far over the queue threshold, and north is green
            ..PerDirection::default()
        },
        emergency: Some(Direction::West),
        ..Perception::default()
    };

    agent.decide(1.0, &perception, &mut lights, &SimConfig::default());
    assert_eq!(
        agent.last_decision().unwrap().rule,
        DecisionRule::Emergency
    );
    assert!(lights.emergency_mode());
}

#[test]
fn override_clears_once_no_emergency_is_perceived() {
    let mut lights = LightController::new(30.0);
    let mut agent = RuleAgent::new();

    let perception = Perception {
        emergency: Some(Direction::South),
        ..Perception::default()
    };
    agent.decide(1.0, &perception, &mut lights, &SimConfig::default());
    assert!(lights.emergency_mode());

    agent.decide(2.0, &Perception::default(), &mut lights, &SimConfig::default());
    assert!(!lights.emergency_mode());
    // The clear is not itself a rule match; the tick still records one.
    assert_eq!(agent.last_decision().unwrap().rule, DecisionRule::Standard);
}

#[test]
fn queue_extension_scenario_adds_exactly_ten_seconds() {
    let mut lights = LightController::new(30.0); // NS green
    let mut agent = RuleAgent::new();

    let perception = Perception {
        queues: PerDirection {
            north: 11,
            ..PerDirection::default()
        },
        ..Perception::default()
    };

    agent.decide(5.0, &perception, &mut lights, &SimConfig::default());

    assert_eq!(lights.phase_duration(), 40.0);
    let decision = agent.last_decision().unwrap();
    assert_eq!(decision.rule, DecisionRule::QueueExtend);
    assert!(decision.reason.contains("north"));
}

#[test]
fn wait_extension_scenario_adds_exactly_five_seconds() {
    let mut lights = LightController::new(30.0);
    let mut agent = RuleAgent::new();

    let perception = Perception {
        queues: PerDirection {
            south: 2,
            ..PerDirection::default()
        },
        mean_waits: PerDirection {
            south: 61.0,
            ..PerDirection::default()
        },
        ..Perception::default()
    };

    agent.decide(5.0, &perception, &mut lights, &SimConfig::default());

    assert_eq!(lights.phase_duration(), 35.0);
    assert_eq!(
        agent.last_decision().unwrap().rule,
        DecisionRule::WaitExtend
    );
}

#[test]
fn standard_tick_leaves_phase_duration_unchanged() {
    let mut lights = LightController::new(30.0);
    let mut agent = RuleAgent::new();

    agent.decide(0.1, &Perception::default(), &mut lights, &SimConfig::default());

    assert_eq!(lights.phase_duration(), 30.0);
    assert_eq!(agent.last_decision().unwrap().rule, DecisionRule::Standard);
}

#[test]
fn extensions_never_apply_to_a_red_direction() {
    let mut lights = LightController::new(30.0); // EW red
    let mut agent = RuleAgent::new();

    let perception = Perception {
        queues: PerDirection {
            east: 25,
            ..PerDirection::default()
        },
        mean_waits: PerDirection {
            west: 90.0,
            ..PerDirection::default()
        },
        ..Perception::default()
    };

    agent.decide(5.0, &perception, &mut lights, &SimConfig::default());

    // Pressure on the red axis has no effect until the cycle reaches it.
    assert_eq!(lights.phase_duration(), 30.0);
    assert_eq!(agent.last_decision().unwrap().rule, DecisionRule::Standard);
}

#[test]
fn first_qualifying_direction_wins_queue_extension() {
    let mut lights = LightController::new(30.0); // both NS directions green
    let mut agent = RuleAgent::new();

    let perception = Perception {
        queues: PerDirection {
            north: 12,
            south: 40,
            ..PerDirection::default()
        },
        ..Perception::default()
    };

    agent.decide(5.0, &perception, &mut lights, &SimConfig::default());

    // North is checked first and wins even though south is longer.
    let decision = agent.last_decision().unwrap();
    assert_eq!(decision.rule, DecisionRule::QueueExtend);
    assert!(decision.reason.contains("north"));
    assert_eq!(lights.phase_duration(), 40.0);
}

#[test]
fn decision_history_keeps_the_most_recent_hundred() {
    let mut lights = LightController::new(30.0);
    let mut agent = RuleAgent::new();

    for i in 0..150 {
        agent.decide(
            i as f64,
            &Perception::default(),
            &mut lights,
            &SimConfig::default(),
        );
    }

    let history: Vec<_> = agent.history().collect();
    assert_eq!(history.len(), DECISION_HISTORY_CAP);
    // Oldest entries were evicted first.
    assert_eq!(history[0].timestamp, 50.0);
    assert_eq!(history.last().unwrap().timestamp, 149.0);
}

// ── Vehicles and population ───────────────────────────────────────────────

#[test]
fn vehicle_moves_only_along_its_heading_axis() {
    let mut vehicle = Vehicle::new(VehicleId(1), VehicleKind::Car, Direction::North, 0, 0.0);
    let start = vehicle.position;

    vehicle.step(1.0, true);
    assert_eq!(vehicle.position.x, start.x);
    assert_eq!(
        vehicle.position.y,
        start.y - VehicleKind::Car.speed() * SPEED_SCALE
    );
    assert!(!vehicle.waiting);
}

#[test]
fn vehicle_accumulates_wait_while_held_at_red() {
    let mut vehicle = Vehicle::new(VehicleId(2), VehicleKind::Bus, Direction::East, 1, 0.0);
    let start = vehicle.position;

    vehicle.step(0.5, false);
    vehicle.step(0.5, false);
    assert!(vehicle.waiting);
    assert_eq!(vehicle.wait_time, 1.0);
    assert_eq!(vehicle.position, start);

    // Released: moves again, wait time is cumulative.
    vehicle.step(0.5, true);
    assert!(!vehicle.waiting);
    assert_eq!(vehicle.wait_time, 1.0);
}

#[test]
fn perception_reports_longest_waiting_emergency() {
    let mut population = VehiclePopulation::with_seed(3);

    let (first_id, first_direction) = population.spawn_emergency(0.0);
    population.advance(0.1, |_| false);
    population.spawn_emergency(0.1);
    population.advance(0.1, |_| false);

    let perception = population.perceive();
    assert_eq!(perception.emergency, Some(first_direction));
    assert!(perception.queues[first_direction] >= 1);
    assert!(perception.mean_waits[first_direction] > 0.0);
    assert!(first_id.0 > 0);
}

#[test]
fn spawn_ceiling_is_enforced() {
    let config = SimConfig {
        max_vehicles: 5,
        spawn_rate: 0.05, // dt / spawn_rate >= 1: a spawn attempt every tick
        ..SimConfig::default()
    };
    let mut engine = SimEngine::with_seed(config, 11).unwrap();
    engine.start().unwrap();

    for _ in 0..200 {
        engine.step(0.1).unwrap();
        assert!(engine.population().active_count() <= 5);
    }
    assert!(engine.population().spawned_total() >= 5);
}

#[test]
fn crossing_and_wait_times_are_monotonic() {
    let mut engine = SimEngine::with_seed(SimConfig::default(), 42).unwrap();
    engine.start().unwrap();

    let mut last_crossed = 0;
    let mut last_waits: HashMap<VehicleId, f64> = HashMap::new();

    for _ in 0..600 {
        engine.step(0.1).unwrap();
        let state = engine.state();

        // Crossed count never reverts.
        let crossed = engine.population().crossed_total();
        assert!(crossed >= last_crossed);
        last_crossed = crossed;

        // Per-vehicle wait time never decreases, and active vehicles have
        // not crossed.
        let mut waits = HashMap::new();
        for vehicle in &state.vehicles {
            assert!(!vehicle.crossed);
            if let Some(previous) = last_waits.get(&vehicle.id) {
                assert!(vehicle.wait_time >= *previous);
            }
            waits.insert(vehicle.id, vehicle.wait_time);
        }
        last_waits = waits;

        // Lights invariant holds under normal operation and override alike.
        assert!(exactly_one_axis_non_red(&state.lights));

        // The published snapshot belongs to this tick.
        let metrics = state.metrics.expect("tick recorded metrics");
        assert_eq!(metrics.timestamp, state.sim_time);
    }
}

#[test]
fn injected_emergency_triggers_the_override() {
    let mut engine = SimEngine::with_seed(SimConfig::default(), 9).unwrap();
    engine.start().unwrap();

    // Sixteen injections make both axes near-certain to be represented;
    // the ones facing the red axis start waiting on the first advance.
    for _ in 0..16 {
        engine.spawn_emergency_vehicle();
    }
    for _ in 0..5 {
        engine.step(0.1).unwrap();
    }

    assert!(engine.lights().emergency_mode());
    assert_eq!(
        engine.last_decision().unwrap().rule,
        DecisionRule::Emergency
    );
    let state = engine.state();
    assert!(exactly_one_axis_non_red(&state.lights));

    let stats = engine.vehicle_stats().unwrap();
    assert!(stats.by_kind.emergencies >= 16);
}

// ── Metrics ───────────────────────────────────────────────────────────────

fn snapshot_at(timestamp: f64) -> MetricsSnapshot {
    MetricsSnapshot {
        timestamp,
        active_vehicles: 0,
        spawned_total: 0,
        crossed_total: 0,
        queues: PerDirection::default(),
        mean_wait: 0.0,
        north_south: LightColor::Green,
        east_west: LightColor::Red,
        emergency_active: false,
    }
}

#[test]
fn recent_metrics_window_is_bounded_with_fifo_eviction() {
    let mut recorder = MetricsRecorder::new();
    for i in 0..1100 {
        recorder.record(snapshot_at(i as f64));
    }

    assert_eq!(recorder.recent().len(), METRICS_HISTORY_CAP);
    assert_eq!(recorder.recent().front().unwrap().timestamp, 100.0);
    assert_eq!(recorder.recent().back().unwrap().timestamp, 1099.0);
    // The session log keeps everything.
    assert_eq!(recorder.session_log().len(), 1100);
}

#[test]
fn summary_aggregates_the_whole_run() {
    let mut engine = SimEngine::with_seed(SimConfig::default(), 21).unwrap();
    engine.start().unwrap();
    for _ in 0..300 {
        engine.step(0.1).unwrap();
    }

    let summary = engine.summary().unwrap();
    assert!(summary.total_sim_time > 29.0);
    assert_eq!(
        summary.total_vehicles_spawned,
        engine.population().spawned_total()
    );
    assert!(summary.peak_wait >= summary.average_wait);

    let timeseries = engine.timeseries().unwrap();
    assert_eq!(timeseries.len(), 300);
}

#[test]
fn csv_log_writes_header_and_one_row_per_tick() {
    let path = std::env::temp_dir().join("smart_intersection_csv_test.csv");
    let mut engine = SimEngine::with_seed(SimConfig::default(), 5).unwrap();
    engine.start().unwrap();

    let mut log = CsvLog::create(&path).unwrap();
    for _ in 0..10 {
        engine.step(0.1).unwrap();
        let snapshot = engine.latest_snapshot().unwrap();
        let reason = engine.last_decision().unwrap().reason.clone();
        log.append(snapshot, &reason).unwrap();
    }
    log.flush().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 11); // header + 10 rows
    assert!(lines[0].starts_with("timestamp,active_vehicles"));

    let _ = std::fs::remove_file(&path);
}

// ── Shared handle ─────────────────────────────────────────────────────────

#[test]
fn handle_runs_pauses_and_stops_the_background_loop() {
    let mut handle = SimHandle::with_seed(SimConfig::default(), 7).unwrap();
    assert_eq!(handle.status(), RunStatus::Idle);

    handle.start(0.005).unwrap();
    std::thread::sleep(Duration::from_millis(100));
    let running_time = handle.state().sim_time;
    assert!(running_time > 0.0);

    handle.pause().unwrap();
    let paused_time = handle.state().sim_time;
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(handle.state().sim_time, paused_time);

    handle.resume().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert!(handle.state().sim_time > paused_time);

    assert_eq!(handle.stop().unwrap(), RunStatus::Stopped);
    assert_eq!(handle.status(), RunStatus::Stopped);
}

#[test]
fn handle_spawns_emergencies_and_serves_queries() {
    let mut handle = SimHandle::with_seed(SimConfig::default(), 13).unwrap();
    handle.start(0.005).unwrap();

    let (id, _direction) = handle.spawn_emergency_vehicle();
    assert!(id.0 > 0);

    std::thread::sleep(Duration::from_millis(50));
    assert!(handle.timeseries().unwrap().len() > 0);
    assert!(handle.vehicle_stats().unwrap().by_kind.emergencies >= 1);

    handle.stop().unwrap();
    let after_stop = handle.state().sim_time;
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(handle.state().sim_time, after_stop);
}
