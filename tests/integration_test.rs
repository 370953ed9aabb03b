use itertools::Itertools;
use prac::rfm::RfmKind;
use prac::{SimulationConfig, Simulator, TimingModel, Workload};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scenario_a(timing: TimingModel) -> SimulationConfig {
    SimulationConfig {
        rows: 1,
        trc_s: 10e-9,
        timing,
        threshold: 2,
        rfmabo: 1,
        trfcrfm_s: 100e-9,
        runtime_s: 1e-6,
        ..Default::default()
    }
}

/// A configuration that exercises every feature at once.
fn busy_config(workload: Workload) -> SimulationConfig {
    SimulationConfig {
        rows: 16,
        trc_s: 3e-9,
        timing: TimingModel::Tfaw { tfaw_s: 20e-9 },
        threshold: 6,
        rfmabo: 2,
        trfcrfm_s: 40e-9,
        runtime_s: 200e-6,
        rfm_freq_min_s: 1e-6,
        rfm_freq_max_s: 1.5e-6,
        isoc: 2,
        randreset: 4,
        abo_delay: 1,
        workload,
    }
}

fn run(config: SimulationConfig, seed: u64) -> anyhow::Result<Simulator> {
    let mut sim = Simulator::builder()
        .config(config)
        .seed(seed)
        .record_activations(true)
        .record_rfms(true)
        .build()?;
    sim.run();
    Ok(sim)
}

fn workloads() -> [Workload; 4] {
    [
        Workload::RoundRobin,
        Workload::Feinting,
        Workload::Mixed { pct: 60 },
        Workload::Mixed { pct: 100 },
    ]
}

#[test]
fn test_scenario_a() -> anyhow::Result<()> {
    init_logging();
    let sim = run(scenario_a(TimingModel::Legacy), 0)?;
    assert_eq!(sim.total_activations(), 24);
    assert_eq!(sim.total_rfms(), 8);
    assert_eq!(sim.total_abo_rfms(), 8);
    assert_eq!(sim.total_proactive_rfms(), 0);
    assert_eq!(sim.total_alerts(), 8);
    assert!((sim.rows().total_alert_time_s() - 760e-9).abs() < 1e-15);
    assert_eq!(sim.time_s(), 1e-6);

    let metrics = sim.metrics();
    assert_eq!(metrics.idle_time_s, 0.0);
    assert_eq!(metrics.longest_adjacent_run, 1);
    Ok(())
}

#[test]
fn test_scenario_a_unaffected_by_tfaw() -> anyhow::Result<()> {
    let legacy = run(scenario_a(TimingModel::Legacy), 0)?;
    let tfaw = run(scenario_a(TimingModel::Tfaw { tfaw_s: 20e-9 }), 0)?;
    assert_eq!(tfaw.total_activations(), legacy.total_activations());
    assert_eq!(tfaw.total_alerts(), legacy.total_alerts());
    assert_eq!(tfaw.forced_tfaw_waits(), 0);
    Ok(())
}

#[test]
fn test_scenario_b_tfaw_forces_waits() -> anyhow::Result<()> {
    init_logging();
    // whole seconds keep every timestamp exact
    let config = SimulationConfig {
        rows: 4,
        trc_s: 1.0,
        timing: TimingModel::Tfaw { tfaw_s: 20.0 },
        threshold: 1_000_000,
        rfmabo: 0,
        trfcrfm_s: 0.0,
        runtime_s: 1000.0,
        ..Default::default()
    };
    let sim = run(config, 0)?;
    // four ACTIVATEs per 20s window instead of one per tRC
    assert_eq!(sim.total_activations(), 200);
    assert_eq!(sim.forced_tfaw_waits(), 50);
    assert_eq!(sim.forced_tfaw_wait_s(), 800.0);
    assert_eq!(sim.total_alerts(), 0);
    assert_eq!(sim.time_s(), 1000.0);
    assert_eq!(&sim.activation_log()[..6], &[0.0, 1.0, 2.0, 3.0, 20.0, 21.0]);
    Ok(())
}

#[test]
fn test_scenario_c_feinting_exhaustion() -> anyhow::Result<()> {
    init_logging();
    let config = SimulationConfig {
        rows: 3,
        trc_s: 1e-9,
        timing: TimingModel::Tfaw { tfaw_s: 2e-9 },
        threshold: 1_000_000,
        rfmabo: 1,
        trfcrfm_s: 10e-9,
        runtime_s: 100e-6,
        rfm_freq_min_s: 100e-9,
        rfm_freq_max_s: 190e-9,
        workload: Workload::Feinting,
        ..Default::default()
    };
    let sim = run(config, 0)?;

    assert!(sim.active_rows().is_empty());
    assert!(sim.time_s() < 100e-6);
    assert_eq!(sim.total_proactive_rfms(), 3);
    assert_eq!(sim.total_abo_rfms(), 0);
    assert_eq!(sim.total_alerts(), 0);

    let events = sim.rfm_events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.kind == RfmKind::Proactive));
    let rows: Vec<usize> = events.iter().map(|e| e.row).sorted().collect();
    assert_eq!(rows, vec![0, 1, 2]);
    assert!(events.iter().tuple_windows().all(|(a, b)| a.time_s < b.time_s));
    assert!(sim.rows().iter().all(|r| r.rfms == 1 && !r.active));
    Ok(())
}

#[test]
fn test_determinism() -> anyhow::Result<()> {
    for workload in workloads() {
        let a = run(busy_config(workload), 7)?;
        let b = run(busy_config(workload), 7)?;
        assert_eq!(a.metrics(), b.metrics());
        assert_eq!(a.alert_records(), b.alert_records());
        assert_eq!(a.activation_log(), b.activation_log());
        assert_eq!(a.rfm_events(), b.rfm_events());
        assert!(a.rows().iter().eq(b.rows().iter()));
    }
    Ok(())
}

#[test]
fn test_time_monotonicity() -> anyhow::Result<()> {
    for workload in workloads() {
        let config = busy_config(workload);
        let runtime_s = config.runtime_s;
        let sim = run(config, 1)?;
        assert!(sim.time_s() <= runtime_s);
        assert!(sim.activation_log().iter().tuple_windows().all(|(a, b)| a <= b));
        assert!(sim.rfm_events().iter().tuple_windows().all(|(a, b)| a.time_s <= b.time_s));
        assert!(sim.alert_timestamps().iter().tuple_windows().all(|(a, b)| a <= b));
        assert!(sim.activation_log().iter().all(|&t| t + 3e-9 <= runtime_s + 1e-15));
    }
    Ok(())
}

#[test]
fn test_tfaw_property() -> anyhow::Result<()> {
    for workload in workloads() {
        let sim = run(busy_config(workload), 2)?;
        assert!(sim.activation_log().len() > 5);
        for (first, _, _, _, fifth) in sim.activation_log().iter().tuple_windows() {
            assert!(fifth - first >= 20e-9 - 1e-15, "{} {}", first, fifth);
        }
    }
    Ok(())
}

#[test]
fn test_global_stall_property() -> anyhow::Result<()> {
    for workload in workloads() {
        let sim = run(busy_config(workload), 3)?;
        assert!(sim.total_alerts() > 0);
        for alert in sim.alert_records() {
            let end = alert.start_s + alert.consumed_s;
            assert!(
                !sim
                    .activation_log()
                    .iter()
                    .any(|&t| t >= alert.start_s && t < end),
                "ACTIVATE during stall at {}",
                alert.start_s
            );
        }
    }
    Ok(())
}

#[test]
fn test_counter_bound_after_reset() -> anyhow::Result<()> {
    for workload in workloads() {
        let sim = run(busy_config(workload), 4)?;
        assert!(!sim.rfm_events().is_empty());
        assert!(
            sim.rfm_events()
                .iter()
                .all(|e| e.counter.is_none_or(|c| c <= 4))
        );
    }
    // without retirement every RFM resets a counter
    let sim = run(busy_config(Workload::RoundRobin), 4)?;
    assert!(sim.rfm_events().iter().all(|e| e.counter.is_some()));
    Ok(())
}

#[test]
fn test_conservation() -> anyhow::Result<()> {
    for workload in workloads() {
        let sim = run(busy_config(workload), 5)?;
        let rows = sim.rows();
        assert_eq!(
            sim.total_activations(),
            rows.total_activations() + sim.untracked_activations()
        );
        assert_eq!(sim.total_rfms(), rows.total_rfms());
        assert_eq!(
            sim.total_rfms(),
            sim.total_proactive_rfms() + sim.total_abo_rfms()
        );
        assert_eq!(sim.total_alerts() as u64, rows.total_alerts());
        assert_eq!(sim.activation_log().len() as u64, sim.total_activations());
        if !matches!(workload, Workload::Mixed { .. }) {
            assert_eq!(sim.untracked_activations(), 0);
        }
    }
    Ok(())
}

#[test]
fn test_mixed_workload_has_untracked_activations() -> anyhow::Result<()> {
    let sim = run(busy_config(Workload::Mixed { pct: 0 }), 6)?;
    // nearly every random row lies outside the tracked rows
    assert!(sim.untracked_activations() > sim.total_activations() / 2);
    assert_eq!(sim.total_proactive_rfms() + sim.total_abo_rfms(), sim.total_rfms());
    Ok(())
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = busy_config(Workload::RoundRobin);
    config.randreset = config.threshold + 1;
    assert!(Simulator::builder().config(config).build().is_err());
    assert!(Simulator::builder().build().is_err());
}
