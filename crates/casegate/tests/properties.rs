//! Run-level properties: completeness, isolation, determinism.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use casegate::mocks::{BlockingGate, FailingGate, PanickingGate, SlowGate, StaticGate};
use casegate::{
    CaseLocation, EvalContext, FailureCategory, Gate, GapSynthesizer, GateRegistry, GateRunner,
    RunnerConfig, Verdict,
};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Behaviour {
    Pass,
    Fail,
    Error,
    Panic,
    Hang,
}

fn behaviour() -> impl Strategy<Value = Behaviour> {
    prop_oneof![
        Just(Behaviour::Pass),
        Just(Behaviour::Fail),
        Just(Behaviour::Error),
        Just(Behaviour::Panic),
        Just(Behaviour::Hang),
    ]
}

fn gate(name: &str, behaviour: &Behaviour) -> Arc<dyn Gate> {
    match behaviour {
        Behaviour::Pass => Arc::new(StaticGate::passing(name)),
        Behaviour::Fail => Arc::new(StaticGate::new(
            name,
            Verdict::content_failure(format!("{name} is thin")),
        )),
        Behaviour::Error => Arc::new(FailingGate::new(name, "disk on fire")),
        Behaviour::Panic => Arc::new(PanickingGate::new(name)),
        Behaviour::Hang => Arc::new(SlowGate::new(name, Duration::from_secs(3600))),
    }
}

fn registry(gates: &[(String, Behaviour)]) -> GateRegistry {
    gates
        .iter()
        .try_fold(GateRegistry::builder(), |builder, (name, b)| {
            builder.register_arc(gate(name, b))
        })
        .expect("generated names are unique")
        .build()
}

fn runner(gates: &[(String, Behaviour)]) -> GateRunner {
    let config = RunnerConfig {
        gate_timeout_ms: 50,
        ..RunnerConfig::default()
    };
    GateRunner::new(Arc::new(registry(gates)), config)
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime")
}

fn gate_set() -> impl Strategy<Value = Vec<(String, Behaviour)>> {
    prop::collection::btree_map("[a-z]{1,8}", behaviour(), 1..8)
        .prop_map(|m: BTreeMap<String, Behaviour>| m.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_gate_reports_exactly_once(gates in gate_set()) {
        let rt = paused_runtime();
        let result = rt
            .block_on(runner(&gates).run(&CaseLocation::new("/case"), Arc::new(EvalContext::default())))
            .expect("run completes");

        prop_assert_eq!(result.gates.len(), gates.len());
        for (name, behaviour) in &gates {
            let report = &result.gates[name];
            prop_assert_eq!(&report.gate, name);
            let expected = match behaviour {
                Behaviour::Pass => None,
                Behaviour::Fail => Some(FailureCategory::Content),
                Behaviour::Error => Some(FailureCategory::Execution),
                Behaviour::Panic => Some(FailureCategory::Panicked),
                Behaviour::Hang => Some(FailureCategory::Timeout),
            };
            prop_assert_eq!(report.category, expected);
            prop_assert_eq!(report.passed, expected.is_none());
            if !report.passed {
                prop_assert!(report.reason.as_deref().is_some_and(|r| !r.trim().is_empty()));
            }
        }
        let all_pass = gates.iter().all(|(_, b)| matches!(b, Behaviour::Pass));
        prop_assert_eq!(result.overall_passed, all_pass);
    }

    #[test]
    fn gaps_do_not_depend_on_registration_order(
        gates in gate_set().prop_flat_map(|g| (Just(g.clone()), Just(g).prop_shuffle()))
    ) {
        let (ordered, shuffled) = gates;
        let rt = paused_runtime();
        let ctx = Arc::new(EvalContext::default());
        let case = CaseLocation::new("/case");

        let a = rt.block_on(runner(&ordered).run(&case, Arc::clone(&ctx))).expect("run a");
        let b = rt.block_on(runner(&shuffled).run(&case, ctx)).expect("run b");

        prop_assert_eq!(
            a.gates.keys().collect::<Vec<_>>(),
            b.gates.keys().collect::<Vec<_>>()
        );
        prop_assert_eq!(GapSynthesizer::synthesize(&a), GapSynthesizer::synthesize(&b));
    }
}

#[tokio::test(start_paused = true)]
async fn a_hanging_gate_does_not_hold_back_the_others() {
    let gates = vec![
        ("fast".to_string(), Behaviour::Pass),
        ("stuck".to_string(), Behaviour::Hang),
        ("wild".to_string(), Behaviour::Panic),
    ];
    let result = runner(&gates)
        .run(&CaseLocation::new("/case"), Arc::new(EvalContext::default()))
        .await
        .expect("run completes");

    assert!(result.gates["fast"].passed);
    assert_eq!(
        result.gates["stuck"].reason.as_deref(),
        Some("timed out after 50ms")
    );
    assert!(result.gates["wild"]
        .reason
        .as_deref()
        .expect("reason")
        .starts_with("gate panicked:"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_thread_blocking_gate_times_out_alongside_the_others() {
    let registry = GateRegistry::builder()
        .register(BlockingGate::new("blocking", Duration::from_secs(2)))
        .and_then(|b| b.register(StaticGate::passing("fast")))
        .and_then(|b| b.register(FailingGate::new("broken", "disk on fire")))
        .and_then(|b| b.register(PanickingGate::new("wild")))
        .expect("names are unique")
        .build();
    let config = RunnerConfig {
        gate_timeout_ms: 100,
        ..RunnerConfig::default()
    };

    let started = Instant::now();
    let result = GateRunner::new(Arc::new(registry), config)
        .run(&CaseLocation::new("/case"), Arc::new(EvalContext::default()))
        .await
        .expect("run completes");

    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(result.gates.len(), 4);
    assert_eq!(result.gates["blocking"].category, Some(FailureCategory::Timeout));
    assert!(result.gates["fast"].passed);
    assert_eq!(result.gates["broken"].category, Some(FailureCategory::Execution));
    assert_eq!(result.gates["wild"].category, Some(FailureCategory::Panicked));

    let gaps = GapSynthesizer::synthesize(&result);
    assert!(gaps.blocking.iter().any(|g| g.source == "blocking"));
}
