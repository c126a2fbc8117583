//! Fractal Quest Headless Harness
//!
//! Plays the whole campaign against an in-memory store and fuzzes every
//! gate variant with random event streams. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p fractal-simtest
//!   cargo run -p fractal-simtest -- --verbose --seed 42

use fractal_core::{
    ChapterVisit, LoadOutcome, MemoryStore, ProgressError, Progression, Route, SaveStore,
    VisitOutcome,
};
use fractal_logic::catalog::{Catalog, GOLDEN_PATH};
use fractal_logic::gates::{
    convergence, network, solution, GateDetail, GateEvent, GateKind, GateOptions, GateReward,
};
use fractal_logic::rules::{validate_rules, ProgressionRules, DEFAULT_STORAGE_KEY};
use fractal_logic::selector::selector_for;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const DEFAULT_SEED: u64 = 0x0F4A_C7A1;
const FUZZ_RUNS: usize = 200;
const FUZZ_MAX_EVENTS: usize = 120;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn seed_from_args(args: &[String]) -> u64 {
    args.windows(2)
        .find(|w| w[0] == "--seed")
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = seed_from_args(&args);

    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    println!("=== Fractal Quest Harness (seed {}) ===\n", seed);

    let mut results = Vec::new();

    // 1. Catalog & rules
    results.extend(validate_catalog(verbose));

    // 2. Full campaign on an in-memory store
    results.extend(validate_campaign(verbose));

    // 3. Storage failure handling
    results.extend(validate_storage_failures(verbose));

    // 4. Random event streams against every gate
    results.extend(fuzz_gates(seed, verbose));

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

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalog & Rules ──────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();
    let catalog = Catalog::builtin();

    results.push(check(
        "catalog_size",
        catalog.len() == 27 && catalog.final_chapter() == 27,
        format!("{} chapters, final {}", catalog.len(), catalog.final_chapter()),
    ));

    let special: Vec<(u32, GateKind)> = catalog
        .all()
        .iter()
        .filter(|c| c.archetype() != GateKind::Practice)
        .map(|c| (c.id, c.archetype()))
        .collect();
    let expected = vec![
        (1, GateKind::IdentityMirror),
        (25, GateKind::ShofarConvergence),
        (26, GateKind::NetworkMultiplication),
        (27, GateKind::TwelveGateConvergence),
    ];
    results.push(check(
        "catalog_special_gates",
        special == expected,
        format!("{:?}", special),
    ));

    let golden: Vec<u32> = catalog.golden_path().map(|c| c.id).collect();
    results.push(check(
        "catalog_golden_path",
        golden == GOLDEN_PATH,
        format!("{:?}", golden),
    ));

    let reparsed = catalog
        .to_json()
        .and_then(|json| Catalog::from_json(&json));
    results.push(match reparsed {
        Ok(c) => check(
            "catalog_json_roundtrip",
            c.all() == catalog.all(),
            format!("{} chapters reparsed", c.len()),
        ),
        Err(e) => check("catalog_json_roundtrip", false, e.to_string()),
    });

    let problems = validate_rules(&ProgressionRules::default(), &catalog);
    results.push(check(
        "rules_default_valid",
        problems.is_empty(),
        format!("{} problems", problems.len()),
    ));

    if verbose {
        for c in catalog.all() {
            println!(
                "  {:>2} {:<28} book {} {:<12} {}",
                c.id,
                c.title,
                c.book,
                c.dimension,
                c.archetype()
            );
        }
    }

    results
}

// ── 2. Campaign ─────────────────────────────────────────────────────────

fn play_current<S: SaveStore>(
    p: &mut Progression<S>,
) -> Result<VisitOutcome, ProgressError> {
    let mut visit = ChapterVisit::enter(p)?;
    for event in solution(visit.gate().kind()) {
        visit.interact(&event);
    }
    visit.finish(p)
}

fn validate_campaign(verbose: bool) -> Vec<TestResult> {
    println!("--- Campaign ---");
    let mut results = Vec::new();
    let mut p = Progression::load_or_init(
        MemoryStore::new(),
        Catalog::builtin(),
        ProgressionRules::default(),
    );

    results.push(check(
        "campaign_fresh_start",
        p.load_outcome() == &LoadOutcome::Initialized && p.current_chapter_id() == 1,
        format!("{:?} at chapter {}", p.load_outcome(), p.current_chapter_id()),
    ));

    let mut order_ok = true;
    let mut rewards = Vec::new();
    let mut last_route = None;
    for expected in 1..=27u32 {
        if p.current_chapter_id() != expected {
            order_ok = false;
            break;
        }
        match play_current(&mut p) {
            Ok(VisitOutcome::Advanced { reward, route, .. }) => {
                if verbose {
                    println!(
                        "  chapter {:>2} cleared -> {:?} ({} xp, level {})",
                        expected,
                        route,
                        p.xp(),
                        p.level()
                    );
                }
                rewards.push(reward);
                last_route = Some(route);
            }
            other => {
                results.push(check(
                    "campaign_chapter_cleared",
                    false,
                    format!("chapter {}: {:?}", expected, other),
                ));
                return results;
            }
        }
    }

    results.push(check(
        "campaign_linear_order",
        order_ok,
        format!("ended on chapter {}", p.current_chapter_id()),
    ));
    results.push(check(
        "campaign_terminal_state",
        p.sealed() && p.commissioned() && p.save().completed().len() == 27,
        format!(
            "sealed={} commissioned={} completed={}",
            p.sealed(),
            p.commissioned(),
            p.save().completed().len()
        ),
    ));
    results.push(check(
        "campaign_xp_and_level",
        p.xp() == 1350 && p.level() == 14,
        format!("xp {} level {}", p.xp(), p.level()),
    ));
    results.push(check(
        "campaign_epilogue_route",
        last_route == Some(Route::Epilogue),
        format!("{:?}", last_route),
    ));

    let commissions = rewards
        .iter()
        .filter(|r| matches!(r, Some(GateReward::Commission(_))))
        .count();
    let seals = rewards
        .iter()
        .filter(|r| matches!(r, Some(GateReward::Seal(_))))
        .count();
    results.push(check(
        "campaign_milestone_rewards",
        commissions == 1 && seals == 1,
        format!("{} commission, {} seal", commissions, seals),
    ));

    let badges = p.save().earned_badges().len();
    results.push(check(
        "campaign_all_badges",
        badges == 4 && p.save().next_badge().is_none(),
        format!("{}/4 milestone badges", badges),
    ));

    let stored = p
        .store()
        .peek(DEFAULT_STORAGE_KEY)
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(bytes).ok());
    results.push(check(
        "campaign_persisted_record",
        stored
            .as_ref()
            .map(|r| r["sealed"] == true && r["xp"] == 1350)
            .unwrap_or(false),
        format!("{:?}", stored.map(|r| r["currentChapterId"].clone())),
    ));

    results
}

// ── 3. Storage Failures ─────────────────────────────────────────────────

fn validate_storage_failures(_verbose: bool) -> Vec<TestResult> {
    println!("--- Storage ---");
    let mut results = Vec::new();

    let mut p = Progression::load_or_init(
        MemoryStore::new(),
        Catalog::builtin(),
        ProgressionRules::default(),
    );
    let mut visit = match ChapterVisit::enter(&p) {
        Ok(v) => v,
        Err(e) => {
            results.push(check("storage_enter", false, e.to_string()));
            return results;
        }
    };
    for event in solution(visit.gate().kind()) {
        visit.interact(&event);
    }

    p.store_mut().set_available(false);
    let failed_attempts = (0..5)
        .filter(|_| matches!(visit.finish(&mut p), Err(ProgressError::StorageUnavailable(_))))
        .count();
    let unchanged = p.xp() == 0 && p.current_chapter_id() == 1;
    p.store_mut().set_available(true);
    let committed = matches!(visit.finish(&mut p), Ok(VisitOutcome::Advanced { .. }));

    results.push(check(
        "storage_outage_no_double_count",
        failed_attempts == 5 && unchanged && committed && p.xp() == 50,
        format!(
            "{} failed writes, then xp {} at chapter {}",
            failed_attempts,
            p.xp(),
            p.current_chapter_id()
        ),
    ));

    let mut corrupt = MemoryStore::new();
    corrupt.seed(DEFAULT_STORAGE_KEY, "{\"currentChapterId\":");
    let p = Progression::load_or_init(corrupt, Catalog::builtin(), ProgressionRules::default());
    results.push(check(
        "storage_corrupt_degrades",
        matches!(p.load_outcome(), LoadOutcome::Unreadable(_)) && p.current_chapter_id() == 1,
        format!("{:?}", p.load_outcome()),
    ));

    let mut stale = MemoryStore::new();
    stale.seed(
        DEFAULT_STORAGE_KEY,
        r#"{"currentChapterId":12,"completed":[1,2,3,4,5,6,7,8,9,10,11,400],"xp":550,"level":1}"#,
    );
    let p = Progression::load_or_init(stale, Catalog::builtin(), ProgressionRules::default());
    results.push(check(
        "storage_reload_sanitised",
        p.level() == 6 && p.save().completed().len() == 11,
        format!(
            "level {} with {} completed",
            p.level(),
            p.save().completed().len()
        ),
    ));

    results
}

// ── 4. Gate Fuzzing ─────────────────────────────────────────────────────

const EVENT_KINDS: [&str; 14] = [
    "flip",
    "call",
    "respond",
    "send",
    "connect",
    "multiply",
    "replicate",
    "activate",
    "open_gate",
    "align_tribe",
    "lay_foundation",
    "seal",
    "practice_complete",
    "noise",
];

fn random_event(rng: &mut StdRng) -> GateEvent {
    let kind = EVENT_KINDS.choose(rng).copied().unwrap_or("noise");
    match rng.gen_range(0..5) {
        0 => GateEvent::new(kind),
        1 => GateEvent::with_data(kind, rng.gen_range(0..16u64)),
        2 => {
            let pools: [&[&str]; 4] = [
                &network::NODES,
                &convergence::GATES,
                &convergence::TRIBES,
                &convergence::FOUNDATIONS,
            ];
            let pool = pools.choose(rng).copied().unwrap_or(&network::NODES);
            let name = pool.choose(rng).copied().unwrap_or("jerusalem");
            GateEvent::with_data(kind, name)
        }
        3 => GateEvent::with_data(kind, "nowhere"),
        _ => GateEvent::with_data(kind, serde_json::json!({ "target": true })),
    }
}

/// Whether the visible phase says the gate is done.
fn phase_says_done(kind: GateKind, phase: &str, detail: &GateDetail) -> bool {
    match kind {
        GateKind::IdentityMirror => matches!(
            detail,
            GateDetail::Mirror { flips, required } if flips == required
        ),
        GateKind::ShofarConvergence => phase == "resounding",
        GateKind::NetworkMultiplication => phase == "activated",
        GateKind::TwelveGateConvergence => phase == "sealed",
        GateKind::Practice => true,
    }
}

fn fuzz_gates(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Gate Fuzz ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let options = GateOptions::default();

    for kind in GateKind::ALL {
        let mut bad_progress = 0usize;
        let mut regressions = 0usize;
        let mut disagreements = 0usize;
        let mut unstable_verdicts = 0usize;
        let mut cleared = 0usize;

        for _ in 0..FUZZ_RUNS {
            let mut gate = selector_for(kind)();
            gate.start(&options);
            let mut last = gate.status().progress;

            let events = rng.gen_range(0..=FUZZ_MAX_EVENTS);
            for _ in 0..events {
                gate.interact(&random_event(&mut rng));
                let status = gate.status();
                if !status.progress.is_finite() || !(0.0..=1.0).contains(&status.progress) {
                    bad_progress += 1;
                }
                if kind != GateKind::Practice && status.progress + f32::EPSILON < last {
                    regressions += 1;
                }
                last = status.progress;
            }

            let status = gate.status();
            let verdict = gate.complete();
            if verdict != gate.complete() {
                unstable_verdicts += 1;
            }
            if verdict.success != phase_says_done(kind, &status.phase, &status.detail) {
                disagreements += 1;
            }
            if verdict.success {
                cleared += 1;
            }

            // The canonical script must still clear a restarted gate.
            gate.start(&options);
            for event in solution(kind) {
                gate.interact(&event);
            }
            if !gate.complete().success {
                disagreements += 1;
            }
        }

        let name = format!("fuzz_{}", kind.tag());
        let passed =
            bad_progress == 0 && regressions == 0 && disagreements == 0 && unstable_verdicts == 0;
        if verbose {
            println!(
                "  {:<22} {} runs, {} cleared by chance",
                kind.tag(),
                FUZZ_RUNS,
                cleared
            );
        }
        results.push(check(
            &name,
            passed,
            format!(
                "out-of-range={} regressions={} phase/verdict mismatches={} unstable={}",
                bad_progress, regressions, disagreements, unstable_verdicts
            ),
        ));
    }

    results
}
