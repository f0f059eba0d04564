use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tempfile::tempdir;

use repline::capability::{Capabilities, ManualClock};
use repline::engine::WorkoutEngine;
use repline::history::{export_csv, HistoryDb};
use repline::profile::{Profile, WeightUnit};
use repline::session::{Phase, SessionConfig};
use repline::summary::SessionSummary;
use repline::workout::WorkoutDefinition;

fn run_to_finish(engine: &mut WorkoutEngine, clock: &ManualClock) {
    for _ in 0..10_000 {
        match engine.phase() {
            Some(Phase::Finished) | None => return,
            Some(Phase::RepConfirm) => engine.confirm_rep_based_exercise().unwrap(),
            Some(_) => {
                clock.advance(Duration::from_secs(1));
                engine.tick();
            }
        }
    }
    panic!("session never finished");
}

// A finished bundled workout is recorded on dismiss and comes back out of the
// database and the CSV export unchanged.
#[test]
fn finished_session_round_trips_through_history() {
    let dir = tempdir().unwrap();
    let db = HistoryDb::open(dir.path().join("history.db")).unwrap();

    let workout = WorkoutDefinition::bundled("core").unwrap();
    let title = workout.title.clone();
    let count = workout.len();

    let clock = ManualClock::default();
    let mut engine = WorkoutEngine::with_capabilities(
        workout,
        Profile::new(154.0, WeightUnit::Lbs),
        SessionConfig::default(),
        Capabilities::with_clock(clock.clone()),
    )
    .unwrap();

    let recorded: Rc<RefCell<Option<SessionSummary>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&recorded);
    engine.on_complete(move |summary| *sink.borrow_mut() = Some(*summary));

    run_to_finish(&mut engine, &clock);
    engine.dismiss().unwrap();

    let summary = (*recorded.borrow()).expect("completion callback fired");
    assert!(summary.calories_burned > 0);
    db.record(&title, count, &summary).unwrap();

    let entries = db.recent(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Core Blast");
    assert_eq!(entries[0].exercise_count as usize, count);
    assert_eq!(entries[0].active_duration_secs, summary.active_duration_secs);
    assert_eq!(entries[0].calories_burned, summary.calories_burned);

    let mut out = Vec::new();
    export_csv(&entries, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("Core Blast"));
}

#[test]
fn cancelled_session_has_nothing_to_record() {
    let clock = ManualClock::default();
    let mut engine = WorkoutEngine::with_capabilities(
        WorkoutDefinition::bundled("quickstart").unwrap(),
        Profile::default(),
        SessionConfig::default(),
        Capabilities::with_clock(clock.clone()),
    )
    .unwrap();

    let fired = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&fired);
    engine.on_complete(move |_| *flag.borrow_mut() = true);

    for _ in 0..30 {
        clock.advance(Duration::from_secs(1));
        engine.tick();
    }
    engine.cancel().unwrap();

    assert!(engine.summary().is_none());
    assert!(engine.dismiss().is_err());
    assert!(!*fired.borrow());
}
