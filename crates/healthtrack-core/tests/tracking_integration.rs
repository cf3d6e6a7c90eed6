//! A run driven end to end through the main loop, as the CLI does it.

use chrono::{DateTime, Duration, Utc};
use healthtrack_core::sensors::{LocationSource, SimulatedGps, SimulatedPedometer, StepSource};
use healthtrack_core::storage::Store;
use healthtrack_core::tracking::{DistanceSource, TrackerSettings};
use healthtrack_core::{Capability, Event, MainLoop, RunDriver, RunState, StopOutcome};

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-10T06:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn driver_with_pedometer(rate: u64) -> RunDriver {
    let pedometer: Box<dyn StepSource> = Box::new(SimulatedPedometer::with_rate(rate));
    RunDriver::new(TrackerSettings::default(), Capability::Available(pedometer))
}

#[tokio::test]
async fn fixes_posted_from_a_worker_build_a_saved_run() {
    let mut main = MainLoop::new(driver_with_pedometer(1));
    main.context_mut().start(t0(), 0.7).unwrap();

    let poster = main.poster();
    let worker = tokio::spawn(async move {
        let mut gps = SimulatedGps::default().with_limit(40);
        let mut i = 0;
        while let Some(fix) = gps.next_fix(t0() + Duration::seconds(2 * i)) {
            let posted = poster.post(move |driver: &mut RunDriver| {
                driver.handle_fix(&fix);
                driver.poll_steps(fix.timestamp);
            });
            assert!(posted);
            i += 1;
        }
    });
    worker.await.unwrap();
    let ran = main.run_pending();
    assert_eq!(ran, 40);

    let driver = main.context_mut();
    assert_eq!(driver.tracker().state(), RunState::Running);
    let distance = driver.tracker().distance_m();
    assert!(distance > 300.0 && distance < 450.0, "distance {distance}");

    let outcome = driver.stop(t0() + Duration::seconds(80)).unwrap();
    let StopOutcome::Saved(record) = outcome else {
        panic!("expected a saved run");
    };
    assert_eq!(record.duration, 80.0);
    assert_eq!(record.calories, (record.distance * 0.05).floor() as u32);
    assert_eq!(record.route.len(), 40);
    assert!(matches!(driver.events().last(), Some(Event::RunSaved { .. })));

    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store.append_run(&record).unwrap();
    let day = store.load_runs(record.date).unwrap();
    assert_eq!(day.runs, vec![record]);
}

#[test]
fn paused_time_is_excluded_and_fixes_are_ignored() {
    let mut driver = driver_with_pedometer(1);
    let mut gps = SimulatedGps::default().with_limit(30);

    driver.start(t0(), 0.7).unwrap();
    for i in 0..15 {
        let fix = gps.next_fix(t0() + Duration::seconds(2 * i)).unwrap();
        driver.handle_fix(&fix);
    }
    driver.pause(t0() + Duration::seconds(30)).unwrap();
    let paused_distance = driver.tracker().distance_m();
    for i in 15..20 {
        let fix = gps.next_fix(t0() + Duration::seconds(2 * i)).unwrap();
        driver.handle_fix(&fix);
    }
    assert_eq!(driver.tracker().distance_m(), paused_distance);
    driver.resume(t0() + Duration::seconds(90)).unwrap();

    let snapshot = driver.tracker().snapshot(t0() + Duration::seconds(100));
    let Event::RunSnapshot { elapsed_secs, state, .. } = snapshot else {
        panic!("expected a snapshot");
    };
    assert_eq!(state, RunState::Running);
    assert_eq!(elapsed_secs, 40.0);

    assert!(driver.pause(t0() + Duration::seconds(101)).is_ok());
    assert!(driver.pause(t0() + Duration::seconds(102)).is_err());
}

#[test]
fn weak_stretch_replaces_distance_with_step_estimate() {
    let mut driver = driver_with_pedometer(3);
    let mut gps = SimulatedGps::default().with_limit(12).with_weak_window(4..8);
    let step_length = 0.004 * 175.0;

    driver.start(t0(), step_length).unwrap();
    let mut seen_pedometer = false;
    let mut i = 0;
    while let Some(fix) = gps.next_fix(t0() + Duration::seconds(2 * i)) {
        driver.handle_fix(&fix);
        driver.poll_steps(fix.timestamp);
        if driver.tracker().active_source() == DistanceSource::Pedometer {
            seen_pedometer = true;
        }
        i += 1;
    }
    assert!(seen_pedometer);
    assert_eq!(driver.tracker().active_source(), DistanceSource::Gps);
    // Four polls at three steps each while weak.
    assert_eq!(driver.tracker().steps(), 12);

    let steps_events: Vec<_> = driver
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::StepsUpdated { steps, distance_m, .. } => Some((*steps, *distance_m)),
            _ => None,
        })
        .collect();
    assert_eq!(steps_events.len(), 4);
    let (last_steps, last_distance) = steps_events[3];
    assert_eq!(last_steps, 12);
    assert!((last_distance - 12.0 * step_length).abs() < 1e-9);
}

#[tokio::test]
async fn run_until_stops_when_the_condition_holds() {
    let mut main = MainLoop::new(0_u32);
    let poster = main.poster();
    tokio::spawn(async move {
        for _ in 0..5 {
            poster.post(|n: &mut u32| *n += 1);
            tokio::task::yield_now().await;
        }
    });
    main.run_until(|n| *n >= 5).await;
    assert_eq!(*main.context(), 5);
}

#[test]
fn stopping_an_idle_driver_is_an_error() {
    let mut driver = RunDriver::new(TrackerSettings::default(), Capability::unavailable("none"));
    assert!(driver.stop(t0()).is_err());
    assert!(driver.events().is_empty());
}
