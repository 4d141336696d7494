use super::*;
use crate::constants::test_constants::*;
use crate::error::ThemeError;
use crate::geo::MockLocationResolver;
use crate::logger::Log;
use crate::net::MockConnectivityProbe;
use crate::solar::MockSolarTimeProvider;
use crate::theme::MockThemeApplier;
use chrono::{Duration as ChronoDuration, TimeZone};
use std::sync::Mutex;

/// Clock that jumps forward on every sleep and records what was asked for.
struct RecordingClock {
    now: Mutex<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    fn starting_at(now: DateTime<Local>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
            end: None,
            sleeps: Mutex::new(Vec::new()),
        })
    }

    fn ending_at(now: DateTime<Local>, end: DateTime<Local>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
            end: Some(end),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    fn set_now(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap() = now;
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl TimeSource for RecordingClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now += ChronoDuration::from_std(duration).unwrap();
    }

    fn is_simulated(&self) -> bool {
        false
    }

    fn is_ended(&self) -> bool {
        self.end.is_some_and(|end| self.now() >= end)
    }
}

fn at(day: u32, h: u32, m: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, day, h, m, s).single().unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

fn window_for(day: NaiveDate) -> SolarWindow {
    let sunrise = Local
        .from_local_datetime(&day.and_hms_opt(6, 0, 0).unwrap())
        .single()
        .unwrap();
    let sunset = Local
        .from_local_datetime(&day.and_hms_opt(20, 0, 0).unwrap())
        .single()
        .unwrap();
    SolarWindow::new(day, sunrise, sunset).unwrap()
}

fn test_location() -> Coordinates {
    Coordinates::new(TEST_LATITUDE, TEST_LONGITUDE).unwrap()
}

fn settings() -> SchedulerSettings {
    SchedulerSettings {
        location_name: TEST_LOCATION.to_string(),
        offsets: Offsets::parse(TEST_SUNRISE_OFFSET, TEST_SUNSET_OFFSET).unwrap(),
        ..SchedulerSettings::default()
    }
}

fn online_probe() -> MockConnectivityProbe {
    let mut probe = MockConnectivityProbe::new();
    probe.expect_check().return_const(true);
    probe
}

fn network_provider() -> MockSolarTimeProvider {
    let mut provider = MockSolarTimeProvider::new();
    provider.expect_requires_network().return_const(true);
    provider.expect_provider_name().return_const("test");
    provider
}

fn resolver_once() -> MockLocationResolver {
    let mut resolver = MockLocationResolver::new();
    resolver
        .expect_resolve()
        .times(1)
        .returning(|_| Ok(test_location()));
    resolver.expect_resolver_name().return_const("test");
    resolver
}

fn accepting_applier() -> MockThemeApplier {
    let mut applier = MockThemeApplier::new();
    applier
        .expect_apply()
        .returning(|_, _| Ok(ApplyOutcome::Changed));
    applier.expect_backend_name().return_const("test");
    applier
}

fn scheduler(
    clock: &Arc<RecordingClock>,
    probe: MockConnectivityProbe,
    resolver: MockLocationResolver,
    provider: MockSolarTimeProvider,
    applier: MockThemeApplier,
) -> DayNightScheduler {
    Log::set_enabled(false);
    let time_source: Arc<dyn TimeSource> = clock.clone();
    DayNightScheduler::new(
        settings(),
        Collaborators {
            probe: Box::new(probe),
            resolver: Box::new(resolver),
            provider: Box::new(provider),
            applier: Box::new(applier),
        },
        time_source,
    )
}

fn fresh_state(day: u32) -> SchedulerState {
    let window = window_for(date(day));
    SchedulerState {
        location: Some(test_location()),
        effective: Some(window.apply_offsets(&settings().offsets)),
        window: Some(window),
        reference_day: Some(date(day)),
        last_attempt: None,
    }
}

#[test]
fn test_probe_failures_cause_exactly_one_sleep_each() {
    let clock = RecordingClock::starting_at(at(1, 12, 0, 0));

    let mut probe = MockConnectivityProbe::new();
    let mut calls = 0;
    probe.expect_check().times(4).returning(move |_, _, _| {
        calls += 1;
        calls > 3
    });

    let mut provider = network_provider();
    provider
        .expect_fetch()
        .times(1)
        .returning(|_, day| Ok(window_for(day)));

    let mut scheduler = scheduler(&clock, probe, resolver_once(), provider, accepting_applier());

    let outcomes: Vec<TickOutcome> = (0..5).map(|_| scheduler.step()).collect();

    let retry = TickOutcome::RetryAfter {
        stage: Stage::Connectivity,
        kind: FailureKind::TransientNetwork,
    };
    assert_eq!(&outcomes[..3], &[retry, retry, retry]);
    assert_eq!(outcomes[3], TickOutcome::Refreshed);
    assert_eq!(
        outcomes[4],
        TickOutcome::Applied {
            phase: Phase::Light,
            changed: true
        }
    );

    let check_interval = settings().check_interval;
    let sleeps = clock.sleeps();
    assert_eq!(sleeps.iter().filter(|&&d| d == check_interval).count(), 3);
    assert_eq!(sleeps, vec![check_interval, check_interval, check_interval, settings().loop_delay]);
}

#[test]
fn test_second_day_with_known_location_only_fetches_solar_times() {
    let clock = RecordingClock::starting_at(at(2, 8, 0, 0));

    let mut resolver = MockLocationResolver::new();
    resolver.expect_resolve().times(0);
    resolver.expect_resolver_name().return_const("test");

    let mut provider = network_provider();
    provider
        .expect_fetch()
        .withf(|coords, day| *coords == test_location() && *day == date(2))
        .times(1)
        .returning(|_, day| Ok(window_for(day)));

    let mut scheduler = scheduler(&clock, online_probe(), resolver, provider, accepting_applier())
        .with_state(fresh_state(1));

    assert_eq!(scheduler.step(), TickOutcome::Refreshed);
    assert_eq!(
        scheduler.step(),
        TickOutcome::Applied {
            phase: Phase::Light,
            changed: true
        }
    );
    assert_eq!(scheduler.state().reference_day, Some(date(2)));
}

#[test]
fn test_provider_failure_keeps_location() {
    let clock = RecordingClock::starting_at(at(1, 12, 0, 0));

    let mut provider = network_provider();
    let mut calls = 0;
    provider.expect_fetch().times(3).returning(move |_, day| {
        calls += 1;
        match calls {
            1 => Err(LookupError::Network("connection reset".to_string())),
            2 => Err(LookupError::BadStatus("INVALID_REQUEST".to_string())),
            _ => Ok(window_for(day)),
        }
    });

    let mut scheduler = scheduler(
        &clock,
        online_probe(),
        resolver_once(),
        provider,
        accepting_applier(),
    );

    assert_eq!(
        scheduler.step(),
        TickOutcome::RetryAfter {
            stage: Stage::SolarTimes,
            kind: FailureKind::TransientNetwork
        }
    );
    assert_eq!(scheduler.state().location, Some(test_location()));

    assert_eq!(
        scheduler.step(),
        TickOutcome::RetryAfter {
            stage: Stage::SolarTimes,
            kind: FailureKind::DataError
        }
    );
    assert_eq!(scheduler.state().location, Some(test_location()));
    assert!(scheduler.state().window.is_none());

    assert_eq!(scheduler.step(), TickOutcome::Refreshed);
}

#[test]
fn test_consecutive_resolver_failures_retry_at_check_interval() {
    const FAILURES: usize = 5;
    let clock = RecordingClock::starting_at(at(1, 12, 0, 0));

    let mut resolver = MockLocationResolver::new();
    let mut calls = 0;
    resolver
        .expect_resolve()
        .withf(|name| name == TEST_LOCATION)
        .times(FAILURES + 1)
        .returning(move |name| {
            calls += 1;
            if calls <= FAILURES {
                Err(LookupError::NoResults(name.to_string()))
            } else {
                Ok(test_location())
            }
        });
    resolver.expect_resolver_name().return_const("test");

    let mut provider = network_provider();
    provider
        .expect_fetch()
        .times(1)
        .returning(|_, day| Ok(window_for(day)));

    let mut scheduler = scheduler(&clock, online_probe(), resolver, provider, accepting_applier());

    for _ in 0..FAILURES {
        assert_eq!(
            scheduler.step(),
            TickOutcome::RetryAfter {
                stage: Stage::Location,
                kind: FailureKind::DataError
            }
        );
        assert!(scheduler.state().location.is_none());
    }
    assert_eq!(scheduler.step(), TickOutcome::Refreshed);

    assert_eq!(clock.sleeps(), vec![settings().check_interval; FAILURES]);
    assert_eq!(
        scheduler.state().last_attempt,
        Some(at(1, 12, 0, 0) + ChronoDuration::seconds(20 * FAILURES as i64))
    );
}

#[test]
fn test_offline_never_reaches_resolver_or_provider() {
    let clock = RecordingClock::starting_at(at(1, 12, 0, 0));

    let mut probe = MockConnectivityProbe::new();
    probe.expect_check().times(2).return_const(false);

    let mut resolver = MockLocationResolver::new();
    resolver.expect_resolve().times(0);

    let mut provider = network_provider();
    provider.expect_fetch().times(0);

    let mut applier = MockThemeApplier::new();
    applier.expect_apply().times(0);

    let mut scheduler = scheduler(&clock, probe, resolver, provider, applier);
    scheduler.step();
    scheduler.step();

    assert_eq!(clock.sleeps(), vec![settings().check_interval; 2]);
}

#[test]
fn test_stale_window_triggers_exactly_one_refresh() {
    // One minute before midnight: the next tick lands on the following day
    let clock = RecordingClock::starting_at(at(1, 23, 59, 30));

    let mut resolver = MockLocationResolver::new();
    resolver.expect_resolve().times(0);

    let mut provider = network_provider();
    provider
        .expect_fetch()
        .withf(|_, day| *day == date(2))
        .times(1)
        .returning(|_, day| Ok(window_for(day)));

    let mut scheduler = scheduler(&clock, online_probe(), resolver, provider, accepting_applier())
        .with_state(fresh_state(1));

    assert!(matches!(
        scheduler.step(),
        TickOutcome::Applied {
            phase: Phase::Dark,
            ..
        }
    ));
    assert_eq!(scheduler.step(), TickOutcome::Refreshed);
    for _ in 0..3 {
        assert!(matches!(
            scheduler.step(),
            TickOutcome::Applied {
                phase: Phase::Dark,
                ..
            }
        ));
    }
    assert_eq!(scheduler.state().window, Some(window_for(date(2))));
}

#[test]
fn test_local_provider_with_known_location_skips_probe() {
    let clock = RecordingClock::starting_at(at(1, 12, 0, 0));

    let mut probe = MockConnectivityProbe::new();
    probe.expect_check().times(0);

    let mut resolver = MockLocationResolver::new();
    resolver.expect_resolve().times(0);

    let mut provider = MockSolarTimeProvider::new();
    provider.expect_requires_network().return_const(false);
    provider.expect_provider_name().return_const("local");
    provider
        .expect_fetch()
        .times(1)
        .returning(|_, day| Ok(window_for(day)));

    let mut scheduler = scheduler(&clock, probe, resolver, provider, accepting_applier())
        .with_state(SchedulerState::with_location(test_location()));

    assert_eq!(scheduler.step(), TickOutcome::Refreshed);
    assert!(matches!(scheduler.step(), TickOutcome::Applied { .. }));
}

#[test]
fn test_permission_error_skips_tick_and_continues() {
    let clock = RecordingClock::starting_at(at(1, 12, 0, 0));

    let mut applier = MockThemeApplier::new();
    let mut calls = 0;
    applier.expect_apply().times(2).returning(move |_, force| {
        assert!(!force);
        calls += 1;
        if calls == 1 {
            Err(ThemeError::PermissionDenied("access is denied".to_string()))
        } else {
            Ok(ApplyOutcome::Unchanged)
        }
    });
    applier.expect_backend_name().return_const("test");

    let mut scheduler = scheduler(
        &clock,
        online_probe(),
        MockLocationResolver::new(),
        network_provider(),
        applier,
    )
    .with_state(fresh_state(1));

    assert_eq!(
        scheduler.step(),
        TickOutcome::ApplySkipped {
            phase: Phase::Light
        }
    );
    assert_eq!(
        scheduler.step(),
        TickOutcome::Applied {
            phase: Phase::Light,
            changed: false
        }
    );
    assert_eq!(clock.sleeps(), vec![settings().loop_delay; 2]);
}

#[test]
fn test_phase_boundaries_with_offsets() {
    let clock = RecordingClock::starting_at(at(1, 6, 29, 0));

    let applied = Arc::new(Mutex::new(Vec::new()));
    let recorder = applied.clone();
    let mut applier = MockThemeApplier::new();
    applier.expect_apply().returning(move |phase, _| {
        recorder.lock().unwrap().push(phase);
        Ok(ApplyOutcome::Changed)
    });
    applier.expect_backend_name().return_const("test");

    let mut scheduler = scheduler(
        &clock,
        online_probe(),
        MockLocationResolver::new(),
        network_provider(),
        applier,
    )
    .with_state(fresh_state(1));

    // Raw 06:00-20:00 shifted by +00:30 / -01:00
    for time in [
        at(1, 6, 29, 0),
        at(1, 6, 30, 0),
        at(1, 18, 59, 59),
        at(1, 19, 0, 0),
    ] {
        clock.set_now(time);
        scheduler.tick();
    }

    assert_eq!(
        *applied.lock().unwrap(),
        vec![Phase::Dark, Phase::Light, Phase::Light, Phase::Dark]
    );
}

#[test]
fn test_run_stops_when_time_source_ends() {
    let clock = RecordingClock::ending_at(at(1, 12, 0, 0), at(1, 12, 5, 0));

    let mut scheduler = scheduler(
        &clock,
        online_probe(),
        MockLocationResolver::new(),
        network_provider(),
        accepting_applier(),
    )
    .with_state(fresh_state(1));

    scheduler.run();

    assert_eq!(clock.sleeps(), vec![settings().loop_delay; 5]);
}

#[test]
fn test_shutdown_signal_interrupts_wait() {
    let clock = RecordingClock::starting_at(at(1, 12, 0, 0));
    let signals = SignalState::detached();
    let sender = signals.signal_sender.clone();
    sender.send(SignalMessage::Shutdown).unwrap();

    let mut applier = MockThemeApplier::new();
    applier
        .expect_apply()
        .times(1)
        .returning(|_, _| Ok(ApplyOutcome::Unchanged));

    let mut scheduler = scheduler(
        &clock,
        online_probe(),
        MockLocationResolver::new(),
        network_provider(),
        applier,
    )
    .with_state(fresh_state(1))
    .with_signals(signals);

    scheduler.run();

    // The wait was served by the signal channel, not the clock
    assert!(clock.sleeps().is_empty());
}

#[test]
fn test_state_freshness() {
    let state = fresh_state(1);
    assert!(state.fresh_window(date(1)).is_some());
    assert!(state.fresh_window(date(2)).is_none());
    assert!(SchedulerState::new().fresh_window(date(1)).is_none());
}
