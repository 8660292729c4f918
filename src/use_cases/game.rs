use super::camera::Camera;
use super::policy::OutcomePolicy;
use super::types::{RunState, SessionEvent, SessionUpdate};
use crate::domain::entities::{RunResult, SessionRecord};
use crate::domain::ports::{Clock, GameStore};
use crate::domain::{GameConfig, Level, LevelObject, PlayerInput, advance};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

// Caps on how long a driver keeps ticking without the run ending on its own.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    // Longest uninterrupted pause before the run is stopped.
    pub max_paused: Duration,
    // Longest wall-clock lifetime of a run, pauses included.
    pub max_run: Duration,
}

// Everything a session driver owns or shares for the lifetime of one run.
pub struct SessionContext {
    pub record: SessionRecord,
    pub level: Arc<Level>,
    pub objects: Arc<[LevelObject]>,
    pub config: Arc<GameConfig>,
    pub store: Arc<dyn GameStore>,
    pub clock: Arc<dyn Clock>,
    pub tick_interval: Duration,
    pub limits: SessionLimits,
}

// Fixed-step driver for a single session.
//
// This task is the only writer of the session state: it samples the latest input,
// advances the engine once per tick, applies the outcome policy, then publishes and
// persists the result. It returns once the run is over or a stop is requested.
pub async fn session_task(
    ctx: SessionContext,
    mut event_rx: mpsc::Receiver<SessionEvent>,
    update_tx: broadcast::Sender<SessionUpdate>,
    run_state_tx: watch::Sender<RunState>,
) -> RunState {
    let SessionContext {
        mut record,
        level,
        objects,
        config,
        store,
        clock,
        tick_interval,
        limits,
    } = ctx;
    let session_id = record.id;
    let dt = tick_interval.as_secs_f64();

    let mut policy = OutcomePolicy::new(&level, &objects, &config);
    let mut camera = Camera::default();
    let mut input = PlayerInput::default();
    let mut paused_since: Option<Instant> = None;
    let mut tick: u64 = 0;

    let _ = run_state_tx.send(RunState::Running);
    info!(session_id, level_id = record.level_id, "session started");

    // Drive the fixed-step loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);
    let started = Instant::now();

    let outcome = loop {
        let now = interval.tick().await;

        let mut stop = false;
        loop {
            match event_rx.try_recv() {
                Ok(SessionEvent::Input(next)) => input = next,
                Ok(SessionEvent::TogglePause) => {
                    paused_since = if paused_since.is_some() {
                        None
                    } else {
                        Some(now)
                    };
                    let paused = paused_since.is_some();
                    let state = if paused {
                        RunState::Paused
                    } else {
                        RunState::Running
                    };
                    let _ = run_state_tx.send(state);
                    debug!(session_id, paused, "pause toggled");
                }
                Ok(SessionEvent::Stop) | Err(TryRecvError::Disconnected) => {
                    stop = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        if stop {
            break RunState::Stopped;
        }
        if now.duration_since(started) >= limits.max_run {
            warn!(
                session_id,
                max_run_secs = limits.max_run.as_secs(),
                "run exceeded its lifetime; stopping"
            );
            break RunState::Stopped;
        }
        if let Some(since) = paused_since {
            if now.duration_since(since) >= limits.max_paused {
                warn!(
                    session_id,
                    max_paused_secs = limits.max_paused.as_secs(),
                    "paused too long; stopping"
                );
                break RunState::Stopped;
            }
            continue;
        }

        let mut next = advance(&record.state, &level, &objects, &config, input, dt);
        policy.apply(&record.state, &mut next, dt);
        record.state = next;

        camera.follow(record.state.position.x, level.width);
        tick += 1;

        let _ = update_tx.send(SessionUpdate::new(
            session_id,
            tick,
            &record.state,
            camera.x,
            &level,
            &objects,
        ));

        if record.state.is_terminal() {
            break if record.state.is_completed {
                RunState::Completed
            } else {
                RunState::GameOver
            };
        }

        if let Err(error) = store.save_session(record.clone()).await {
            warn!(session_id, %error, "failed to persist session state");
        }
    };

    finish(&mut record, outcome, &level, store.as_ref(), clock.as_ref()).await;
    let _ = run_state_tx.send(outcome);
    info!(
        session_id,
        ?outcome,
        ticks = tick,
        score = record.state.score,
        coins = record.state.coins_collected,
        lives = record.state.lives_remaining,
        "session ended"
    );
    outcome
}

async fn finish(
    record: &mut SessionRecord,
    outcome: RunState,
    level: &Level,
    store: &dyn GameStore,
    clock: &dyn Clock,
) {
    let ended = matches!(outcome, RunState::Completed | RunState::GameOver);
    if ended {
        record.completed_at = Some(clock.now_epoch_seconds());
    }

    if let Err(error) = store.save_session(record.clone()).await {
        warn!(session_id = record.id, %error, "failed to persist final session state");
    }

    if !ended {
        return;
    }

    let result = RunResult {
        score: record.state.score,
        coins_collected: record.state.coins_collected,
        completed_level: record.state.is_completed.then_some(level.level_number),
    };
    if let Err(error) = store.record_result(record.player_id, result).await {
        warn!(player_id = record.player_id, %error, "failed to record run result");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{PlayerStore, SessionStore};
    use crate::domain::{SessionState, Vec2};
    use crate::use_cases::test_support::{FailureFlags, FixedClock, RecordingStore, flat_level};

    const TICK: Duration = Duration::from_nanos(16_666_667);
    const LIMITS: SessionLimits = SessionLimits {
        max_paused: Duration::from_secs(60),
        max_run: Duration::from_secs(120),
    };

    struct Harness {
        store: RecordingStore,
        event_tx: mpsc::Sender<SessionEvent>,
        update_rx: broadcast::Receiver<SessionUpdate>,
        run_state_rx: watch::Receiver<RunState>,
        task: tokio::task::JoinHandle<RunState>,
    }

    async fn start(level: Level, objects: Vec<LevelObject>, config: GameConfig) -> Harness {
        start_with(RecordingStore::new(), level, objects, config).await
    }

    async fn start_with(
        store: RecordingStore,
        level: Level,
        objects: Vec<LevelObject>,
        config: GameConfig,
    ) -> Harness {
        let player = store
            .get_or_create_player("Mario")
            .await
            .expect("player");
        let spawn = level.spawn.unwrap_or_default();
        let record = store
            .create_session(crate::domain::entities::NewSession {
                player_id: player.id,
                level_id: level.id,
                state: SessionState::new(spawn, config.starting_lives, level.time_limit),
                started_at: 10,
            })
            .await
            .expect("session");

        let (event_tx, event_rx) = mpsc::channel(16);
        let (update_tx, update_rx) = broadcast::channel(1024);
        let (run_state_tx, run_state_rx) = watch::channel(RunState::Running);
        let ctx = SessionContext {
            record,
            level: Arc::new(level),
            objects: objects.into(),
            config: Arc::new(config),
            store: Arc::new(store.clone()),
            clock: Arc::new(FixedClock(20)),
            tick_interval: TICK,
            limits: LIMITS,
        };
        let task = tokio::spawn(session_task(ctx, event_rx, update_tx, run_state_tx));

        Harness {
            store,
            event_tx,
            update_rx,
            run_state_rx,
            task,
        }
    }

    async fn only_session(store: &RecordingStore) -> SessionRecord {
        // The harness allocates the player first, so the session takes id 2.
        store
            .get_session(2)
            .await
            .expect("get session")
            .expect("session stored")
    }

    #[tokio::test(start_paused = true)]
    async fn collecting_the_only_coin_completes_the_run() {
        let (level, _) = flat_level();
        let objects = vec![LevelObject::coin(1, 100.0, 400.0, 100)];
        let harness = start(level, objects, GameConfig::default()).await;

        let outcome = harness.task.await.expect("driver task");

        assert_eq!(outcome, RunState::Completed);
        let record = only_session(&harness.store).await;
        assert!(record.state.is_completed);
        assert_eq!(record.completed_at, Some(20));
        let player = harness
            .store
            .get_or_create_player("Mario")
            .await
            .expect("player");
        assert_eq!(player.total_score, 100);
        assert_eq!(player.total_coins_collected, 1);
        assert_eq!(player.highest_level, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn falling_with_the_last_life_ends_in_game_over() {
        let (level, objects) = flat_level();
        // Keep only the out-of-reach coin so nothing breaks the fall.
        let objects: Vec<LevelObject> = objects.into_iter().filter(|o| o.is_collectible).collect();
        let config = GameConfig {
            starting_lives: 1,
            ..GameConfig::default()
        };
        let harness = start(level, objects, config).await;

        let outcome = harness.task.await.expect("driver task");

        assert_eq!(outcome, RunState::GameOver);
        let record = only_session(&harness.store).await;
        assert!(record.state.is_game_over);
        assert_eq!(record.state.lives_remaining, 0);
        assert_eq!(record.completed_at, Some(20));
        let player = harness
            .store
            .get_or_create_player("Mario")
            .await
            .expect("player");
        assert_eq!(player.highest_level, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn level_timer_running_out_ends_in_game_over() {
        let (level, objects) = flat_level();
        let level = Level {
            time_limit: 1,
            ..level
        };
        let mut harness = start(level, objects, GameConfig::default()).await;

        let outcome = (&mut harness.task).await.expect("driver task");

        assert_eq!(outcome, RunState::GameOver);
        let mut last = None;
        while let Ok(update) = harness.update_rx.try_recv() {
            last = Some(update);
        }
        let last = last.expect("updates were broadcast");
        assert_eq!(last.tick, 60);
        assert_eq!(last.hud.time_remaining, 0);
        assert!(last.is_game_over);
    }

    #[tokio::test(start_paused = true)]
    async fn every_tick_broadcasts_an_update_and_persists() {
        let (level, objects) = flat_level();
        let mut harness = start(level, objects, GameConfig::default()).await;

        let first = harness.update_rx.recv().await.expect("first update");
        assert_eq!(first.tick, 1);
        assert_eq!(first.player.x, 100.0);
        assert!(first.player.y > 400.0);
        assert_eq!(first.objects.len(), 2);
        assert_eq!(first.level.width, 800.0);

        for _ in 0..9 {
            harness.update_rx.recv().await.expect("update");
        }
        let _ = harness.event_tx.send(SessionEvent::Stop).await;
        let outcome = harness.task.await.expect("driver task");

        assert_eq!(outcome, RunState::Stopped);
        assert!(harness.store.save_count() >= 10);
        let record = only_session(&harness.store).await;
        assert_eq!(record.completed_at, None);
        assert!(record.state.position.y > 400.0);
    }

    #[tokio::test(start_paused = true)]
    async fn pausing_freezes_the_simulation() {
        let (level, objects) = flat_level();
        let mut harness = start(level, objects, GameConfig::default()).await;
        harness
            .event_tx
            .send(SessionEvent::TogglePause)
            .await
            .expect("pause");

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*harness.run_state_rx.borrow(), RunState::Paused);
        while harness.update_rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(harness.update_rx.try_recv().is_err());

        harness
            .event_tx
            .send(SessionEvent::TogglePause)
            .await
            .expect("resume");
        let resumed = harness.update_rx.recv().await.expect("update after resume");
        assert_eq!(*harness.run_state_rx.borrow(), RunState::Running);
        assert!(resumed.tick >= 1);

        let _ = harness.event_tx.send(SessionEvent::Stop).await;
        assert_eq!(harness.task.await.expect("driver task"), RunState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn input_moves_the_player_right() {
        let (level, objects) = flat_level();
        let mut harness = start(level, objects, GameConfig::default()).await;
        harness
            .event_tx
            .send(SessionEvent::Input(PlayerInput {
                move_right: true,
                ..PlayerInput::default()
            }))
            .await
            .expect("input");

        let mut update = harness.update_rx.recv().await.expect("update");
        for _ in 0..30 {
            update = harness.update_rx.recv().await.expect("update");
        }

        assert!(update.player.x > 100.0);
        assert!(update.player.facing_right);
        let _ = harness.event_tx.send(SessionEvent::Stop).await;
        let _ = harness.task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_sender_stops_the_driver() {
        let (level, objects) = flat_level();
        let harness = start(level, objects, GameConfig::default()).await;
        drop(harness.event_tx);

        let outcome = harness.task.await.expect("driver task");

        assert_eq!(outcome, RunState::Stopped);
        assert_eq!(*harness.run_state_rx.borrow(), RunState::Stopped);
        let record = only_session(&harness.store).await;
        assert_eq!(record.state.position, Vec2::new(100.0, 400.0));
    }

    #[tokio::test(start_paused = true)]
    async fn storage_failures_do_not_stop_the_run() {
        let store = RecordingStore::new().with_failures(FailureFlags {
            save_session: true,
            record_result: true,
            ..FailureFlags::default()
        });
        let (level, _) = flat_level();
        let objects = vec![LevelObject::coin(1, 100.0, 400.0, 100)];
        let mut harness = start_with(store, level, objects, GameConfig::default()).await;

        let outcome = harness.task.await.expect("driver task");

        assert_eq!(outcome, RunState::Completed);
        let update = harness.update_rx.recv().await.expect("update");
        assert!(update.is_completed);
        assert_eq!(harness.store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn a_pause_that_outlasts_the_limit_stops_the_run() {
        let (level, objects) = flat_level();
        let harness = start(level, objects, GameConfig::default()).await;
        harness
            .event_tx
            .send(SessionEvent::TogglePause)
            .await
            .expect("pause");
        let paused_at = Instant::now();

        let outcome = harness.task.await.expect("driver task");

        assert_eq!(outcome, RunState::Stopped);
        assert!(paused_at.elapsed() >= LIMITS.max_paused);
        assert!(paused_at.elapsed() < LIMITS.max_run);
        assert_eq!(*harness.run_state_rx.borrow(), RunState::Stopped);
        let record = only_session(&harness.store).await;
        assert_eq!(record.completed_at, None);
    }

    #[tokio::test(start_paused = true)]
    async fn untimed_levels_stop_at_the_run_lifetime() {
        let (level, objects) = flat_level();
        let level = Level {
            time_limit: 0,
            ..level
        };
        let started = Instant::now();
        let harness = start(level, objects, GameConfig::default()).await;

        let outcome = harness.task.await.expect("driver task");

        assert_eq!(outcome, RunState::Stopped);
        assert!(started.elapsed() >= LIMITS.max_run);
        let record = only_session(&harness.store).await;
        assert!(!record.state.is_terminal());
        assert_eq!(record.state.position.y, 518.0);
    }
}
