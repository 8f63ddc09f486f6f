use super::policy::EnemyPolicy;
use super::runtime::EnemyRuntime;
use super::shard::{lock_shard, run_shard, EnemyShard, ShardEnv, ShardOutcome, ShardReport, TickContext};
use crate::config::{EnemyConfig, SchedulerConfig, SchedulerMode};
use crate::error::{SimulationError, SimulationResult};
use crate::spatial::{ColliderIds, SharedQuadtree};
use common::shapes::{Aabb, ColliderId};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

enum WorkerSignal {
    Tick(TickContext),
    Quit,
}

struct Worker {
    signal: Sender<WorkerSignal>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Loading,
    Running,
    ShutDown,
}

/// Every shard's report for one tick, in shard order.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub reports: Vec<ShardReport>,
}

impl TickSummary {
    pub fn completed(&self) -> usize {
        self.count(|outcome| matches!(outcome, ShardOutcome::Completed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, ShardOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| {
            matches!(outcome, ShardOutcome::Failed(_) | ShardOutcome::Panicked(_))
        })
    }

    fn count(&self, f: impl Fn(&ShardOutcome) -> bool) -> usize {
        self.reports.iter().filter(|report| f(&report.outcome)).count()
    }
}

/// Splits enemies into shards and steps every shard once per [`update`] call.
///
/// In [`SchedulerMode::Parallel`] each shard gets a long-lived worker thread.
/// `update` signals all of them and blocks until each has posted a
/// completion, so nothing from tick N is still running when it returns.
/// Workers only serialize on the shared quadtree lock, taken after all of a
/// shard's decisions are made.
///
/// Lifecycle: spawn enemies, [`start_workers`] once, `update` every tick,
/// [`shutdown`] once. Dropping a running manager shuts it down.
///
/// [`update`]: ParallelEnemyManager::update
/// [`start_workers`]: ParallelEnemyManager::start_workers
/// [`shutdown`]: ParallelEnemyManager::shutdown
pub struct ParallelEnemyManager {
    shards: Vec<Arc<Mutex<EnemyShard>>>,
    config: SchedulerConfig,
    env: Arc<ShardEnv>,
    workers: Vec<Worker>,
    completions: Option<Receiver<ShardReport>>,
    lifecycle: Lifecycle,
}

impl ParallelEnemyManager {
    pub fn new(
        tree: SharedQuadtree,
        policy: Arc<dyn EnemyPolicy>,
        enemy: EnemyConfig,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            shards: Vec::new(),
            config,
            env: Arc::new(ShardEnv {
                tree,
                policy,
                enemy,
            }),
            workers: Vec::new(),
            completions: None,
            lifecycle: Lifecycle::Loading,
        }
    }

    pub fn mode(&self) -> SchedulerMode {
        self.config.mode
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn is_shut_down(&self) -> bool {
        self.lifecycle == Lifecycle::ShutDown
    }

    fn ensure_loading(&self) -> SimulationResult<()> {
        match self.lifecycle {
            Lifecycle::Loading => Ok(()),
            Lifecycle::Running => Err(SimulationError::SchedulerAlreadyStarted),
            Lifecycle::ShutDown => Err(SimulationError::SchedulerShutDown),
        }
    }

    /// Add an enemy at `(x, y)` to the first shard with room, opening a new
    /// shard when all are full. Returns the enemy's name.
    pub fn spawn_enemy(&mut self, id: ColliderId, x: f32, y: f32) -> SimulationResult<String> {
        self.ensure_loading()?;
        if self.config.shard_capacity == 0 {
            return Err(SimulationError::Config(
                "scheduler.shard_capacity must be positive".to_string(),
            ));
        }
        let slot = self.shards.iter().position(|shard| !lock_shard(shard).is_full());
        let index = match slot {
            Some(index) => index,
            None => {
                let index = self.shards.len();
                self.shards.push(Arc::new(Mutex::new(EnemyShard::new(
                    index,
                    self.config.shard_capacity,
                ))));
                log::debug!("opened enemy shard EM-{}", index);
                index
            }
        };

        let mut shard = lock_shard(&self.shards[index]);
        let name = shard.next_enemy_name();
        shard.push(EnemyRuntime::new(id, name.clone(), x, y, &self.env.enemy));
        Ok(name)
    }

    /// Spawn one enemy per position, drawing ids from `ids`.
    pub fn populate(&mut self, spawns: &[(f32, f32)], ids: &mut ColliderIds) -> SimulationResult<()> {
        for &(x, y) in spawns {
            self.spawn_enemy(ids.next_id(), x, y)?;
        }
        log::info!(
            "placed {} enemies in {} shards",
            spawns.len(),
            self.shards.len()
        );
        Ok(())
    }

    /// Start one worker per shard (parallel mode). May only be called once.
    pub fn start_workers(&mut self) -> SimulationResult<()> {
        self.ensure_loading()?;
        if self.config.mode == SchedulerMode::Sequential {
            self.lifecycle = Lifecycle::Running;
            log::info!("stepping {} enemy shards sequentially", self.shards.len());
            return Ok(());
        }

        let (done_tx, done_rx) = mpsc::channel::<ShardReport>();
        let mut failure = None;
        for (index, shard) in self.shards.iter().enumerate() {
            let (signal_tx, signal_rx) = mpsc::channel::<WorkerSignal>();
            let shard = Arc::clone(shard);
            let env = Arc::clone(&self.env);
            let done = done_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("enemy-shard-{}", index))
                .spawn(move || run_worker(shard, env, signal_rx, done));
            match spawned {
                Ok(handle) => self.workers.push(Worker {
                    signal: signal_tx,
                    handle: Some(handle),
                }),
                Err(err) => {
                    failure = Some((index, err));
                    break;
                }
            }
        }
        if let Some((index, err)) = failure {
            log::error!("failed to start worker for shard EM-{}: {}", index, err);
            self.stop_workers();
            return Err(SimulationError::WorkerSpawn(err.to_string()));
        }

        self.completions = Some(done_rx);
        self.lifecycle = Lifecycle::Running;
        log::info!("started {} enemy shard workers", self.workers.len());
        Ok(())
    }

    /// Step every shard once and wait for all of them.
    pub fn update(&mut self, ctx: TickContext) -> SimulationResult<TickSummary> {
        match self.lifecycle {
            Lifecycle::Loading => return Err(SimulationError::SchedulerNotStarted),
            Lifecycle::ShutDown => return Err(SimulationError::SchedulerShutDown),
            Lifecycle::Running => {}
        }

        let mut reports = match self.config.mode {
            SchedulerMode::Sequential => self
                .shards
                .iter()
                .map(|shard| run_shard(shard, &ctx, &self.env))
                .collect(),
            SchedulerMode::Parallel => self.update_parallel(ctx),
        };
        reports.sort_by_key(|report| report.shard);
        let summary = TickSummary {
            tick: ctx.tick,
            reports,
        };
        log::debug!(
            "tick {}: {} shards completed, {} skipped, {} failed",
            summary.tick,
            summary.completed(),
            summary.skipped(),
            summary.failed()
        );
        Ok(summary)
    }

    fn update_parallel(&self, ctx: TickContext) -> Vec<ShardReport> {
        let mut reports = Vec::with_capacity(self.workers.len());
        let mut signalled = 0;
        for (index, worker) in self.workers.iter().enumerate() {
            if worker.signal.send(WorkerSignal::Tick(ctx)).is_ok() {
                signalled += 1;
            } else {
                log::error!("worker for shard EM-{} is gone", index);
                reports.push(ShardReport {
                    shard: index,
                    tick: ctx.tick,
                    outcome: ShardOutcome::Failed("worker exited".to_string()),
                });
            }
        }

        let Some(completions) = self.completions.as_ref() else {
            return reports;
        };
        for _ in 0..signalled {
            match completions.recv() {
                Ok(report) => reports.push(report),
                Err(_) => {
                    log::error!("all shard workers exited before finishing tick {}", ctx.tick);
                    break;
                }
            }
        }
        reports
    }

    /// Stop and join every worker. Later calls only log a warning.
    ///
    /// Returns how many workers were joined.
    pub fn shutdown(&mut self) -> usize {
        if self.lifecycle == Lifecycle::ShutDown {
            log::warn!("enemy scheduler is already shut down");
            return 0;
        }
        let joined = self.stop_workers();
        self.lifecycle = Lifecycle::ShutDown;
        log::info!("enemy scheduler shut down, joined {} workers", joined);
        joined
    }

    fn stop_workers(&mut self) -> usize {
        for worker in &self.workers {
            // A worker that already exited has dropped its receiver.
            let _ = worker.signal.send(WorkerSignal::Quit);
        }
        let mut joined = 0;
        for mut worker in self.workers.drain(..) {
            drop(worker.signal);
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    log::error!("an enemy shard worker panicked outside a tick");
                }
                joined += 1;
            }
        }
        self.completions = None;
        joined
    }

    /// Worker threads that have not exited yet.
    pub fn live_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|worker| {
                worker
                    .handle
                    .as_ref()
                    .map_or(false, |handle| !handle.is_finished())
            })
            .count()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| lock_shard(shard).len()).collect()
    }

    /// Run `f` on shard `index`. Only meant for between ticks.
    pub fn with_shard<R>(&self, index: usize, f: impl FnOnce(&EnemyShard) -> R) -> Option<R> {
        self.shards.get(index).map(|shard| f(&lock_shard(shard)))
    }

    pub fn enemy_count(&self) -> usize {
        self.shard_sizes().iter().sum()
    }

    /// Copy of every enemy, in shard order.
    pub fn enemies(&self) -> Vec<EnemyRuntime> {
        self.shards
            .iter()
            .flat_map(|shard| lock_shard(shard).enemies().to_vec())
            .collect()
    }

    /// Bounds of every enemy that is still alive.
    pub fn live_enemy_bounds(&self) -> Vec<Aabb> {
        let mut bounds = Vec::new();
        for shard in &self.shards {
            let shard = lock_shard(shard);
            bounds.extend(
                shard
                    .enemies()
                    .iter()
                    .filter(|enemy| !enemy.is_dead())
                    .map(EnemyRuntime::bounds),
            );
        }
        bounds
    }

    /// Damage enemy `id`. `None` if there is no such enemy, otherwise
    /// whether the hit killed it.
    pub fn damage_enemy(&self, id: ColliderId, amount: f32) -> Option<bool> {
        for shard in &self.shards {
            let mut shard = lock_shard(shard);
            if let Some(enemy) = shard.enemies_mut().iter_mut().find(|enemy| enemy.id == id) {
                return Some(enemy.apply_damage(amount));
            }
        }
        None
    }
}

impl Drop for ParallelEnemyManager {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.shutdown();
        }
    }
}

fn run_worker(
    shard: Arc<Mutex<EnemyShard>>,
    env: Arc<ShardEnv>,
    signals: Receiver<WorkerSignal>,
    done: Sender<ShardReport>,
) {
    log::debug!("enemy shard worker started");
    while let Ok(signal) = signals.recv() {
        match signal {
            WorkerSignal::Tick(ctx) => {
                let report = run_shard(&shard, &ctx, &env);
                if done.send(report).is_err() {
                    break;
                }
            }
            WorkerSignal::Quit => break,
        }
    }
    log::debug!("enemy shard worker exiting");
}
