//! Loading overlay scheduler: an elapsed-seconds clock plus a fact carousel.
//!
//! Two independent periodic tasks drive the overlay. The fact list is shuffled
//! on start and re-shuffled each time the carousel runs off its end.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::lock_or_recover;

pub const DEFAULT_ELAPSED_TICK: Duration = Duration::from_secs(1);
pub const DEFAULT_ROTATION_TICK: Duration = Duration::from_secs(5);

/// Uniform in-place Fisher-Yates permutation of `items`.
pub fn shuffle<T, R>(mut items: Vec<T>, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let mut remaining = items.len();
    while remaining > 1 {
        let pick = rng.gen_range(0..remaining);
        remaining -= 1;
        items.swap(remaining, pick);
    }
    items
}

/// Formats seconds as `MM:SS`, wrapping at one hour.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", (seconds / 60) % 60, seconds % 60)
}

/// Clock and carousel state shared by the two periodic tasks.
pub struct RotationState {
    elapsed_seconds: u64,
    items: Vec<String>,
    current_index: usize,
    running: bool,
    generation: u64,
    rng: StdRng,
}

impl RotationState {
    pub fn new(rng: StdRng) -> Self {
        Self {
            elapsed_seconds: 0,
            items: Vec::new(),
            current_index: 0,
            running: false,
            generation: 0,
            rng,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Resets the clock and installs a freshly shuffled copy of `items`.
    pub fn restart(&mut self, items: Vec<String>) {
        self.replace_items(items);
        self.elapsed_seconds = 0;
    }

    /// Installs a freshly shuffled copy of `items`, leaving the clock alone.
    pub fn replace_items(&mut self, items: Vec<String>) {
        self.items = shuffle(items, &mut self.rng);
        self.current_index = 0;
    }

    pub fn tick_elapsed(&mut self) {
        self.elapsed_seconds += 1;
    }

    /// Moves to the next item, re-shuffling once the end is reached.
    pub fn advance(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current_index += 1;
        if self.current_index >= self.items.len() {
            self.reshuffle();
            self.current_index = 0;
        }
    }

    fn reshuffle(&mut self) {
        let previous = self.items.clone();
        let has_alternative = previous.iter().any(|item| item != &previous[0]);
        loop {
            self.items = shuffle(std::mem::take(&mut self.items), &mut self.rng);
            if !has_alternative || self.items != previous {
                break;
            }
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&str> {
        self.items.get(self.current_index).map(String::as_str)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            running: self.running,
            elapsed_seconds: self.elapsed_seconds,
            elapsed: format_elapsed(self.elapsed_seconds),
            current_fact: self.current().map(str::to_string),
        }
    }
}

/// What the loading overlay renders.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RotationSnapshot {
    pub running: bool,
    pub elapsed_seconds: u64,
    pub elapsed: String,
    pub current_fact: Option<String>,
}

struct TimerTasks {
    elapsed: JoinHandle<()>,
    rotation: Option<JoinHandle<()>>,
}

impl TimerTasks {
    fn abort(self) {
        self.elapsed.abort();
        if let Some(rotation) = self.rotation {
            rotation.abort();
        }
    }
}

/// Drives [`RotationState`] from tokio intervals between `start` and `stop`.
pub struct RotationScheduler {
    state: Arc<Mutex<RotationState>>,
    tasks: Mutex<Option<TimerTasks>>,
    elapsed_tick: Duration,
    rotation_tick: Duration,
}

impl Default for RotationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_ELAPSED_TICK, DEFAULT_ROTATION_TICK)
    }
}

impl RotationScheduler {
    pub fn new(elapsed_tick: Duration, rotation_tick: Duration) -> Self {
        Self::with_state(RotationState::new(StdRng::from_entropy()), elapsed_tick, rotation_tick)
    }

    pub fn with_state(
        state: RotationState,
        elapsed_tick: Duration,
        rotation_tick: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            tasks: Mutex::new(None),
            elapsed_tick,
            rotation_tick,
        }
    }

    /// Starts both timers, cancelling any pair left from an earlier start.
    ///
    /// Returns `false` and leaves the scheduler stopped when called outside a
    /// tokio runtime.
    pub fn start(&self, items: Vec<String>) -> bool {
        let mut tasks = lock_or_recover(&self.tasks);
        if let Some(previous) = tasks.take() {
            previous.abort();
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                warn!("Rotation timers not scheduled: {}", err);
                let mut state = lock_or_recover(&self.state);
                state.running = false;
                state.generation += 1;
                return false;
            }
        };

        let has_items = !items.is_empty();
        let generation = {
            let mut state = lock_or_recover(&self.state);
            state.generation += 1;
            state.running = true;
            state.restart(items);
            debug!("Rotation started with {} items", state.items.len());
            state.generation
        };

        let elapsed = spawn_ticker(
            &handle,
            Arc::clone(&self.state),
            generation,
            self.elapsed_tick,
            RotationState::tick_elapsed,
        );
        let rotation = has_items.then(|| {
            spawn_ticker(
                &handle,
                Arc::clone(&self.state),
                generation,
                self.rotation_tick,
                RotationState::advance,
            )
        });
        *tasks = Some(TimerTasks { elapsed, rotation });
        true
    }

    /// Swaps in a new item list while running, keeping the elapsed clock.
    ///
    /// The carousel timer is started here if the rotation began without items.
    /// Ignored while stopped.
    pub fn install(&self, items: Vec<String>) {
        let mut tasks = lock_or_recover(&self.tasks);
        let generation = {
            let mut state = lock_or_recover(&self.state);
            if !state.running {
                debug!("Ignoring {} items for a stopped rotation", items.len());
                return;
            }
            state.replace_items(items);
            debug!("Rotation now has {} items", state.items.len());
            if state.items.is_empty() {
                return;
            }
            state.generation
        };

        let Some(active) = tasks.as_mut() else {
            return;
        };
        if active.rotation.is_none() {
            if let Ok(handle) = Handle::try_current() {
                active.rotation = Some(spawn_ticker(
                    &handle,
                    Arc::clone(&self.state),
                    generation,
                    self.rotation_tick,
                    RotationState::advance,
                ));
            }
        }
    }

    /// Cancels both timers. Calling it while stopped does nothing.
    pub fn stop(&self) {
        let mut tasks = lock_or_recover(&self.tasks);
        if let Some(previous) = tasks.take() {
            previous.abort();
        }
        let mut state = lock_or_recover(&self.state);
        if state.running {
            debug!("Rotation stopped after {}s", state.elapsed_seconds);
        }
        state.running = false;
        state.generation += 1;
    }

    pub fn is_running(&self) -> bool {
        lock_or_recover(&self.state).running
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        lock_or_recover(&self.state).snapshot()
    }

    /// Runs `read` against the live state.
    pub fn inspect<T>(&self, read: impl FnOnce(&RotationState) -> T) -> T {
        read(&lock_or_recover(&self.state))
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_ticker(
    handle: &Handle,
    state: Arc<Mutex<RotationState>>,
    generation: u64,
    period: Duration,
    step: fn(&mut RotationState),
) -> JoinHandle<()> {
    handle.spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            let mut guard = lock_or_recover(&state);
            if guard.generation != generation {
                break;
            }
            step(&mut guard);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn sorted(mut items: Vec<String>) -> Vec<String> {
        items.sort();
        items
    }

    #[test]
    fn elapsed_formatting_pads_and_wraps_hourly() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
        assert_eq!(format_elapsed(3600), "00:00");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let original: Vec<u32> = (0..50).collect();
        let mut shuffled = shuffle(original.clone(), &mut rng);
        assert_ne!(shuffled, original);
        shuffled.sort_unstable();
        assert_eq!(shuffled, original);
    }

    #[test]
    fn shuffle_is_reproducible_with_seed() {
        let first = shuffle(labels(&["a", "b", "c", "d", "e"]), &mut StdRng::seed_from_u64(3));
        let second = shuffle(labels(&["a", "b", "c", "d", "e"]), &mut StdRng::seed_from_u64(3));
        assert_eq!(first, second);
    }

    #[test]
    fn shuffle_reaches_every_ordering() {
        let mut rng = StdRng::seed_from_u64(5);
        let seen: HashSet<Vec<u8>> = (0..600)
            .map(|_| shuffle(vec![1u8, 2, 3], &mut rng))
            .collect();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn shuffle_handles_trivial_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle(Vec::<u8>::new(), &mut rng).is_empty());
        assert_eq!(shuffle(vec![9], &mut rng), vec![9]);
    }

    #[test]
    fn exhausting_items_reshuffles_and_resets_index() {
        let mut state = RotationState::seeded(42);
        state.restart(labels(&["a", "b", "c"]));
        let first_order = state.items().to_vec();

        state.advance();
        state.advance();
        assert_eq!(state.current_index(), 2);
        state.advance();

        assert_eq!(state.current_index(), 0);
        assert_ne!(state.items(), first_order.as_slice());
        assert_eq!(sorted(state.items().to_vec()), labels(&["a", "b", "c"]));
        assert_eq!(state.current(), state.items().first().map(String::as_str));
    }

    #[test]
    fn single_item_carousel_stays_put() {
        let mut state = RotationState::seeded(8);
        state.restart(labels(&["only"]));
        state.advance();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.current(), Some("only"));
    }

    #[test]
    fn identical_items_do_not_loop_forever() {
        let mut state = RotationState::seeded(8);
        state.restart(labels(&["same", "same"]));
        state.advance();
        state.advance();
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn empty_items_show_nothing() {
        let mut state = RotationState::seeded(8);
        state.restart(Vec::new());
        state.advance();
        assert_eq!(state.current(), None);
        assert_eq!(state.snapshot().current_fact, None);
    }

    #[test]
    fn restart_resets_clock() {
        let mut state = RotationState::seeded(2);
        state.restart(labels(&["a", "b"]));
        state.tick_elapsed();
        state.tick_elapsed();
        state.restart(labels(&["a", "b", "c", "d"]));
        assert_eq!(state.elapsed_seconds(), 0);
        assert_eq!(state.items().len(), 4);
    }

    fn scheduler() -> RotationScheduler {
        RotationScheduler::with_state(
            RotationState::seeded(99),
            DEFAULT_ELAPSED_TICK,
            DEFAULT_ROTATION_TICK,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn timers_tick_until_stopped() {
        let scheduler = scheduler();
        scheduler.start(labels(&["a", "b", "c"]));

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.elapsed_seconds, 5);
        assert_eq!(snapshot.elapsed, "00:05");
        assert_eq!(scheduler.inspect(RotationState::current_index), 1);

        scheduler.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(scheduler.snapshot().elapsed_seconds, 5);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let scheduler = scheduler();
        scheduler.stop();
        scheduler.start(labels(&["a"]));
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_does_not_leave_stale_timers() {
        let scheduler = scheduler();
        scheduler.start(labels(&["a", "b"]));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        scheduler.start(labels(&["a", "b"]));
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(scheduler.snapshot().elapsed_seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_fact_list_still_runs_clock() {
        let scheduler = scheduler();
        scheduler.start(Vec::new());
        tokio::time::sleep(Duration::from_millis(6_500)).await;
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.elapsed_seconds, 6);
        assert_eq!(snapshot.current_fact, None);
        assert!(snapshot.running);
    }

    #[test]
    fn start_outside_runtime_stays_stopped() {
        let scheduler = scheduler();
        assert!(!scheduler.start(labels(&["a", "b"])));
        assert!(!scheduler.is_running());
        assert!(!scheduler.snapshot().running);
        scheduler.install(labels(&["c"]));
        assert!(scheduler.inspect(|state| state.items().is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn installing_items_keeps_the_clock() {
        let scheduler = scheduler();
        assert!(scheduler.start(Vec::new()));
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(scheduler.snapshot().current_fact, None);

        scheduler.install(labels(&["a", "b", "c"]));
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.elapsed_seconds, 3);
        assert!(snapshot.current_fact.is_some());

        tokio::time::sleep(Duration::from_millis(5_200)).await;
        assert_eq!(scheduler.snapshot().elapsed_seconds, 8);
        assert_eq!(scheduler.inspect(RotationState::current_index), 1);
        scheduler.stop();
    }

    #[test]
    fn replace_items_leaves_elapsed_untouched() {
        let mut state = RotationState::seeded(4);
        state.restart(Vec::new());
        state.tick_elapsed();
        state.replace_items(labels(&["x", "y"]));
        assert_eq!(state.elapsed_seconds(), 1);
        assert_eq!(state.current_index(), 0);
        assert_eq!(sorted(state.items().to_vec()), labels(&["x", "y"]));
    }
}
