//! Keyboard-driven party movement loop.
//!
//! The loop is a cooperative timer: the host calls [`MovementLoop::poll`]
//! from its event loop and applies the returned direction. The first tick is
//! delayed slightly so that two keys pressed together form one diagonal.

use crate::input::MoveKey;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Delay before the first step, merging near-simultaneous key presses.
pub const DEFAULT_INPUT_BUFFER: Duration = Duration::from_millis(70);
/// Delay between repeated steps while keys stay held.
pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(150);

/// Held movement keys plus the pending tick.
///
/// Keys are tracked by their raw name, so `ArrowRight` and `d` are held
/// independently even though both move right.
#[derive(Debug, Clone)]
pub struct MovementLoop {
    held: BTreeMap<String, MoveKey>,
    next_tick: Option<Instant>,
    input_buffer: Duration,
    repeat_interval: Duration,
}

impl Default for MovementLoop {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_BUFFER, DEFAULT_REPEAT_INTERVAL)
    }
}

impl MovementLoop {
    pub fn new(input_buffer: Duration, repeat_interval: Duration) -> Self {
        Self {
            held: BTreeMap::new(),
            next_tick: None,
            input_buffer,
            repeat_interval,
        }
    }

    /// Register a held key. Schedules the first tick if the loop was idle.
    /// Returns true when this press started the loop. Keys that are not
    /// movement keys are ignored.
    pub fn press(&mut self, key: &str, now: Instant) -> bool {
        let Some(direction) = MoveKey::from_key(key) else {
            return false;
        };
        self.held.insert(key.to_string(), direction);
        if self.next_tick.is_some() {
            return false;
        }
        self.next_tick = Some(now + self.input_buffer);
        true
    }

    /// Release a key. Releasing the last one stops the loop.
    pub fn release(&mut self, key: &str) {
        self.held.remove(key);
        if self.held.is_empty() {
            self.next_tick = None;
        }
    }

    /// Forget all held keys and stop the loop (focus lost, tool changed).
    pub fn cancel(&mut self) {
        self.held.clear();
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// When the next tick is due, if the loop is running.
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Sign-clamped direction from the held keys, none if they cancel out.
    pub fn direction(&self) -> Option<(i32, i32)> {
        let (dx, dy) = self
            .held
            .values()
            .map(|key| key.vector())
            .fold((0, 0), |(x, y), (dx, dy)| (x + dx, y + dy));
        let (dx, dy) = (dx.signum(), dy.signum());
        (dx != 0 || dy != 0).then_some((dx, dy))
    }

    /// Fire the tick if it is due and reschedule the next one.
    pub fn poll(&mut self, now: Instant) -> Option<(i32, i32)> {
        let due = self.next_tick?;
        if now < due {
            return None;
        }
        if self.held.is_empty() {
            self.next_tick = None;
            return None;
        }
        self.next_tick = Some(now + self.repeat_interval);
        self.direction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_tick_waits_for_buffer() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        assert!(movement.press("ArrowRight", t0));
        assert_eq!(movement.poll(t0 + ms(69)), None);
        assert_eq!(movement.poll(t0 + ms(70)), Some((1, 0)));
        assert_eq!(movement.next_tick(), Some(t0 + ms(220)));
    }

    #[test]
    fn test_buffer_merges_diagonal() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        movement.press("ArrowUp", t0);
        assert!(!movement.press("ArrowLeft", t0 + ms(30)));
        assert_eq!(movement.poll(t0 + ms(70)), Some((-1, -1)));
    }

    #[test]
    fn test_repeats_while_held() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        movement.press("ArrowDown", t0);
        let mut now = t0 + ms(70);
        let mut steps = 0;
        for _ in 0..4 {
            if movement.poll(now).is_some() {
                steps += 1;
            }
            now += ms(150);
        }
        assert_eq!(steps, 4);
    }

    #[test]
    fn test_opposite_keys_cancel_but_keep_running() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        movement.press("ArrowLeft", t0);
        movement.press("ArrowRight", t0);
        assert_eq!(movement.poll(t0 + ms(70)), None);
        assert!(movement.is_running());
    }

    #[test]
    fn test_release_all_stops() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        movement.press("ArrowUp", t0);
        movement.press("ArrowRight", t0);
        movement.release("ArrowUp");
        assert!(movement.is_running());
        movement.release("ArrowRight");
        assert!(!movement.is_running());
        assert_eq!(movement.poll(t0 + ms(500)), None);
    }

    #[test]
    fn test_alias_keys_held_independently() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        movement.press("ArrowRight", t0);
        movement.press("d", t0 + ms(10));
        movement.release("d");
        assert!(movement.is_running());
        assert_eq!(movement.poll(t0 + ms(70)), Some((1, 0)));
        movement.release("ArrowRight");
        assert!(!movement.is_running());
    }

    #[test]
    fn test_non_movement_key_ignored() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        assert!(!movement.press("q", t0));
        assert!(!movement.is_running());
    }

    #[test]
    fn test_cancel_clears_keys() {
        let t0 = Instant::now();
        let mut movement = MovementLoop::default();
        movement.press("ArrowUp", t0);
        movement.cancel();
        assert_eq!(movement.direction(), None);
        assert!(movement.press("ArrowDown", t0 + ms(10)));
    }
}
