// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timed frame stepping.
//!
//! The controller owns the active frame index. It has no timer of its own:
//! the UI calls [`PlaybackController::tick`] with the current time and the
//! controller decides whether a step is due.

use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL_MS: u64 = 100;
pub const INTERVAL_STEP_MS: u64 = 10;
/// Exclusive upper bound for the step interval.
pub const MAX_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    PlayingForward,
    PlayingBackward,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    current_index: usize,
    total: usize,
    state: PlaybackState,
    interval_ms: u64,
    last_step: Option<Instant>,
}

impl PlaybackController {
    pub fn new(total: usize, interval_ms: u64) -> Self {
        Self {
            current_index: 0,
            total,
            state: PlaybackState::Stopped,
            interval_ms: interval_ms.clamp(INTERVAL_STEP_MS, MAX_INTERVAL_MS - INTERVAL_STEP_MS),
            last_step: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state != PlaybackState::Stopped
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn last_index(&self) -> usize {
        self.total.saturating_sub(1)
    }

    /// Start stepping forward. Cancels backward playback.
    pub fn play_forward(&mut self) {
        if self.total > 0 {
            self.state = PlaybackState::PlayingForward;
            self.last_step = None;
        }
    }

    /// Start stepping backward. Cancels forward playback.
    pub fn play_backward(&mut self) {
        if self.total > 0 {
            self.state = PlaybackState::PlayingBackward;
            self.last_step = None;
        }
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Stopped;
        self.last_step = None;
    }

    /// Advance one frame. At the last frame the index stays put and forward
    /// playback stops. Returns whether the index changed.
    pub fn step_forward(&mut self) -> bool {
        if self.current_index < self.last_index() {
            self.current_index += 1;
            true
        } else {
            if self.state == PlaybackState::PlayingForward {
                self.pause();
            }
            false
        }
    }

    /// Go back one frame. At frame 0 the index stays put and backward
    /// playback stops. Returns whether the index changed.
    pub fn step_backward(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            if self.state == PlaybackState::PlayingBackward {
                self.pause();
            }
            false
        }
    }

    /// Lengthen the step interval, staying below the upper bound.
    pub fn slower(&mut self) {
        if self.interval_ms + INTERVAL_STEP_MS < MAX_INTERVAL_MS {
            self.interval_ms += INTERVAL_STEP_MS;
        }
    }

    /// Shorten the step interval, staying above zero.
    pub fn faster(&mut self) {
        if self.interval_ms > INTERVAL_STEP_MS {
            self.interval_ms -= INTERVAL_STEP_MS;
        }
    }

    /// Jump to a frame. Always stops playback; the index is clamped.
    pub fn seek(&mut self, index: usize) -> usize {
        self.pause();
        self.current_index = index.min(self.last_index());
        self.current_index
    }

    /// Step if playing and the interval has elapsed since the last step.
    /// The first tick after starting playback steps immediately.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.is_playing() {
            return false;
        }
        if let Some(last) = self.last_step {
            if now.saturating_duration_since(last) < self.interval() {
                return false;
            }
        }
        self.last_step = Some(now);
        match self.state {
            PlaybackState::PlayingForward => self.step_forward(),
            PlaybackState::PlayingBackward => self.step_backward(),
            PlaybackState::Stopped => false,
        }
    }

    /// Time left until the next step is due, if playing.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if !self.is_playing() {
            return None;
        }
        Some(match self.last_step {
            Some(last) => self.interval().saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_forward_stops_at_last_frame() {
        let mut playback = PlaybackController::new(3, DEFAULT_INTERVAL_MS);
        playback.seek(2);
        playback.play_forward();

        assert!(!playback.step_forward());
        assert_eq!(playback.current_index(), 2);
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_step_backward_stops_at_first_frame() {
        let mut playback = PlaybackController::new(3, DEFAULT_INTERVAL_MS);
        playback.play_backward();

        assert!(!playback.step_backward());
        assert_eq!(playback.current_index(), 0);
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_directions_are_exclusive() {
        let mut playback = PlaybackController::new(10, DEFAULT_INTERVAL_MS);
        playback.play_forward();
        playback.play_backward();
        assert_eq!(playback.state(), PlaybackState::PlayingBackward);
        playback.pause();
        assert!(!playback.is_playing());
    }

    #[test]
    fn test_speed_is_bounded() {
        let mut playback = PlaybackController::new(10, DEFAULT_INTERVAL_MS);
        for _ in 0..200 {
            playback.faster();
        }
        assert_eq!(playback.interval_ms(), 10);
        for _ in 0..200 {
            playback.slower();
        }
        assert_eq!(playback.interval_ms(), 990);

        playback.faster();
        assert_eq!(playback.interval_ms(), 980);
    }

    #[test]
    fn test_seek_clamps_and_stops() {
        let mut playback = PlaybackController::new(15, DEFAULT_INTERVAL_MS);
        playback.play_forward();
        assert_eq!(playback.seek(100), 14);
        assert_eq!(playback.state(), PlaybackState::Stopped);
        assert_eq!(playback.seek(3), 3);
    }

    #[test]
    fn test_tick_respects_interval() {
        let start = Instant::now();
        let mut playback = PlaybackController::new(5, 100);
        assert!(!playback.tick(start));

        playback.play_forward();
        assert!(playback.tick(start));
        assert_eq!(playback.current_index(), 1);
        assert!(!playback.tick(start + Duration::from_millis(50)));
        assert_eq!(playback.time_until_next(start + Duration::from_millis(50)), Some(Duration::from_millis(50)));
        assert!(playback.tick(start + Duration::from_millis(100)));
        assert_eq!(playback.current_index(), 2);
    }

    #[test]
    fn test_playback_runs_to_end_and_halts() {
        let start = Instant::now();
        let mut playback = PlaybackController::new(3, 10);
        playback.play_forward();
        let mut t = start;
        for _ in 0..10 {
            playback.tick(t);
            t += Duration::from_millis(10);
        }
        assert_eq!(playback.current_index(), 2);
        assert!(!playback.is_playing());
    }
}
