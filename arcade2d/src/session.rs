//! Session bookkeeping: elapsed play time, game-over state and counters.
//!
//! The session is owned by the scene that drives it and is reset on restart.

use serde::{Deserialize, Serialize};

/// Conditions under which a running session ends on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOverRules {
    /// End once this many seconds of session time have elapsed.
    pub time_limit: Option<f64>,
    /// End once the player has been hit this many times.
    pub max_hits: Option<u32>,
}

/// Read-only view of a session, suitable for display bindings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub elapsed: f64,
    pub hits: u32,
    pub dodged: u32,
    pub game_over: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SessionState {
    rules: GameOverRules,
    elapsed: f64,
    game_over: bool,
    hits: u32,
    dodged: u32,
}

impl SessionState {
    pub fn new(rules: GameOverRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Prepare a fresh session.
    pub fn set_up_game(&mut self) {
        self.elapsed = 0.0;
        self.game_over = false;
        self.hits = 0;
        self.dodged = 0;
    }

    pub fn restart_game(&mut self) {
        self.set_up_game();
    }

    /// Add frame time to the session. Ignored once the session is over;
    /// negative and non-finite deltas count as zero.
    pub fn add_session_time(&mut self, delta: f64) {
        if self.game_over {
            return;
        }
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }
    }

    /// True once the session was finished or one of the rules tripped.
    pub fn is_game_over(&self) -> bool {
        if self.game_over {
            return true;
        }
        let out_of_time = self
            .rules
            .time_limit
            .is_some_and(|limit| self.elapsed >= limit);
        let out_of_hits = self.rules.max_hits.is_some_and(|max| self.hits >= max);
        out_of_time || out_of_hits
    }

    /// Mark the session as finished. Calling it again is harmless.
    pub fn finish_game(&mut self) {
        if !self.game_over {
            log::info!(
                "Session over after {:.2}s ({} hits, {} dodged)",
                self.elapsed,
                self.hits,
                self.dodged
            );
        }
        self.game_over = true;
    }

    pub fn record_hit(&mut self) {
        if !self.game_over {
            self.hits += 1;
        }
    }

    pub fn record_dodge(&mut self) {
        if !self.game_over {
            self.dodged += 1;
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn dodged(&self) -> u32 {
        self.dodged
    }

    pub fn rules(&self) -> GameOverRules {
        self.rules
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            elapsed: self.elapsed,
            hits: self.hits,
            dodged: self.dodged,
            game_over: self.is_game_over(),
        }
    }
}

/// Turns absolute frame timestamps into per-frame deltas.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` and return the time since the previous call.
    ///
    /// The first call only primes the clock and returns 0. A timestamp that
    /// went backwards yields 0 and becomes the new reference.
    pub fn advance(&mut self, now: f64) -> f64 {
        let last = *self.last.get_or_insert(now);
        self.last = Some(now);

        let delta = now - last;
        if delta.is_finite() && delta >= 0.0 {
            delta
        } else {
            log::warn!("Frame timestamp went from {last} to {now}; clamping delta to 0");
            0.0
        }
    }

    pub fn is_primed(&self) -> bool {
        self.last.is_some()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_frame_contributes_nothing() {
        let mut clock = FrameClock::new();
        let mut session = SessionState::default();
        session.add_session_time(clock.advance(123_456.789));
        assert_eq!(session.elapsed(), 0.0);
        assert!(clock.is_primed());
    }

    #[test]
    fn test_three_frames_sum_deltas() {
        let mut clock = FrameClock::new();
        let mut session = SessionState::default();
        for t in [10.0, 10.5, 11.25] {
            session.add_session_time(clock.advance(t));
        }
        assert!(approx(session.elapsed(), 1.25));
    }

    #[test]
    fn test_backwards_time_is_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(5.0);
        assert_eq!(clock.advance(4.0), 0.0);
        assert!(approx(clock.advance(4.5), 0.5));
    }

    #[test]
    fn test_time_stops_after_game_over() {
        let mut session = SessionState::default();
        session.add_session_time(1.0);
        session.finish_game();
        session.finish_game();
        session.add_session_time(1.0);
        assert_eq!(session.elapsed(), 1.0);
        assert!(session.is_game_over());
    }

    #[test]
    fn test_rules_trip_game_over() {
        let mut session = SessionState::new(GameOverRules {
            time_limit: Some(2.0),
            max_hits: Some(3),
        });
        session.add_session_time(1.5);
        assert!(!session.is_game_over());
        session.add_session_time(0.5);
        assert!(session.is_game_over());

        session.restart_game();
        assert!(!session.is_game_over());
        for _ in 0..3 {
            session.record_hit();
        }
        assert!(session.is_game_over());
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut session = SessionState::default();
        session.add_session_time(3.0);
        session.record_hit();
        session.record_dodge();
        session.finish_game();

        session.restart_game();
        let summary = session.summary();
        assert_eq!(summary.elapsed, 0.0);
        assert_eq!(summary.hits, 0);
        assert_eq!(summary.dodged, 0);
        assert!(!summary.game_over);
    }

    proptest! {
        #[test]
        fn prop_elapsed_is_sum_of_clamped_deltas(
            start in -1.0e6f64..1.0e6,
            steps in proptest::collection::vec(-0.5f64..0.5, 0..64),
        ) {
            let mut clock = FrameClock::new();
            let mut session = SessionState::default();
            let mut t = start;
            let mut expected = 0.0;

            session.add_session_time(clock.advance(t));
            for step in steps {
                let next = t + step;
                expected += (next - t).max(0.0);
                session.add_session_time(clock.advance(next));
                t = next;
            }

            prop_assert!((session.elapsed() - expected).abs() < 1e-6);
        }
    }
}
