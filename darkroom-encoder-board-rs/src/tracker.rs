//! Turns raw encoder readings into detent steps and debounced presses.
//!
//! The board reports an absolute position and a button level. The tracker
//! keeps the previous reading and reports the difference, so the caller only
//! deals with relative motion.

/// Tracker behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerConfig {
    /// Invert the sign of every step (for knobs mounted the other way round).
    pub flip_direction: bool,
    /// Minimum time between two accepted presses.
    pub debounce_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            flip_direction: false,
            debounce_ms: 50,
        }
    }
}

/// Motion observed since the previous reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderMotion {
    /// Signed detent count. Positive is clockwise.
    pub steps: i32,
    /// A new press was accepted.
    pub pressed: bool,
}

impl EncoderMotion {
    pub fn is_idle(&self) -> bool {
        self.steps == 0 && !self.pressed
    }
}

/// Relative-motion tracker for one encoder.
#[derive(Debug, Clone)]
pub struct EncoderTracker {
    config: TrackerConfig,
    last_position: Option<i32>,
    button_down: bool,
    last_press_ms: Option<u64>,
}

impl EncoderTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            last_position: None,
            button_down: false,
            last_press_ms: None,
        }
    }

    /// Feed one reading.
    ///
    /// # Arguments
    ///
    /// * `position` - Absolute position reported by the board
    /// * `button_down` - Current button level, `true` while held
    /// * `now_ms` - Monotonic timestamp of the reading
    ///
    /// The first reading only sets the baseline and reports no steps. A press
    /// is the released-to-held edge; edges closer than `debounce_ms` to the
    /// last accepted press are ignored.
    pub fn update(&mut self, position: i32, button_down: bool, now_ms: u64) -> EncoderMotion {
        let mut steps = match self.last_position {
            Some(last) => position.wrapping_sub(last),
            None => 0,
        };
        if self.config.flip_direction {
            steps = steps.wrapping_neg();
        }
        self.last_position = Some(position);

        let edge = button_down && !self.button_down;
        self.button_down = button_down;

        let settled = match self.last_press_ms {
            Some(at) => now_ms.saturating_sub(at) >= self.config.debounce_ms,
            None => true,
        };
        let pressed = edge && settled;
        if pressed {
            self.last_press_ms = Some(now_ms);
        }

        EncoderMotion { steps, pressed }
    }
}

impl Default for EncoderTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reading_is_baseline() {
        let mut tracker = EncoderTracker::default();
        let motion = tracker.update(42, false, 0);
        assert!(motion.is_idle());

        let motion = tracker.update(45, false, 10);
        assert_eq!(motion.steps, 3);
        let motion = tracker.update(43, false, 20);
        assert_eq!(motion.steps, -2);
    }

    #[test]
    fn flip_inverts_direction() {
        let mut tracker = EncoderTracker::new(TrackerConfig {
            flip_direction: true,
            ..TrackerConfig::default()
        });
        tracker.update(0, false, 0);
        assert_eq!(tracker.update(1, false, 1).steps, -1);
        assert_eq!(tracker.update(-1, false, 2).steps, 2);
    }

    #[test]
    fn position_wraparound_is_a_small_step() {
        let mut tracker = EncoderTracker::default();
        tracker.update(i32::MAX, false, 0);
        assert_eq!(tracker.update(i32::MIN, false, 1).steps, 1);
    }

    #[test]
    fn holding_reports_one_press() {
        let mut tracker = EncoderTracker::default();
        tracker.update(0, false, 0);
        assert!(tracker.update(0, true, 100).pressed);
        assert!(!tracker.update(0, true, 200).pressed);
        assert!(!tracker.update(0, false, 300).pressed);
    }

    #[test]
    fn bounce_inside_window_is_ignored() {
        let mut tracker = EncoderTracker::default();
        tracker.update(0, false, 0);
        assert!(tracker.update(0, true, 100).pressed);
        assert!(!tracker.update(0, false, 110).pressed);
        assert!(!tracker.update(0, true, 120).pressed);
        assert!(!tracker.update(0, false, 400).pressed);
        assert!(tracker.update(0, true, 500).pressed);
    }

    #[test]
    fn rotation_and_press_in_one_reading() {
        let mut tracker = EncoderTracker::default();
        tracker.update(5, false, 0);
        let motion = tracker.update(6, true, 100);
        assert_eq!(
            motion,
            EncoderMotion {
                steps: 1,
                pressed: true
            }
        );
    }
}
