//! # Frame Gate
//!
//! Rate-limiting decision for continuous capture. The mirroring surface
//! delivers frames at its native rate, which may far exceed what the
//! consumer asked for; the gate bounds the CPU spent on conversion by
//! deciding per frame whether to process or drop it. No buffering, no
//! source-side dropping.

/// Pure accept/drop decision for one delivered frame.
///
/// The gate keeps no state of its own: the caller owns the
/// last-accepted timestamp and updates it after an accepted frame. That
/// keeps the decision independently testable with explicit clocks.
pub struct FrameGate;

impl FrameGate {
    /// Decide whether a frame arriving at `now_ms` should be processed.
    ///
    /// `fps == 0` disables throttling entirely and accepts every frame.
    /// Otherwise a frame is accepted when at least `floor(1000 / fps)`
    /// milliseconds have passed since `last_accepted_ms`. On accept, the
    /// caller must store `now_ms` as the new last-accepted time.
    pub fn should_accept(fps: u32, now_ms: i64, last_accepted_ms: i64) -> bool {
        if fps == 0 {
            return true;
        }
        now_ms - last_accepted_ms >= Self::min_interval_ms(fps)
    }

    /// Minimum spacing between accepted frames for a target rate. An
    /// unthrottled rate (`fps == 0`) has no minimum and reports 0.
    pub fn min_interval_ms(fps: u32) -> i64 {
        if fps == 0 {
            return 0;
        }
        (1000 / fps) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unthrottled_accepts_everything() {
        assert!(FrameGate::should_accept(0, 100, 100));
        assert!(FrameGate::should_accept(0, 100, 99));
        assert!(FrameGate::should_accept(0, 0, i64::MAX));
    }

    #[test]
    fn test_unthrottled_has_no_minimum_interval() {
        assert_eq!(FrameGate::min_interval_ms(0), 0);
    }

    #[test]
    fn test_interval_boundary() {
        // 10 fps => 100ms between accepted frames.
        assert!(!FrameGate::should_accept(10, 1099, 1000));
        assert!(FrameGate::should_accept(10, 1100, 1000));
        assert!(FrameGate::should_accept(10, 1101, 1000));
    }

    #[test]
    fn test_interval_is_floored() {
        // 1000 / 30 = 33 (integer division).
        assert_eq!(FrameGate::min_interval_ms(30), 33);
        assert!(FrameGate::should_accept(30, 33, 0));
        assert!(!FrameGate::should_accept(30, 32, 0));
    }

    #[test]
    fn test_back_to_back_rejected() {
        let fps = 15;
        let first = 5_000;
        assert!(FrameGate::should_accept(fps, first, 0));
        // Caller stores `first`; the immediately following frame is dropped.
        assert!(!FrameGate::should_accept(fps, first + 1, first));
        assert!(FrameGate::should_accept(fps, first + 66, first));
    }
}
