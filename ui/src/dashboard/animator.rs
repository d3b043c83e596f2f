//! Count-up tweening for the headline numbers.
//!
//! A [`ValueAnimator`] owns the timeline of a single displayed value. It does
//! not schedule anything itself: whoever drives the frame loop calls
//! [`ValueAnimator::step`] once per tick until it reports [`Step::Settled`].

use crate::core::config::DEFAULT_ANIMATION_MS;
use crate::core::timing::InstantStamp;

/// `1 - (1 - p)^3`, with `p` clamped to `[0, 1]`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub displayed_value: f64,
    pub target_value: f64,
    pub started_at: InstantStamp,
    pub start_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Still interpolating; carries the freshly displayed value.
    Running(f64),
    /// Reached the target on this step.
    Settled(f64),
    /// Nothing to do (never targeted, already settled, or cancelled).
    Idle,
}

impl Step {
    pub fn is_running(self) -> bool {
        matches!(self, Step::Running(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueAnimator {
    duration_ms: f64,
    state: Option<AnimationState>,
    running: bool,
    cancelled: bool,
}

impl Default for ValueAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_MS)
    }
}

impl ValueAnimator {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            state: None,
            running: false,
            cancelled: false,
        }
    }

    pub fn state(&self) -> Option<&AnimationState> {
        self.state.as_ref()
    }

    pub fn displayed(&self) -> f64 {
        self.state.map(|s| s.displayed_value).unwrap_or(0.0)
    }

    /// Displayed value for percentage-style fields.
    pub fn rounded(&self) -> i64 {
        self.displayed().round() as i64
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Point the animation at a new target.
    ///
    /// The first target ever seen animates up from zero. Later targets start
    /// from whatever is displayed right now, so an in-flight animation is
    /// redirected without a jump. Returns `true` when a new animation began.
    pub fn retarget(&mut self, target: f64, now: InstantStamp) -> bool {
        if self.cancelled || !target.is_finite() {
            return false;
        }

        let start_value = match self.state {
            None => 0.0,
            Some(state) if state.target_value == target => return false,
            Some(state) => state.displayed_value,
        };

        self.state = Some(AnimationState {
            displayed_value: start_value,
            target_value: target,
            started_at: now,
            start_value,
        });
        self.running = true;
        true
    }

    /// Compute the value for this frame.
    pub fn step(&mut self, now: InstantStamp) -> Step {
        if !self.running || self.cancelled {
            return Step::Idle;
        }
        let Some(state) = self.state.as_mut() else {
            self.running = false;
            return Step::Idle;
        };

        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (now.elapsed_since(state.started_at) / self.duration_ms).clamp(0.0, 1.0)
        };

        if progress >= 1.0 {
            state.displayed_value = state.target_value;
            self.running = false;
            return Step::Settled(state.displayed_value);
        }

        let eased = ease_out_cubic(progress);
        state.displayed_value =
            state.start_value + (state.target_value - state.start_value) * eased;
        Step::Running(state.displayed_value)
    }

    /// Stop for good; later targets and steps are ignored.
    pub fn cancel(&mut self) {
        self.running = false;
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// The numbers on the dashboard that count up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatedField {
    EquityAllocation,
    BondAllocation,
    Confidence,
    WinRate,
}

impl AnimatedField {
    pub const ALL: [AnimatedField; 4] = [
        AnimatedField::EquityAllocation,
        AnimatedField::BondAllocation,
        AnimatedField::Confidence,
        AnimatedField::WinRate,
    ];

    fn index(self) -> usize {
        match self {
            AnimatedField::EquityAllocation => 0,
            AnimatedField::BondAllocation => 1,
            AnimatedField::Confidence => 2,
            AnimatedField::WinRate => 3,
        }
    }
}

/// One independent animator per [`AnimatedField`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAnimators {
    animators: [ValueAnimator; 4],
}

impl FieldAnimators {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            animators: std::array::from_fn(|_| ValueAnimator::new(duration_ms)),
        }
    }

    pub fn get(&self, field: AnimatedField) -> &ValueAnimator {
        &self.animators[field.index()]
    }

    pub fn retarget(&mut self, field: AnimatedField, target: f64, now: InstantStamp) -> bool {
        self.animators[field.index()].retarget(target, now)
    }

    /// Step every field; `true` while any of them is still moving.
    pub fn step_all(&mut self, now: InstantStamp) -> bool {
        self.animators
            .iter_mut()
            .map(|animator| animator.step(now).is_running())
            .fold(false, |any, running| any || running)
    }

    pub fn any_running(&self) -> bool {
        self.animators.iter().any(ValueAnimator::is_running)
    }

    pub fn cancel_all(&mut self) {
        self.animators.iter_mut().for_each(ValueAnimator::cancel);
    }

    pub fn rounded(&self, field: AnimatedField) -> i64 {
        self.get(field).rounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: f64) -> InstantStamp {
        InstantStamp(ms)
    }

    /// Step from `from` to `to` (inclusive) every 16 ms and collect the values.
    fn run(animator: &mut ValueAnimator, from: f64, to: f64) -> Vec<f64> {
        let mut values = Vec::new();
        let mut t = from;
        while t <= to {
            match animator.step(at(t)) {
                Step::Running(v) | Step::Settled(v) => values.push(v),
                Step::Idle => {}
            }
            t += 16.0;
        }
        values
    }

    #[test]
    fn easing_curve_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn first_target_counts_up_from_zero() {
        let mut animator = ValueAnimator::new(800.0);
        assert!(animator.retarget(70.0, at(0.0)));
        assert_eq!(animator.state().unwrap().start_value, 0.0);

        let Step::Running(halfway) = animator.step(at(400.0)) else {
            panic!("expected a running step");
        };
        assert!((halfway - 70.0 * 0.875).abs() < 1e-9);

        assert_eq!(animator.step(at(800.0)), Step::Settled(70.0));
        assert_eq!(animator.step(at(816.0)), Step::Idle);
        assert_eq!(animator.rounded(), 70);
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut animator = ValueAnimator::new(800.0);
        animator.retarget(50.0, at(0.0));
        run(&mut animator, 0.0, 800.0);
        assert!(!animator.retarget(50.0, at(900.0)));
        assert!(!animator.is_running());
    }

    #[test]
    fn retarget_sequence_converges_without_jumps() {
        let mut animator = ValueAnimator::new(800.0);

        // 0: entrance animation with nothing to move.
        animator.retarget(0.0, at(0.0));
        run(&mut animator, 0.0, 800.0);
        assert_eq!(animator.displayed(), 0.0);

        // 0 -> 50, interrupted halfway.
        assert!(animator.retarget(50.0, at(1000.0)));
        let rising = run(&mut animator, 1000.0, 1400.0);
        assert!(rising.windows(2).all(|w| w[1] >= w[0]));
        assert!(rising.iter().all(|v| (0.0..=50.0).contains(v)));

        // Repeating 50 is a no-op for the in-flight animation.
        assert!(!animator.retarget(50.0, at(1400.0)));

        let before = animator.displayed();
        assert!(animator.retarget(20.0, at(1400.0)));
        assert_eq!(animator.state().unwrap().start_value, before);
        // No discontinuity at the moment of retargeting.
        assert_eq!(animator.step(at(1400.0)), Step::Running(before));

        let falling = run(&mut animator, 1416.0, 2300.0);
        assert!(falling.windows(2).all(|w| w[1] <= w[0]));
        assert!(falling.iter().all(|v| *v >= 20.0 && *v <= before));
        assert_eq!(animator.displayed(), 20.0);
        assert!(!animator.is_running());
    }

    #[test]
    fn full_run_then_new_target_starts_from_settled_value() {
        let mut animator = ValueAnimator::new(800.0);
        animator.retarget(50.0, at(0.0));
        run(&mut animator, 0.0, 800.0);

        animator.retarget(20.0, at(2000.0));
        assert_eq!(animator.state().unwrap().start_value, 50.0);
    }

    #[test]
    fn cancelled_animator_stops_stepping() {
        let mut animator = ValueAnimator::new(800.0);
        animator.retarget(40.0, at(0.0));
        animator.step(at(100.0));
        animator.cancel();

        assert_eq!(animator.step(at(200.0)), Step::Idle);
        assert!(!animator.retarget(10.0, at(300.0)));
        assert!(!animator.is_running());
    }

    #[test]
    fn fields_animate_independently() {
        let mut fields = FieldAnimators::new(800.0);
        fields.retarget(AnimatedField::EquityAllocation, 70.0, at(0.0));
        fields.retarget(AnimatedField::WinRate, 60.0, at(400.0));

        assert!(fields.step_all(at(800.0)));
        assert_eq!(fields.rounded(AnimatedField::EquityAllocation), 70);
        assert!(fields.get(AnimatedField::WinRate).is_running());
        assert_eq!(fields.rounded(AnimatedField::Confidence), 0);

        assert!(!fields.step_all(at(1200.0)));
        assert_eq!(fields.rounded(AnimatedField::WinRate), 60);
    }

    #[test]
    fn displayed_values_round_to_whole_percent() {
        let mut animator = ValueAnimator::new(800.0);
        animator.retarget(33.0, at(0.0));
        animator.step(at(100.0));
        let shown = animator.rounded();
        assert_eq!(shown as f64, animator.displayed().round());
    }
}
