//! Time-driven mark motion: easing, tweens and mid-flight retargeting.
//!
//! Motions are evaluated lazily from a millisecond clock supplied by the caller,
//! so nothing here waits or schedules; a front end simply samples
//! [`Motion::state_at`] whenever it paints.

use serde::Serialize;

/// Visual state of a mark that can be animated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkState {
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

impl MarkState {
    pub fn lerp(&self, to: &MarkState, t: f64) -> MarkState {
        MarkState {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            opacity: self.opacity + (to.opacity - self.opacity) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Symmetric cubic ease-in-out.
    #[default]
    CubicInOut,
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
        }
    }
}

/// A scheduled tween toward `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// Motion in effect until this tween starts; also provides the start state.
    pub prior: Box<Motion>,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub to: MarkState,
    pub easing: Easing,
}

impl Tween {
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    Still(MarkState),
    Tween(Tween),
}

impl Motion {
    pub fn state_at(&self, t: f64) -> MarkState {
        match self {
            Motion::Still(s) => *s,
            Motion::Tween(tw) => {
                if t < tw.start_ms {
                    return tw.prior.state_at(t);
                }
                let from = tw.prior.state_at(tw.start_ms);
                if tw.duration_ms <= 0.0 || t >= tw.end_ms() {
                    return tw.to;
                }
                let k = tw.easing.apply((t - tw.start_ms) / tw.duration_ms);
                from.lerp(&tw.to, k)
            }
        }
    }

    /// Where the motion ends up once every tween has run.
    pub fn target(&self) -> MarkState {
        match self {
            Motion::Still(s) => *s,
            Motion::Tween(tw) => tw.to,
        }
    }

    /// Time at which the motion stops changing.
    pub fn settles_at(&self) -> f64 {
        match self {
            Motion::Still(_) => f64::NEG_INFINITY,
            Motion::Tween(tw) => tw.end_ms().max(tw.prior.settles_at()),
        }
    }

    pub fn is_moving(&self, t: f64) -> bool {
        t < self.settles_at()
    }

    /// Drop tweens that no longer matter at `now`: finished ones collapse to their
    /// end state, and ones that have not started yet are cancelled.
    fn settle(self, now: f64) -> Motion {
        match self {
            Motion::Still(_) => self,
            Motion::Tween(tw) => {
                if now < tw.start_ms {
                    tw.prior.settle(now)
                } else if now >= tw.end_ms() {
                    Motion::Still(tw.to)
                } else {
                    Motion::Tween(Tween {
                        prior: Box::new(Motion::Still(tw.prior.state_at(tw.start_ms))),
                        ..tw
                    })
                }
            }
        }
    }

    /// Schedule a move toward `to`, starting `delay_ms` after `now`.
    ///
    /// A tween already running keeps running until the new one starts, which then
    /// departs from wherever the mark is at that instant.
    pub fn retarget(self, now: f64, delay_ms: f64, duration_ms: f64, to: MarkState, easing: Easing) -> Motion {
        Motion::Tween(Tween {
            prior: Box::new(self.settle(now)),
            start_ms: now + delay_ms.max(0.0),
            duration_ms: duration_ms.max(0.0),
            to,
            easing,
        })
    }
}
