//! Keyframe curves with normalized positions.
//!
//! Model:
//! - A curve is an append-ordered list of keys, each with a position in [0,1].
//! - Evaluation clamps the query to [0,1], holds the first/last key outside the
//!   authored range and linearly interpolates between the bracketing pair found
//!   by a storage-order scan.
//! - Angles (degrees) use the same component-wise lerp, so 350deg -> 10deg
//!   sweeps backwards through 180 instead of taking the short way round.

use serde::{Deserialize, Serialize};

use crate::data::Vec2;

const SEGMENT_EPS: f32 = 1e-6;

/// Values that can be linearly blended.
pub trait Interpolatable: Copy {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Interpolatable for Vec2 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Vec2::new(
            <f32 as Interpolatable>::lerp(a.x, b.x, t),
            <f32 as Interpolatable>::lerp(a.y, b.y, t),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Key<T> {
    pub value: T,
    pub position: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve<T> {
    keys: Vec<Key<T>>,
}

/// Rotation curve in degrees.
pub type AngleCurve = Curve<f32>;

impl<T> Default for Curve<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T: Interpolatable> Curve<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Append a key. Keys are stored in call order; a key placed before its
    /// predecessor is kept but makes later lookups depend on storage order.
    pub fn append_key(&mut self, value: T, position: f32) {
        if let Some(prev) = self.keys.last() {
            if position < prev.position {
                log::warn!(
                    "curve key at {position} appended after key at {}; lookups scan in storage order",
                    prev.position
                );
            }
        }
        self.keys.push(Key { value, position });
    }

    #[inline]
    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first(&self) -> Option<T> {
        self.keys.first().map(|k| k.value)
    }

    pub fn last(&self) -> Option<T> {
        self.keys.last().map(|k| k.value)
    }

    /// Sample the curve at normalized time `t`. Returns `None` for an empty curve.
    ///
    /// The first stored pair that brackets `t` wins, even when keys are out of
    /// time order. With no bracketing pair the first or last key is held.
    pub fn evaluate(&self, t: f32) -> Option<T> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let first = self.keys.first()?;
        if self.keys.len() == 1 {
            return Some(first.value);
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.position <= t && t <= b.position {
                let span = b.position - a.position;
                if span <= SEGMENT_EPS || t == b.position {
                    return Some(b.value);
                }
                if t == a.position {
                    return Some(a.value);
                }
                return Some(T::lerp(a.value, b.value, (t - a.position) / span));
            }
        }
        if t <= first.position {
            Some(first.value)
        } else {
            self.last()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-5
    }

    #[test]
    fn empty_curve_has_no_value() {
        let c: Curve<f32> = Curve::new();
        assert_eq!(c.evaluate(0.5), None);
    }

    #[test]
    fn single_key_is_constant() {
        let mut c = Curve::new();
        c.append_key(3.0f32, 0.5);
        assert_eq!(c.evaluate(0.0), Some(3.0));
        assert_eq!(c.evaluate(1.0), Some(3.0));
    }

    #[test]
    fn interpolates_and_clamps() {
        let mut c = Curve::new();
        c.append_key(Vec2::new(0.0, 0.0), 0.0);
        c.append_key(Vec2::new(10.0, -4.0), 1.0);
        let mid = c.evaluate(0.25).unwrap();
        assert!(approx(mid.x, 2.5) && approx(mid.y, -1.0));
        assert_eq!(c.evaluate(-3.0), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(c.evaluate(7.0), Some(Vec2::new(10.0, -4.0)));
    }

    #[test]
    fn holds_outside_authored_range() {
        let mut c = Curve::new();
        c.append_key(1.0f32, 0.2);
        c.append_key(2.0f32, 0.8);
        assert_eq!(c.evaluate(0.1), Some(1.0));
        assert_eq!(c.evaluate(0.9), Some(2.0));
        assert!(approx(c.evaluate(0.5).unwrap(), 1.5));
    }

    #[test]
    fn coincident_keys_take_the_later_value() {
        let mut c = Curve::new();
        c.append_key(0.0f32, 0.0);
        c.append_key(1.0f32, 0.5);
        c.append_key(5.0f32, 0.5);
        c.append_key(6.0f32, 1.0);
        assert!(approx(c.evaluate(0.75).unwrap(), 5.5));
    }

    #[test]
    fn out_of_order_keys_use_the_first_bracketing_pair() {
        let mut c = Curve::new();
        c.append_key(5.0f32, 0.5);
        c.append_key(0.0f32, 0.0);
        c.append_key(10.0f32, 1.0);
        assert!(approx(c.evaluate(0.25).unwrap(), 2.5));
        // (0.5, 0.0) never brackets, so (0.0, 1.0) answers here too
        assert!(approx(c.evaluate(0.75).unwrap(), 7.5));
    }

    #[test]
    fn angles_do_not_wrap() {
        let mut c: AngleCurve = Curve::new();
        c.append_key(350.0, 0.0);
        c.append_key(10.0, 1.0);
        assert!(approx(c.evaluate(0.5).unwrap(), 180.0));
    }
}
