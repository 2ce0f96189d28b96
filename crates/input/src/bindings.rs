//! Button bindings: turn held keys into axis events.
//!
//! Each bound key contributes a signed value to one axis component. Pressing
//! or releasing a key recomputes that axis from every key still held and
//! yields an [`AxisEvent`] only if the axis value actually changed.

use crate::axis::{Axis, AxisEvent};
use glam::Vec2;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Which part of an axis a key drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// The single value of a scalar axis.
    Scalar,
    /// Lateral component of [`Axis::Horizontal`].
    X,
    /// Forward component of [`Axis::Horizontal`].
    Y,
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    axis: Axis,
    component: Component,
    value: f32,
}

/// Key-to-axis bindings for a host key type `K`.
#[derive(Debug, Clone)]
pub struct Bindings<K> {
    map: HashMap<K, Binding>,
    held: HashSet<K>,
    current: HashMap<Axis, Vec2>,
}

impl<K> Default for Bindings<K> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            held: HashSet::new(),
            current: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> Bindings<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to add `value` to `component` of `axis` while held.
    pub fn bind(mut self, key: K, axis: Axis, component: Component, value: f32) -> Self {
        self.map.insert(
            key,
            Binding {
                axis,
                component,
                value,
            },
        );
        self
    }

    pub fn is_bound(&self, key: K) -> bool {
        self.map.contains_key(&key)
    }

    pub fn press(&mut self, key: K) -> Option<AxisEvent> {
        let binding = *self.map.get(&key)?;
        if !self.held.insert(key) {
            // Key repeat.
            return None;
        }
        self.recompute(binding.axis)
    }

    pub fn release(&mut self, key: K) -> Option<AxisEvent> {
        let binding = *self.map.get(&key)?;
        if !self.held.remove(&key) {
            return None;
        }
        self.recompute(binding.axis)
    }

    /// Release every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) -> Vec<AxisEvent> {
        let axes: HashSet<Axis> = self
            .held
            .drain()
            .filter_map(|k| self.map.get(&k).map(|b| b.axis))
            .collect();
        let mut axes: Vec<Axis> = axes.into_iter().collect();
        axes.sort();
        axes.into_iter().filter_map(|a| self.recompute(a)).collect()
    }

    fn recompute(&mut self, axis: Axis) -> Option<AxisEvent> {
        let mut value = Vec2::ZERO;
        for key in &self.held {
            let Some(b) = self.map.get(key) else { continue };
            if b.axis != axis {
                continue;
            }
            match b.component {
                Component::Scalar | Component::X => value.x += b.value,
                Component::Y => value.y += b.value,
            }
        }

        let previous = self.current.insert(axis, value).unwrap_or(Vec2::ZERO);
        if previous == value {
            return None;
        }

        Some(match axis {
            Axis::Pitch => AxisEvent::Pitch(value.x),
            Axis::Roll => AxisEvent::Roll(value.x),
            Axis::Yaw => AxisEvent::Yaw(value.x),
            Axis::Horizontal => AxisEvent::Horizontal(value),
            Axis::Vertical => AxisEvent::Vertical(value.x),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wasd() -> Bindings<char> {
        Bindings::new()
            .bind('w', Axis::Horizontal, Component::Y, 1.0)
            .bind('s', Axis::Horizontal, Component::Y, -1.0)
            .bind('a', Axis::Horizontal, Component::X, -1.0)
            .bind('d', Axis::Horizontal, Component::X, 1.0)
            .bind('e', Axis::Roll, Component::Scalar, 1.0)
            .bind('q', Axis::Roll, Component::Scalar, -1.0)
    }

    #[test]
    fn press_emits_axis_value() {
        let mut b = wasd();
        assert_eq!(b.press('w'), Some(AxisEvent::Horizontal(Vec2::new(0.0, 1.0))));
        assert_eq!(b.press('d'), Some(AxisEvent::Horizontal(Vec2::new(1.0, 1.0))));
    }

    #[test]
    fn release_returns_to_zero() {
        let mut b = wasd();
        b.press('e');
        assert_eq!(b.release('e'), Some(AxisEvent::Roll(0.0)));
    }

    #[test]
    fn opposing_keys_cancel_without_event_on_repeat() {
        let mut b = wasd();
        assert_eq!(b.press('q'), Some(AxisEvent::Roll(-1.0)));
        assert_eq!(b.press('e'), Some(AxisEvent::Roll(0.0)));
        // Held key repeat is not a change.
        assert_eq!(b.press('e'), None);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut b = wasd();
        assert!(!b.is_bound('x'));
        assert_eq!(b.press('x'), None);
        assert_eq!(b.release('x'), None);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut b = wasd();
        assert_eq!(b.release('w'), None);
    }

    #[test]
    fn release_all_zeroes_every_held_axis() {
        let mut b = wasd();
        b.press('w');
        b.press('e');
        let events = b.release_all();
        assert_eq!(
            events,
            vec![AxisEvent::Roll(0.0), AxisEvent::Horizontal(Vec2::ZERO)]
        );
        assert!(b.release_all().is_empty());
    }
}
