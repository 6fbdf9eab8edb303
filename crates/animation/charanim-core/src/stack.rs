//! Per-actor stack of running animations.
//!
//! New instances go on top without disturbing the ones below, so the previous
//! animation keeps playing while the blender cross-fades into the new one.

use serde::{Deserialize, Serialize};

use crate::data::AnimationKey;
use crate::ids::InstId;
use crate::instance::ActiveAnimation;

/// Record of an instance removed after finishing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndedAnimation {
    pub inst: InstId,
    pub animation: AnimationKey,
    pub timer: f32,
}

#[derive(Debug)]
pub struct PlaybackStack {
    instances: Vec<ActiveAnimation>,
    clock_enabled: bool,
}

impl Default for PlaybackStack {
    fn default() -> Self {
        Self {
            instances: Vec::new(),
            clock_enabled: true,
        }
    }
}

impl PlaybackStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instance: ActiveAnimation) {
        self.instances.push(instance);
    }

    /// Drop everything without firing end callbacks.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn set_clock_enabled(&mut self, enabled: bool) {
        self.clock_enabled = enabled;
    }

    pub fn clock_enabled(&self) -> bool {
        self.clock_enabled
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveAnimation> {
        self.instances.iter()
    }

    fn main_index(&self) -> Option<usize> {
        self.instances.iter().rposition(|i| !i.is_over())
    }

    /// Most recently pushed instance that has not finished.
    pub fn main(&self) -> Option<&ActiveAnimation> {
        self.main_index().map(|idx| &self.instances[idx])
    }

    pub fn main_mut(&mut self) -> Option<&mut ActiveAnimation> {
        let idx = self.main_index()?;
        Some(&mut self.instances[idx])
    }

    /// The unfinished instance directly beneath the main one.
    pub fn previous(&self) -> Option<&ActiveAnimation> {
        let main = self.main_index()?;
        self.instances[..main].iter().rev().find(|i| !i.is_over())
    }

    pub fn get(&self, id: InstId) -> Option<&ActiveAnimation> {
        self.instances.iter().find(|i| i.id() == id)
    }

    pub fn get_mut(&mut self, id: InstId) -> Option<&mut ActiveAnimation> {
        self.instances.iter_mut().find(|i| i.id() == id)
    }

    pub fn is_playing(&self, key: &AnimationKey) -> bool {
        self.instances.iter().any(|i| {
            let def = i.definition();
            !i.is_over() && def.name == key.name && def.group == key.group
        })
    }

    pub fn is_playing_group(&self, group: &str) -> bool {
        self.instances
            .iter()
            .any(|i| !i.is_over() && i.definition().group == group)
    }

    /// Remove instances that already finished (firing their callbacks), then
    /// advance the rest by `dt` if the clock is enabled. An instance that
    /// reaches its end during this call is removed on the next one.
    pub fn advance(&mut self, dt: f32) -> Vec<EndedAnimation> {
        let mut ended = Vec::new();
        let mut idx = self.instances.len();
        while idx > 0 {
            idx -= 1;
            if self.instances[idx].is_over() {
                let mut inst = self.instances.remove(idx);
                inst.fire_on_end();
                log::trace!("animation {} finished at {:.3}s", inst.key(), inst.timer());
                ended.push(EndedAnimation {
                    inst: inst.id(),
                    animation: inst.key(),
                    timer: inst.timer(),
                });
            } else if self.clock_enabled {
                self.instances[idx].advance(dt);
            }
        }
        ended
    }
}
