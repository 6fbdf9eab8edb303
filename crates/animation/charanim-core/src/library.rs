//! Cache of parsed definitions keyed by `(name, group)`.
//!
//! Definitions are handed out as `Arc`s. Replacing an entry (hot reload) only
//! swaps the stored pointer; instances already playing keep the definition they
//! started with.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::data::{AnimationKey, CharacterAnimationDefinition};
use crate::error::{AnimationError, Result};
use crate::parser::parse_animation_bytes;

pub const ANIMATION_EXTENSION: &str = "anim";

#[derive(Debug, Default)]
pub struct AnimationLibrary {
    items: HashMap<AnimationKey, Arc<CharacterAnimationDefinition>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// True for paths with an `.anim` extension, ignoring case.
    pub fn is_candidate(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ANIMATION_EXTENSION))
    }

    /// Name is the file stem, group the parent directory's name (empty at the root).
    pub fn key_for_path(path: &Path) -> AnimationKey {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let group = path
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        AnimationKey::new(name, group)
    }

    /// Store `definition`, returning whatever it replaced.
    pub fn insert(
        &mut self,
        definition: CharacterAnimationDefinition,
    ) -> Option<Arc<CharacterAnimationDefinition>> {
        self.items.insert(definition.key(), Arc::new(definition))
    }

    pub fn get(&self, name: &str, group: &str) -> Option<Arc<CharacterAnimationDefinition>> {
        self.get_key(&AnimationKey::new(name, group))
    }

    pub fn get_key(&self, key: &AnimationKey) -> Option<Arc<CharacterAnimationDefinition>> {
        self.items.get(key).cloned()
    }

    pub fn remove(&mut self, key: &AnimationKey) -> Option<Arc<CharacterAnimationDefinition>> {
        self.items.remove(key)
    }

    pub fn contains(&self, key: &AnimationKey) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<AnimationKey> {
        let mut keys: Vec<_> = self.items.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Parse `bytes` and store the result. A failed parse leaves the library untouched.
    pub fn load_bytes(
        &mut self,
        name: &str,
        group: &str,
        bytes: &[u8],
    ) -> Result<Arc<CharacterAnimationDefinition>> {
        let def = parse_animation_bytes(bytes, name, group).map_err(|source| {
            AnimationError::Parse {
                name: format!("{group}/{name}"),
                source,
            }
        })?;
        let def = Arc::new(def);
        self.items.insert(def.key(), Arc::clone(&def));
        Ok(def)
    }

    /// Load a file once; later calls for the same key return the cached definition.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<CharacterAnimationDefinition>> {
        let key = Self::key_for_path(path);
        if let Some(def) = self.items.get(&key) {
            return Ok(Arc::clone(def));
        }
        self.read_and_store(path, key)
    }

    /// Re-read a file and swap the cached definition. On failure the old one stays.
    pub fn reload_file(&mut self, path: &Path) -> Result<Arc<CharacterAnimationDefinition>> {
        let key = Self::key_for_path(path);
        let def = self.read_and_store(path, key)?;
        log::debug!("reloaded animation {} from {}", def.key(), path.display());
        Ok(def)
    }

    /// Load every candidate file directly inside `dir`. Returns how many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let io_err = |e: std::io::Error| AnimationError::Io {
            path: dir.display().to_string(),
            reason: e.to_string(),
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && Self::is_candidate(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        for path in &paths {
            self.load_file(path)?;
        }
        Ok(paths.len())
    }

    fn read_and_store(
        &mut self,
        path: &Path,
        key: AnimationKey,
    ) -> Result<Arc<CharacterAnimationDefinition>> {
        let bytes = fs::read(path).map_err(|e| AnimationError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let def = self.load_bytes(&key.name, &key.group, &bytes)?;
        log::debug!("loaded animation {} ({:.3}s)", key, def.total_duration);
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_comes_from_stem_and_parent() {
        let key = AnimationLibrary::key_for_path(Path::new("assets/animations/melee/swing.anim"));
        assert_eq!(key, AnimationKey::new("swing", "melee"));
    }

    #[test]
    fn candidates_match_extension_ignoring_case() {
        assert!(AnimationLibrary::is_candidate(Path::new("a/b.ANIM")));
        assert!(AnimationLibrary::is_candidate(Path::new("b.anim")));
        assert!(!AnimationLibrary::is_candidate(Path::new("b.anim.txt")));
        assert!(!AnimationLibrary::is_candidate(Path::new("anim")));
    }
}
