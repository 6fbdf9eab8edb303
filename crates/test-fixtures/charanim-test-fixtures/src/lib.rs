use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    animations: HashMap<String, String>,
    #[serde(default)]
    broken: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_bytes(rel: &str) -> Result<Vec<u8>> {
    let path = resolve_path(rel);
    fs::read(&path).with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Well-formed `.anim` files.
pub mod animations {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<_> = MANIFEST.animations.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn bytes(name: &str) -> Result<Vec<u8>> {
        read_bytes(lookup(&MANIFEST.animations, "animation", name)?)
    }

    pub fn text(name: &str) -> Result<String> {
        let raw = bytes(name)?;
        String::from_utf8(raw).with_context(|| format!("fixture '{name}' is not UTF-8"))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.animations, "animation", name)?))
    }

    /// Directory holding the animation group `group`.
    pub fn group_dir(group: &str) -> PathBuf {
        resolve_path("animations").join(group)
    }
}

/// Files that must be rejected by the parser.
pub mod broken {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<_> = MANIFEST.broken.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn bytes(name: &str) -> Result<Vec<u8>> {
        read_bytes(lookup(&MANIFEST.broken, "broken animation", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.broken, "broken animation", name)?))
    }
}
