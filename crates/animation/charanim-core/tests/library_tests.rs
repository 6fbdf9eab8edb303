use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use charanim_core::{AnimationError, AnimationKey, AnimationLibrary, Animator, Config};

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("charanim-{tag}-{}", std::process::id()))
        .join("gestures");
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn load_bytes_stores_under_name_and_group() {
    let mut lib = AnimationLibrary::new();
    let def = lib
        .load_bytes("wave", "gestures", b"1\nHAND\n0s 0px 0px open\n1s 5px 0px\n")
        .unwrap();
    assert_eq!(def.key(), AnimationKey::new("wave", "gestures"));
    assert!(Arc::ptr_eq(&def, &lib.get("wave", "gestures").unwrap()));
    assert!(lib.get("wave", "other").is_none());
}

#[test]
fn failed_parse_inserts_nothing() {
    let mut lib = AnimationLibrary::new();
    let err = lib
        .load_bytes("bad", "g", b"1\nBODY\n0s 1px\n")
        .unwrap_err();
    assert!(matches!(err, AnimationError::Parse { .. }));
    assert!(lib.is_empty());
}

#[test]
fn files_are_read_once_then_cached() {
    let dir = scratch_dir("cache");
    let path = dir.join("nod.anim");
    fs::write(&path, "1\nHEAD\n0s 0deg\n1s 10deg\n").unwrap();

    let mut lib = AnimationLibrary::new();
    let first = lib.load_file(&path).unwrap();
    assert_eq!(first.key(), AnimationKey::new("nod", "gestures"));

    fs::write(&path, "1\nHEAD\n0s 0deg\n3s 10deg\n").unwrap();
    let second = lib.load_file(&path).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.total_duration, 1.0);
}

#[test]
fn hot_reload_swaps_without_touching_running_instances() {
    let dir = scratch_dir("reload");
    let path = dir.join("shrug.anim");
    fs::write(&path, "1\nBODY\n0s 0deg\n1s 10deg\n").unwrap();

    let mut lib = AnimationLibrary::new();
    let old = lib.load_file(&path).unwrap();

    let mut animator = Animator::new(&Config::default());
    animator.play(Arc::clone(&old), 1.0);

    fs::write(&path, "1\nBODY\n0s 0deg\n4s 10deg\n").unwrap();
    let new = lib.reload_file(&path).unwrap();
    assert_eq!(new.total_duration, 4.0);
    assert_eq!(lib.get("shrug", "gestures").unwrap().total_duration, 4.0);
    assert_eq!(animator.main().unwrap().total_duration(), 1.0);
}

#[test]
fn failed_reload_keeps_cached_definition() {
    let dir = scratch_dir("badreload");
    let path = dir.join("point.anim");
    fs::write(&path, "1\nHAND\n0s 0deg point\n").unwrap();

    let mut lib = AnimationLibrary::new();
    let old = lib.load_file(&path).unwrap();

    fs::write(&path, "1\nHAND\nHAND\nBODY\nBODY\n").unwrap();
    assert!(lib.reload_file(&path).is_err());
    assert!(Arc::ptr_eq(&old, &lib.get("point", "gestures").unwrap()));
}

#[test]
fn missing_file_is_an_io_error() {
    let mut lib = AnimationLibrary::new();
    let err = lib
        .load_file(&scratch_dir("missing").join("nope.anim"))
        .unwrap_err();
    assert!(matches!(err, AnimationError::Io { .. }));
}

#[test]
fn insert_returns_replaced_definition() {
    let mut lib = AnimationLibrary::new();
    let a = charanim_core::parse_animation("1\nBODY\n0s 0deg\n", "x", "y").unwrap();
    assert!(lib.insert(a.clone()).is_none());
    let replaced = lib.insert(a).unwrap();
    assert_eq!(replaced.key(), AnimationKey::new("x", "y"));
    assert_eq!(lib.len(), 1);
    assert_eq!(lib.keys(), vec![AnimationKey::new("x", "y")]);
}
