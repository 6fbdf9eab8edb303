//! Line-oriented parser for `.anim` character animation files.
//!
//! File layout:
//! ```text
//! 1.0                      # version line, required, content ignored
//! fps 30                   # optional directives before any block
//! speed 1.5
//! scale 2
//! smooth
//! relative
//! BODY
//! 0 0px 0px 0deg constraints(PreventWalking)
//! 12 4px -2px 15deg
//! HAND
//! aim
//! 0s 10px 0px fist scale(1,1)
//! 0.5s 12px 3px open
//! ```
//!
//! Parsing is a single streaming pass. Keyframes are buffered per block and
//! normalized against the block's longest time when the block closes. Every
//! grammar error is fatal; the only tolerated mistake is a bad `speed` value,
//! which is logged and ignored.

use std::io::BufRead;

use crate::constraint::{ConstraintMask, ConstraintTimeline};
use crate::curve::Curve;
use crate::data::{CharacterAnimationDefinition, LimbKind, LimbTrack, Vec2};
use crate::error::{ParseError, ParseErrorKind};
use crate::hand_look::HandLook;

const DEFAULT_FPS: u32 = 24;
const DEFAULT_SPEED: f32 = 1.0;
const DEFAULT_SCALE: f32 = 1.0;

type ParseResult<T> = Result<T, ParseErrorKind>;

/// Parse a complete animation held in memory.
pub fn parse_animation(
    text: &str,
    name: &str,
    group: &str,
) -> Result<CharacterAnimationDefinition, ParseError> {
    parse_animation_reader(text.as_bytes(), name, group)
}

/// Parse raw bytes; invalid UTF-8 is reported with its line number.
pub fn parse_animation_bytes(
    bytes: &[u8],
    name: &str,
    group: &str,
) -> Result<CharacterAnimationDefinition, ParseError> {
    parse_animation_reader(bytes, name, group)
}

/// Parse from any buffered reader, one line at a time.
pub fn parse_animation_reader<R: BufRead>(
    reader: R,
    name: &str,
    group: &str,
) -> Result<CharacterAnimationDefinition, ParseError> {
    let mut state = ParserState::new(name, group);
    for (idx, raw) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let raw = raw.map_err(|e| {
            ParseError::new(
                line_no,
                ParseErrorKind::Io {
                    reason: e.to_string(),
                },
            )
        })?;
        let line = String::from_utf8(raw)
            .map_err(|_| ParseError::new(line_no, ParseErrorKind::InvalidUtf8))?;
        state
            .feed(&line)
            .map_err(|kind| ParseError::new(line_no, kind))?;
    }
    let last_line = state.line_count;
    state
        .finish()
        .map_err(|kind| ParseError::new(last_line.max(1), kind))
}

#[derive(Debug, Clone, Copy)]
struct Directives {
    fps: u32,
    speed: f32,
    scale: f32,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            speed: DEFAULT_SPEED,
            scale: DEFAULT_SCALE,
        }
    }
}

/// One keyframe line waiting for its block to close.
#[derive(Debug, Default)]
struct PendingKey {
    time: f32,
    position: Option<Vec2>,
    rotation: Option<f32>,
    scale: Option<Vec2>,
    look: Option<HandLook>,
}

#[derive(Debug)]
struct OpenBlock {
    kind: LimbKind,
    adjust_for_aim: bool,
    keys: Vec<PendingKey>,
}

#[derive(Debug)]
struct ParserState {
    name: String,
    group: String,
    line_count: usize,
    version_seen: bool,
    directives: Directives,
    block: Option<OpenBlock>,
    body: Option<LimbTrack>,
    head: Option<LimbTrack>,
    hands: Vec<LimbTrack>,
    constraints: ConstraintTimeline,
    do_smoothing: bool,
    relative_hand_position: bool,
}

impl ParserState {
    fn new(name: &str, group: &str) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            line_count: 0,
            version_seen: false,
            directives: Directives::default(),
            block: None,
            body: None,
            head: None,
            hands: Vec::new(),
            constraints: ConstraintTimeline::new(),
            do_smoothing: false,
            relative_hand_position: false,
        }
    }

    fn feed(&mut self, raw: &str) -> ParseResult<()> {
        self.line_count += 1;
        let mut line = raw.trim();
        if self.line_count == 1 {
            line = line.trim_start_matches('\u{feff}').trim();
        }
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        if !self.version_seen {
            self.version_seen = true;
            return Ok(());
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default();
        let payload = words.next();
        // bare keywords must fill the whole line
        let keyword = match head {
            "fps" | "speed" | "scale" => head,
            _ => line,
        };

        match keyword {
            "BODY" => self.open_block(LimbKind::Body),
            "HEAD" => self.open_block(LimbKind::Head),
            "HAND" => {
                // index must count the block being closed
                self.close_block();
                self.open_block(LimbKind::Hand(self.hands.len()))
            }
            "fps" | "speed" | "scale" => {
                if self.block.is_some() {
                    return Err(ParseErrorKind::DirectiveInsideBlock {
                        directive: head.to_string(),
                    });
                }
                self.apply_directive(head, payload)
            }
            "smooth" | "relative" => {
                if self.block.is_some() {
                    return Err(ParseErrorKind::DirectiveInsideBlock {
                        directive: head.to_string(),
                    });
                }
                if head == "smooth" {
                    self.do_smoothing = true;
                } else {
                    self.relative_hand_position = true;
                }
                Ok(())
            }
            "aim" => match self.block.as_mut() {
                Some(block) => {
                    block.adjust_for_aim = true;
                    Ok(())
                }
                None => Err(ParseErrorKind::DirectiveOutsideBlock {
                    directive: "aim".into(),
                }),
            },
            _ => self.keyframe(line),
        }
    }

    fn apply_directive(&mut self, directive: &str, payload: Option<&str>) -> ParseResult<()> {
        let value = payload.unwrap_or_default();
        match directive {
            "fps" => match value.parse::<u32>() {
                Ok(fps) if fps > 0 => self.directives.fps = fps,
                _ => {
                    return Err(ParseErrorKind::InvalidFps {
                        value: value.to_string(),
                    })
                }
            },
            "speed" => match parse_decimal(value) {
                Ok(speed) if speed > 0.0 => self.directives.speed = speed,
                _ => log::warn!(
                    "animation {}/{}: ignoring invalid speed '{}' on line {}",
                    self.group,
                    self.name,
                    value,
                    self.line_count
                ),
            },
            _ => match parse_decimal(value) {
                Ok(scale) => self.directives.scale = scale,
                Err(_) => {
                    return Err(ParseErrorKind::InvalidScale {
                        value: value.to_string(),
                    })
                }
            },
        }
        Ok(())
    }

    fn open_block(&mut self, kind: LimbKind) -> ParseResult<()> {
        self.close_block();
        match kind {
            LimbKind::Body if self.body.is_some() => {
                return Err(ParseErrorKind::DuplicateBlock { block: "BODY" })
            }
            LimbKind::Head if self.head.is_some() => {
                return Err(ParseErrorKind::DuplicateBlock { block: "HEAD" })
            }
            _ => {}
        }
        self.block = Some(OpenBlock {
            kind,
            adjust_for_aim: false,
            keys: Vec::new(),
        });
        Ok(())
    }

    fn close_block(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        let duration = block.keys.iter().fold(0.0f32, |acc, k| acc.max(k.time));
        let mut track = LimbTrack::new(block.kind);
        track.duration = duration;
        track.adjust_for_aim = block.adjust_for_aim;

        for key in &block.keys {
            let t = if duration > 0.0 { key.time / duration } else { 0.0 };
            if let Some(p) = key.position {
                track
                    .translation
                    .get_or_insert_with(Curve::new)
                    .append_key(p, t);
            }
            if let Some(r) = key.rotation {
                track.rotation.get_or_insert_with(Curve::new).append_key(r, t);
            }
            if let Some(s) = key.scale {
                track.scale.get_or_insert_with(Curve::new).append_key(s, t);
            }
            if let Some(look) = key.look {
                track.hand_looks.push(t, look);
            }
        }

        log::debug!(
            "animation {}/{}: closed {:?} block, {} keys over {:.3}s",
            self.group,
            self.name,
            track.kind,
            block.keys.len(),
            duration
        );

        match track.kind {
            LimbKind::Body => self.body = Some(track),
            LimbKind::Head => self.head = Some(track),
            LimbKind::Hand(_) => self.hands.push(track),
        }
    }

    fn keyframe(&mut self, line: &str) -> ParseResult<()> {
        let Some(block) = self.block.as_ref() else {
            return Err(ParseErrorKind::KeyframeOutsideBlock);
        };
        let in_hand = matches!(block.kind, LimbKind::Hand(_));
        let d = self.directives;

        let mut key = PendingKey::default();
        let mut time: Option<f32> = None;
        let mut px: Vec<f32> = Vec::with_capacity(2);
        let mut constraints: Option<ConstraintMask> = None;

        for token in tokenize(line)? {
            if let Some(inner) = group_body(token, "constraints") {
                if constraints.is_some() {
                    return Err(ParseErrorKind::DuplicateToken {
                        what: "constraints",
                    });
                }
                constraints = Some(parse_constraints(inner)?);
            } else if let Some(inner) = group_body(token, "scale") {
                if key.scale.is_some() {
                    return Err(ParseErrorKind::DuplicateToken { what: "scale" });
                }
                key.scale = Some(parse_scale_pair(token, inner)?);
            } else if let Some(num) = numeric_with_suffix(token, "deg") {
                if key.rotation.is_some() {
                    return Err(ParseErrorKind::DuplicateRotation);
                }
                key.rotation = Some(parse_decimal(num)?);
            } else if let Some(num) = numeric_with_suffix(token, "px") {
                px.push(parse_decimal(num)?);
            } else if let Some(num) = numeric_with_suffix(token, "s") {
                set_time(&mut time, parse_decimal(num)? / d.speed)?;
            } else if is_integer(token) {
                let frames: i64 = token.parse().map_err(|_| ParseErrorKind::InvalidNumber {
                    token: token.to_string(),
                })?;
                set_time(&mut time, frames as f32 / d.fps as f32 / d.speed)?;
            } else if token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                let look = HandLook::from_name(token).ok_or_else(|| ParseErrorKind::UnknownToken {
                    token: token.to_string(),
                })?;
                if !in_hand {
                    return Err(ParseErrorKind::HandLookOutsideHand {
                        name: token.to_string(),
                    });
                }
                if key.look.is_some() {
                    return Err(ParseErrorKind::DuplicateToken { what: "hand look" });
                }
                key.look = Some(look);
            } else {
                return Err(ParseErrorKind::UnknownToken {
                    token: token.to_string(),
                });
            }
        }

        key.time = time.ok_or(ParseErrorKind::MissingTime)?;
        key.position = match px.as_slice() {
            [] => None,
            [x, y] => Some(Vec2::new(*x, *y) * d.scale),
            _ => return Err(ParseErrorKind::PositionArity { count: px.len() }),
        };
        if let Some(mask) = constraints {
            self.constraints.push(key.time, mask);
        }
        if let Some(block) = self.block.as_mut() {
            block.keys.push(key);
        }
        Ok(())
    }

    fn finish(mut self) -> ParseResult<CharacterAnimationDefinition> {
        if !self.version_seen {
            return Err(ParseErrorKind::MissingVersion);
        }
        self.close_block();
        self.constraints.sort();

        let total_duration = self
            .body
            .iter()
            .chain(self.head.iter())
            .chain(self.hands.iter())
            .fold(0.0f32, |acc, t| acc.max(t.duration));

        log::debug!(
            "parsed animation {}/{}: {} hand tracks, {:.3}s",
            self.group,
            self.name,
            self.hands.len(),
            total_duration
        );

        Ok(CharacterAnimationDefinition {
            name: self.name,
            group: self.group,
            body: self.body,
            head: self.head,
            hands: self.hands,
            constraints: self.constraints,
            total_duration,
            do_smoothing: self.do_smoothing,
            relative_hand_position: self.relative_hand_position,
        })
    }
}

fn set_time(slot: &mut Option<f32>, time: f32) -> ParseResult<()> {
    if slot.is_some() {
        return Err(ParseErrorKind::DuplicateTime);
    }
    if time < 0.0 {
        return Err(ParseErrorKind::NegativeTime { time });
    }
    *slot = Some(time);
    Ok(())
}

/// Split on whitespace, keeping parenthesised groups together.
fn tokenize(line: &str) -> ParseResult<Vec<&str>> {
    let unbalanced = || ParseErrorKind::UnbalancedParens {
        line: line.to_string(),
    };
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    for (i, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            _ => {}
        }
        if c.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                tokens.push(&line[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }
    Ok(tokens)
}

/// `name(inner)` -> `inner`.
fn group_body<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    token
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Strip `suffix` from tokens that start like a number (`12px`, `-3.5deg`, `.5s`).
fn numeric_with_suffix<'a>(token: &'a str, suffix: &str) -> Option<&'a str> {
    let num = token.strip_suffix(suffix)?;
    num.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.')
        .then_some(num)
}

fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Invariant decimal: optional `-`, digits, at most one `.`, at least one digit.
fn parse_decimal(token: &str) -> ParseResult<f32> {
    let invalid = || ParseErrorKind::InvalidNumber {
        token: token.to_string(),
    };
    let body = token.strip_prefix('-').unwrap_or(token);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return Err(invalid()),
        }
    }
    if digits == 0 || dots > 1 {
        return Err(invalid());
    }
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(invalid)
}

fn parse_constraints(inner: &str) -> ParseResult<ConstraintMask> {
    inner
        .split_whitespace()
        .try_fold(ConstraintMask::empty(), |mask, name| {
            ConstraintMask::from_file_name(name)
                .map(|m| mask | m)
                .ok_or_else(|| ParseErrorKind::UnknownConstraint {
                    name: name.to_string(),
                })
        })
}

fn parse_scale_pair(token: &str, inner: &str) -> ParseResult<Vec2> {
    let invalid = || ParseErrorKind::InvalidScaleKey {
        token: token.to_string(),
    };
    let parts: Vec<&str> = inner
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [x, y] => {
            let x = parse_decimal(x).map_err(|_| invalid())?;
            let y = parse_decimal(y).map_err(|_| invalid())?;
            Ok(Vec2::new(x, y))
        }
        _ => Err(invalid()),
    }
}
