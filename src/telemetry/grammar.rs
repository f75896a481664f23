//! Firmware telemetry grammars and the record decoder.
//!
//! Matching follows scanf conventions: a whitespace run in the pattern
//! matches any amount of whitespace in the record (including none), literal
//! tokens match byte for byte, and a record is accepted only when every
//! conversion in the pattern succeeds and nothing but whitespace is left.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sample::OrientationSample;

/// Telemetry grammar emitted by the sensor firmware.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    /// `w = <float> x = <float> y = <float> z = <float>`
    #[default]
    Quaternion,
    /// `Ang.x = <int>\t\tAng.y = <int>`
    Euler,
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Literal(&'static str),
    Space,
    Float,
    Int,
}

use Token::{Float, Int, Literal, Space};

const QUATERNION_PATTERN: &[Token] = &[
    Literal("w"),
    Space,
    Literal("="),
    Space,
    Float,
    Space,
    Literal("x"),
    Space,
    Literal("="),
    Space,
    Float,
    Space,
    Literal("y"),
    Space,
    Literal("="),
    Space,
    Float,
    Space,
    Literal("z"),
    Space,
    Literal("="),
    Space,
    Float,
    Space,
];

const EULER_PATTERN: &[Token] = &[
    Literal("Ang.x"),
    Space,
    Literal("="),
    Space,
    Int,
    Space,
    Literal("Ang.y"),
    Space,
    Literal("="),
    Space,
    Int,
    Space,
];

impl Grammar {
    fn pattern(self) -> &'static [Token] {
        match self {
            Grammar::Quaternion => QUATERNION_PATTERN,
            Grammar::Euler => EULER_PATTERN,
        }
    }

    /// Number of numeric fields a record must carry to be accepted.
    pub fn arity(self) -> usize {
        self.pattern()
            .iter()
            .filter(|t| matches!(t, Float | Int))
            .count()
    }

    /// Decode one raw record.
    ///
    /// Returns `None` for anything short of a complete, clean match: missing
    /// or extra fields, truncated numbers, control or non-ASCII bytes.
    pub fn decode(self, record: &[u8]) -> Option<OrientationSample> {
        if !record
            .iter()
            .all(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
        {
            return None;
        }

        let mut fields = [0.0f32; 4];
        let count = match_pattern(self.pattern(), record, &mut fields)?;
        if count != self.arity() {
            return None;
        }

        Some(match self {
            Grammar::Quaternion => OrientationSample::Quaternion {
                w: fields[0],
                x: fields[1],
                y: fields[2],
                z: fields[3],
            },
            Grammar::Euler => OrientationSample::Euler {
                x: fields[0],
                y: fields[1],
            },
        })
    }

    /// Render a sample the way the firmware emits it.
    ///
    /// Returns `None` when the sample belongs to the other grammar. Angle
    /// pairs are rounded to whole degrees, matching the firmware's precision.
    pub fn format(self, sample: &OrientationSample) -> Option<String> {
        match (self, *sample) {
            (Grammar::Quaternion, OrientationSample::Quaternion { w, x, y, z }) => {
                Some(format!("w = {} x = {} y = {} z = {}\n", w, x, y, z))
            }
            (Grammar::Euler, OrientationSample::Euler { x, y }) => Some(format!(
                "Ang.x = {}\t\tAng.y = {}",
                x.round() as i64,
                y.round() as i64
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::Quaternion => write!(f, "quaternion"),
            Grammar::Euler => write!(f, "euler"),
        }
    }
}

/// Walk `pattern` over `input`, writing numeric conversions into `fields`.
/// Returns the number of conversions, or `None` on the first mismatch.
fn match_pattern(pattern: &[Token], input: &[u8], fields: &mut [f32]) -> Option<usize> {
    let mut pos = 0;
    let mut count = 0;

    for token in pattern {
        match token {
            Space => pos = skip_whitespace(input, pos),
            Literal(lit) => {
                if !input[pos..].starts_with(lit.as_bytes()) {
                    return None;
                }
                pos += lit.len();
            }
            Float => {
                pos = skip_whitespace(input, pos);
                let (value, next) = scan_float(input, pos)?;
                *fields.get_mut(count)? = value;
                count += 1;
                pos = next;
            }
            Int => {
                pos = skip_whitespace(input, pos);
                let (value, next) = scan_int(input, pos)?;
                *fields.get_mut(count)? = value as f32;
                count += 1;
                pos = next;
            }
        }
    }

    (pos == input.len()).then_some(count)
}

fn skip_whitespace(input: &[u8], mut pos: usize) -> usize {
    while pos < input.len() && input[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn skip_digits(input: &[u8], mut pos: usize) -> usize {
    while pos < input.len() && input[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}

fn skip_sign(input: &[u8], pos: usize) -> usize {
    match input.get(pos) {
        Some(b'+') | Some(b'-') => pos + 1,
        _ => pos,
    }
}

fn scan_float(input: &[u8], start: usize) -> Option<(f32, usize)> {
    let mut pos = skip_sign(input, start);

    let int_end = skip_digits(input, pos);
    let mut digits = int_end - pos;
    pos = int_end;

    if input.get(pos) == Some(&b'.') {
        let frac_end = skip_digits(input, pos + 1);
        digits += frac_end - (pos + 1);
        pos = frac_end;
    }
    if digits == 0 {
        return None;
    }

    // Only take the exponent if it is complete; "1e" leaves the "e" behind.
    if matches!(input.get(pos), Some(b'e') | Some(b'E')) {
        let exp_start = skip_sign(input, pos + 1);
        let exp_end = skip_digits(input, exp_start);
        if exp_end > exp_start {
            pos = exp_end;
        }
    }

    let text = std::str::from_utf8(&input[start..pos]).ok()?;
    let value: f32 = text.parse().ok()?;
    value.is_finite().then_some((value, pos))
}

fn scan_int(input: &[u8], start: usize) -> Option<(i32, usize)> {
    let digits_start = skip_sign(input, start);
    let end = skip_digits(input, digits_start);
    if end == digits_start {
        return None;
    }
    let text = std::str::from_utf8(&input[start..end]).ok()?;
    text.parse().ok().map(|value| (value, end))
}
