// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-list parser using nom
//!
//! Reads the plain-text interchange format used for loops and profiles:
//!
//! ```text
//! # OUTER
//! -1,-1
//! 1,-1
//! 1,1
//! -1,1
//!
//! # HOLE
//! -0.3;-0.3
//! 0.3	-0.3
//! 0.3 0.3
//! ```
//!
//! Blank lines and directives end a block. Lines starting with `#` that are
//! not `OUTER`/`HOLE` are comments.

use nom::{
    branch::alt,
    character::complete::{one_of, space0, space1},
    combinator::{all_consuming, map_res, opt, value},
    number::complete::recognize_float,
    sequence::{delimited, pair, separated_pair, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::loops::{LoopRole, ParsedLoop, ParsedProfile};

/// Distance under which a trailing point is treated as a repeat of the first
pub const CLOSING_TOLERANCE: f64 = 1e-6;

/// One classified input line
#[derive(Debug, Clone, PartialEq)]
enum Line {
    Blank,
    Directive(LoopRole),
    Comment,
    Point([f64; 2]),
}

/// Parse float: 3.14, -3.14, 1.5e-10, .5
fn number(input: &str) -> IResult<&str, f64> {
    map_res(recognize_float, |s: &str| fast_float::parse::<f64, _>(s))(input)
}

/// Separator: `,` or `;` with optional blanks, or a run of spaces/tabs
fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), tuple((space0, one_of(",;"), space0))),
        value((), space1),
    ))(input)
}

/// A full `x<sep>y` line, allowing a trailing separator
fn point_line(input: &str) -> IResult<&str, [f64; 2]> {
    let (rest, (x, y)) = all_consuming(delimited(
        space0,
        separated_pair(number, separator, number),
        pair(space0, opt(pair(one_of(",;"), space0))),
    ))(input)?;
    Ok((rest, [x, y]))
}

fn classify(line_no: usize, raw: &str) -> Result<Line> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(Line::Blank);
    }

    if let Some(rest) = line.strip_prefix('#') {
        let word = rest.trim();
        if word.eq_ignore_ascii_case("OUTER") {
            return Ok(Line::Directive(LoopRole::Outer));
        }
        if word.eq_ignore_ascii_case("HOLE") {
            return Ok(Line::Directive(LoopRole::Hole));
        }
        return Ok(Line::Comment);
    }

    point_line(line)
        .map(|(_, p)| Line::Point(p))
        .map_err(|_| Error::parse(line_no, format!("expected `x,y` pair, found `{}`", line)))
}

/// A block of points with the directive that preceded it (if any)
#[derive(Debug, Default)]
struct Block {
    role: Option<LoopRole>,
    points: Vec<[f64; 2]>,
}

/// Split text into point blocks; returns blocks with the closing flag
fn read_blocks(text: &str) -> Result<Vec<(Block, bool)>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    let mut pending_role: Option<LoopRole> = None;

    for (idx, raw) in text.lines().enumerate() {
        match classify(idx + 1, raw)? {
            Line::Blank => finish(current.take(), &mut blocks),
            Line::Directive(role) => {
                finish(current.take(), &mut blocks);
                pending_role = Some(role);
            }
            Line::Comment => {}
            Line::Point(p) => current
                .get_or_insert_with(|| Block {
                    role: pending_role.take(),
                    points: Vec::new(),
                })
                .points
                .push(p),
        }
    }
    finish(current.take(), &mut blocks);

    Ok(blocks)
}

fn finish(block: Option<Block>, blocks: &mut Vec<(Block, bool)>) {
    if let Some(mut block) = block {
        if !block.points.is_empty() {
            let closed = drop_closing_duplicate(&mut block.points);
            blocks.push((block, closed));
        }
    }
}

/// Remove a trailing point that repeats the first one
fn drop_closing_duplicate(points: &mut Vec<[f64; 2]>) -> bool {
    if points.len() < 2 {
        return false;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let dist = ((first[0] - last[0]).powi(2) + (first[1] - last[1]).powi(2)).sqrt();
    if dist <= CLOSING_TOLERANCE {
        points.pop();
        true
    } else {
        false
    }
}

/// Parse a loop set
///
/// Blocks without a directive take their role from their position: the first
/// block is the outer loop, every later block is a hole.
pub fn parse_loops(text: &str) -> Result<Vec<ParsedLoop>> {
    let blocks = read_blocks(text)?;
    if blocks.is_empty() {
        return Err(Error::Empty);
    }

    Ok(blocks
        .into_iter()
        .enumerate()
        .map(|(i, (block, _))| {
            let positional = if i == 0 { LoopRole::Outer } else { LoopRole::Hole };
            ParsedLoop {
                points: block.points,
                role: block.role.unwrap_or(positional),
            }
        })
        .collect())
}

/// Parse a revolution profile from the first block of points
pub fn parse_profile(text: &str) -> Result<ParsedProfile> {
    let (block, closed) = read_blocks(text)?
        .into_iter()
        .next()
        .ok_or(Error::Empty)?;

    Ok(ParsedProfile {
        points: block.points,
        closed,
    })
}
