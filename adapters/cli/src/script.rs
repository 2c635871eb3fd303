//! Parser for the line-oriented input scripts replayed by the CLI.

use std::num::ParseIntError;

use skirmish_core::PixelPoint;
use thiserror::Error;

/// Marker that starts a comment running to the end of the line.
const COMMENT_MARKER: char = '#';

/// Single scripted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScriptLine {
    /// Moves the cursor over the map.
    Hover(PixelPoint),
    /// Clicks the map.
    Click(PixelPoint),
    /// Ends the current turn.
    EndTurn,
    /// Stores the current state in the save slot.
    Save,
    /// Empties the save slot.
    DiscardSave,
}

/// Errors raised while parsing a script.
#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    /// The first word of the line is not a known instruction.
    #[error("line {line}: unknown instruction `{instruction}`")]
    UnknownInstruction {
        /// One-based line number.
        line: usize,
        /// Instruction as written.
        instruction: String,
    },
    /// The instruction received the wrong number of arguments.
    #[error("line {line}: `{instruction}` expects {expected} argument(s), found {found}")]
    ArgumentCount {
        /// One-based line number.
        line: usize,
        /// Instruction as written.
        instruction: String,
        /// Number of arguments the instruction takes.
        expected: usize,
        /// Number of arguments supplied.
        found: usize,
    },
    /// A coordinate was not a valid integer.
    #[error("line {line}: invalid coordinate `{value}`")]
    InvalidCoordinate {
        /// One-based line number.
        line: usize,
        /// Coordinate as written.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: ParseIntError,
    },
}

/// Parses every instruction of a script, skipping blank lines and comments.
pub(crate) fn parse_script(contents: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let text = raw
                .split_once(COMMENT_MARKER)
                .map_or(raw, |(before, _)| before)
                .trim();
            (!text.is_empty()).then(|| parse_line(index + 1, text))
        })
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<ScriptLine, ScriptError> {
    let mut words = text.split_whitespace();
    let instruction = words.next().unwrap_or_default();
    let arguments: Vec<&str> = words.collect();

    let expect_arguments = |expected: usize| {
        if arguments.len() == expected {
            Ok(())
        } else {
            Err(ScriptError::ArgumentCount {
                line,
                instruction: instruction.to_owned(),
                expected,
                found: arguments.len(),
            })
        }
    };

    match instruction {
        "hover" | "click" => {
            expect_arguments(2)?;
            let point = PixelPoint::new(
                parse_coordinate(line, arguments[0])?,
                parse_coordinate(line, arguments[1])?,
            );
            Ok(if instruction == "hover" {
                ScriptLine::Hover(point)
            } else {
                ScriptLine::Click(point)
            })
        }
        "end-turn" => expect_arguments(0).map(|()| ScriptLine::EndTurn),
        "save" => expect_arguments(0).map(|()| ScriptLine::Save),
        "discard-save" => expect_arguments(0).map(|()| ScriptLine::DiscardSave),
        _ => Err(ScriptError::UnknownInstruction {
            line,
            instruction: instruction.to_owned(),
        }),
    }
}

fn parse_coordinate(line: usize, value: &str) -> Result<i32, ScriptError> {
    value
        .parse::<i32>()
        .map_err(|source| ScriptError::InvalidCoordinate {
            line,
            value: value.to_owned(),
            source,
        })
}
