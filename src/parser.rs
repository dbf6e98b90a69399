use std::fmt;
use itertools::Itertools;
use crate::CompileError;
use crate::validator::{validate, ValidatedSource};

/// A single optimized Brainfuck instruction.
///
/// Runs of `+`/`-` and `>`/`<` are collapsed into a single
/// [`Increment`](Instruction::Increment) or [`MoveHead`](Instruction::MoveHead)
/// carrying the net delta, which is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Increment(isize),
    MoveHead(isize),
    Input,
    Output,
    StartLoop,
    FinishLoop
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Increment(v) => write!(f, "Increment({})", v),
            Instruction::MoveHead(v) => write!(f, "MoveHead({})", v),
            Instruction::Input => write!(f, "Input"),
            Instruction::Output => write!(f, "Output"),
            Instruction::StartLoop => write!(f, "StartLoop"),
            Instruction::FinishLoop => write!(f, "FinishLoop")
        }
    }
}

/// Maps a source character to the instruction it stands for.
/// `None` means the character is a comment.
pub fn classify(c: char) -> Option<Instruction> {
    match c {
        '+' => Some(Instruction::Increment(1)),
        '-' => Some(Instruction::Increment(-1)),
        '>' => Some(Instruction::MoveHead(1)),
        '<' => Some(Instruction::MoveHead(-1)),
        ',' => Some(Instruction::Input),
        '.' => Some(Instruction::Output),
        '[' => Some(Instruction::StartLoop),
        ']' => Some(Instruction::FinishLoop),
        _ => None
    }
}

fn merge(a: Instruction, b: Instruction) -> Result<Instruction, (Instruction, Instruction)> {
    use crate::parser::Instruction::*;
    match (a, b) {
        (Increment(x), Increment(y)) => Ok(Increment(x + y)),
        (MoveHead(x), MoveHead(y)) => Ok(MoveHead(x + y)),
        (a, b) => Err((a, b))
    }
}

fn is_effective(i: &Instruction) -> bool {
    match i {
        Instruction::Increment(0) | Instruction::MoveHead(0) => false,
        _ => true
    }
}

/// Lazy stream of optimized instructions.
///
/// The stream is single-pass: to walk the program again, call
/// [`parse`](crate::parser::parse) once more.
pub struct Instructions<'a> {
    inner: Box<dyn Iterator<Item = Instruction> + 'a>
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Instruction> {
        self.inner.next()
    }
}

impl<'a> fmt::Debug for Instructions<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Instructions { .. }")
    }
}

/// Parses an already validated program.
pub fn parse<'a>(source: &ValidatedSource<'a>) -> Instructions<'a> {
    let inner = source.as_str()
        .chars()

        // Comments vanish here, so they never split a run
        .filter_map(classify)

        // Collapse consecutive cumulative instructions of the same kind
        .coalesce(merge)

        // Runs that cancel out do nothing
        .filter(is_effective);

    Instructions {
        inner: Box::new(inner)
    }
}

/// Validates and parses a program in one go.
pub fn parse_str(source: &str) -> Result<Instructions<'_>, CompileError> {
    let validated = validate(source)?;
    Ok(parse(&validated))
}
