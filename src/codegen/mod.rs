pub mod c;
pub mod llvm;

use std::fmt;
use std::str::FromStr;
use crate::CompileError;
use crate::parser::Instruction;

/// A branch target inside the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(usize);

impl Label {

    /// Numeric identifier of the label, unique within a compilation.
    pub fn id(&self) -> usize {
        self.0
    }

}

/// Labels of a loop whose body is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// Where the zero test lives, after the body.
    pub condition: Label,
    /// Entry of the loop body.
    pub body: Label
}

/// Target-specific builder driven by the [`CodeGenerator`](crate::codegen::CodeGenerator).
///
/// Implementations only see straight-line operations, jumps and label markers:
/// all the loop bookkeeping happens in the generator.
pub trait Target {

    /// What the target produces once generation is over.
    type Output;

    /// Allocates a zeroed tape of `tape_length` cells and sets the head to 0.
    fn prologue(&mut self, tape_length: usize);

    /// Adds `amount` to the current cell, wrapping around at 256.
    fn increment(&mut self, amount: u8);

    /// Moves the head by `offset` cells. No bounds check is emitted.
    fn move_head(&mut self, offset: isize);

    /// Reads a byte from standard input into the current cell. End of input stores 0.
    fn input(&mut self);

    /// Writes the current cell to standard output.
    fn output(&mut self);

    /// Unconditional jump.
    fn jump(&mut self, label: Label);

    /// Places `label` at the current position.
    fn mark(&mut self, label: Label);

    /// Jumps to `label` if the current cell is greater than zero, falls through otherwise.
    fn jump_if_nonzero(&mut self, label: Label);

    /// Releases the tape and terminates the program.
    fn epilogue(&mut self);

    /// Consumes the target returning the generated code.
    fn finish(self) -> Self::Output;

}

/// Kind of code a compilation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Textual LLVM IR.
    Llvm,
    /// C source.
    C
}

impl TargetKind {

    /// Extension of a file containing code for this target.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetKind::Llvm => "ll",
            TargetKind::C => "c"
        }
    }

}

impl Default for TargetKind {
    fn default() -> Self {
        TargetKind::Llvm
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llvm" => Ok(TargetKind::Llvm),
            "c" => Ok(TargetKind::C),
            _ => Err(format!("Unknown target: {}", s))
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TargetKind::Llvm => write!(f, "llvm"),
            TargetKind::C => write!(f, "c")
        }
    }
}

/// Code produced by one of the built-in targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub kind: TargetKind,
    pub text: String
}

/// Lowers a stream of instructions into code for a [`Target`](crate::codegen::Target).
///
/// Each generator owns its loop stack and label counter, so it can only be used
/// for a single compilation.
pub struct CodeGenerator<T: Target> {
    target: T,
    loops: Vec<LoopFrame>,
    next_label: usize
}

impl<T: Target> CodeGenerator<T> {

    /// Creates a new generator emitting into `target`.
    pub fn new(target: T) -> CodeGenerator<T> {
        CodeGenerator {
            target,
            loops: Vec::new(),
            next_label: 0
        }
    }

    /// Current loop nesting depth.
    pub fn depth(&self) -> usize {
        self.loops.len()
    }

    fn fresh_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Generates a whole program: prologue, one lowering per instruction, epilogue.
    pub fn generate<I>(mut self, instructions: I, tape_length: usize) -> Result<T::Output, CompileError>
        where I: IntoIterator<Item = Instruction>
    {
        if tape_length == 0 {
            return Err(CompileError::InvalidTapeLength(tape_length));
        }

        self.target.prologue(tape_length);

        let mut count = 0usize;
        for instruction in instructions {
            self.emit(instruction)?;
            count += 1;
        }

        if !self.loops.is_empty() {
            return Err(CompileError::InternalInconsistency("loop stack not empty at end of program"));
        }

        self.target.epilogue();
        debug!("Generated code for {} instructions using {} labels.", count, self.next_label);

        Ok(self.target.finish())
    }

    fn emit(&mut self, instruction: Instruction) -> Result<(), CompileError> {
        trace!("Lowering {} at depth {}.", instruction, self.depth());
        match instruction {

            Instruction::Increment(amount) => {
                // Only the value modulo 256 matters for an 8-bit cell
                self.target.increment(amount.rem_euclid(256) as u8);
            },

            Instruction::MoveHead(offset) => {
                self.target.move_head(offset);
            },

            Instruction::Input => {
                self.target.input();
            },

            Instruction::Output => {
                self.target.output();
            },

            Instruction::StartLoop => {
                // The shape of a loop is:
                //
                // ```
                //     jump condition
                // body:
                //     <loop body>
                // condition:
                //     jump body if *ptr > 0
                // ```
                //
                // which is equivalent to `while (*ptr != 0) { ... }`
                let frame = LoopFrame {
                    condition: self.fresh_label(),
                    body: self.fresh_label()
                };
                self.loops.push(frame);
                self.target.jump(frame.condition);
                self.target.mark(frame.body);
            },

            Instruction::FinishLoop => {
                let frame = self.loops.pop()
                    .ok_or(CompileError::InternalInconsistency("loop end without a matching loop start"))?;
                self.target.mark(frame.condition);
                self.target.jump_if_nonzero(frame.body);
            }

        }

        Ok(())
    }

}

/// Generates code for one of the built-in targets.
pub fn generate<I>(instructions: I, tape_length: usize, kind: TargetKind) -> Result<GeneratedCode, CompileError>
    where I: IntoIterator<Item = Instruction>
{
    debug!("Generating {} code for a tape of {} cells.", kind, tape_length);
    match kind {
        TargetKind::Llvm => CodeGenerator::new(llvm::LlvmIr::new()).generate(instructions, tape_length),
        TargetKind::C => CodeGenerator::new(c::CSource::new()).generate(instructions, tape_length)
    }
}
