use std::io::{ErrorKind, Read, Write};
use crate::CompileError;
use crate::parser::Instruction;

/// Builder for the [`Interpreter`](crate::interpreter::Interpreter) struct.
pub struct InterpreterBuilder<R, W>
    where R: Read,
          W: Write
{
    tape_size: usize,
    input: Option<R>,
    output: Option<W>
}

impl<R, W> Default for InterpreterBuilder<R, W>
    where R: Read,
          W: Write
{
    fn default() -> Self {
        InterpreterBuilder::new()
    }
}

impl<R, W> InterpreterBuilder<R, W>
    where R: Read,
          W: Write
{

    /// Creates a new [`InterpreterBuilder`](crate::interpreter::InterpreterBuilder) with the default settings.
    pub fn new() -> InterpreterBuilder<R, W> {
        InterpreterBuilder {
            tape_size: crate::DEFAULT_TAPE_LENGTH,
            input: None,
            output: None
        }
    }

    /// Sets the tape size.
    /// Panics if the size is set to zero.
    pub fn tape_size(&mut self, tape_size: usize) -> &mut Self {
        if tape_size == 0 {
            panic!("Tape size must be at least 1.");
        }
        self.tape_size = tape_size;
        self
    }

    /// Sets the stream that will be used as input for the `,` instruction.
    pub fn input(&mut self, input: R) -> &mut Self {
        self.input = Some(input);
        self
    }

    /// Sets the stream that will be used as output for the `.` instruction.
    pub fn output(&mut self, output: W) -> &mut Self {
        self.output = Some(output);
        self
    }

    /// Builds the actual [`Interpreter`](crate::interpreter::Interpreter).
    pub fn build(&mut self) -> Interpreter<R, W> {
        Interpreter {
            tape: vec![0; self.tape_size],
            tape_position: 0,
            input: self.input.take(),
            output: self.output.take()
        }
    }

}

/// Executes an instruction stream in-process.
///
/// Unlike compiled programs, moving the head outside the tape is reported as an error.
pub struct Interpreter<R, W>
    where R: Read,
          W: Write
{
    tape: Vec<u8>,
    tape_position: usize,
    input: Option<R>,
    output: Option<W>
}

impl<R, W> Default for Interpreter<R, W>
    where R: Read,
          W: Write
{
    fn default() -> Self {
        Interpreter::new()
    }
}

impl<R, W> Interpreter<R, W>
    where R: Read,
          W: Write
{

    /// Builds an [`Interpreter`](crate::interpreter::Interpreter) with the default settings.
    pub fn new() -> Interpreter<R, W> {
        InterpreterBuilder::new().build()
    }

    /// Creates an [`InterpreterBuilder`](crate::interpreter::InterpreterBuilder) to configure
    /// a new [`Interpreter`](crate::interpreter::Interpreter).
    pub fn builder() -> InterpreterBuilder<R, W> {
        InterpreterBuilder::new()
    }

    /// Returns a reference to the underlying tape.
    pub fn tape(&self) -> &[u8] {
        &*self.tape
    }

    /// Returns the position of the head on the tape.
    pub fn tape_position(&self) -> usize {
        self.tape_position
    }

    /// Returns a reference to the input stream.
    pub fn input(&self) -> Option<&R> {
        self.input.as_ref()
    }

    /// Returns a reference to the output stream.
    pub fn output(&self) -> Option<&W> {
        self.output.as_ref()
    }

    /// Executes the given set of instructions.
    pub fn run(&mut self, instructions: &[Instruction]) -> Result<(), CompileError> {
        let jumps = match_loops(instructions)?;

        let mut pc = 0;
        while pc < instructions.len() {
            match instructions[pc] {

                Instruction::MoveHead(offset) => {
                    let target = self.tape_position as isize + offset;
                    if target < 0 {
                        return Err(CompileError::TapeUnderflow);
                    }
                    if target as usize >= self.tape.len() {
                        return Err(CompileError::TapeOverflow);
                    }
                    self.tape_position = target as usize;
                },

                Instruction::Increment(amount) => {
                    let value = &mut self.tape[self.tape_position];
                    *value = value.wrapping_add(amount.rem_euclid(256) as u8);
                },

                Instruction::Input => {
                    let mut byte = [0u8];
                    if let Some(ref mut input) = self.input {
                        match input.read_exact(&mut byte) {
                            Ok(()) => {},
                            // End of input reads as 0
                            Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => byte[0] = 0,
                            Err(e) => return Err(CompileError::Io(e))
                        }
                    }
                    self.tape[self.tape_position] = byte[0];
                },

                Instruction::Output => {
                    if let Some(ref mut output) = self.output {
                        output.write_all(&self.tape[self.tape_position..=self.tape_position])?;
                    }
                },

                Instruction::StartLoop => {
                    if self.tape[self.tape_position] == 0 {
                        pc = jumps[pc];
                    }
                },

                Instruction::FinishLoop => {
                    if self.tape[self.tape_position] != 0 {
                        pc = jumps[pc];
                    }
                }

            }
            pc += 1;
        }

        if let Some(ref mut output) = self.output {
            output.flush()?;
        }

        Ok(())
    }

}

/// For each loop instruction, computes the index of its counterpart.
fn match_loops(instructions: &[Instruction]) -> Result<Vec<usize>, CompileError> {
    let mut jumps = vec![0; instructions.len()];
    let mut open = Vec::new();
    for (i, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::StartLoop => open.push(i),
            Instruction::FinishLoop => {
                let start = open.pop()
                    .ok_or(CompileError::InternalInconsistency("loop end without a matching loop start"))?;
                jumps[start] = i;
                jumps[i] = start;
            },
            _ => {}
        }
    }
    if !open.is_empty() {
        return Err(CompileError::InternalInconsistency("loop start without a matching loop end"));
    }
    Ok(jumps)
}
