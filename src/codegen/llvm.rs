use std::fmt::Write;
use crate::codegen::{GeneratedCode, Label, Target, TargetKind};

// Since the output program will be linked against libc,
// we can use `putchar` and `getchar` for I/O and `calloc` and `free` for the tape.
const HEADER: &str = "\
; ModuleID = 'brainfuck'
source_filename = \"brainfuck\"

declare ptr @calloc(i64, i64)
declare void @free(ptr)
declare i32 @getchar()
declare i32 @putchar(i32)

define i32 @main() {
entry:
";

/// Emits textual LLVM IR with opaque pointers.
///
/// The tape pointer is an SSA value of the entry block, while the head lives in a stack slot
/// so that it can be updated from any block.
pub struct LlvmIr {
    body: String,
    next_value: usize,
    next_block: usize,

    // Whether the current block already ends with a terminator
    terminated: bool
}

impl Default for LlvmIr {
    fn default() -> Self {
        LlvmIr::new()
    }
}

impl LlvmIr {

    pub fn new() -> LlvmIr {
        LlvmIr {
            body: String::from(HEADER),
            next_value: 0,
            next_block: 0,
            terminated: false
        }
    }

    fn value(&mut self) -> String {
        let name = format!("%v{}", self.next_value);
        self.next_value += 1;
        name
    }

    fn line(&mut self, s: &str) {
        self.body.push_str("  ");
        self.body.push_str(s);
        self.body.push('\n');
    }

    fn block(&mut self, name: &str) {
        // LLVM blocks have no implicit fall-through
        if !self.terminated {
            self.line(&format!("br label %{}", name));
        }
        self.body.push('\n');
        self.body.push_str(name);
        self.body.push_str(":\n");
        self.terminated = false;
    }

    /// Emits the address of the current cell and returns its name.
    fn current_cell(&mut self) -> String {
        let head = self.value();
        let cell = self.value();
        self.line(&format!("{} = load i64, ptr %head", head));
        self.line(&format!("{} = getelementptr i8, ptr %tape, i64 {}", cell, head));
        cell
    }

    fn label_name(label: Label) -> String {
        format!("label_{}", label.id())
    }

}

impl Target for LlvmIr {
    type Output = GeneratedCode;

    fn prologue(&mut self, tape_length: usize) {
        self.line("%head = alloca i64");
        self.line(&format!("%tape = call ptr @calloc(i64 {}, i64 1)", tape_length));
        self.line("store i64 0, ptr %head");
    }

    fn increment(&mut self, amount: u8) {
        // Fetch the current cell, increment it and store it back
        let cell = self.current_cell();
        let old = self.value();
        let new = self.value();
        self.line(&format!("{} = load i8, ptr {}", old, cell));
        self.line(&format!("{} = add i8 {}, {}", new, old, amount as i8));
        self.line(&format!("store i8 {}, ptr {}", new, cell));
    }

    fn move_head(&mut self, offset: isize) {
        let old = self.value();
        let new = self.value();
        self.line(&format!("{} = load i64, ptr %head", old));
        self.line(&format!("{} = add i64 {}, {}", new, old, offset));
        self.line(&format!("store i64 {}, ptr %head", new));
    }

    fn input(&mut self) {
        // `getchar` returns -1 at end of input, which becomes a 0 in the cell
        let cell = self.current_cell();
        let read = self.value();
        let eof = self.value();
        let byte = self.value();
        let value = self.value();
        self.line(&format!("{} = call i32 @getchar()", read));
        self.line(&format!("{} = icmp eq i32 {}, -1", eof, read));
        self.line(&format!("{} = trunc i32 {} to i8", byte, read));
        self.line(&format!("{} = select i1 {}, i8 0, i8 {}", value, eof, byte));
        self.line(&format!("store i8 {}, ptr {}", value, cell));
    }

    fn output(&mut self) {
        let cell = self.current_cell();
        let value = self.value();
        let wide = self.value();
        self.line(&format!("{} = load i8, ptr {}", value, cell));
        self.line(&format!("{} = zext i8 {} to i32", wide, value));
        self.line(&format!("call i32 @putchar(i32 {})", wide));
    }

    fn jump(&mut self, label: Label) {
        self.line(&format!("br label %{}", LlvmIr::label_name(label)));
        self.terminated = true;
    }

    fn mark(&mut self, label: Label) {
        self.block(&LlvmIr::label_name(label));
    }

    fn jump_if_nonzero(&mut self, label: Label) {
        let cell = self.current_cell();
        let value = self.value();
        let guard = self.value();
        let end = format!("loop_end_{}", self.next_block);
        self.next_block += 1;

        self.line(&format!("{} = load i8, ptr {}", value, cell));
        self.line(&format!("{} = icmp ugt i8 {}, 0", guard, value));
        self.line(&format!("br i1 {}, label %{}, label %{}", guard, LlvmIr::label_name(label), end));
        self.terminated = true;

        // Falling through continues with the code after the loop
        self.block(&end);
    }

    fn epilogue(&mut self) {
        self.line("call void @free(ptr %tape)");
        self.line("ret i32 0");
        self.terminated = true;
    }

    fn finish(mut self) -> GeneratedCode {
        let _ = writeln!(self.body, "}}");
        GeneratedCode {
            kind: TargetKind::Llvm,
            text: self.body
        }
    }
}
