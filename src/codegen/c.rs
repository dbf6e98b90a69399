use crate::codegen::{GeneratedCode, Label, Target, TargetKind};

const HEADER: &str = "\
#include <stdio.h>
#include <stdlib.h>

int main(void) {
";

/// Emits a C99 translation unit. Loops become `goto`s between labels.
pub struct CSource {
    body: String
}

impl Default for CSource {
    fn default() -> Self {
        CSource::new()
    }
}

impl CSource {

    pub fn new() -> CSource {
        CSource {
            body: String::from(HEADER)
        }
    }

    fn line(&mut self, s: &str) {
        self.body.push_str("    ");
        self.body.push_str(s);
        self.body.push('\n');
    }

}

impl Target for CSource {
    type Output = GeneratedCode;

    fn prologue(&mut self, tape_length: usize) {
        self.line(&format!("unsigned char *tape = calloc({}, 1);", tape_length));
        self.line("long head = 0;");
    }

    fn increment(&mut self, amount: u8) {
        self.line(&format!("tape[head] = (unsigned char)(tape[head] + {});", amount));
    }

    fn move_head(&mut self, offset: isize) {
        self.line(&format!("head += {};", offset));
    }

    fn input(&mut self) {
        self.line("{ int c = getchar(); tape[head] = c == EOF ? 0 : (unsigned char)c; }");
    }

    fn output(&mut self) {
        self.line("putchar(tape[head]);");
    }

    fn jump(&mut self, label: Label) {
        self.line(&format!("goto label_{};", label.id()));
    }

    fn mark(&mut self, label: Label) {
        // Labels stay in the first column
        self.body.push_str(&format!("label_{}:\n", label.id()));
    }

    fn jump_if_nonzero(&mut self, label: Label) {
        self.line(&format!("if (tape[head] > 0) goto label_{};", label.id()));
    }

    fn epilogue(&mut self) {
        self.line("free(tape);");
        self.line("return 0;");
    }

    fn finish(mut self) -> GeneratedCode {
        self.body.push_str("}\n");
        GeneratedCode {
            kind: TargetKind::C,
            text: self.body
        }
    }
}
