use std::io::Cursor;
use bfcc::CompileError;
use bfcc::parser::parse_str;
use bfcc::interpreter::Interpreter;

fn run(program: &[u8], input: &[u8], expected: &[u8]) -> Result<(), CompileError> {

    // Parse the file
    let source = String::from_utf8_lossy(program);
    let instructions: Vec<_> = parse_str(&source)?.collect();

    // Prepare an interpreter to run the instructions
    let mut interpreter =
        Interpreter::builder()
        .input(Cursor::new(input))
        .output(Cursor::new(Vec::new()))
        .build();

    // Aaaaand, run!
    interpreter.run(&instructions)?;

    // Check that the output of the interpreter matches the expected one
    assert_eq!(interpreter.output().unwrap().get_ref().as_slice(), expected);

    Ok(())

}

// A test for each program

macro_rules! test_program {
    ($name:ident) => {
        paste::paste! {
            #[test]
            fn [<test_ $name>]() {
                let program = include_bytes!(concat!("./programs/", stringify!($name), ".b"));
                let input = include_bytes!(concat!("./programs/", stringify!($name), ".b.in"));
                let output = include_bytes!(concat!("./programs/", stringify!($name), ".b.out"));
                run(program, input, output).unwrap();
            }
        }
    };
}

test_program!(hello_world);
test_program!(cat);
test_program!(upper);
test_program!(letter);
test_program!(countdown);
test_program!(add);
