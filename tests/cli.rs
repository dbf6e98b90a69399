use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::tempdir;

fn bfcc(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_bfcc"))
        .args(args)
        .env_remove("BFCC_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_help() {
    let output = bfcc(&["--help"], b"");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--tape"));
}

#[test]
fn test_malformed_arguments() {
    assert_eq!(bfcc(&["--no-such-flag"], b"").status.code(), Some(1));
    assert_eq!(bfcc(&["--code"], b"").status.code(), Some(1));
    assert_eq!(bfcc(&["--code", "+", "--target", "wasm", "--out", "x"], b"").status.code(), Some(1));
}

#[test]
fn test_semantic_validation() {
    // Missing source
    assert_eq!(bfcc(&["--out", "x"], b"").status.code(), Some(2));

    // Conflicting sources
    assert_eq!(bfcc(&["--code", "+", "--file", "x.b", "--out", "x"], b"").status.code(), Some(2));

    // Missing output
    assert_eq!(bfcc(&["--code", "+"], b"").status.code(), Some(2));

    // Invalid tape
    assert_eq!(bfcc(&["--code", "+", "--out", "x", "--tape", "0"], b"").status.code(), Some(2));
    assert_eq!(bfcc(&["--code", "+", "--out", "x", "--tape", "many"], b"").status.code(), Some(2));

    // Running does not produce a file
    assert_eq!(bfcc(&["--code", "+", "--run", "--out", "x"], b"").status.code(), Some(2));
}

#[test]
fn test_run() {
    let output = bfcc(&["--code", ",[.,]", "--run"], b"echo");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"echo");
}

#[test]
fn test_bracket_errors_are_reported() {
    let output = bfcc(&["--code", "[+++]]", "--run"], b"");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Position 6: Unexpected ']'"));

    let output = bfcc(&["--code", "[+[+[+]", "--run"], b"");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("1, 3 are unclosed"));
}

#[test]
fn test_emit_source() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("program.c");
    let path_str = path.to_str().unwrap();

    let output = bfcc(&["--code", "+.", "--target", "c", "--emit-source", "--tape", "64", "--out", path_str], b"");
    assert_eq!(output.status.code(), Some(0));

    let code = std::fs::read_to_string(&path).unwrap();
    assert!(code.contains("calloc(64, 1)"));
    assert!(code.contains("putchar(tape[head]);"));
}

#[test]
fn test_file_source() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("program.b");
    std::fs::write(&source, "++++++++[>++++++++<-]>+.").unwrap();
    let out = dir.path().join("program.ll");

    let output = bfcc(&["--file", source.to_str().unwrap(), "--emit-source", "--out", out.to_str().unwrap()], b"");
    assert_eq!(output.status.code(), Some(0));
    assert!(std::fs::read_to_string(&out).unwrap().contains("define i32 @main()"));
}

#[test]
fn test_llvm_target_rejects_other_drivers() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("program");
    std::fs::write(&out, b"previous artifact").unwrap();

    let output = bfcc(&["--code", "+.", "--target", "llvm", "--cc", "gcc", "--out", out.to_str().unwrap()], b"");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("only be linked with clang"));
    assert_eq!(std::fs::read(&out).unwrap(), b"previous artifact");
}
