#[macro_use] extern crate log;

use std::fs;
use std::io::{self, BufWriter};
use std::process;
use clap::{App, Arg, ArgMatches};
use bfcc::{artifact, CompileError, Interpreter, Options, TargetKind, DEFAULT_TAPE_LENGTH};
use bfcc::parser::parse;
use bfcc::validator::validate;

/// Exit code for an argument list that makes sense syntactically but not semantically.
const EXIT_INVALID_USAGE: i32 = 2;

/// Exit code for failed compilations and runs.
const EXIT_FAILURE: i32 = 1;

/// What the user asked for, once the arguments have been checked.
struct Request {
    source: Source,
    action: Action,
    options: Options
}

enum Source {
    File(String),
    Code(String)
}

enum Action {
    Executable(String),
    EmitSource(String),
    Run
}

fn parse_request(matches: &ArgMatches) -> Result<Request, String> {

    let source = match (matches.value_of("file"), matches.value_of("code")) {
        (Some(_), Some(_)) => return Err("--file and --code cannot be used at the same time.".to_owned()),
        (None, None) => return Err("One of --file or --code is required.".to_owned()),
        (Some(path), None) => Source::File(path.to_owned()),
        (None, Some(code)) => Source::Code(code.to_owned())
    };

    let out = matches.value_of("out");
    let action = match (matches.is_present("run"), matches.is_present("emit-source"), out) {
        (true, _, Some(_)) => return Err("--run cannot be used together with --out.".to_owned()),
        (true, true, None) => return Err("--run cannot be used together with --emit-source.".to_owned()),
        (true, false, None) => Action::Run,
        (false, _, None) => return Err("--out is required.".to_owned()),
        (false, true, Some(path)) => Action::EmitSource(path.to_owned()),
        (false, false, Some(path)) => Action::Executable(path.to_owned())
    };

    let tape_length = match matches.value_of("tape") {
        None => DEFAULT_TAPE_LENGTH,
        Some(tape) => match tape.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return Err(format!("Invalid tape length: {}. It must be a positive integer.", tape))
        }
    };

    let target = matches.value_of("target").unwrap_or("llvm").parse::<TargetKind>()?;

    let level = matches.value_of("opt-level").unwrap_or("2");
    let optimization_level = level.parse::<u32>()
        .map_err(|_| format!("Invalid optimization level: {}.", level))?;

    let mut builder = Options::builder();
    builder
        .tape_length(tape_length)
        .target(target)
        .optimization_level(optimization_level);
    if let Some(driver) = matches.value_of("cc") {
        builder.driver(driver);
    }

    Ok(Request {
        source,
        action,
        options: builder.build()
    })
}

fn execute(request: Request) -> Result<(), CompileError> {

    let source = match request.source {
        Source::File(path) => {
            debug!("Opening {}.", path);
            fs::read_to_string(&path)?
        },
        Source::Code(code) => code
    };

    match request.action {
        Action::Executable(path) => {
            bfcc::compile_with(&source, &request.options, &path)
        },
        Action::EmitSource(path) => {
            let code = bfcc::generate(&source, &request.options)?;
            artifact::save_source(&code, &path)
        },
        Action::Run => {
            let validated = validate(&source)?;
            let instructions: Vec<_> = parse(&validated).collect();
            debug!("Running {} instructions.", instructions.len());

            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut interpreter =
                Interpreter::builder()
                .tape_size(request.options.tape_length)
                .input(stdin.lock())
                .output(BufWriter::new(stdout.lock()))
                .build();
            interpreter.run(&instructions)
        }
    }
}

fn main() {

    // All the cli options are here
    let app = App::new("bfcc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compiles Brainfuck programs to native executables")
        .arg(
            Arg::with_name("file")
                .long("file")
                .takes_value(true)
                .value_name("PATH")
                .help("Reads the program from the given file")
        )
        .arg(
            Arg::with_name("code")
                .long("code")
                .takes_value(true)
                .value_name("TEXT")
                .help("Uses the given text as the program")
        )
        .arg(
            Arg::with_name("out")
                .long("out")
                .takes_value(true)
                .value_name("PATH")
                .help("Sets the path of the produced file")
        )
        .arg(
            Arg::with_name("tape")
                .long("tape")
                .takes_value(true)
                .value_name("CELLS")
                .help("Sets the number of cells of the tape [default: 30000]")
        )
        .arg(
            Arg::with_name("target")
                .long("target")
                .takes_value(true)
                .possible_values(&["llvm", "c"])
                .help("Sets the kind of code to generate [default: llvm]")
        )
        .arg(
            Arg::with_name("emit-source")
                .long("emit-source")
                .help("Writes the generated LLVM IR or C instead of an executable")
        )
        .arg(
            Arg::with_name("run")
                .long("run")
                .help("Interprets the program instead of compiling it")
        )
        .arg(
            Arg::with_name("cc")
                .long("cc")
                .takes_value(true)
                .value_name("DRIVER")
                .help("Sets the compiler driver used for linking [default: $BFCC_CC, else clang for llvm and $CC or cc for c]")
        )
        .arg(
            Arg::with_name("opt-level")
                .short("O")
                .long("opt-level")
                .takes_value(true)
                .value_name("LEVEL")
                .help("Sets the optimization level passed to the driver, from 0 to 3 [default: 2]")
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity. Repeat to increase.")
        );

    // Help and version exit with 0, a malformed argument list with 1
    let matches = app.get_matches_safe().unwrap_or_else(|e| e.exit());

    // Initialize logger as soon as possible
    let verbosity = match matches.occurrences_of("v") {
        0     => "warn",
        1     => "info",
        2     => "debug",
        3 | _ => "trace"
    };
    env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or("BFCC_LOG", format!("bfcc={}", verbosity))
            .write_style_or("BFCC_LOG_STYLE", "auto")
    )
    .init();

    let request = match parse_request(&matches) {
        Ok(request) => request,
        Err(message) => {
            error!("{}", message);
            eprintln!("{}", matches.usage());
            process::exit(EXIT_INVALID_USAGE);
        }
    };

    if let Err(e) = execute(request) {
        error!("{}", e);
        process::exit(EXIT_FAILURE);
    }
}
