#[macro_use] extern crate log;

pub mod artifact;
pub mod codegen;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod validator;

use std::path::Path;

pub use error::CompileError;
pub use codegen::{CodeGenerator, GeneratedCode, Target, TargetKind};
pub use interpreter::Interpreter;
pub use parser::{parse, parse_str, Instruction, Instructions};
pub use validator::{validate, ValidatedSource};

/// Number of cells of the tape when not configured otherwise.
pub const DEFAULT_TAPE_LENGTH: usize = 30_000;

/// Settings of a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub tape_length: usize,
    pub target: TargetKind,
    pub driver: String,
    pub optimization_level: u32
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tape_length: DEFAULT_TAPE_LENGTH,
            target: TargetKind::default(),
            driver: artifact::default_driver(TargetKind::default()),
            optimization_level: 2
        }
    }
}

impl Options {

    /// Creates an [`OptionsBuilder`](crate::OptionsBuilder) starting from the default settings.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder {
            options: Options::default(),
            driver: None
        }
    }

}

/// Builder for the [`Options`](crate::Options) struct.
pub struct OptionsBuilder {
    options: Options,

    // Unless set explicitly, the driver follows the target
    driver: Option<String>
}

impl OptionsBuilder {

    /// Sets the number of cells of the tape.
    pub fn tape_length(&mut self, tape_length: usize) -> &mut Self {
        self.options.tape_length = tape_length;
        self
    }

    /// Sets the kind of code to generate.
    pub fn target(&mut self, target: TargetKind) -> &mut Self {
        self.options.target = target;
        self
    }

    /// Sets the compiler driver used to link executables.
    pub fn driver(&mut self, driver: &str) -> &mut Self {
        self.driver = Some(driver.to_owned());
        self
    }

    /// Sets the optimization level passed to the driver, from 0 to 3.
    pub fn optimization_level(&mut self, level: u32) -> &mut Self {
        self.options.optimization_level = level.min(3);
        self
    }

    /// Builds the actual [`Options`](crate::Options).
    pub fn build(&mut self) -> Options {
        let mut options = self.options.clone();
        options.driver = match self.driver {
            Some(ref driver) => driver.clone(),
            None => artifact::default_driver(options.target)
        };
        options
    }

}

/// Validates, parses and lowers `source` without touching the filesystem.
pub fn generate(source: &str, options: &Options) -> Result<GeneratedCode, CompileError> {
    debug!("Validating source.");
    let validated = validate(source)?;
    debug!("Generating code.");
    codegen::generate(parse(&validated), options.tape_length, options.target)
}

/// Compiles `source` into an executable at `output_path` using the default settings
/// and the given tape length.
pub fn compile<P: AsRef<Path>>(source: &str, tape_length: usize, output_path: P) -> Result<(), CompileError> {
    let options = Options::builder()
        .tape_length(tape_length)
        .build();
    compile_with(source, &options, output_path)
}

/// Compiles `source` into an executable at `output_path`.
pub fn compile_with<P: AsRef<Path>>(source: &str, options: &Options, output_path: P) -> Result<(), CompileError> {
    let code = generate(source, options)?;
    artifact::save_executable(&code, output_path, &options.driver, options.optimization_level)
}
