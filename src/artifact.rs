use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::Builder;
use crate::CompileError;
use crate::codegen::{GeneratedCode, TargetKind};

/// Driver used to link LLVM IR when nothing else is configured.
pub const DEFAULT_LLVM_DRIVER: &str = "clang";

/// Driver used to compile C when nothing else is configured.
pub const DEFAULT_C_DRIVER: &str = "cc";

/// Environment variable overriding the default driver of any target.
pub const DRIVER_ENV: &str = "BFCC_CC";

/// Returns the compiler driver to use for `kind`.
///
/// `$BFCC_CC` wins when set. Otherwise C goes through `$CC` or `cc`,
/// and LLVM IR through `clang`, the only driver that understands it.
pub fn default_driver(kind: TargetKind) -> String {
    if let Ok(driver) = env::var(DRIVER_ENV) {
        return driver;
    }
    match kind {
        TargetKind::Llvm => DEFAULT_LLVM_DRIVER.to_owned(),
        TargetKind::C => env::var("CC").unwrap_or_else(|_| DEFAULT_C_DRIVER.to_owned())
    }
}

/// Returns `true` if `driver` is able to read code of the given kind.
pub fn driver_supports(driver: &str, kind: TargetKind) -> bool {
    match kind {
        TargetKind::C => true,
        TargetKind::Llvm => {
            Path::new(driver)
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.contains("clang"))
        }
    }
}

/// Saves the generated code itself, overwriting `path`.
pub fn save_source<P: AsRef<Path>>(code: &GeneratedCode, path: P) -> Result<(), CompileError> {
    debug!("Writing {} code to {}.", code.kind, path.as_ref().display());
    fs::write(path, &code.text)?;
    Ok(())
}

/// Saves the program on disk as an executable.
///
/// The code is first written to a temporary file, then it is compiled and linked against libc
/// using `driver`. The executable is produced in a temporary directory next to `path` and
/// moved over it only once the driver succeeded, so a failed link leaves `path` untouched.
pub fn save_executable<P: AsRef<Path>>(code: &GeneratedCode, path: P, driver: &str, optimization_level: u32) -> Result<(), CompileError> {
    let path = path.as_ref();

    if !driver_supports(driver, code.kind) {
        return Err(CompileError::Toolchain {
            driver: driver.to_owned(),
            message: format!("{} code can only be linked with clang. Use the C target or a clang driver", code.kind)
        });
    }

    // The driver picks the language from the extension
    let mut file = Builder::new()
        .prefix("bfcc-")
        .suffix(&format!(".{}", code.kind.extension()))
        .tempfile()?;
    file.write_all(code.text.as_bytes())?;
    file.flush()?;

    // Same directory as the output, so that the final rename does not cross filesystems
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new(".")
    };
    let staging = Builder::new().prefix(".bfcc-").tempdir_in(parent)?;
    let staged = staging.path().join("a.out");

    let level = format!("-O{}", optimization_level.min(3));
    debug!("Running {} {} {} -o {}.", driver, level, file.path().display(), staged.display());
    let output = Command::new(driver)
        .arg(&level)
        .arg(file.path())
        .arg("-o")
        .arg(&staged)
        .output()
        .map_err(|e| CompileError::Toolchain {
            driver: driver.to_owned(),
            message: format!("{}. Be sure that it is installed and available in $PATH", e)
        })?;

    if !output.status.success() {
        return Err(CompileError::Toolchain {
            driver: driver.to_owned(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned()
        });
    }

    // Replaces any existing file at `path`
    fs::rename(&staged, path)?;

    info!("Executable written to {}.", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn code() -> GeneratedCode {
        GeneratedCode {
            kind: TargetKind::C,
            text: "int main(void) { return 0; }\n".to_owned()
        }
    }

    #[test]
    fn test_save_source_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.c");
        fs::write(&path, "old contents that are longer than the new ones").unwrap();

        save_source(&code(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), code().text);
    }

    #[test]
    fn test_missing_driver() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out");
        match save_executable(&code(), &path, "bfcc-no-such-driver", 2) {
            Err(CompileError::Toolchain { driver, .. }) => assert_eq!(driver, "bfcc-no-such-driver"),
            r => panic!("Expected toolchain error. Got: {:?}", r)
        }
    }

    #[test]
    fn test_failed_link_keeps_existing_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out");
        fs::write(&path, b"previous artifact").unwrap();

        assert!(save_executable(&code(), &path, "bfcc-no-such-driver", 2).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"previous artifact");

        // No staging leftovers either
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_llvm_needs_clang() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out");
        let ir = GeneratedCode {
            kind: TargetKind::Llvm,
            text: String::new()
        };
        match save_executable(&ir, &path, "cc", 2) {
            Err(e @ CompileError::Toolchain { .. }) => assert!(e.to_string().contains("only be linked with clang")),
            r => panic!("Expected toolchain error. Got: {:?}", r)
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_driver_supports() {
        assert!(driver_supports("clang", TargetKind::Llvm));
        assert!(driver_supports("/usr/bin/clang-17", TargetKind::Llvm));
        assert!(!driver_supports("cc", TargetKind::Llvm));
        assert!(!driver_supports("gcc", TargetKind::Llvm));
        assert!(driver_supports("gcc", TargetKind::C));
        assert!(driver_supports("clang", TargetKind::C));
    }
}
