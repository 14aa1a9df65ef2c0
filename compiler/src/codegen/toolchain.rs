//! External C toolchain detection and invocation (spec §6 `kapilac -r`,
//! §9 "the external C compiler invocation" collaborator). Generalized
//! from an assemble-then-link pair of thin `std::process::Command`
//! wrappers down to a single C-compiler invocation, since Kapila's
//! backend emits portable C text rather than object code.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A detected C compiler, in the fixed search order spec §6 names:
/// bundled Tiny C Compiler, then `gcc` in common Windows locations, then
/// `gcc` on `PATH`.
#[derive(Debug, Clone)]
pub struct CCompiler {
    pub command: PathBuf,
}

/// Candidate locations searched in order, matching spec §6 literally.
/// The bundled-tcc and Windows-gcc candidates are inert on platforms
/// where those paths don't exist — `find` just skips straight past them.
fn candidates() -> Vec<PathBuf> {
    let mut v = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            v.push(dir.join("tcc"));
            v.push(dir.join("tcc.exe"));
        }
    }
    v.push(PathBuf::from(r"C:\mingw64\bin\gcc.exe"));
    v.push(PathBuf::from(r"C:\MinGW\bin\gcc.exe"));
    v.push(PathBuf::from("gcc"));
    v
}

impl CCompiler {
    /// Probe the fixed search order, returning the first compiler that
    /// actually runs `--version` successfully.
    pub fn find() -> Result<CCompiler, ToolchainError> {
        for candidate in candidates() {
            if Command::new(&candidate)
                .arg("--version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
            {
                return Ok(CCompiler { command: candidate });
            }
        }
        Err(ToolchainError::NotFound)
    }

    /// Compile `source_path` into an executable at `output_path`.
    pub fn compile(&self, source_path: &Path, output_path: &Path) -> Result<(), ToolchainError> {
        let result = Command::new(&self.command)
            .arg(source_path)
            .arg("-o")
            .arg(output_path)
            .output()
            .map_err(ToolchainError::Io)?;

        if !result.status.success() {
            return Err(ToolchainError::CompileFailed {
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }
        Ok(())
    }

    /// Run a previously-compiled executable, returning its captured
    /// stdout (used by `kapilac -r`, which runs the program after
    /// compiling it).
    pub fn run(&self, executable_path: &Path) -> Result<std::process::Output, ToolchainError> {
        Command::new(executable_path)
            .output()
            .map_err(ToolchainError::Io)
    }
}

/// Compile-then-run in one step, the behavior behind `kapilac -r`. On
/// success returns the child process's captured stdout/stderr/status;
/// temporary files are removed unless `keep` is set (spec §6 `-k`).
pub fn compile_and_run(
    c_source: &str,
    keep: bool,
) -> Result<std::process::Output, ToolchainError> {
    let compiler = CCompiler::find()?;

    let dir = std::env::temp_dir();
    let stem = format!("kapila_{}", std::process::id());
    let source_path = dir.join(format!("{stem}.c"));
    let exe_path = dir.join(&stem);

    std::fs::write(&source_path, c_source).map_err(ToolchainError::Io)?;
    let result = compiler.compile(&source_path, &exe_path);

    let output = match result {
        Ok(()) => compiler.run(&exe_path),
        Err(e) => Err(e),
    };

    if !keep {
        let _ = std::fs::remove_file(&source_path);
        let _ = std::fs::remove_file(&exe_path);
    }

    output
}

/// Toolchain failures (spec §7 `ToolchainError`): no compiler found, the
/// compile step itself failing, or the compiled program failing to run.
#[derive(Debug)]
pub enum ToolchainError {
    NotFound,
    CompileFailed { stderr: String },
    Io(io::Error),
}

impl std::fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolchainError::NotFound => {
                write!(f, "ದೋಷ: ಯಾವುದೇ ಸಿ ಕಂಪೈಲರ್ ಕಂಡುಬಂದಿಲ್ಲ (no C compiler found)")
            }
            ToolchainError::CompileFailed { stderr } => {
                write!(f, "ದೋಷ: ಸಿ ಕಂಪೈಲ್ ವಿಫಲವಾಯಿತು:\n{stderr}")
            }
            ToolchainError::Io(e) => write!(f, "ದೋಷ: {e}"),
        }
    }
}

impl std::error::Error for ToolchainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order_is_bundled_tcc_then_windows_gcc_then_path_gcc() {
        let c = candidates();
        let last = c.last().unwrap();
        assert_eq!(last, &PathBuf::from("gcc"));
        assert!(c.iter().any(|p| p.to_string_lossy().contains("mingw") || p.to_string_lossy().contains("MinGW")));
    }
}
