//! `kapilac` — the Kapila-to-C compiler front end (spec §6 "CLI surface
//! (compiler)"). Lowers Kapila source to a C translation unit via
//! [`kapila_compiler::driver::compile_source`] and either prints it,
//! writes it (optionally split from its runtime), or compiles and runs
//! it through a detected C toolchain.

use clap::Parser;
use kapila_compiler::codegen::runtime_template::{runtime_header, RUNTIME_PREAMBLE};
use kapila_compiler::codegen::compile_and_run;
use kapila_compiler::driver::{self, CompileError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "kapilac", about = "Compile Kapila source to C")]
struct Cli {
    /// A `.kpl` source file. Omit when `-c` supplies inline source.
    input: Option<PathBuf>,

    /// Write the generated C to this path instead of stdout, splitting
    /// the runtime into a sibling `kapila_runtime.h`.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Compile and immediately run the result through a detected C
    /// toolchain.
    #[arg(short = 'r', long = "run")]
    run: bool,

    /// Inline source text, used instead of a file argument.
    #[arg(short = 'c', long = "code")]
    code: Option<String>,

    /// Keep intermediate files created by `-r`.
    #[arg(short = 'k', long = "keep")]
    keep: bool,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if cli.version {
        println!("kapilac {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let source = match read_source(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ದೋಷ: {e}");
            return ExitCode::FAILURE;
        }
    };

    let c_source = match driver::compile_source(&source) {
        Ok(c) => c,
        Err(e) => return report_compile_error(e),
    };

    if cli.run {
        return run_compiled(&c_source, cli.keep);
    }

    match cli.output {
        Some(path) => write_split(&c_source, &path),
        None => {
            print!("{c_source}");
            ExitCode::SUCCESS
        }
    }
}

fn read_source(cli: &Cli) -> Result<String, String> {
    if let Some(code) = &cli.code {
        return Ok(code.clone());
    }
    match &cli.input {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("{} ಓದಲಾಗಲಿಲ್ಲ: {e}", path.display())),
        None => Err("ಯಾವುದೇ ಇನ್‌ಪುಟ್ ಇಲ್ಲ: ಫೈಲ್ ಅಥವಾ -c ಅಗತ್ಯ (no input: supply a file or -c)".to_string()),
    }
}

fn report_compile_error(error: CompileError) -> ExitCode {
    eprintln!("{error}");
    ExitCode::FAILURE
}

fn run_compiled(c_source: &str, keep: bool) -> ExitCode {
    match compile_and_run(c_source, keep) {
        Ok(output) => {
            use std::io::Write;
            let _ = std::io::stdout().write_all(&output.stdout);
            let _ = std::io::stderr().write_all(&output.stderr);
            match output.status.code() {
                Some(0) => ExitCode::SUCCESS,
                Some(code) => ExitCode::from(code as u8),
                None => ExitCode::FAILURE,
            }
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Writes `<path>` with the runtime preamble replaced by
/// `#include "kapila_runtime.h"`, and that header written alongside it —
/// spec §6's `-o` split, as opposed to the stdout path which inlines the
/// runtime directly.
fn write_split(c_source: &str, path: &PathBuf) -> ExitCode {
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let header_path = dir.join("kapila_runtime.h");

    let body = c_source
        .strip_prefix(RUNTIME_PREAMBLE)
        .map(|rest| rest.trim_start_matches('\n'))
        .unwrap_or(c_source);
    let split_source = format!("#include \"kapila_runtime.h\"\n\n{body}");

    if let Err(e) = std::fs::write(&header_path, runtime_header()) {
        eprintln!("ದೋಷ: {} ಬರೆಯಲಾಗಲಿಲ್ಲ: {e}", header_path.display());
        return ExitCode::FAILURE;
    }
    if let Err(e) = std::fs::write(path, split_source) {
        eprintln!("ದೋಷ: {} ಬರೆಯಲಾಗಲಿಲ್ಲ: {e}", path.display());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
