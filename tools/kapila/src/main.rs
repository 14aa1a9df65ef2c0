//! `kapila` — the Kapila interpreter front end (spec §6 "CLI surface
//! (interpreter)"). With a file argument it executes the file and exits;
//! with none it starts a REPL backed by `rustyline`, keeping one `Vm`
//! alive across lines so word definitions and variables persist for the
//! whole session (spec §3 "Lifecycle").

use clap::Parser;
use kapila_compiler::driver;
use kapila_compiler::vm::Vm;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "kapila", about = "Run Kapila source, or start the REPL with no arguments")]
struct Cli {
    /// A `.kpl` source file to execute. Omit to start the REPL.
    path: Option<PathBuf>,
}

const HELP_TEXT: &str = "\
ಕಮಾಂಡ್‌ಗಳು (commands):
  exit, quit        ಅಧಿವೇಶನ ಮುಗಿಸು (leave the REPL)
  help              ಈ ಸಹಾಯ ತೋರಿಸು (show this help)
  .s, stack         ಸ್ಟ್ಯಾಕ್ ತೋರಿಸು (print the operand stack)
  .w, words         ಬಳಕೆದಾರ ಪದಗಳನ್ನು ಪಟ್ಟಿಮಾಡು (list user-defined words)
  .v, vars          ಚರಗಳನ್ನು ಪಟ್ಟಿಮಾಡು (list variables)
  clear             ಸ್ಟ್ಯಾಕ್ ಖಾಲಿ ಮಾಡು (empty the stack)";

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.path {
        Some(path) => run_file(&path),
        None => {
            run_repl();
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ದೋಷ: {} ಓದಲಾಗಲಿಲ್ಲ: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut vm = Vm::new_empty(&mut out);

    match driver::run_source(&mut vm, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_repl() {
    println!("Kapila REPL — `help` for commands, `exit` to leave.");

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("ದೋಷ: ಸಾಲು ಸಂಪಾದಕ ಪ್ರಾರಂಭಿಸಲಾಗಲಿಲ್ಲ: {e}");
            return;
        }
    };

    let stdout = io::stdout();
    let mut out_handle = stdout.lock();
    let mut vm = Vm::new_empty(&mut out_handle);

    loop {
        match rl.readline("ಕಪಿಲ> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "exit" | "quit" => break,
                    "help" => println!("{HELP_TEXT}"),
                    ".s" | "stack" => print_stack(&vm),
                    ".w" | "words" => print_words(&vm),
                    ".v" | "vars" => print_vars(&vm),
                    "clear" => vm.clear_stack(),
                    _ => {
                        if let Err(e) = driver::run_source(&mut vm, trimmed) {
                            eprintln!("{e}");
                        }
                        let _ = io::stdout().flush();
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("ದೋಷ: {e}");
                break;
            }
        }
    }
}

fn print_stack(vm: &Vm<'_>) {
    let items: Vec<String> = vm.stack().iter().map(|v| v.to_string()).collect();
    println!("[{}]", items.join(" "));
}

fn print_words(vm: &Vm<'_>) {
    let mut words: Vec<&str> = vm.words().collect();
    words.sort_unstable();
    for w in words {
        println!("{w}");
    }
}

fn print_vars(vm: &Vm<'_>) {
    let mut vars: Vec<(&str, String)> = vm.variables().map(|(k, v)| (k, v.to_string())).collect();
    vars.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in vars {
        println!("{name} = {value}");
    }
}
