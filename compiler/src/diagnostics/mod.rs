//! A small collector that gathers diagnostics emitted during a single
//! parse or compile without aborting, so the driver can report them all
//! at once (spec §7: "parse errors are collected and reported at end of
//! parse").

pub mod sink;

pub use sink::DiagnosticSink;
