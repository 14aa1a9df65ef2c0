//! Terminal error reporting: source snippets with a gutter and an
//! underline, plus the Kannada summary line spec §7 requires.

use super::error::{KapilaError, Severity};
use super::span::SourceCache;
use std::io::{self, Write};

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BLUE: &str = "\x1b[34m";
}

pub struct ReportConfig {
    pub color: bool,
    pub show_source: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_source: true,
        }
    }
}

pub struct Reporter<'a> {
    cache: &'a SourceCache,
    config: ReportConfig,
    error_count: usize,
    warning_count: usize,
}

impl<'a> Reporter<'a> {
    pub fn new(cache: &'a SourceCache) -> Self {
        Self {
            cache,
            config: ReportConfig::default(),
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn with_config(cache: &'a SourceCache, config: ReportConfig) -> Self {
        Self {
            cache,
            config,
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn report(&mut self, error: &KapilaError) -> io::Result<()> {
        let mut out = io::stderr();
        self.report_to(&mut out, error)
    }

    pub fn report_to<W: Write>(&mut self, out: &mut W, error: &KapilaError) -> io::Result<()> {
        match error.severity {
            Severity::Error | Severity::Fatal => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Hint => {}
        }

        self.write_header(out, error)?;

        if let Some(span) = &error.span {
            if let Some(source_map) = self.cache.get(span.source) {
                let loc = source_map.location(span.source, span.start);
                if self.config.color {
                    write!(out, "{}  --> {}", colors::BLUE, colors::RESET)?;
                } else {
                    write!(out, "  --> ")?;
                }
                writeln!(out, "{}:{}:{}", source_map.path, loc.line, loc.column)?;

                if self.config.show_source {
                    self.write_snippet(out, source_map, loc.line, loc.column, span, error.severity)?;
                }
            }
        }

        for (label_span, label_text) in &error.labels {
            if let Some(source_map) = self.cache.get(label_span.source) {
                let loc = source_map.location(label_span.source, label_span.start);
                writeln!(out, "  = {}:{}:{}: {}", source_map.path, loc.line, loc.column, label_text)?;
            }
        }

        if let Some(help) = &error.help {
            if self.config.color {
                write!(out, "{}  help:{} ", colors::CYAN, colors::RESET)?;
            } else {
                write!(out, "  help: ")?;
            }
            writeln!(out, "{}", help)?;
        }

        writeln!(out)?;
        Ok(())
    }

    pub fn report_all(&mut self, errors: &[KapilaError]) -> io::Result<()> {
        let mut out = io::stderr();
        for error in errors {
            self.report_to(&mut out, error)?;
        }
        self.write_summary(&mut out)?;
        Ok(())
    }

    fn write_header<W: Write>(&self, out: &mut W, error: &KapilaError) -> io::Result<()> {
        let (color, label) = match error.severity {
            Severity::Fatal | Severity::Error => (colors::RED, "error"),
            Severity::Warning => (colors::YELLOW, "warning"),
            Severity::Hint => (colors::CYAN, "hint"),
        };
        if self.config.color {
            write!(out, "{}{}{}:{} ", colors::BOLD, color, label, colors::RESET)?;
        } else {
            write!(out, "{}: ", label)?;
        }
        writeln!(out, "{}", error.message)
    }

    fn write_snippet<W: Write>(
        &self,
        out: &mut W,
        source_map: &super::span::SourceMap,
        line_num: u32,
        column: u32,
        span: &super::span::Span,
        severity: Severity,
    ) -> io::Result<()> {
        let line = source_map.line(line_num);
        let gutter_width = line_num.to_string().len() + 1;

        if self.config.color {
            write!(out, "{}{:>width$} │{} ", colors::BLUE, line_num, colors::RESET, width = gutter_width)?;
        } else {
            write!(out, "{:>width$} │ ", line_num, width = gutter_width)?;
        }
        writeln!(out, "{}", line)?;

        if self.config.color {
            write!(out, "{}{:>width$} │{} ", colors::BLUE, "", colors::RESET, width = gutter_width)?;
        } else {
            write!(out, "{:>width$} │ ", "", width = gutter_width)?;
        }
        for _ in 0..(column.saturating_sub(1)) {
            write!(out, " ")?;
        }
        let underline_len = (span.end - span.start).max(1);
        let color = match severity {
            Severity::Error | Severity::Fatal => colors::RED,
            Severity::Warning => colors::YELLOW,
            Severity::Hint => colors::CYAN,
        };
        if self.config.color {
            write!(out, "{}", color)?;
        }
        for _ in 0..underline_len {
            write!(out, "^")?;
        }
        if self.config.color {
            write!(out, "{}", colors::RESET)?;
        }
        writeln!(out)
    }

    fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "ಸಂಕಲನ ವಿಫಲ (compilation failed): {} error(s), {} warning(s)",
            self.error_count, self.warning_count
        )
    }
}

pub fn emit(cache: &SourceCache, error: &KapilaError) {
    let mut reporter = Reporter::new(cache);
    let _ = reporter.report(error);
}

pub fn emit_all(cache: &SourceCache, errors: &[KapilaError]) {
    let mut reporter = Reporter::new(cache);
    let _ = reporter.report_all(errors);
}
