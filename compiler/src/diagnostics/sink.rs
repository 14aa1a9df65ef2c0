use crate::errors::{KapilaError, Severity};

/// Collects diagnostics without aborting the parse that produced them.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<KapilaError>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: KapilaError) {
        self.diagnostics.push(error);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d.severity, Severity::Error | Severity::Fatal))
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error | Severity::Fatal))
            .count()
    }

    pub fn into_vec(self) -> Vec<KapilaError> {
        self.diagnostics
    }

    pub fn as_slice(&self) -> &[KapilaError] {
        &self.diagnostics
    }
}
