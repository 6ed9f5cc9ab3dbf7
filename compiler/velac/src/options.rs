//! Per-call processor settings.

use std::time::Duration;

use vela_parse::ParseOptions;

/// Limits and defaults for one script evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcessorOptions {
    /// Modules every script imports without a `using`.
    pub default_usings: Vec<String>,
    /// Wall-clock budget of a run. Compilation is not counted.
    pub maximum_time: Duration,
    /// Most elements a single repository read may return.
    pub maximum_rows: usize,
    /// Reject scripts with trailing input after the result expression.
    pub strict: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        ProcessorOptions {
            default_usings: vec!["System".to_owned()],
            maximum_time: Duration::from_millis(3000),
            maximum_rows: 5000,
            strict: true,
        }
    }
}

impl ProcessorOptions {
    #[must_use]
    pub fn with_maximum_time(mut self, maximum_time: Duration) -> Self {
        self.maximum_time = maximum_time;
        self
    }

    #[must_use]
    pub fn with_maximum_rows(mut self, maximum_rows: usize) -> Self {
        self.maximum_rows = maximum_rows;
        self
    }

    #[must_use]
    pub fn with_using(mut self, module: impl Into<String>) -> Self {
        self.default_usings.push(module.into());
        self
    }

    pub(crate) fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict: self.strict,
        }
    }
}
