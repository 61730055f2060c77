//! Per-suite bookkeeping of check outcomes.

use crate::output::Formatter;
use serde::Serialize;

/// Outcome of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Worked as expected
    Pass,
    /// Passed, with something worth a look
    Warn,
    /// Did not work
    Fail,
    /// Not run
    Skip,
}

impl Outcome {
    /// Upper-case label for summaries
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Warn => "WARN",
            Outcome::Fail => "FAIL",
            Outcome::Skip => "SKIP",
        }
    }
}

/// One named check
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// Check name
    pub name: String,
    /// Outcome
    pub outcome: Outcome,
    /// What was observed
    pub detail: String,
}

/// Aggregate result of a suite. Warnings count as passes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestResults {
    /// Suite name
    pub suite: String,
    /// Passed checks, warnings included
    pub passed: usize,
    /// Failed checks
    pub failed: usize,
    /// Skipped checks
    pub skipped: usize,
    /// Every check in run order
    pub checks: Vec<Check>,
}

impl TestResults {
    /// Empty results for `suite`
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            ..Default::default()
        }
    }

    /// Record a check and return it
    pub fn record(&mut self, name: &str, outcome: Outcome, detail: impl Into<String>) -> &Check {
        match outcome {
            Outcome::Pass | Outcome::Warn => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::Skip => self.skipped += 1,
        }
        self.checks.push(Check {
            name: name.to_string(),
            outcome,
            detail: detail.into(),
        });
        &self.checks[self.checks.len() - 1]
    }

    /// Total number of checks
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// No failures
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Process exit code for these results
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }

    /// Names of failed checks
    pub fn failures(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| c.outcome == Outcome::Fail)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Fold another suite's results into these
    pub fn absorb(&mut self, other: TestResults) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.checks.extend(other.checks.into_iter().map(|mut c| {
            c.name = format!("{}: {}", other.suite, c.name);
            c
        }));
    }

    /// One-line count summary
    pub fn summary_line(&self) -> String {
        format!(
            "Passed: {}, Failed: {}, Skipped: {}, Total: {}",
            self.passed,
            self.failed,
            self.skipped,
            self.total()
        )
    }
}

/// Records checks and prints each one as it happens
pub struct Recorder<'a> {
    formatter: &'a Formatter,
    results: TestResults,
}

impl<'a> Recorder<'a> {
    /// Start recording `suite`
    pub fn new(suite: &str, formatter: &'a Formatter) -> Self {
        Self {
            formatter,
            results: TestResults::new(suite),
        }
    }

    /// The formatter in use
    pub fn formatter(&self) -> &'a Formatter {
        self.formatter
    }

    fn record(&mut self, name: &str, outcome: Outcome, detail: String) {
        let line = self.formatter.check(self.results.record(name, outcome, detail));
        self.formatter.emit(line);
    }

    /// Record a pass
    pub fn pass(&mut self, name: &str, detail: impl Into<String>) {
        self.record(name, Outcome::Pass, detail.into());
    }

    /// Record a pass that deserves attention
    pub fn warn(&mut self, name: &str, detail: impl Into<String>) {
        self.record(name, Outcome::Warn, detail.into());
    }

    /// Record a failure
    pub fn fail(&mut self, name: &str, detail: impl Into<String>) {
        self.record(name, Outcome::Fail, detail.into());
    }

    /// Record a skipped check
    pub fn skip(&mut self, name: &str, reason: impl Into<String>) {
        self.record(name, Outcome::Skip, reason.into());
    }

    /// Print an informational line
    pub fn info(&self, message: impl AsRef<str>) {
        self.formatter.emit(self.formatter.info(message.as_ref()));
    }

    /// Print a warning line that is not a check
    pub fn note(&self, message: impl AsRef<str>) {
        self.formatter.emit(self.formatter.warning(message.as_ref()));
    }

    /// Print an indented detail line
    pub fn detail(&self, message: impl AsRef<str>) {
        self.formatter.emit(format!("    {}", message.as_ref()));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        self.formatter.emit(self.formatter.header(title));
    }

    /// Results recorded so far
    pub fn results(&self) -> &TestResults {
        &self.results
    }

    /// Stop recording
    pub fn finish(self) -> TestResults {
        self.results
    }
}
