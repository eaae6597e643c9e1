// src/data/timestamprule.rs

//! Implements [`TimestampRule`]s and compiling them to
//! [`CompiledMatcher`]s.
//!
//! A scan tries each `CompiledMatcher` in priority order against a line.
//! The first matcher whose regex matches *and* whose matched text is a
//! valid instant per its format wins.
//! An implicit ISO-8601 matcher is always last.

use crate::common::EpochMillis;
use crate::data::datetime::{TimestampFormat, ISO8601_REGEX};
use crate::data::diagnostic::{Diagnostic, DiagnosticSink};

use std::fmt;

use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TimestampRule
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A user-supplied rule: a regular expression to find a timestamp within a
/// line and the format of that timestamp.
///
/// If the expression has a capture group then the first capture group is the
/// timestamp, otherwise the whole match is.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TimestampRule {
    pub match_expression: String,
    /// `"X"` epoch seconds, `"x"` epoch milliseconds, otherwise a
    /// date-token or `strftime` format
    pub format: String,
}

impl TimestampRule {
    pub fn new(
        match_expression: &str,
        format: &str,
    ) -> TimestampRule {
        TimestampRule {
            match_expression: match_expression.to_string(),
            format: format.to_string(),
        }
    }
}

pub type TimestampRules = Vec<TimestampRule>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CompiledMatcher
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A compiled [`TimestampRule`]. Read-only, shared by all file processing
/// threads.
#[derive(Clone)]
pub struct CompiledMatcher {
    regex: Regex,
    format: TimestampFormat,
}

impl fmt::Debug for CompiledMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // regex strings can be long, truncate it
        const MAXLEN: usize = 40;
        let rp: &str = self.regex.as_str();
        let rp_: String = match rp.char_indices().nth(MAXLEN) {
            Some((at, _)) => format!("{}…", &rp[..at]),
            None => rp.to_string(),
        };
        f.debug_struct("CompiledMatcher")
            .field("regex", &rp_)
            .field("format", &self.format)
            .finish()
    }
}

impl CompiledMatcher {
    pub fn new(
        regex: Regex,
        format: TimestampFormat,
    ) -> CompiledMatcher {
        CompiledMatcher { regex, format }
    }

    /// The implicit last matcher, a bare ISO-8601 instant.
    pub fn iso8601_fallback() -> CompiledMatcher {
        let regex = match Regex::new(ISO8601_REGEX) {
            Ok(regex) => regex,
            Err(err) => panic!("ISO8601_REGEX failed to compile {}", err),
        };

        CompiledMatcher::new(regex, TimestampFormat::Iso8601)
    }

    pub fn format(&self) -> &TimestampFormat {
        &self.format
    }

    pub fn regex_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Find the timestamp substring within `line` and interpret it.
    ///
    /// Returns `None` if the regex does not match or the matched text is not
    /// a valid instant.
    pub fn extract(
        &self,
        line: &str,
    ) -> Option<EpochMillis> {
        let captures = self.regex.captures(line)?;
        let found = match captures.get(1) {
            Some(group) => group,
            None => captures.get(0)?,
        };
        defñ!("{:?} matched {:?}", self.format, found.as_str());

        self.format.parse_millis(found.as_str())
    }
}

pub type CompiledMatchers = Vec<CompiledMatcher>;

/// Compile `rules`, in order, and append the ISO-8601 fallback.
///
/// A rule with a bad regular expression or bad format is skipped with a
/// [`Diagnostic`]; remaining rules are still compiled.
pub fn compile_rules(
    rules: &[TimestampRule],
    diagnostics: &dyn DiagnosticSink,
) -> CompiledMatchers {
    defn!("({} rules)", rules.len());
    let mut matchers = CompiledMatchers::with_capacity(rules.len() + 1);
    for (index, rule) in rules.iter().enumerate() {
        let regex = match Regex::new(rule.match_expression.as_str()) {
            Ok(regex) => regex,
            Err(err) => {
                defo!("rule {} regex error {}", index, err);
                diagnostics.diagnostic(Diagnostic::RuleInvalid(
                    index,
                    rule.match_expression.clone(),
                    err.to_string(),
                ));
                continue;
            }
        };
        let format = match TimestampFormat::from_specifier(rule.format.as_str()) {
            Ok(format) => format,
            Err(err) => {
                defo!("rule {} format error {}", index, err);
                diagnostics.diagnostic(Diagnostic::FormatInvalid(index, rule.format.clone(), err.reason));
                continue;
            }
        };
        matchers.push(CompiledMatcher::new(regex, format));
    }
    matchers.push(CompiledMatcher::iso8601_fallback());
    defx!("{} matchers", matchers.len());

    matchers
}

/// Try each matcher in order; the first valid instant wins.
pub fn extract_timestamp(
    matchers: &[CompiledMatcher],
    line: &str,
) -> Option<EpochMillis> {
    matchers
        .iter()
        .find_map(|matcher| matcher.extract(line))
}
