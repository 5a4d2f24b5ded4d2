//! All kinds of errors in this crate.

use displaydoc::Display;
use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Unable to read entropy for the noise source: {0}.
    Entropy(#[from] getrandom::Error),
    /// State file I/O error: {0}.
    Io(#[from] std::io::Error),
    /// Invalid rule: {0:?}.
    ParseRuleError(#[from] ca_rules::ParseRuleError),
    /// Invalid pattern: {0}.
    ParsePatternError(String),
    /// Malformed state file: {0}.
    LedgerError(String),
    /// Invalid configuration: {0}.
    ConfigError(String),
    /// The seed engine has no live cells.
    EmptyEngine,
    /// The seed engine died out or escaped while generating phases.
    EngineCollapsed,
}
