//! The transition table.

use crate::error::Error;
use ca_rules::ParseNtLife;
use std::str::FromStr;

/// Number of distinct 3×3 neighborhood codes.
const CODES: usize = 1 << 9;

/// Birth and survival conditions as sets of 8-bit neighbor configurations,
/// filled in by the rule parser.
struct BsTable {
    birth: [bool; 256],
    survival: [bool; 256],
}

impl ParseNtLife for BsTable {
    fn from_bs(b: Vec<u8>, s: Vec<u8>) -> Self {
        let mut birth = [false; 256];
        let mut survival = [false; 256];
        for nbhd in b {
            birth[nbhd as usize] = true;
        }
        for nbhd in s {
            survival[nbhd as usize] = true;
        }
        BsTable { birth, survival }
    }
}

/// A lookup table from a 9-bit neighborhood code to the next state of the
/// center cell.
///
/// The code packs the three columns of the neighborhood, left column in the
/// high bits and each column top-to-bottom, so the center cell is bit 4:
///
/// ```text
/// 8 5 2
/// 7 4 1
/// 6 3 0
/// ```
///
/// This layout lets the stepper slide a window along a row: shift left by
/// three bits and OR in the next column's three cells.
///
/// The table is built from a rule string at startup, so the rule is
/// configuration data rather than a hardcoded constant. The neighbor bits
/// differ from the parser's reading order by a diagonal reflection, which
/// isotropic rules are invariant under; only isotropic rules are supported.
#[derive(Clone)]
pub struct TransitionTable {
    rule_string: String,
    table: Box<[bool; CODES]>,
}

impl TransitionTable {
    /// Parses a rule string and builds the lookup table.
    ///
    /// Supports Life-like and isotropic non-totalistic rules.
    pub fn parse_rule(input: &str) -> Result<Self, Error> {
        let bs = BsTable::parse_rule(input)?;
        let mut table = Box::new([false; CODES]);
        for (code, next) in table.iter_mut().enumerate() {
            let center = code >> 4 & 1 == 1;
            let nbhd = (code >> 1 & 0xf0) | (code & 0x0f);
            *next = if center {
                bs.survival[nbhd]
            } else {
                bs.birth[nbhd]
            };
        }
        Ok(TransitionTable {
            rule_string: input.to_string(),
            table,
        })
    }

    /// The rule string the table was built from.
    pub fn rule_string(&self) -> &str {
        &self.rule_string
    }

    /// The next state of the center cell of a 9-bit neighborhood code.
    #[inline]
    pub fn next_state(&self, code: u16) -> bool {
        self.table[code as usize & (CODES - 1)]
    }
}

impl FromStr for TransitionTable {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        TransitionTable::parse_rule(input)
    }
}
