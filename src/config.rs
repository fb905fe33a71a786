//! Engine-wide options: a plain `Default`-able options struct consumed by
//! the top-level driver rather than a global.

use crate::locale::Locale;

/// A practical ceiling on input length.
pub const DEFAULT_MAX_INPUT_LEN: usize = 65536;

/// Significant decimals for the fixed-precision-then-trim approximation rule.
pub const DEFAULT_PRECISION: u8 = 8;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub max_input_len: usize,
    pub precision: u8,
    pub locale: Locale,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { max_input_len: DEFAULT_MAX_INPUT_LEN, precision: DEFAULT_PRECISION, locale: Locale::neutral() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_ceiling() {
        let options = EngineOptions::default();
        assert_eq!(options.max_input_len, 65536);
        assert_eq!(options.precision, 8);
    }
}
