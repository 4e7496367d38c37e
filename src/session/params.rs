//! Parameter Store: holds the current `AnalysisParameters`.
//!
//! The only behaviour is lenient integer coercion on `set`. Unparseable input
//! becomes 0 instead of being rejected; bounds are the backend's problem.

use crate::models::{AnalysisParameters, ParamField};

#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: AnalysisParameters,
}

impl ParameterStore {
    pub fn new(params: AnalysisParameters) -> Self {
        ParameterStore { params }
    }

    /// Snapshot of the current parameters.
    pub fn get(&self) -> AnalysisParameters {
        self.params
    }

    /// Parse `raw` and replace `field`. Returns the value actually stored.
    pub fn set(&mut self, field: ParamField, raw: &str) -> i64 {
        let value = coerce_integer(raw);
        if value != self.params.value(field) {
            log::debug!("[Params] {} = {} (raw: {:?})", field, value, raw);
        }
        self.params.set_value(field, value);
        value
    }
}

/// Leading-integer parse: optional whitespace, optional sign, then the
/// leading run of ASCII digits. `"12px"` is 12, `"3.9"` is 3, `"abc"` is 0.
/// Overflow also yields 0.
pub fn coerce_integer(raw: &str) -> i64 {
    let s = raw.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return 0;
    }
    let digits = &rest[..digits_len];
    let parsed = if negative {
        format!("-{}", digits).parse::<i64>()
    } else {
        digits.parse::<i64>()
    };
    parsed.unwrap_or(0)
}
