use log::warn;
use std::str::SplitWhitespace;

/// Whitespace tokenizer over one solver card or output row.
///
/// Fields are read positionally. A missing or unparsable token yields zero
/// (or an empty string) and is counted as an anomaly instead of failing the
/// whole parse.
pub struct Tokens<'a> {
    line: &'a str,
    inner: SplitWhitespace<'a>,
    anomalies: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            inner: line.split_whitespace(),
            anomalies: 0,
        }
    }

    /// Tokenizes everything after the two-letter card mnemonic, so that
    /// `GW1 7 ...` and `GW 1 7 ...` read the same.
    pub fn after_mnemonic(line: &'a str) -> Self {
        let mut tokens = Self::new(line);
        tokens.inner = line.get(2..).unwrap_or("").split_whitespace();
        tokens
    }

    pub fn next_f64(&mut self, field: &'static str) -> f64 {
        match self.inner.next().map(str::parse::<f64>) {
            Some(Ok(value)) => value,
            other => {
                self.anomaly(field, other.is_none());
                0.0
            }
        }
    }

    /// Integer field. Accepts a float literal with an integral value, as some
    /// writers pad integers as `1.`.
    pub fn next_i64(&mut self, field: &'static str) -> i64 {
        let token = self.inner.next();
        if let Some(value) = token.and_then(|t| t.parse::<i64>().ok()) {
            return value;
        }
        match token.and_then(|t| t.parse::<f64>().ok()) {
            Some(value) if value.fract() == 0.0 => value as i64,
            _ => {
                self.anomaly(field, token.is_none());
                0
            }
        }
    }

    pub fn next_word(&mut self, field: &'static str) -> &'a str {
        match self.inner.next() {
            Some(word) => word,
            None => {
                self.anomaly(field, true);
                ""
            }
        }
    }

    /// Drops `n` tokens without interpreting them.
    pub fn skip(&mut self, n: usize) {
        for _ in 0..n {
            if self.inner.next().is_none() {
                break;
            }
        }
    }

    pub fn anomalies(&self) -> usize {
        self.anomalies
    }

    fn anomaly(&mut self, field: &'static str, missing: bool) {
        self.anomalies += 1;
        let reason = if missing { "missing" } else { "unparsable" };
        warn!("{} {} field in {:?}, using zero", reason, field, self.line.trim_end());
    }
}
