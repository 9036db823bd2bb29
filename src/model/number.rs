//! Order numbers: `LM-YYMM-XXXX`.
//!
//! `YY`/`MM` come from the creation date; `XXXX` is drawn from an alphabet
//! without the look-alike characters `I`, `O`, `0` and `1`.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const PREFIX: &str = "LM";
const SUFFIX_LEN: usize = 4;
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A validated order number. The order store is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Draws a fresh number for an order created at `now`.
    ///
    /// Uniqueness is enforced by the order store, which retries on collision.
    pub fn generate(now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(format!(
            "{PREFIX}-{:02}{:02}-{suffix}",
            now.year() % 100,
            now.month()
        ))
    }

    /// Parses user input. Surrounding whitespace and letter case are ignored.
    ///
    /// The suffix may hold any letter or digit: numbers assigned before the
    /// look-alike characters were excluded remain valid.
    pub fn parse(input: &str) -> Option<Self> {
        let candidate = input.trim().to_ascii_uppercase();
        let mut parts = candidate.split('-');
        let (Some(prefix), Some(period), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        let month = period.get(2..4).and_then(|m| m.parse::<u32>().ok());
        let valid = prefix == PREFIX
            && period.len() == 4
            && period.bytes().all(|b| b.is_ascii_digit())
            && matches!(month, Some(1..=12))
            && suffix.len() == SUFFIX_LEN
            && suffix.bytes().all(|b| b.is_ascii_alphanumeric());
        valid.then_some(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid order number: {value}"))
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_numbers_follow_the_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        for _ in 0..200 {
            let number = OrderNumber::generate(now, &mut rng);
            assert!(number.as_str().starts_with("LM-2401-"));
            assert_eq!(OrderNumber::parse(number.as_str()), Some(number.clone()));
            assert!(!number.as_str()[8..].contains(['I', 'O', '0', '1']));
        }
    }

    #[test]
    fn parse_normalizes_and_rejects_malformed_input() {
        assert_eq!(
            OrderNumber::parse(" lm-2401-ab12 ").unwrap().as_str(),
            "LM-2401-AB12"
        );
        assert!(OrderNumber::parse("LM-2401-AB1").is_none());
        assert!(OrderNumber::parse("LM-2413-AB12").is_none());
        assert!(OrderNumber::parse("LM-2401-AB1_").is_none());
        assert!(OrderNumber::parse("XX-2401-AB12").is_none());
        assert!(OrderNumber::parse("LM-2401-AB12-9").is_none());
    }
}
