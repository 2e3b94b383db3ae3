//! The demo entity and its random generator.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabet for generated text fields.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generated timestamps spread up to half of this span on either side
/// of now (milliseconds, roughly ±925 days).
const DATE_SPREAD_MS: f64 = 1.6e11;

/// A generic record with one attribute of each supported kind.
///
/// Defaults keep every field non-null so each attribute's kind stays
/// detectable from its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    /// Integer attribute
    pub int_value: i64,
    /// Floating-point attribute
    pub real_value: f64,
    /// Text attribute
    pub text: String,
    /// Boolean attribute
    pub flag: bool,
    /// Date/time attribute
    pub at: DateTime<Utc>,
    /// Optional nested reference, unused in practice
    pub related: Option<Box<Thing>>,
}

impl Default for Thing {
    fn default() -> Self {
        Self {
            int_value: 0,
            real_value: 0.0,
            text: String::new(),
            flag: false,
            at: Utc::now(),
            related: None,
        }
    }
}

impl Thing {
    /// Generates a record with random values in the demo ranges.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let offset_ms = ((rng.gen::<f64>() - 0.5) * DATE_SPREAD_MS) as i64;
        Self {
            int_value: rng.gen_range(0..100),
            real_value: rng.gen::<f64>() * 100.0,
            text: random_text(rng, 10),
            flag: rng.gen_bool(0.5),
            at: Utc::now() + Duration::milliseconds(offset_ms),
            related: None,
        }
    }
}

/// Generates random alphanumeric text of the given length.
pub fn random_text(rng: &mut impl Rng, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// A stored record paired with the key the engine assigned it.
#[derive(Debug, Clone, PartialEq)]
pub struct ThingRecord {
    /// Auto-incremented key attached after reads
    pub key: u64,
    /// The record payload
    pub thing: Thing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn generated_values_stay_in_demo_ranges() {
        let mut rng = thread_rng();
        for _ in 0..100 {
            let thing = Thing::generate(&mut rng);
            assert!((0..100).contains(&thing.int_value));
            assert!((0.0..100.0).contains(&thing.real_value));
            assert_eq!(thing.text.len(), 10);
            assert!(thing.related.is_none());

            let offset = (thing.at - Utc::now()).num_milliseconds().abs();
            assert!(offset <= (DATE_SPREAD_MS / 2.0) as i64 + 1000);
        }
    }

    #[test]
    fn random_text_uses_only_the_alphabet() {
        let mut rng = thread_rng();
        let text = random_text(&mut rng, 64);
        assert_eq!(text.len(), 64);
        assert!(text.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn default_is_zeroed_and_unrelated() {
        let thing = Thing::default();
        assert_eq!(thing.int_value, 0);
        assert_eq!(thing.real_value, 0.0);
        assert_eq!(thing.text, "");
        assert!(!thing.flag);
        assert!(thing.related.is_none());
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let mut rng = thread_rng();
        let thing = Thing::generate(&mut rng);
        let value = serde_json::to_value(&thing).unwrap();
        let back: Thing = serde_json::from_value(value).unwrap();
        assert_eq!(back, thing);
    }
}
