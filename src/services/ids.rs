//! Comment identifier generation.
//!
//! Ids look like `c_{authorHash}_{sequence}_{timeBase36}_{random}` and never
//! exceed [`MAX_ID_LEN`]. They are not deterministic: wall-clock time and a
//! random suffix are mixed in. Collision detection is left to the store.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::store::MAX_ID_LEN;

const PREFIX: &str = "c";
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub const AUTHOR_HASH_WIDTH: usize = 6;
pub const TIME_WIDTH: usize = 9;
pub const RANDOM_WIDTH: usize = 4;
pub const EMERGENCY_RANDOM_WIDTH: usize = 8;

/// Upper bound for the sequence used when the author's comment count is unknown.
pub const FALLBACK_SEQUENCE_BOUND: i64 = 100_000;

/// Short, non-cryptographic digest of an author id: the sum of its UTF-16
/// code units in hex, capped at [`AUTHOR_HASH_WIDTH`] characters.
pub fn author_hash(author_id: &str) -> String {
    let sum: u64 = author_id.encode_utf16().map(u64::from).sum();
    let hex = format!("{:x}", sum);
    keep_tail(&hex, AUTHOR_HASH_WIDTH).to_string()
}

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Epoch milliseconds in base 36, trimmed to the fastest-moving digits.
pub fn time_component(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    keep_tail(&to_base36(millis), TIME_WIDTH).to_string()
}

pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Sequence number used when the author's comment count cannot be read.
pub fn fallback_sequence(now: DateTime<Utc>) -> u64 {
    now.timestamp_millis().rem_euclid(FALLBACK_SEQUENCE_BOUND) as u64
}

/// Id for the first creation attempt.
pub fn primary_id<R: Rng + ?Sized>(
    author_id: &str,
    sequence: u64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let hash = author_hash(author_id);
    let time = time_component(now);
    let random = random_suffix(rng, RANDOM_WIDTH);

    // Four underscores plus the fixed-width parts; whatever is left goes to
    // the sequence, keeping its trailing digits.
    let fixed = PREFIX.len() + hash.len() + time.len() + random.len() + 4;
    let budget = MAX_ID_LEN.saturating_sub(fixed).max(1);
    let sequence = sequence.to_string();
    let sequence = keep_tail(&sequence, budget);

    format!("{}_{}_{}_{}_{}", PREFIX, hash, sequence, time, random)
}

/// Id for the retry after a collision: no sequence, more randomness.
pub fn emergency_id<R: Rng + ?Sized>(author_id: &str, now: DateTime<Utc>, rng: &mut R) -> String {
    format!(
        "{}_{}_{}_{}",
        PREFIX,
        author_hash(author_id),
        time_component(now),
        random_suffix(rng, EMERGENCY_RANDOM_WIDTH)
    )
}

fn keep_tail(s: &str, width: usize) -> &str {
    // Inputs are ASCII hex/base36/decimal digits.
    &s[s.len().saturating_sub(width)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn author_hash_sums_code_units() {
        // 'u' = 0x75, '1' = 0x31
        assert_eq!(author_hash("u1"), "a6");
        assert_eq!(author_hash(""), "0");
    }

    #[test]
    fn author_hash_is_capped() {
        let long = "z".repeat(200_000);
        assert_eq!(author_hash(&long).len(), AUTHOR_HASH_WIDTH);
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn primary_id_has_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = primary_id("u1", 3, at(1_700_000_000_000), &mut rng);

        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], "c");
        assert_eq!(parts[1], "a6");
        assert_eq!(parts[2], "3");
        assert_eq!(parts[3], "loyw3v28");
        assert_eq!(parts[4].len(), RANDOM_WIDTH);
        assert!(parts[4].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn primary_id_never_exceeds_ceiling() {
        let mut rng = StdRng::seed_from_u64(1);
        let author = "an-author-with-a-very-long-identifier-0123456789";
        let id = primary_id(author, u64::MAX, at(8_000_000_000_000_000), &mut rng);
        assert!(id.len() <= MAX_ID_LEN, "{} is {} chars", id, id.len());

        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 5);
        assert!(u64::MAX.to_string().ends_with(parts[2]));
    }

    #[test]
    fn emergency_id_drops_sequence() {
        let mut rng = StdRng::seed_from_u64(9);
        let id = emergency_id("u1", at(1_700_000_000_000), &mut rng);

        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1], "a6");
        assert_eq!(parts[3].len(), EMERGENCY_RANDOM_WIDTH);
        assert!(id.len() <= MAX_ID_LEN);
    }

    #[test]
    fn same_inputs_produce_different_ids() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = at(1_700_000_000_000);
        let a = primary_id("u1", 1, now, &mut rng);
        let b = primary_id("u1", 1, now, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn fallback_sequence_is_bounded() {
        assert_eq!(fallback_sequence(at(1_700_000_123_456)), 23_456);
        assert!(fallback_sequence(Utc::now()) < FALLBACK_SEQUENCE_BOUND as u64);
    }
}
