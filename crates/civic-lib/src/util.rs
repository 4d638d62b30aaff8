//! ID generation and timestamp utilities.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MIN_WIDTH: usize = 4;
const MAX_WIDTH: usize = 8;
const ATTEMPTS_PER_WIDTH: u32 = 10;
/// Acceptable birthday-bound exponent, roughly a 25% chance of one clash.
const COLLISION_BUDGET: f64 = 0.28;

/// Everything that goes into an issue id.
#[derive(Debug, Clone, Copy)]
pub struct IdSeed<'a> {
    pub title: &'a str,
    pub reported_by: &'a str,
    pub created_at: DateTime<Utc>,
    /// Per-store counter; never repeats inside one store.
    pub sequence: u64,
}

impl IdSeed<'_> {
    fn digest(&self, attempt: u32) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        hasher.update([0]);
        hasher.update(self.reported_by.as_bytes());
        hasher.update([0]);
        hasher.update(self.created_at.timestamp_micros().to_le_bytes());
        hasher.update(self.sequence.to_le_bytes());
        hasher.update(attempt.to_le_bytes());
        let bytes = hasher.finalize();

        let mut head = [0u8; 8];
        head.copy_from_slice(&bytes[..8]);
        u64::from_be_bytes(head)
    }
}

/// Mint an id such as `civ-3k9f` that `taken` does not already claim.
///
/// Short ids are tried first; the width grows with the store so clashes
/// stay rare. When every attempt clashes the sequence is appended, then a
/// counter until `taken` accepts the result.
pub fn generate_id(
    prefix: &str,
    seed: &IdSeed<'_>,
    population: usize,
    taken: impl Fn(&str) -> bool,
) -> String {
    let mut attempt = 0;
    for width in id_width(population)..=MAX_WIDTH {
        for _ in 0..ATTEMPTS_PER_WIDTH {
            let candidate = format!("{prefix}-{}", to_base36(seed.digest(attempt), width));
            attempt += 1;
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
    let stem = format!(
        "{prefix}-{}{}",
        to_base36(seed.digest(attempt), MAX_WIDTH),
        seed.sequence
    );
    let mut candidate = stem.clone();
    let mut bump = 0u64;
    while taken(&candidate) {
        bump += 1;
        candidate = format!("{stem}-{bump}");
    }
    candidate
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn id_width(population: usize) -> usize {
    let n = population as f64;
    (MIN_WIDTH..MAX_WIDTH)
        .find(|&w| n * n / (2.0 * 36_f64.powi(w as i32)) < COLLISION_BUDGET)
        .unwrap_or(MAX_WIDTH)
}

/// Low `width` base36 digits of `value`, zero padded.
#[allow(clippy::cast_possible_truncation)]
fn to_base36(mut value: u64, width: usize) -> String {
    let mut digits = vec![b'0'; width];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    digits.into_iter().map(char::from).collect()
}

// ============================================================================
// Timestamps
// ============================================================================

/// Wall clock that never hands out the same instant twice.
///
/// Two mutations inside one clock tick still get strictly increasing
/// timestamps, so `updated_at > created_at` holds for any mutated issue.
#[derive(Debug, Clone, Default)]
pub struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub fn now(&mut self) -> DateTime<Utc> {
        let wall = Utc::now();
        let next = match self.last {
            Some(last) if wall <= last => last + Duration::microseconds(1),
            _ => wall,
        };
        self.last = Some(next);
        next
    }

    /// Make sure later readings come after `seen` (used when importing
    /// issues stamped in the future relative to this clock).
    pub fn observe(&mut self, seen: DateTime<Utc>) {
        if self.last.is_none_or(|last| seen > last) {
            self.last = Some(seen);
        }
    }
}
