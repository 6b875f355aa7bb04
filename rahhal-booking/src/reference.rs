use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a human-readable booking reference: `TK` followed by the last
/// six digits of the creation timestamp in milliseconds and four uppercase
/// characters drawn from a v4 UUID.
///
/// The random tail is small, so uniqueness is ultimately enforced by the
/// database index on the column; callers retry with a fresh reference on a
/// unique-violation.
pub fn generate_reference(at: DateTime<Utc>) -> String {
    let suffix = (at.timestamp_millis().rem_euclid(1_000_000)) as u32;
    let entropy = Uuid::new_v4().simple().to_string();
    format!("TK{:06}{}", suffix, entropy[..4].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_reference_format() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 45).unwrap();
        let reference = generate_reference(at);
        assert_eq!(reference.len(), 12);
        assert!(reference.starts_with("TK"));
        assert!(reference[2..8].chars().all(|c| c.is_ascii_digit()));
        assert!(reference[8..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_distinct_timestamps_give_distinct_references() {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut seen = HashSet::new();
        for offset_ms in 0..200i64 {
            let at = base + chrono::Duration::milliseconds(offset_ms);
            assert!(seen.insert(generate_reference(at)[..8].to_string()));
        }
    }
}
