use chrono::Utc;
use uuid::Uuid;

/// Builds a record id such as `app_1718000000000_3f2a9c1b`.
///
/// The millisecond prefix keeps ids roughly time-ordered; the random suffix keeps
/// two records created in the same millisecond distinct.
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, millis, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_carry_prefix() {
        assert!(generate_id("user").starts_with("user_"));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id("note")).collect();
        assert_eq!(ids.len(), 500);
    }
}
