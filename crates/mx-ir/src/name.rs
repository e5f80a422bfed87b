//! Fixed-capacity names for channels, tracks and timeline entries.

use arrayvec::ArrayString;

/// Maximum length of a name in bytes.
pub const NAME_CAPACITY: usize = 32;

/// A short inline string used for labels and channel names.
pub type Name = ArrayString<NAME_CAPACITY>;

/// Build a [`Name`], truncating on a char boundary if `s` is too long.
pub fn bounded_name(s: &str) -> Name {
    let mut name = Name::new();
    for ch in s.chars() {
        if name.try_push(ch).is_err() {
            break;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_kept() {
        assert_eq!(bounded_name("Drums").as_str(), "Drums");
    }

    #[test]
    fn long_names_truncate_to_capacity() {
        let long = "x".repeat(50);
        assert_eq!(bounded_name(&long).len(), NAME_CAPACITY);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; 17 of them overflow a 32-byte name by two bytes.
        let accented = "é".repeat(17);
        let name = bounded_name(&accented);
        assert_eq!(name.chars().count(), 16);
        assert_eq!(name.len(), 32);
    }
}
