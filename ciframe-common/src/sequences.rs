//! Famous chord progression registry
//!
//! Fixed at build time; not derived from the corpus. Songs reference these
//! ids in their `famous_sequences` field.

/// (progression code, id)
const FAMOUS_SEQUENCES: &[(&str, u8)] = &[
    ("BmGDA", 0),
    ("CGAmF", 1),
    ("EmG", 2),
    ("CA7DmG7", 3),
    ("GmF", 4),
    ("CC7FFm", 5),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRegistry;

impl SequenceRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a client-supplied progression ("C,G,Am,F" or "CGAmF")
    pub fn lookup(&self, code: &str) -> Option<u8> {
        let compact: String = code.chars().filter(|c| *c != ',').collect();
        FAMOUS_SEQUENCES
            .iter()
            .find(|(known, _)| *known == compact)
            .map(|(_, id)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_compact_and_csv() {
        let registry = SequenceRegistry::new();
        assert_eq!(registry.lookup("CGAmF"), Some(1));
        assert_eq!(registry.lookup("C,G,Am,F"), Some(1));
        assert_eq!(registry.lookup("C,C7,F,Fm"), Some(5));
    }

    #[test]
    fn test_lookup_unknown_and_case() {
        let registry = SequenceRegistry::new();
        assert_eq!(registry.lookup("cgamf"), None);
        assert_eq!(registry.lookup(""), None);
    }

    #[test]
    fn test_every_code_resolves_to_its_own_id() {
        let registry = SequenceRegistry::new();
        for (code, id) in FAMOUS_SEQUENCES {
            assert_eq!(registry.lookup(code), Some(*id));
        }
        let ids: std::collections::HashSet<u8> =
            FAMOUS_SEQUENCES.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids.len(), FAMOUS_SEQUENCES.len());
    }
}
