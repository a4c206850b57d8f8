use serde::Serialize;

/// Stable identity of a record: its position in the corpus at load time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(transparent)]
pub struct RecordId(usize);

impl RecordId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the record in load order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        assert_eq!(RecordId::new(42).index(), 42);
    }

    #[test]
    fn display_has_hash_prefix() {
        assert_eq!(RecordId::new(7).to_string(), "#7");
    }

    #[test]
    fn orders_by_load_position() {
        assert!(RecordId::new(1) < RecordId::new(2));
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&RecordId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
