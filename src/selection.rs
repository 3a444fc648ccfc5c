/// Most recently chosen massif or vegetation-category key.
///
/// A single optional slot: each choice overwrites the previous one, and
/// re-choosing the current key is an observable no-op. There is no history
/// and no persistence across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot, returning whether it actually changed.
    pub fn set(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.current.as_deref() == Some(key.as_str()) {
            return false;
        }
        self.current = Some(key);
        true
    }

    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Back to the idle state.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        assert_eq!(Selection::new().get(), None);
    }

    #[test]
    fn set_overwrites_previous_choice() {
        let mut selection = Selection::new();
        assert!(selection.set("Calanques"));
        assert!(selection.set("Sainte-Baume"));
        assert_eq!(selection.get(), Some("Sainte-Baume"));
    }

    #[test]
    fn setting_same_key_twice_is_a_noop() {
        let mut selection = Selection::new();
        assert!(selection.set("Calanques"));
        assert!(!selection.set("Calanques"));
        assert_eq!(selection.get(), Some("Calanques"));
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut selection = Selection::new();
        selection.set("Calanques");
        selection.clear();
        assert_eq!(selection.get(), None);
    }
}
