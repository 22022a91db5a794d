use std::collections::BTreeSet;

/// Keys currently held, by lower-cased identifier (`arrowup`, `a`, `" "`).
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: BTreeSet<String>,
}

/// Lower-case a key identifier; `space` and `spacebar` name the space bar.
pub fn normalize_key(key: &str) -> String {
    let key = key.to_lowercase();
    match key.as_str() {
        "space" | "spacebar" => " ".to_string(),
        _ => key,
    }
}

impl InputState {
    pub fn key_down(&mut self, key: &str) {
        self.pressed.insert(normalize_key(key));
    }

    pub fn key_up(&mut self, key: &str) {
        self.pressed.remove(&normalize_key(key));
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.pressed.contains(&normalize_key(key))
    }

    pub fn pressed(&self) -> impl Iterator<Item = &str> {
        self.pressed.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let mut input = InputState::default();
        input.key_down("ArrowUp");
        assert!(input.is_down("arrowup"));
        assert!(input.is_down("ARROWUP"));
        input.key_up("arrowUp");
        assert!(!input.is_down("arrowup"));
    }

    #[test]
    fn space_aliases() {
        let mut input = InputState::default();
        input.key_down(" ");
        assert!(input.is_down("space"));
        assert!(input.is_down("Spacebar"));
        input.key_up("Space");
        assert!(!input.is_down(" "));
    }

    #[test]
    fn releasing_unpressed_key_is_harmless() {
        let mut input = InputState::default();
        input.key_up("a");
        assert_eq!(input.pressed().count(), 0);
    }
}
