use eframe::egui::Key;

/// The name a browser would report in `KeyboardEvent.key`, which is what
/// `if key "<K>" down` is written against. egui's own names differ for the
/// arrows (`Up` vs `ArrowUp`) and the space bar.
pub fn script_key_name(key: Key) -> String {
    match key {
        Key::ArrowUp    => "ArrowUp".into(),
        Key::ArrowDown  => "ArrowDown".into(),
        Key::ArrowLeft  => "ArrowLeft".into(),
        Key::ArrowRight => "ArrowRight".into(),
        Key::Space      => " ".into(),
        other => {
            let name = other.name();
            // letters arrive unshifted
            if name.len() == 1 { name.to_lowercase() } else { name.to_string() }
        }
    }
}
