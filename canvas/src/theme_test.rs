use super::*;

// =============================================================
// Theme table
// =============================================================

#[test]
fn default_is_dark() {
    assert_eq!(Theme::default(), Theme::Dark);
}

#[test]
fn keys_round_trip() {
    for theme in Theme::ALL {
        assert_eq!(Theme::from_key(theme.key()), Some(theme));
    }
    assert_eq!(Theme::from_key("neon"), None);
}

#[test]
fn background_hex_values() {
    assert_eq!(Theme::Dark.background_hex(), "#0f172a");
    assert_eq!(Theme::Light.background_hex(), "#ffffff");
    assert_eq!(Theme::Board.background_hex(), "#064e3b");
}

#[test]
fn placeholder_color_depends_on_light() {
    assert_eq!(Theme::Light.placeholder_color(), "#64748b");
    assert_eq!(Theme::Board.placeholder_color(), "#94a3b8");
}
