//! Net name canonicalization.

/// Spellings that all denote the ground net, compared case-insensitively.
pub const GROUND_ALIASES: &[&str] = &["0", "GND", "GROUND", "AGND", "DGND"];

/// Canonical name of the ground net.
pub const GROUND: &str = "0";

/// Canonicalize a raw net name.
///
/// Blank input becomes `""` (unconnected), any ground alias becomes `"0"`,
/// everything else is returned trimmed and otherwise unchanged.
pub fn normalize_net(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if GROUND_ALIASES
        .iter()
        .any(|alias| trimmed.eq_ignore_ascii_case(alias))
    {
        return GROUND.to_string();
    }
    trimmed.to_string()
}

/// Check whether a raw net name denotes ground.
pub fn is_ground(raw: &str) -> bool {
    normalize_net(raw) == GROUND
}
