//! Palette-based color assignment and validation of manually chosen colors.

use crate::{ColorRejected, PaletteEntry, ParticipantRegistry, PALETTE};
use regex::Regex;
use std::sync::LazyLock;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid pattern"));

/// Picks the palette entry for the registry's current size.
///
/// Taken colors are not tracked: once the registry holds as many participants as the
/// palette has entries, colors start repeating.
pub fn assign(registry: &ParticipantRegistry) -> &'static PaletteEntry {
    &PALETTE[registry.len() % PALETTE.len()]
}

/// Validates a `#rgb` or `#rrggbb` color, surrounding whitespace allowed.
/// Returns the trimmed input on success.
pub fn apply_manual_color(requested: &str) -> Result<String, ColorRejected> {
    let trimmed = requested.trim();
    if HEX_COLOR.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ColorRejected {
            requested: requested.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Participant;

    #[test]
    fn it_assigns_by_registry_size() {
        let mut registry = ParticipantRegistry::new();
        assert_eq!(assign(&registry).name, "Red");

        for id in 0..PALETTE.len() as u32 {
            registry.register(Participant::new(id, "#000", "Black"));
        }
        // wraps around
        assert_eq!(assign(&registry), &PALETTE[0]);

        registry.register(Participant::new(100, "#000", "Black"));
        assert_eq!(assign(&registry), &PALETTE[1]);
    }

    #[test]
    fn it_accepts_short_and_long_hex() {
        assert_eq!(apply_manual_color("#ABC"), Ok("#ABC".to_string()));
        assert_eq!(apply_manual_color("#aabbcc"), Ok("#aabbcc".to_string()));
        assert_eq!(apply_manual_color("  #aAbB09\n"), Ok("#aAbB09".to_string()));
    }

    #[test]
    fn it_rejects_everything_else() {
        for requested in &["notacolor", "", "abc", "#abcd", "#ggg", "#aabbccdd", "# abc"] {
            assert_eq!(
                apply_manual_color(requested),
                Err(ColorRejected {
                    requested: requested.to_string()
                }),
                "{:?} must be rejected",
                requested
            );
        }
    }
}
