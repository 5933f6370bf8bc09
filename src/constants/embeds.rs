use serenity::all::{Colour, CreateEmbed};

// ============================================================================
// Color Palette
// ============================================================================

/// Primary brand color - Deep blue
pub const PRIMARY_COLOR: Colour = Colour::from_rgb(59, 130, 246);

/// Success color - Emerald green
pub const SUCCESS_COLOR: Colour = Colour::from_rgb(16, 185, 129);

/// Error color - Rose red
pub const ERROR_COLOR: Colour = Colour::from_rgb(244, 63, 94);

/// Warning color - Amber
pub const WARNING_COLOR: Colour = Colour::from_rgb(245, 158, 11);

/// Kick color - Orange
pub const KICK_COLOR: Colour = Colour::from_rgb(249, 115, 22);

/// Timeout color - Yellow
pub const TIMEOUT_COLOR: Colour = Colour::from_rgb(234, 179, 8);

/// Temporary role color - Sky blue
pub const TEMP_ROLE_COLOR: Colour = Colour::from_rgb(14, 165, 233);

// ============================================================================
// Text Formatting
// ============================================================================

/// Bullet point character
pub const BULLET: &str = "•";

/// Discord caps embed field values at 1024 characters
pub const FIELD_VALUE_LIMIT: usize = 1024;

/// Discord allows at most 25 fields per embed
pub const MAX_EMBED_FIELDS: usize = 25;

/// Footer on every DM sent to a punished user
pub const DM_FOOTER: &str =
    "If you believe this was a mistake, please contact the server moderators.";

// ============================================================================
// Embed Builders
// ============================================================================

/// Create a standard/primary embed
pub fn standard_embed() -> CreateEmbed {
    CreateEmbed::new().color(PRIMARY_COLOR)
}

/// Create a success embed
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(SUCCESS_COLOR)
}

/// Create an error embed
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::new().color(ERROR_COLOR)
}

/// Create a warning embed
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(WARNING_COLOR)
}

// ============================================================================
// Text Helpers
// ============================================================================

/// Format a list of items with bullet points
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("{} {}", BULLET, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_list() {
        assert_eq!(bullet_list(&["a", "b"]), "• a\n• b");
        assert_eq!(bullet_list::<&str>(&[]), "");
    }
}
