use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl Tag {
    /// Slugs are stored lowercase with whitespace collapsed to dashes.
    pub fn slugify(name: &str) -> String {
        name.split_whitespace()
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn is_valid_color(color: &str) -> bool {
        color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(Tag::slugify("Breakfast"), "breakfast");
        assert_eq!(Tag::slugify("  Late  Night Snack "), "late-night-snack");
    }

    #[test]
    fn color_must_be_hex_triplet() {
        assert!(Tag::is_valid_color("#E26C2D"));
        assert!(Tag::is_valid_color("#49b64e"));
        assert!(!Tag::is_valid_color("E26C2D"));
        assert!(!Tag::is_valid_color("#E26C2"));
        assert!(!Tag::is_valid_color("#GGGGGG"));
    }
}
