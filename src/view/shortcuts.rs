use std::fmt;

/// Keyboard shortcuts available while the graph has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ResetZoom,
    ZoomIn,
    ZoomOut,
    ToggleLegend,
    ToggleInstructions,
    ToggleDetails,
    ToggleQuery,
}

impl Shortcut {
    pub const ALL: [Shortcut; 7] = [
        Shortcut::ResetZoom,
        Shortcut::ZoomIn,
        Shortcut::ZoomOut,
        Shortcut::ToggleLegend,
        Shortcut::ToggleInstructions,
        Shortcut::ToggleDetails,
        Shortcut::ToggleQuery,
    ];

    /// Map a key press to a shortcut. Keys are case-insensitive; presses
    /// inside a text input are never shortcuts.
    pub fn from_key(key: &str, in_text_input: bool) -> Option<Self> {
        if in_text_input {
            return None;
        }
        match key.to_lowercase().as_str() {
            "r" => Some(Shortcut::ResetZoom),
            "+" | "=" => Some(Shortcut::ZoomIn),
            "-" | "_" => Some(Shortcut::ZoomOut),
            "h" => Some(Shortcut::ToggleLegend),
            "?" | "/" => Some(Shortcut::ToggleInstructions),
            "p" => Some(Shortcut::ToggleDetails),
            "q" => Some(Shortcut::ToggleQuery),
            _ => None,
        }
    }

    pub fn keys(&self) -> &'static str {
        match self {
            Shortcut::ResetZoom => "R",
            Shortcut::ZoomIn => "+ / =",
            Shortcut::ZoomOut => "- / _",
            Shortcut::ToggleLegend => "H",
            Shortcut::ToggleInstructions => "? / /",
            Shortcut::ToggleDetails => "P",
            Shortcut::ToggleQuery => "Q",
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Shortcut::ResetZoom => "reset zoom",
            Shortcut::ZoomIn => "zoom in",
            Shortcut::ZoomOut => "zoom out",
            Shortcut::ToggleLegend => "toggle legend",
            Shortcut::ToggleInstructions => "toggle instructions",
            Shortcut::ToggleDetails => "toggle details panel",
            Shortcut::ToggleQuery => "toggle query panel",
        };
        write!(f, "{action}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Shortcut::from_key("r", false), Some(Shortcut::ResetZoom));
        assert_eq!(Shortcut::from_key("R", false), Some(Shortcut::ResetZoom));
        assert_eq!(Shortcut::from_key("=", false), Some(Shortcut::ZoomIn));
        assert_eq!(Shortcut::from_key("_", false), Some(Shortcut::ZoomOut));
        assert_eq!(Shortcut::from_key("/", false), Some(Shortcut::ToggleInstructions));
        assert_eq!(Shortcut::from_key("Q", false), Some(Shortcut::ToggleQuery));
        assert_eq!(Shortcut::from_key("x", false), None);
        assert_eq!(Shortcut::from_key("Enter", false), None);
    }

    #[test]
    fn test_suppressed_in_text_input() {
        for key in ["r", "+", "-", "h", "?", "p", "q"] {
            assert_eq!(Shortcut::from_key(key, true), None);
        }
    }
}
