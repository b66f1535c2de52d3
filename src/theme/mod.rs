//! Color themes: builtins plus user JSON files.

use ratatui::style::Color;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::config_dir;

/// A complete theme definition.
///
/// Field names are self-documenting (e.g., `bg_dark` = dark background,
/// `text_muted` = muted text color).
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Theme {
    // Base colors
    pub bg_dark: Color,
    pub bg_surface: Color,
    pub bg_selected: Color,

    // Borders
    pub border_dim: Color,
    pub border_active: Color,
    pub gutter_sep: Color,

    // Text
    pub text_muted: Color,
    pub text_dim: Color,
    pub text_normal: Color,
    pub text_bright: Color,

    // Accent
    pub accent: Color,

    // Diff
    pub added: Color,
    pub removed: Color,
    pub diff_delete_bg: Color,
    pub diff_insert_bg: Color,
    pub inline_delete_bg: Color,
    pub inline_insert_bg: Color,

    // Status
    pub success: Color,
    pub error: Color,
    pub warning: Color,

    // Syntax highlighting
    pub syn_keyword: Color,
    pub syn_type: Color,
    pub syn_function: Color,
    pub syn_string: Color,
    pub syn_number: Color,
    pub syn_comment: Color,
    pub syn_operator: Color,
    pub syn_punctuation: Color,
    pub syn_constant: Color,
    pub syn_property: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin_default()
    }
}

/// JSON theme file format.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct ThemeJson {
    #[serde(default)]
    pub defs: HashMap<String, String>,
    pub theme: HashMap<String, String>,
}

impl Theme {
    /// Load a theme by name. Checks user themes first, then builtin.
    pub fn load(name: &str) -> Self {
        if let Some(theme) = load_user_theme(name) {
            return theme;
        }

        match name {
            "dracula" => Self::dracula(),
            "github" => Self::github(),
            "gruvbox" => Self::gruvbox(),
            "nord" => Self::nord(),
            "default" => Self::builtin_default(),
            other => {
                tracing::warn!(theme = other, "unknown theme, using default");
                Self::builtin_default()
            }
        }
    }

    /// Default dark theme.
    pub fn builtin_default() -> Self {
        Self {
            bg_dark: Color::Rgb(18, 18, 22),
            bg_surface: Color::Rgb(26, 26, 32),
            bg_selected: Color::Rgb(45, 45, 55),

            border_dim: Color::Rgb(50, 50, 60),
            border_active: Color::Rgb(80, 200, 200),
            gutter_sep: Color::Rgb(38, 38, 46),

            text_muted: Color::Rgb(80, 80, 92),
            text_dim: Color::Rgb(110, 110, 125),
            text_normal: Color::Rgb(175, 175, 185),
            text_bright: Color::Rgb(230, 230, 235),

            accent: Color::Rgb(80, 200, 200),

            added: Color::Rgb(110, 200, 130),
            removed: Color::Rgb(225, 110, 110),
            diff_delete_bg: Color::Rgb(45, 25, 30),
            diff_insert_bg: Color::Rgb(25, 45, 32),
            inline_delete_bg: Color::Rgb(90, 40, 50),
            inline_insert_bg: Color::Rgb(40, 90, 55),

            success: Color::Rgb(85, 185, 105),
            error: Color::Rgb(215, 85, 85),
            warning: Color::Rgb(215, 175, 80),

            syn_keyword: Color::Rgb(198, 120, 221),
            syn_type: Color::Rgb(229, 192, 123),
            syn_function: Color::Rgb(97, 175, 239),
            syn_string: Color::Rgb(152, 195, 121),
            syn_number: Color::Rgb(209, 154, 102),
            syn_comment: Color::Rgb(92, 99, 112),
            syn_operator: Color::Rgb(171, 178, 191),
            syn_punctuation: Color::Rgb(120, 120, 135),
            syn_constant: Color::Rgb(86, 182, 194),
            syn_property: Color::Rgb(224, 108, 117),
        }
    }

    /// Dracula theme.
    pub fn dracula() -> Self {
        Self {
            bg_dark: Color::Rgb(40, 42, 54),
            bg_surface: Color::Rgb(33, 34, 44),
            bg_selected: Color::Rgb(68, 71, 90),
            border_dim: Color::Rgb(68, 71, 90),
            border_active: Color::Rgb(189, 147, 249),
            gutter_sep: Color::Rgb(52, 55, 70),
            text_muted: Color::Rgb(98, 114, 164),
            text_dim: Color::Rgb(140, 150, 190),
            text_normal: Color::Rgb(248, 248, 242),
            text_bright: Color::Rgb(255, 255, 255),
            accent: Color::Rgb(189, 147, 249),
            added: Color::Rgb(80, 250, 123),
            removed: Color::Rgb(255, 85, 85),
            diff_delete_bg: Color::Rgb(70, 40, 50),
            diff_insert_bg: Color::Rgb(40, 70, 50),
            inline_delete_bg: Color::Rgb(110, 50, 60),
            inline_insert_bg: Color::Rgb(50, 110, 65),
            success: Color::Rgb(80, 250, 123),
            error: Color::Rgb(255, 85, 85),
            warning: Color::Rgb(241, 250, 140),
            syn_keyword: Color::Rgb(255, 121, 198),
            syn_type: Color::Rgb(139, 233, 253),
            syn_function: Color::Rgb(80, 250, 123),
            syn_string: Color::Rgb(241, 250, 140),
            syn_number: Color::Rgb(189, 147, 249),
            syn_comment: Color::Rgb(98, 114, 164),
            syn_operator: Color::Rgb(255, 121, 198),
            syn_punctuation: Color::Rgb(248, 248, 242),
            syn_constant: Color::Rgb(189, 147, 249),
            syn_property: Color::Rgb(139, 233, 253),
        }
    }

    /// GitHub light theme.
    pub fn github() -> Self {
        Self {
            bg_dark: Color::Rgb(255, 255, 255),
            bg_surface: Color::Rgb(246, 248, 250),
            bg_selected: Color::Rgb(221, 234, 247),
            border_dim: Color::Rgb(208, 215, 222),
            border_active: Color::Rgb(9, 105, 218),
            gutter_sep: Color::Rgb(230, 234, 238),
            text_muted: Color::Rgb(140, 149, 159),
            text_dim: Color::Rgb(87, 96, 106),
            text_normal: Color::Rgb(36, 41, 47),
            text_bright: Color::Rgb(0, 0, 0),
            accent: Color::Rgb(9, 105, 218),
            added: Color::Rgb(26, 127, 55),
            removed: Color::Rgb(207, 34, 46),
            diff_delete_bg: Color::Rgb(255, 235, 233),
            diff_insert_bg: Color::Rgb(230, 255, 236),
            inline_delete_bg: Color::Rgb(255, 192, 192),
            inline_insert_bg: Color::Rgb(171, 242, 188),
            success: Color::Rgb(26, 127, 55),
            error: Color::Rgb(207, 34, 46),
            warning: Color::Rgb(154, 103, 0),
            syn_keyword: Color::Rgb(207, 34, 46),
            syn_type: Color::Rgb(149, 56, 0),
            syn_function: Color::Rgb(130, 80, 223),
            syn_string: Color::Rgb(10, 48, 105),
            syn_number: Color::Rgb(5, 80, 174),
            syn_comment: Color::Rgb(110, 119, 129),
            syn_operator: Color::Rgb(36, 41, 47),
            syn_punctuation: Color::Rgb(87, 96, 106),
            syn_constant: Color::Rgb(5, 80, 174),
            syn_property: Color::Rgb(5, 80, 174),
        }
    }

    /// Gruvbox dark theme.
    pub fn gruvbox() -> Self {
        Self {
            bg_dark: Color::Rgb(40, 40, 40),
            bg_surface: Color::Rgb(50, 48, 47),
            bg_selected: Color::Rgb(80, 73, 69),
            border_dim: Color::Rgb(80, 73, 69),
            border_active: Color::Rgb(250, 189, 47),
            gutter_sep: Color::Rgb(60, 56, 54),
            text_muted: Color::Rgb(124, 111, 100),
            text_dim: Color::Rgb(168, 153, 132),
            text_normal: Color::Rgb(235, 219, 178),
            text_bright: Color::Rgb(251, 241, 199),
            accent: Color::Rgb(250, 189, 47),
            added: Color::Rgb(184, 187, 38),
            removed: Color::Rgb(251, 73, 52),
            diff_delete_bg: Color::Rgb(70, 38, 34),
            diff_insert_bg: Color::Rgb(52, 60, 34),
            inline_delete_bg: Color::Rgb(110, 48, 40),
            inline_insert_bg: Color::Rgb(80, 92, 40),
            success: Color::Rgb(184, 187, 38),
            error: Color::Rgb(251, 73, 52),
            warning: Color::Rgb(250, 189, 47),
            syn_keyword: Color::Rgb(251, 73, 52),
            syn_type: Color::Rgb(250, 189, 47),
            syn_function: Color::Rgb(184, 187, 38),
            syn_string: Color::Rgb(184, 187, 38),
            syn_number: Color::Rgb(211, 134, 155),
            syn_comment: Color::Rgb(146, 131, 116),
            syn_operator: Color::Rgb(254, 128, 25),
            syn_punctuation: Color::Rgb(168, 153, 132),
            syn_constant: Color::Rgb(211, 134, 155),
            syn_property: Color::Rgb(131, 165, 152),
        }
    }

    /// Nord theme.
    pub fn nord() -> Self {
        Self {
            bg_dark: Color::Rgb(46, 52, 64),
            bg_surface: Color::Rgb(59, 66, 82),
            bg_selected: Color::Rgb(67, 76, 94),
            border_dim: Color::Rgb(67, 76, 94),
            border_active: Color::Rgb(136, 192, 208),
            gutter_sep: Color::Rgb(59, 66, 82),
            text_muted: Color::Rgb(97, 110, 136),
            text_dim: Color::Rgb(129, 161, 193),
            text_normal: Color::Rgb(216, 222, 233),
            text_bright: Color::Rgb(236, 239, 244),
            accent: Color::Rgb(136, 192, 208),
            added: Color::Rgb(163, 190, 140),
            removed: Color::Rgb(191, 97, 106),
            diff_delete_bg: Color::Rgb(70, 52, 62),
            diff_insert_bg: Color::Rgb(56, 70, 62),
            inline_delete_bg: Color::Rgb(100, 62, 72),
            inline_insert_bg: Color::Rgb(74, 96, 78),
            success: Color::Rgb(163, 190, 140),
            error: Color::Rgb(191, 97, 106),
            warning: Color::Rgb(235, 203, 139),
            syn_keyword: Color::Rgb(129, 161, 193),
            syn_type: Color::Rgb(143, 188, 187),
            syn_function: Color::Rgb(136, 192, 208),
            syn_string: Color::Rgb(163, 190, 140),
            syn_number: Color::Rgb(180, 142, 173),
            syn_comment: Color::Rgb(97, 110, 136),
            syn_operator: Color::Rgb(129, 161, 193),
            syn_punctuation: Color::Rgb(236, 239, 244),
            syn_constant: Color::Rgb(180, 142, 173),
            syn_property: Color::Rgb(136, 192, 208),
        }
    }
}

/// User themes directory (`<config dir>/ghist/themes/`).
fn user_themes_dir() -> PathBuf {
    config_dir().join("themes")
}

/// Load a theme from the user themes directory.
fn load_user_theme(name: &str) -> Option<Theme> {
    let path = user_themes_dir().join(format!("{}.json", name));
    if !path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable theme file");
            return None;
        }
    };
    match serde_json::from_str::<ThemeJson>(&content) {
        Ok(json) => Some(resolve_theme(&json)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid theme file");
            None
        }
    }
}

/// Parse a hex color string to Color.
fn parse_hex(s: &str) -> Option<Color> {
    let s = s.trim_start_matches('#');
    if s.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

/// Resolve a color value (hex or reference).
fn resolve_color(value: &str, defs: &HashMap<String, String>, fallback: Color) -> Color {
    if value.starts_with('#') {
        parse_hex(value).unwrap_or(fallback)
    } else if let Some(def) = defs.get(value) {
        parse_hex(def).unwrap_or(fallback)
    } else {
        fallback
    }
}

/// Resolve a theme JSON on top of the default theme. Keys are camelCase.
fn resolve_theme(json: &ThemeJson) -> Theme {
    let mut theme = Theme::builtin_default();

    macro_rules! apply {
        ($($field:ident => $key:literal),* $(,)?) => {
            $(
                if let Some(v) = json.theme.get($key) {
                    theme.$field = resolve_color(v, &json.defs, theme.$field);
                }
            )*
        };
    }

    apply! {
        bg_dark => "bgDark",
        bg_surface => "bgSurface",
        bg_selected => "bgSelected",
        border_dim => "borderDim",
        border_active => "borderActive",
        gutter_sep => "gutterSep",
        text_muted => "textMuted",
        text_dim => "textDim",
        text_normal => "textNormal",
        text_bright => "textBright",
        accent => "accent",
        added => "added",
        removed => "removed",
        diff_delete_bg => "diffDeleteBg",
        diff_insert_bg => "diffInsertBg",
        inline_delete_bg => "inlineDeleteBg",
        inline_insert_bg => "inlineInsertBg",
        success => "success",
        error => "error",
        warning => "warning",
        syn_keyword => "synKeyword",
        syn_type => "synType",
        syn_function => "synFunction",
        syn_string => "synString",
        syn_number => "synNumber",
        syn_comment => "synComment",
        syn_operator => "synOperator",
        syn_punctuation => "synPunctuation",
        syn_constant => "synConstant",
        syn_property => "synProperty",
    }

    theme
}
