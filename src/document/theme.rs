//! Render Theme
//!
//! A theme is four inputs: two colors, a font, and an icon set. Styling a
//! block depends on nothing else, which keeps rendering deterministic.

use serde::{Deserialize, Serialize};

use super::customize::CustomizationOptions;
use super::model::{Branding, SectionKind};

/// Body text color, shared by every theme
pub const TEXT_COLOR: &str = "#111827";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IconSet {
    #[default]
    Emoji,
    Ascii,
    None,
}

impl std::str::FromStr for IconSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "emoji" => Ok(IconSet::Emoji),
            "ascii" => Ok(IconSet::Ascii),
            "none" => Ok(IconSet::None),
            _ => Err(format!(
                "Unknown icon set: {}. Valid values: emoji, ascii, none",
                s
            )),
        }
    }
}

/// Where an icon is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRole {
    Section(SectionKind),
    Pros,
    Cons,
    Note,
    CheckItem,
    CallToAction,
}

impl IconSet {
    pub fn icon(&self, role: IconRole) -> Option<&'static str> {
        let icon = match (self, role) {
            (Self::None, _) => return None,
            (Self::Emoji, IconRole::Section(SectionKind::Comparison)) => "⚖️",
            (Self::Emoji, IconRole::Section(SectionKind::PhasedChecklist)) => "🗂️",
            (Self::Emoji, IconRole::Section(SectionKind::Scripts)) => "💬",
            (Self::Emoji, IconRole::Section(SectionKind::FreeText)) => "📄",
            (Self::Emoji, IconRole::Pros) => "✅",
            (Self::Emoji, IconRole::Cons) => "⚠️",
            (Self::Emoji, IconRole::Note) => "💡",
            (Self::Emoji, IconRole::CheckItem) => "☐",
            (Self::Emoji, IconRole::CallToAction) => "👉",
            (Self::Ascii, IconRole::Section(SectionKind::Comparison)) => "[vs]",
            (Self::Ascii, IconRole::Section(SectionKind::PhasedChecklist)) => "[plan]",
            (Self::Ascii, IconRole::Section(SectionKind::Scripts)) => "[script]",
            (Self::Ascii, IconRole::Section(SectionKind::FreeText)) => "[text]",
            (Self::Ascii, IconRole::Pros) => "+",
            (Self::Ascii, IconRole::Cons) => "-",
            (Self::Ascii, IconRole::Note) => "*",
            (Self::Ascii, IconRole::CheckItem) => "[ ]",
            (Self::Ascii, IconRole::CallToAction) => "->",
        };
        Some(icon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTheme {
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    pub icons: IconSet,
}

impl Default for RenderTheme {
    fn default() -> Self {
        Self::from_options(&CustomizationOptions::default(), IconSet::default())
    }
}

impl RenderTheme {
    pub fn from_branding(branding: &Branding, icons: IconSet) -> Self {
        Self {
            primary_color: branding.primary_color.clone(),
            secondary_color: branding.secondary_color.clone(),
            font_family: branding.font_family.clone(),
            icons,
        }
    }

    pub fn from_options(options: &CustomizationOptions, icons: IconSet) -> Self {
        Self {
            primary_color: options.primary_color.trim().to_string(),
            secondary_color: options.secondary_color.trim().to_string(),
            font_family: options.font_family.trim().to_string(),
            icons,
        }
    }

    /// Theme for a merged document, falling back to `fallback` when unbranded
    pub fn for_document(
        branding: Option<&Branding>,
        fallback: &RenderTheme,
        icons: IconSet,
    ) -> Self {
        match branding {
            Some(branding) => Self::from_branding(branding, icons),
            None => Self {
                icons,
                ..fallback.clone()
            },
        }
    }
}

/// Resolved visual style of a single block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyle {
    pub font_family: String,
    pub font_size: u8,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Icon for the second row of two-sided blocks (the cons of a comparison)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_icon: Option<String>,
}

/// Typographic weight of a block, chosen by layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRole {
    Title,
    Heading,
    Body,
    Highlight,
    CallToAction,
}

impl RenderTheme {
    pub fn style(&self, role: StyleRole, icon: Option<IconRole>) -> BlockStyle {
        let (font_size, color, accent_color) = match role {
            StyleRole::Title => (28, self.primary_color.clone(), Some(self.secondary_color.clone())),
            StyleRole::Heading => (18, self.primary_color.clone(), None),
            StyleRole::Body => (11, TEXT_COLOR.to_string(), None),
            StyleRole::Highlight => (11, TEXT_COLOR.to_string(), Some(self.secondary_color.clone())),
            StyleRole::CallToAction => (
                16,
                self.primary_color.clone(),
                Some(self.secondary_color.clone()),
            ),
        };

        BlockStyle {
            font_family: self.font_family.clone(),
            font_size,
            color,
            accent_color,
            icon: icon.and_then(|role| self.icons.icon(role)).map(String::from),
            secondary_icon: None,
        }
    }

    /// Style with a second icon for blocks that show two sides
    pub fn paired_style(&self, role: StyleRole, icon: IconRole, secondary: IconRole) -> BlockStyle {
        BlockStyle {
            secondary_icon: self.icons.icon(secondary).map(String::from),
            ..self.style(role, Some(icon))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_sets() {
        let role = IconRole::Section(SectionKind::Scripts);
        assert_eq!(IconSet::Emoji.icon(role), Some("💬"));
        assert_eq!(IconSet::Ascii.icon(role), Some("[script]"));
        assert_eq!(IconSet::None.icon(role), None);
    }

    #[test]
    fn test_icon_set_from_str() {
        assert_eq!("ASCII".parse::<IconSet>().unwrap(), IconSet::Ascii);
        assert!("neon".parse::<IconSet>().is_err());
    }

    #[test]
    fn test_style_uses_theme_inputs() {
        let theme = RenderTheme {
            primary_color: "#000000".to_string(),
            secondary_color: "#FFFFFF".to_string(),
            font_family: "Georgia".to_string(),
            icons: IconSet::Ascii,
        };
        let style = theme.style(StyleRole::Heading, Some(IconRole::Section(SectionKind::FreeText)));
        assert_eq!(style.color, "#000000");
        assert_eq!(style.font_family, "Georgia");
        assert_eq!(style.icon.as_deref(), Some("[text]"));

        let body = theme.style(StyleRole::Body, None);
        assert_eq!(body.color, TEXT_COLOR);
        assert!(body.icon.is_none());
        assert!(body.secondary_icon.is_none());
    }

    #[test]
    fn test_paired_style_carries_both_icons() {
        let theme = RenderTheme {
            icons: IconSet::Emoji,
            ..RenderTheme::default()
        };
        let style = theme.paired_style(StyleRole::Highlight, IconRole::Pros, IconRole::Cons);
        assert_eq!(style.icon.as_deref(), Some("✅"));
        assert_eq!(style.secondary_icon.as_deref(), Some("⚠️"));

        let plain = RenderTheme {
            icons: IconSet::None,
            ..RenderTheme::default()
        };
        let style = plain.paired_style(StyleRole::Highlight, IconRole::Pros, IconRole::Cons);
        assert!(style.icon.is_none() && style.secondary_icon.is_none());
    }

    #[test]
    fn test_for_document_prefers_branding() {
        let branding = Branding {
            primary_color: "#123456".to_string(),
            secondary_color: "#654321".to_string(),
            font_family: "Inter".to_string(),
            logo_data_uri: None,
            website_url: None,
            support_email: None,
        };
        let theme = RenderTheme::for_document(Some(&branding), &RenderTheme::default(), IconSet::None);
        assert_eq!(theme.primary_color, "#123456");
        assert_eq!(theme.icons, IconSet::None);

        let fallback = RenderTheme::for_document(None, &RenderTheme::default(), IconSet::Ascii);
        assert_eq!(fallback.font_family, "Helvetica");
        assert_eq!(fallback.icons, IconSet::Ascii);
    }
}
