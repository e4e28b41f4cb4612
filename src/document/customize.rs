//! Customization Merger
//!
//! Validates user branding/CTA overrides and merges them into a document.
//! Skipping customization passes `CustomizationOptions::default()` through
//! the same `merge` path, so customized and default documents are produced
//! by identical logic.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{Branding, CallToAction, StructuredDocument};
use crate::constants::branding as defaults;
use crate::types::{ValidationError, is_blank};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static HEX_COLOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex")
});

/// User-supplied branding and call-to-action overrides
///
/// Optional text fields treat blank strings as absent, since form clients
/// submit empty inputs rather than omitting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationOptions {
    pub cta_text: Option<String>,
    pub primary_action_label: Option<String>,
    pub booking_url: Option<String>,
    pub website_url: Option<String>,
    pub support_email: Option<String>,
    pub logo_data_uri: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
}

impl Default for CustomizationOptions {
    fn default() -> Self {
        Self {
            cta_text: None,
            primary_action_label: None,
            booking_url: None,
            website_url: None,
            support_email: None,
            logo_data_uri: None,
            primary_color: defaults::DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: defaults::DEFAULT_SECONDARY_COLOR.to_string(),
            font_family: defaults::DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn check_url(field: &str, value: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ValidationError::format(field, format!("'{}' is not a valid URL: {}", value, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ValidationError::format(
            field,
            format!("'{}' must be an absolute http(s) URL", value),
        ));
    }
    Ok(())
}

fn check_color(field: &str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::missing(field));
    }
    if !HEX_COLOR_PATTERN.is_match(value) {
        return Err(ValidationError::format(
            field,
            format!("'{}' must be a hex color like #1E3A8A", value),
        ));
    }
    Ok(())
}

impl CustomizationOptions {
    /// Every invalid field, in declaration order.
    pub fn validate_all(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(url) = present(&self.booking_url)
            && let Err(e) = check_url("bookingUrl", url)
        {
            errors.push(e);
        }
        if let Some(url) = present(&self.website_url)
            && let Err(e) = check_url("websiteUrl", url)
        {
            errors.push(e);
        }
        if let Some(email) = present(&self.support_email)
            && !EMAIL_PATTERN.is_match(email)
        {
            errors.push(ValidationError::format(
                "supportEmail",
                format!("'{}' is not a valid email address", email),
            ));
        }
        if let Some(logo) = present(&self.logo_data_uri)
            && !(logo.starts_with("data:image/") && logo.contains(','))
        {
            errors.push(ValidationError::format(
                "logoDataUri",
                "logo must be a data:image/... URI",
            ));
        }
        if let Err(e) = check_color("primaryColor", &self.primary_color) {
            errors.push(e);
        }
        if let Err(e) = check_color("secondaryColor", &self.secondary_color) {
            errors.push(e);
        }
        if is_blank(&self.font_family) {
            errors.push(ValidationError::missing("fontFamily"));
        }

        errors
    }

    /// First invalid field, if any.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.validate_all().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn branding(&self) -> Branding {
        Branding {
            primary_color: self.primary_color.trim().to_string(),
            secondary_color: self.secondary_color.trim().to_string(),
            font_family: self.font_family.trim().to_string(),
            logo_data_uri: present(&self.logo_data_uri).map(String::from),
            website_url: present(&self.website_url).map(String::from),
            support_email: present(&self.support_email).map(String::from),
        }
    }
}

/// Merge validated customization into a new document.
///
/// Content comes from the document; call-to-action wording, action link and
/// branding come from the options when set. The input document is not
/// modified, and merging the same options twice equals merging once.
pub fn merge(
    document: &StructuredDocument,
    options: &CustomizationOptions,
) -> Result<StructuredDocument, ValidationError> {
    options.validate()?;

    let cta = &document.call_to_action;
    let call_to_action = CallToAction {
        title: present(&options.cta_text)
            .map(String::from)
            .unwrap_or_else(|| cta.title.clone()),
        body: cta.body.clone(),
        action_label: present(&options.primary_action_label)
            .map(String::from)
            .or_else(|| cta.action_label.clone()),
        action_url: present(&options.booking_url)
            .or_else(|| present(&options.website_url))
            .map(String::from)
            .or_else(|| cta.action_url.clone()),
    };

    debug!(
        "Merged customization: action_url={:?}, font={}",
        call_to_action.action_url, options.font_family
    );

    Ok(StructuredDocument {
        title_page: document.title_page.clone(),
        introduction: document.introduction.clone(),
        sections: document.sections.clone(),
        call_to_action,
        branding: Some(options.branding()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{Introduction, Section, TitlePage};
    use proptest::prelude::*;

    fn document() -> StructuredDocument {
        StructuredDocument {
            title_page: TitlePage {
                title: "Retail Playbook".to_string(),
                subtitle: "Acme".to_string(),
            },
            introduction: Introduction::Text("Hello".to_string()),
            sections: vec![Section::FreeText {
                title: "Start".to_string(),
                body: "Do the thing.".to_string(),
            }],
            call_to_action: CallToAction {
                title: "Generated CTA".to_string(),
                body: "Generated body".to_string(),
                action_label: None,
                action_url: None,
            },
            branding: None,
        }
    }

    #[test]
    fn test_default_options_are_valid() {
        assert!(CustomizationOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_booking_url_names_field() {
        let options = CustomizationOptions {
            booking_url: Some("not a url".to_string()),
            ..Default::default()
        };
        let err = merge(&document(), &options).unwrap_err();
        assert_eq!(err.field, "bookingUrl");
    }

    #[test]
    fn test_non_http_url_rejected() {
        let options = CustomizationOptions {
            website_url: Some("ftp://files.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(options.validate().unwrap_err().field, "websiteUrl");
    }

    #[test]
    fn test_invalid_email_rejected() {
        let options = CustomizationOptions {
            support_email: Some("help@nowhere".to_string()),
            ..Default::default()
        };
        assert_eq!(options.validate().unwrap_err().field, "supportEmail");
    }

    #[test]
    fn test_validate_all_reports_every_field() {
        let options = CustomizationOptions {
            booking_url: Some("nope".to_string()),
            support_email: Some("nope".to_string()),
            primary_color: "blue".to_string(),
            font_family: " ".to_string(),
            ..Default::default()
        };
        let fields: Vec<String> = options.validate_all().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["bookingUrl", "supportEmail", "primaryColor", "fontFamily"]
        );
    }

    #[test]
    fn test_blank_optional_fields_are_absent() {
        let options = CustomizationOptions {
            booking_url: Some("".to_string()),
            support_email: Some("   ".to_string()),
            ..Default::default()
        };
        let merged = merge(&document(), &options).unwrap();
        assert_eq!(merged.call_to_action.action_url, None);
        assert_eq!(merged.branding.unwrap().support_email, None);
    }

    #[test]
    fn test_options_override_cta_and_branding() {
        let original = document();
        let options = CustomizationOptions {
            cta_text: Some("Ready to grow?".to_string()),
            primary_action_label: Some("Book a call".to_string()),
            booking_url: Some("https://cal.example.com/acme".to_string()),
            website_url: Some("https://acme.example.com".to_string()),
            primary_color: "#112233".to_string(),
            ..Default::default()
        };

        let merged = merge(&original, &options).unwrap();
        assert_eq!(merged.call_to_action.title, "Ready to grow?");
        assert_eq!(merged.call_to_action.body, "Generated body");
        assert_eq!(
            merged.call_to_action.action_url.as_deref(),
            Some("https://cal.example.com/acme")
        );
        let branding = merged.branding.as_ref().unwrap();
        assert_eq!(branding.primary_color, "#112233");
        assert_eq!(branding.website_url.as_deref(), Some("https://acme.example.com"));
        assert_eq!(merged.sections, original.sections);
        assert!(original.branding.is_none());
        assert_eq!(original.call_to_action.title, "Generated CTA");
    }

    #[test]
    fn test_default_path_keeps_document_cta() {
        let merged = merge(&document(), &CustomizationOptions::default()).unwrap();
        assert_eq!(merged.call_to_action.title, "Generated CTA");
        assert_eq!(
            merged.branding.unwrap().font_family,
            defaults::DEFAULT_FONT_FAMILY
        );
    }

    fn arb_options() -> impl Strategy<Value = CustomizationOptions> {
        (
            proptest::option::of("[A-Za-z ]{0,20}"),
            proptest::option::of("[A-Za-z ]{0,12}"),
            proptest::option::of("https://[a-z]{1,10}\\.com/[a-z]{0,8}"),
            proptest::option::of("https://[a-z]{1,10}\\.org"),
            proptest::option::of("[a-z]{1,8}@[a-z]{1,8}\\.com"),
            "#[0-9A-F]{6}",
            "#[0-9a-f]{3}",
            "[A-Za-z]{1,12}",
        )
            .prop_map(
                |(cta, label, booking, website, email, primary, secondary, font)| {
                    CustomizationOptions {
                        cta_text: cta,
                        primary_action_label: label,
                        booking_url: booking,
                        website_url: website,
                        support_email: email,
                        logo_data_uri: None,
                        primary_color: primary,
                        secondary_color: secondary,
                        font_family: font,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(options in arb_options()) {
            let once = merge(&document(), &options).unwrap();
            let twice = merge(&once, &options).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
