//! Pipeline inputs and intermediate artifacts.

use serde::{Deserialize, Serialize};

use crate::types::{ValidationError, is_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Conversational,
    Inspirational,
    Direct,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Professional => write!(f, "professional"),
            Tone::Conversational => write!(f, "conversational"),
            Tone::Inspirational => write!(f, "inspirational"),
            Tone::Direct => write!(f, "direct"),
        }
    }
}

/// What the user tells us about their business and audience
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    pub operator_name: String,
    pub brand_name: String,
    pub audience_description: String,
    pub niche_label: String,
    pub problem_statement: String,
    pub desired_outcome: String,
    #[serde(default)]
    pub tone: Tone,
    pub operator_title: String,
}

impl CampaignInput {
    /// Reject the first blank required field, by wire name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("operatorName", &self.operator_name),
            ("brandName", &self.brand_name),
            ("audienceDescription", &self.audience_description),
            ("nicheLabel", &self.niche_label),
            ("problemStatement", &self.problem_statement),
            ("desiredOutcome", &self.desired_outcome),
            ("operatorTitle", &self.operator_title),
        ];

        match required.iter().find(|(_, value)| is_blank(value)) {
            Some((field, _)) => Err(ValidationError::missing(field)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    pub title: String,
    pub introduction: String,
    pub core_points: Vec<String>,
}

impl Outline {
    /// Title, introduction and at least one core point are non-blank.
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.title)
            && !is_blank(&self.introduction)
            && self.core_points.iter().any(|p| !is_blank(p))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.title) {
            return Err(ValidationError::missing("title"));
        }
        if is_blank(&self.introduction) {
            return Err(ValidationError::missing("introduction"));
        }
        if !self.core_points.iter().any(|p| !is_blank(p)) {
            return Err(ValidationError::missing("corePoints"));
        }
        Ok(())
    }

    /// Frozen copy with surrounding whitespace and blank points removed
    pub fn frozen(&self) -> Outline {
        Outline {
            title: self.title.trim().to_string(),
            introduction: self.introduction.trim().to_string(),
            core_points: crate::types::non_blank_lines(&self.core_points),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn input() -> CampaignInput {
        CampaignInput {
            operator_name: "Dana Reyes".to_string(),
            brand_name: "Acme".to_string(),
            audience_description: "small retailers".to_string(),
            niche_label: "retail marketing".to_string(),
            problem_statement: "foot traffic is falling".to_string(),
            desired_outcome: "more repeat customers".to_string(),
            tone: Tone::default(),
            operator_title: "Founder".to_string(),
        }
    }

    #[test]
    fn test_input_validation() {
        assert!(input().validate().is_ok());

        let blank = CampaignInput {
            niche_label: "  ".to_string(),
            ..input()
        };
        assert_eq!(blank.validate().unwrap_err().field, "nicheLabel");
    }

    #[test]
    fn test_tone_defaults_when_missing() {
        let json = r#"{
            "operatorName": "Dana", "brandName": "Acme", "audienceDescription": "shops",
            "nicheLabel": "retail", "problemStatement": "p", "desiredOutcome": "o",
            "operatorTitle": "Founder"
        }"#;
        let parsed: CampaignInput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tone, Tone::Professional);
    }

    #[test]
    fn test_outline_completeness() {
        let outline = Outline {
            title: "Title".to_string(),
            introduction: "Intro".to_string(),
            core_points: vec!["".to_string(), "Point".to_string()],
        };
        assert!(outline.is_complete());
        assert_eq!(outline.frozen().core_points, vec!["Point".to_string()]);

        let empty = Outline {
            core_points: vec![" ".to_string()],
            ..outline
        };
        assert!(!empty.is_complete());
        assert_eq!(empty.validate().unwrap_err().field, "corePoints");
    }
}
