//! Prompt Construction
//!
//! Each generation stage gets a prompt built from the same sections (role,
//! campaign context, objectives, constraints) plus a JSON schema describing
//! the reply.
//!
//! Schemas follow two rules:
//! - every object sets `additionalProperties: false`
//! - required fields are listed explicitly, with camelCase names matching
//!   the serde wire format of the target types

use serde_json::{Value, json};

use crate::pipeline::{CampaignInput, Concept, Outline};

// =============================================================================
// Prompt Builder
// =============================================================================

#[derive(Debug, Clone)]
enum PromptSection {
    Role { expertise: String, task: String },
    Context(Vec<(String, String)>),
    Objectives(Vec<String>),
    Text { header: String, content: String },
    Constraints(Vec<String>),
}

/// Builds prompts with a stable section layout
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add a context entry; entries keep insertion order
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let entry = (key.to_string(), value.trim().to_string());
        match self.sections.iter_mut().find_map(|s| match s {
            PromptSection::Context(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items.push(entry),
            None => self.sections.push(PromptSection::Context(vec![entry])),
        }
        self
    }

    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|o| o.to_string()).collect(),
        ));
        self
    }

    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: header.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn constraints(mut self, constraints: &[&str]) -> Self {
        self.sections.push(PromptSection::Constraints(
            constraints.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!("You are an expert {} {}.\n", expertise, task));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Campaign\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Text { header, content } => {
                    prompt.push_str(&format!("# {}\n\n{}\n\n", header, content));
                }
                PromptSection::Constraints(constraints) => {
                    prompt.push_str("<CONSTRAINTS>\n");
                    for constraint in constraints {
                        prompt.push_str(&format!("- {}\n", constraint));
                    }
                    prompt.push_str("</CONSTRAINTS>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Stage Prompts
// =============================================================================

pub struct StagePrompts;

impl StagePrompts {
    fn campaign(input: &CampaignInput) -> PromptBuilder {
        PromptBuilder::new()
            .context_item("Brand", &input.brand_name)
            .context_item(
                "Author",
                &format!("{}, {}", input.operator_name, input.operator_title),
            )
            .context_item("Niche", &input.niche_label)
            .context_item("Audience", &input.audience_description)
            .context_item("Problem", &input.problem_statement)
            .context_item("Desired outcome", &input.desired_outcome)
            .context_item("Tone", &input.tone.to_string())
    }

    pub fn concepts(input: &CampaignInput, count: usize) -> String {
        Self::campaign(input)
            .role("lead magnet strategist", "proposing downloadable resources")
            .objectives(&[
                &format!("Propose exactly {} distinct lead magnet concepts", count),
                "Each concept solves one concrete slice of the stated problem",
                "Write titles the audience would want to download",
            ])
            .constraints(&[
                "Give every concept a short unique id in kebab-case",
                "Keep descriptions to two sentences",
                "Do not repeat the same format twice",
            ])
            .build()
    }

    pub fn outline(input: &CampaignInput, concept: &Concept) -> String {
        Self::campaign(input)
            .role("lead magnet strategist", "outlining a selected concept")
            .section(
                "Selected concept",
                &format!("{}\n\n{}", concept.title, concept.description),
            )
            .objectives(&[
                "Write a compelling title and a short introduction",
                "List the core points the document will cover, in reading order",
            ])
            .constraints(&["Between 3 and 7 core points", "One sentence per core point"])
            .build()
    }

    pub fn document(input: &CampaignInput, outline: &Outline) -> String {
        let points = outline
            .core_points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p))
            .collect::<Vec<_>>()
            .join("\n");

        Self::campaign(input)
            .role("copywriter", "writing a complete lead magnet document")
            .section(
                "Approved outline",
                &format!(
                    "Title: {}\n\nIntroduction: {}\n\nCore points:\n{}",
                    outline.title, outline.introduction, points
                ),
            )
            .objectives(&[
                "Write one section per core point, in order",
                "Choose the section kind that fits each point: comparison for options, \
                 phasedChecklist for step-by-step plans, scripts for conversations, \
                 freeText otherwise",
                "Close with a call to action that invites the reader to contact the author",
            ])
            .constraints(&[
                "Use the approved title exactly",
                "Every section must contain substantive content",
                "Write in the requested tone",
            ])
            .build()
    }
}

// =============================================================================
// Stage Schemas
// =============================================================================

pub struct StageSchemas;

impl StageSchemas {
    pub fn concepts_schema(count: usize) -> Value {
        json!({
            "type": "object",
            "required": ["concepts"],
            "additionalProperties": false,
            "properties": {
                "concepts": {
                    "type": "array",
                    "minItems": count,
                    "maxItems": count,
                    "items": {
                        "type": "object",
                        "required": ["id", "title", "description"],
                        "additionalProperties": false,
                        "properties": {
                            "id": {"type": "string", "description": "Unique kebab-case id"},
                            "title": {"type": "string"},
                            "description": {"type": "string"}
                        }
                    }
                }
            }
        })
    }

    pub fn outline_schema() -> Value {
        json!({
            "type": "object",
            "required": ["title", "introduction", "corePoints"],
            "additionalProperties": false,
            "properties": {
                "title": {"type": "string"},
                "introduction": {"type": "string"},
                "corePoints": {"type": "array", "minItems": 1, "items": {"type": "string"}}
            }
        })
    }

    pub fn document_schema() -> Value {
        let strings = json!({"type": "array", "items": {"type": "string"}});
        json!({
            "type": "object",
            "required": ["titlePage", "introduction", "sections", "callToAction"],
            "additionalProperties": false,
            "properties": {
                "titlePage": {
                    "type": "object",
                    "required": ["title", "subtitle"],
                    "additionalProperties": false,
                    "properties": {
                        "title": {"type": "string"},
                        "subtitle": {"type": "string"}
                    }
                },
                "introduction": {
                    "description": "Prose, or a list of short points",
                    "oneOf": [{"type": "string"}, strings]
                },
                "sections": {
                    "type": "array",
                    "items": {"oneOf": [
                        {
                            "type": "object",
                            "required": ["kind", "title", "items"],
                            "additionalProperties": false,
                            "properties": {
                                "kind": {"const": "comparison"},
                                "title": {"type": "string"},
                                "items": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "required": ["label", "pros", "cons"],
                                        "additionalProperties": false,
                                        "properties": {
                                            "label": {"type": "string"},
                                            "pros": {"type": "string"},
                                            "cons": {"type": "string"},
                                            "note": {"type": "string"}
                                        }
                                    }
                                }
                            }
                        },
                        {
                            "type": "object",
                            "required": ["kind", "title", "phases"],
                            "additionalProperties": false,
                            "properties": {
                                "kind": {"const": "phasedChecklist"},
                                "title": {"type": "string"},
                                "phases": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "required": ["phaseTitle", "items"],
                                        "additionalProperties": false,
                                        "properties": {
                                            "phaseTitle": {"type": "string"},
                                            "items": strings
                                        }
                                    }
                                }
                            }
                        },
                        {
                            "type": "object",
                            "required": ["kind", "title", "scenarios"],
                            "additionalProperties": false,
                            "properties": {
                                "kind": {"const": "scripts"},
                                "title": {"type": "string"},
                                "scenarios": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "required": ["trigger", "response", "rationale"],
                                        "additionalProperties": false,
                                        "properties": {
                                            "trigger": {"type": "string"},
                                            "response": {"type": "string"},
                                            "rationale": {"type": "string"}
                                        }
                                    }
                                }
                            }
                        },
                        {
                            "type": "object",
                            "required": ["kind", "title", "body"],
                            "additionalProperties": false,
                            "properties": {
                                "kind": {"const": "freeText"},
                                "title": {"type": "string"},
                                "body": {"type": "string", "description": "Paragraphs separated by blank lines"}
                            }
                        }
                    ]}
                },
                "callToAction": {
                    "type": "object",
                    "required": ["title", "body"],
                    "additionalProperties": false,
                    "properties": {
                        "title": {"type": "string"},
                        "body": {"type": "string"},
                        "actionLabel": {"type": "string"}
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Tone;

    fn input() -> CampaignInput {
        CampaignInput {
            operator_name: "Dana Reyes".to_string(),
            brand_name: "Acme".to_string(),
            audience_description: "independent gyms".to_string(),
            niche_label: "fitness".to_string(),
            problem_statement: "members churn".to_string(),
            desired_outcome: "retention".to_string(),
            tone: Tone::Inspirational,
            operator_title: "Coach".to_string(),
        }
    }

    #[test]
    fn test_builder_sections() {
        let prompt = PromptBuilder::new()
            .role("strategist", "planning campaigns")
            .context_item("Brand", "Acme")
            .context_item("Niche", "fitness")
            .objectives(&["First", "Second"])
            .constraints(&["Be brief"])
            .build();

        assert!(prompt.starts_with("<ROLE>"));
        assert!(prompt.contains("1. First\n2. Second"));
        assert!(prompt.contains("- Be brief"));
        let brand = prompt.find("**Brand**").unwrap();
        let niche = prompt.find("**Niche**").unwrap();
        assert!(brand < niche);
    }

    #[test]
    fn test_concepts_prompt_carries_campaign() {
        let prompt = StagePrompts::concepts(&input(), 3);
        assert!(prompt.contains("exactly 3"));
        assert!(prompt.contains("**Tone**: inspirational"));
        assert!(prompt.contains("Dana Reyes, Coach"));
    }

    #[test]
    fn test_document_prompt_lists_points() {
        let outline = Outline {
            title: "Keep Members".to_string(),
            introduction: "Intro".to_string(),
            core_points: vec!["Onboard well".to_string(), "Check in".to_string()],
        };
        let prompt = StagePrompts::document(&input(), &outline);
        assert!(prompt.contains("1. Onboard well\n2. Check in"));
        assert!(prompt.contains("Title: Keep Members"));
    }

    #[test]
    fn test_schemas_use_wire_names() {
        assert_eq!(StageSchemas::concepts_schema(4)["properties"]["concepts"]["minItems"], 4);
        assert_eq!(StageSchemas::outline_schema()["required"][2], "corePoints");

        let document = StageSchemas::document_schema();
        let kinds: Vec<&str> = document["properties"]["sections"]["items"]["oneOf"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["properties"]["kind"]["const"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["comparison", "phasedChecklist", "scripts", "freeText"]);
    }
}
