//! Kakao skill v2 wire types. Only the fields this bot reads and writes;
//! the real payload carries much more.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPayload {
    #[serde(default)]
    pub user_request: Option<UserRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub utterance: String,
}

impl SkillPayload {
    pub fn utterance(&self) -> &str {
        self.user_request
            .as_ref()
            .map(|r| r.utterance.trim())
            .unwrap_or("")
    }
}

#[derive(Debug, Serialize)]
pub struct SkillResponse {
    pub version: String,
    pub template: SkillTemplate,
}

#[derive(Debug, Serialize)]
pub struct SkillTemplate {
    pub outputs: Vec<SkillOutput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillOutput {
    SimpleText { text: String },
    TextCard { title: String, description: String },
}

impl SkillResponse {
    pub fn simple_text(text: impl Into<String>) -> Self {
        Self {
            version: "2.0".to_string(),
            template: SkillTemplate {
                outputs: vec![SkillOutput::SimpleText { text: text.into() }],
            },
        }
    }

    pub fn text_card(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            version: "2.0".to_string(),
            template: SkillTemplate {
                outputs: vec![SkillOutput::TextCard {
                    title: title.into(),
                    description: description.into(),
                }],
            },
        }
    }
}
