//! Disclosed profile model.
//!
//! # Responsibility
//! - Define the structured shape the disclosure gate produces from the
//!   protected profile payload.
//!
//! # Invariants
//! - A `DisclosedProfile` is derived per activation and never persisted.
//! - Field text supports plain strings and ruby-annotated spans.

use serde::{Deserialize, Serialize};

/// One ruby-annotated span: base text plus its reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubySpan {
    /// Base text rendered in the main line.
    pub value: String,
    /// Reading rendered above the base text.
    pub ruby: String,
}

/// Field text in one of three source encodings.
///
/// Untagged on purpose: the profile JSON stores `null`, a bare string, or an
/// array of ruby spans, with no discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileText {
    /// No displayable value (`null` in the source data).
    None,
    /// Plain text.
    Plain(String),
    /// Ruby-annotated text, one span per annotated run.
    Ruby(Vec<RubySpan>),
}

/// One key/value entry inside a profile section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileField {
    /// Display label, e.g. a field name.
    pub key: String,
    /// Field text.
    pub value: ProfileText,
    /// Optional trailing status column.
    pub status: Option<String>,
}

/// One titled section of profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSection {
    /// Section heading.
    pub category_name: String,
    /// Ordered fields under this heading.
    pub values: Vec<ProfileField>,
}

/// Structured profile produced by a successful disclosure.
///
/// Exists only for the duration of one activation; the bootstrap never
/// writes it back to any resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisclosedProfile {
    sections: Vec<ProfileSection>,
}

impl DisclosedProfile {
    /// Wraps parsed sections into a disclosed profile.
    pub fn new(sections: Vec<ProfileSection>) -> Self {
        Self { sections }
    }

    /// Ordered profile sections.
    pub fn sections(&self) -> &[ProfileSection] {
        &self.sections
    }

    /// Returns whether the profile carries no sections at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DisclosedProfile, ProfileText};

    const SAMPLE: &str = r#"[
        {
            "category_name": "基本情報",
            "values": [
                {
                    "key": "氏名",
                    "value": [
                        { "value": "山田", "ruby": "やまだ" },
                        { "value": "太郎", "ruby": "たろう" }
                    ],
                    "status": null
                },
                { "key": "所在地", "value": "東京都" },
                { "key": "非公開", "value": null, "status": "準備中" }
            ]
        }
    ]"#;

    #[test]
    fn parses_sections_fields_and_ruby_spans() {
        let profile: DisclosedProfile = serde_json::from_str(SAMPLE).expect("sample should parse");
        assert_eq!(profile.sections().len(), 1);

        let section = &profile.sections()[0];
        assert_eq!(section.category_name, "基本情報");
        assert_eq!(section.values.len(), 3);

        match &section.values[0].value {
            ProfileText::Ruby(spans) => {
                assert_eq!(spans.len(), 2);
                assert_eq!(spans[0].value, "山田");
                assert_eq!(spans[0].ruby, "やまだ");
            }
            other => panic!("expected ruby text, got {other:?}"),
        }
        assert_eq!(
            section.values[1].value,
            ProfileText::Plain("東京都".to_string())
        );
        assert_eq!(section.values[2].value, ProfileText::None);
        assert_eq!(section.values[2].status.as_deref(), Some("準備中"));
    }

    #[test]
    fn missing_status_defaults_to_none() {
        let profile: DisclosedProfile = serde_json::from_str(SAMPLE).expect("sample should parse");
        assert_eq!(profile.sections()[0].values[1].status, None);
    }

    #[test]
    fn serialization_round_trips_field_for_field() {
        let profile: DisclosedProfile = serde_json::from_str(SAMPLE).expect("sample should parse");
        let encoded = serde_json::to_string(&profile).expect("profile should serialize");
        let decoded: DisclosedProfile =
            serde_json::from_str(&encoded).expect("re-encoded profile should parse");
        assert_eq!(profile, decoded);
    }

    #[test]
    fn empty_profile_parses_as_empty() {
        let profile: DisclosedProfile = serde_json::from_str("[]").expect("empty list parses");
        assert!(profile.is_empty());
    }
}
