//! Persona documents and their text rendering.
//!
//! Two persona schemas exist: the flat-trait "tag" variant and the
//! role/experience-based "episodic" variant. Document field names follow
//! the authored JSON files under `{data_dir}/user_info/` (e.g.
//! `P50.json` for tag, `P50_per.json` for episodic).

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which of the two persona schemas a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaVariant {
    Tag,
    Episodic,
}

impl fmt::Display for PersonaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonaVariant::Tag => write!(f, "tag"),
            PersonaVariant::Episodic => write!(f, "episodic"),
        }
    }
}

impl FromStr for PersonaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tag" => Ok(PersonaVariant::Tag),
            "episodic" | "epi" => Ok(PersonaVariant::Episodic),
            other => Err(format!("invalid persona variant: '{other}'")),
        }
    }
}

/// Flat-trait persona document (tag variant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPersona {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Job")]
    pub job: String,
    #[serde(rename = "Major")]
    pub major: String,
    #[serde(rename = "MBTI")]
    pub mbti: String,
    /// Personality-trait string the participant chose for themself.
    #[serde(rename = "Self-tag")]
    pub self_tag: String,
}

/// Shared base fields of the episodic persona document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseInformation {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Job")]
    pub job: String,
    #[serde(rename = "Major")]
    pub major: String,
    #[serde(rename = "MBTI")]
    pub mbti: String,
}

/// Two authored episode strings for one identity role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityEpisodes {
    #[serde(rename = "Ep1")]
    pub ep1: String,
    #[serde(rename = "Ep2")]
    pub ep2: String,
}

/// Role/experience-based persona document (episodic variant).
///
/// `BTreeMap` keeps role ordering deterministic so rendered prompt text is
/// stable across loads of the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicPersona {
    #[serde(rename = "Base Information")]
    pub base: BaseInformation,
    /// Role -> two authored episodes establishing that identity.
    #[serde(rename = "Identities")]
    pub identities: BTreeMap<String, IdentityEpisodes>,
    /// Role -> augmented "experienceable" episode strings.
    #[serde(rename = "Experiencable")]
    pub experienceable: BTreeMap<String, Vec<String>>,
}

/// A loaded persona document of either variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonaDocument {
    Tag(TagPersona),
    Episodic(EpisodicPersona),
}

/// Persona text blocks ready for prompt assembly.
///
/// `experienceable` is present only for the episodic variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPersona {
    pub description: String,
    pub experienceable: Option<String>,
}

impl PersonaDocument {
    /// Which schema this document carries.
    pub fn variant(&self) -> PersonaVariant {
        match self {
            PersonaDocument::Tag(_) => PersonaVariant::Tag,
            PersonaDocument::Episodic(_) => PersonaVariant::Episodic,
        }
    }

    /// Render the document into the text blocks the prompt builder consumes.
    pub fn render(&self) -> RenderedPersona {
        match self {
            PersonaDocument::Tag(p) => RenderedPersona {
                description: format!(
                    "I am a {}-year-old {}, working as a {}. I majored in {} and my MBTI is {}.\n\
                     I see myself as someone who is {}.",
                    p.age, p.gender, p.job, p.major, p.mbti, p.self_tag
                ),
                experienceable: None,
            },
            PersonaDocument::Episodic(p) => {
                let base = format!(
                    "I am a {}-year-old {}, working as a {}. I majored in {} and my MBTI is {}.",
                    p.base.age, p.base.gender, p.base.job, p.base.major, p.base.mbti
                );

                let roles: Vec<&str> = p.identities.keys().map(|k| k.as_str()).collect();
                let episodes: Vec<String> = p
                    .identities
                    .iter()
                    .map(|(role, eps)| {
                        format!("Regarding {role}: {} Also, {}", eps.ep1, eps.ep2)
                    })
                    .collect();
                let description = format!(
                    "{base}\nMy identities are: {}.\n{}",
                    roles.join(", "),
                    episodes.join(" ")
                );

                let blocks: Vec<String> = p
                    .experienceable
                    .iter()
                    .map(|(role, exps)| {
                        let items: Vec<String> =
                            exps.iter().map(|e| format!("- {e}")).collect();
                        format!("**{role}**\n{}", items.join("\n"))
                    })
                    .collect();
                let experienceable = format!(
                    "Other things I might plausibly experience:\n\n{}",
                    blocks.join("\n\n")
                );

                RenderedPersona {
                    description,
                    experienceable: Some(experienceable),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_persona() -> TagPersona {
        TagPersona {
            age: 27,
            gender: "woman".to_string(),
            job: "graduate student".to_string(),
            major: "psychology".to_string(),
            mbti: "INFJ".to_string(),
            self_tag: "quietly determined".to_string(),
        }
    }

    fn episodic_persona() -> EpisodicPersona {
        let mut identities = BTreeMap::new();
        identities.insert(
            "student".to_string(),
            IdentityEpisodes {
                ep1: "I presented my first paper last spring.".to_string(),
                ep2: "I tutor undergrads on weekends.".to_string(),
            },
        );
        let mut experienceable = BTreeMap::new();
        experienceable.insert(
            "student".to_string(),
            vec!["Missing a submission deadline".to_string()],
        );
        EpisodicPersona {
            base: BaseInformation {
                age: 27,
                gender: "woman".to_string(),
                job: "graduate student".to_string(),
                major: "psychology".to_string(),
                mbti: "INFJ".to_string(),
            },
            identities,
            experienceable,
        }
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("tag".parse::<PersonaVariant>().unwrap(), PersonaVariant::Tag);
        assert_eq!(
            "episodic".parse::<PersonaVariant>().unwrap(),
            PersonaVariant::Episodic
        );
        // Short alias used by the original transcript documents
        assert_eq!("epi".parse::<PersonaVariant>().unwrap(), PersonaVariant::Episodic);
        assert!("nope".parse::<PersonaVariant>().is_err());
    }

    #[test]
    fn test_tag_persona_field_names() {
        let json = r#"{
            "Age": 27,
            "Gender": "woman",
            "Job": "graduate student",
            "Major": "psychology",
            "MBTI": "INFJ",
            "Self-tag": "quietly determined"
        }"#;
        let p: TagPersona = serde_json::from_str(json).unwrap();
        assert_eq!(p, tag_persona());
    }

    #[test]
    fn test_tag_render_has_no_experienceable() {
        let rendered = PersonaDocument::Tag(tag_persona()).render();
        assert!(rendered.description.contains("27-year-old"));
        assert!(rendered.description.contains("quietly determined"));
        assert!(rendered.experienceable.is_none());
    }

    #[test]
    fn test_episodic_render_includes_identities_and_experienceable() {
        let rendered = PersonaDocument::Episodic(episodic_persona()).render();
        assert!(rendered.description.contains("My identities are: student."));
        assert!(rendered.description.contains("presented my first paper"));
        let exp = rendered.experienceable.unwrap();
        assert!(exp.contains("**student**"));
        assert!(exp.contains("- Missing a submission deadline"));
    }

    #[test]
    fn test_episodic_render_is_deterministic() {
        let doc = PersonaDocument::Episodic(episodic_persona());
        assert_eq!(doc.render(), doc.render());
    }
}
