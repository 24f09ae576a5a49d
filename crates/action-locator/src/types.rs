//! Core types for locator system

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LocatorError;

/// Resolution strategies, most durable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    Id,
    Name,
    Class,
    Structural,
}

impl LocatorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::Class => "class",
            LocatorStrategy::Structural => "structural",
        }
    }

    /// All strategies in fallback order
    pub fn fallback_chain() -> Vec<LocatorStrategy> {
        vec![
            LocatorStrategy::Id,
            LocatorStrategy::Name,
            LocatorStrategy::Class,
            LocatorStrategy::Structural,
        ]
    }
}

/// Tag plus the full class list of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSignature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// One hop of a structural path: the `index`-th element child tagged `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub tag: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructuralPath {
    /// `id` of the starting ancestor; the document root when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub steps: Vec<PathStep>,
}

/// Serializable reference to a page control.
///
/// Deserializes from the structured form or from a selector string
/// (`#id`, `[name="x"]`, `tag[name="x"]`, `.a.b`, `tag.a`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LocatorRepr")]
pub struct Locator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ClassSignature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<StructuralPath>,
}

impl Locator {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
            class: None,
            path: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            class: None,
            path: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.class.is_none() && self.path.is_none()
    }

    pub fn records(&self, strategy: LocatorStrategy) -> bool {
        match strategy {
            LocatorStrategy::Id => self.id.is_some(),
            LocatorStrategy::Name => self.name.is_some(),
            LocatorStrategy::Class => self.class.is_some(),
            LocatorStrategy::Structural => self.path.is_some(),
        }
    }

    /// Most durable recorded strategy.
    pub fn primary(&self) -> Option<LocatorStrategy> {
        LocatorStrategy::fallback_chain()
            .into_iter()
            .find(|strategy| self.records(*strategy))
    }

    /// Parses the supported selector subset.
    pub fn parse_selector(selector: &str) -> Result<Self, LocatorError> {
        let invalid = || LocatorError::InvalidSelector(selector.to_string());
        let text = selector.trim();
        if text.is_empty() {
            return Err(invalid());
        }

        if let Some(id) = text.strip_prefix('#') {
            if id.is_empty() || !is_ident(id) {
                return Err(invalid());
            }
            return Ok(Self::by_id(id));
        }

        if let Some(open) = text.find('[') {
            let tag = &text[..open];
            let inner = text[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
            let (attr, raw) = inner.split_once('=').ok_or_else(invalid)?;
            if attr.trim() != "name" || !(tag.is_empty() || is_ident(tag)) {
                return Err(invalid());
            }
            let value = raw.trim().trim_matches(|c| c == '"' || c == '\'');
            if value.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::by_name(value));
        }

        let mut parts = text.split('.');
        let tag = parts.next().unwrap_or_default();
        let classes: Vec<String> = parts.map(str::to_string).collect();
        if (!tag.is_empty() && !is_ident(tag)) || classes.iter().any(|c| !is_ident(c)) {
            return Err(invalid());
        }
        if tag.is_empty() && classes.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            id: None,
            name: None,
            class: Some(ClassSignature {
                tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
                classes,
            }),
            path: None,
        })
    }
}

fn is_ident(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.id {
            return write!(f, "#{id}");
        }
        if let Some(name) = &self.name {
            return write!(f, "[name=\"{name}\"]");
        }
        if let Some(class) = &self.class {
            write!(f, "{}", class.tag.as_deref().unwrap_or_default())?;
            for c in &class.classes {
                write!(f, ".{c}")?;
            }
            return Ok(());
        }
        if let Some(path) = &self.path {
            match &path.anchor {
                Some(anchor) => write!(f, "#{anchor}")?,
                None => f.write_str(":root")?,
            }
            for step in &path.steps {
                write!(f, " > {}:{}", step.tag, step.index)?;
            }
            return Ok(());
        }
        f.write_str("<empty>")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocatorRepr {
    Selector(String),
    Fields {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        class: Option<ClassSignature>,
        #[serde(default)]
        path: Option<StructuralPath>,
    },
}

impl TryFrom<LocatorRepr> for Locator {
    type Error = LocatorError;

    fn try_from(repr: LocatorRepr) -> Result<Self, Self::Error> {
        match repr {
            LocatorRepr::Selector(selector) => Locator::parse_selector(&selector),
            LocatorRepr::Fields {
                id,
                name,
                class,
                path,
            } => {
                let locator = Locator {
                    id,
                    name,
                    class,
                    path,
                };
                if locator.is_empty() {
                    return Err(LocatorError::Empty);
                }
                Ok(locator)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_selectors() {
        assert_eq!(Locator::parse_selector("#kanji_sei").unwrap(), Locator::by_id("kanji_sei"));
        assert_eq!(
            Locator::parse_selector("[name=\"birth_Y\"]").unwrap(),
            Locator::by_name("birth_Y")
        );
        assert_eq!(
            Locator::parse_selector("select[name='keng']").unwrap(),
            Locator::by_name("keng")
        );
        let class = Locator::parse_selector("input.zip.first").unwrap().class.unwrap();
        assert_eq!(class.tag.as_deref(), Some("input"));
        assert_eq!(class.classes, vec!["zip".to_string(), "first".to_string()]);
    }

    #[test]
    fn rejects_unsupported_selectors() {
        for bad in ["", "#", "div > input", "[type=text]", "a..b", "input[name=]"] {
            assert!(Locator::parse_selector(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn deserializes_both_forms() {
        let from_string: Locator = serde_json::from_str("\"#email\"").unwrap();
        assert_eq!(from_string, Locator::by_id("email"));

        let structured: Locator = serde_json::from_str(
            r#"{"name":"sex","path":{"steps":[{"tag":"form","index":0},{"tag":"input","index":2}]}}"#,
        )
        .unwrap();
        assert_eq!(structured.primary(), Some(LocatorStrategy::Name));
        assert_eq!(structured.path.unwrap().steps.len(), 2);

        assert!(serde_json::from_str::<Locator>("{}").is_err());
    }

    #[test]
    fn display_prefers_most_durable_strategy() {
        let mut locator = Locator::by_name("tel");
        assert_eq!(locator.to_string(), "[name=\"tel\"]");
        locator.id = Some("tel1".into());
        assert_eq!(locator.to_string(), "#tel1");
    }
}
