use serde::{Deserialize, Serialize};

/// Substrings that must all appear in a control's identification text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(pub Vec<String>);

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keywords.into_iter().map(Into::into).collect())
    }

    /// `haystack` is expected lower-cased already.
    pub fn matches(&self, haystack: &str) -> bool {
        !self.0.is_empty()
            && self
                .0
                .iter()
                .all(|keyword| haystack.contains(&keyword.to_lowercase()))
    }
}

impl From<&[&str]> for KeywordSet {
    fn from(keywords: &[&str]) -> Self {
        Self::new(keywords.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_is_required() {
        let set = KeywordSet::new(["郵便", "1"]);
        assert!(set.matches("郵便番号1 zip1"));
        assert!(!set.matches("郵便番号 zip"));
        assert!(!KeywordSet::new(Vec::<String>::new()).matches("anything"));
    }

    #[test]
    fn keywords_compare_case_insensitively() {
        assert!(KeywordSet::new(["Mail"]).matches("e-mail address"));
    }
}
