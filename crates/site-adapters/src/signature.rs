use page_model::{Page, PageExt};
use serde::{Deserialize, Serialize};
use url::Url;

/// What adapters inspect to decide whether a page is theirs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSignature {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PageSignature {
    pub fn of(page: &dyn Page) -> Self {
        let title = page
            .elements_where(|el| el.is_tag("title"))
            .first()
            .map(|node| page_model::normalize_space(&page.text_content(*node)))
            .filter(|title| !title.is_empty());
        Self {
            url: page.url(),
            body_id: page.body_id(),
            title,
        }
    }

    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
    }

    pub fn path(&self) -> String {
        Url::parse(&self.url)
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }
}

/// Declarative page match: any path fragment or the body id suffices, and
/// a host suffix, when given, must also hold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMatcher {
    #[serde(default)]
    pub host_suffix: Option<String>,
    #[serde(default)]
    pub path_contains: Vec<String>,
    #[serde(default)]
    pub body_ids: Vec<String>,
}

impl SiteMatcher {
    pub fn matches(&self, signature: &PageSignature) -> bool {
        let by_body = signature
            .body_id
            .as_deref()
            .map(|id| self.body_ids.iter().any(|want| want == id))
            .unwrap_or(false);
        if by_body {
            return true;
        }
        if let Some(suffix) = &self.host_suffix {
            let host_ok = signature
                .host()
                .map(|host| host.ends_with(&suffix.to_ascii_lowercase()))
                .unwrap_or(false);
            if !host_ok {
                return false;
            }
        }
        let path = signature.path();
        self.path_contains.iter().any(|fragment| path.contains(fragment.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> SiteMatcher {
        SiteMatcher {
            host_suffix: Some("axol.jp".into()),
            path_contains: vec!["/entry/input".into()],
            body_ids: vec!["entry_input".into()],
        }
    }

    fn signature(url: &str, body_id: Option<&str>) -> PageSignature {
        PageSignature {
            url: url.into(),
            body_id: body_id.map(str::to_string),
            title: None,
        }
    }

    #[test]
    fn path_needs_matching_host() {
        assert!(matcher().matches(&signature("https://job.axol.jp/ab/s/x_25/entry/input", None)));
        assert!(!matcher().matches(&signature("https://other.example/entry/input", None)));
    }

    #[test]
    fn body_id_alone_is_enough() {
        assert!(matcher().matches(&signature("file:///tmp/saved.html", Some("entry_input"))));
        assert!(!matcher().matches(&signature("file:///tmp/saved.html", Some("top"))));
    }
}
