//! Result paths, resolution keys and view targets.
//!
//! A result path is the structured form of "where should this action's
//! outcome be rendered": an optional hierarchical base such as
//! `/book/view.edit` plus a value segment such as `ok`. Turning one into a
//! concrete template location means appending a file extension and, when
//! nothing exists there, walking the base up one dot-component at a time.

use std::fmt;

use super::error::DomainError;

/// Separates hierarchical segments of a base path.
pub const PATH_SEPARATOR: char = '/';
/// Separates the value segment and the dot-components of the last segment.
pub const DOT_SEPARATOR: char = '.';
/// Separates action and result in the display form of a [`ResolutionKey`].
const KEY_SEPARATOR: char = ' ';

pub const DEFAULT_TEMPLATE_EXTENSION: &str = ".jsp";

/// Cache key for a resolution: the inputs exactly as the caller supplied them.
///
/// An absent result and an empty result are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    action: String,
    result: Option<String>,
}

impl ResolutionKey {
    pub fn new(action: impl Into<String>, result: Option<&str>) -> Self {
        Self {
            action: action.into(),
            result: result.map(str::to_owned),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Some(result) => write!(f, "{}{KEY_SEPARATOR}{result}", self.action),
            None => f.write_str(&self.action),
        }
    }
}

/// Unverified (base, value) pair produced by a result path resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    base: Option<String>,
    value: String,
}

impl CandidatePath {
    pub fn new(base: Option<String>, value: impl Into<String>) -> Self {
        Self {
            base,
            value: value.into(),
        }
    }

    /// Candidate without a base; only `value + extension` will be tried.
    pub fn value_only(value: impl Into<String>) -> Self {
        Self::new(None, value)
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            Some(base) => write!(f, "{base}{DOT_SEPARATOR}{}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

/// Extension appended to every probed template path, e.g. `.jsp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExtension(String);

impl TemplateExtension {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if !raw.starts_with(DOT_SEPARATOR) || raw.len() < 2 {
            return Err(DomainError::validation(format!(
                "template extension `{raw}` must be a dot followed by at least one character"
            )));
        }
        if raw.contains(PATH_SEPARATOR) {
            return Err(DomainError::validation(format!(
                "template extension `{raw}` must not contain `{PATH_SEPARATOR}`"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TemplateExtension {
    fn default() -> Self {
        Self(DEFAULT_TEMPLATE_EXTENSION.to_string())
    }
}

impl fmt::Display for TemplateExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension-qualified template location confirmed to exist in a content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedTarget(String);

impl ResolvedTarget {
    pub(crate) fn new(path: String) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedTarget {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The two shapes a target can take at one truncation level, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// `base.value + ext`, or `value + ext` when there is no base.
    WithValue,
    /// `base + ext`; never produced without a base.
    WithoutValue,
}

impl TargetForm {
    pub const ORDER: [TargetForm; 2] = [TargetForm::WithValue, TargetForm::WithoutValue];

    /// Build the probe path for this form, or `None` when the form does not apply.
    pub fn render(
        self,
        base: Option<&str>,
        value: &str,
        extension: &TemplateExtension,
    ) -> Option<String> {
        let ext = extension.as_str();
        match (self, base) {
            (TargetForm::WithValue, None) => Some(format!("{value}{ext}")),
            (TargetForm::WithValue, Some(base)) => {
                Some(format!("{base}{DOT_SEPARATOR}{value}{ext}"))
            }
            (TargetForm::WithoutValue, Some(base)) => Some(format!("{base}{ext}")),
            (TargetForm::WithoutValue, None) => None,
        }
    }
}

/// Index of the last dot inside the final path segment, if any.
///
/// Dots in earlier segments are never considered: for `a.b/c` this is `None`.
pub fn last_dot_after_slash(path: &str) -> Option<usize> {
    let segment_start = path.rfind(PATH_SEPARATOR).map_or(0, |idx| idx + 1);
    path[segment_start..]
        .rfind(DOT_SEPARATOR)
        .map(|idx| segment_start + idx)
}

/// Strip the last dot-component of the final segment.
///
/// Returns `None` when the final segment has no dot, meaning the next attempt
/// runs without a base at all.
pub fn truncate_base(base: &str) -> Option<&str> {
    last_dot_after_slash(base).map(|idx| &base[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_distinguishes_absent_and_empty_result() {
        let absent = ResolutionKey::new("/book/view", None);
        let empty = ResolutionKey::new("/book/view", Some(""));
        assert_ne!(absent, empty);
        assert_eq!(absent.to_string(), "/book/view");
        assert_eq!(empty.to_string(), "/book/view ");
    }

    #[test]
    fn key_display_joins_with_space() {
        let key = ResolutionKey::new("/book/view", Some("ok"));
        assert_eq!(key.to_string(), "/book/view ok");
        assert_eq!(key.action(), "/book/view");
        assert_eq!(key.result(), Some("ok"));
    }

    #[test]
    fn truncation_is_segment_local() {
        assert_eq!(truncate_base("a.b/c.d"), Some("a.b/c"));
        assert_eq!(truncate_base("a.b/c"), None);
        assert_eq!(truncate_base("/book/view.edit.draft"), Some("/book/view.edit"));
        assert_eq!(truncate_base("plain"), None);
    }

    #[test]
    fn leading_dot_of_segment_counts_as_boundary() {
        assert_eq!(last_dot_after_slash("/a/.hidden"), Some(3));
        assert_eq!(truncate_base("/a/.hidden"), Some("/a/"));
    }

    #[test]
    fn forms_render_in_priority_order() {
        let ext = TemplateExtension::default();
        let rendered: Vec<_> = TargetForm::ORDER
            .iter()
            .filter_map(|form| form.render(Some("a/b"), "v", &ext))
            .collect();
        assert_eq!(rendered, vec!["a/b.v.jsp", "a/b.jsp"]);
    }

    #[test]
    fn without_value_form_needs_a_base() {
        let ext = TemplateExtension::default();
        assert_eq!(
            TargetForm::WithValue.render(None, "index", &ext).as_deref(),
            Some("index.jsp")
        );
        assert!(TargetForm::WithoutValue.render(None, "index", &ext).is_none());
    }

    #[test]
    fn extension_validation() {
        assert!(TemplateExtension::new(".html").is_ok());
        assert!(TemplateExtension::new("html").is_err());
        assert!(TemplateExtension::new(".").is_err());
        assert!(TemplateExtension::new("./x").is_err());
    }

    #[test]
    fn candidate_display_matches_form_a_stem() {
        let candidate = CandidatePath::new(Some("/book/view".into()), "ok");
        assert_eq!(candidate.to_string(), "/book/view.ok");
        assert_eq!(CandidatePath::value_only("index").to_string(), "index");
    }
}
