//! Convention-based mapping from action results to candidate paths.
//!
//! Result qualifiers understand a few conventions:
//!
//! - `<name>` is replaced by a configured alias, in actions and results alike;
//! - `/abs/path..value` is absolute: base `/abs/path`, value `value`;
//!   `/abs/path` without `..` is used as the value with no base;
//! - each leading `#` walks the action path up one dot- or slash-delimited
//!   component, stopping once none is left. A dotted remainder extends the
//!   walked path: `#list.done` on `/book/view.edit` yields base
//!   `/book/view.list`, value `done`;
//! - anything else is a plain value appended to the action path.
//!
//! An absent result renders the action with the configured default value.

use std::{borrow::Cow, collections::HashMap};

use crate::domain::paths::{CandidatePath, DOT_SEPARATOR, PATH_SEPARATOR};

use super::ports::{MappingError, ResultPathResolver};

pub const DEFAULT_RESULT_VALUE: &str = "ok";

const ABSOLUTE_SPLIT: &str = "..";
const PARENT_MARKER: char = '#';
const ALIAS_OPEN: char = '<';
const ALIAS_CLOSE: char = '>';

#[derive(Debug, Clone)]
pub struct ResultMapper {
    default_result: String,
    aliases: HashMap<String, String>,
}

impl Default for ResultMapper {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_VALUE)
    }
}

impl ResultMapper {
    pub fn new(default_result: impl Into<String>) -> Self {
        Self {
            default_result: default_result.into(),
            aliases: HashMap::new(),
        }
    }

    pub fn with_alias(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), path.into());
        self
    }

    pub fn with_aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn default_result(&self) -> &str {
        &self.default_result
    }

    fn expand_aliases<'a>(&self, input: &'a str) -> Result<Cow<'a, str>, MappingError> {
        if !input.contains(ALIAS_OPEN) {
            return Ok(Cow::Borrowed(input));
        }

        let mut expanded = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(open) = rest.find(ALIAS_OPEN) {
            expanded.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find(ALIAS_CLOSE) else {
                return Err(MappingError::UnterminatedAlias {
                    input: input.to_string(),
                });
            };
            let name = &after_open[..close];
            let target = self
                .aliases
                .get(name)
                .ok_or_else(|| MappingError::UnknownAlias {
                    alias: name.to_string(),
                })?;
            expanded.push_str(target);
            rest = &after_open[close + 1..];
        }
        expanded.push_str(rest);
        Ok(Cow::Owned(expanded))
    }

    fn value_or_default(&self, value: &str) -> String {
        if value.is_empty() {
            self.default_result.clone()
        } else {
            value.to_string()
        }
    }

    fn absolute(&self, value: &str) -> CandidatePath {
        match value.find(ABSOLUTE_SPLIT) {
            Some(idx) => CandidatePath::new(
                Some(value[..idx].to_string()),
                self.value_or_default(&value[idx + ABSOLUTE_SPLIT.len()..]),
            ),
            None => CandidatePath::value_only(value),
        }
    }

    fn relative_to_parent(&self, action: &str, value: &str) -> CandidatePath {
        let depth = value.chars().take_while(|c| *c == PARENT_MARKER).count();
        let mut base = action;
        for _ in 0..depth {
            match base.rfind([PATH_SEPARATOR, DOT_SEPARATOR]) {
                Some(idx) => base = &base[..idx],
                None => break,
            }
        }

        let rest = &value[depth..];
        let rest = rest.strip_prefix(DOT_SEPARATOR).unwrap_or(rest);
        let (suffix, value) = match rest.rfind(DOT_SEPARATOR) {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => ("", rest),
        };

        let base = match (base.is_empty(), suffix.is_empty()) {
            (true, true) => None,
            (true, false) => Some(suffix.to_string()),
            (false, true) => Some(base.to_string()),
            (false, false) => Some(format!("{base}{DOT_SEPARATOR}{suffix}")),
        };
        CandidatePath::new(base, self.value_or_default(value))
    }
}

impl ResultPathResolver for ResultMapper {
    fn resolve_result_path(
        &self,
        action: &str,
        result: Option<&str>,
    ) -> Result<CandidatePath, MappingError> {
        if action.is_empty() {
            return Err(MappingError::EmptyAction);
        }
        let action = self.expand_aliases(action)?;

        let Some(result) = result else {
            return Ok(CandidatePath::new(
                Some(action.into_owned()),
                self.default_result.clone(),
            ));
        };
        let value = self.expand_aliases(result)?;

        if value.starts_with(PATH_SEPARATOR) {
            return Ok(self.absolute(&value));
        }
        if value.starts_with(PARENT_MARKER) {
            return Ok(self.relative_to_parent(&action, &value));
        }
        Ok(CandidatePath::new(Some(action.into_owned()), value))
    }
}
