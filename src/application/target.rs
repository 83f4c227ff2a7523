//! Template target resolution with fallback search and memoization.

use std::{fmt, sync::Arc};

use metrics::{counter, histogram};
use tracing::{debug, instrument};

use crate::{
    cache::TargetCache,
    domain::paths::{
        CandidatePath, ResolutionKey, ResolvedTarget, TargetForm, TemplateExtension,
        truncate_base,
    },
};

use super::ports::{ContentStore, MappingError, ResultPathResolver};

pub(crate) const METRIC_RESOLUTION_NOT_FOUND: &str = "viewroute_resolution_not_found_total";
pub(crate) const METRIC_RESOLUTION_PROBES: &str = "viewroute_resolution_probes";

/// Outcome of a resolution. A miss is an expected result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedTarget),
    NotFound { candidate: CandidatePath },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Found(target) => write!(f, "{target}"),
            Resolution::NotFound { candidate } => write!(f, "Result not found: {candidate}"),
        }
    }
}

/// Finds the most specific existing template for an action result.
///
/// For a candidate `base` + `value` each level tries `base.value + ext` and
/// then `base + ext`. When neither exists the last dot-component of the final
/// base segment is dropped and the level is retried; once the final segment
/// has no dot left, a last attempt is made with `value + ext` alone.
/// Accepted targets are cached by the caller's (action, result) pair.
#[derive(Clone)]
pub struct TargetResolver {
    paths: Arc<dyn ResultPathResolver>,
    store: Arc<dyn ContentStore>,
    cache: Arc<TargetCache>,
    extension: TemplateExtension,
}

impl TargetResolver {
    pub fn new(
        paths: Arc<dyn ResultPathResolver>,
        store: Arc<dyn ContentStore>,
        cache: Arc<TargetCache>,
        extension: TemplateExtension,
    ) -> Self {
        Self {
            paths,
            store,
            cache,
            extension,
        }
    }

    pub fn cache(&self) -> &Arc<TargetCache> {
        &self.cache
    }

    pub fn extension(&self) -> &TemplateExtension {
        &self.extension
    }

    /// Resolve `action` and `result` to a verified template target.
    ///
    /// Errors from the result path resolver are returned unchanged; a search
    /// that finds nothing yields [`Resolution::NotFound`] and is not cached.
    #[instrument(skip(self), fields(extension = %self.extension))]
    pub async fn resolve(
        &self,
        action: &str,
        result: Option<&str>,
    ) -> Result<Resolution, MappingError> {
        let key = ResolutionKey::new(action, result);
        if let Some(target) = self.cache.get(&key) {
            return Ok(Resolution::Found(target));
        }

        let candidate = self.paths.resolve_result_path(action, result)?;
        match self.search(&candidate).await {
            Some(target) => {
                debug!(key = %key, target = %target, "resolved template target");
                self.cache.insert(key, target.clone());
                Ok(Resolution::Found(target))
            }
            None => {
                counter!(METRIC_RESOLUTION_NOT_FOUND).increment(1);
                debug!(key = %key, candidate = %candidate, "no template target exists");
                Ok(Resolution::NotFound { candidate })
            }
        }
    }

    async fn search(&self, candidate: &CandidatePath) -> Option<ResolvedTarget> {
        let value = candidate.value();
        let mut base = candidate.base();
        let mut probes: u32 = 0;

        let found = 'levels: loop {
            for form in TargetForm::ORDER {
                let Some(path) = form.render(base, value, &self.extension) else {
                    continue;
                };
                probes += 1;
                if self.store.exists(&path).await {
                    break 'levels Some(path);
                }
            }

            let Some(current) = base else {
                break None;
            };
            base = truncate_base(current);
        };

        histogram!(METRIC_RESOLUTION_PROBES).record(f64::from(probes));
        found.map(ResolvedTarget::new)
    }
}
