//! Wiring shared by the `serve` and `resolve` commands.

use std::sync::Arc;

use crate::{
    application::{
        error::AppError,
        mapper::ResultMapper,
        target::{Resolution, TargetResolver},
    },
    cache::TargetCache,
    config::{ResultSettings, TemplateSettings},
    domain::paths::ResolvedTarget,
};

use super::{content::DirectoryStore, error::InfraError};

/// Resolver and the directory store it probes, sharing one target cache.
pub struct Runtime {
    pub resolver: Arc<TargetResolver>,
    pub store: Arc<DirectoryStore>,
}

pub fn build_runtime(
    templates: &TemplateSettings,
    results: &ResultSettings,
) -> Result<Runtime, AppError> {
    let root = &templates.root;
    if !root.is_dir() {
        return Err(InfraError::configuration(format!(
            "templates root `{}` is not a directory",
            root.display()
        ))
        .into());
    }

    let store = Arc::new(DirectoryStore::new(root.clone()));
    let mapper = ResultMapper::new(results.default_result.clone())
        .with_aliases(results.aliases.clone());
    let resolver = TargetResolver::new(
        Arc::new(mapper),
        store.clone(),
        Arc::new(TargetCache::new()),
        templates.extension.clone(),
    );

    Ok(Runtime {
        resolver: Arc::new(resolver),
        store,
    })
}

/// Resolve a single action result; a miss becomes [`AppError::NotFound`].
pub async fn resolve_once(
    runtime: &Runtime,
    action: &str,
    result: Option<&str>,
) -> Result<ResolvedTarget, AppError> {
    match runtime.resolver.resolve(action, result).await? {
        Resolution::Found(target) => Ok(target),
        missing @ Resolution::NotFound { .. } => Err(AppError::not_found(missing.to_string())),
    }
}
