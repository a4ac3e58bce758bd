use crate::{EdgeContext, Input, Result};

use async_trait::async_trait;

/// Recursive hydration and persistence of a nested record graph.
///
/// `fill` maps a nested plain-data object onto an instance and the nested
/// instances of its associations. `deep_save` then persists the whole graph:
/// the instance first, then every pending association, linking each only
/// once its targets have a persisted identity.
#[async_trait]
pub trait Persistable: Send + Sync {
    /// Applies `values` to the instance.
    ///
    /// Entries are processed concurrently. Association keys produce nested
    /// instances, filled recursively, that are queued as pending
    /// associations. Attribute keys go through the attribute-write primitive,
    /// except for primary-key attributes that are already set. Other keys are
    /// kept as pass-through values, or rejected in strict mode.
    async fn fill(&mut self, values: Input) -> Result<()>;

    /// Persists the instance and its pending associations.
    ///
    /// `context` names the parent this instance is saved for. A new record
    /// saved with a context is created through the parent's association
    /// rather than inserted on its own. Failures are annotated with the deep
    /// path of every instance they bubble through.
    async fn deep_save(&mut self, context: Option<EdgeContext<'_>>) -> Result<()>;

    /// `fill` followed by a root `deep_save`.
    async fn fill_and_save(&mut self, values: Input) -> Result<()> {
        self.fill(values).await?;
        self.deep_save(None).await
    }

    /// `None` when the model has no primary key, otherwise whether any
    /// primary-key attribute is unset.
    fn is_new_record(&self) -> Option<bool>;
}
