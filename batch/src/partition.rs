use std::ops::Deref;

use permkit_permission::Permission;

use crate::BatchConfig;

/// Permissions requested together in one platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch(Vec<Permission>);

impl Batch {
    /// The permissions of this batch.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.0
    }
}

impl Deref for Batch {
    type Target = [Permission];

    fn deref(&self) -> &[Permission] {
        &self.0
    }
}

impl From<Vec<Permission>> for Batch {
    fn from(permissions: Vec<Permission>) -> Self {
        Self(permissions)
    }
}

/// Split `permissions` into batches of at most `config.batch_size()`, in
/// order. The deferred permission, if present, is pulled out and appended
/// as a final batch of its own.
#[must_use]
pub fn partition(permissions: &[Permission], config: &BatchConfig) -> Vec<Batch> {
    let deferred = config.deferred.as_ref();
    let mut batches: Vec<Batch> = permissions
        .iter()
        .filter(|p| Some(*p) != deferred)
        .cloned()
        .collect::<Vec<_>>()
        .chunks(config.batch_size())
        .map(|chunk| Batch(chunk.to_vec()))
        .collect();

    if let Some(deferred) = deferred.filter(|d| permissions.contains(d)) {
        batches.push(Batch(vec![deferred.clone()]));
    }
    batches
}
