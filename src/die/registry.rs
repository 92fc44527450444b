use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use slotmap::SlotMap;

use crate::error::{RegistryError, Result};

use super::{BuildDieModel, BuildParams, DieKind, DieModel};

slotmap::new_key_type! {
    /// Unique identifier for a die model in the registry.
    pub struct DieModelId;
}

#[derive(Debug, Default)]
struct Models {
    arena: SlotMap<DieModelId, Arc<DieModel>>,
    by_sides: HashMap<u32, DieModelId>,
}

/// Memoizing registry of die models, keyed by requested side count.
///
/// Models are built on first request and then shared: repeated lookups for
/// the same side count return clones of one `Arc`, so callers can detect an
/// unchanged model with [`Arc::ptr_eq`]. The lock guards only lookup and
/// insertion. Two threads racing on the same key may both build the model;
/// the first insert wins and both observe the winner.
#[derive(Debug, Default)]
pub struct DieRegistry {
    params: BuildParams,
    models: RwLock<Models>,
}

impl DieRegistry {
    /// Creates a new, empty registry with default build parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty registry with custom build parameters.
    #[must_use]
    pub fn with_params(params: BuildParams) -> Self {
        Self {
            params,
            models: RwLock::default(),
        }
    }

    /// Returns the model for a supported side count, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedDieType`](crate::error::GeometryError::UnsupportedDieType)
    /// if `sides` is not a supported die.
    pub fn get(&self, sides: u32) -> Result<Arc<DieModel>> {
        let kind = DieKind::from_sides(sides)?;
        self.get_or_build(sides, || BuildDieModel::new(kind))
    }

    /// Returns the model for `sides`, substituting a unit cube for
    /// unsupported side counts.
    ///
    /// The substitute is numbered 1 to 6 whatever `sides` was, so callers
    /// should prefer [`DieRegistry::get`] unless they only need something to
    /// draw.
    ///
    /// # Errors
    ///
    /// Returns an error only if model construction fails, which does not
    /// happen for the built-in shapes.
    pub fn get_or_fallback(&self, sides: u32) -> Result<Arc<DieModel>> {
        if let Ok(kind) = DieKind::from_sides(sides) {
            self.get_or_build(sides, || BuildDieModel::new(kind))
        } else {
            tracing::warn!(sides, "unsupported die type, using a unit cube");
            self.get_or_build(sides, || BuildDieModel::fallback(sides))
        }
    }

    /// Returns the id of the cached model for `sides`, if built.
    #[must_use]
    pub fn id_for(&self, sides: u32) -> Option<DieModelId> {
        self.read().by_sides.get(&sides).copied()
    }

    /// Returns the model with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not belong to this registry.
    pub fn model(&self, id: DieModelId) -> std::result::Result<Arc<DieModel>, RegistryError> {
        self.read()
            .arena
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::ModelNotFound(format!("{id:?}")))
    }

    /// Number of cached models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().arena.len()
    }

    /// Returns true if no model has been built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().arena.is_empty()
    }

    fn get_or_build<F>(&self, sides: u32, op: F) -> Result<Arc<DieModel>>
    where
        F: FnOnce() -> BuildDieModel,
    {
        if let Some(model) = self.cached(sides) {
            return Ok(model);
        }

        let built = Arc::new(op().with_params(self.params).execute()?);

        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = models.by_sides.get(&sides) {
            if let Some(existing) = models.arena.get(id) {
                tracing::debug!(sides, "die model raced in by another caller");
                return Ok(Arc::clone(existing));
            }
        }
        let id = models.arena.insert(Arc::clone(&built));
        models.by_sides.insert(sides, id);
        Ok(built)
    }

    fn cached(&self, sides: u32) -> Option<Arc<DieModel>> {
        let models = self.read();
        let id = models.by_sides.get(&sides)?;
        models.arena.get(*id).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Models> {
        self.models.read().unwrap_or_else(PoisonError::into_inner)
    }
}
