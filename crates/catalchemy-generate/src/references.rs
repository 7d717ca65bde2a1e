use rand::Rng;

use catalchemy_core::CatalogEntity;

use crate::errors::GenerationError;

/// Parents produced by an earlier stage, offered to a later one.
#[derive(Debug)]
pub struct ParentPool<'a, E> {
    parents: &'a [E],
    cursor: usize,
}

impl<'a, E: CatalogEntity> ParentPool<'a, E> {
    pub fn new(parents: &'a [E]) -> Self {
        Self { parents, cursor: 0 }
    }

    /// Next parent in round-robin order.
    pub fn next_round_robin(&mut self) -> Result<&'a E, GenerationError> {
        if self.parents.is_empty() {
            return Err(GenerationError::ReferenceUnavailable(E::KIND));
        }
        let parent = &self.parents[self.cursor % self.parents.len()];
        self.cursor = (self.cursor + 1) % self.parents.len();
        Ok(parent)
    }

    /// Uniformly random parent.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&'a E, GenerationError> {
        if self.parents.is_empty() {
            return Err(GenerationError::ReferenceUnavailable(E::KIND));
        }
        Ok(&self.parents[rng.random_range(0..self.parents.len())])
    }
}
