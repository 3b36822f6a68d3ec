use anyhow::Result;

use crate::models::Exercise;
use crate::storage::Storage;

/// Favorite exercises in insertion order, mirrored to storage on every change
pub struct Favorites {
    storage: Storage,
    items: Vec<Exercise>,
}

impl Favorites {
    pub fn load(storage: Storage) -> Result<Self> {
        let items = storage.load_favorites()?;
        tracing::debug!("Loaded {} favorites", items.len());
        Ok(Self { storage, items })
    }

    /// Add an exercise; returns false when it was already a favorite
    pub fn add(&mut self, exercise: Exercise) -> Result<bool> {
        if self.contains(&exercise.id) {
            return Ok(false);
        }

        self.items.push(exercise);
        self.persist()?;
        Ok(true)
    }

    /// Remove by id; returns false when it was not a favorite
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.items.len();
        self.items.retain(|e| e.id != id);

        if self.items.len() == before {
            return Ok(false);
        }

        self.persist()?;
        Ok(true)
    }

    /// Flip membership; returns whether the exercise is a favorite afterwards
    pub fn toggle(&mut self, exercise: Exercise) -> Result<bool> {
        if self.contains(&exercise.id) {
            self.remove(&exercise.id)?;
            Ok(false)
        } else {
            self.add(exercise)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|e| e.id == id)
    }

    pub fn list(&self) -> &[Exercise] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.storage.save_favorites(&self.items)
    }
}
