use std::collections::HashMap;

use indexmap::IndexMap;

use crate::runtime::entity::Entity;

/// Entities in declaration order. Re-declaring a name replaces the entity in
/// place, so it keeps its original draw position.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: IndexMap<String, Entity>,
}

impl EntityStore {
    /// Returns `true` when an existing entity was replaced.
    pub fn insert(&mut self, name: impl Into<String>, entity: Entity) -> bool {
        self.entities.insert(name.into(), entity).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Draw order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize { self.entities.len() }
    pub fn is_empty(&self) -> bool { self.entities.is_empty() }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

/// Numeric script variables.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    values: HashMap<String, f64>,
}

impl VariableStore {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Declare or overwrite.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Overwrite an existing variable; `None` if it was never declared.
    pub fn update(&mut self, name: &str, value: f64) -> Option<f64> {
        let slot = self.values.get_mut(name)?;
        *slot = value;
        Some(value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Sorted by name, for stable display.
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut out: Vec<_> = self.values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
