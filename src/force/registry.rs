//! Name to constructor map for force terms.
use super::{EdgeDistanceForce, ForceTerm, ImplicitSurfaceForce};
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::fmt;

/// Builds a force term from its instance name and weight.
pub type ForceConstructor = fn(&str, f64) -> Box<dyn ForceTerm>;

/// Registered force types, looked up case-insensitively.
#[derive(Clone, Default)]
pub struct ForceRegistry {
    constructors: BTreeMap<String, (String, ForceConstructor)>,
}

impl ForceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in force terms.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        register_builtin_forces(&mut registry);
        registry
    }

    /// Register `constructor` under `type_name`, replacing any previous entry.
    pub fn register(&mut self, type_name: &str, constructor: ForceConstructor) {
        self.constructors.insert(
            type_name.to_lowercase(),
            (type_name.to_string(), constructor),
        );
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(&type_name.to_lowercase())
    }

    /// Registered type names as given at registration.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.values().map(|(name, _)| name.as_str())
    }

    pub fn create(
        &self,
        type_name: &str,
        name: &str,
        weight: f64,
    ) -> Result<Box<dyn ForceTerm>, ConfigError> {
        self.constructors
            .get(&type_name.to_lowercase())
            .map(|(_, ctor)| ctor(name, weight))
            .ok_or_else(|| ConfigError::UnknownForce(type_name.to_string()))
    }
}

impl fmt::Debug for ForceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}

fn edge_distance(name: &str, weight: f64) -> Box<dyn ForceTerm> {
    Box::new(EdgeDistanceForce::new(name, weight))
}

fn implicit_surface(name: &str, weight: f64) -> Box<dyn ForceTerm> {
    Box::new(ImplicitSurfaceForce::new(name, weight))
}

/// Add the force terms of this crate to `registry`.
pub fn register_builtin_forces(registry: &mut ForceRegistry) {
    registry.register("ImageEdgeDistance", edge_distance);
    registry.register("ImplicitSurfaceDistance", implicit_surface);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_is_case_insensitive() {
        let registry = ForceRegistry::with_builtin();
        assert!(registry.contains("imageedgedistance"));
        let force = registry.create("IMAGEEDGEDISTANCE", "edges", 0.5).unwrap();
        assert_eq!(force.name(), "edges");
        assert_eq!(force.weight(), 0.5);
        let names: Vec<&str> = registry.type_names().collect();
        assert_eq!(names, vec!["ImageEdgeDistance", "ImplicitSurfaceDistance"]);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = ForceRegistry::new();
        assert_eq!(
            registry.create("ImageEdgeDistance", "edges", 1.0).err(),
            Some(ConfigError::UnknownForce("ImageEdgeDistance".into()))
        );
    }
}
