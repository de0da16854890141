//! Surfaces and the surface/component store
//!
//! A surface is one independently addressable rendering target: a flat map
//! of component definitions keyed by id, a root component id, and a style
//! record. Tree shape is implied by id references inside definitions, not
//! by nesting in storage.
//!
//! Lifecycle per surface: absent → active → destroyed (terminal). Creation
//! is idempotent; operations against a destroyed surface fail with a log
//! line instead of panicking.

use a2ui_types::{ComponentDefinition, SurfaceStyles};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error, warn};

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// One rendering target with its component map and styles.
#[derive(Debug, Clone)]
pub struct Surface {
    id: String,
    root_component_id: String,
    styles: SurfaceStyles,
    components: HashMap<String, ComponentDefinition>,
    destroyed: bool,
}

impl Surface {
    pub(crate) fn new(id: String, root_component_id: String, styles: Option<SurfaceStyles>) -> Self {
        let styles = styles.unwrap_or_default();
        if let Some(color) = &styles.primary_color {
            if !is_hex_color(color) {
                warn!(surface_id = %id, color, "primaryColor is not #rrggbb");
            }
        }
        Self {
            id,
            root_component_id,
            styles,
            components: HashMap::new(),
            destroyed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root_component_id(&self) -> &str {
        &self.root_component_id
    }

    pub fn styles(&self) -> &SurfaceStyles {
        &self.styles
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Adds or wholesale-replaces one component definition.
    ///
    /// Rejects definitions with an empty id or with a `component` map that
    /// does not hold exactly one type key.
    pub fn add_component(&mut self, definition: ComponentDefinition) -> bool {
        if self.destroyed {
            warn!(surface_id = %self.id, "cannot add component to destroyed surface");
            return false;
        }
        if !definition.is_valid() {
            error!(
                surface_id = %self.id,
                component_id = %definition.id,
                "invalid component definition: expected exactly one type key"
            );
            return false;
        }
        self.components.insert(definition.id.clone(), definition);
        true
    }

    /// Adds a batch of definitions, skipping invalid entries individually.
    /// Returns the count actually applied.
    pub fn add_components(&mut self, definitions: &[ComponentDefinition]) -> usize {
        definitions
            .iter()
            .filter(|def| self.add_component((*def).clone()))
            .count()
    }

    pub fn component(&self, component_id: &str) -> Option<&ComponentDefinition> {
        self.components.get(component_id)
    }

    pub fn has_component(&self, component_id: &str) -> bool {
        self.components.contains_key(component_id)
    }

    pub fn remove_component(&mut self, component_id: &str) -> bool {
        if self.destroyed {
            warn!(surface_id = %self.id, "cannot remove component from destroyed surface");
            return false;
        }
        self.components.remove(component_id).is_some()
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.components.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Shallow-merges `styles` into the existing record.
    pub fn update_styles(&mut self, styles: &SurfaceStyles) -> bool {
        if self.destroyed {
            warn!(surface_id = %self.id, "cannot update styles of destroyed surface");
            return false;
        }
        if let Some(color) = &styles.primary_color {
            if !is_hex_color(color) {
                warn!(surface_id = %self.id, color, "primaryColor is not #rrggbb");
            }
        }
        self.styles.merge_from(styles);
        true
    }

    pub fn clear_components(&mut self) {
        if self.destroyed {
            warn!(surface_id = %self.id, "cannot clear components of destroyed surface");
            return;
        }
        self.components.clear();
    }

    pub(crate) fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.components.clear();
        self.destroyed = true;
    }

    pub fn summary(&self) -> SurfaceSummary {
        SurfaceSummary {
            id: self.id.clone(),
            root_component_id: self.root_component_id.clone(),
            component_count: self.components.len(),
            has_data_model: false,
        }
    }
}

/// Read-only snapshot of a surface, for host applications and tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSummary {
    pub id: String,
    pub root_component_id: String,
    pub component_count: usize,
    pub has_data_model: bool,
}

/// Store of surfaces keyed by id.
#[derive(Debug, Default)]
pub struct SurfaceStore {
    surfaces: HashMap<String, Surface>,
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
        }
    }

    /// Creates a surface, validating both ids. Re-creating an existing id
    /// is a no-op that leaves its component map intact.
    pub fn create(
        &mut self,
        surface_id: &str,
        root_component_id: &str,
        styles: Option<SurfaceStyles>,
    ) -> bool {
        if surface_id.is_empty() || root_component_id.is_empty() {
            error!(surface_id, root_component_id, "invalid surface config");
            return false;
        }
        if self.surfaces.contains_key(surface_id) {
            warn!(surface_id, "surface already exists");
            return true;
        }

        let surface = Surface::new(surface_id.to_string(), root_component_id.to_string(), styles);
        self.surfaces.insert(surface_id.to_string(), surface);
        debug!(surface_id, "surface created");
        true
    }

    pub fn get(&self, surface_id: &str) -> Option<&Surface> {
        self.surfaces.get(surface_id)
    }

    pub fn get_mut(&mut self, surface_id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(surface_id)
    }

    pub fn has(&self, surface_id: &str) -> bool {
        self.surfaces.contains_key(surface_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    pub fn count(&self) -> usize {
        self.surfaces.len()
    }

    /// Adds components to a surface, returning the count applied, or
    /// `None` when the surface does not exist.
    pub fn add_components(
        &mut self,
        surface_id: &str,
        definitions: &[ComponentDefinition],
    ) -> Option<usize> {
        let Some(surface) = self.surfaces.get_mut(surface_id) else {
            error!(surface_id, "surface not found");
            return None;
        };
        Some(surface.add_components(definitions))
    }

    /// Marks the surface destroyed and removes it from the active set.
    pub fn delete(&mut self, surface_id: &str) -> bool {
        match self.surfaces.remove(surface_id) {
            Some(mut surface) => {
                surface.destroy();
                debug!(surface_id, "surface deleted");
                true
            }
            None => {
                warn!(surface_id, "surface not found");
                false
            }
        }
    }

    /// Destroys and removes every surface, returning how many were cleared.
    pub fn clear(&mut self) -> usize {
        let count = self.surfaces.len();
        for (_, mut surface) in self.surfaces.drain() {
            surface.destroy();
        }
        count
    }
}
