//! Entity-class registry and inheritance resolution
//!
//! The registry owns every [`EntityClass`] in a slotmap arena and is passed
//! by reference to all consumers; there is no global instance. Attribute
//! lookups delegate to the parent chain at query time, so a live edit of a
//! base class is visible through every descendant without copying. Resolved
//! display colours cascade eagerly through per-class dependent lists, and
//! every touched class lands in a changed-set the frontend drains to refresh
//! its views.

use std::collections::{HashMap, HashSet};

use slotmap::{new_key_type, SlotMap};

use crate::eclass::attribute::EntityClassAttribute;
use crate::eclass::entity_class::EntityClass;
use crate::eclass::tokenizer::{DefParseError, DefTokenizer};
use crate::foundation::math::{Aabb, Vec4};

new_key_type! {
    /// Stable handle to an entity class inside a registry
    pub struct ClassId;
}

/// Registry of all entity classes of one game/session
#[derive(Debug)]
pub struct EntityClassRegistry {
    classes: SlotMap<ClassId, EntityClass>,

    // Case-insensitive name index
    names: HashMap<String, ClassId>,

    // Classes whose resolved state changed since the last drain
    changed: HashSet<ClassId>,

    // Monotonic parse generation, bumped per reload pass
    parse_stamp: u64,

    empty_attribute: EntityClassAttribute,
}

impl EntityClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            classes: SlotMap::with_key(),
            names: HashMap::new(),
            changed: HashSet::new(),
            parse_stamp: 0,
            empty_attribute: EntityClassAttribute::empty(),
        }
    }

    /// Number of classes in the registry
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True if the registry holds no classes
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Find a class by name, case-insensitively
    pub fn find(&self, name: &str) -> Option<ClassId> {
        self.names.get(&name.to_ascii_lowercase()).copied()
    }

    /// Find a class by name or insert a fresh one
    pub fn declare(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.find(name) {
            return id;
        }

        let id = self.classes.insert(EntityClass::new(name, false));
        self.names.insert(name.to_ascii_lowercase(), id);
        id
    }

    /// Borrow a class
    ///
    /// # Panics
    /// Panics if `id` does not belong to this registry.
    pub fn class(&self, id: ClassId) -> &EntityClass {
        &self.classes[id]
    }

    /// Mutably borrow a class; the change is recorded in the changed-set
    pub fn class_mut(&mut self, id: ClassId) -> &mut EntityClass {
        self.changed.insert(id);
        &mut self.classes[id]
    }

    /// Iterate over all class ids
    pub fn ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.keys()
    }

    /// Begin a reload pass: bumps the parse generation that freshly parsed
    /// classes will be stamped with
    pub fn begin_parse_pass(&mut self) -> u64 {
        self.parse_stamp += 1;
        self.parse_stamp
    }

    /// The current parse generation
    pub fn current_parse_stamp(&self) -> u64 {
        self.parse_stamp
    }

    /// Classes whose last parse predates the current generation
    ///
    /// After a full reload pass these are the defs that vanished from disk;
    /// the caller decides what to do with them.
    pub fn stale_ids(&self) -> Vec<ClassId> {
        self.classes
            .iter()
            .filter(|(_, class)| class.parse_stamp() < self.parse_stamp)
            .map(|(id, _)| id)
            .collect()
    }

    /// Parse one named def block into the registry
    ///
    /// Declares the class if needed and feeds it from the tokenizer. A
    /// parse error is returned to the caller, which typically logs it and
    /// continues with the next block; the class keeps its name but is left
    /// cleared.
    pub fn parse_def(
        &mut self,
        name: &str,
        tokenizer: &mut DefTokenizer<'_>,
    ) -> Result<ClassId, DefParseError> {
        let id = self.declare(name);

        // A re-parse invalidates the old inheritance linkage
        self.unlink_parent(id);

        let stamp = self.parse_stamp;
        let class = &mut self.classes[id];
        let result = class.parse_from_tokens(tokenizer);
        class.set_parse_stamp(stamp);

        self.changed.insert(id);
        result.map(|()| id)
    }

    /// Parse a whole def-file text: a sequence of `name { ... }` blocks
    ///
    /// Malformed blocks are logged and skipped; the rest of the file is
    /// still consumed. Returns the ids of all successfully parsed classes.
    pub fn parse_def_text(&mut self, text: &str) -> Vec<ClassId> {
        let mut tokenizer = DefTokenizer::new(text);
        let mut parsed = Vec::new();

        while let Some(name) = tokenizer.next_token() {
            match self.parse_def(&name, &mut tokenizer) {
                Ok(id) => parsed.push(id),
                Err(err) => {
                    log::warn!("[eclass] failed to parse entityDef {name}: {err}");
                }
            }
        }

        parsed
    }

    /// Resolve inheritance for every class of the current parse generation
    ///
    /// Parents are resolved before their children; a class already resolved
    /// this generation is left alone.
    pub fn resolve_all(&mut self) {
        let ids: Vec<ClassId> = self.classes.keys().collect();
        for id in ids {
            self.resolve_inheritance(id);
        }
    }

    /// Resolve inheritance for one class (recursively resolving the parent
    /// first), then derive model path, light flag, transparency and colour
    pub fn resolve_inheritance(&mut self, id: ClassId) {
        if self.classes[id].inheritance_resolved() {
            return;
        }

        // Guards against inheritance cycles in malformed data
        self.classes[id].set_inheritance_resolved(true);

        let own_name = self.classes[id].name().to_string();
        let parent_name = self.classes[id].local_attribute_value("inherit").to_string();

        // No parent, or a class trying to inherit itself
        if !parent_name.is_empty() && parent_name != own_name {
            if let Some(parent_id) = self.find(&parent_name) {
                // The parent must be fully resolved before the child reads
                // through it
                self.resolve_inheritance(parent_id);

                self.classes[id].set_parent(Some(parent_id));
                self.classes[parent_id].add_dependent(id);
            } else {
                log::warn!(
                    "[eclass] entity class {own_name} specifies unknown parent class {parent_name}"
                );
            }
        }

        // Model path may be inherited
        let model = self.attribute_value(id, "model", true).to_string();
        if !model.is_empty() {
            self.classes[id].set_model_path(model);
        }

        if self.attribute_value(id, "editor_light", true) == "1"
            || self.attribute_value(id, "spawnclass", true) == "idLight"
        {
            self.classes[id].set_is_light(true);
        }

        if self.attribute_value(id, "editor_transparent", true) == "1" {
            self.classes[id].set_colour_transparent(true);
        }

        // Colour inherits from the parent unless an explicit editor_color
        // is defined at this level
        let parent_colour = self.classes[id]
            .parent()
            .map(|parent_id| self.classes[parent_id].colour());
        self.classes[id].reset_colour(parent_colour);

        self.changed.insert(id);
    }

    /// Look up an attribute, delegating to the parent chain when
    /// `include_inherited` is set; returns the empty sentinel when absent
    pub fn attribute(
        &self,
        id: ClassId,
        name: &str,
        include_inherited: bool,
    ) -> &EntityClassAttribute {
        let mut current = Some(id);

        while let Some(class_id) = current {
            let class = &self.classes[class_id];

            if let Some(attr) = class.local_attribute(name) {
                return attr;
            }

            if !include_inherited {
                break;
            }

            current = class.parent();
        }

        &self.empty_attribute
    }

    /// Value of an attribute, empty string when absent
    pub fn attribute_value(&self, id: ClassId, name: &str, include_inherited: bool) -> &str {
        &self.attribute(id, name, include_inherited).value
    }

    /// Override a class display colour and cascade it through every
    /// descendant that does not define its own `editor_color`
    pub fn set_colour(&mut self, id: ClassId, colour: Vec4) {
        self.classes[id].set_colour(colour);
        self.changed.insert(id);
        self.cascade_colour(id);
    }

    /// True when the class has a fixed size: either flagged during parsing
    /// (lights, model classes) or carrying usable `editor_mins`/`editor_maxs`
    pub fn is_fixed_size(&self, id: ClassId) -> bool {
        if self.classes[id].fixed_size_flag() {
            return true;
        }

        // A single "?" means "not specified"
        self.attribute_value(id, "editor_mins", true).len() > 1
            && self.attribute_value(id, "editor_maxs", true).len() > 1
    }

    /// Bounds for fixed-size classes, from `editor_mins`/`editor_maxs`
    pub fn bounds(&self, id: ClassId) -> Option<Aabb> {
        if !self.is_fixed_size(id) {
            return None;
        }

        EntityClass::bounds_from_attributes(
            self.attribute_value(id, "editor_mins", true),
            self.attribute_value(id, "editor_maxs", true),
        )
    }

    /// True if this class is, or inherits from, the named class
    pub fn is_of_type(&self, id: ClassId, class_name: &str) -> bool {
        let mut current = Some(id);

        while let Some(class_id) = current {
            let class = &self.classes[class_id];
            if class.name() == class_name {
                return true;
            }
            current = class.parent();
        }

        false
    }

    /// Drain the set of classes whose resolved state changed
    pub fn drain_changed(&mut self) -> Vec<ClassId> {
        self.changed.drain().collect()
    }

    fn cascade_colour(&mut self, id: ClassId) {
        let dependents: Vec<ClassId> = self.classes[id].dependents().to_vec();
        let colour = self.classes[id].colour();

        for child in dependents {
            // A child with its own editor_color shields its subtree
            if self.classes[child].has_own_colour() {
                continue;
            }

            self.classes[child].set_colour(colour);
            self.changed.insert(child);
            self.cascade_colour(child);
        }
    }

    fn unlink_parent(&mut self, id: ClassId) {
        if let Some(parent_id) = self.classes[id].parent() {
            self.classes[parent_id].remove_dependent(id);
        }
        self.classes[id].set_parent(None);
    }
}

impl Default for EntityClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
