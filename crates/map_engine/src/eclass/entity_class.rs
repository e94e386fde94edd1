//! Entity class definitions
//!
//! An entity class is a named template of spawn-time attributes (model,
//! colour, light flag, key/value defaults) parsed from def-file blocks and
//! inherited by map entities. Parsing and per-class state live here; the
//! inheritance chain is resolved by the
//! [`EntityClassRegistry`](super::EntityClassRegistry), which owns
//! all classes.

use std::collections::HashMap;

use crate::eclass::attachments::AttachmentData;
use crate::eclass::attribute::EntityClassAttribute;
use crate::eclass::registry::ClassId;
use crate::eclass::tokenizer::{DefParseError, DefTokenizer};
use crate::foundation::math::{parse_vec3, Aabb, Vec4};

/// Default display colour for classes that never specify `editor_color`
pub fn default_entity_colour() -> Vec4 {
    Vec4::new(0.3, 0.3, 1.0, 1.0)
}

/// Fallback wireframe shader name when no colour has been resolved yet
pub const DEFAULT_WIRE_SHADER: &str = "<0.3 0.3 1>";

/// Fallback fill shader name when no colour has been resolved yet
pub const DEFAULT_FILL_SHADER: &str = "(0.3 0.3 1)";

/// A single entity class parsed from a def file
#[derive(Debug)]
pub struct EntityClass {
    name: String,

    parent: Option<ClassId>,

    // Classes that resolved this class as their parent; colour edits
    // cascade through this list.
    dependents: Vec<ClassId>,

    // Attributes in first-seen order, with a case-insensitive name index
    attributes: Vec<EntityClassAttribute>,
    attr_index: HashMap<String, usize>,

    is_light: bool,
    fixed_size: bool,

    colour: Vec4,
    colour_transparent: bool,
    fill_shader: String,
    wire_shader: String,

    model: String,
    skin: String,
    mod_name: String,

    attachments: AttachmentData,

    inheritance_resolved: bool,
    parse_stamp: u64,
}

impl EntityClass {
    /// Create a new entity class
    pub fn new(name: impl Into<String>, fixed_size: bool) -> Self {
        let mut class = Self {
            name: name.into(),
            parent: None,
            dependents: Vec::new(),
            attributes: Vec::new(),
            attr_index: HashMap::new(),
            is_light: false,
            fixed_size,
            colour: default_entity_colour(),
            colour_transparent: false,
            fill_shader: String::new(),
            wire_shader: String::new(),
            model: String::new(),
            skin: String::new(),
            mod_name: "base".to_string(),
            attachments: AttachmentData::new(),
            inheritance_resolved: false,
            parse_stamp: 0,
        };
        class.rebuild_colour_shaders();
        class
    }

    /// The unique class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved parent class, if inheritance has been resolved
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ClassId>) {
        self.parent = parent;
    }

    pub(crate) fn dependents(&self) -> &[ClassId] {
        &self.dependents
    }

    pub(crate) fn add_dependent(&mut self, child: ClassId) {
        if !self.dependents.contains(&child) {
            self.dependents.push(child);
        }
    }

    pub(crate) fn remove_dependent(&mut self, child: ClassId) {
        self.dependents.retain(|id| *id != child);
    }

    /// True if this class should be treated as a light
    pub fn is_light(&self) -> bool {
        self.is_light
    }

    pub(crate) fn set_is_light(&mut self, value: bool) {
        self.is_light = value;
        // Lights are always fixed size
        if value {
            self.fixed_size = true;
        }
    }

    /// The fixed-size flag as set by parsing (lights, model classes)
    ///
    /// The full fixed-size query also considers inherited
    /// `editor_mins`/`editor_maxs`, see
    /// [`EntityClassRegistry::is_fixed_size`](super::EntityClassRegistry::is_fixed_size).
    pub fn fixed_size_flag(&self) -> bool {
        self.fixed_size
    }

    /// The resolved display colour
    pub fn colour(&self) -> Vec4 {
        self.colour
    }

    /// True if the resolved colour renders translucent
    pub fn colour_transparent(&self) -> bool {
        self.colour_transparent
    }

    pub(crate) fn set_colour_transparent(&mut self, value: bool) {
        self.colour_transparent = value;
        self.rebuild_colour_shaders();
    }

    /// Set the resolved display colour and refresh the derived shader names
    pub fn set_colour(&mut self, colour: Vec4) {
        self.colour = colour;
        self.rebuild_colour_shaders();
    }

    /// Shader name for filled display of this class
    pub fn fill_shader(&self) -> &str {
        if self.fill_shader.is_empty() {
            DEFAULT_FILL_SHADER
        } else {
            &self.fill_shader
        }
    }

    /// Shader name for wireframe display of this class
    pub fn wire_shader(&self) -> &str {
        if self.wire_shader.is_empty() {
            DEFAULT_WIRE_SHADER
        } else {
            &self.wire_shader
        }
    }

    /// The model path, if any
    pub fn model_path(&self) -> &str {
        &self.model
    }

    /// Set a model on this entity class
    pub fn set_model_path(&mut self, path: impl Into<String>) {
        // A model implies fixed size
        self.fixed_size = true;
        self.model = path.into();
    }

    /// The skin name, if any
    pub fn skin(&self) -> &str {
        &self.skin
    }

    /// Set the skin
    pub fn set_skin(&mut self, skin: impl Into<String>) {
        self.skin = skin.into();
    }

    /// Name of the mod owning this class
    pub fn mod_name(&self) -> &str {
        &self.mod_name
    }

    /// Set the owning mod name
    pub fn set_mod_name(&mut self, mod_name: impl Into<String>) {
        self.mod_name = mod_name.into();
    }

    /// Attachment data parsed from the def block
    pub fn attachments(&self) -> &AttachmentData {
        &self.attachments
    }

    /// True once the registry has resolved this class for the current
    /// parse generation
    pub fn inheritance_resolved(&self) -> bool {
        self.inheritance_resolved
    }

    pub(crate) fn set_inheritance_resolved(&mut self, value: bool) {
        self.inheritance_resolved = value;
    }

    /// The parse generation this class was last fed from tokens
    pub fn parse_stamp(&self) -> u64 {
        self.parse_stamp
    }

    pub(crate) fn set_parse_stamp(&mut self, stamp: u64) {
        self.parse_stamp = stamp;
    }

    /// Insert an attribute without overwriting previous values
    ///
    /// If the attribute already exists, an empty description may be filled
    /// in and a generic "text" type may be upgraded to a more descriptive
    /// one; the value is left alone.
    pub fn add_attribute(&mut self, attribute: EntityClassAttribute) {
        let key = attribute.name.to_ascii_lowercase();

        if let Some(&index) = self.attr_index.get(&key) {
            let existing = &mut self.attributes[index];

            if !attribute.description.is_empty() && existing.description.is_empty() {
                existing.description = attribute.description;
            }

            if attribute.attr_type != "text" && existing.attr_type == "text" {
                existing.attr_type = attribute.attr_type;
            }
        } else {
            self.attr_index.insert(key, self.attributes.len());
            self.attributes.push(attribute);
        }
    }

    /// Look up an attribute on this class only (no inheritance),
    /// case-insensitively
    pub fn local_attribute(&self, name: &str) -> Option<&EntityClassAttribute> {
        self.attr_index
            .get(&name.to_ascii_lowercase())
            .map(|&index| &self.attributes[index])
    }

    /// Value of an attribute on this class only, empty string when absent
    pub fn local_attribute_value(&self, name: &str) -> &str {
        self.local_attribute(name).map_or("", |attr| attr.value.as_str())
    }

    /// All attributes of this class in first-seen order
    pub fn attributes(&self) -> &[EntityClassAttribute] {
        &self.attributes
    }

    /// Recompute the resolved colour from the own `editor_color` attribute,
    /// falling back to the parent's resolved colour, then to the default
    ///
    /// The parent colour is passed in by the registry, which owns the
    /// inheritance chain.
    pub(crate) fn reset_colour(&mut self, parent_colour: Option<Vec4>) {
        if let Some(own) = parse_vec3(self.local_attribute_value("editor_color")) {
            self.set_colour(Vec4::new(own.x, own.y, own.z, 1.0));
        } else if let Some(colour) = parent_colour {
            self.set_colour(colour);
        } else {
            self.set_colour(default_entity_colour());
        }
    }

    /// True if this class defines its own `editor_color`
    pub fn has_own_colour(&self) -> bool {
        parse_vec3(self.local_attribute_value("editor_color")).is_some()
    }

    /// Bounds from own `editor_mins`/`editor_maxs` attributes, if both parse
    pub(crate) fn bounds_from_attributes(mins: &str, maxs: &str) -> Option<Aabb> {
        Some(Aabb::new(parse_vec3(mins)?, parse_vec3(maxs)?))
    }

    /// Initialise this class from a `{ key value ... }` token block
    ///
    /// All previous state except the name is cleared first, so a class can
    /// be refreshed in place when its def file is reloaded.
    pub fn parse_from_tokens(&mut self, tokenizer: &mut DefTokenizer<'_>) -> Result<(), DefParseError> {
        self.clear();

        // The name has already been consumed by the registry
        tokenizer.assert_next("{")?;

        loop {
            let key = tokenizer.expect_token()?;
            if key == "}" {
                break;
            }

            let value = tokenizer.expect_token()?;

            // Handle some keys specially
            if key == "model" {
                self.set_model_path(standard_path(&value));
            } else if key == "skin" {
                self.set_skin(value.clone());
            } else if key == "editor_color" {
                if let Some(colour) = parse_vec3(&value) {
                    self.set_colour(Vec4::new(colour.x, colour.y, colour.z, 1.0));
                }
            } else if key == "editor_light" {
                self.set_is_light(value == "1");
            } else if key == "spawnclass" {
                self.set_is_light(value == "idLight");
            } else if key.to_ascii_lowercase().starts_with("editor_") {
                self.parse_editor_spawnarg(&key, &value);
            }

            // Attachment key families are collected for the two-phase build
            // and stored as ordinary attributes as well
            self.attachments.parse_def_attach_key(&key, &value);

            let existing_value_empty = self
                .local_attribute(&key)
                .map(|attr| attr.value.is_empty());

            match existing_value_empty {
                // Attribute does not exist yet, add it
                None => {
                    self.add_attribute(EntityClassAttribute::new("text", key, value, ""));
                }
                // Declared (e.g. by an editor_ spawnarg) but valueless, set the value
                Some(true) => {
                    let index = self.attr_index[&key.to_ascii_lowercase()];
                    self.attributes[index].value = value;
                }
                // Both type and value present, first write wins
                Some(false) => {
                    log::warn!(
                        "[eclass] attribute {key} already set on entityclass {}",
                        self.name
                    );
                }
            }
        }

        // All keys seen, attachment positions can now be indexed by name
        self.attachments.validate(&self.name);

        Ok(())
    }

    // "editor_yyy" keys declare value-less attributes for the entity
    // inspector: "editor_bool myVariable" declares attribute "myVariable"
    // of type "bool" with the key's value as description.
    fn parse_editor_spawnarg(&mut self, key: &str, value: &str) {
        // Locate the space after "editor_"; keys without one
        // (e.g. "editor_displayFolder") declare nothing
        let Some(space_pos) = key[7..].find(' ').map(|idx| idx + 7) else {
            return;
        };

        let attr_name = &key[space_pos + 1..];
        let mut attr_type = &key[7..space_pos];

        if attr_name.is_empty() || attr_type == "setKeyValue" {
            return;
        }

        if attr_type == "var" || attr_type == "string" {
            attr_type = "text";
        }

        self.add_attribute(EntityClassAttribute::new(attr_type, attr_name, "", value));
    }

    // Reset all contents except the name, ready for a re-parse
    fn clear(&mut self) {
        self.is_light = false;
        self.colour = default_entity_colour();
        self.colour_transparent = false;
        self.fixed_size = false;
        self.attributes.clear();
        self.attr_index.clear();
        self.model.clear();
        self.skin.clear();
        self.mod_name = "base".to_string();
        self.attachments.clear();
        self.inheritance_resolved = false;
        self.rebuild_colour_shaders();
    }

    fn rebuild_colour_shaders(&mut self) {
        let (r, g, b) = (self.colour.x, self.colour.y, self.colour.z);

        self.fill_shader = if self.colour_transparent {
            format!("[{r} {g} {b}]")
        } else {
            format!("({r} {g} {b})")
        };

        self.wire_shader = format!("<{r} {g} {b}>");
    }
}

// Def files written on other platforms use backslash path separators
fn standard_path(path: &str) -> String {
    path.replace('\\', "/")
}
