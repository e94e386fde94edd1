//! Entity-class subsystem
//!
//! Entity classes are the spawn-time templates of a map: each one carries
//! key/value attribute defaults, a display colour, a light flag and optional
//! model/attachment data, all parsed from def files and linked through
//! single-parent inheritance. Scene nodes query the registry ahead of
//! rendering to decide model, colour and shader state before submitting
//! geometry to the collector.

mod attachments;
mod attribute;
mod entity_class;
mod registry;
mod tokenizer;

pub use attachments::{AttachPos, AttachmentData, EntityAttachment};
pub use attribute::EntityClassAttribute;
pub use entity_class::{
    default_entity_colour, EntityClass, DEFAULT_FILL_SHADER, DEFAULT_WIRE_SHADER,
};
pub use registry::{ClassId, EntityClassRegistry};
pub use tokenizer::{DefParseError, DefTokenizer};
