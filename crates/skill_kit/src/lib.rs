//! Event dispatch, response building, and localization for voice-skill
//! functions.
//!
//! A skill registers named handlers, optionally scoped to a conversation
//! state, and [`Skill::handle`] routes each inbound request envelope to the
//! right one. Handlers read the event and mutable session attributes, build
//! a response with [`ResponseBuilder`], or emit another named event to chain
//! into a different handler.

pub mod attributes;
pub mod dispatch;
pub mod i18n;
pub mod response;

pub use attributes::AttributeStore;
pub use dispatch::{
    Handler, HandlerContext, HandlerOutcome, HandlerRegistry, Skill, SkillError, STATE_ATTRIBUTE,
};
pub use i18n::Translator;
pub use response::{CardImage, ResponseBuilder};
