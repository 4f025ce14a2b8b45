//! Prompt composition crate for the handbook agent.
//!
//! Provides the provenance tags, the four tier-keyed prompt templates, and
//! the Handlebars rendering that turns (context, question, style) into the
//! final user message for the generation client.

pub mod builder;
pub mod provenance;
pub mod templates;

pub use builder::build_prompt;
pub use provenance::Provenance;
pub use templates::ResponseStyle;
