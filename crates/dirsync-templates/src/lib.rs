//! Mailbox signature rendering
//!
//! Signatures are Handlebars templates named after a profile's style key:
//! a user whose `signature` is `default` gets `<folder>/default.hbs`.

pub mod renderer;

pub use renderer::{HandlebarsSignatureRenderer, SignatureContext, TemplateLoadError, TEMPLATE_EXTENSION};
