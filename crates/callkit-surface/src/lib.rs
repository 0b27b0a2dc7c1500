//! # callkit-surface
//!
//! Thin front ends over the [`Wrapper`](callkit_engine::Wrapper) contract:
//! a command dispatcher, a framework-neutral HTTP adapter and an HTML form
//! renderer. None of them coerce anything themselves; they collect text
//! arguments and hand them to a wrapper.

pub mod cli;
pub mod form;
pub mod http;
pub mod message;

pub use cli::{validate_command_name, Dispatcher};
pub use form::{form_fields, render_form, submit, FormField, InputKind};
pub use http::{ArgumentSource, HttpHandler, HttpRequest, HttpResponse, ResultWriter};
pub use message::user_message;
