//! Incremental renderer turning a restricted HTML dialect into a stream of
//! styled text runs and inline placeholders, ready for a rich-text viewport.
//!
//! The [`Renderer`] consumes document chunks (any chunking yields the same
//! output), normalizes block boundaries and whitespace, tracks nested lists
//! and forms, and records images and interactive controls as placeholders.
//! Link activation and form submission are resolved on demand from the
//! accumulated state. Parsing never fails; malformed input degrades locally.

mod context;
mod entities;
mod form;
mod lists;
mod output;
mod renderer;
mod tokenizer;
mod types;

pub use crate::context::TagKind;
pub use crate::form::{FieldValueSource, FormData, KeyNotFound};
pub use crate::lists::ListKind;
pub use crate::output::{
    ControlId, ControlKind, ControlPlaceholder, ImageHandle, ImagePlaceholder, LIST_BULLET, NBSP,
    OutputItem, SPACER, StyledRun, TagSet,
};
pub use crate::renderer::{ControlValueSource, Renderer, Submission, is_link_like};
pub use crate::tokenizer::Tokenizer;
pub use crate::types::{AttrList, Token, attr_value, has_attr};
