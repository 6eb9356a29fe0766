//! # fabric-types — the wire contract for the tool-execution fabric
//!
//! Three value types form the wire contract between submitters,
//! workers, and collectors:
//!
//! | Type | Kind | Mutation |
//! |------|------|----------|
//! | [`WorkItem`] | transit value | never mutated |
//! | [`JobResult`] | transit value | never mutated |
//! | [`ToolMeta`] | directory entry | overwritten on re-registration |
//!
//! Each type carries an `IsValid`-equivalent [`WorkItem::validate`] /
//! [`JobResult::validate`] / [`ToolMeta::validate`] that the queue
//! client calls before placing a value on the wire — a failing value
//! is rejected locally and never published or pushed.
//!
//! This crate has no transport dependency: it is pure data plus
//! validation, shared by `fabric-queue` and `fabric-worker`.

#![deny(missing_docs)]

pub mod error;
pub mod id;
pub mod job_result;
pub mod tool_meta;
pub mod work_item;

pub use error::ValidationError;
pub use id::{JobId, ToolName, WorkerId};
pub use job_result::JobResult;
pub use tool_meta::ToolMeta;
pub use work_item::WorkItem;
