//! Dynamic Object Model
//!
//! Rust has no way to swap a compiled method out from under its callers, so
//! code that wants to be stubbed dispatches through this small object model
//! instead: classes and objects own method tables, calls look methods up by
//! name, and a stub is an entry swapped into one of those tables.
//!
//! ## Lookup
//!
//! - Objects: singleton table, then the class and its superclasses
//! - Classes: class-level table, then superclasses' class-level tables
//! - Modules: their own class-level table only

mod class;
mod method;
mod object;
mod receiver;

use std::sync::atomic::{AtomicU64, Ordering};

pub use class::{Class, ClassKind, ClassRef};
pub use method::{Block, Method, MethodBody, MethodTable, MethodTableRef, Visibility};
pub use object::{Object, ObjectRef};
pub use receiver::Receiver;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}
