//! Hide, install, remove and restore a method in one method table.

use super::StubState;
use crate::result::{StubbaError, StubbaResult};
use crate::runtime::{Method, MethodBody, MethodTable, MethodTableRef};
use std::cell::RefMut;

/// Swaps a trampoline in for the method `method_name` of one table and back.
///
/// The captured original keeps its visibility; installation always makes a
/// method public, so restoring reapplies a non-public visibility afterwards.
#[derive(Debug)]
pub struct MethodSwap {
    table: MethodTableRef,
    method_name: String,
    original: Option<Method>,
    state: StubState,
}

impl MethodSwap {
    /// Prepare a swap of `method_name` in `table`
    #[must_use]
    pub fn new(table: MethodTableRef, method_name: &str) -> Self {
        Self {
            table,
            method_name: method_name.to_string(),
            original: None,
            state: StubState::Pending,
        }
    }

    /// Method being swapped
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Lifecycle state
    #[must_use]
    pub const fn state(&self) -> StubState {
        self.state
    }

    /// Whether an original method was captured and not yet restored
    #[must_use]
    pub const fn has_original(&self) -> bool {
        self.original.is_some()
    }

    /// Capture and remove the method defined directly in the table, if any
    pub fn hide(&mut self) -> StubbaResult<()> {
        let mut table = borrow_table(&self.table, &self.method_name)?;
        self.original = table.remove(&self.method_name).ok();
        self.state = StubState::Hidden;
        Ok(())
    }

    /// Install `body` under the method name
    pub fn install(&mut self, body: MethodBody) -> StubbaResult<()> {
        let mut table = borrow_table(&self.table, &self.method_name)?;
        table.define(Method::from_body(&self.method_name, body));
        self.state = StubState::Installed;
        Ok(())
    }

    /// Remove the installed method; an absent method is fine
    pub fn remove(&mut self) -> StubbaResult<()> {
        let mut table = borrow_table(&self.table, &self.method_name)?;
        let _ = table.remove(&self.method_name);
        self.state = StubState::Removed;
        Ok(())
    }

    /// Reinstall the captured original with its visibility; without one the
    /// name stays undefined
    pub fn restore(&mut self) -> StubbaResult<()> {
        let mut table = borrow_table(&self.table, &self.method_name)?;
        if let Some(original) = self.original.take() {
            let visibility = original.visibility();
            table.define(original);
            if !visibility.is_public() {
                table.set_visibility(&self.method_name, visibility)?;
            }
        }
        self.state = StubState::Restored;
        Ok(())
    }
}

fn borrow_table<'a>(
    table: &'a MethodTableRef,
    method_name: &str,
) -> StubbaResult<RefMut<'a, MethodTable>> {
    table
        .try_borrow_mut()
        .map_err(|_| StubbaError::MethodTableBusy {
            method: method_name.to_string(),
        })
}
