//! Read auxv entries by chasing pointers in the ELF initial stack layout.
//!
//! The kernel lays out the initial stack as `argc`, the argv pointers, a NULL, the envp pointers,
//! a NULL, and then the auxv pairs terminated by `AT_NULL`. Starting from envp, skipping to the
//! first NULL and one word further lands on the first auxv key.
//!
//! This only works with the envp the process started with. `setenv` and friends may move
//! `environ` to a heap copy, after which walking past its end reads garbage. That's why the walk
//! takes an explicit envp (normally `Startup::envp`) instead of reading `environ` itself.

use std::os::raw::c_char;

use super::{AuxvPair, AuxvType, AT_NULL};

/// Returns an iterator across the auxv entries that follow `envp` on the stack.
///
/// # Safety
///
/// `envp` must be the NULL-terminated environment array the kernel placed on the initial stack.
pub unsafe fn iterate_stack_auxv(envp: *const *const c_char) -> StackAuxvIter {
    StackAuxvIter {
        auxv_key_ptr: get_auxv_ptr(envp),
    }
}

/// An iterator across auxv pairs from crawling the ELF stack.
pub struct StackAuxvIter {
    auxv_key_ptr: *const AuxvType,
}

impl StackAuxvIter {
    /// Address of the next pair to be yielded (or of the `AT_NULL` terminator).
    pub fn position(&self) -> *const AuxvType {
        self.auxv_key_ptr
    }
}

impl Iterator for StackAuxvIter {
    type Item = AuxvPair;

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let key = *self.auxv_key_ptr;
            if key == AT_NULL {
                return None;
            }
            let value = *self.auxv_key_ptr.add(1);
            self.auxv_key_ptr = self.auxv_key_ptr.add(2);

            Some(AuxvPair { key, value })
        }
    }
}

/// returns a pointer to the first entry in the auxv table
/// (specifically, the key in the first key / value pair)
unsafe fn get_auxv_ptr(envp: *const *const c_char) -> *const AuxvType {
    let mut env_entry_ptr = envp;
    while !(*env_entry_ptr).is_null() {
        env_entry_ptr = env_entry_ptr.add(1);
    }
    // now at the NULL after the environment listing; auxv starts one word later
    env_entry_ptr.add(1) as *const AuxvType
}
