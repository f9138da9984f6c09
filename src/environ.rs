//! Walk a NULL-terminated environment block and look names up in it.
//!
//! Nothing here writes to the block: an entry's name is the slice before its first `=`, so the
//! strings stay intact for anyone reading them afterwards (including the stack auxv walk, which
//! needs `environ` untouched).

use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::ptr;

extern "C" {
    static environ: *const *const c_char;
}

/// The current value of libc's `environ`.
pub fn raw_environ() -> *const *const c_char {
    unsafe { environ }
}

/// Split `NAME=value` at the first `=`.
///
/// An entry with no `=` is all name and has no value.
pub fn split_entry(entry: &[u8]) -> (&[u8], Option<&[u8]>) {
    match entry.iter().position(|&b| b == b'=') {
        Some(eq) => (&entry[..eq], Some(&entry[eq + 1..])),
        None => (entry, None),
    }
}

/// A NULL-terminated array of `NAME=value` C strings.
#[derive(Debug, Clone, Copy)]
pub struct EnvBlock<'a> {
    head: *const *const c_char,
    _strings: PhantomData<&'a CStr>,
}

impl EnvBlock<'static> {
    /// The block `environ` currently points at.
    pub fn current() -> EnvBlock<'static> {
        unsafe { EnvBlock::from_raw(raw_environ()) }
    }
}

impl<'a> EnvBlock<'a> {
    /// # Safety
    ///
    /// `head` must be NULL or point at a NULL-terminated array of valid C strings that live for
    /// `'a` and are not modified meanwhile.
    pub unsafe fn from_raw(head: *const *const c_char) -> EnvBlock<'a> {
        EnvBlock {
            head,
            _strings: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const *const c_char {
        self.head
    }

    pub fn entries(&self) -> Entries<'a> {
        Entries {
            slot: self.head,
            _strings: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Find `name` the way `getenv(3)` does: the first entry whose name matches exactly.
    ///
    /// The returned pointer addresses the value inside the environment string itself, one byte
    /// past the `=`. Empty names and names containing `=` never match; that follows musl, where
    /// glibc would match `A=b` against the entry `A=b=c`.
    pub fn lookup(&self, name: &[u8]) -> Option<EnvValue<'a>> {
        if name.is_empty() || name.contains(&b'=') {
            return None;
        }
        self.entries()
            .find(|e| e.name() == name && e.value().is_some())
            .map(|e| {
                let ptr = unsafe { e.ptr.add(name.len() + 1) };
                EnvValue {
                    ptr,
                    value: unsafe { CStr::from_ptr(ptr) },
                }
            })
    }
}

/// One element of an environment block.
#[derive(Debug, Clone, Copy)]
pub struct EnvEntry<'a> {
    /// Address of the pointer inside the block.
    pub slot: *const *const c_char,
    /// The pointer held in that slot, i.e. the start of `NAME=value`.
    pub ptr: *const c_char,
    pub entry: &'a CStr,
}

impl<'a> EnvEntry<'a> {
    pub fn name(&self) -> &'a [u8] {
        split_entry(self.entry.to_bytes()).0
    }

    pub fn value(&self) -> Option<&'a [u8]> {
        split_entry(self.entry.to_bytes()).1
    }
}

/// The result of a successful lookup.
#[derive(Debug, Clone, Copy)]
pub struct EnvValue<'a> {
    pub ptr: *const c_char,
    pub value: &'a CStr,
}

pub struct Entries<'a> {
    slot: *const *const c_char,
    _strings: PhantomData<&'a CStr>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = EnvEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.slot.is_null() {
            return None;
        }
        unsafe {
            let ptr = *self.slot;
            if ptr.is_null() {
                self.slot = ptr::null();
                return None;
            }
            let slot = self.slot;
            self.slot = slot.add(1);
            Some(EnvEntry {
                slot,
                ptr,
                entry: CStr::from_ptr(ptr),
            })
        }
    }
}
