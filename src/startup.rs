//! Capture `argc`, `argv` and `envp` exactly as the process received them.
//!
//! `std::env::args` hands out owned copies, which is useless when the point is to look at where
//! the kernel put things. Two ways of getting at the originals are supported:
//!
//! - glibc calls `.init_array` constructors with `(argc, argv, envp)`, so on `target_env="gnu"` a
//!   constructor stashes them before `main` runs.
//! - Everywhere else we walk backwards from the startup `environ`: the word before envp is the
//!   NULL ending argv, and below the argv pointers sits `argc`, the only word in that stretch
//!   whose value equals the number of pointers skipped so far.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering};

use super::environ;

/// Give up on the backwards walk after this many words.
const MAX_ARGS: usize = 1 << 20;

static CAPTURED: AtomicBool = AtomicBool::new(false);
static ARGC: AtomicUsize = AtomicUsize::new(0);
static ARGV: AtomicPtr<*const c_char> = AtomicPtr::new(std::ptr::null_mut());
static ENVP: AtomicPtr<*const c_char> = AtomicPtr::new(std::ptr::null_mut());

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[link_section = ".init_array.00099"]
#[used]
static ARGV_INIT_ARRAY: extern "C" fn(
    std::os::raw::c_int,
    *const *const c_char,
    *const *const c_char,
) = capture_init;

#[cfg(all(target_os = "linux", target_env = "gnu"))]
extern "C" fn capture_init(
    argc: std::os::raw::c_int,
    argv: *const *const c_char,
    envp: *const *const c_char,
) {
    ARGC.store(argc.max(0) as usize, Ordering::Relaxed);
    ARGV.store(argv as *mut _, Ordering::Relaxed);
    ENVP.store(envp as *mut _, Ordering::Relaxed);
    CAPTURED.store(true, Ordering::Release);
}

/// Where a `Startup` came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    InitArray,
    Stack,
    /// Built by the caller via `Startup::from_raw`.
    Raw,
}

/// The startup argument vector and environment pointer of a process.
#[derive(Debug, Clone, Copy)]
pub struct Startup {
    argc: usize,
    argv: *const *const c_char,
    envp: *const *const c_char,
    source: Source,
}

impl Startup {
    /// Capture this process's startup state.
    ///
    /// Returns `None` if the constructor never ran and the stack walk could not find `argc`.
    /// The stack walk relies on `environ` still pointing at the initial stack, so call this
    /// before anything modifies the environment.
    pub fn capture() -> Option<Startup> {
        if CAPTURED.load(Ordering::Acquire) {
            let startup = Startup {
                argc: ARGC.load(Ordering::Relaxed),
                argv: ARGV.load(Ordering::Relaxed),
                envp: ENVP.load(Ordering::Relaxed),
                source: Source::InitArray,
            };
            debug!("startup captured by constructor: argc={}", startup.argc);
            return Some(startup);
        }

        let envp = environ::raw_environ();
        if envp.is_null() {
            warn!("environ is NULL, cannot locate argv");
            return None;
        }
        let startup = unsafe { Startup::from_envp(envp) };
        match startup {
            Some(s) => debug!("startup found on stack: argc={}", s.argc),
            None => warn!("could not find argc below envp {:p}", envp),
        }
        startup
    }

    /// Locate argv and argc by walking backwards from an envp on the initial stack.
    ///
    /// # Safety
    ///
    /// `envp` must be the environment array the kernel placed on the initial stack, preceded by
    /// the NULL-terminated argv array and `argc`.
    pub unsafe fn from_envp(envp: *const *const c_char) -> Option<Startup> {
        let mut slot = envp.sub(1);
        if !(*slot).is_null() {
            return None;
        }

        let mut count = 0;
        while count <= MAX_ARGS {
            slot = slot.sub(1);
            if *(slot as *const usize) == count {
                return Some(Startup {
                    argc: count,
                    argv: slot.add(1),
                    envp,
                    source: Source::Stack,
                });
            }
            if (*slot).is_null() {
                return None;
            }
            count += 1;
        }
        None
    }

    /// Wrap an argv/envp pair supplied by the caller.
    ///
    /// # Safety
    ///
    /// `argv` must hold `argc` valid C string pointers, and everything must outlive the
    /// `Startup` and anything borrowed from it.
    pub unsafe fn from_raw(
        argc: usize,
        argv: *const *const c_char,
        envp: *const *const c_char,
    ) -> Startup {
        Startup {
            argc,
            argv,
            envp,
            source: Source::Raw,
        }
    }

    pub fn argc(&self) -> usize {
        self.argc
    }

    pub fn argv(&self) -> *const *const c_char {
        self.argv
    }

    /// The environment array as it was at startup, which may differ from the current `environ`.
    pub fn envp(&self) -> *const *const c_char {
        self.envp
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn args(&self) -> Args<'_> {
        Args {
            argv: self.argv,
            index: 0,
            argc: self.argc,
            _startup: PhantomData,
        }
    }
}

/// One element of argv.
#[derive(Debug, Clone, Copy)]
pub struct ArgSlot<'a> {
    pub index: usize,
    /// Address of the pointer inside the argv array (`argv + index`).
    pub slot: *const *const c_char,
    /// The pointer held in that slot (`argv[index]`).
    pub ptr: *const c_char,
    pub value: &'a CStr,
}

pub struct Args<'a> {
    argv: *const *const c_char,
    index: usize,
    argc: usize,
    _startup: PhantomData<&'a Startup>,
}

impl<'a> Iterator for Args<'a> {
    type Item = ArgSlot<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.argc {
            let index = self.index;
            self.index += 1;
            unsafe {
                let slot = self.argv.add(index);
                let ptr = *slot;
                if ptr.is_null() {
                    // argv[argc] is NULL; anything before it shouldn't be, but don't deref it
                    continue;
                }
                return Some(ArgSlot {
                    index,
                    slot,
                    ptr,
                    value: CStr::from_ptr(ptr),
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.argc - self.index))
    }
}
