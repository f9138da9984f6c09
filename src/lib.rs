//! Inspect the startup state of the current process: the argument vector, the auxiliary vector
//! and the environment block, along with the raw address of every element.
//!
//! The pieces are exposed separately so they can be combined as needed:
//!
//! - `startup` captures `argc`, `argv` and `envp` as the process received them.
//! - `environ` walks a NULL-terminated environment block and looks names up in it the way
//!   `getenv(3)` does, without modifying any environment string.
//! - `getauxval`, `procfs` and `stack` read the auxiliary vector three different ways: through
//!   libc, through `/proc/self/auxv`, and by walking past the end of the startup envp array.
//! - `report` renders all of the above.
//!
//! Only Linux (or more generally, ELF with a SysV-style initial stack) is supported.

extern crate byteorder;
extern crate libc;
#[macro_use]
extern crate log;

use libc::c_ulong;

pub mod config;
pub mod environ;
pub mod error;
pub mod getauxval;
pub mod logger;
pub mod procfs;
pub mod report;
pub mod stack;
pub mod startup;

/// The type used in auxv keys and values.
pub type AuxvType = c_ulong;

/// A pair of a key and value from the aux vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuxvPair {
    pub key: AuxvType,
    pub value: AuxvType,
}

// from [linux]/include/uapi/linux/auxvec.h
/// Terminates the aux vector. Never a valid lookup key.
pub const AT_NULL: AuxvType = 0;
pub const AT_IGNORE: AuxvType = 1;
pub const AT_EXECFD: AuxvType = 2;
pub const AT_PHDR: AuxvType = 3;
pub const AT_PHENT: AuxvType = 4;
pub const AT_PHNUM: AuxvType = 5;
pub const AT_PAGESZ: AuxvType = 6;
pub const AT_BASE: AuxvType = 7;
pub const AT_FLAGS: AuxvType = 8;
pub const AT_ENTRY: AuxvType = 9;
pub const AT_NOTELF: AuxvType = 10;
pub const AT_UID: AuxvType = 11;
pub const AT_EUID: AuxvType = 12;
pub const AT_GID: AuxvType = 13;
pub const AT_EGID: AuxvType = 14;
pub const AT_PLATFORM: AuxvType = 15;
/// First 32 bits of HWCAP even on platforms where unsigned long is 64 bits.
pub const AT_HWCAP: AuxvType = 16;
pub const AT_CLKTCK: AuxvType = 17;
pub const AT_SECURE: AuxvType = 23;
pub const AT_BASE_PLATFORM: AuxvType = 24;
pub const AT_RANDOM: AuxvType = 25;
pub const AT_HWCAP2: AuxvType = 26;
/// Pointer to the filename the process was executed with.
pub const AT_EXECFN: AuxvType = 31;
pub const AT_SYSINFO: AuxvType = 32;
pub const AT_SYSINFO_EHDR: AuxvType = 33;
pub const AT_MINSIGSTKSZ: AuxvType = 51;

/// The conventional name of an auxv key, if it is one we know about.
pub fn key_name(key: AuxvType) -> Option<&'static str> {
    let name = match key {
        AT_NULL => "AT_NULL",
        AT_IGNORE => "AT_IGNORE",
        AT_EXECFD => "AT_EXECFD",
        AT_PHDR => "AT_PHDR",
        AT_PHENT => "AT_PHENT",
        AT_PHNUM => "AT_PHNUM",
        AT_PAGESZ => "AT_PAGESZ",
        AT_BASE => "AT_BASE",
        AT_FLAGS => "AT_FLAGS",
        AT_ENTRY => "AT_ENTRY",
        AT_NOTELF => "AT_NOTELF",
        AT_UID => "AT_UID",
        AT_EUID => "AT_EUID",
        AT_GID => "AT_GID",
        AT_EGID => "AT_EGID",
        AT_PLATFORM => "AT_PLATFORM",
        AT_HWCAP => "AT_HWCAP",
        AT_CLKTCK => "AT_CLKTCK",
        AT_SECURE => "AT_SECURE",
        AT_BASE_PLATFORM => "AT_BASE_PLATFORM",
        AT_RANDOM => "AT_RANDOM",
        AT_HWCAP2 => "AT_HWCAP2",
        AT_EXECFN => "AT_EXECFN",
        AT_SYSINFO => "AT_SYSINFO",
        AT_SYSINFO_EHDR => "AT_SYSINFO_EHDR",
        AT_MINSIGSTKSZ => "AT_MINSIGSTKSZ",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_name_known_keys() {
        assert_eq!(Some("AT_EXECFN"), key_name(AT_EXECFN));
        assert_eq!(Some("AT_HWCAP"), key_name(16));
        assert_eq!(Some("AT_NULL"), key_name(0));
    }

    #[test]
    fn key_name_unknown_key() {
        assert_eq!(None, key_name(555555555));
    }
}
