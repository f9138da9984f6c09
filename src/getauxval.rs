//! Read auxv entries one at a time via `getauxval`.
//!
//! Access goes through the trait `Getauxval` so the lookup can be swapped out. On
//! `target_os="linux"` the struct `NativeGetauxval` calls through to libc's `getauxval(3)`.
//! `NotAvailableGetauxval` always reports that the function is missing, which is handy both on
//! other OSs and for exercising the "no AT_EXECFN" rendering path.

use std::ffi::CStr;
use std::os::raw::c_char;

use super::{AuxvType, AT_EXECFN};

/// Errors from invoking `getauxval`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GetauxvalError {
    /// getauxval() is not available at runtime
    FunctionNotAvailable,
    /// getauxval() could not find the requested key
    NotFound,
    /// getauxval() encountered a different error
    UnknownError,
}

pub trait Getauxval {
    /// Look up an entry in the auxiliary vector. See getauxval(3) in glibc.
    fn getauxval(&self, key: AuxvType) -> Result<AuxvType, GetauxvalError>;
}

/// A stub implementation that always returns `FunctionNotAvailable`.
pub struct NotAvailableGetauxval {}

impl Getauxval for NotAvailableGetauxval {
    fn getauxval(&self, _: AuxvType) -> Result<AuxvType, GetauxvalError> {
        Err(GetauxvalError::FunctionNotAvailable)
    }
}

/// Calls through to the underlying glibc, musl or Bionic `getauxval()`.
///
/// A return of 0 is ambiguous (some entries legitimately hold 0), so errno is cleared before the
/// call and inspected after it.
#[cfg(target_os = "linux")]
pub struct NativeGetauxval {}

#[cfg(target_os = "linux")]
impl Getauxval for NativeGetauxval {
    fn getauxval(&self, key: AuxvType) -> Result<AuxvType, GetauxvalError> {
        unsafe {
            let errno = libc::__errno_location();
            *errno = 0;
            let value = libc::getauxval(key);
            if value != 0 {
                return Ok(value);
            }
            match *errno {
                0 => Ok(0),
                libc::ENOENT => Err(GetauxvalError::NotFound),
                _ => Err(GetauxvalError::UnknownError),
            }
        }
    }
}

/// The executable path from `AT_EXECFN`: the pointer as stored in the aux vector and the string
/// it points at.
#[derive(Debug, Clone, Copy)]
pub struct ExecFn {
    pub ptr: *const c_char,
    pub path: &'static CStr,
}

/// Look up `AT_EXECFN`. A zero value is treated the same as a missing entry.
///
/// The string lives on the initial process stack for the life of the process, hence `'static`.
///
/// # Safety
///
/// A non-zero `AT_EXECFN` from `g` must point at a NUL-terminated string that is never freed.
pub unsafe fn execfn<G: Getauxval>(g: &G) -> Result<Option<ExecFn>, GetauxvalError> {
    let value = match g.getauxval(AT_EXECFN) {
        Ok(v) => v,
        Err(GetauxvalError::NotFound) => return Ok(None),
        Err(e) => return Err(e),
    };
    if value == 0 {
        return Ok(None);
    }

    let ptr = value as usize as *const c_char;
    Ok(Some(ExecFn {
        ptr,
        path: CStr::from_ptr(ptr),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGetauxval(Result<AuxvType, GetauxvalError>);

    impl Getauxval for FixedGetauxval {
        fn getauxval(&self, key: AuxvType) -> Result<AuxvType, GetauxvalError> {
            assert_eq!(AT_EXECFN, key);
            self.0
        }
    }

    #[test]
    fn execfn_reads_pointed_to_string() {
        static PATH: &[u8] = b"/usr/bin/envdump\0";
        let g = FixedGetauxval(Ok(PATH.as_ptr() as usize as AuxvType));

        let found = unsafe { execfn(&g) }.unwrap().unwrap();
        assert_eq!(PATH.as_ptr() as *const c_char, found.ptr);
        assert_eq!("/usr/bin/envdump", found.path.to_str().unwrap());
    }

    #[test]
    fn execfn_not_found_is_none() {
        let g = FixedGetauxval(Err(GetauxvalError::NotFound));
        assert!(unsafe { execfn(&g) }.unwrap().is_none());
    }

    #[test]
    fn execfn_zero_is_none() {
        let g = FixedGetauxval(Ok(0));
        assert!(unsafe { execfn(&g) }.unwrap().is_none());
    }

    #[test]
    fn execfn_propagates_other_errors() {
        let g = FixedGetauxval(Err(GetauxvalError::UnknownError));
        assert_eq!(GetauxvalError::UnknownError, unsafe { execfn(&g) }.unwrap_err());

        assert_eq!(
            GetauxvalError::FunctionNotAvailable,
            unsafe { execfn(&NotAvailableGetauxval {}) }.unwrap_err()
        );
    }
}
