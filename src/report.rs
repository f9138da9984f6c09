//! Render startup state as text.
//!
//! The layout follows what a C program printing the same things with `printf("%p, %s")` shows:
//! NULL pointers are `(nil)` and missing strings are `(null)`.

use std::fmt;
use std::io::{self, Write};

use super::config::{AuxvMode, AuxvSource};
use super::environ::EnvBlock;
use super::error::Result;
use super::getauxval::{self, Getauxval};
use super::procfs;
use super::stack;
use super::startup::Startup;
use super::{key_name, AuxvPair, AuxvType};

/// Formats a raw pointer as `0x…`, or `(nil)` when NULL.
pub struct Ptr<T>(pub *const T);

impl<T> fmt::Display for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_null() {
            f.write_str("(nil)")
        } else {
            write!(f, "{:p}", self.0)
        }
    }
}

/// Write bytes exactly as they are in memory, or `(null)` when absent.
pub fn write_text<W: Write>(out: &mut W, text: Option<&[u8]>) -> io::Result<()> {
    match text {
        Some(bytes) => out.write_all(bytes),
        None => out.write_all(b"(null)"),
    }
}

pub struct Report<'a, G: Getauxval> {
    startup: &'a Startup,
    env: EnvBlock<'a>,
    getauxval: G,
    auxv_mode: AuxvMode,
    auxv_source: AuxvSource,
}

impl<'a, G: Getauxval> Report<'a, G> {
    /// `startup` must describe this process (or, with `AuxvSource::Stack`, at least have an envp
    /// followed by a real auxv) because the report dereferences everything in it.
    pub fn new(startup: &'a Startup, env: EnvBlock<'a>, getauxval: G) -> Report<'a, G> {
        Report {
            startup,
            env,
            getauxval,
            auxv_mode: AuxvMode::ExecFn,
            auxv_source: AuxvSource::Procfs,
        }
    }

    pub fn auxv(mut self, mode: AuxvMode, source: AuxvSource) -> Report<'a, G> {
        self.auxv_mode = mode;
        self.auxv_source = source;
        self
    }

    pub fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        self.write_arguments(out)?;
        writeln!(out)?;
        self.write_auxv(out)?;
        writeln!(out)?;
        self.write_environment(out)?;
        self.write_variables(out)?;
        self.write_lookups(out)?;
        out.flush()?;
        Ok(())
    }

    fn write_arguments<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Arguments:")?;
        for arg in self.startup.args() {
            write!(out, "  argv[{}]: {}, {}, ", arg.index, Ptr(arg.slot), Ptr(arg.ptr))?;
            write_text(out, Some(arg.value.to_bytes()))?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_auxv<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Auxiliary Vector:")?;
        // SAFETY: AT_EXECFN from a real aux vector points at the path string on the initial stack
        let execfn = unsafe { getauxval::execfn(&self.getauxval) };
        let (ptr, path) = match execfn {
            Ok(Some(e)) => (e.ptr, Some(e.path.to_bytes())),
            Ok(None) => (std::ptr::null(), None),
            Err(e) => {
                warn!("getauxval(AT_EXECFN) failed: {:?}", e);
                (std::ptr::null(), None)
            }
        };
        write!(out, "AT_EXECFN:       {}, ", Ptr(ptr))?;
        write_text(out, path)?;
        writeln!(out)?;

        if self.auxv_mode == AuxvMode::Full {
            self.write_auxv_table(out)?;
        }
        Ok(())
    }

    fn write_auxv_table<W: Write>(&self, out: &mut W) -> Result<()> {
        let pairs: Vec<AuxvPair> = match self.auxv_source {
            AuxvSource::Procfs => procfs::iterate_procfs_auxv()?.collect::<Result<Vec<_>, _>>()?,
            AuxvSource::Stack => {
                let envp = self.startup.envp();
                if envp.is_null() {
                    warn!("no startup envp, cannot walk the stack for auxv");
                    return Ok(());
                }
                let iter = unsafe { stack::iterate_stack_auxv(envp) };
                writeln!(out, "  auxv start:    {}", Ptr(iter.position()))?;
                iter.collect()
            }
        };
        debug!("{} auxv entries from {:?}", pairs.len(), self.auxv_source);

        for pair in pairs {
            writeln!(out, "  {:<16} {:#x}", label(pair.key), pair.value)?;
        }
        Ok(())
    }

    fn write_environment<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Environment:")?;
        writeln!(out, "  pointer: {}", Ptr(self.env.as_ptr()))?;
        let (ptr, value) = match self.env.lookup(b"_") {
            Some(v) => (v.ptr, Some(v.value.to_bytes())),
            None => (std::ptr::null(), None),
        };
        write!(out, "  _:       {}, ", Ptr(ptr))?;
        write_text(out, value)?;
        writeln!(out)?;
        Ok(())
    }

    fn write_variables<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "variables:")?;
        for entry in self.env.entries() {
            out.write_all(b"  ")?;
            write_text(out, Some(entry.name()))?;
            writeln!(out, ":       {}", Ptr(entry.ptr))?;
        }
        Ok(())
    }

    fn write_lookups<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "arguments:")?;
        for arg in self.startup.args().filter(|a| a.index > 0) {
            let name = arg.value.to_bytes();
            let (ptr, value) = match self.env.lookup(name) {
                Some(v) => (v.ptr, Some(v.value.to_bytes())),
                None => {
                    debug!("{} is not set", String::from_utf8_lossy(name));
                    (std::ptr::null(), None)
                }
            };
            out.write_all(b"  ")?;
            write_text(out, Some(name))?;
            write!(out, ":       {}, ", Ptr(ptr))?;
            write_text(out, value)?;
            writeln!(out)?;
        }
        Ok(())
    }
}

fn label(key: AuxvType) -> String {
    match key_name(key) {
        Some(name) => format!("{}:", name),
        None => format!("{}:", key),
    }
}
