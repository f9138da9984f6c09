#[cfg(target_os = "linux")]
extern crate envdump;

#[cfg(target_os = "linux")]
use std::os::unix::ffi::OsStrExt;

#[cfg(target_os = "linux")]
use envdump::startup::{Source, Startup};

#[test]
#[cfg(target_os = "linux")]
fn captured_args_match_std() {
    let startup = Startup::capture().unwrap();

    let captured: Vec<Vec<u8>> = startup.args().map(|a| a.value.to_bytes().to_vec()).collect();
    let std_args: Vec<Vec<u8>> = std::env::args_os().map(|a| a.as_bytes().to_vec()).collect();
    assert_eq!(std_args, captured);
    assert_eq!(startup.argc(), captured.len());
}

#[test]
#[cfg(target_os = "linux")]
fn captured_arg_slots_are_contiguous() {
    let startup = Startup::capture().unwrap();

    for arg in startup.args() {
        assert_eq!(unsafe { startup.argv().add(arg.index) }, arg.slot);
        assert_eq!(unsafe { *arg.slot }, arg.ptr);
    }
    // argv[argc] is NULL and envp follows directly
    unsafe {
        assert!((*startup.argv().add(startup.argc())).is_null());
        assert_eq!(startup.argv().add(startup.argc() + 1), startup.envp());
    }
}

#[test]
#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn constructor_capture_agrees_with_stack_walk() {
    let startup = Startup::capture().unwrap();
    assert_eq!(Source::InitArray, startup.source());

    let walked = unsafe { Startup::from_envp(startup.envp()) }.unwrap();
    assert_eq!(Source::Stack, walked.source());
    assert_eq!(startup.argc(), walked.argc());
    assert_eq!(startup.argv(), walked.argv());
}
