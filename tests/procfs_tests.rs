#[cfg(target_os = "linux")]
extern crate envdump;

#[cfg(target_os = "linux")]
use envdump::getauxval::{Getauxval, NativeGetauxval};
#[cfg(target_os = "linux")]
use envdump::procfs::{iterate_procfs_auxv, search_procfs_auxv};
#[cfg(target_os = "linux")]
use envdump::{AT_EXECFN, AT_HWCAP, AT_HWCAP2, AT_PAGESZ, AT_UID};

#[test]
#[cfg(target_os = "linux")]
fn search_procfs_finds_uid_matches_libc() {
    let map = search_procfs_auxv(&[AT_UID]).unwrap();
    let uid = map.get(&AT_UID).unwrap();

    let libc_uid = unsafe { libc::getuid() };
    assert_eq!(libc_uid as u64, *uid as u64);
}

#[test]
#[cfg(target_os = "linux")]
fn search_procfs_only_returns_requested_keys() {
    let map = search_procfs_auxv(&[AT_PAGESZ, 555555555]).unwrap();
    assert_eq!(1, map.len());
    assert!(map.contains_key(&AT_PAGESZ));
}

#[test]
#[cfg(target_os = "linux")]
fn iterate_procfs_finds_execfn_once() {
    let iter = iterate_procfs_auxv().unwrap();

    assert_eq!(1, iter.map(|r| r.unwrap()).filter(|p| p.key == AT_EXECFN).count());
}

#[test]
#[cfg(target_os = "linux")]
fn iterate_procfs_agrees_with_getauxval() {
    let native_getauxval = NativeGetauxval {};
    for pair in iterate_procfs_auxv().unwrap() {
        let pair = pair.unwrap();
        // glibc answers HWCAP lookups from its own cpu feature state on some arches
        if pair.key == AT_HWCAP || pair.key == AT_HWCAP2 {
            continue;
        }
        assert_eq!(Ok(pair.value), native_getauxval.getauxval(pair.key), "key {}", pair.key);
    }
}
