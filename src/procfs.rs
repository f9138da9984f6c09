//! Read auxv entries via Linux procfs.
//!
//! `/proc/self/auxv` holds the same pairs the kernel put on the initial stack, as raw native
//! words. `iterate_procfs_auxv` walks every pair; `search_procfs_auxv` collects just the keys
//! you ask for. Each item is itself a `Result` because I/O can fail partway through.
//!
//! The reader is generic over byte order and source so captured auxv images from other machines
//! can be decoded too.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::marker::PhantomData;
use std::mem;
use std::path::Path;

use byteorder::{ByteOrder, NativeEndian, ReadBytesExt};

use super::{AuxvPair, AuxvType, AT_NULL};

const PROCFS_AUXV: &str = "/proc/self/auxv";

/// Errors from reading `/proc/self/auxv`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcfsAuxvError {
    /// an io error was encountered
    IoError,
    /// the auxv data is invalid
    InvalidFormat,
}

/// Iterate over the contents of `/proc/self/auxv`.
pub fn iterate_procfs_auxv() -> Result<ProcfsAuxvIter<NativeEndian, BufReader<File>>, ProcfsAuxvError> {
    iterate_path::<NativeEndian>(Path::new(PROCFS_AUXV))
}

/// Read `/proc/self/auxv` and look for the specified keys.
///
/// The returned map only has entries for requested keys that are present in the aux vector.
pub fn search_procfs_auxv(keys: &[AuxvType]) -> Result<HashMap<AuxvType, AuxvType>, ProcfsAuxvError> {
    let mut result = HashMap::new();
    for pair in iterate_procfs_auxv()? {
        let pair = pair?;
        if keys.contains(&pair.key) {
            result.insert(pair.key, pair.value);
        }
    }
    Ok(result)
}

pub fn iterate_path<B: ByteOrder>(path: &Path) -> Result<ProcfsAuxvIter<B, BufReader<File>>, ProcfsAuxvError> {
    let input = File::open(path).map_err(|e| {
        debug!("open {} failed: {}", path.display(), e);
        ProcfsAuxvError::IoError
    })?;
    Ok(iterate_reader::<B, _>(BufReader::new(input)))
}

/// Decode auxv pairs from any byte source laid out like `/proc/self/auxv`.
pub fn iterate_reader<B: ByteOrder, R: Read>(input: R) -> ProcfsAuxvIter<B, R> {
    ProcfsAuxvIter {
        input,
        done: false,
        phantom_byteorder: PhantomData,
    }
}

/// An iterator across auxv pairs from procfs.
pub struct ProcfsAuxvIter<B: ByteOrder, R: Read> {
    input: R,
    done: bool,
    phantom_byteorder: PhantomData<B>,
}

impl<B: ByteOrder, R: Read> ProcfsAuxvIter<B, R> {
    fn read_pair(&mut self) -> Result<AuxvPair, ProcfsAuxvError> {
        let key = read_word::<B, _>(&mut self.input)?;
        let value = read_word::<B, _>(&mut self.input)?;
        Ok(AuxvPair { key, value })
    }
}

impl<B: ByteOrder, R: Read> Iterator for ProcfsAuxvIter<B, R> {
    type Item = Result<AuxvPair, ProcfsAuxvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // assume something will fail
        self.done = true;

        match self.read_pair() {
            Ok(pair) if pair.key == AT_NULL => None,
            Ok(pair) => {
                self.done = false;
                Some(Ok(pair))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

fn read_word<B: ByteOrder, R: Read>(reader: &mut R) -> Result<AuxvType, ProcfsAuxvError> {
    let word = match mem::size_of::<AuxvType>() {
        4 => reader.read_u32::<B>().map(|u| u as AuxvType),
        8 => reader.read_u64::<B>().map(|u| u as AuxvType),
        x => unreachable!("unexpected word width: {}", x),
    };
    word.map_err(|e| match e.kind() {
        // should not hit EOF before AT_NULL
        io::ErrorKind::UnexpectedEof => ProcfsAuxvError::InvalidFormat,
        _ => ProcfsAuxvError::IoError,
    })
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

    use super::{iterate_reader, ProcfsAuxvError};
    use crate::{AuxvPair, AuxvType, AT_EXECFN, AT_HWCAP, AT_PAGESZ, AT_UID};

    fn image<B: ByteOrder>(pairs: &[(AuxvType, AuxvType)]) -> Vec<u8> {
        let mut buf = Vec::new();
        for &(k, v) in pairs {
            write_word::<B>(&mut buf, k);
            write_word::<B>(&mut buf, v);
        }
        buf
    }

    #[cfg(target_pointer_width = "64")]
    fn write_word<B: ByteOrder>(buf: &mut Vec<u8>, w: AuxvType) {
        buf.write_u64::<B>(w as u64).unwrap();
    }

    #[cfg(target_pointer_width = "32")]
    fn write_word<B: ByteOrder>(buf: &mut Vec<u8>, w: AuxvType) {
        buf.write_u32::<B>(w as u32).unwrap();
    }

    #[test]
    fn iterate_reader_stops_at_null() {
        let data = image::<LittleEndian>(&[(AT_HWCAP, 3219913727), (AT_PAGESZ, 4096), (AT_UID, 1000), (0, 0)]);
        let mut iter = iterate_reader::<LittleEndian, _>(Cursor::new(data));

        assert_eq!(AuxvPair { key: AT_HWCAP, value: 3219913727 }, iter.next().unwrap().unwrap());
        assert_eq!(AuxvPair { key: AT_PAGESZ, value: 4096 }, iter.next().unwrap().unwrap());
        assert_eq!(AuxvPair { key: AT_UID, value: 1000 }, iter.next().unwrap().unwrap());
        assert_eq!(None, iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn iterate_reader_honors_byte_order() {
        let data = image::<BigEndian>(&[(AT_EXECFN, 0x1234), (0, 0)]);
        let pairs: Vec<AuxvPair> = iterate_reader::<BigEndian, _>(Cursor::new(data))
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(vec![AuxvPair { key: AT_EXECFN, value: 0x1234 }], pairs);
    }

    #[test]
    fn iterate_reader_no_trailing_null() {
        let data = image::<LittleEndian>(&[(AT_PAGESZ, 4096)]);
        let mut iter = iterate_reader::<LittleEndian, _>(Cursor::new(data));

        assert_eq!(AuxvPair { key: AT_PAGESZ, value: 4096 }, iter.next().unwrap().unwrap());
        assert_eq!(ProcfsAuxvError::InvalidFormat, iter.next().unwrap().unwrap_err());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn iterate_reader_no_value_in_trailing_null() {
        let mut data = image::<LittleEndian>(&[(AT_PAGESZ, 4096)]);
        write_word::<LittleEndian>(&mut data, 0);
        let mut iter = iterate_reader::<LittleEndian, _>(Cursor::new(data));

        assert!(iter.next().unwrap().is_ok());
        assert_eq!(ProcfsAuxvError::InvalidFormat, iter.next().unwrap().unwrap_err());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn iterate_reader_truncated_entry() {
        let mut data = image::<LittleEndian>(&[(AT_PAGESZ, 4096), (AT_UID, 1000), (0, 0)]);
        // chop the second pair in the middle of its value
        let word = std::mem::size_of::<AuxvType>();
        data.truncate(3 * word + word / 2);
        let mut iter = iterate_reader::<LittleEndian, _>(Cursor::new(data));

        assert!(iter.next().unwrap().is_ok());
        assert_eq!(ProcfsAuxvError::InvalidFormat, iter.next().unwrap().unwrap_err());
        assert_eq!(None, iter.next());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"))
        }
    }

    #[test]
    fn iterate_reader_io_error() {
        let mut iter = iterate_reader::<LittleEndian, _>(FailingReader);

        assert_eq!(ProcfsAuxvError::IoError, iter.next().unwrap().unwrap_err());
        assert_eq!(None, iter.next());
    }
}
