use std::fs;
use std::io;
use std::path::Path;

/// File operations the store performs on snippet pairs.
///
/// Every write and removal goes through this trait so that a failure can be
/// injected between the two halves of a pair.
pub trait FileOps {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Plain `std::fs` implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskOps;

impl FileOps for DiskOps {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
