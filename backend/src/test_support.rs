//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests or with the `test-support` feature.

mod clock;
mod memory_store;
mod roster;

pub use clock::MutableClock;
pub use memory_store::MemoryStore;
pub use roster::SharedRoster;

pub mod cap_fs {
    //! Capability-scoped file writes for tests that need a dataset on disk.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write `contents` to `path` through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use portfolio::test_support::cap_fs::write_file;
    ///
    /// let path = std::env::temp_dir().join("portfolio-cap-fs-example.json");
    /// write_file(&path, b"{}")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "path must name a file")
        })?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(file_name), contents)
    }
}
