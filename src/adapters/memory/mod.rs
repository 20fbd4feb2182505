//! In-memory adapters used by tests and by callers that build contracts
//! from sources that never touch the disk.

pub mod clock;
pub mod filesystem;

pub use clock::FixedClock;
pub use filesystem::MemoryFileSystem;
