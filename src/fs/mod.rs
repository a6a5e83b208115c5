//! Sandboxed filesystem resolution
//!
//! Commands that touch disk (clone) never receive raw host paths. They name
//! a filesystem resource, which is resolved here into a mount point under
//! the session's data root, and every target path is validated against
//! escaping that mount.

pub mod resolver;

pub use resolver::MountedFilesystem;
