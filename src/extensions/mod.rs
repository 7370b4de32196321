//! Implementations of IMAP extension commands that live outside the RFC
//! 3501 core.

pub mod idle;
pub mod metadata;
pub mod sort;
