//! CLI command implementations.

pub mod check;
pub mod collate;
pub mod init;
pub mod normalize;
pub mod order;
