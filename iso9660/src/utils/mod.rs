//! Low-level helpers shared by the descriptor, directory and boot codecs

pub mod checksum;
pub mod datetime;
pub mod endian;
pub mod sector;
pub mod string;
