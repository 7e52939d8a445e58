#![deny(missing_docs)]

//! Crate to implement a fixed capacity, file backed hash table for "have I seen this" lookups
//! (a crawler's seen URL index for instance).
//! Keys and values are fixed width byte strings, the table has a fixed number of slots and uses
//! open addressing with linear probing.  Deleted slots are left as tombstones that are never
//! reused, so the table never moves an entry once it is placed: the slot an entry lands in is
//! stable for its whole life and survives a reopen.
//!
//! The whole slot region is kept in memory with the same layout it has on disk.  Changes are
//! written back on a checkpoint policy (a mutation count and/or a time interval), on an explicit
//! flush or commit and when the table is dropped.  A crash loses at most what changed since the
//! last checkpoint.
//!
//! Home slots require a stable hasher, the default Rust hasher is NOT appropriate since it is
//! randomly keyed.  The default is murmur3 (see [`hasher`]), otherwise you can use your own
//! hasher just like HashMap.  The file header uses a CRC32 checksum
//! (See https://github.com/srijs/rust-crc32fast).

pub(crate) mod crc;
pub mod error;
pub mod hasher;
pub mod pack;
pub mod table;
pub mod table_config;
pub mod table_files;
