use chrono::{DateTime,Utc};
use std::str::FromStr;

pub const SECTOR_SIZE: usize = 512;
/// sector where the master directory block begins
pub const MDB_SECTOR: usize = 2;
/// volume info plus allocation block map, always sectors 2-3
pub const MDB_SIZE: usize = 1024;
pub const VOL_INFO_SIZE: usize = 64;
pub const SIGNATURE: [u8;2] = [0xd2,0xd7];
/// entry header including the name length byte
pub const ENTRY_HEADER_SIZE: usize = 51;
/// smallest entry: header plus one padding byte for the empty name
pub const MIN_ENTRY_SIZE: usize = 52;
pub const MAX_VOL_NAME: usize = 27;
pub const MAX_FILE_NAME: usize = 255;
/// allocation block numbers count from 2, block 2 sits at map index 0
pub const FIRST_BLOCK: u16 = 2;
/// the map must fit in the MDB alongside the volume info
pub const MAX_ALLOC_BLOCKS: usize = (MDB_SIZE - VOL_INFO_SIZE) * 2 / 3;

/// map entry values; anything in 0x002..=0xfee links to the next block
pub const MAP_FREE: u16 = 0x000;
pub const MAP_LAST: u16 = 0x001;
/// directory overflow, never created here but preserved on read
pub const MAP_DIR: u16 = 0xfff;

pub const DEFAULT_SIZE_KB: usize = 400;
pub const DEFAULT_VOL_NAME: &str = "Untitled";
pub const DEFAULT_ALLOC_SIZE: usize = 1024;
pub const DEFAULT_DIR_START: u16 = 4;
pub const DEFAULT_DIR_LEN: u16 = 12;

/// flag byte bit 7 marks an entry as in use
pub const FLAG_IN_USE: u8 = 0x80;

/// Enumerates MFS errors.  The `Display` trait will print the long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("not an MFS volume")]
    InvalidSignature,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("disk full")]
    DiskFull,
    #[error("directory full")]
    DirectoryFull,
    #[error("file not found")]
    NotFound,
    #[error("file system damaged")]
    Corrupted
}

/// Non-fatal observations made while walking allocation chains.  These stop
/// the walk but are not raised as errors; they accumulate on the volume
/// handle and can be drained with `Disk::diagnostics`.
#[derive(thiserror::Error,Debug,Clone,Copy,PartialEq,Eq)]
pub enum Warning {
    #[error("block {0} in chain is marked free")]
    FreeLink(u16),
    #[error("block {0} in chain is out of range")]
    RangeLink(u16),
    #[error("block {0} appears twice, chain has a cycle")]
    CycleLink(u16)
}

/// Selects one of the two byte streams of an MFS file.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum ForkType {
    Data,
    Resource
}

impl FromStr for ForkType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s {
            "data" => Ok(Self::Data),
            "resource" => Ok(Self::Resource),
            _ => Err(Error::InvalidArgument)
        }
    }
}

/// Caller-supplied metadata for a new file.  Type and creator are required
/// and must be exactly 4 characters; everything else defaults.
#[derive(Clone,Default)]
pub struct FileMetadata {
    pub file_type: String,
    pub creator: String,
    pub folder_num: i16,
    pub finder_flags: u16,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>
}

impl FileMetadata {
    pub fn new(file_type: &str, creator: &str) -> Self {
        Self {
            file_type: file_type.to_string(),
            creator: creator.to_string(),
            ..Default::default()
        }
    }
}

/// Snapshot of a directory entry in caller-friendly form.  Returned by the
/// listing and lookup operations; start blocks and allocated lengths are
/// included so callers can reason about layout without decoding the entry.
#[derive(Clone,Debug)]
pub struct FileInfo {
    pub name: String,
    pub file_type: String,
    pub creator: String,
    pub data_len: usize,
    pub data_alloc_len: usize,
    pub data_start_block: u16,
    pub rsrc_len: usize,
    pub rsrc_alloc_len: usize,
    pub rsrc_start_block: u16,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub file_num: u32,
    pub folder_num: i16,
    pub finder_flags: u16,
    pub icon_position: (i16,i16)
}
