//! ### MFS directory structures
//!
//! The volume info is a fixed length structure, with the DiskStruct trait
//! automatically derived.  Directory entries have a variable length name, so
//! the trait is implemented by hand.  All integers are big endian.

// a2kit_macro automatically derives `new`, `to_bytes`, `from_bytes`, and `length` from a DiskStruct.
// This spares us having to manually write code to copy bytes in and out for every new structure.
// The auto-derivation is not used for structures with variable length fields.
use a2kit_macro::{DiskStructError,DiskStruct};
use a2kit_macro_derive::DiskStruct;
use chrono::{DateTime,Utc};

use super::types::*;
use super::pack;

/// First 64 bytes of the master directory block.  The packed allocation
/// block map follows immediately in the same two sectors.
#[derive(DiskStruct,Clone)]
pub struct VolumeInfo {
    pub sig: [u8;2],
    pub create_date: [u8;4],
    pub mod_date: [u8;4],
    pub attributes: [u8;2],
    pub num_files: [u8;2],
    pub dir_start: [u8;2],
    pub dir_len: [u8;2],
    pub num_alloc_blocks: [u8;2],
    pub alloc_block_size: [u8;4],
    pub clump_size: [u8;4],
    pub alloc_start: [u8;2],
    pub next_file_num: [u8;4],
    pub free_blocks: [u8;2],
    pub name: [u8;28]
}

impl VolumeInfo {
    pub fn signature(&self) -> u16 {
        u16::from_be_bytes(self.sig)
    }
    pub fn created(&self) -> Option<DateTime<Utc>> {
        pack::unpack_date(self.create_date)
    }
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        pack::unpack_date(self.mod_date)
    }
    pub fn num_files(&self) -> u16 {
        u16::from_be_bytes(self.num_files)
    }
    pub fn dir_start(&self) -> usize {
        u16::from_be_bytes(self.dir_start) as usize
    }
    pub fn dir_len(&self) -> usize {
        u16::from_be_bytes(self.dir_len) as usize
    }
    pub fn total_blocks(&self) -> usize {
        u16::from_be_bytes(self.num_alloc_blocks) as usize
    }
    pub fn alloc_block_size(&self) -> usize {
        u32::from_be_bytes(self.alloc_block_size) as usize
    }
    pub fn clump_size(&self) -> usize {
        u32::from_be_bytes(self.clump_size) as usize
    }
    pub fn alloc_start(&self) -> usize {
        u16::from_be_bytes(self.alloc_start) as usize
    }
    pub fn next_file_num(&self) -> u32 {
        u32::from_be_bytes(self.next_file_num)
    }
    pub fn free_blocks(&self) -> u16 {
        u16::from_be_bytes(self.free_blocks)
    }
    pub fn volume_name(&self) -> String {
        pack::vol_name_to_string(&self.name)
    }
}

/// One directory entry: 50 fixed bytes, the name length byte, the name, and
/// a padding byte when needed to keep the next entry on an even offset.
/// Entries never span a sector boundary.
#[derive(Clone)]
pub struct FileEntry {
    pub flags: u8,
    pub version: u8,
    pub file_type: [u8;4],
    pub creator: [u8;4],
    pub finder_flags: [u8;2],
    pub position: [u8;4],
    pub folder_num: [u8;2],
    pub file_num: [u8;4],
    pub data_start: [u8;2],
    pub data_len: [u8;4],
    pub data_alloc: [u8;4],
    pub rsrc_start: [u8;2],
    pub rsrc_len: [u8;4],
    pub rsrc_alloc: [u8;4],
    pub create_date: [u8;4],
    pub mod_date: [u8;4],
    pub name: Vec<u8>
}

impl FileEntry {
    pub fn is_active(&self) -> bool {
        self.flags & FLAG_IN_USE > 0
    }
    pub fn file_num(&self) -> u32 {
        u32::from_be_bytes(self.file_num)
    }
    pub fn data_start(&self) -> u16 {
        u16::from_be_bytes(self.data_start)
    }
    pub fn data_len(&self) -> usize {
        u32::from_be_bytes(self.data_len) as usize
    }
    pub fn data_alloc(&self) -> usize {
        u32::from_be_bytes(self.data_alloc) as usize
    }
    pub fn rsrc_start(&self) -> u16 {
        u16::from_be_bytes(self.rsrc_start)
    }
    pub fn rsrc_len(&self) -> usize {
        u32::from_be_bytes(self.rsrc_len) as usize
    }
    pub fn rsrc_alloc(&self) -> usize {
        u32::from_be_bytes(self.rsrc_alloc) as usize
    }
    pub fn fork_layout(&self, fork: ForkType) -> (u16,usize,usize) {
        match fork {
            ForkType::Data => (self.data_start(),self.data_len(),self.data_alloc()),
            ForkType::Resource => (self.rsrc_start(),self.rsrc_len(),self.rsrc_alloc())
        }
    }
    pub fn icon_position(&self) -> (i16,i16) {
        (i16::from_be_bytes([self.position[0],self.position[1]]),
         i16::from_be_bytes([self.position[2],self.position[3]]))
    }
    pub fn file_info(&self) -> FileInfo {
        FileInfo {
            name: pack::decode_name(&self.name),
            file_type: pack::ostype_to_string(self.file_type),
            creator: pack::ostype_to_string(self.creator),
            data_len: self.data_len(),
            data_alloc_len: self.data_alloc(),
            data_start_block: self.data_start(),
            rsrc_len: self.rsrc_len(),
            rsrc_alloc_len: self.rsrc_alloc(),
            rsrc_start_block: self.rsrc_start(),
            created: pack::unpack_date(self.create_date),
            modified: pack::unpack_date(self.mod_date),
            file_num: self.file_num(),
            folder_num: i16::from_be_bytes(self.folder_num),
            finder_flags: u16::from_be_bytes(self.finder_flags),
            icon_position: self.icon_position()
        }
    }
}

impl DiskStruct for FileEntry {
    fn new() -> Self {
        Self {
            flags: 0,
            version: 0,
            file_type: [0;4],
            creator: [0;4],
            finder_flags: [0;2],
            position: [0;4],
            folder_num: [0;2],
            file_num: [0;4],
            data_start: [0;2],
            data_len: [0;4],
            data_alloc: [0;4],
            rsrc_start: [0;2],
            rsrc_len: [0;4],
            rsrc_alloc: [0;4],
            create_date: [0;4],
            mod_date: [0;4],
            name: Vec::new()
        }
    }
    fn from_bytes(bytes: &[u8]) -> Result<Self,DiskStructError> {
        let mut ans = Self::new();
        ans.update_from_bytes(bytes)?;
        Ok(ans)
    }
    fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        ans.push(self.flags);
        ans.push(self.version);
        ans.extend_from_slice(&self.file_type);
        ans.extend_from_slice(&self.creator);
        ans.extend_from_slice(&self.finder_flags);
        ans.extend_from_slice(&self.position);
        ans.extend_from_slice(&self.folder_num);
        ans.extend_from_slice(&self.file_num);
        ans.extend_from_slice(&self.data_start);
        ans.extend_from_slice(&self.data_len);
        ans.extend_from_slice(&self.data_alloc);
        ans.extend_from_slice(&self.rsrc_start);
        ans.extend_from_slice(&self.rsrc_len);
        ans.extend_from_slice(&self.rsrc_alloc);
        ans.extend_from_slice(&self.create_date);
        ans.extend_from_slice(&self.mod_date);
        ans.push(self.name.len() as u8);
        ans.extend_from_slice(&self.name);
        if ans.len() % 2 == 1 {
            ans.push(0);
        }
        ans
    }
    fn update_from_bytes(&mut self,bytes: &[u8]) -> Result<(),DiskStructError> {
        if bytes.len() < ENTRY_HEADER_SIZE {
            return Err(DiskStructError::OutOfData);
        }
        self.flags = bytes[0];
        self.version = bytes[1];
        self.file_type.copy_from_slice(&bytes[2..6]);
        self.creator.copy_from_slice(&bytes[6..10]);
        self.finder_flags.copy_from_slice(&bytes[10..12]);
        self.position.copy_from_slice(&bytes[12..16]);
        self.folder_num.copy_from_slice(&bytes[16..18]);
        self.file_num.copy_from_slice(&bytes[18..22]);
        self.data_start.copy_from_slice(&bytes[22..24]);
        self.data_len.copy_from_slice(&bytes[24..28]);
        self.data_alloc.copy_from_slice(&bytes[28..32]);
        self.rsrc_start.copy_from_slice(&bytes[32..34]);
        self.rsrc_len.copy_from_slice(&bytes[34..38]);
        self.rsrc_alloc.copy_from_slice(&bytes[38..42]);
        self.create_date.copy_from_slice(&bytes[42..46]);
        self.mod_date.copy_from_slice(&bytes[46..50]);
        let name_len = bytes[50] as usize;
        if 51 + name_len > bytes.len() {
            return Err(DiskStructError::OutOfData);
        }
        self.name = bytes[51..51+name_len].to_vec();
        Ok(())
    }
    fn len(&self) -> usize {
        let unpadded = ENTRY_HEADER_SIZE + self.name.len();
        unpadded + unpadded % 2
    }
}
