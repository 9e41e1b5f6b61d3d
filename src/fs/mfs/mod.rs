//! # MFS file system module
//!
//! This manipulates disk images containing one Macintosh File System volume,
//! the flat file system shipped with the original Macintosh.
//!
//! * Single volume images only
//! * Files have independent data and resource forks; both are opaque here
//! * Overwriting an existing file is delete-then-create

pub mod types;
pub mod pack;
pub mod directory;

use chrono::{DateTime,Utc};
use a2kit_macro::DiskStruct;
use log::{debug,info,error};

use types::*;
use directory::*;
use crate::{DYNERR,STDRESULT};

pub const FS_NAME: &str = "mfs";

/// The primary interface for disk operations.  The volume image is owned as
/// a contiguous byte buffer; the volume info, the decoded allocation block
/// map, and the directory entry list are caches kept in lockstep with it.
pub struct Disk {
    buf: Vec<u8>,
    vib: VolumeInfo,
    map: Vec<u16>,
    files: Vec<(usize,FileEntry)>,
    warnings: Vec<Warning>
}

impl Disk {
    /// Create an unformatted volume image of `size_kb` kilobytes, all zero.
    pub fn new(size_kb: usize) -> Self {
        Self {
            buf: vec![0;size_kb*1024],
            vib: VolumeInfo::new(),
            map: Vec::new(),
            files: Vec::new(),
            warnings: Vec::new()
        }
    }
    /// The common case: a formatted 400K volume named "Untitled".
    pub fn create_standard() -> Self {
        let mut disk = Self::new(DEFAULT_SIZE_KB);
        disk.format(DEFAULT_VOL_NAME,None).expect("standard geometry is valid");
        disk
    }
    /// Test an image for the MFS signature without committing to a parse.
    pub fn test_img(dimg: &[u8]) -> bool {
        if dimg.len() < (MDB_SECTOR+2)*SECTOR_SIZE || dimg.len() % SECTOR_SIZE != 0 {
            debug!("image of {} bytes cannot hold an MDB",dimg.len());
            return false;
        }
        if dimg[MDB_SECTOR*SECTOR_SIZE..MDB_SECTOR*SECTOR_SIZE+2] != SIGNATURE {
            debug!("MFS signature not found");
            return false;
        }
        true
    }
    /// Return a disk object if the image data parses as MFS, with the
    /// directory and allocation map decoded into the caches.  Directory
    /// scanning terminates at the first unused entry *within each sector*;
    /// in-use entries in later sectors are still found.
    pub fn from_img(dimg: &[u8]) -> Result<Self,DYNERR> {
        if dimg.len() == 0 || dimg.len() % SECTOR_SIZE != 0 {
            return Err(Box::new(Error::InvalidArgument));
        }
        if dimg.len() < (MDB_SECTOR+2)*SECTOR_SIZE {
            return Err(Box::new(Error::InvalidSignature));
        }
        let mdb_off = MDB_SECTOR*SECTOR_SIZE;
        let vib = match VolumeInfo::from_bytes(&dimg[mdb_off..mdb_off+VOL_INFO_SIZE]) {
            Ok(vib) => vib,
            Err(_) => return Err(Box::new(Error::Corrupted))
        };
        if vib.sig != SIGNATURE {
            debug!("signature was {:x?}",vib.sig);
            return Err(Box::new(Error::InvalidSignature));
        }
        let nblocks = vib.total_blocks();
        let abs = vib.alloc_block_size();
        if abs == 0 || abs % SECTOR_SIZE != 0 || nblocks == 0 || nblocks > MAX_ALLOC_BLOCKS {
            debug!("peculiar geometry: {} blocks of {} bytes",nblocks,abs);
            return Err(Box::new(Error::Corrupted));
        }
        if vib.dir_start() < MDB_SECTOR + 2 || (vib.dir_start() + vib.dir_len())*SECTOR_SIZE > dimg.len() {
            debug!("directory region escapes its reserved sectors");
            return Err(Box::new(Error::Corrupted));
        }
        if vib.alloc_start()*SECTOR_SIZE + nblocks*abs > dimg.len() {
            debug!("allocation region escapes the image");
            return Err(Box::new(Error::Corrupted));
        }
        if vib.free_blocks() as usize > nblocks {
            debug!("free count {} exceeds block count {}",vib.free_blocks(),nblocks);
            return Err(Box::new(Error::Corrupted));
        }
        let map = pack::unpack_map(&dimg[mdb_off+VOL_INFO_SIZE..mdb_off+MDB_SIZE],nblocks)?;
        let files = Self::scan_directory(dimg,&vib)?;
        Ok(Self {
            buf: dimg.to_vec(),
            vib,
            map,
            files,
            warnings: Vec::new()
        })
    }
    /// Format the volume with the standard geometry: directory at sector 4
    /// spanning 12 sectors, 1024 byte allocation blocks from sector 16.
    /// The volume name is truncated to 27 bytes.  Sizes other than 400K are
    /// accepted whenever at least one allocation block fits and the map
    /// fits in the MDB.
    pub fn format(&mut self, vol_name: &str, time: Option<DateTime<Utc>>) -> STDRESULT {
        if self.buf.len() == 0 || self.buf.len() % SECTOR_SIZE != 0 {
            return Err(Box::new(Error::InvalidArgument));
        }
        let total_sectors = self.buf.len()/SECTOR_SIZE;
        let alloc_start = (DEFAULT_DIR_START + DEFAULT_DIR_LEN) as usize;
        let sectors_per_block = DEFAULT_ALLOC_SIZE/SECTOR_SIZE;
        if total_sectors < alloc_start + sectors_per_block {
            error!("{} sectors will not hold boot blocks, MDB, directory, and a block",total_sectors);
            return Err(Box::new(Error::InvalidArgument));
        }
        let nblocks = (total_sectors - alloc_start)/sectors_per_block;
        if nblocks > MAX_ALLOC_BLOCKS {
            error!("{} allocation blocks will not map into the MDB",nblocks);
            return Err(Box::new(Error::InvalidArgument));
        }
        info!("formatting {} sectors, {} allocation blocks",total_sectors,nblocks);
        let now = time.or(Some(Utc::now()));
        self.buf.fill(0);
        self.vib = VolumeInfo::new();
        self.vib.sig = SIGNATURE;
        self.vib.create_date = pack::pack_date(now);
        self.vib.mod_date = pack::pack_date(now);
        self.vib.num_files = [0;2];
        self.vib.dir_start = u16::to_be_bytes(DEFAULT_DIR_START);
        self.vib.dir_len = u16::to_be_bytes(DEFAULT_DIR_LEN);
        self.vib.num_alloc_blocks = u16::to_be_bytes(nblocks as u16);
        self.vib.alloc_block_size = u32::to_be_bytes(DEFAULT_ALLOC_SIZE as u32);
        self.vib.clump_size = u32::to_be_bytes((DEFAULT_ALLOC_SIZE*8) as u32);
        self.vib.alloc_start = u16::to_be_bytes(alloc_start as u16);
        self.vib.next_file_num = u32::to_be_bytes(1);
        self.vib.free_blocks = u16::to_be_bytes(nblocks as u16);
        self.vib.name = pack::string_to_vol_name(vol_name);
        self.map = vec![MAP_FREE;nblocks];
        self.files = Vec::new();
        self.warnings = Vec::new();
        self.writeback_mdb()
    }
    /// Read-only snapshot of the volume info.
    pub fn volume_info(&self) -> VolumeInfo {
        self.vib.clone()
    }
    /// The full volume image, suitable for saving.
    pub fn to_img(&self) -> Vec<u8> {
        self.buf.clone()
    }
    /// Drain the warnings accumulated by chain walks.
    pub fn diagnostics(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
    /// List every in-use directory entry in directory order.
    pub fn list_files(&self) -> Vec<FileInfo> {
        self.files.iter().map(|(_o,entry)| entry.file_info()).collect()
    }
    pub fn get_file_info(&self, name: &str) -> Result<FileInfo,DYNERR> {
        match self.find_entry(name.as_bytes()) {
            Some(idx) => Ok(self.files[idx].1.file_info()),
            None => Err(Box::new(Error::NotFound))
        }
    }
    /// Create a file with empty forks.  Same as `write_file` with no data.
    pub fn create_file(&mut self, name: &str, meta: &FileMetadata) -> Result<FileInfo,DYNERR> {
        self.write_file(name,None,None,meta)
    }
    /// Write a file with the given fork contents.  If the name already
    /// exists the old file is deleted first.  Either both forks are stored
    /// and the entry written, or the volume is left as it was.
    pub fn write_file(&mut self, name: &str, data: Option<&[u8]>, rsrc: Option<&[u8]>, meta: &FileMetadata) -> Result<FileInfo,DYNERR> {
        if name.as_bytes().len() > MAX_FILE_NAME {
            error!("file name exceeds {} bytes",MAX_FILE_NAME);
            return Err(Box::new(Error::InvalidArgument));
        }
        if meta.file_type.chars().count() != 4 || meta.creator.chars().count() != 4 {
            error!("type and creator must be exactly 4 characters");
            return Err(Box::new(Error::InvalidArgument));
        }
        if self.find_entry(name.as_bytes()).is_some() {
            self.delete_file(name)?;
        }
        let abs = self.vib.alloc_block_size();
        let data_bytes = data.unwrap_or(&[]);
        let rsrc_bytes = rsrc.unwrap_or(&[]);
        let num_data = (data_bytes.len() + abs - 1)/abs;
        let num_rsrc = (rsrc_bytes.len() + abs - 1)/abs;
        if num_data + num_rsrc > self.free_count() as usize {
            return Err(Box::new(Error::DiskFull));
        }
        let (data_start,data_blocks) = self.allocate_chain(num_data)?;
        let (rsrc_start,rsrc_blocks) = match self.allocate_chain(num_rsrc) {
            Ok(chain) => chain,
            Err(e) => {
                self.free_chain(data_start);
                return Err(e);
            }
        };
        let now = Utc::now();
        let mut entry = FileEntry::new();
        entry.flags = FLAG_IN_USE;
        entry.version = 0;
        entry.file_type = pack::string_to_ostype(&meta.file_type);
        entry.creator = pack::string_to_ostype(&meta.creator);
        entry.finder_flags = u16::to_be_bytes(meta.finder_flags);
        entry.position = [0;4];
        entry.folder_num = i16::to_be_bytes(meta.folder_num);
        entry.data_start = u16::to_be_bytes(data_start);
        entry.data_len = u32::to_be_bytes(data_bytes.len() as u32);
        entry.data_alloc = u32::to_be_bytes((data_blocks.len()*abs) as u32);
        entry.rsrc_start = u16::to_be_bytes(rsrc_start);
        entry.rsrc_len = u32::to_be_bytes(rsrc_bytes.len() as u32);
        entry.rsrc_alloc = u32::to_be_bytes((rsrc_blocks.len()*abs) as u32);
        entry.create_date = pack::pack_date(meta.created.or(Some(now)));
        entry.mod_date = pack::pack_date(meta.modified.or(Some(now)));
        entry.name = name.as_bytes().to_vec();
        let slot = match self.find_free_slot(entry.len()) {
            Ok(offset) => offset,
            Err(e) => {
                self.free_chain(data_start);
                self.free_chain(rsrc_start);
                return Err(e);
            }
        };
        entry.file_num = u32::to_be_bytes(self.vib.next_file_num());
        self.write_entry(slot,&entry);
        self.write_fork(data_bytes,&data_blocks);
        self.write_fork(rsrc_bytes,&rsrc_blocks);
        self.vib.next_file_num = u32::to_be_bytes(self.vib.next_file_num() + 1);
        self.vib.num_files = u16::to_be_bytes(self.vib.num_files() + 1);
        self.vib.mod_date = pack::pack_date(Some(now));
        self.writeback_mdb()?;
        let info = entry.file_info();
        self.files.push((slot,entry));
        Ok(info)
    }
    /// Read one fork of a file into a fresh buffer of its logical length.
    pub fn read_file(&self, name: &str, fork: ForkType) -> Result<Vec<u8>,DYNERR> {
        let idx = match self.find_entry(name.as_bytes()) {
            Some(idx) => idx,
            None => return Err(Box::new(Error::NotFound))
        };
        let entry = &self.files[idx].1;
        let (start,logical_len,alloc_len) = entry.fork_layout(fork);
        if start == 0 || logical_len == 0 {
            return Ok(Vec::new());
        }
        if logical_len > alloc_len {
            error!("logical length {} exceeds allocated length {}",logical_len,alloc_len);
            return Err(Box::new(Error::Corrupted));
        }
        let abs = self.vib.alloc_block_size();
        let mut ans = vec![0;logical_len];
        let mut bytes_read: usize = 0;
        let mut block = start;
        for _try in 0..=self.map.len() {
            if block < FIRST_BLOCK || block as usize > self.map.len() + 1 {
                error!("block {} out of range in chain",block);
                return Err(Box::new(Error::Corrupted));
            }
            let offset = self.block_offset(block);
            let count = std::cmp::min(abs,logical_len - bytes_read);
            ans[bytes_read..bytes_read+count].copy_from_slice(&self.buf[offset..offset+count]);
            bytes_read += count;
            if bytes_read >= logical_len {
                return Ok(ans);
            }
            match self.map_entry(block)? {
                MAP_FREE | MAP_LAST => {
                    error!("chain ended after {} of {} bytes",bytes_read,logical_len);
                    return Err(Box::new(Error::Corrupted));
                },
                next => block = next
            }
        }
        error!("chain is longer than the volume, assuming a cycle");
        Err(Box::new(Error::Corrupted))
    }
    /// Delete a file: free both fork chains and clear the in-use bit of the
    /// directory entry, leaving the remaining entry bytes as a tombstone.
    pub fn delete_file(&mut self, name: &str) -> STDRESULT {
        let idx = match self.find_entry(name.as_bytes()) {
            Some(idx) => idx,
            None => return Err(Box::new(Error::NotFound))
        };
        let (offset,entry) = self.files[idx].clone();
        self.free_chain(entry.data_start());
        self.free_chain(entry.rsrc_start());
        self.buf[offset] &= !FLAG_IN_USE;
        self.vib.num_files = u16::to_be_bytes(self.vib.num_files().saturating_sub(1));
        self.vib.mod_date = pack::pack_date(Some(Utc::now()));
        self.writeback_mdb()?;
        self.files.remove(idx);
        Ok(())
    }
    /// Write the catalog to the console.
    pub fn catalog_to_stdout(&self) {
        println!();
        println!("{}:",self.vib.volume_name());
        for (_offset,entry) in &self.files {
            let info = entry.file_info();
            let date = match info.modified {
                Some(d) => d.format("%d-%b-%y").to_string(),
                None => "<NO DATE>".to_string()
            };
            println!("{:27} {:4} {:4} {:8} {:8}  {}",info.name,info.file_type,info.creator,info.data_len,info.rsrc_len,date);
        }
        println!();
        let total = self.vib.total_blocks();
        let free = self.free_count() as usize;
        println!("{} files, {} blocks used, {} unused",self.files.len(),total-free,free);
        println!();
    }

    fn free_count(&self) -> u16 {
        self.vib.free_blocks()
    }
    fn set_free_count(&mut self, count: u16) {
        self.vib.free_blocks = u16::to_be_bytes(count);
    }
    fn block_offset(&self, block: u16) -> usize {
        self.vib.alloc_start()*SECTOR_SIZE + (block - FIRST_BLOCK) as usize * self.vib.alloc_block_size()
    }
    /// 12-bit map value for a block, `Corrupted` when out of range.
    fn map_entry(&self, block: u16) -> Result<u16,DYNERR> {
        if block < FIRST_BLOCK || block as usize > self.map.len() + 1 {
            return Err(Box::new(Error::Corrupted));
        }
        Ok(self.map[(block - FIRST_BLOCK) as usize])
    }
    fn set_map_entry(&mut self, block: u16, val: u16) {
        self.map[(block - FIRST_BLOCK) as usize] = val;
    }
    /// Claim the first `num` free blocks in ascending order and link them
    /// into a chain ending in the end-of-chain mark.  An empty request
    /// returns a null start block and touches nothing.
    fn allocate_chain(&mut self, num: usize) -> Result<(u16,Vec<u16>),DYNERR> {
        if num == 0 {
            return Ok((0,Vec::new()));
        }
        if num > self.free_count() as usize {
            return Err(Box::new(Error::DiskFull));
        }
        let mut blocks: Vec<u16> = Vec::with_capacity(num);
        for i in 0..self.map.len() {
            if self.map[i] == MAP_FREE {
                blocks.push(FIRST_BLOCK + i as u16);
                if blocks.len() == num {
                    break;
                }
            }
        }
        if blocks.len() < num {
            return Err(Box::new(Error::DiskFull));
        }
        for i in 0..num-1 {
            self.set_map_entry(blocks[i],blocks[i+1]);
        }
        self.set_map_entry(blocks[num-1],MAP_LAST);
        self.set_free_count(self.free_count() - num as u16);
        Ok((blocks[0],blocks))
    }
    /// Walk a chain marking every block free.  Corruption stops the walk
    /// with a warning rather than an error; returns the count freed.
    fn free_chain(&mut self, start: u16) -> usize {
        if start == 0 {
            return 0;
        }
        let mut visited = vec![false;self.map.len()];
        let mut freed: u16 = 0;
        let mut block = start;
        loop {
            if block < FIRST_BLOCK || block as usize > self.map.len() + 1 {
                self.warn(Warning::RangeLink(block));
                break;
            }
            let idx = (block - FIRST_BLOCK) as usize;
            if visited[idx] {
                self.warn(Warning::CycleLink(block));
                break;
            }
            visited[idx] = true;
            let next = self.map[idx];
            if next == MAP_FREE {
                self.warn(Warning::FreeLink(block));
                break;
            }
            self.map[idx] = MAP_FREE;
            freed += 1;
            if next == MAP_LAST {
                break;
            }
            block = next;
        }
        self.set_free_count(self.free_count() + freed);
        freed as usize
    }
    fn warn(&mut self, warning: Warning) {
        log::warn!("{}",warning);
        self.warnings.push(warning);
    }
    fn find_entry(&self, name: &[u8]) -> Option<usize> {
        self.files.iter().position(|(_offset,entry)| entry.name == name)
    }
    /// Offset for a new entry of `needed` bytes: right after the last
    /// in-use entry, bumped to the next sector when the entry would cross
    /// a sector boundary.
    fn find_free_slot(&self, needed: usize) -> Result<usize,DYNERR> {
        let dir_start = self.vib.dir_start()*SECTOR_SIZE;
        let dir_end = dir_start + self.vib.dir_len()*SECTOR_SIZE;
        let mut offset = match self.files.last() {
            Some((last_offset,last_entry)) => last_offset + last_entry.len(),
            None => dir_start
        };
        let sector_end = offset - offset%SECTOR_SIZE + SECTOR_SIZE;
        if offset + needed > sector_end {
            offset = sector_end;
        }
        if offset + needed > dir_end {
            return Err(Box::new(Error::DirectoryFull));
        }
        Ok(offset)
    }
    /// Write entry bytes at `offset` and zero out the rest of the sector;
    /// a stale tombstone tail after the new entry must not scan as an entry.
    fn write_entry(&mut self, offset: usize, entry: &FileEntry) {
        let bytes = entry.to_bytes();
        self.buf[offset..offset+bytes.len()].copy_from_slice(&bytes);
        let sector_end = offset - offset%SECTOR_SIZE + SECTOR_SIZE;
        self.buf[offset+bytes.len()..sector_end].fill(0);
    }
    /// Copy fork contents into the blocks of a freshly allocated chain.
    /// The tail of the last block keeps whatever the buffer held.
    fn write_fork(&mut self, src: &[u8], blocks: &[u16]) {
        let abs = self.vib.alloc_block_size();
        for (i,block) in blocks.iter().enumerate() {
            let offset = self.block_offset(*block);
            let count = std::cmp::min(abs,src.len() - i*abs);
            self.buf[offset..offset+count].copy_from_slice(&src[i*abs..i*abs+count]);
        }
    }
    /// Serialize the volume info and repack the map into the MDB sectors.
    fn writeback_mdb(&mut self) -> STDRESULT {
        let mdb_off = MDB_SECTOR*SECTOR_SIZE;
        let vib_bytes = self.vib.to_bytes();
        self.buf[mdb_off..mdb_off+VOL_INFO_SIZE].copy_from_slice(&vib_bytes);
        pack::pack_map(&self.map,&mut self.buf[mdb_off+VOL_INFO_SIZE..mdb_off+MDB_SIZE])
    }
    /// Gather in-use entries sector by sector.  An entry with the in-use
    /// bit clear ends the scan for its sector only.
    fn scan_directory(dimg: &[u8], vib: &VolumeInfo) -> Result<Vec<(usize,FileEntry)>,DYNERR> {
        let mut ans = Vec::new();
        let dir_start = vib.dir_start()*SECTOR_SIZE;
        for sector in 0..vib.dir_len() {
            let sector_beg = dir_start + sector*SECTOR_SIZE;
            let sector_end = sector_beg + SECTOR_SIZE;
            let mut offset = sector_beg;
            while offset + ENTRY_HEADER_SIZE <= sector_end {
                if dimg[offset] & FLAG_IN_USE == 0 {
                    break;
                }
                let entry = match FileEntry::from_bytes(&dimg[offset..sector_end]) {
                    Ok(entry) => entry,
                    Err(_) => {
                        error!("entry at offset {} spans the sector boundary",offset);
                        return Err(Box::new(Error::Corrupted));
                    }
                };
                let entry_len = entry.len();
                ans.push((offset,entry));
                offset += entry_len;
            }
        }
        Ok(ans)
    }
}
