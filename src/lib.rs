//! # `mackit` main library
//!
//! This library manipulates disk images and picture files for the original
//! Macintosh, with emphasis on the Macintosh File System (MFS) and the
//! MacPaint (PNTG) picture format.
//!
//! ## Architecture
//!
//! The two subsystems are joined by a narrow contract: the file system treats
//! a MacPaint file as an opaque byte buffer destined for a file's data fork.
//! * `fs::mfs::Disk` owns a volume image as a contiguous byte buffer and
//!   performs create/read/write/delete of files with independent data and
//!   resource forks.  Changes are not permanent until the image is saved to
//!   whatever file system is hosting mackit.
//! * `img::pntg` parses and serializes MacPaint files.  Serialization runs an
//!   arbitrary RGBA raster through crop, pad, bilinear scale, grayscale, and
//!   a pluggable dithering strategy before packing scanlines with PackBits.
//!
//! ## File Names
//!
//! MFS stores file and volume names as raw 8-bit Pascal strings and this
//! library does not transcode them; names are compared byte-wise.  The
//! on-disk convention is MacRoman, and `fs::mfs::pack` provides a MacRoman
//! transcoder for display of names that are not valid UTF-8.

pub mod fs;
pub mod img;

use fs::mfs;
use log::info;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Save the image file (make changes permanent)
pub fn save_img(disk: &mfs::Disk, img_path: &str) -> STDRESULT {
    std::fs::write(img_path, disk.to_img())?;
    Ok(())
}

/// Given a bytestream return an MFS volume, or Err if the bytestream
/// cannot be interpreted as one.
pub fn create_mfs_from_bytestream(dimg: &[u8]) -> Result<mfs::Disk, DYNERR> {
    if mfs::Disk::test_img(dimg) {
        info!("identified MFS file system");
        return mfs::Disk::from_img(dimg);
    }
    Err(Box::new(fs::mfs::types::Error::InvalidSignature))
}

/// Buffer a disk image file and try to interpret it as an MFS volume.
pub fn create_mfs_from_file(img_path: &str) -> Result<mfs::Disk, DYNERR> {
    let dimg = std::fs::read(img_path)?;
    create_mfs_from_bytestream(&dimg)
}
