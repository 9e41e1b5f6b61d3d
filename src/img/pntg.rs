//! # MacPaint (PNTG) picture module
//!
//! This parses and serializes MacPaint files.  A MacPaint file is a 512
//! byte header (version marker, 38 8-byte fill pattern tiles, padding)
//! followed by 720 PackBits-compressed 72 byte scanlines, one per raster
//! row.  Files arriving from the wild may carry a 128 byte MacBinary
//! wrapper, which is detected and skipped on input only.

use log::{info,warn,error};

use super::{packbits,dither,Error,Raster,Rect,Fill};
use super::dither::{DitherStrategy,Threshold};
use crate::DYNERR;

pub const WIDTH: usize = 576;
pub const HEIGHT: usize = 720;
pub const ROW_BYTES: usize = WIDTH/8;
pub const HEADER_SIZE: usize = 512;
pub const VERSION: u32 = 2;
pub const NUM_PATTERNS: usize = 38;
pub const PATTERN_SIZE: usize = 8;
pub const MACBINARY_SIZE: usize = 128;

/// The 38 8x8 fill pattern tiles stored in a MacPaint header.
pub type Patterns = [[u8;PATTERN_SIZE];NUM_PATTERNS];

/// A decoded MacPaint file: the 576x720 raster expanded to RGBA, plus the
/// header's pattern tiles.  A painting built from a bare raster has no
/// patterns; zero tiles are written in that case.
pub struct Painting {
    pub raster: Raster,
    pub patterns: Option<Patterns>
}

/// Controls serialization.  The raster is cropped, padded, and scaled to
/// 576x720 as configured, then monochromized with the dither strategy.
pub struct WriteOptions {
    pub crop: Option<Rect>,
    pub padding: Option<Padding>,
    pub patterns: Option<Patterns>,
    pub dither: Box<dyn DitherStrategy>
}

/// Placement and fill for padding a small image up to MacPaint dimensions.
#[derive(Clone,Copy)]
pub struct Padding {
    pub x: i32,
    pub y: i32,
    pub fill: Fill
}

impl WriteOptions {
    pub fn new() -> Self {
        Self {
            crop: None,
            padding: None,
            patterns: None,
            dither: Box::new(Threshold::default())
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// MacBinary sniff: zero byte, plausible name length, "PNTG" at offset 65.
fn detect_macbinary(dat: &[u8]) -> bool {
    dat.len() >= MACBINARY_SIZE && dat[0] == 0 && dat[1] >= 1 && dat[1] <= 63 && dat[65..69] == *b"PNTG"
}

impl Painting {
    pub fn from_raster(raster: Raster) -> Self {
        Self { raster, patterns: None }
    }
    /// Decode a MacPaint file, skipping a MacBinary wrapper when present.
    /// A marker other than 2 is tolerated with a warning; truncated or
    /// overlong scanline data is not.
    pub fn from_bytes(dat: &[u8]) -> Result<Self,DYNERR> {
        let mut ptr = match detect_macbinary(dat) {
            true => {
                info!("skipping MacBinary wrapper");
                MACBINARY_SIZE
            },
            false => 0
        };
        if dat.len() < ptr + HEADER_SIZE {
            error!("{} bytes is too short for the MacPaint header",dat.len());
            return Err(Box::new(Error::InvalidFormat));
        }
        let version = u32::from_be_bytes([dat[ptr],dat[ptr+1],dat[ptr+2],dat[ptr+3]]);
        if version != VERSION {
            warn!("unexpected MacPaint version {}",version);
        }
        let mut patterns: Patterns = [[0;PATTERN_SIZE];NUM_PATTERNS];
        for (i,tile) in patterns.iter_mut().enumerate() {
            let beg = ptr + 4 + i*PATTERN_SIZE;
            tile.copy_from_slice(&dat[beg..beg+PATTERN_SIZE]);
        }
        ptr += HEADER_SIZE;
        let mut raster = Raster::new(WIDTH,HEIGHT,Fill::White);
        for y in 0..HEIGHT {
            let (row,consumed) = packbits::unpack_scanline(&dat[ptr..],ROW_BYTES)?;
            ptr += consumed;
            for x in 0..WIDTH {
                if row[x/8] & (0x80 >> (x % 8)) > 0 {
                    raster.set_pixel(x,y,[0,0,0,255]);
                }
            }
        }
        Ok(Self { raster, patterns: Some(patterns) })
    }
    /// Encode as a MacPaint file, coercing the raster to 576x720 first.
    pub fn to_bytes(&self, opts: &WriteOptions) -> Result<Vec<u8>,DYNERR> {
        let mut work = match &opts.crop {
            Some(rect) => self.raster.crop(rect)?,
            None => self.raster.clone()
        };
        if let Some(padding) = &opts.padding {
            if work.width < WIDTH || work.height < HEIGHT {
                work = work.pad(WIDTH,HEIGHT,padding.x,padding.y,padding.fill);
            }
        }
        if work.width != WIDTH || work.height != HEIGHT {
            work = work.scale(WIDTH,HEIGHT);
        }
        let gray = dither::grayscale(&work);
        let bits = opts.dither.dither(&gray,WIDTH,HEIGHT)?;
        let mut ans = Vec::with_capacity(HEADER_SIZE + HEIGHT*(ROW_BYTES+1));
        ans.extend_from_slice(&u32::to_be_bytes(VERSION));
        let patterns = opts.patterns.or(self.patterns).unwrap_or([[0;PATTERN_SIZE];NUM_PATTERNS]);
        for tile in &patterns {
            ans.extend_from_slice(tile);
        }
        ans.resize(HEADER_SIZE,0);
        for y in 0..HEIGHT {
            let row = &bits[y*ROW_BYTES..(y+1)*ROW_BYTES];
            ans.append(&mut packbits::pack_scanline(row));
        }
        Ok(ans)
    }
}
