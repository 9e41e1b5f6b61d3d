//! ### Monochromization
//!
//! Strategies for reducing an 8-bit grayscale raster to 1 bit per pixel.
//! Output bytes are packed MSB-left with `1` meaning black, the form the
//! MacPaint raster uses.  Error diffusing strategies work on a widened
//! signed copy of the input; no strategy mutates the caller's buffer.

use log::warn;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{Error,Raster};
use crate::DYNERR;

/// Rec. 709 luma of each pixel, rounded and clamped; alpha is ignored.
pub fn grayscale(img: &Raster) -> Vec<u8> {
    let mut ans = Vec::with_capacity(img.width*img.height);
    for px in img.data.chunks_exact(4) {
        let y = 0.2126*px[0] as f64 + 0.7152*px[1] as f64 + 0.0722*px[2] as f64;
        ans.push(y.round().clamp(0.0,255.0) as u8);
    }
    ans
}

/// Reduces grayscale pixels to packed 1-bit rows.  The width must be a
/// multiple of 8; the output is `width/8 * height` bytes.
pub trait DitherStrategy {
    fn dither(&self, gray: &[u8], width: usize, height: usize) -> Result<Vec<u8>,DYNERR>;
}

fn verify_dimensions(gray: &[u8], width: usize, height: usize) -> Result<(),DYNERR> {
    if width == 0 || width % 8 != 0 || gray.len() != width*height {
        return Err(Box::new(Error::InvalidArgument));
    }
    Ok(())
}

fn set_black(bits: &mut [u8], width: usize, x: usize, y: usize) {
    bits[(y*width + x)/8] |= 0x80 >> (x % 8);
}

/// Fixed cutoff: anything darker than the threshold value becomes black.
pub struct Threshold {
    pub value: u8
}

impl Default for Threshold {
    fn default() -> Self {
        Self { value: 128 }
    }
}

impl DitherStrategy for Threshold {
    fn dither(&self, gray: &[u8], width: usize, height: usize) -> Result<Vec<u8>,DYNERR> {
        verify_dimensions(gray,width,height)?;
        let mut bits = vec![0;width/8*height];
        for y in 0..height {
            for x in 0..width {
                if gray[y*width + x] < self.value {
                    set_black(&mut bits,width,x,y);
                }
            }
        }
        Ok(bits)
    }
}

/// Classic error diffusion: 7/16 right, 3/16 below-left, 5/16 below,
/// 1/16 below-right.
pub struct FloydSteinberg;

impl DitherStrategy for FloydSteinberg {
    fn dither(&self, gray: &[u8], width: usize, height: usize) -> Result<Vec<u8>,DYNERR> {
        verify_dimensions(gray,width,height)?;
        // accumulated error can push working values outside 0..=255
        let mut work: Vec<i16> = gray.iter().map(|g| *g as i16).collect();
        let mut bits = vec![0;width/8*height];
        for y in 0..height {
            for x in 0..width {
                let old = work[y*width + x];
                let quant: i16 = match old < 128 {
                    true => 0,
                    false => 255
                };
                if quant == 0 {
                    set_black(&mut bits,width,x,y);
                }
                let err = (old - quant) as i32;
                let mut spread = |dx: i32, dy: i32, num: i32| {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx >= 0 && nx < width as i32 && ny < height as i32 {
                        work[ny as usize*width + nx as usize] += (err * num / 16) as i16;
                    }
                };
                spread(1,0,7);
                spread(-1,1,3);
                spread(0,1,5);
                spread(1,1,1);
            }
        }
        Ok(bits)
    }
}

/// Bill Atkinson's diffusion: six neighbors each get an eighth of the
/// error, so only 3/4 of it propagates.
pub struct Atkinson;

impl DitherStrategy for Atkinson {
    fn dither(&self, gray: &[u8], width: usize, height: usize) -> Result<Vec<u8>,DYNERR> {
        verify_dimensions(gray,width,height)?;
        let mut work: Vec<i16> = gray.iter().map(|g| *g as i16).collect();
        let mut bits = vec![0;width/8*height];
        for y in 0..height {
            for x in 0..width {
                let old = work[y*width + x];
                let quant: i16 = match old < 128 {
                    true => 0,
                    false => 255
                };
                if quant == 0 {
                    set_black(&mut bits,width,x,y);
                }
                let eighth = ((old - quant) as i32 / 8) as i16;
                let mut spread = |dx: i32, dy: i32| {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx >= 0 && nx < width as i32 && ny < height as i32 {
                        work[ny as usize*width + nx as usize] += eighth;
                    }
                };
                spread(1,0);
                spread(2,0);
                spread(-1,1);
                spread(0,1);
                spread(1,1);
                spread(0,2);
            }
        }
        Ok(bits)
    }
}

/// Supported Bayer matrix orders.
#[derive(FromPrimitive,Clone,Copy,PartialEq,Eq,Debug)]
pub enum BayerOrder {
    Two = 2,
    Four = 4,
    Eight = 8
}

const BAYER2: [[u8;2];2] = [
    [0,2],
    [3,1]
];

const BAYER4: [[u8;4];4] = [
    [0,8,2,10],
    [12,4,14,6],
    [3,11,1,9],
    [15,7,13,5]
];

const BAYER8: [[u8;8];8] = [
    [0,32,8,40,2,34,10,42],
    [48,16,56,24,50,18,58,26],
    [12,44,4,36,14,46,6,38],
    [60,28,52,20,62,30,54,22],
    [3,35,11,43,1,33,9,41],
    [51,19,59,27,49,17,57,25],
    [15,47,7,39,13,45,5,37],
    [63,31,55,23,61,29,53,21]
];

/// Ordered dithering against a tiled threshold matrix.  Stateless, so the
/// output for a given input never varies.
pub struct Bayer {
    order: BayerOrder
}

impl Bayer {
    /// An unsupported order falls back to 4x4 with a warning.
    pub fn new(order: usize) -> Self {
        match BayerOrder::from_usize(order) {
            Some(order) => Self { order },
            None => {
                warn!("unsupported Bayer matrix size {}, using 4",order);
                Self { order: BayerOrder::Four }
            }
        }
    }
    fn matrix_at(&self, x: usize, y: usize) -> u8 {
        match self.order {
            BayerOrder::Two => BAYER2[y % 2][x % 2],
            BayerOrder::Four => BAYER4[y % 4][x % 4],
            BayerOrder::Eight => BAYER8[y % 8][x % 8]
        }
    }
}

impl Default for Bayer {
    fn default() -> Self {
        Self { order: BayerOrder::Four }
    }
}

impl DitherStrategy for Bayer {
    fn dither(&self, gray: &[u8], width: usize, height: usize) -> Result<Vec<u8>,DYNERR> {
        verify_dimensions(gray,width,height)?;
        let n2 = (self.order as u32) * (self.order as u32);
        let mut bits = vec![0;width/8*height];
        for y in 0..height {
            for x in 0..width {
                // gs/255 <= M/n^2, in integers
                let gs = gray[y*width + x] as u32;
                if gs * n2 <= self.matrix_at(x,y) as u32 * 255 {
                    set_black(&mut bits,width,x,y);
                }
            }
        }
        Ok(bits)
    }
}
