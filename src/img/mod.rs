//! # Image Module
//!
//! This is a container for picture format modules and the raster operations
//! they share.  The only format at present is MacPaint (`pntg`), which
//! demands a 576x720 monochrome raster; `Raster` carries arbitrary RGBA
//! pixels and provides the crop, pad, and bilinear scale steps that coerce
//! a source image into those dimensions before monochromization.

pub mod packbits;
pub mod dither;
pub mod pntg;

use crate::DYNERR;

/// Enumerates image errors.  The `Display` trait will print the long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("image data is damaged")]
    Corrupted,
    #[error("not a MacPaint file")]
    InvalidFormat
}

/// A rectangle in pixel coordinates, used to select part of a raster.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize
}

/// Fill color for padded regions of a monochrome-bound raster.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum Fill {
    White,
    Black
}

impl Fill {
    fn rgba(&self) -> [u8;4] {
        match self {
            Self::White => [255,255,255,255],
            Self::Black => [0,0,0,255]
        }
    }
}

/// An RGBA raster, 4 bytes per pixel, rows packed top to bottom.
#[derive(Clone,PartialEq,Eq,Debug)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>
}

impl Raster {
    /// Create a raster filled with the given color.
    pub fn new(width: usize, height: usize, fill: Fill) -> Self {
        let px = fill.rgba();
        let mut data = Vec::with_capacity(width*height*4);
        for _i in 0..width*height {
            data.extend_from_slice(&px);
        }
        Self { width, height, data }
    }
    /// Wrap existing RGBA bytes; the buffer must be exactly 4*width*height.
    pub fn from_data(width: usize, height: usize, data: Vec<u8>) -> Result<Self,DYNERR> {
        if data.len() != width*height*4 {
            return Err(Box::new(Error::InvalidArgument));
        }
        Ok(Self { width, height, data })
    }
    pub fn pixel(&self, x: usize, y: usize) -> [u8;4] {
        let idx = (y*self.width + x)*4;
        [self.data[idx],self.data[idx+1],self.data[idx+2],self.data[idx+3]]
    }
    pub fn set_pixel(&mut self, x: usize, y: usize, px: [u8;4]) {
        let idx = (y*self.width + x)*4;
        self.data[idx..idx+4].copy_from_slice(&px);
    }
    /// Copy out a rectangle.  The rectangle must have positive dimensions
    /// and lie entirely within the raster.
    pub fn crop(&self, rect: &Rect) -> Result<Self,DYNERR> {
        if rect.width == 0 || rect.height == 0 {
            return Err(Box::new(Error::InvalidArgument));
        }
        if rect.x + rect.width > self.width || rect.y + rect.height > self.height {
            return Err(Box::new(Error::InvalidArgument));
        }
        let mut data = Vec::with_capacity(rect.width*rect.height*4);
        for row in rect.y..rect.y+rect.height {
            let beg = (row*self.width + rect.x)*4;
            data.extend_from_slice(&self.data[beg..beg+rect.width*4]);
        }
        Ok(Self { width: rect.width, height: rect.height, data })
    }
    /// Produce a raster of the target dimensions filled with `fill`, with
    /// this image copied in at `(off_x,off_y)`.  Source pixels falling
    /// outside the target are silently clipped.
    pub fn pad(&self, width: usize, height: usize, off_x: i32, off_y: i32, fill: Fill) -> Self {
        let mut ans = Self::new(width,height,fill);
        for y in 0..self.height {
            let ty = y as i32 + off_y;
            if ty < 0 || ty >= height as i32 {
                continue;
            }
            for x in 0..self.width {
                let tx = x as i32 + off_x;
                if tx < 0 || tx >= width as i32 {
                    continue;
                }
                ans.set_pixel(tx as usize,ty as usize,self.pixel(x,y));
            }
        }
        ans
    }
    /// Bilinear resample to the target dimensions, each channel
    /// interpolated independently.  A no-op when the dimensions already
    /// match.
    pub fn scale(&self, width: usize, height: usize) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let x_ratio = self.width as f64 / width as f64;
        let y_ratio = self.height as f64 / height as f64;
        let mut data = Vec::with_capacity(width*height*4);
        for y in 0..height {
            let sy = y as f64 * y_ratio;
            let y0 = sy.floor() as usize;
            let y1 = std::cmp::min(y0+1,self.height-1);
            let dy = sy - y0 as f64;
            for x in 0..width {
                let sx = x as f64 * x_ratio;
                let x0 = sx.floor() as usize;
                let x1 = std::cmp::min(x0+1,self.width-1);
                let dx = sx - x0 as f64;
                let p00 = self.pixel(x0,y0);
                let p01 = self.pixel(x1,y0);
                let p10 = self.pixel(x0,y1);
                let p11 = self.pixel(x1,y1);
                for c in 0..4 {
                    let top = p00[c] as f64 * (1.0-dx) + p01[c] as f64 * dx;
                    let bot = p10[c] as f64 * (1.0-dx) + p11[c] as f64 * dx;
                    data.push((top * (1.0-dy) + bot * dy).round() as u8);
                }
            }
        }
        Self { width, height, data }
    }
}
