//! ### PackBits codec
//!
//! Byte-oriented run length encoding with signed control bytes, applied to
//! each MacPaint scanline independently.  A control byte `n` means: copy the
//! next `n+1` bytes literally for `0..=127`, repeat the next byte `1-n`
//! times for `-127..=-1`, and do nothing for `-128`.

use log::error;
use super::Error;
use crate::DYNERR;

/// Decode packets from `src` until exactly `row_bytes` of output exist.
/// Returns the output and the count of input bytes consumed.  Producing
/// more than `row_bytes`, or exhausting the input first, is `Corrupted`.
pub fn unpack_scanline(src: &[u8], row_bytes: usize) -> Result<(Vec<u8>,usize),DYNERR> {
    let mut ans: Vec<u8> = Vec::with_capacity(row_bytes);
    let mut ptr: usize = 0;
    while ans.len() < row_bytes {
        if ptr >= src.len() {
            error!("scanline data exhausted at {} of {} bytes",ans.len(),row_bytes);
            return Err(Box::new(Error::Corrupted));
        }
        let control = src[ptr] as i8;
        ptr += 1;
        match control {
            -128 => continue,
            n if n >= 0 => {
                let count = n as usize + 1;
                if ptr + count > src.len() {
                    error!("literal packet overruns the input");
                    return Err(Box::new(Error::Corrupted));
                }
                ans.extend_from_slice(&src[ptr..ptr+count]);
                ptr += count;
            },
            n => {
                let count = 1 - n as isize;
                if ptr >= src.len() {
                    error!("repeat packet overruns the input");
                    return Err(Box::new(Error::Corrupted));
                }
                for _i in 0..count {
                    ans.push(src[ptr]);
                }
                ptr += 1;
            }
        }
        if ans.len() > row_bytes {
            error!("scanline decoded to {} bytes, expected {}",ans.len(),row_bytes);
            return Err(Box::new(Error::Corrupted));
        }
    }
    Ok((ans,ptr))
}

/// Greedy scanline encoder.  Runs of 2 or more identical bytes become
/// 2-byte repeat packets; everything else accumulates into literal packets
/// of up to 128 bytes.  Output is at most `src.len() + 1` bytes.
pub fn pack_scanline(src: &[u8]) -> Vec<u8> {
    let mut ans: Vec<u8> = Vec::new();
    let mut ptr: usize = 0;
    while ptr < src.len() {
        let mut run = 1;
        while ptr + run < src.len() && src[ptr+run] == src[ptr] && run < 128 {
            run += 1;
        }
        if run >= 2 {
            ans.push((1 - run as isize) as u8);
            ans.push(src[ptr]);
            ptr += run;
            continue;
        }
        // literal run: stop at the input's end, at the start of a repeat,
        // or at 128 bytes
        let beg = ptr;
        let mut len = 1;
        ptr += 1;
        while ptr < src.len() && len < 128 {
            if ptr + 1 < src.len() && src[ptr+1] == src[ptr] {
                break;
            }
            len += 1;
            ptr += 1;
        }
        ans.push((len - 1) as u8);
        ans.extend_from_slice(&src[beg..beg+len]);
    }
    ans
}
