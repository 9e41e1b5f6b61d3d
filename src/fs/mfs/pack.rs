//! ### MFS packing
//!
//! Byte-level helpers for the volume structures: timestamps, Pascal strings,
//! the packed 12-bit allocation map, and MacRoman transcoding for display.

use chrono::{DateTime,TimeZone,Utc};
use super::types::*;
use crate::{STDRESULT,DYNERR};

/// seconds from the MFS epoch (1904-01-01T00:00:00Z) to the UNIX epoch
pub const MFS_TO_UNIX: i64 = 2_082_844_800;

/// Pack a wall-clock instant as seconds since the MFS epoch.
/// `None` and out-of-range instants become the null date 0.
pub fn pack_date(time: Option<DateTime<Utc>>) -> [u8;4] {
    match time {
        Some(t) => match t.timestamp() + MFS_TO_UNIX {
            s if s < 0 || s > u32::MAX as i64 => [0;4],
            s => u32::to_be_bytes(s as u32)
        },
        None => [0;4]
    }
}

/// Unpack seconds since the MFS epoch; the stored 0 means no date.
pub fn unpack_date(mfs_date: [u8;4]) -> Option<DateTime<Utc>> {
    match u32::from_be_bytes(mfs_date) {
        0 => None,
        s => match Utc.timestamp_opt(s as i64 - MFS_TO_UNIX, 0) {
            chrono::LocalResult::Single(dt) => Some(dt),
            _ => None
        }
    }
}

/// Put a volume name into its fixed 28 byte slot (length byte + 27).
/// Longer names are truncated at a character boundary.
pub fn string_to_vol_name(s: &str) -> [u8;28] {
    let mut ans: [u8;28] = [0;28];
    let mut len = 0;
    for c in s.chars() {
        if len + c.len_utf8() > MAX_VOL_NAME {
            break;
        }
        c.encode_utf8(&mut ans[1+len..]);
        len += c.len_utf8();
    }
    ans[0] = len as u8;
    ans
}

pub fn vol_name_to_string(slot: &[u8;28]) -> String {
    let len = std::cmp::min(slot[0] as usize, MAX_VOL_NAME);
    decode_name(&slot[1..1+len])
}

/// Decode raw name bytes for display.  Names written through this library
/// round-trip as UTF-8; names from real Macintosh volumes fall back to
/// MacRoman.
pub fn decode_name(raw: &[u8]) -> String {
    match String::from_utf8(raw.to_vec()) {
        Ok(s) => s,
        Err(_) => macroman_to_string(raw)
    }
}

/// Pack a type or creator code.  Codes shorter than 4 characters are right
/// padded with `?`, longer ones are truncated.
pub fn string_to_ostype(s: &str) -> [u8;4] {
    let mut ans: [u8;4] = [0x3f;4];
    for (i,b) in s.bytes().enumerate() {
        if i >= 4 {
            break;
        }
        ans[i] = b;
    }
    ans
}

pub fn ostype_to_string(code: [u8;4]) -> String {
    code.iter().map(|b| *b as char).collect()
}

/// Read the 12-bit value at logical index `idx` of a packed map.
/// Two values share each 3 byte triplet.
pub fn get_packed12(map_bits: &[u8], idx: usize) -> u16 {
    let trip = idx / 2 * 3;
    match idx % 2 {
        0 => ((map_bits[trip] as u16) << 4) | ((map_bits[trip+1] as u16) >> 4),
        _ => (((map_bits[trip+1] & 0x0f) as u16) << 8) | (map_bits[trip+2] as u16)
    }
}

/// Write the 12-bit value at logical index `idx`, preserving the other
/// nibble of the shared middle byte.
pub fn set_packed12(map_bits: &mut [u8], idx: usize, val: u16) -> STDRESULT {
    if val > 0xfff {
        return Err(Box::new(Error::InvalidArgument));
    }
    let trip = idx / 2 * 3;
    if idx % 2 == 0 {
        map_bits[trip] = (val >> 4) as u8;
        map_bits[trip+1] = (map_bits[trip+1] & 0x0f) | (((val & 0x0f) as u8) << 4);
    } else {
        map_bits[trip+1] = (map_bits[trip+1] & 0xf0) | ((val >> 8) as u8);
        map_bits[trip+2] = (val & 0xff) as u8;
    }
    Ok(())
}

/// Decode `count` map entries from packed bytes.
pub fn unpack_map(map_bits: &[u8], count: usize) -> Result<Vec<u16>,DYNERR> {
    if (count * 3 + 1) / 2 > map_bits.len() {
        return Err(Box::new(Error::Corrupted));
    }
    let mut ans = Vec::with_capacity(count);
    for i in 0..count {
        ans.push(get_packed12(map_bits,i));
    }
    Ok(ans)
}

/// Pack map entries into bytes, two entries per triplet.
pub fn pack_map(map: &[u16], map_bits: &mut [u8]) -> STDRESULT {
    for (i,val) in map.iter().enumerate() {
        set_packed12(map_bits,i,*val)?;
    }
    Ok(())
}

/// Mac OS Roman codepoints 0x80-0xff
const MACROMAN_HIGH: [char;128] = [
    'Ä','Å','Ç','É','Ñ','Ö','Ü','á','à','â','ä','ã','å','ç','é','è',
    'ê','ë','í','ì','î','ï','ñ','ó','ò','ô','ö','õ','ú','ù','û','ü',
    '†','°','¢','£','§','•','¶','ß','®','©','™','´','¨','≠','Æ','Ø',
    '∞','±','≤','≥','¥','µ','∂','∑','∏','π','∫','ª','º','Ω','æ','ø',
    '¿','¡','¬','√','ƒ','≈','∆','«','»','…','\u{a0}','À','Ã','Õ','Œ','œ',
    '–','—','“','”','‘','’','÷','◊','ÿ','Ÿ','⁄','€','‹','›','ﬁ','ﬂ',
    '‡','·','‚','„','‰','Â','Ê','Á','Ë','È','Í','Î','Ï','Ì','Ó','Ô',
    '\u{f8ff}','Ò','Ú','Û','Ù','ı','ˆ','˜','¯','˘','˙','˚','¸','˝','˛','ˇ'
];

/// Decode MacRoman bytes for display.
pub fn macroman_to_string(raw: &[u8]) -> String {
    raw.iter().map(|b| match b {
        b if *b < 0x80 => *b as char,
        b => MACROMAN_HIGH[(*b - 0x80) as usize]
    }).collect()
}

/// Encode a string as MacRoman, or None if some character has no MacRoman
/// codepoint.
pub fn string_to_macroman(s: &str) -> Option<Vec<u8>> {
    let mut ans = Vec::new();
    for c in s.chars() {
        if (c as u32) < 0x80 {
            ans.push(c as u8);
        } else {
            match MACROMAN_HIGH.iter().position(|mac| *mac==c) {
                Some(idx) => ans.push(0x80 + idx as u8),
                None => return None
            }
        }
    }
    Some(ans)
}
