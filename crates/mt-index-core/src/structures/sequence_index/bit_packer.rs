//! Bit-level packing of token sequences.
//!
//! Layout, least significant bit first within each byte: for every token `t`
//! a 3-bit header holding the number `g` of 4-bit groups needed for `t + 1`,
//! followed by `t + 1` in `4 * g` bits. The buffer always has at least one
//! spare byte past the last payload, so the header after the last token reads
//! as zero and terminates decoding without a stored length.

use crate::constants::{MAX_PACKED_TOKEN, PACK_GROUP_BITS, PACK_HEADER_BITS};
use crate::types::error::{IndexError, Result};
use crate::types::TokenId;

/// Number of 4-bit groups needed for `value` (at least one).
#[inline]
fn groups(value: u32) -> u32 {
    let significant = u32::BITS - value.leading_zeros();
    significant.div_ceil(PACK_GROUP_BITS).max(1)
}

/// OR the low `width` bits of `value` into `buf` starting at bit `pos`.
fn write_bits(buf: &mut [u8], mut pos: usize, width: u32, mut value: u32) {
    let mut remaining = width;
    while remaining > 0 {
        let offset = (pos % 8) as u32;
        let take = (8 - offset).min(remaining);
        let chunk = (value & ((1u32 << take) - 1)) as u8;
        buf[pos / 8] |= chunk << offset;
        value >>= take;
        pos += take as usize;
        remaining -= take;
    }
}

/// Read `width` bits starting at bit `pos`. Bits past the end read as zero.
fn read_bits(buf: &[u8], mut pos: usize, width: u32) -> u32 {
    let mut out = 0u32;
    let mut filled = 0u32;
    while filled < width {
        let Some(&byte) = buf.get(pos / 8) else { break };
        let offset = (pos % 8) as u32;
        let take = (8 - offset).min(width - filled);
        let chunk = (byte as u32 >> offset) & ((1u32 << take) - 1);
        out |= chunk << filled;
        filled += take;
        pos += take as usize;
    }
    out
}

/// Encoded size of `input` in bits, excluding the terminator.
fn encoded_bits(input: &[TokenId]) -> Result<usize> {
    input.iter().try_fold(0usize, |bits, &token| {
        if token > MAX_PACKED_TOKEN {
            return Err(IndexError::ValueTooWide { value: token, max: MAX_PACKED_TOKEN });
        }
        Ok(bits + (PACK_HEADER_BITS + groups(token + 1) * PACK_GROUP_BITS) as usize)
    })
}

/// Pack a token sequence. Fails only for tokens above [`MAX_PACKED_TOKEN`].
pub fn compress(input: &[TokenId]) -> Result<Vec<u8>> {
    let bits = encoded_bits(input)?;
    let mut out = vec![0u8; bits / 8 + 1];
    let mut pos = 0usize;
    for &token in input {
        let value = token + 1;
        let g = groups(value);
        write_bits(&mut out, pos, PACK_HEADER_BITS, g);
        pos += PACK_HEADER_BITS as usize;
        write_bits(&mut out, pos, g * PACK_GROUP_BITS, value);
        pos += (g * PACK_GROUP_BITS) as usize;
    }
    Ok(out)
}

/// Unpack a buffer produced by [`compress`].
pub fn decompress(input: &[u8]) -> Result<Vec<TokenId>> {
    let total = input.len() * 8;
    let mut out = Vec::new();
    let mut pos = 0usize;
    loop {
        let g = read_bits(input, pos, PACK_HEADER_BITS);
        let header_end = pos + PACK_HEADER_BITS as usize;
        if g == 0 {
            return check_tail(input, pos.min(total), out);
        }
        let width = g * PACK_GROUP_BITS;
        if header_end + width as usize > total {
            return Err(IndexError::MalformedEncoding {
                reason: format!("payload of {} bits at bit {} runs past {} bits", width, header_end, total),
            });
        }
        let value = read_bits(input, header_end, width);
        if value == 0 {
            return check_tail(input, header_end + width as usize, out);
        }
        out.push(value - 1);
        pos = header_end + width as usize;
    }
}

/// Everything after the terminator must be zero padding.
fn check_tail(input: &[u8], pos: usize, out: Vec<TokenId>) -> Result<Vec<TokenId>> {
    let total = input.len() * 8;
    let mut bit = pos;
    while bit < total {
        let width = ((total - bit) as u32).min(16);
        if read_bits(input, bit, width) != 0 {
            return Err(IndexError::MalformedEncoding {
                reason: format!("non-zero bits after terminator at bit {}", bit),
            });
        }
        bit += width as usize;
    }
    if input.is_empty() {
        return Err(IndexError::MalformedEncoding { reason: "empty buffer has no terminator".into() });
    }
    Ok(out)
}
