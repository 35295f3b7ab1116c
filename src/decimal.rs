//! Decimal logical type (C3): scale-aware decimal on top of raw byte fields,
//! using a minimal two's-complement byte representation.

use crate::error::{Error, Result};

/// A fixed-point decimal: `unscaled / 10^scale`. Backed by `i64` since
/// arbitrary-precision integers are out of scope for this codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decimal {
    pub unscaled: i64,
    pub scale: u32,
}

impl Decimal {
    pub fn to_f64(self) -> f64 {
        self.unscaled as f64 / 10f64.powi(self.scale as i32)
    }
}

fn pow10_i64(p: u32) -> Option<i64> {
    10i64.checked_pow(p)
}

/// Round `value * 10^scale` to the nearest integer, then check it fits
/// within `precision` decimal digits, producing the wire `unscaled` value.
pub fn quantize(value: f64, scale: u32, precision: u32) -> Result<i64> {
    let factor = 10f64.powi(scale as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return Err(Error::DecimalOutOfRange {
            detail: format!("{} is not a finite numeric value", value),
        });
    }
    let unscaled = scaled.round() as i64;
    check_precision(unscaled, precision)?;
    Ok(unscaled)
}

pub fn check_precision(unscaled: i64, precision: u32) -> Result<()> {
    let bound = pow10_i64(precision).ok_or_else(|| Error::DecimalOutOfRange {
        detail: format!("precision {} is too large to represent", precision),
    })?;
    if unscaled.unsigned_abs() >= bound as u64 {
        return Err(Error::DecimalOutOfRange {
            detail: format!(
                "unscaled value {} is out of range for precision {}",
                unscaled, precision,
            ),
        });
    }
    Ok(())
}

/// Serialize `unscaled` as the shortest two's-complement byte sequence that
/// represents it (minimum one byte).
pub fn encode_unscaled(unscaled: i64) -> Vec<u8> {
    let full = unscaled.to_be_bytes();
    let negative = unscaled < 0;
    let sign_fill: u8 = if negative { 0xFF } else { 0x00 };
    let mut start = 0;
    while start < 7 {
        let byte_matches_fill = full[start] == sign_fill;
        let next_msb_matches_sign = (full[start + 1] & 0x80 != 0) == negative;
        if byte_matches_fill && next_msb_matches_sign {
            start += 1;
        } else {
            break;
        }
    }
    full[start..].to_vec()
}

/// Sign-extend `bytes` (the minimal two's-complement form) back to an `i64`.
pub fn decode_unscaled(bytes: &[u8]) -> Result<i64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(Error::DecimalOutOfRange {
            detail: format!("{} is not a valid decimal byte length", bytes.len()),
        });
    }
    let sign_fill: u8 = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut full = [sign_fill; 8];
    full[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(full))
}

pub fn unscaled_to_value(unscaled: i64, scale: u32) -> f64 {
    unscaled as f64 / 10f64.powi(scale as i32)
}

/// Serialize `unscaled` as an exactly `size`-byte two's-complement value,
/// for the `fixed` logical type (which has no length prefix to shrink).
pub fn encode_unscaled_fixed(unscaled: i64, size: usize) -> Result<Vec<u8>> {
    let minimal = encode_unscaled(unscaled);
    if minimal.len() > size {
        return Err(Error::DecimalOutOfRange {
            detail: format!("unscaled value needs {} bytes, fixed size is {}", minimal.len(), size),
        });
    }
    let sign_fill: u8 = if unscaled < 0 { 0xFF } else { 0x00 };
    let mut out = vec![sign_fill; size];
    out[size - minimal.len()..].copy_from_slice(&minimal);
    Ok(out)
}

pub fn decode_unscaled_fixed(bytes: &[u8]) -> Result<i64> {
    decode_unscaled(bytes)
}
