use alloy::primitives::U256;

use crate::{AmountError, AmountResult};

/// Decimal precision of the protocol stablecoin.
pub const STABLECOIN_DECIMALS: u8 = 6;

/// Convert a human-unit decimal string into integer base units.
///
/// Excess fractional digits are truncated, never rounded up, so the caller
/// can never submit more than the user typed. Rejects missing, non-numeric
/// and non-positive input.
pub fn parse_base_units(input: &str, decimals: u8) -> AmountResult<U256> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(AmountError::Missing);
  }
  if trimmed.starts_with('-') || trimmed.starts_with('+') {
    return Err(AmountError::NotPositive(trimmed.to_string()));
  }

  let (int_part, frac_part) = match trimmed.split_once('.') {
    Some((i, f)) => (i, f),
    None => (trimmed, ""),
  };
  if int_part.is_empty() && frac_part.is_empty() {
    return Err(AmountError::Malformed(trimmed.to_string()));
  }
  if !int_part.chars().all(|c| c.is_ascii_digit())
    || !frac_part.chars().all(|c| c.is_ascii_digit())
  {
    return Err(AmountError::Malformed(trimmed.to_string()));
  }

  // U256 holds just under 78 decimal digits.
  if decimals > 77 {
    return Err(AmountError::Overflow);
  }

  let scale = U256::from(10u64).pow(U256::from(decimals));
  let int_value = if int_part.is_empty() {
    U256::ZERO
  } else {
    U256::from_str_radix(int_part, 10).map_err(|_| AmountError::Overflow)?
  };
  let mut value = int_value.checked_mul(scale).ok_or(AmountError::Overflow)?;

  // keep at most `decimals` fractional digits, truncating the rest
  let kept = &frac_part[..frac_part.len().min(decimals as usize)];
  if !kept.is_empty() {
    let frac_scale = U256::from(10u64).pow(U256::from(decimals as usize - kept.len()));
    let frac_value = U256::from_str_radix(kept, 10)
      .map_err(|_| AmountError::Malformed(trimmed.to_string()))?
      .checked_mul(frac_scale)
      .ok_or(AmountError::Overflow)?;
    value = value.checked_add(frac_value).ok_or(AmountError::Overflow)?;
  }

  if value.is_zero() {
    return Err(AmountError::NotPositive(trimmed.to_string()));
  }

  Ok(value)
}

/// Render integer base units as a human-unit decimal string.
pub fn format_base_units(value: U256, decimals: u8) -> String {
  if decimals == 0 {
    return value.to_string();
  }
  let scale = U256::from(10u64).pow(U256::from(decimals));
  let int_part = value / scale;
  let frac_part = value % scale;

  let mut frac_str = format!("{:0>width$}", frac_part.to_string(), width = decimals as usize);
  while frac_str.ends_with('0') {
    frac_str.pop();
  }
  if frac_str.is_empty() {
    int_part.to_string()
  } else {
    format!("{}.{}", int_part, frac_str)
  }
}
