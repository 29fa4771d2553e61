//! Spaced decoding: placing a dense run of non-null values into the slots a
//! validity bitmap marks as non-null.

use colpage_bits::bitmap::ValidityBitmap;
use colpage_common::{Result, error::Error, verify_arg};

/// Validates the arguments of a spaced decode over `num_slots` slots and returns
/// the number of non-null values to decode.
///
/// Fails with `InvalidArgument` if `null_count` exceeds `num_slots`, if the bitmap
/// does not cover `num_slots` bits, or if the bitmap's null count over the window
/// disagrees with `null_count`.
pub fn check_spaced_args(
    num_slots: usize,
    null_count: usize,
    valid_bits: &ValidityBitmap<'_>,
) -> Result<usize> {
    verify_arg!(null_count, null_count <= num_slots);
    verify_arg!(valid_bits, valid_bits.len() >= num_slots);

    let values_to_read = num_slots - null_count;
    let valid_count = valid_bits.count_valid(num_slots);
    if valid_count != values_to_read {
        return Err(Error::invalid_arg(
            "null_count",
            format!(
                "expected {null_count} nulls in {num_slots} slots, validity bitmap has {}",
                num_slots - valid_count
            ),
        ));
    }
    Ok(values_to_read)
}

/// Moves the `values_read` dense values at the front of `buffer` to the slots
/// marked non-null in `valid_bits`, in their original relative order.
///
/// The bitmap must mark exactly `values_read` of the `buffer.len()` slots as
/// non-null (see [`check_spaced_args`]). Values are swapped rather than copied,
/// so after the call every null slot holds one of the placeholders the caller
/// left in `buffer[values_read..]`; if those placeholders are all equal, null
/// slots end up exactly as the caller provided them.
pub fn spread_dense_values<V>(buffer: &mut [V], values_read: usize, valid_bits: &ValidityBitmap<'_>) {
    debug_assert!(values_read <= buffer.len());

    // The walk must go back to front. The dense run occupies the front of the
    // buffer, so for every non-null slot `i` the source index satisfies
    // `src <= i`, and `src` strictly decreases: each source is read before any
    // later step can overwrite it.
    let mut src = values_read;
    for i in (0..buffer.len()).rev() {
        if src == 0 {
            break;
        }
        if valid_bits.is_valid(i) {
            src -= 1;
            debug_assert!(src <= i);
            buffer.swap(i, src);
        }
    }
    debug_assert_eq!(src, 0);
}
