use colpage_format::values::{FixedLenByteArray, Int96};
use num_traits::{FromPrimitive, WrappingAdd};

/// A value stored as a fixed number of little-endian bytes.
///
/// For fixed-length byte arrays the width comes from the column descriptor and
/// `bytes` holds exactly one value.
pub trait FixedWidthValue: Sized {
    /// Width in bytes, or `None` when it is defined by the column.
    const SIZE: Option<usize>;

    fn read_le(bytes: &[u8], dst: &mut Self);
}

macro_rules! impl_fixed_width_value {
    ($($T:ty),*) => {
        $(
            impl FixedWidthValue for $T {
                const SIZE: Option<usize> = Some(std::mem::size_of::<$T>());

                #[inline]
                fn read_le(bytes: &[u8], dst: &mut $T) {
                    let mut b = [0u8; std::mem::size_of::<$T>()];
                    b.copy_from_slice(&bytes[..std::mem::size_of::<$T>()]);
                    *dst = <$T>::from_le_bytes(b);
                }
            }
        )*
    };
}

impl_fixed_width_value!(i32, i64, f32, f64);

impl FixedWidthValue for Int96 {
    const SIZE: Option<usize> = Some(Int96::SIZE);

    #[inline]
    fn read_le(bytes: &[u8], dst: &mut Int96) {
        let mut b = [0u8; Int96::SIZE];
        b.copy_from_slice(&bytes[..Int96::SIZE]);
        *dst = Int96::from_le_bytes(b);
    }
}

impl FixedWidthValue for FixedLenByteArray {
    const SIZE: Option<usize> = None;

    #[inline]
    fn read_le(bytes: &[u8], dst: &mut FixedLenByteArray) {
        dst.set_from_slice(bytes);
    }
}

/// Integer value reconstructed from zigzag headers and bit-packed deltas.
///
/// Arithmetic wraps: writers are allowed to produce deltas that overflow the
/// column type (e.g. `i64::MAX - i64::MIN`).
pub trait DeltaValue:
    colpage_bits::bit_reader::FromBitPacked + WrappingAdd + FromPrimitive + Default + Copy + Send
{
    const BITS: usize;
}

impl DeltaValue for i32 {
    const BITS: usize = 32;
}

impl DeltaValue for i64 {
    const BITS: usize = 64;
}

#[cfg(test)]
mod tests {
    use super::FixedWidthValue;
    use colpage_format::values::{FixedLenByteArray, Int96};

    #[test]
    fn test_read_le() {
        let mut v = 0i32;
        i32::read_le(&(-7i32).to_le_bytes(), &mut v);
        assert_eq!(v, -7);

        let mut d = 0f64;
        f64::read_le(&1.5f64.to_le_bytes(), &mut d);
        assert_eq!(d, 1.5);

        let mut i = Int96::default();
        Int96::read_le(&Int96::new([1, 2, 3]).to_le_bytes(), &mut i);
        assert_eq!(i.words(), &[1, 2, 3]);

        let mut f = FixedLenByteArray::default();
        FixedLenByteArray::read_le(b"xyz", &mut f);
        assert_eq!(f.as_bytes(), b"xyz");
        assert_eq!(<FixedLenByteArray as FixedWidthValue>::SIZE, None);
    }
}
