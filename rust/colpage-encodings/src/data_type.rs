//! Physical data types the decoders are instantiated for.

use crate::{encodings::plain::PlainValue, factory::DecoderSupport};
use colpage_format::{
    schema::PhysicalType,
    values::{FixedLenByteArray, Int96},
};
use std::fmt::Debug;

/// Native in-memory representation of a physical type.
pub trait ValueType:
    Clone + Default + Debug + PartialEq + Send + Sync + PlainValue + DecoderSupport + 'static
{
    const PHYSICAL_TYPE: PhysicalType;
}

/// A physical data type, binding a [`PhysicalType`] to its native value type.
///
/// Decoders are generic over this trait and are monomorphized once per
/// encoding and type pair.
pub trait DataType: Send + Sync + 'static {
    type T: ValueType;

    fn get_physical_type() -> PhysicalType {
        <Self::T as ValueType>::PHYSICAL_TYPE
    }
}

macro_rules! make_type {
    ($name:ident, $physical_ty:expr, $native_ty:ty) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ValueType for $native_ty {
            const PHYSICAL_TYPE: PhysicalType = $physical_ty;
        }

        impl DataType for $name {
            type T = $native_ty;
        }
    };
}

make_type!(BoolType, PhysicalType::Boolean, bool);
make_type!(Int32Type, PhysicalType::Int32, i32);
make_type!(Int64Type, PhysicalType::Int64, i64);
make_type!(Int96Type, PhysicalType::Int96, Int96);
make_type!(FloatType, PhysicalType::Float, f32);
make_type!(DoubleType, PhysicalType::Double, f64);
make_type!(
    FixedLenByteArrayType,
    PhysicalType::FixedLenByteArray,
    FixedLenByteArray
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_types() {
        assert_eq!(BoolType::get_physical_type(), PhysicalType::Boolean);
        assert_eq!(Int32Type::get_physical_type(), PhysicalType::Int32);
        assert_eq!(Int64Type::get_physical_type(), PhysicalType::Int64);
        assert_eq!(Int96Type::get_physical_type(), PhysicalType::Int96);
        assert_eq!(FloatType::get_physical_type(), PhysicalType::Float);
        assert_eq!(DoubleType::get_physical_type(), PhysicalType::Double);
        assert_eq!(
            FixedLenByteArrayType::get_physical_type(),
            PhysicalType::FixedLenByteArray
        );
    }
}
