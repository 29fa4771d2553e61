//! Physical column types and the column descriptor handed to decoders.

use colpage_common::{Result, error::Error, verify_arg};
use serde::{Deserialize, Serialize};

/// Physical storage type of a column's values.
///
/// The discriminants follow the Parquet thrift `Type` ids. Id 6 (`BYTE_ARRAY`) is
/// a variable-length type and has no counterpart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum PhysicalType {
    Boolean = 0,
    Int32 = 1,
    Int64 = 2,
    Int96 = 3,
    Float = 4,
    Double = 5,
    FixedLenByteArray = 7,
}

impl PhysicalType {
    /// Returns the fixed size of a value in bytes, or `None` if the width is not
    /// implied by the type alone (booleans are bit-packed, fixed-length byte arrays
    /// take their width from the column).
    pub fn primitive_size(&self) -> Option<usize> {
        match self {
            PhysicalType::Boolean => None,
            PhysicalType::Int32 | PhysicalType::Float => Some(4),
            PhysicalType::Int64 | PhysicalType::Double => Some(8),
            PhysicalType::Int96 => Some(12),
            PhysicalType::FixedLenByteArray => None,
        }
    }

    /// Returns `true` for `INT32` and `INT64`.
    pub fn is_integer(&self) -> bool {
        matches!(self, PhysicalType::Int32 | PhysicalType::Int64)
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, PhysicalType::Float | PhysicalType::Double)
    }
}

impl TryFrom<i32> for PhysicalType {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(PhysicalType::Boolean),
            1 => Ok(PhysicalType::Int32),
            2 => Ok(PhysicalType::Int64),
            3 => Ok(PhysicalType::Int96),
            4 => Ok(PhysicalType::Float),
            5 => Ok(PhysicalType::Double),
            6 => Err(Error::unsupported("variable-length BYTE_ARRAY columns")),
            7 => Ok(PhysicalType::FixedLenByteArray),
            _ => Err(Error::invalid_format(
                "physical type",
                format!("unknown physical type id {value}"),
            )),
        }
    }
}

impl std::fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PhysicalType::Boolean => "BOOLEAN",
            PhysicalType::Int32 => "INT32",
            PhysicalType::Int64 => "INT64",
            PhysicalType::Int96 => "INT96",
            PhysicalType::Float => "FLOAT",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::FixedLenByteArray => "FIXED_LEN_BYTE_ARRAY",
        };
        f.write_str(name)
    }
}

/// Describes a leaf column: its dotted path, physical type and, for fixed-length
/// byte arrays, the value width.
///
/// Decoders borrow the descriptor for their whole lifetime and consult it for
/// type-specific metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    path: String,
    physical_type: PhysicalType,
    /// Width of a `FIXED_LEN_BYTE_ARRAY` value in bytes. Zero for other types.
    type_length: usize,
}

impl ColumnDescriptor {
    pub fn new(path: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self {
            path: path.into(),
            physical_type,
            type_length: 0,
        }
    }

    /// Sets the value width of a `FIXED_LEN_BYTE_ARRAY` column.
    pub fn with_type_length(mut self, type_length: usize) -> Self {
        self.type_length = type_length;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }

    /// Returns the fixed byte width of a value of this column.
    ///
    /// Booleans report zero since they are stored one per bit.
    pub fn type_length(&self) -> usize {
        match self.physical_type {
            PhysicalType::FixedLenByteArray => self.type_length,
            other => other.primitive_size().unwrap_or(0),
        }
    }

    /// Verifies that the descriptor is usable for decoding.
    pub fn validate(&self) -> Result<()> {
        if self.physical_type == PhysicalType::FixedLenByteArray {
            verify_arg!(type_length, self.type_length > 0);
        }
        Ok(())
    }
}
