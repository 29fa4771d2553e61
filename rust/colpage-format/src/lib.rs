//! Column type metadata shared by the decoders: physical types, native value types,
//! encoding tags and the column descriptor.

pub mod encoding;
pub mod schema;
pub mod values;
