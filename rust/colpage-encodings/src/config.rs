use std::collections::HashSet;

use colpage_common::{Result, error::Error};
use colpage_format::encoding::Encoding;
use serde::{Deserialize, Serialize};

/// Options applied when decoders are created through the factory functions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// If set, only these encodings may be decoded.
    pub allowed_encodings: Option<HashSet<Encoding>>,

    /// Encodings that must not be decoded.
    pub disallowed_encodings: Option<HashSet<Encoding>>,

    /// Maximum number of dictionary entries a dictionary page may hold.
    pub max_dictionary_len: Option<usize>,
}

impl DecoderConfig {
    pub fn with_allowed_encodings(&self, encodings: &[Encoding]) -> Self {
        let mut config = self.clone();
        config.allowed_encodings = Some(encodings.iter().cloned().collect());
        config
    }

    pub fn with_disallowed_encodings(&self, encodings: &[Encoding]) -> Self {
        let mut config = self.clone();
        config.disallowed_encodings = Some(encodings.iter().cloned().collect());
        config
    }

    pub fn with_max_dictionary_len(&self, max_len: usize) -> Self {
        let mut config = self.clone();
        config.max_dictionary_len = Some(max_len);
        config
    }

    pub fn is_encoding_allowed(&self, encoding: Encoding) -> bool {
        if !self
            .allowed_encodings
            .as_ref()
            .is_none_or(|encodings| encodings.contains(&encoding))
        {
            return false;
        }
        if self
            .disallowed_encodings
            .as_ref()
            .is_some_and(|encodings| encodings.contains(&encoding))
        {
            return false;
        }
        true
    }

    /// Fails with `Unsupported` if `encoding` is excluded by this configuration.
    pub fn check_encoding(&self, encoding: Encoding) -> Result<()> {
        if self.is_encoding_allowed(encoding) {
            Ok(())
        } else {
            Err(Error::unsupported(format!(
                "{encoding} encoding is disabled by the decoder configuration"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DecoderConfig;
    use colpage_common::error::ErrorKind;
    use colpage_format::encoding::Encoding;

    #[test]
    fn test_allowed_and_disallowed() {
        let config = DecoderConfig::default();
        assert!(config.is_encoding_allowed(Encoding::DeltaBinaryPacked));

        let config = config.with_allowed_encodings(&[Encoding::Plain, Encoding::RleDictionary]);
        assert!(config.is_encoding_allowed(Encoding::Plain));
        assert!(!config.is_encoding_allowed(Encoding::ByteStreamSplit));

        let config = config.with_disallowed_encodings(&[Encoding::Plain]);
        assert!(!config.is_encoding_allowed(Encoding::Plain));
        assert!(config.is_encoding_allowed(Encoding::RleDictionary));
        assert!(matches!(
            config.check_encoding(Encoding::Plain).unwrap_err().kind(),
            ErrorKind::Unsupported { .. }
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = DecoderConfig::default()
            .with_disallowed_encodings(&[Encoding::ByteStreamSplit])
            .with_max_dictionary_len(1 << 16);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DecoderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
