//! Compact encoding of filter lists for URLs and job payloads:
//! CBOR, then URL-safe base64 without padding.

use crate::errors::{FilterError, Result};
use crate::model::Filter;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

pub fn encode_filters(filters: &[Filter]) -> Result<String> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(filters, &mut buf).map_err(|e| FilterError::Wire(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

pub fn decode_filters(encoded: &str) -> Result<Vec<Filter>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim())
        .map_err(|e| FilterError::Wire(e.to_string()))?;
    ciborium::de::from_reader(bytes.as_slice()).map_err(|e| FilterError::Wire(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Op, Precision};

    #[test]
    fn survives_encoding_with_all_modifiers() {
        let filters = vec![
            Filter::new("string")
                .with_q("la lune")
                .with_precision(Precision::Exact)
                .excluded(),
            Filter::new("newspaper").with_q(vec!["GDL", "JDG"]).with_op(Op::Or),
            Filter::new("isFront"),
            Filter::new("somethingNew").with_q("x"),
        ];
        let encoded = encode_filters(&filters).unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode_filters(&encoded).unwrap(), filters);
    }

    #[test]
    fn garbage_is_a_wire_error() {
        assert!(matches!(decode_filters("***"), Err(FilterError::Wire(_))));
        let not_filters = URL_SAFE_NO_PAD.encode([0x01u8, 0x02]);
        assert!(matches!(decode_filters(&not_filters), Err(FilterError::Wire(_))));
    }
}
