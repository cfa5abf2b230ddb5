use crate::core::error::{Error, ErrorKind, Result};

/// Variable byte encoding for unsigned integers (best for small values)
pub struct VarintCodec;

impl VarintCodec {
    /// Encode single u32 value.
    /// Values < 128 use 1 byte, < 16384 use 2 bytes, etc.
    pub fn encode_u32(output: &mut Vec<u8>, mut value: u32) {
        while value >= 128 {
            output.push((value & 127) as u8 | 128); // Set continuation bit
            value >>= 7;
        }
        output.push(value as u8); // Last byte without continuation bit
    }

    /// Decode single u32 value, returns (value, bytes_consumed)
    pub fn decode_u32(input: &[u8]) -> Result<(u32, usize)> {
        let mut value = 0u32;
        let mut shift = 0;
        let mut consumed = 0;

        for &byte in input {
            consumed += 1;
            // Only 4 value bits fit at shift 28; higher bits in the
            // fifth byte would be dropped by the shift, not round-trip
            if shift == 28 && byte & 0x70 != 0 {
                return Err(Error::new(ErrorKind::Corrupt, "varint overflow"));
            }
            value |= ((byte & 127) as u32) << shift;

            if byte & 128 == 0 { // No continuation bit
                return Ok((value, consumed));
            }

            shift += 7;
            if shift > 28 { // Max 5 bytes for u32
                return Err(Error::new(ErrorKind::Corrupt, "varint overflow"));
            }
        }

        Err(Error::new(ErrorKind::Corrupt, "varint truncated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let values = [0u32, 1, 127, 128, 255, 256, 16383, 16384, u32::MAX];
        for &v in &values {
            let mut buf = Vec::new();
            VarintCodec::encode_u32(&mut buf, v);
            let (decoded, consumed) = VarintCodec::decode_u32(&buf).unwrap();
            assert_eq!(decoded, v);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn byte_widths() {
        let mut buf = Vec::new();
        VarintCodec::encode_u32(&mut buf, 127);
        assert_eq!(buf.len(), 1);
        buf.clear();
        VarintCodec::encode_u32(&mut buf, 128);
        assert_eq!(buf.len(), 2);
        buf.clear();
        VarintCodec::encode_u32(&mut buf, u32::MAX);
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn truncated_input_is_an_error() {
        // Continuation bit set but no more bytes
        assert!(VarintCodec::decode_u32(&[0x80]).is_err());
        assert!(VarintCodec::decode_u32(&[]).is_err());
    }

    #[test]
    fn overlong_input_is_an_error() {
        assert!(VarintCodec::decode_u32(&[0xFF; 8]).is_err());
    }

    #[test]
    fn overflow_bits_in_final_byte_are_an_error() {
        // Fifth byte may only carry 4 value bits; anything above bit 31
        // must fail rather than decode to a truncated value
        assert!(VarintCodec::decode_u32(&[0x80, 0x80, 0x80, 0x80, 0x7F]).is_err());
        assert!(VarintCodec::decode_u32(&[0x80, 0x80, 0x80, 0x80, 0x10]).is_err());
        // The largest valid 5-byte encoding still decodes
        let (v, n) = VarintCodec::decode_u32(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]).unwrap();
        assert_eq!((v, n), (u32::MAX, 5));
    }
}
