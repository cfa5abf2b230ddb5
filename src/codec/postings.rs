use crate::codec::varint::VarintCodec;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DocNum;

/// Gap encoding for posting lists.
///
/// Block format: varint(doc_freq) followed by doc_freq gap varints,
/// where each gap is the difference from the previous docnum (the first
/// gap is relative to 0). Input must be strictly increasing with all
/// values >= 1, so every gap is >= 1.
pub struct PostingsCodec;

impl PostingsCodec {
    /// Encode a strictly increasing list of docnums.
    pub fn encode(docnums: &[DocNum]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(docnums.len() + 1);
        VarintCodec::encode_u32(&mut output, docnums.len() as u32);

        let mut prev = 0u32;
        for &doc in docnums {
            if doc <= prev {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("postings not strictly increasing: {} after {}", doc, prev),
                ));
            }
            VarintCodec::encode_u32(&mut output, doc - prev);
            prev = doc;
        }

        Ok(output)
    }

    /// Decode a block back into the original docnum list.
    pub fn decode(block: &[u8]) -> Result<Vec<DocNum>> {
        let (doc_freq, mut pos) = VarintCodec::decode_u32(block)?;

        let mut docs = Vec::with_capacity(doc_freq as usize);
        let mut prev = 0u32;
        for _ in 0..doc_freq {
            let (gap, consumed) = VarintCodec::decode_u32(&block[pos..])?;
            pos += consumed;
            prev += gap;
            docs.push(prev);
        }

        if pos != block.len() {
            return Err(Error::new(
                ErrorKind::Corrupt,
                format!("{} trailing bytes after postings block", block.len() - pos),
            ));
        }

        Ok(docs)
    }
}
