//! 区块头切分：原始区块 = 区块头 ‖ 交易列表，仅需按区块头布局跳过各字段。

use crate::codec::{CodecError, Source};

/// 从节点返回的原始区块中截取完整区块头（含记账人公钥与签名）。
pub fn split_block_header(raw_block: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut source = Source::new(raw_block);
    source.read_u32()?; // version
    source.read_raw(32)?; // prev block hash
    source.read_raw(32)?; // transactions root
    source.read_raw(32)?; // block root
    source.read_u32()?; // timestamp
    source.read_u32()?; // height
    source.read_u64()?; // consensus data
    source.read_var_bytes()?; // consensus payload
    source.read_raw(20)?; // next bookkeeper
    let bookkeepers = source.read_var_uint()?;
    for _ in 0..bookkeepers {
        source.read_var_bytes()?;
    }
    let signatures = source.read_var_uint()?;
    for _ in 0..signatures {
        source.read_var_bytes()?;
    }
    let header_len = raw_block.len() - source.remaining();
    Ok(raw_block[..header_len].to_vec())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codec::Sink;

    pub(crate) fn sample_header() -> Vec<u8> {
        let mut sink = Sink::new();
        sink.write_u32(0);
        sink.write_raw(&[0u8; 32]);
        sink.write_raw(&[1u8; 32]);
        sink.write_raw(&[2u8; 32]);
        sink.write_u32(1_600_000_000);
        sink.write_u32(0);
        sink.write_u64(42);
        sink.write_var_bytes(b"{\"leader\":1}");
        sink.write_raw(&[3u8; 20]);
        sink.write_var_uint(2);
        sink.write_var_bytes(&[4u8; 34]);
        sink.write_var_bytes(&[5u8; 34]);
        sink.write_var_uint(1);
        sink.write_var_bytes(&[6u8; 64]);
        sink.into_bytes()
    }

    #[test]
    fn header_is_split_from_transactions() {
        let header = sample_header();
        let mut block = header.clone();
        block.extend_from_slice(&[0x01, 0xd1, 0xff, 0xee]);
        assert_eq!(split_block_header(&block).unwrap(), header);
    }

    #[test]
    fn truncated_block_is_an_error() {
        let header = sample_header();
        assert!(split_block_header(&header[..100]).is_err());
    }
}
