//! 原生合约使用的二进制编解码：小端定长整数 + varint 长度前缀。
//!
//! 参数、交易与合约存储值共用同一套格式，编码必须与链上合约的读写逻辑逐字节一致。

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("数据长度不足: 需要 {needed} 字节，剩余 {remaining} 字节")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("varint 编码不规范: 前缀 {prefix:#x} 对应的值 {value} 过小")]
    NonCanonicalVarint { prefix: u8, value: u64 },
    #[error("长度 {0} 超出可用范围")]
    LengthOverflow(u64),
    #[error("字符串不是合法 UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("布尔值非法: {0:#x}")]
    InvalidBool(u8),
    #[error("{0}")]
    Invalid(String),
}

pub trait Encode {
    fn encode(&self, sink: &mut Sink);
}

pub trait Decode: Sized {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError>;
}

/// 无参数的合约方法。
impl Encode for () {
    fn encode(&self, _sink: &mut Sink) {}
}

pub fn to_bytes<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
    let mut sink = Sink::new();
    value.encode(&mut sink);
    sink.into_bytes()
}

pub fn from_bytes<T: Decode>(data: &[u8]) -> Result<T, CodecError> {
    let mut source = Source::new(data);
    T::decode(&mut source)
}

#[derive(Debug, Default)]
pub struct Sink {
    buf: BytesMut,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn write_raw(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    pub fn write_var_uint(&mut self, value: u64) {
        if value < 0xfd {
            self.buf.put_u8(value as u8);
        } else if value <= 0xffff {
            self.buf.put_u8(0xfd);
            self.buf.put_u16_le(value as u16);
        } else if value <= 0xffff_ffff {
            self.buf.put_u8(0xfe);
            self.buf.put_u32_le(value as u32);
        } else {
            self.buf.put_u8(0xff);
            self.buf.put_u64_le(value);
        }
    }

    pub fn write_var_bytes(&mut self, data: &[u8]) {
        self.write_var_uint(data.len() as u64);
        self.buf.put_slice(data);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_var_bytes(value.as_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

#[derive(Debug, Clone)]
pub struct Source<'a> {
    data: &'a [u8],
}

impl<'a> Source<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure(&self, needed: usize) -> Result<(), CodecError> {
        let remaining = self.data.remaining();
        if remaining < needed {
            return Err(CodecError::UnexpectedEof { needed, remaining });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.ensure(1)?;
        Ok(self.data.get_u8())
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.ensure(2)?;
        Ok(self.data.get_u16_le())
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.ensure(4)?;
        Ok(self.data.get_u32_le())
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        self.ensure(8)?;
        Ok(self.data.get_u64_le())
    }

    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        self.ensure(len)?;
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let raw = self.read_raw(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(raw);
        Ok(out)
    }

    pub fn read_var_uint(&mut self) -> Result<u64, CodecError> {
        let prefix = self.read_u8()?;
        let value = match prefix {
            0xfd => u64::from(self.read_u16()?),
            0xfe => u64::from(self.read_u32()?),
            0xff => self.read_u64()?,
            small => return Ok(u64::from(small)),
        };
        let minimum = match prefix {
            0xfd => 0xfd,
            0xfe => 0x1_0000,
            _ => 0x1_0000_0000,
        };
        if value < minimum {
            return Err(CodecError::NonCanonicalVarint { prefix, value });
        }
        Ok(value)
    }

    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_var_uint()?;
        let len = usize::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
        self.read_raw(len)
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let raw = self.read_var_bytes()?;
        Ok(String::from_utf8(raw.to_vec())?)
    }
}
