use std::{
    default::Default,
    fmt::{self, Debug},
    io::{Cursor, Read, Result as IoResult},
};

trait ReadSend: Read + Send {}
impl<T: Read + Send> ReadSend for T {}

/// HTTP 响应体
///
/// 响应体是一个只能读取一次的输入流
#[derive(Debug)]
pub struct Body(BodyInner);

enum BodyInner {
    Reader(Box<dyn ReadSend>),
    Bytes(Cursor<Vec<u8>>),
}

impl Debug for BodyInner {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reader(_) => f.debug_tuple("Reader").finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
        }
    }
}

impl Body {
    /// 通过输入流创建 HTTP 响应体
    #[inline]
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self(BodyInner::Reader(Box::new(reader)))
    }

    /// 通过二进制数据创建 HTTP 响应体
    #[inline]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(BodyInner::Bytes(Cursor::new(bytes.into())))
    }
}

impl Default for Body {
    #[inline]
    fn default() -> Self {
        Self::from_bytes(Vec::new())
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match &mut self.0 {
            BodyInner::Reader(reader) => reader.read(buf),
            BodyInner::Bytes(bytes) => bytes.read(buf),
        }
    }
}
