use anyhow::Error as AnyError;
use assert_impl::assert_impl;
use std::{
    error,
    fmt::{self, Debug, Display},
};

/// HTTP 响应错误类型
///
/// 仅描述传输层无法完成请求的情况，收到的任何 HTTP 状态码（包括 4xx / 5xx）都不属于错误
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 非法的请求 / 响应错误
    InvalidRequestResponse,

    /// 非法的 URL
    InvalidUrl,

    /// 非法的 HTTP 头
    InvalidHeader,

    /// 网络连接失败
    ConnectError,

    /// 代理连接失败
    ProxyError,

    /// 域名解析失败
    UnknownHostError,

    /// 接受失败
    ReceiveError,

    /// 本地 IO 失败
    LocalIoError,

    /// 超时失败
    TimeoutError,

    /// SSL 错误
    SslError,

    /// 重定向次数过多
    TooManyRedirect,

    /// 未知错误
    UnknownError,
}

/// HTTP 响应错误
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    error: AnyError,
    url: Option<String>,
}

impl Error {
    /// 创建 HTTP 响应错误构建器
    #[inline]
    pub fn builder(kind: ErrorKind, err: impl Into<AnyError>) -> ErrorBuilder {
        ErrorBuilder::new(kind, err)
    }

    /// 使用错误信息创建 HTTP 响应错误构建器
    #[inline]
    pub fn builder_with_msg(kind: ErrorKind, msg: impl Display + Debug + Send + Sync + 'static) -> ErrorBuilder {
        ErrorBuilder::new(kind, AnyError::msg(msg))
    }

    /// 获取 HTTP 响应错误类型
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取发生错误的请求 URL
    #[inline]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// 转换为内部错误
    #[inline]
    pub fn into_inner(self) -> AnyError {
        self.error
    }

    #[allow(dead_code)]
    fn ignore() {
        assert_impl!(Send: Self);
        assert_impl!(Sync: Self);
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:?}]", self.kind)?;
        if let Some(url) = self.url.as_ref() {
            write!(f, "[{}]", url)?;
        }
        write!(f, " {}", self.error)
    }
}

impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// HTTP 响应错误构建器
#[derive(Debug)]
pub struct ErrorBuilder {
    inner: Error,
}

impl ErrorBuilder {
    #[inline]
    fn new(kind: ErrorKind, err: impl Into<AnyError>) -> Self {
        Self {
            inner: Error {
                kind,
                error: err.into(),
                url: None,
            },
        }
    }

    /// 设置发生错误的请求 URL
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.inner.url = Some(url.into());
        self
    }

    /// 构建 HTTP 响应错误
    #[inline]
    pub fn build(self) -> Error {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind as IoErrorKind};

    #[test]
    fn test_error_display() {
        env_logger::builder().is_test(true).try_init().ok();

        let err = Error::builder(
            ErrorKind::ConnectError,
            IoError::new(IoErrorKind::ConnectionRefused, "connection refused"),
        )
        .url("http://127.0.0.1:1/")
        .build();
        assert_eq!(err.kind(), ErrorKind::ConnectError);
        assert_eq!(err.url(), Some("http://127.0.0.1:1/"));
        assert_eq!(err.to_string(), "[ConnectError][http://127.0.0.1:1/] connection refused");

        let err = Error::builder_with_msg(ErrorKind::InvalidHeader, "invalid header name(a b)").build();
        assert_eq!(err.url(), None);
        assert_eq!(err.to_string(), "[InvalidHeader] invalid header name(a b)");
    }
}
