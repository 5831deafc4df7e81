#![cfg_attr(feature = "docs", feature(doc_cfg))]
#![deny(
    unsafe_code,
    missing_debug_implementations,
    anonymous_parameters,
    keyword_idents,
    macro_use_extern_crate,
    non_ascii_idents
)]

//! # plume-http
//!
//! ## Plume HTTP 接口库
//!
//! 为更高层的 HTTP 请求构建器提供统一的 HTTP 传输接口（[`HttpCaller`]），
//! 以及传输层所需的请求、响应、请求体编码和错误类型。
//!
//! 任何收到的 HTTP 响应，无论状态码为何，都应当作为 [`Response`] 返回，
//! 只有无法完成请求时才返回 [`ResponseError`]。

mod body;
mod error;
mod multipart;
mod request;
mod response;

pub use body::Body as ResponseBody;
pub use error::{Error as ResponseError, ErrorBuilder as ResponseErrorBuilder, ErrorKind as ResponseErrorKind};
pub use http::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    method::Method,
    status::StatusCode,
    Version,
};
pub use multipart::{Multipart, MultipartReader, Part, PartMetadata};
pub use request::{Form, Query, Request, RequestBody, RequestBuilder};
pub use response::{Response, ResponseBuilder, Result as ResponseResult};

pub use url;

use body::Body;
use once_cell::sync::Lazy;
use std::fmt::Debug;

/// HTTP 请求处理接口
///
/// 实现该接口，即可发送所有由 Plume 构建的 HTTP 请求
pub trait HttpCaller: Debug + Send + Sync {
    /// 同步发送 HTTP 请求
    ///
    /// 请求体在发送时会被取出，文件等资源在请求完成后随之释放
    fn call(&self, request: &mut Request) -> ResponseResult;
}

static USER_AGENT: Lazy<String> = Lazy::new(|| {
    format!(
        "plume-http/{}/rust-{}",
        env!("CARGO_PKG_VERSION"),
        env!("RUSTC_VERSION"),
    )
});

/// 获得默认的用户代理
///
/// 传输层实现可以在此基础上追加自身标识
#[inline]
pub fn user_agent() -> &'static str {
    USER_AGENT.as_str()
}
