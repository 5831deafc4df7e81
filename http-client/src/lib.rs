#![cfg_attr(feature = "docs", feature(doc_cfg))]
#![deny(
    unsafe_code,
    missing_debug_implementations,
    missing_docs,
    anonymous_parameters,
    keyword_idents,
    macro_use_extern_crate,
    non_ascii_idents
)]

//! # plume-http-client
//!
//! ## Plume HTTP 请求构建器
//!
//! 通过 [`RequestBuilder`] 累积 HTTP Headers、表单字段和文件附件，再使用任意请求方法发出请求，
//! 得到统一的 [`Response`]。根据累积的内容，请求体将自动选择以下形式之一：
//!
//! - 没有表单字段和附件时，不发送请求体；
//! - 只有表单字段时，发送 `application/x-www-form-urlencoded` 表单；
//! - 包含附件时，发送 `multipart/form-data` 表单，表单字段在前，附件在后。
//!
//! 字段名为 `query` 的表单字段不会出现在请求体中，而是作为 URL 查询参数发送。
//!
//! 服务器返回的 4xx / 5xx 状态码不被视为错误，可以通过 [`Response`] 的状态判断方法检查；
//! 只有传输层无法完成请求时才返回 [`RequestError`]。
//!
//! [`Http`] 提供静态入口，每次调用都会使用全局配置创建新的构建器。
//!
//! ### 功能选择
//!
//! 默认启用 `ureq` 功能，使用 [`plume_ureq::Client`] 作为默认的 HTTP 请求处理函数。
//! 也可以通过 [`set_default_http_caller`] 替换为任意 [`http::HttpCaller`] 实现。

mod builder;
mod config;
mod error;
mod facade;
mod file;
mod options;
mod response;
mod verb;

#[cfg(test)]
mod test_utils;

pub use builder::RequestBuilder;
pub use config::{default_config, set_base_url, set_default_http_caller, set_framework_method, Config};
pub use error::{ApiResult, DecodeError, Error, RequestError, UnknownMethodError};
pub use facade::{Http, HttpClient};
pub use file::FileAttachment;
pub use options::{Fields, Files, Headers};
pub use response::{LastRequest, Response};
pub use verb::Verb;

pub use plume_http as http;
pub use serde_json;

#[cfg(feature = "ureq")]
#[cfg_attr(feature = "docs", doc(cfg(feature = "ureq")))]
pub use plume_ureq as ureq;
