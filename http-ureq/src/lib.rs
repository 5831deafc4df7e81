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

//! # plume-ureq
//!
//! ## Plume Ureq HTTP 客户端实现
//!
//! 基于 Ureq 库提供 [`plume_http::HttpCaller`] 接口实现，仅提供阻塞接口。
//!
//! 服务器返回的 4xx / 5xx 状态码同样作为正常响应返回，只有无法完成请求时才返回错误。

mod client;

pub use client::Client;

pub use plume_http as http;
pub use ureq;
