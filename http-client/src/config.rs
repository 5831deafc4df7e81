use log::info;
use once_cell::sync::Lazy;
use plume_http::HttpCaller;
use std::sync::{Arc, PoisonError, RwLock};

/// HTTP 请求构建器配置
///
/// 每个 [`crate::RequestBuilder`] 在创建时持有一份配置快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    base_url: Option<String>,
    framework_method: bool,
}

impl Config {
    /// 创建空配置
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// 设置基础 URL
    ///
    /// 请求目标 URL 为基础 URL 与请求路径的直接拼接，不做任何规范化
    #[inline]
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// 设置是否启用方法覆盖
    ///
    /// 启用后 PUT / PATCH / DELETE 请求将以 POST 发送，并附带 `_method` 表单字段
    #[inline]
    #[must_use]
    pub fn framework_method(mut self, framework_method: bool) -> Self {
        self.framework_method = framework_method;
        self
    }

    /// 获取基础 URL
    #[inline]
    pub fn get_base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// 是否启用方法覆盖
    #[inline]
    pub fn is_framework_method(&self) -> bool {
        self.framework_method
    }

    pub(crate) fn resolve_url(&self, uri: &str) -> String {
        match self.base_url.as_deref() {
            Some(base_url) => format!("{}{}", base_url, uri),
            None => uri.to_owned(),
        }
    }
}

#[derive(Debug, Default)]
struct Defaults {
    config: Config,
    http_caller: Option<Arc<dyn HttpCaller>>,
}

static DEFAULTS: Lazy<RwLock<Defaults>> = Lazy::new(Default::default);

/// 设置全局基础 URL
///
/// 仅影响此后创建的 [`crate::RequestBuilder`]，已经创建的构建器继续使用其创建时的配置
pub fn set_base_url(base_url: impl Into<String>) {
    let base_url = base_url.into();
    info!("set default base url to {}", base_url);
    DEFAULTS.write().unwrap_or_else(PoisonError::into_inner).config.base_url = Some(base_url);
}

/// 设置全局方法覆盖开关
///
/// 仅影响此后创建的 [`crate::RequestBuilder`]
pub fn set_framework_method(framework_method: bool) {
    info!("set default framework method to {}", framework_method);
    DEFAULTS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .config
        .framework_method = framework_method;
}

/// 设置全局默认的 HTTP 请求处理函数
///
/// 仅影响此后创建的 [`crate::RequestBuilder`]
pub fn set_default_http_caller(http_caller: Arc<dyn HttpCaller>) {
    info!("set default http caller to {:?}", http_caller);
    DEFAULTS.write().unwrap_or_else(PoisonError::into_inner).http_caller = Some(http_caller);
}

/// 获取全局配置快照
#[inline]
pub fn default_config() -> Config {
    DEFAULTS.read().unwrap_or_else(PoisonError::into_inner).config.to_owned()
}

pub(crate) fn default_http_caller() -> Arc<dyn HttpCaller> {
    if let Some(http_caller) = DEFAULTS.read().unwrap_or_else(PoisonError::into_inner).http_caller.as_ref() {
        return http_caller.to_owned();
    }
    DEFAULTS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .http_caller
        .get_or_insert_with(fallback_http_caller)
        .to_owned()
}

#[cfg(feature = "ureq")]
fn fallback_http_caller() -> Arc<dyn HttpCaller> {
    Arc::new(plume_ureq::Client::default())
}

#[cfg(not(feature = "ureq"))]
fn fallback_http_caller() -> Arc<dyn HttpCaller> {
    use plume_http::{Request, ResponseError, ResponseErrorKind, ResponseResult};

    #[derive(Debug)]
    struct Unconfigured;

    impl HttpCaller for Unconfigured {
        fn call(&self, request: &mut Request) -> ResponseResult {
            Err(ResponseError::builder_with_msg(
                ResponseErrorKind::UnknownError,
                "no default http caller, call set_default_http_caller() or enable the `ureq` feature",
            )
            .url(request.url())
            .build())
        }
    }

    Arc::new(Unconfigured)
}

#[cfg(test)]
pub(crate) fn reset_defaults() {
    let mut defaults = DEFAULTS.write().unwrap_or_else(PoisonError::into_inner);
    *defaults = Defaults::default();
}
