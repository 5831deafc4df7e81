use super::UnknownMethodError;
use plume_http::Method;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// 请求方法
///
/// 构建器支持的五种 HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Verb {
    /// 小写的方法名，同时也是方法覆盖时 `_method` 字段的值
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    /// 对应的 HTTP 方法
    #[inline]
    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }

    /// 启用方法覆盖时，该方法是否改为 POST 发送
    #[inline]
    pub fn is_overridable(self) -> bool {
        matches!(self, Self::Put | Self::Patch | Self::Delete)
    }
}

impl FromStr for Verb {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete]
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethodError::new(s))
    }
}

impl Display for Verb {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verb() {
        env_logger::builder().is_test(true).try_init().ok();

        assert_eq!("get".parse::<Verb>(), Ok(Verb::Get));
        assert_eq!("POST".parse::<Verb>(), Ok(Verb::Post));
        assert_eq!("Patch".parse::<Verb>(), Ok(Verb::Patch));
        assert_eq!("delete".parse::<Verb>().map(Verb::method), Ok(Method::DELETE));
        assert_eq!(
            "options".parse::<Verb>().unwrap_err().method(),
            "options"
        );
        assert_eq!("".parse::<Verb>().unwrap_err(), UnknownMethodError::new(""));
        assert_eq!(Verb::Put.to_string(), "put");
        assert!(!Verb::Get.is_overridable());
        assert!(!Verb::Post.is_overridable());
        assert!(Verb::Delete.is_overridable());
    }
}
