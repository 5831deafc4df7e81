use assert_impl::assert_impl;
use http::header::{HeaderMap, HeaderValue, IntoHeaderName, CONTENT_TYPE};
use mime::Mime;
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rand::random;
use regex::Regex;
use smallvec::SmallVec;
use std::{
    borrow::Cow,
    collections::VecDeque,
    fmt::Debug,
    fs::File,
    io::{Cursor, Read, Result as IoResult},
    mem::take,
};

type HeaderBuffer = SmallVec<[u8; 256]>;

/// Multipart 表单
///
/// 表单组件按照添加顺序编码，同名组件不会互相覆盖
#[derive(Debug)]
pub struct Multipart {
    boundary: String,
    fields: Vec<(String, Part)>,
}

/// Multipart 表单组件
#[derive(Debug)]
pub struct Part {
    meta: PartMetadata,
    body: PartBody,
}

#[derive(Debug)]
enum PartBody {
    Bytes(Cursor<Vec<u8>>),
    File { file: File, size: u64 },
}

impl PartBody {
    fn size(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.get_ref().len() as u64,
            Self::File { size, .. } => *size,
        }
    }
}

impl Read for PartBody {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match self {
            Self::Bytes(bytes) => bytes.read(buf),
            Self::File { file, .. } => file.read(buf),
        }
    }
}

impl Default for Multipart {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Multipart {
    /// 创建 Multipart 表单
    #[inline]
    pub fn new() -> Self {
        Self {
            boundary: gen_boundary(),
            fields: Default::default(),
        }
    }

    /// 获取分隔符
    #[inline]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// 获取 `Content-Type` 的值
    #[inline]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// 添加 Multipart 表单组件
    #[inline]
    #[must_use]
    pub fn add_part(mut self, name: impl Into<String>, part: Part) -> Self {
        self.fields.push((name.into(), part));
        self
    }

    /// 获取全部表单组件
    #[inline]
    pub fn parts(&self) -> &[(String, Part)] {
        &self.fields
    }

    /// 表单组件数量
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 表单是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 转换为全部表单组件
    #[inline]
    pub fn into_parts(self) -> Vec<(String, Part)> {
        self.fields
    }

    /// 转换为编码后的输入流
    pub fn into_reader(mut self) -> MultipartReader {
        let mut reader = MultipartReader::default();
        for (name, part) in take(&mut self.fields) {
            reader.append_part(&name, part, &self.boundary);
        }
        reader.append_ending(&self.boundary);
        reader
    }

    #[allow(dead_code)]
    fn ignore() {
        assert_impl!(Send: Self);
        assert_impl!(Sync: Self);
    }
}

impl Part {
    /// 设置 Multipart 的请求体为字符串
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::bytes(value.into().into_bytes())
    }

    /// 设置 Multipart 的请求体为内存数据
    #[inline]
    #[must_use]
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self {
            body: PartBody::Bytes(Cursor::new(value.into())),
            meta: Default::default(),
        }
    }

    /// 设置 Multipart 的请求体为已经打开的文件
    #[inline]
    pub fn file(file: File) -> IoResult<Self> {
        let size = file.metadata()?.len();
        Ok(Self {
            body: PartBody::File { file, size },
            meta: Default::default(),
        })
    }

    /// 设置 Multipart 表单组件的元信息
    #[inline]
    #[must_use]
    pub fn metadata(mut self, metadata: PartMetadata) -> Self {
        self.meta = metadata;
        self
    }

    /// 获取 Multipart 表单组件的元信息
    #[inline]
    pub fn meta(&self) -> &PartMetadata {
        &self.meta
    }

    /// 表单组件是否为文件
    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self.body, PartBody::File { .. })
    }

    /// 表单组件的请求体长度
    #[inline]
    pub fn size(&self) -> u64 {
        self.body.size()
    }

    /// 转换为请求体输入流
    #[inline]
    pub fn into_reader(self) -> impl Read + Send + Sync + Debug {
        self.body
    }
}

/// Multipart 表单组件元信息
#[derive(Default, Debug)]
pub struct PartMetadata {
    headers: HeaderMap,
    file_name: Option<String>,
}

impl PartMetadata {
    /// 设置表单组件的 MIME 类型
    #[inline]
    #[must_use]
    pub fn mime(self, mime: Mime) -> Self {
        match HeaderValue::from_str(mime.as_ref()) {
            Ok(value) => self.add_header(CONTENT_TYPE, value),
            Err(_) => self,
        }
    }

    /// 添加表单组件的 HTTP 头
    #[inline]
    #[must_use]
    pub fn add_header(mut self, name: impl IntoHeaderName, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name, value.into());
        self
    }

    /// 设置表单组件的文件名
    #[inline]
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// 获取表单组件的文件名
    #[inline]
    pub fn get_file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// 获取表单组件的 HTTP 头
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Multipart 编码后的输入流
#[derive(Default, Debug)]
pub struct MultipartReader {
    segments: VecDeque<PartBody>,
}

impl MultipartReader {
    fn append_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.segments.push_back(PartBody::Bytes(Cursor::new(bytes.into())));
        self
    }

    fn append_raw_part(&mut self, part: Part) -> &mut Self {
        self.segments.push_back(part.body);
        self
    }

    fn append_part(&mut self, name: &str, part: Part, boundary: &str) -> &mut Self {
        self.append_bytes(format!("--{}\r\n", boundary))
            .append_bytes(encode_headers(name, &part.meta).into_vec())
            .append_bytes(b"\r\n\r\n".as_slice())
            .append_raw_part(part)
            .append_bytes(b"\r\n".as_slice())
    }

    fn append_ending(&mut self, boundary: &str) -> &mut Self {
        self.append_bytes(format!("--{}--\r\n", boundary))
    }

    /// 编码后的总长度，可以作为 `Content-Length` 发送
    pub fn content_length(&self) -> u64 {
        self.segments.iter().map(|segment| segment.size()).sum()
    }
}

impl Read for MultipartReader {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(segment) = self.segments.front_mut() {
            match segment.read(buf)? {
                0 => {
                    self.segments.pop_front();
                }
                n => return Ok(n),
            }
        }
        Ok(0)
    }
}

fn gen_boundary() -> String {
    format!("{:016x}{:016x}", random::<u64>(), random::<u64>())
}

fn encode_headers(name: &str, field: &PartMetadata) -> HeaderBuffer {
    let mut buf = HeaderBuffer::from_slice(b"content-disposition: form-data; ");
    buf.extend_from_slice(&format_parameter("name", name));
    if let Some(file_name) = field.file_name.as_ref() {
        buf.extend_from_slice(b"; ");
        buf.extend_from_slice(format_file_name(file_name).as_bytes());
    }
    for (name, value) in field.headers.iter() {
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(name.as_str().as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
    }
    buf
}

fn format_file_name(filename: &str) -> String {
    static REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("\\\\|\"|\r|\n").unwrap());
    let escaped = REGEX.replace_all(filename, |caps: &regex::Captures| match &caps[0] {
        "\\" => Cow::Borrowed("\\\\"),
        "\"" => Cow::Borrowed("\\\""),
        "\r" => Cow::Borrowed("\\\r"),
        "\n" => Cow::Borrowed("\\\n"),
        other => Cow::Owned(other.to_owned()),
    });
    format!("filename=\"{}\"", escaped)
}

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

fn format_parameter(name: &str, value: &str) -> HeaderBuffer {
    let legal_value = {
        let mut buf = HeaderBuffer::new();
        for chunk in utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET) {
            buf.extend_from_slice(chunk.as_bytes());
        }
        buf
    };
    let mut formatted = HeaderBuffer::from_slice(name.as_bytes());
    if value.len() == legal_value.len() {
        formatted.extend_from_slice(b"=\"");
        formatted.extend_from_slice(value.as_bytes());
        formatted.extend_from_slice(b"\"");
    } else {
        formatted.extend_from_slice(b"*=utf-8''");
        formatted.extend_from_slice(&legal_value);
    };
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use mime::{APPLICATION_JSON, IMAGE_BMP};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_gen_boundary() {
        env_logger::builder().is_test(true).try_init().ok();

        for _ in 0..5 {
            assert_eq!(gen_boundary().len(), 32);
        }
        assert_ne!(Multipart::new().boundary(), Multipart::new().boundary());
    }

    #[test]
    fn test_header_percent_encoding() {
        env_logger::builder().is_test(true).try_init().ok();

        let name = "start%'\"\r\nßend";
        let metadata = PartMetadata::default().mime(APPLICATION_JSON).file_name(name);

        assert_eq!(
            encode_headers(name, &metadata).as_ref(),
            "content-disposition: form-data; name*=utf-8''start%25'%22%0D%0A%C3%9Fend; filename=\"start%'\\\"\\\r\\\nßend\"\r\ncontent-type: application/json".as_bytes()
        );
    }

    #[test]
    fn test_multipart_into_reader() -> IoResult<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let tempdir = tempdir()?;
        let temp_file_path = tempdir.path().join("fake-file");
        let mut file = File::create(&temp_file_path)?;
        file.write_all(b"{\"a\":\"b\"}\n")?;
        drop(file);

        let mut multipart = Multipart::new()
            .add_part("bytes1", Part::bytes(b"part1".as_slice()))
            .add_part("text1", Part::text("value1"))
            .add_part(
                "text2",
                Part::text("value1").metadata(PartMetadata::default().mime(IMAGE_BMP)),
            )
            .add_part(
                "file1",
                Part::file(File::open(&temp_file_path)?)?.metadata(
                    PartMetadata::default()
                        .mime(APPLICATION_JSON)
                        .file_name("fake-file.json"),
                ),
            );
        multipart.boundary = "boundary".into();
        assert_eq!(multipart.len(), 4);

        const EXPECTED: &str = "--boundary\r\n\
        content-disposition: form-data; name=\"bytes1\"\r\n\r\n\
        part1\r\n\
        --boundary\r\n\
        content-disposition: form-data; name=\"text1\"\r\n\r\n\
        value1\r\n\
        --boundary\r\n\
        content-disposition: form-data; name=\"text2\"\r\n\
        content-type: image/bmp\r\n\r\n\
        value1\r\n\
        --boundary\r\n\
        content-disposition: form-data; name=\"file1\"; filename=\"fake-file.json\"\r\n\
        content-type: application/json\r\n\r\n\
        {\"a\":\"b\"}\n\r\n\
        --boundary--\
        \r\n";

        let mut reader = multipart.into_reader();
        assert_eq!(reader.content_length(), EXPECTED.len() as u64);
        let mut actual = String::new();
        reader.read_to_string(&mut actual)?;
        assert_eq!(EXPECTED, actual);

        tempdir.close()?;
        Ok(())
    }

    #[test]
    fn test_multipart_reader_len() -> IoResult<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let tempdir = tempdir()?;
        let temp_file_path = tempdir.path().join("upload.txt");
        std::fs::write(&temp_file_path, b"0123456789")?;

        let multipart = Multipart::new()
            .add_part("title", Part::text("plume"))
            .add_part(
                "attachment",
                Part::file(File::open(&temp_file_path)?)?.metadata(PartMetadata::default().file_name("a.txt")),
            )
            .add_part("attachment", Part::text("same name is kept"));
        assert!(multipart.parts()[1].1.is_file());
        assert_eq!(multipart.parts()[1].1.size(), 10);
        assert_eq!(multipart.parts()[1].1.meta().get_file_name(), Some("a.txt"));

        let mut reader = multipart.into_reader();
        let expected_len = reader.content_length();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        assert_eq!(buf.len() as u64, expected_len);
        assert_eq!(String::from_utf8_lossy(&buf).matches("name=\"attachment\"").count(), 2);

        tempdir.close()?;
        Ok(())
    }
}
