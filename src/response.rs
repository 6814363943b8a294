use crate::{
    exception::Exception,
    param::{CRLF, DEFAULT_CONTENT_TYPE, SERVER_NAME, STATUS_CODES},
};

use chrono::prelude::*;
use log::debug;

/// 响应三元组：状态码、有序头部列表、响应体分块序列。
/// 由 `Response::finish` 产出，交给传输层写到网络上。
pub type ResponseParts = (u16, Vec<(String, String)>, Vec<String>);

/// 构造响应时可接受的响应体形态。
///
/// 构造后立即归一化为规范表示（有序的字符串分块序列）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// 无响应体
    Empty,
    /// 单个字符串，包装为单元素分块序列
    Text(String),
    /// 已经是分块序列
    Chunks(Vec<String>),
}

impl Body {
    fn into_chunks(self) -> Vec<String> {
        match self {
            Body::Empty => Vec::new(),
            Body::Text(text) => vec![text],
            Body::Chunks(chunks) => chunks,
        }
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Vec<String>> for Body {
    fn from(chunks: Vec<String>) -> Self {
        Body::Chunks(chunks)
    }
}

impl TryFrom<serde_json::Value> for Body {
    type Error = Exception;

    /// 字符串与字符串数组是仅有的两种可接受的动态形态，
    /// null 视为空响应体，其余一律拒绝。
    fn try_from(value: serde_json::Value) -> Result<Self, Exception> {
        match value {
            serde_json::Value::Null => Ok(Body::Empty),
            serde_json::Value::String(text) => Ok(Body::Text(text)),
            serde_json::Value::Array(items) => {
                let mut chunks = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::String(text) => chunks.push(text),
                        _ => return Err(Exception::TypeMismatch),
                    }
                }
                Ok(Body::Chunks(chunks))
            }
            _ => Err(Exception::TypeMismatch),
        }
    }
}

/// 每个请求独享的可变响应对象。
///
/// 处理器通过 `write`、`set_header`、`redirect` 等操作修改它，
/// 最后由调度器调用 `finish` 产出响应三元组。
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<String>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string())],
            body: Vec::new(),
        }
    }

    /// 以给定的响应体、状态码和头部构造响应对象。
    pub fn with_parts(body: Body, status: u16, headers: Vec<(String, String)>) -> Self {
        Self {
            status,
            headers,
            body: body.into_chunks(),
        }
    }

    /// 向响应体追加一个分块。永远成功。
    pub fn write(&mut self, chunk: impl Into<String>) {
        self.body.push(chunk.into());
    }

    /// 按名称读取头部（精确匹配，取第一个命中项）。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 写入头部。已存在的同名头部原位覆盖（保持顺序），否则追加到末尾。
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// 整体替换响应体。`halt` 用它丢弃处理器已写入的内容。
    pub fn set_body(&mut self, chunks: Vec<String>) {
        self.body = chunks;
    }

    /// 重定向到 `location`，状态码 302。
    pub fn redirect(&mut self, location: &str) {
        self.redirect_with(location, 302);
    }

    /// 重定向到 `location`，并使用指定的状态码。
    pub fn redirect_with(&mut self, location: &str, status: u16) {
        self.set_header("Location", location);
        self.status = status;
    }

    /// 收尾：按当前响应体的总字节数写入 `Content-Length`，返回响应三元组。
    ///
    /// 可以重复调用，每次都根据当前响应体重新计算长度。
    pub fn finish(&mut self) -> ResponseParts {
        let content_length: usize = self.body.iter().map(|chunk| chunk.len()).sum();
        self.set_header("Content-Length", &content_length.to_string());
        debug!("响应收尾完成，Content-Length: {}", content_length);
        (self.status, self.headers.clone(), self.body.clone())
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

// --- Getter 访问器实现 ---

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }
}

/// 将收尾后的响应三元组序列化为 HTTP/1.1 报文字节。
///
/// 状态行的原因短语取自 `STATUS_CODES`，未知状态码只输出数字；
/// 在三元组头部之后补充 `Date` 和 `Server` 两个传输层头部。
pub fn to_http_bytes(parts: &ResponseParts) -> Vec<u8> {
    let (status, headers, body) = parts;

    let status_line = match STATUS_CODES.get(status) {
        Some(information) => format!("HTTP/1.1 {} {}", status, information),
        None => format!("HTTP/1.1 {}", status),
    };

    let mut head = String::new();
    head.push_str(&status_line);
    head.push_str(CRLF);
    for (name, value) in headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str(CRLF);
    }
    head.push_str("Date: ");
    head.push_str(&Utc::now().to_rfc2822());
    head.push_str(CRLF);
    head.push_str("Server: ");
    head.push_str(SERVER_NAME);
    head.push_str(CRLF);
    head.push_str(CRLF);

    let mut bytes = head.into_bytes();
    for chunk in body {
        bytes.extend_from_slice(chunk.as_bytes());
    }
    bytes
}
