// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 该模块是路由层的入站边界，负责将 TCP 流中读取的原始字节码
//! 解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、版本）。
//! 2. 查询字符串的剥离：路径匹配器只应看到裸路径，`?` 之后的内容单独保存。
//! 3. 常用 HTTP 标头（Headers）的提取。
//! 4. 可变的路径参数映射：调度器在执行处理器之前把捕获到的路径片段写入其中。

use std::collections::HashMap;

use crate::{exception::Exception, param::*};
use log::error;

/// 表示一个完整的 HTTP 请求元数据。
///
/// 该结构体不包含请求体（Body）的大数据部分，主要用于路由分发。
/// `params` 是请求自带的可变参数映射：调度器在命中路由后、执行处理器之前，
/// 按声明顺序把捕获值绑定进来，同名键会被覆盖。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法（GET, POST 等）
    method: HttpRequestMethod,
    /// 请求的资源路径（不含查询字符串）
    path: String,
    /// 查询字符串（`?` 之后的部分，若有）
    query: Option<String>,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 客户端标识字符串
    user_agent: String,
    /// 路径参数映射，由调度器在处理器执行前填充
    params: HashMap<String, String>,
}

impl Request {
    /// 直接构造一个请求对象，供宿主程序或测试在进程内调用调度器时使用。
    pub fn new(method: HttpRequestMethod, path: &str) -> Self {
        let (path, query) = split_query(path);
        Self {
            method,
            path,
            query,
            version: HttpVersion::V1_1,
            user_agent: String::new(),
            params: HashMap::new(),
        }
    }

    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：提取方法、路径和协议版本，并把查询字符串从路径上剥离。
    /// 3. 迭代解析标头：识别并提取 `User-Agent` 字段。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID，用于在多线程环境下追踪日志。
    ///
    /// # 错误处理
    /// 如果请求格式不符合 HTTP 规范或使用了固定集合之外的方法/版本，
    /// 将返回相应的 `Exception`。
    pub fn try_from(buffer: &Vec<u8>, id: u128) -> Result<Self, Exception> {
        // 1. 将字节流转换为字符串，失败则判定为非法的 HTTP 请求
        let request_string = match String::from_utf8(buffer.to_vec()) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let request_lines: Vec<&str> = request_string.split(CRLF).collect();

        // 2. 解析请求行 (e.g., "GET /users/42 HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(" ").collect();

        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::UnsupportedRequestMethod);
        }

        // 解析方法名：路由表以七个标准动词为键，其余一律拒绝
        let method = match HttpRequestMethod::parse(first_line_parts[0]) {
            Ok(m) => m,
            Err(_) => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, first_line_parts[0]);
                return Err(Exception::UnsupportedRequestMethod);
            }
        };

        // 解析协议版本
        let version_str = first_line_parts.last().unwrap().to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 解析路径（考虑到路径中可能包含空格的情况，虽然不规范但通过 join 尝试恢复）
        let target = if first_line_parts.len() == 3 {
            first_line_parts[1].to_string()
        } else {
            first_line_parts[1..first_line_parts.len() - 1].join(" ")
        };
        // 匹配器只看裸路径，查询字符串单独保存
        let (path, query) = split_query(&target);

        // 3. 迭代各行解析 Headers
        let mut user_agent = "".to_string();
        for line in &request_lines {
            if line.to_lowercase().starts_with("user-agent") {
                if let Some(val) = line.split(": ").nth(1) {
                    user_agent = val.to_string();
                }
            }
        }

        Ok(Self {
            method,
            path,
            query,
            version,
            user_agent,
            params: HashMap::new(),
        })
    }
}

// --- Getter 访问器实现 ---

impl Request {
    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求路径（不含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 覆盖请求路径。调度器用它把空路径归一化为 `/`。
    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    /// 获取查询字符串（`?` 之后的部分）
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 读取一个路径参数
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// 写入一个路径参数，同名键会被覆盖
    pub fn set_param(&mut self, name: &str, value: String) {
        self.params.insert(name.to_string(), value);
    }

    /// 获取全部路径参数
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }
}

/// 在第一个 `?` 处把请求目标切分为裸路径和查询字符串。
fn split_query(target: &str) -> (String, Option<String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 验证常规 GET 请求的解析，包括 Path 和 Headers
    #[test]
    fn test_parse_get_request() {
        let request_str =
            "GET / HTTP/1.1\r\nHost: localhost:7878\r\nUser-Agent: Test-Browser\r\n\r\n";
        let buffer = request_str.as_bytes().to_vec();

        let request = Request::try_from(&buffer, 0).unwrap();

        assert_eq!(request.method(), HttpRequestMethod::Get);
        assert_eq!(request.path(), "/");
        assert_eq!(request.user_agent(), "Test-Browser");
        assert!(request.params().is_empty());
    }

    /// 路由表接受的七个动词都应能被解析
    #[test]
    fn test_parse_all_verbs() {
        for verb in ["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"] {
            let request_str = format!("{} /res HTTP/1.1\r\nHost: localhost\r\n\r\n", verb);
            let buffer = request_str.as_bytes().to_vec();

            let request = Request::try_from(&buffer, 0).unwrap();

            assert_eq!(request.method().to_string(), verb);
            assert_eq!(request.path(), "/res");
        }
    }

    /// 确保固定集合之外的方法（如 TRACE）会返回错误
    #[test]
    fn test_unsupported_method() {
        let request_str = "TRACE /resource HTTP/1.1\r\nHost: localhost:7878\r\n\r\n";
        let buffer = request_str.as_bytes().to_vec();

        let result = Request::try_from(&buffer, 0);

        assert!(result.is_err());
        match result.unwrap_err() {
            Exception::UnsupportedRequestMethod => {}
            _ => panic!("Expected UnsupportedRequestMethod error"),
        }
    }

    /// 确保不支持的版本（如 HTTP/2.0）被正确拒绝
    #[test]
    fn test_unsupported_http_version() {
        let request_str = "GET / HTTP/2.0\r\nHost: localhost:7878\r\n\r\n";
        let buffer = request_str.as_bytes().to_vec();

        let result = Request::try_from(&buffer, 0);

        assert!(result.is_err());
        match result.unwrap_err() {
            Exception::UnsupportedHttpVersion => {}
            _ => panic!("Expected UnsupportedHttpVersion error"),
        }
    }

    /// 验证 UTF-8 编码检查
    #[test]
    fn test_invalid_utf8() {
        let buffer = vec![0xFF, 0xFE, 0xFD];

        let result = Request::try_from(&buffer, 0);

        assert!(result.is_err());
        match result.unwrap_err() {
            Exception::RequestIsNotUtf8 => {}
            _ => panic!("Expected RequestIsNotUtf8 error"),
        }
    }

    /// 确保带查询参数的路径被切分为裸路径与查询字符串
    #[test]
    fn test_path_with_query_string() {
        let request_str = "GET /page?id=123&name=test HTTP/1.1\r\nHost: localhost:7878\r\n\r\n";
        let buffer = request_str.as_bytes().to_vec();

        let request = Request::try_from(&buffer, 0).unwrap();

        assert_eq!(request.path(), "/page");
        assert_eq!(request.query(), Some("id=123&name=test"));
    }

    /// 验证请求方法的小写兼容性处理
    #[test]
    fn test_lowercase_method() {
        let request_str = "get / HTTP/1.1\r\nHost: localhost:7878\r\n\r\n";
        let buffer = request_str.as_bytes().to_vec();

        let request = Request::try_from(&buffer, 0).unwrap();

        assert_eq!(request.method(), HttpRequestMethod::Get);
    }

    /// 参数映射的读写与覆盖
    #[test]
    fn test_param_map() {
        let mut request = Request::new(HttpRequestMethod::Get, "/users/42");

        assert!(request.param("id").is_none());

        request.set_param("id", "42".to_string());
        assert_eq!(request.param("id"), Some("42"));

        request.set_param("id", "43".to_string());
        assert_eq!(request.param("id"), Some("43"));
        assert_eq!(request.params().len(), 1);
    }

    /// 直接构造的请求也应剥离查询字符串
    #[test]
    fn test_new_splits_query() {
        let request = Request::new(HttpRequestMethod::Post, "/submit?draft=1");

        assert_eq!(request.path(), "/submit");
        assert_eq!(request.query(), Some("draft=1"));
    }
}
