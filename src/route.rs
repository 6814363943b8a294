// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由编译模块
//!
//! 该模块负责在声明期把 `/literal/:name` 形式的路径模式编译为可执行的匹配器：
//! 1. 每个 `:标识符` 占位符（冒号后接一个或多个单词字符）被替换为一个
//!    捕获组，匹配除 `/`、`?`、`#` 之外的一个或多个字符。
//! 2. 其余文本按字面意义匹配（正则元字符会被转义）。
//! 3. 整个模式锚定到完整路径，部分匹配不算命中。
//!
//! 同时定义了处理器契约：处理器在 `Context`（请求 + 响应）中执行，
//! 返回 `HandlerFlow` 表示正常完成或提前中止（halt）。

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{param::HttpRequestMethod, request::Request, response::Response};

lazy_static! {
    /// 占位符词法：冒号后接一个或多个单词字符。
    /// 孤立的冒号不构成占位符，按字面意义匹配。
    static ref PLACEHOLDER: Regex = Regex::new(r":(\w+)").unwrap();
}

/// 处理器执行上下文，每次调度独享一份。
pub struct Context<'a> {
    /// 当前请求，路径参数已在处理器执行前绑定完毕
    pub request: &'a mut Request,
    /// 本次请求新建的响应对象
    pub response: &'a mut Response,
}

/// 处理器的控制流结果。
///
/// `halt` 依靠处理器内的 `return` 实现单层提前退出：
/// 处理器返回 `Halt` 之后的代码自然不会执行，调度器据此替换响应体并直接收尾。
pub enum HandlerFlow {
    /// 正常完成，携带的值作为最后一次隐式 `write` 追加到响应体
    Complete(String),
    /// 提前中止：设置状态码，并以单个分块整体替换响应体
    Halt(u16, String),
}

/// 构造 `HandlerFlow::Complete`。
pub fn complete(value: impl Into<String>) -> HandlerFlow {
    HandlerFlow::Complete(value.into())
}

/// 构造 `HandlerFlow::Halt`。与 `return` 连用实现提前中止：
///
/// ```ignore
/// return halt(404, "missing");
/// ```
pub fn halt(status: u16, message: impl Into<String>) -> HandlerFlow {
    HandlerFlow::Halt(status, message.into())
}

/// 路由处理器：在声明期绑定，调度命中后在 `Context` 中执行。
pub type Handler = Box<dyn Fn(&mut Context) -> HandlerFlow + Send + Sync>;

/// 编译完成的路由条目。一经编译不可变。
pub struct Route {
    method: HttpRequestMethod,
    pattern: String,
    matcher: Regex,
    param_names: Vec<String>,
    handler: Handler,
}

impl Route {
    /// 把路径模式编译为锚定的匹配器，并按出现顺序记录参数名。
    ///
    /// 纯静态模式（不含占位符）是合法且常见的，此时参数名列表为空。
    /// 编译阶段没有错误条件。
    pub fn compile(
        method: HttpRequestMethod,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) -> Self {
        let mut source = String::from("^");
        let mut param_names = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(pattern) {
            let token = caps.get(0).unwrap();
            let name = caps.get(1).unwrap();
            source.push_str(&regex::escape(&pattern[last..token.start()]));
            source.push_str("([^/?#]+)");
            param_names.push(name.as_str().to_string());
            last = token.end();
        }
        source.push_str(&regex::escape(&pattern[last..]));
        source.push('$');

        // 转义后的字面量加固定捕获组，构造出的正则必然合法
        let matcher = Regex::new(&source).unwrap();
        debug!("路由编译完成: {} {} -> {}", method, pattern, source);

        Self {
            method,
            pattern: pattern.to_string(),
            matcher,
            param_names,
            handler: Box::new(handler),
        }
    }

    /// 用匹配器检查完整路径。命中时按占位符出现顺序返回捕获值。
    pub fn matches(&self, path: &str) -> Option<Vec<String>> {
        self.matcher.captures(path).map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .map(|group| group.as_str().to_string())
                .collect()
        })
    }
}

// --- Getter 访问器实现 ---

impl Route {
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 声明时的原始路径模式
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 参数名序列，与捕获组一一对应
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}
