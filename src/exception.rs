// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了路由层在声明期与请求处理生命周期中可能抛出的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了声明期错误（非法方法、非法响应体）与报文解析错误。
//! - **语义映射**：声明期错误是致命的，应当在启动阶段立即暴露；
//!   而"未匹配到路由"这类请求期结果不属于异常，调度器会将其归一化为 404 响应。
//! - **用户友好**：通过实现 `std::fmt::Display`，确保错误信息可以被安全地记录到日志。

use std::fmt;

/// 路由层可能产生的异常类型。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 以固定方法集合之外的动词注册路由。声明期致命错误，应当中止启动。
    InvalidMethod,
    /// 以不支持的形态构造响应体。构造期致命错误。
    TypeMismatch,
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行中的方法不在固定方法集合中。
    UnsupportedRequestMethod,
    /// 客户端使用了不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
}

use Exception::*;

impl fmt::Display for Exception {
    /// 根据错误类型写入人类可读的描述文本。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidMethod => write!(f, "Route registered with a verb outside the allowed set"),
            TypeMismatch => write!(f, "Response body built from an unsupported type"),
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnsupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
        }
    }
}

impl std::error::Error for Exception {}
