// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由表与调度模块
//!
//! `App` 持有按 HTTP 方法分组的路由表。宿主程序在启动阶段通过各动词方法
//! （或字符串动词的 `register`）声明路由，表是只追加的：同一方法下的路由
//! 按声明顺序存放，调度时先声明者先匹配，命中即止。
//!
//! 一次调度的生命周期：归一化路径 → 顺序匹配 → 绑定路径参数 →
//! 在全新的 `Context` 中执行处理器 → 把处理器的控制流结果落到响应上 →
//! 收尾并返回响应三元组。无论命中、halt 还是未命中，调用方都会恰好
//! 得到一个结构完整的三元组，请求绝不会把异常泄漏给服务循环。

use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    exception::Exception,
    param::HttpRequestMethod,
    request::Request,
    response::{Response, ResponseParts},
    route::{Context, HandlerFlow, Route},
};

/// 路由表与调度器。
///
/// 路由表必须在服务第一个请求之前填充完毕；调度期间表是只读的。
pub struct App {
    routes: HashMap<HttpRequestMethod, Vec<Route>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// 声明一条 DELETE 路由
    pub fn delete(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        self.add(HttpRequestMethod::Delete, pattern, handler);
    }

    /// 声明一条 GET 路由
    pub fn get(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        self.add(HttpRequestMethod::Get, pattern, handler);
    }

    /// 声明一条 HEAD 路由
    pub fn head(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        self.add(HttpRequestMethod::Head, pattern, handler);
    }

    /// 声明一条 OPTIONS 路由
    pub fn options(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        self.add(HttpRequestMethod::Options, pattern, handler);
    }

    /// 声明一条 PATCH 路由
    pub fn patch(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        self.add(HttpRequestMethod::Patch, pattern, handler);
    }

    /// 声明一条 POST 路由
    pub fn post(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        self.add(HttpRequestMethod::Post, pattern, handler);
    }

    /// 声明一条 PUT 路由
    pub fn put(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        self.add(HttpRequestMethod::Put, pattern, handler);
    }

    /// 以字符串动词声明路由。固定方法集合之外的动词返回
    /// `Exception::InvalidMethod`，该错误在声明期是致命的。
    pub fn register(
        &mut self,
        verb: &str,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) -> Result<(), Exception> {
        let method = match HttpRequestMethod::parse(verb) {
            Ok(m) => m,
            Err(e) => {
                warn!("以非法动词注册路由被拒绝: {} {}", verb, pattern);
                return Err(e);
            }
        };
        self.add(method, pattern, handler);
        Ok(())
    }

    fn add(
        &mut self,
        method: HttpRequestMethod,
        pattern: &str,
        handler: impl Fn(&mut Context) -> HandlerFlow + Send + Sync + 'static,
    ) {
        let route = Route::compile(method, pattern, handler);
        self.routes.entry(method).or_insert_with(Vec::new).push(route);
    }

    /// 某方法下已声明的路由数量
    pub fn route_count(&self, method: HttpRequestMethod) -> usize {
        self.routes.get(&method).map_or(0, Vec::len)
    }

    /// 调度一次请求，返回收尾后的响应三元组。
    ///
    /// 未命中路由等价于 `halt 404`（空消息）。方法不同而路径相同的声明
    /// 同样产生 404，与未知路径不作区分。
    pub fn dispatch(&self, request: &mut Request) -> ResponseParts {
        // 空路径归一化为根路径
        if request.path().is_empty() {
            request.set_path("/");
        }

        let mut response = Response::new();

        let flow = match self.find_route(request) {
            Some(route) => {
                debug!("路由命中: {} {}", request.method(), route.pattern());
                let mut ctx = Context {
                    request,
                    response: &mut response,
                };
                (route.handler())(&mut ctx)
            }
            None => {
                debug!("未命中任何路由: {} {}", request.method(), request.path());
                HandlerFlow::Halt(404, String::new())
            }
        };

        match flow {
            // 处理器的返回值作为最后一次隐式写入
            HandlerFlow::Complete(value) => response.write(value),
            // halt：设置状态码并整体替换响应体
            HandlerFlow::Halt(status, message) => {
                response.set_status(status);
                response.set_body(vec![message]);
            }
        }

        response.finish()
    }

    /// 顺序扫描请求方法对应的路由序列，返回第一条命中的路由，
    /// 并把捕获值按声明顺序绑定进请求的参数映射（同名键覆盖）。
    fn find_route(&self, request: &mut Request) -> Option<&Route> {
        let routes = self.routes.get(&request.method())?;
        for route in routes {
            if let Some(values) = route.matches(request.path()) {
                for (name, value) in route.param_names().iter().zip(values) {
                    request.set_param(name, value);
                }
                return Some(route);
            }
        }
        None
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
