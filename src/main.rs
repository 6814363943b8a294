// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由层演示服务器
//!
//! 该二进制是路由层的宿主示例：它承担传输层的职责，
//! 负责监听 TCP 连接、把原始报文解析为请求对象、调用调度器、
//! 再把响应三元组序列化后写回网络。核心功能包括：
//! - 启动阶段一次性声明路由表（含静态路由、路径参数、重定向与 halt 示例）
//! - 基于 Tokio 运行时的多线程异步 I/O 处理
//! - 可配置的监听地址、工作线程数与访问日志开关

use routekit::{
    app::App,
    config::Config,
    param::ALLOWED_METHODS,
    request::Request,
    response::to_http_bytes,
    route::{complete, halt},
};

use log::{debug, error, info};
use log4rs;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
    time::Instant,
};

/// # 程序入口点
///
/// 初始化日志系统、加载配置、构建路由表并启动主事件循环。
fn main() {
    // 1. 初始化日志系统：采用 log4rs 异步日志架构，通过外部 YAML 灵活配置级别与输出目的地
    log4rs::init_file("config/log4rs.yaml", Default::default()).unwrap();

    // 2. 环境配置加载：从 TOML 文件读取运行参数
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");

    // 3. 路由表构建：必须在服务第一个请求之前完成，此后只读
    let app = Arc::new(build_app());
    info!("路由表构建完成");

    // 4. 异步运行时定制：根据配置文件动态分配工作线程数
    let worker_threads = config.worker_threads();
    let runtime = Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .unwrap();

    // 5. 网络层初始化：
    // 支持全地址监听 (0.0.0.0) 或本地回环监听 (127.0.0.1)
    let port: u16 = config.port();
    info!("服务端将在{}端口上监听Socket连接", port);
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}地址上监听Socket连接", address);
    let socket = SocketAddrV4::new(address, port);
    let access_log = config.access_log();

    runtime.block_on(async move {
        // 绑定端口并启动监听器
        let listener = match TcpListener::bind(socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("无法绑定端口：{}，错误：{}", port, e);
                panic!("无法绑定端口：{}，错误：{}", port, e);
            }
        };
        info!("端口{}绑定完成", port);

        let mut id: u128 = 0;

        // 6. 主事件循环 (Accept Loop)
        // 持续接收新连接并将其分发至 Tokio 线程池进行异步处理
        loop {
            let (mut stream, addr) = listener.accept().await.unwrap();
            debug!("新的连接：{}", addr);

            let app_arc = Arc::clone(&app);
            debug!("[ID{}]TCP连接已建立", id);

            tokio::spawn(async move {
                handle_connection(&mut stream, id, app_arc, access_log).await;
            });
            id += 1; // 增加请求唯一标识序列
        }
    });
}

/// # 示例路由表
///
/// 展示路由层的声明面：各动词方法、`:name` 路径参数、
/// 重定向便捷操作，以及处理器内的 halt 提前中止。
fn build_app() -> App {
    let mut app = App::new();

    app.get("/", |_ctx| {
        complete("<h1>routekit</h1><p>一个最小化的HTTP路由层。</p>")
    });

    app.get("/hello/:name", |ctx| {
        let name = ctx.request.param("name").unwrap_or("world").to_string();
        complete(format!("<p>你好，{}！</p>", name))
    });

    app.get("/users/:id", |ctx| {
        ctx.response.set_header("Content-Type", "application/json");
        let id = ctx.request.param("id").unwrap_or_default().to_string();
        complete(serde_json::json!({ "id": id }).to_string())
    });

    // 旧路径重定向到首页
    app.get("/old", |ctx| {
        ctx.response.redirect("/");
        complete("")
    });

    app.post("/echo/:word", |ctx| {
        let word = ctx.request.param("word").unwrap_or_default().to_string();
        complete(word)
    });

    app.get("/admin/:token", |ctx| {
        if ctx.request.param("token") != Some("secret") {
            return halt(403, "forbidden");
        }
        complete("<p>console</p>")
    });

    app.options("/", |ctx| {
        let allow = ALLOWED_METHODS
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        ctx.response.set_header("Allow", &allow);
        complete("")
    });

    app
}

/// # 连接处理器
///
/// 负责单个 TCP 流的生命周期：读取并解析请求、调用调度器、
/// 序列化响应三元组并发送。
async fn handle_connection(stream: &mut TcpStream, id: u128, app: Arc<App>, access_log: bool) {
    let mut buffer = vec![0; 1024];

    // 等待流进入可读状态
    stream.readable().await.unwrap();

    // 尝试非阻塞读取 HTTP 报文
    match stream.try_read(&mut buffer) {
        Ok(0) => return, // 客户端主动关闭连接
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
        _ => {}
    }
    debug!("[ID{}]HTTP请求接收完毕", id);

    let start_time = Instant::now();

    // 1. 协议解析阶段：将字节流转换为结构化的 Request 对象
    let mut request = match Request::try_from(&buffer, id) {
        Ok(req) => req,
        Err(e) => {
            error!("[ID{}]解析HTTP请求失败: {:?}", id, e);
            let response = "HTTP/1.1 400 Bad Request\r\nContent-Length: 11\r\n\r\nBad Request";
            let _ = stream.write_all(response.as_bytes()).await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    // 2. 调度阶段：匹配路由、绑定参数、执行处理器并收尾
    let parts = app.dispatch(&mut request);
    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    // 3. 结构化日志记录：便于后期审计与性能监控
    if access_log {
        info!(
            "[ID{}] {}, {}, {}, {}, {}, ",
            id,
            request.version(),
            request.path(),
            request.method(),
            parts.0,
            request.user_agent(),
        );
    }

    // 4. 数据发送阶段
    let response_bytes = to_http_bytes(&parts);
    debug!("[ID{}]发送全量响应，长度: {}", id, response_bytes.len());
    let _ = stream.write_all(&response_bytes).await;
    let _ = stream.flush().await;
}
