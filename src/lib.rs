//! 实验控制台网关库
//! 无状态会话认证：密码哈希、令牌签发与校验、令牌定位、会话视图

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
