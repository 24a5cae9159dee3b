//! 响应构造与请求体解析辅助。

pub mod response;
pub mod validation;
