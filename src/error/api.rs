//! Spotify / 后端 HTTP 调用相关错误

/// HTTP API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 网络请求错误（连接失败、超时等）
    #[error("reqwest 错误: {0}")]
    Reqwest(reqwest::Error),

    /// 序列化错误
    #[error("serde 错误: {0}")]
    Serde(serde_json::Error),

    /// 非 2xx 响应
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// 本地没有可用的 access token
    #[error("未登录")]
    NotAuthenticated,

    /// 刷新 token 失败，会话已被注销
    #[error("登录已过期，请重新登录")]
    SessionExpired,

    /// 输入参数无效
    #[error("输入错误: {0}")]
    BadInput(&'static str),

    /// 响应缺少必要字段
    #[error("响应缺少字段: {0}")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Reqwest(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serde(err)
    }
}

impl ApiError {
    /// 判断是否是网络错误
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Reqwest(_))
    }

    /// HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
