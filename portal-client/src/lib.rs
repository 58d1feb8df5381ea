pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod interceptor;
pub mod metrics;
pub mod public;
pub mod session;

pub use client::{ApiClient, ACCESS_TOKEN_HEADER};
pub use config::{load_portal_config, PortalConfig};
pub use error::{ApiError, ApiResult, ErrorBody, LoginError, SessionError};
pub use guard::{RouteDecision, RouteGuard};
pub use interceptor::{InterceptorHandle, ResponseEvent, ResponseInterceptor};
pub use metrics::SessionMetrics;
pub use public::{MessageResponse, PublicClient, RegisterRequest};
pub use session::{SessionContext, SessionContextBuilder, SessionState};
