pub mod audit;
pub mod security;

pub use audit::audit_middleware;
pub use security::security_headers_middleware;
