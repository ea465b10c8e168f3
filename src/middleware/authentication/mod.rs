mod getheader;
mod manager;
mod manager_middleware;
pub mod method;
mod verifier;

pub use getheader::*;
pub use manager::*;
pub use manager_middleware::*;
pub use verifier::*;
