/// State carried between hook invocations of one session
pub mod session;

pub use session::SessionCache;
