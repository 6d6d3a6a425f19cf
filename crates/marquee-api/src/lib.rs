pub mod error;
pub mod proxy;
pub mod tmdb;
pub mod traits;

pub use error::ApiError;
pub use proxy::ProxyClient;
pub use tmdb::TmdbClient;
pub use traits::MovieSource;
