pub mod http;
pub mod logging;
pub mod remote;
pub mod sync;

pub use http::HttpTransport;
pub use remote::{ApiRequest, Method, RawResponse, RemoteClient, RemoteError, Surface, Transport};
pub use sync::{SyncCommand, SyncResponse};
