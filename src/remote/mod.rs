pub(crate) mod remote_client;

// Re-export the public interface
pub use remote_client::RemoteClient;
