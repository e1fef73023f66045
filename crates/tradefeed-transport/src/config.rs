/// Tuning knobs for the two listeners .
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port the TCP stream-socket listener binds on `0.0.0.0`.
    pub tcp_port: u16,
    /// Filesystem path of the Unix-domain socket, the POSIX analogue of
    /// a platform-native local named byte-stream endpoint.
    pub socket_path: String,
    /// Per-connection read buffer size in bytes.
    pub buffer_size: usize,
    /// Maximum concurrent connection instances on the local socket
    /// listener .
    pub max_local_instances: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tcp_port: 9999,
            socket_path: "/tmp/TradingDataPipe.sock".to_string(),
            buffer_size: 8192,
            max_local_instances: 4,
        }
    }
}
