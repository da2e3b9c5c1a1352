use kickoff_shared::WireError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("server rejected us: {0}")]
    Rejected(String),

    #[error("server refused every name we tried")]
    NameRefused,

    #[error("server refused both teams")]
    TeamRefused,

    #[error("unexpected packet from server: expected {expected}")]
    UnexpectedPacket { expected: &'static str },
}
