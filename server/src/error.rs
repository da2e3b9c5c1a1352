use kickoff_shared::{Team, WireError};

/// Failures that stop the server as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("simulation loop stopped unexpectedly")]
    SimulationStopped,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons the registry refuses to admit a player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinRefusal {
    #[error("Name must be 1 to {max} characters.")]
    InvalidName { max: usize },

    #[error("Name '{0}' is already taken.")]
    NameTaken(String),

    #[error("Joining {0} would unbalance the teams.")]
    TeamsUnbalanced(Team),

    #[error("Server full")]
    ServerFull,
}

/// Failures during the join negotiation of a single connection.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("too many name input tries")]
    TooManyNameAttempts,

    #[error("too many team input tries")]
    TooManyTeamAttempts,

    #[error("unexpected packet during handshake: expected {expected}")]
    UnexpectedPacket { expected: &'static str },

    #[error("join refused: {0}")]
    Refused(#[from] JoinRefusal),
}

/// Operator console parse failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{0}' expects a number of seconds")]
    MissingSeconds(&'static str),

    #[error("invalid number of seconds '{0}', expected a positive integer")]
    InvalidSeconds(String),
}

/// Reasons a single connection handler stops.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Server(#[from] ServerError),
}
