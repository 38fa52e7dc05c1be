use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Not signed in. Run `sharetask login` first.")]
    NotSignedIn,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Invalid email address '{0}'.")]
    InvalidEmail(String),

    #[error("An account already exists for '{0}'.")]
    EmailTaken(String),

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters long.")]
    WeakPassword(usize),

    #[error("{0} name cannot be empty.")]
    EmptyName(&'static str),

    #[error("{kind} '{id}' not found.")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} id '{prefix}' is ambiguous.")]
    AmbiguousId { kind: &'static str, prefix: String },

    #[error("Invalid code.")]
    InvalidCode(String),

    #[error("No unused share codes of length {0} left. Raise share_code_length.")]
    ShareCodesExhausted(usize),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid time '{0}'. Use HH:MM.")]
    InvalidTime(String),

    #[error("Unknown role '{0}'. Expected owner, editor or viewer.")]
    InvalidRole(String),

    #[error("User '{0}' is not a member of this share space.")]
    NotAMember(String),

    #[error("Unsupported shell '{0}'. Expected bash, zsh, fish, powershell or elvish.")]
    UnsupportedShell(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotSignedIn | Error::InvalidCredentials => 2,
            Error::NotFound { .. } | Error::AmbiguousId { .. } => 3,
            Error::PermissionDenied(_) | Error::NotAMember(_) => 4,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
