/// Structured code the server may attach to a duplicate-download rejection.
pub const ALREADY_DOWNLOADED_CODE: &str = "already_downloaded";

pub const INVALID_INPUT_MESSAGE: &str = "Please enter a valid YouTube URL.";
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not reach the download server. Check your connection and try again.";

/// Failure of a request the controller asked the platform to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The server answered, but reported `success: false`.
    Server {
        message: String,
        code: Option<String>,
    },
    /// No application-level answer: connection, timeout, bad status or body.
    Transport { message: String },
}

impl RequestError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
            code: None,
        }
    }

    pub fn server_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RequestError::Transport { .. } => ErrorCategory::Connectivity,
            RequestError::Server { message, code } => code
                .as_deref()
                .and_then(category_from_code)
                .unwrap_or_else(|| classify_message(message)),
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match (self.category(), self) {
            (ErrorCategory::Other, RequestError::Server { message, .. })
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            (category, _) => category.canned_message().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    AuthenticationRequired,
    Unavailable,
    InvalidUrl,
    AlreadyDownloaded,
    Connectivity,
    Other,
}

impl ErrorCategory {
    fn canned_message(self) -> &'static str {
        match self {
            ErrorCategory::AuthenticationRequired => {
                "This video requires sign-in. The server needs a valid cookies file to fetch it."
            }
            ErrorCategory::Unavailable => "This video is private or unavailable.",
            ErrorCategory::InvalidUrl => "The server rejected this link as an invalid YouTube URL.",
            ErrorCategory::AlreadyDownloaded => "This video has already been downloaded.",
            ErrorCategory::Connectivity => CONNECTIVITY_MESSAGE,
            ErrorCategory::Other => "The server reported an unknown error.",
        }
    }
}

fn category_from_code(code: &str) -> Option<ErrorCategory> {
    match code {
        ALREADY_DOWNLOADED_CODE => Some(ErrorCategory::AlreadyDownloaded),
        "auth_required" => Some(ErrorCategory::AuthenticationRequired),
        "unavailable" => Some(ErrorCategory::Unavailable),
        "invalid_url" => Some(ErrorCategory::InvalidUrl),
        _ => None,
    }
}

const DUPLICATE_MARKERS: &[&str] = &["already been downloaded", "already downloaded"];
const AUTH_MARKERS: &[&str] = &[
    "sign in",
    "login required",
    "authentication",
    "cookie",
];
const UNAVAILABLE_MARKERS: &[&str] = &[
    "private video",
    "is private",
    "unavailable",
    "has been removed",
];
const INVALID_MARKERS: &[&str] = &["invalid url", "unsupported url", "not a valid url"];

/// Fallback for servers that only send a free-text message.
fn classify_message(message: &str) -> ErrorCategory {
    let lowered = message.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| lowered.contains(m));
    if has(DUPLICATE_MARKERS) {
        ErrorCategory::AlreadyDownloaded
    } else if has(UNAVAILABLE_MARKERS) {
        ErrorCategory::Unavailable
    } else if has(AUTH_MARKERS) {
        ErrorCategory::AuthenticationRequired
    } else if has(INVALID_MARKERS) {
        ErrorCategory::InvalidUrl
    } else {
        ErrorCategory::Other
    }
}
