use thiserror::Error;

/// Problems reading a `data:` URL image
#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("Not a data URL")]
    NotADataUrl,

    #[error("Data URL is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Could not decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised while saving or loading a session file
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session file format.")]
    MissingDimensions,

    #[error("Failed to parse session: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layer '{name}' has unreadable image data: {source}")]
    LayerImage {
        name: String,
        #[source]
        source: DataUrlError,
    },

    #[error("Background image is unreadable: {0}")]
    Background(#[source] DataUrlError),

    #[error("Pattern '{name}' is unreadable: {source}")]
    Pattern {
        name: String,
        #[source]
        source: DataUrlError,
    },

    #[error("Session lists {0} more than once")]
    DuplicateLayer(crate::layer::LayerId),

    #[error("{shape} refers to missing {layer}")]
    DanglingShape {
        shape: crate::shape::ShapeId,
        layer: crate::layer::LayerId,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Failures of a generation round trip
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Please enter a prompt.")]
    EmptyPrompt,

    #[error("Please enter a core idea first.")]
    EmptyIdea,

    #[error("API key is not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Service responded with an unexpected payload: {0}")]
    MalformedResponse(String),

    #[error("No image data found in the API response.")]
    NoImageData,

    #[error("No text found in the API response.")]
    NoTextData,

    #[error("Generated image could not be decoded: {0}")]
    Decode(#[from] DataUrlError),

    #[error("Failed to encode the sketch: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Generation worker stopped before returning a result")]
    Canceled,
}

impl From<ureq::Error> for GenerationError {
    fn from(err: ureq::Error) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Failures while producing downloadable artifacts
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    Empty(&'static str),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to build archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Classified camera acquisition failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("No camera could be found on your device.")]
    NotFound,

    #[error("Camera access was denied. Please check your system settings.")]
    NotAllowed,

    #[error("Could not access the camera. Please ensure you have given permission. ({0})")]
    Other(String),
}

pub type CameraResult<T> = Result<T, CameraError>;

/// Errors from reading or writing configuration and preference files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to read stored data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
