use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Missing required environment variable(s): {}", .fields.join(", "))]
    MissingConfigError { fields: Vec<String> },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invoice file not found: {}", .path.display())]
    NotFoundError { path: PathBuf },

    #[error("Document analysis failed: {message}")]
    AnalysisError { message: String },

    #[error("Could not acquire a credential: {message}")]
    CredentialError { message: String },

    #[error("Failed to save extracted invoice data to Cosmos DB: {message}")]
    PersistenceError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl InvoiceError {
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::AnalysisError {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceError {
            message: message.into(),
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::CredentialError {
            message: message.into(),
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConfigError { .. } | Self::InvalidConfigValueError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingConfigError { .. } => {
                "Export the listed variables or put them in a .env file next to the binary"
            }
            Self::InvalidConfigValueError { .. } => {
                "Endpoints must be absolute http(s) URLs, e.g. https://<resource>.cognitiveservices.azure.com/"
            }
            Self::NotFoundError { .. } => "Check the invoice path and try again",
            Self::CredentialError { .. } => {
                "Set DOCUMENTINTELLIGENCE_API_KEY, the AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET trio, or run `az login`"
            }
            Self::AnalysisError { .. } => {
                "Verify the endpoint, the credential and that the file is a supported PDF/image"
            }
            Self::PersistenceError { .. } => {
                "Verify the Cosmos DB account, key, database and container names"
            }
            Self::IoError(_) | Self::SerializationError(_) => "Re-run with RUST_LOG=debug for details",
        }
    }

    /// 非零退出碼：設定錯誤 2、檔案錯誤 1、遠端錯誤 3
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingConfigError { .. } | Self::InvalidConfigValueError { .. } => 2,
            Self::NotFoundError { .. } | Self::IoError(_) => 1,
            _ => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
