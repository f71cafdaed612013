// vigil-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    // --- ERREURS DU DOMAINE (Règles déclaratives, Classification) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing, DB) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- ERREURS DU MOTEUR DE RÈGLES (Adapter) ---
    #[error(transparent)]
    Engine(#[from] EngineError),

    // --- ERREURS GÉNÉRIQUES / APPLICATIVES ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for VigilError {
    fn from(err: std::io::Error) -> Self {
        VigilError::Infrastructure(InfrastructureError::Io(err))
    }
}
