//! # Erros do núcleo
//!
//! Ausência de correspondência NÃO é erro: um token sem resultados vai para o
//! balde `no_matches`. Os erros aqui são falhas reais (armazenamento
//! indisponível, snapshot inválido) ou entradas que o fluxo não aceita.

use thiserror::Error;

use crate::entity::EntityId;

/// Erro principal do núcleo de resolução de identificadores
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Model type '{0}' is not supported")]
    UnknownEntityType(String),

    #[error("Study cohort {0} not found")]
    CohortNotFound(EntityId),

    #[error("Study {0} not found")]
    StudyNotFound(EntityId),

    #[error("Invalid study: {0}")]
    InvalidStudy(String),

    #[error("A study with DOI '{0}' already exists")]
    DuplicateDoi(String),

    #[error("Invalid study cohort: {0}")]
    InvalidCohort(String),

    #[error("Disease {0} does not exist")]
    UnknownDisease(EntityId),

    #[error("Invalid finding type '{0}' (expected 'V' or 'A')")]
    InvalidFindingType(String),

    #[error("Cannot insert findings: {no_matches} unmatched and {multiple_matches} ambiguous search terms remain")]
    NotResolved {
        no_matches: usize,
        multiple_matches: usize,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
