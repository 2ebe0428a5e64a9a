//! # Estado de Desambiguação
//!
//! Valor serializável que atravessa as rodadas (via campos de formulário):
//!
//! - `search_text`: texto livre recém digitado, re-interpretado a cada envio;
//! - `no_matches`: tokens sem resultado, cada um com marca de exclusão;
//! - `multiple_matches`: tokens ambíguos, candidatos e seleção opcional;
//! - `confirmed`: tokens já ligados a uma única entidade, no máximo uma linha
//!   por entidade.
//!
//! Não existe sessão no servidor: tudo que o próximo envio precisa está aqui.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::search_index::SearchableEntity;

/// Linha do balde "sem resultado"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoMatchRow {
    pub search_term: String,
    pub delete: bool,
}

/// Opção exibida numa linha ambígua.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: EntityId,
    pub display: String,
}

impl Candidate {
    pub fn of<E: SearchableEntity>(entity: &E) -> Self {
        Self {
            id: entity.id(),
            display: entity.display(),
        }
    }
}

/// Linha do balde "vários resultados".
///
/// `candidates` é recalculado a cada rodada e não faz parte do formulário;
/// só `selected` volta do navegador.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleMatchRow {
    pub search_term: String,
    pub candidates: Vec<Candidate>,
    pub selected: Option<EntityId>,
    pub delete: bool,
}

/// Linha confirmada: token resolvido para exatamente uma entidade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedRow {
    pub search_term: String,
    pub entity_id: EntityId,
    pub display: String,
    pub delete: bool,
}

impl ConfirmedRow {
    pub fn new(search_term: impl Into<String>, entity_id: EntityId, display: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            entity_id,
            display: display.into(),
            delete: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisambiguationState {
    pub search_text: String,
    pub no_matches: Vec<NoMatchRow>,
    pub multiple_matches: Vec<MultipleMatchRow>,
    pub confirmed: Vec<ConfirmedRow>,
}

impl DisambiguationState {
    /// Estado inicial (primeiro GET)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pronto para inserção: nada pendente e ao menos uma linha confirmada
    /// que não esteja marcada para exclusão.
    pub fn is_fully_resolved(&self) -> bool {
        self.no_matches.is_empty() && self.multiple_matches.is_empty() && self.confirmed_ids().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.search_text.trim().is_empty()
            && self.no_matches.is_empty()
            && self.multiple_matches.is_empty()
            && self.confirmed.is_empty()
    }

    /// Ids das entidades confirmadas, na ordem das linhas
    pub fn confirmed_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.confirmed.iter().filter(|row| !row.delete).map(|row| row.entity_id)
    }
}
