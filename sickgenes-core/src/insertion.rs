//! # Inserção de Achados
//!
//! Com o estado totalmente resolvido, cada linha confirmada vira um achado
//! ligando a coorte alvo à entidade. A gravação é um único lote com semântica
//! "ignore conflicts": reenviar o mesmo formulário (recarregar a página, dois
//! envios simultâneos) não é erro e não duplica nada.

use tracing::info;

use crate::entity::{EntityId, EntityKind, GeneFindingType};
use crate::error::{CoreError, Result};
use crate::state::DisambiguationState;
use crate::store::{FindingRepository, InsertReport};
use crate::study::{FindingTarget, NewFinding};

/// Destino dos achados: coorte, tipo de entidade e subtipo opcional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertTarget {
    pub cohort_id: EntityId,
    pub kind: EntityKind,
    /// Só tem efeito para genes
    pub finding_type: Option<GeneFindingType>,
}

impl InsertTarget {
    fn finding(&self, entity_id: EntityId) -> NewFinding {
        NewFinding {
            cohort_id: self.cohort_id,
            target: FindingTarget::new(self.kind, entity_id, self.finding_type),
        }
    }
}

/// Grava os achados das linhas confirmadas.
///
/// Falha com [`CoreError::NotResolved`] se ainda houver linhas pendentes ou
/// nenhuma confirmada; nada é gravado nesse caso.
pub fn insert_confirmed<R>(repo: &R, state: &DisambiguationState, target: InsertTarget) -> Result<InsertReport>
where
    R: FindingRepository + ?Sized,
{
    if !state.is_fully_resolved() {
        return Err(CoreError::NotResolved {
            no_matches: state.no_matches.len(),
            multiple_matches: state.multiple_matches.len(),
        });
    }

    let findings: Vec<NewFinding> = state.confirmed_ids().map(|id| target.finding(id)).collect();
    let report = repo.insert_findings(&findings)?;

    info!(
        cohort_id = target.cohort_id,
        kind = %target.kind,
        finding_type = target.finding_type.map(|t| t.code()),
        inserted = report.inserted,
        already_present = report.already_present,
        "Achados gravados"
    );

    Ok(report)
}
