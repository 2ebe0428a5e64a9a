//! # Orquestrador do Fluxo
//!
//! Liga tudo em um ciclo requisição/resposta:
//!
//! 1. GET: estado vazio.
//! 2. POST: o [`Submission`] decodificado passa por uma rodada
//!    ([`run_round`]).
//! 3. Modo inserção + `confirm_insert` + estado resolvido: grava os achados
//!    ([`insert_confirmed`]) e devolve o estudo para redirecionamento.
//!    Caso contrário, o novo estado volta para a tela.
//!
//! Não há laço em processo: cada rodada é uma requisição e o estado só
//! sobrevive nos campos do formulário.

use serde::Serialize;
use tracing::{info, info_span};

use crate::disambiguation::run_round;
use crate::entity::{EntityId, EntityKind, GeneFindingType};
use crate::error::{CoreError, Result};
use crate::form::Submission;
use crate::gene::HgncGene;
use crate::insertion::{insert_confirmed, InsertTarget};
use crate::metabolite::HmdbMetabolite;
use crate::search_index::SearchableEntity;
use crate::state::DisambiguationState;
use crate::store::{EntityRepository, FindingRepository, InsertReport};
use crate::study::StudyCohort;
use crate::study_view::describe_cohort;

/// Identificar apenas, ou identificar e gravar achados numa coorte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowMode {
    Identify,
    Insert {
        cohort_id: EntityId,
        finding_type: Option<GeneFindingType>,
    },
}

/// Coorte alvo já carregada, com rótulo para a tela
#[derive(Debug, Clone, Serialize)]
pub struct CohortContext {
    pub cohort: StudyCohort,
    pub label: String,
}

/// O que a camada web deve fazer com a rodada.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Mostrar o estado para mais uma rodada
    Render {
        state: DisambiguationState,
        resolved: bool,
        cohort: Option<CohortContext>,
    },
    /// Achados gravados; voltar para o estudo
    Inserted { study_id: EntityId, report: InsertReport },
}

fn load_cohort<R: FindingRepository + ?Sized>(repo: &R, mode: WorkflowMode) -> Result<Option<CohortContext>> {
    let WorkflowMode::Insert { cohort_id, .. } = mode else {
        return Ok(None);
    };
    let cohort = repo.cohort(cohort_id)?.ok_or(CoreError::CohortNotFound(cohort_id))?;
    let label = describe_cohort(repo, &cohort)?;
    Ok(Some(CohortContext { cohort, label }))
}

/// Processa uma requisição para o tipo de entidade `E`.
///
/// `submission` é `None` no GET.
pub fn handle<E, R>(repo: &R, mode: WorkflowMode, submission: Option<Submission>) -> Result<Outcome>
where
    E: SearchableEntity,
    R: EntityRepository<E> + FindingRepository + ?Sized,
{
    let span = info_span!("round", kind = %E::KIND, mode = ?mode);
    let _enter = span.enter();

    let cohort = load_cohort(repo, mode)?;

    let Some(submission) = submission else {
        return Ok(Outcome::Render {
            state: DisambiguationState::empty(),
            resolved: false,
            cohort,
        });
    };

    let state = run_round::<E, R>(repo, &submission.state)?;
    let resolved = state.is_fully_resolved();

    if let (WorkflowMode::Insert { finding_type, .. }, Some(context)) = (mode, &cohort) {
        if submission.confirm_insert && resolved {
            let target = InsertTarget {
                cohort_id: context.cohort.id,
                kind: E::KIND,
                finding_type,
            };
            let report = insert_confirmed(repo, &state, target)?;
            return Ok(Outcome::Inserted {
                study_id: context.cohort.study_id,
                report,
            });
        }
        if submission.confirm_insert {
            info!("Inserção pedida com termos pendentes, nova rodada");
        }
    }

    Ok(Outcome::Render { state, resolved, cohort })
}

/// Despacha pelo tipo de entidade escolhido na URL.
pub fn handle_kind<R>(repo: &R, kind: EntityKind, mode: WorkflowMode, submission: Option<Submission>) -> Result<Outcome>
where
    R: EntityRepository<HgncGene> + EntityRepository<HmdbMetabolite> + FindingRepository + ?Sized,
{
    match kind {
        EntityKind::Gene => handle::<HgncGene, R>(repo, mode, submission),
        EntityKind::Metabolite => handle::<HmdbMetabolite, R>(repo, mode, submission),
    }
}
