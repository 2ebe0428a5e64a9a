//! # Curadoria de Estudos e Coortes
//!
//! Antes de inserir achados é preciso que o estudo e a coorte existam. Este
//! módulo valida os rascunhos vindos dos formulários e os grava:
//!
//! | Operação          | Rejeita com                                        |
//! |-------------------|----------------------------------------------------|
//! | [`create_study`]  | `InvalidStudy` (campo vazio/longo), `DuplicateDoi` |
//! | [`create_cohort`] | `StudyNotFound`, `InvalidCohort`, `UnknownDisease` |
//!
//! Nada é gravado quando a validação falha.

use std::collections::HashSet;

use tracing::info;

use crate::entity::EntityId;
use crate::error::{CoreError, Result};
use crate::store::FindingRepository;
use crate::study::{NewCohort, NewStudy, Study, StudyCohort};

/// Valida e grava um estudo novo.
pub fn create_study<R>(repo: &R, draft: NewStudy) -> Result<Study>
where
    R: FindingRepository + ?Sized,
{
    let draft = draft.normalized();
    if let Some(problem) = draft.problem() {
        return Err(CoreError::InvalidStudy(problem));
    }

    let study = repo.add_study(draft)?;
    info!(study_id = study.id, doi = %study.doi, "Estudo criado");
    Ok(study)
}

/// Valida e grava uma coorte no estudo `study_id`.
///
/// Exige ao menos uma doença e um controle, todos existentes. Ids repetidos
/// são mantidos uma vez, na ordem em que chegaram.
pub fn create_cohort<R>(repo: &R, study_id: EntityId, draft: NewCohort) -> Result<StudyCohort>
where
    R: FindingRepository + ?Sized,
{
    if repo.study(study_id)?.is_none() {
        return Err(CoreError::StudyNotFound(study_id));
    }

    let draft = NewCohort {
        disease_tags: unique(draft.disease_tags),
        control_tags: unique(draft.control_tags),
    };
    if draft.disease_tags.is_empty() {
        return Err(CoreError::InvalidCohort("at least one disease tag is required".to_string()));
    }
    if draft.control_tags.is_empty() {
        return Err(CoreError::InvalidCohort("at least one control tag is required".to_string()));
    }
    for id in draft.disease_tags.iter().chain(&draft.control_tags) {
        if repo.disease(*id)?.is_none() {
            return Err(CoreError::UnknownDisease(*id));
        }
    }

    let cohort = repo.add_cohort(study_id, draft)?;
    info!(study_id, cohort_id = cohort.id, "Coorte criada");
    Ok(cohort)
}

fn unique(ids: Vec<EntityId>) -> Vec<EntityId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_snapshot;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::from_snapshot(demo_snapshot()).unwrap()
    }

    fn draft(title: &str, doi: &str) -> NewStudy {
        NewStudy {
            title: title.to_string(),
            doi: doi.to_string(),
            ..NewStudy::default()
        }
    }

    #[test]
    fn test_create_study_trims_and_assigns_id() {
        let store = store();
        let study = create_study(&store, draft("  Cytokine signatures  ", " 10.1/cyto ")).unwrap();
        assert_eq!(study.id, 3);
        assert_eq!(study.title, "Cytokine signatures");
        assert_eq!(store.study(3).unwrap().unwrap().doi, "10.1/cyto");
    }

    #[test]
    fn test_create_study_rejects_blank_title() {
        let store = store();
        let err = create_study(&store, draft("   ", "10.1/x")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStudy(ref msg) if msg == "title is required"));
        assert_eq!(store.studies().unwrap().len(), 2);
    }

    #[test]
    fn test_create_study_rejects_existing_doi_after_trim() {
        let store = store();
        let err = create_study(&store, draft("Again", " 10.1073/pnas.1607571113 ")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateDoi(_)));
    }

    #[test]
    fn test_create_cohort_dedups_tags() {
        let store = store();
        let cohort = create_cohort(
            &store,
            1,
            NewCohort {
                disease_tags: vec![3, 1, 3],
                control_tags: vec![2],
            },
        )
        .unwrap();
        assert_eq!(cohort.study_id, 1);
        assert_eq!(cohort.disease_tags, vec![3, 1]);
        assert_eq!(store.cohorts_for_study(1).unwrap().len(), 3);
    }

    #[test]
    fn test_create_cohort_rejections_write_nothing() {
        let store = store();
        let both = |diseases: Vec<EntityId>, controls: Vec<EntityId>| NewCohort {
            disease_tags: diseases,
            control_tags: controls,
        };

        assert!(matches!(create_cohort(&store, 9, both(vec![1], vec![2])), Err(CoreError::StudyNotFound(9))));
        assert!(matches!(create_cohort(&store, 1, both(vec![], vec![2])), Err(CoreError::InvalidCohort(_))));
        assert!(matches!(create_cohort(&store, 1, both(vec![1], vec![])), Err(CoreError::InvalidCohort(_))));
        assert!(matches!(create_cohort(&store, 1, both(vec![1], vec![77])), Err(CoreError::UnknownDisease(77))));
        assert_eq!(store.cohorts_for_study(1).unwrap().len(), 2);
    }
}
