//! # Visão de Estudo
//!
//! Para onde o usuário volta depois de uma inserção: o estudo, suas coortes
//! (com rótulo) e os achados de cada coorte, genes agrupados por subtipo.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entity::EntityId;
use crate::error::Result;
use crate::gene::HgncGene;
use crate::metabolite::HmdbMetabolite;
use crate::search_index::SearchableEntity;
use crate::store::{EntityRepository, FindingRepository};
use crate::study::{cohort_label, Disease, FindingTarget, Study, StudyCohort};

/// Grupo para achados de gene sem subtipo
const UNTYPED: &str = "Unspecified";

#[derive(Debug, Clone, Serialize)]
pub struct FindingView {
    pub finding_id: EntityId,
    pub entity_id: EntityId,
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortView {
    pub id: EntityId,
    pub label: String,
    pub gene_findings: BTreeMap<String, Vec<FindingView>>,
    pub metabolite_findings: Vec<FindingView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyView {
    pub study: Study,
    pub cohorts: Vec<CohortView>,
}

fn load_diseases<R: FindingRepository + ?Sized>(repo: &R, ids: &[EntityId]) -> Result<Vec<Disease>> {
    let mut diseases = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(disease) = repo.disease(*id)? {
            diseases.push(disease);
        }
    }
    Ok(diseases)
}

/// Rótulo da coorte buscando estudo e doenças no repositório.
pub fn describe_cohort<R: FindingRepository + ?Sized>(repo: &R, cohort: &StudyCohort) -> Result<String> {
    let study = repo.study(cohort.study_id)?.unwrap_or_else(|| Study {
        id: cohort.study_id,
        ..Study::default()
    });
    let diseases = load_diseases(repo, &cohort.disease_tags)?;
    let controls = load_diseases(repo, &cohort.control_tags)?;
    Ok(cohort_label(
        &study,
        &diseases.iter().collect::<Vec<_>>(),
        &controls.iter().collect::<Vec<_>>(),
    ))
}

fn display_of<E, R>(repo: &R, id: EntityId) -> Result<String>
where
    E: SearchableEntity,
    R: EntityRepository<E> + ?Sized,
{
    Ok(repo
        .get(id)?
        .map(|entity| entity.display())
        .unwrap_or_else(|| format!("#{}", id)))
}

/// Monta a visão de um estudo; `None` se o estudo não existe.
pub fn study_view<R>(repo: &R, study_id: EntityId) -> Result<Option<StudyView>>
where
    R: FindingRepository + EntityRepository<HgncGene> + EntityRepository<HmdbMetabolite> + ?Sized,
{
    let Some(study) = repo.study(study_id)? else {
        return Ok(None);
    };

    let mut cohorts = Vec::new();
    for cohort in repo.cohorts_for_study(study_id)? {
        let mut view = CohortView {
            id: cohort.id,
            label: describe_cohort(repo, &cohort)?,
            gene_findings: BTreeMap::new(),
            metabolite_findings: Vec::new(),
        };

        for finding in repo.findings_for_cohort(cohort.id)? {
            match finding.target {
                FindingTarget::Gene { gene_id, finding_type } => {
                    let group = finding_type.map(|t| t.label()).unwrap_or(UNTYPED);
                    view.gene_findings
                        .entry(group.to_string())
                        .or_default()
                        .push(FindingView {
                            finding_id: finding.id,
                            entity_id: gene_id,
                            display: display_of::<HgncGene, R>(repo, gene_id)?,
                        });
                }
                FindingTarget::Metabolite { metabolite_id } => {
                    view.metabolite_findings.push(FindingView {
                        finding_id: finding.id,
                        entity_id: metabolite_id,
                        display: display_of::<HmdbMetabolite, R>(repo, metabolite_id)?,
                    });
                }
            }
        }
        cohorts.push(view);
    }

    Ok(Some(StudyView { study, cohorts }))
}
