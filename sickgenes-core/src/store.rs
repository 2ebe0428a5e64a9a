//! # Armazenamento — Repositórios e Implementação em Memória
//!
//! O núcleo não conhece o banco de dados: consome apenas dois contratos.
//!
//! - [`EntityRepository`]: busca em lote. Recebe TODOS os predicados de uma
//!   rodada numa única chamada e devolve uma lista de acertos por predicado.
//!   Os acertos podem repetir a mesma entidade (um por campo que casou, como
//!   num join SQL); quem deduplica é o [`matcher`](crate::matcher).
//! - [`FindingRepository`]: inserção de achados em lote com semântica
//!   "ignore conflicts", as leituras de estudo/coorte que o fluxo precisa e a
//!   criação de estudos e coortes (DOI único, coorte presa a um estudo).
//!
//! [`MemoryStore`] implementa os dois sobre `RwLock`s, avaliando os predicados
//! em paralelo com `rayon`. Pode ser carregado de um [`Snapshot`] JSON.

use std::collections::HashSet;
use std::path::Path;
use std::sync::RwLock;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::EntityId;
use crate::error::{CoreError, Result};
use crate::gene::HgncGene;
use crate::metabolite::HmdbMetabolite;
use crate::search_index::{Predicate, SearchableEntity};
use crate::study::{Disease, Finding, NewCohort, NewFinding, NewStudy, Study, StudyCohort};

/// Consulta de entidades canônicas de um tipo.
pub trait EntityRepository<E: SearchableEntity>: Send + Sync {
    /// Avalia todos os predicados de uma rodada; `result[i]` corresponde a `predicates[i]`.
    fn search(&self, predicates: &[Predicate<E>]) -> Result<Vec<Vec<E>>>;

    fn get(&self, id: EntityId) -> Result<Option<E>>;
}

/// Resultado de uma inserção em lote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReport {
    pub requested: usize,
    pub inserted: usize,
    /// Conflitos de chave tolerados (achado já existia)
    pub already_present: usize,
}

/// Persistência de achados e leitura de estudos/coortes.
pub trait FindingRepository: Send + Sync {
    /// Insere em lote; duplicatas (já existentes ou repetidas no lote) são ignoradas.
    fn insert_findings(&self, findings: &[NewFinding]) -> Result<InsertReport>;

    fn findings_for_cohort(&self, cohort_id: EntityId) -> Result<Vec<Finding>>;

    fn cohort(&self, id: EntityId) -> Result<Option<StudyCohort>>;

    fn cohorts_for_study(&self, study_id: EntityId) -> Result<Vec<StudyCohort>>;

    fn study(&self, id: EntityId) -> Result<Option<Study>>;

    /// Todos os estudos, em ordem de id
    fn studies(&self) -> Result<Vec<Study>>;

    fn disease(&self, id: EntityId) -> Result<Option<Disease>>;

    fn diseases(&self) -> Result<Vec<Disease>>;

    /// Grava um estudo validado. DOI repetido é [`CoreError::DuplicateDoi`].
    fn add_study(&self, study: NewStudy) -> Result<Study>;

    /// Grava uma coorte no estudo; estudo inexistente é [`CoreError::StudyNotFound`].
    fn add_cohort(&self, study_id: EntityId, cohort: NewCohort) -> Result<StudyCohort>;
}

/// Conteúdo completo do banco em formato JSON (dados de demonstração e testes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub genes: Vec<HgncGene>,
    pub metabolites: Vec<HmdbMetabolite>,
    pub studies: Vec<Study>,
    pub diseases: Vec<Disease>,
    pub cohorts: Vec<StudyCohort>,
    pub findings: Vec<NewFinding>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Default)]
struct FindingTable {
    rows: Vec<Finding>,
    keys: HashSet<NewFinding>,
    next_id: EntityId,
}

/// Banco em memória, seguro para compartilhar entre threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    genes: RwLock<Vec<HgncGene>>,
    metabolites: RwLock<Vec<HmdbMetabolite>>,
    studies: RwLock<Vec<Study>>,
    diseases: RwLock<Vec<Disease>>,
    cohorts: RwLock<Vec<StudyCohort>>,
    findings: RwLock<FindingTable>,
}

fn poisoned(table: &str) -> CoreError {
    CoreError::Storage(format!("{} table lock poisoned", table))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let Snapshot {
            genes,
            metabolites,
            studies,
            diseases,
            cohorts,
            findings,
        } = snapshot;

        info!(
            genes = genes.len(),
            metabolites = metabolites.len(),
            studies = studies.len(),
            cohorts = cohorts.len(),
            "Snapshot carregado"
        );

        let store = Self {
            genes: RwLock::new(genes),
            metabolites: RwLock::new(metabolites),
            studies: RwLock::new(studies),
            diseases: RwLock::new(diseases),
            cohorts: RwLock::new(cohorts),
            findings: RwLock::new(FindingTable::default()),
        };
        store.insert_findings(&findings)?;
        Ok(store)
    }

    pub fn add_gene(&self, gene: HgncGene) -> Result<()> {
        self.genes.write().map_err(|_| poisoned("genes"))?.push(gene);
        Ok(())
    }

    pub fn add_metabolite(&self, metabolite: HmdbMetabolite) -> Result<()> {
        self.metabolites
            .write()
            .map_err(|_| poisoned("metabolites"))?
            .push(metabolite);
        Ok(())
    }
}

/// Varre uma tabela para cada predicado, emitindo um acerto por campo casado.
fn search_table<E: SearchableEntity>(rows: &[E], predicates: &[Predicate<E>]) -> Vec<Vec<E>> {
    predicates
        .par_iter()
        .map(|predicate| {
            rows.iter()
                .flat_map(|row| predicate.matching_fields(row).map(move |_| row.clone()))
                .collect()
        })
        .collect()
}

impl EntityRepository<HgncGene> for MemoryStore {
    fn search(&self, predicates: &[Predicate<HgncGene>]) -> Result<Vec<Vec<HgncGene>>> {
        let rows = self.genes.read().map_err(|_| poisoned("genes"))?;
        Ok(search_table(&rows, predicates))
    }

    fn get(&self, id: EntityId) -> Result<Option<HgncGene>> {
        let rows = self.genes.read().map_err(|_| poisoned("genes"))?;
        Ok(rows.iter().find(|g| g.id == id).cloned())
    }
}

impl EntityRepository<HmdbMetabolite> for MemoryStore {
    fn search(&self, predicates: &[Predicate<HmdbMetabolite>]) -> Result<Vec<Vec<HmdbMetabolite>>> {
        let rows = self.metabolites.read().map_err(|_| poisoned("metabolites"))?;
        Ok(search_table(&rows, predicates))
    }

    fn get(&self, id: EntityId) -> Result<Option<HmdbMetabolite>> {
        let rows = self.metabolites.read().map_err(|_| poisoned("metabolites"))?;
        Ok(rows.iter().find(|m| m.id == id).cloned())
    }
}

impl FindingRepository for MemoryStore {
    fn insert_findings(&self, findings: &[NewFinding]) -> Result<InsertReport> {
        let mut table = self.findings.write().map_err(|_| poisoned("findings"))?;
        let mut report = InsertReport {
            requested: findings.len(),
            ..InsertReport::default()
        };

        for finding in findings {
            // equivalente a INSERT ... ON CONFLICT DO NOTHING
            if !table.keys.insert(*finding) {
                debug!(cohort_id = finding.cohort_id, target = ?finding.target, "Achado já existente ignorado");
                report.already_present += 1;
                continue;
            }
            table.next_id += 1;
            let id = table.next_id;
            table.rows.push(Finding {
                id,
                cohort_id: finding.cohort_id,
                target: finding.target,
            });
            report.inserted += 1;
        }

        Ok(report)
    }

    fn findings_for_cohort(&self, cohort_id: EntityId) -> Result<Vec<Finding>> {
        let table = self.findings.read().map_err(|_| poisoned("findings"))?;
        Ok(table
            .rows
            .iter()
            .filter(|f| f.cohort_id == cohort_id)
            .copied()
            .collect())
    }

    fn cohort(&self, id: EntityId) -> Result<Option<StudyCohort>> {
        let rows = self.cohorts.read().map_err(|_| poisoned("cohorts"))?;
        Ok(rows.iter().find(|c| c.id == id).cloned())
    }

    fn cohorts_for_study(&self, study_id: EntityId) -> Result<Vec<StudyCohort>> {
        let rows = self.cohorts.read().map_err(|_| poisoned("cohorts"))?;
        Ok(rows.iter().filter(|c| c.study_id == study_id).cloned().collect())
    }

    fn study(&self, id: EntityId) -> Result<Option<Study>> {
        let rows = self.studies.read().map_err(|_| poisoned("studies"))?;
        Ok(rows.iter().find(|s| s.id == id).cloned())
    }

    fn studies(&self) -> Result<Vec<Study>> {
        let rows = self.studies.read().map_err(|_| poisoned("studies"))?;
        let mut studies = rows.clone();
        studies.sort_by_key(|s| s.id);
        Ok(studies)
    }

    fn disease(&self, id: EntityId) -> Result<Option<Disease>> {
        let rows = self.diseases.read().map_err(|_| poisoned("diseases"))?;
        Ok(rows.iter().find(|d| d.id == id).cloned())
    }

    fn diseases(&self) -> Result<Vec<Disease>> {
        let rows = self.diseases.read().map_err(|_| poisoned("diseases"))?;
        Ok(rows.clone())
    }

    fn add_study(&self, study: NewStudy) -> Result<Study> {
        let mut rows = self.studies.write().map_err(|_| poisoned("studies"))?;
        if rows.iter().any(|s| s.doi == study.doi) {
            return Err(CoreError::DuplicateDoi(study.doi));
        }
        let id = rows.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let study = study.into_study(id);
        rows.push(study.clone());
        Ok(study)
    }

    fn add_cohort(&self, study_id: EntityId, cohort: NewCohort) -> Result<StudyCohort> {
        let studies = self.studies.read().map_err(|_| poisoned("studies"))?;
        if !studies.iter().any(|s| s.id == study_id) {
            return Err(CoreError::StudyNotFound(study_id));
        }
        let mut rows = self.cohorts.write().map_err(|_| poisoned("cohorts"))?;
        let id = rows.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let cohort = StudyCohort {
            id,
            study_id,
            disease_tags: cohort.disease_tags,
            control_tags: cohort.control_tags,
        };
        rows.push(cohort.clone());
        Ok(cohort)
    }
}
