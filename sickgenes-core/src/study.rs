//! # Estudos, Coortes e Achados
//!
//! Um estudo tem várias coortes; cada coorte é marcada com doenças (casos) e
//! controles. Um achado (finding) liga uma coorte a uma entidade canônica e só
//! é criado pelo [`insertion`](crate::insertion).
//!
//! Estudos e coortes novos chegam como rascunhos ([`NewStudy`], [`NewCohort`])
//! e são validados pelo [`curation`](crate::curation) antes de gravados.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::entity::{EntityId, EntityKind, GeneFindingType};

/// Tamanho do prefixo do título exibido no rótulo da coorte
const TITLE_PREFIX_GRAPHEMES: usize = 20;

pub const MAX_TITLE_CHARS: usize = 300;
pub const MAX_DOI_CHARS: usize = 100;
pub const MAX_URL_CHARS: usize = 300;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Study {
    pub id: EntityId,
    pub title: String,
    pub doi: String,
    pub publisher_url: Option<String>,
    pub s4me_url: Option<String>,
    pub preprint: bool,
}

/// Estudo ainda sem id. O DOI é único no banco.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudy {
    pub title: String,
    pub doi: String,
    pub publisher_url: Option<String>,
    pub s4me_url: Option<String>,
    pub preprint: bool,
}

impl NewStudy {
    /// Apara os textos; URLs em branco viram `None`.
    pub fn normalized(self) -> Self {
        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            title: self.title.trim().to_string(),
            doi: self.doi.trim().to_string(),
            publisher_url: optional(self.publisher_url),
            s4me_url: optional(self.s4me_url),
            preprint: self.preprint,
        }
    }

    /// Primeiro problema encontrado, na ordem dos campos do formulário.
    pub fn problem(&self) -> Option<String> {
        let too_long = |field: &str, value: &str, max: usize| {
            (value.chars().count() > max).then(|| format!("{} must have at most {} characters", field, max))
        };

        if self.title.is_empty() {
            return Some("title is required".to_string());
        }
        if let Some(problem) = too_long("title", &self.title, MAX_TITLE_CHARS) {
            return Some(problem);
        }
        if self.doi.is_empty() {
            return Some("doi is required".to_string());
        }
        if let Some(problem) = too_long("doi", &self.doi, MAX_DOI_CHARS) {
            return Some(problem);
        }
        [("publisher_url", &self.publisher_url), ("s4me_url", &self.s4me_url)]
            .into_iter()
            .find_map(|(field, value)| too_long(field, value.as_deref()?, MAX_URL_CHARS))
    }

    pub fn into_study(self, id: EntityId) -> Study {
        Study {
            id,
            title: self.title,
            doi: self.doi,
            publisher_url: self.publisher_url,
            s4me_url: self.s4me_url,
            preprint: self.preprint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyCohort {
    pub id: EntityId,
    pub study_id: EntityId,
    pub disease_tags: Vec<EntityId>,
    pub control_tags: Vec<EntityId>,
}

/// Coorte ainda sem id; o estudo vem da URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCohort {
    pub disease_tags: Vec<EntityId>,
    pub control_tags: Vec<EntityId>,
}

/// Rótulo da coorte: `[<título truncado>]... - [<doenças>]/[<controles>]`
pub fn cohort_label(study: &Study, diseases: &[&Disease], controls: &[&Disease]) -> String {
    let title: String = study
        .title
        .graphemes(true)
        .take(TITLE_PREFIX_GRAPHEMES)
        .collect();
    let join = |tags: &[&Disease]| {
        tags.iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("[{}]... - [{}]/[{}]", title, join(diseases), join(controls))
}

/// Lado "entidade" de um achado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingTarget {
    Gene {
        gene_id: EntityId,
        finding_type: Option<GeneFindingType>,
    },
    Metabolite {
        metabolite_id: EntityId,
    },
}

impl FindingTarget {
    pub fn new(kind: EntityKind, entity_id: EntityId, finding_type: Option<GeneFindingType>) -> Self {
        match kind {
            EntityKind::Gene => FindingTarget::Gene {
                gene_id: entity_id,
                finding_type,
            },
            EntityKind::Metabolite => FindingTarget::Metabolite {
                metabolite_id: entity_id,
            },
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            FindingTarget::Gene { .. } => EntityKind::Gene,
            FindingTarget::Metabolite { .. } => EntityKind::Metabolite,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        match self {
            FindingTarget::Gene { gene_id, .. } => *gene_id,
            FindingTarget::Metabolite { metabolite_id } => *metabolite_id,
        }
    }
}

/// Achado ainda não persistido. `(cohort_id, target)` é a chave de unicidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewFinding {
    pub cohort_id: EntityId,
    pub target: FindingTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: EntityId,
    pub cohort_id: EntityId,
    pub target: FindingTarget,
}
