//! Páginas HTML (askama). Os nomes dos campos vêm do codec do formulário,
//! então o que a página envia é exatamente o que `form::decode` lê.

use askama::Template;
use sickgenes_core::form::{self, field_name, total_forms_key};
use sickgenes_core::{CohortContext, Disease, DisambiguationState, EntityId, EntityKind, NewCohort, NewStudy, Study, WorkflowMode};

pub struct KindLink {
    pub slug: &'static str,
    pub label: &'static str,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub kinds: Vec<KindLink>,
}

impl IndexPage {
    pub fn new() -> Self {
        let kinds = [EntityKind::Gene, EntityKind::Metabolite]
            .into_iter()
            .map(|kind| KindLink {
                slug: kind.slug(),
                label: kind.label(),
            })
            .collect();
        Self { kinds }
    }
}

pub struct NoMatchView {
    pub search_term: String,
    pub term_field: String,
    pub delete_field: String,
}

pub struct OptionView {
    pub id: EntityId,
    pub display: String,
    pub checked: bool,
}

pub struct MultipleMatchView {
    pub search_term: String,
    pub term_field: String,
    pub item_field: String,
    pub delete_field: String,
    pub options: Vec<OptionView>,
}

/// Campo oculto `<prefixo>-TOTAL_FORMS`
pub struct TotalField {
    pub name: String,
    pub count: usize,
}

impl TotalField {
    fn new(prefix: &str, count: usize) -> Self {
        Self {
            name: total_forms_key(prefix),
            count,
        }
    }
}

pub struct ConfirmedView {
    pub search_term: String,
    pub entity_id: EntityId,
    pub display: String,
    pub term_field: String,
    pub item_field: String,
    pub string_field: String,
    pub delete_field: String,
}

/// Tela de uma rodada (identificação ou inserção)
#[derive(Template)]
#[template(path = "match.html")]
pub struct MatchPage {
    pub kind_label: &'static str,
    pub action: String,
    /// Vazio no modo identificação
    pub cohort_label: String,
    /// Vazio quando não se aplica
    pub finding_type: &'static str,
    pub can_insert: bool,
    pub resolved: bool,
    pub search_text: String,
    pub search_field: &'static str,
    pub confirm_field: &'static str,
    pub no_matches_total: TotalField,
    pub multiple_matches_total: TotalField,
    pub confirmed_total: TotalField,
    pub no_matches: Vec<NoMatchView>,
    pub multiple_matches: Vec<MultipleMatchView>,
    pub confirmed: Vec<ConfirmedView>,
}

/// URL para onde o formulário da rodada é enviado
pub fn action_url(kind: EntityKind, mode: WorkflowMode) -> String {
    match mode {
        WorkflowMode::Identify => format!("/search/identify/{}", kind.slug()),
        WorkflowMode::Insert { cohort_id, finding_type } => {
            let base = format!("/manage/{}/{}/insert", cohort_id, kind.slug());
            match finding_type {
                Some(t) => format!("{}?type={}", base, t.code()),
                None => base,
            }
        }
    }
}

impl MatchPage {
    pub fn new(
        kind: EntityKind,
        mode: WorkflowMode,
        state: DisambiguationState,
        resolved: bool,
        cohort: Option<CohortContext>,
    ) -> Self {
        let insert_mode = matches!(mode, WorkflowMode::Insert { .. });
        let finding_type = match (kind, mode) {
            (EntityKind::Gene, WorkflowMode::Insert { finding_type: Some(t), .. }) => t.label(),
            _ => "",
        };

        let no_matches: Vec<NoMatchView> = state
            .no_matches
            .into_iter()
            .enumerate()
            .map(|(i, row)| NoMatchView {
                search_term: row.search_term,
                term_field: field_name(form::NO_MATCHES, i, "search_term"),
                delete_field: field_name(form::NO_MATCHES, i, "delete"),
            })
            .collect();

        let multiple_matches: Vec<MultipleMatchView> = state
            .multiple_matches
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let selected = row.selected;
                MultipleMatchView {
                    search_term: row.search_term,
                    term_field: field_name(form::MULTIPLE_MATCHES, i, "search_term"),
                    item_field: field_name(form::MULTIPLE_MATCHES, i, "item_id"),
                    delete_field: field_name(form::MULTIPLE_MATCHES, i, "delete"),
                    options: row
                        .candidates
                        .into_iter()
                        .map(|c| OptionView {
                            checked: selected == Some(c.id),
                            id: c.id,
                            display: c.display,
                        })
                        .collect(),
                }
            })
            .collect();

        let confirmed: Vec<ConfirmedView> = state
            .confirmed
            .into_iter()
            .enumerate()
            .map(|(i, row)| ConfirmedView {
                search_term: row.search_term,
                entity_id: row.entity_id,
                display: row.display,
                term_field: field_name(form::ONE_MATCH, i, "search_term"),
                item_field: field_name(form::ONE_MATCH, i, "item_id"),
                string_field: field_name(form::ONE_MATCH, i, "item_string"),
                delete_field: field_name(form::ONE_MATCH, i, "delete"),
            })
            .collect();

        Self {
            kind_label: kind.label(),
            action: action_url(kind, mode),
            cohort_label: cohort.map(|c| c.label).unwrap_or_default(),
            finding_type,
            can_insert: insert_mode && resolved,
            resolved,
            search_text: state.search_text,
            search_field: form::SEARCH_TERMS,
            confirm_field: form::CONFIRM_INSERT,
            no_matches_total: TotalField::new(form::NO_MATCHES, no_matches.len()),
            multiple_matches_total: TotalField::new(form::MULTIPLE_MATCHES, multiple_matches.len()),
            confirmed_total: TotalField::new(form::ONE_MATCH, confirmed.len()),
            no_matches,
            multiple_matches,
            confirmed,
        }
    }
}

/// Formulário de estudo novo, reexibido com os valores digitados se falhar.
#[derive(Template)]
#[template(path = "add_study.html")]
pub struct AddStudyPage {
    pub error: String,
    pub title: String,
    pub doi: String,
    pub publisher_url: String,
    pub s4me_url: String,
    pub preprint: bool,
}

impl AddStudyPage {
    pub fn blank() -> Self {
        Self::with_error(NewStudy::default(), String::new())
    }

    pub fn with_error(draft: NewStudy, error: String) -> Self {
        Self {
            error,
            title: draft.title,
            doi: draft.doi,
            publisher_url: draft.publisher_url.unwrap_or_default(),
            s4me_url: draft.s4me_url.unwrap_or_default(),
            preprint: draft.preprint,
        }
    }
}

pub struct TagOption {
    pub id: EntityId,
    pub name: String,
    pub as_disease: bool,
    pub as_control: bool,
}

#[derive(Template)]
#[template(path = "add_study_cohort.html")]
pub struct AddCohortPage {
    pub error: String,
    pub study_id: EntityId,
    pub study_title: String,
    pub disease_field: &'static str,
    pub control_field: &'static str,
    pub options: Vec<TagOption>,
}

impl AddCohortPage {
    pub fn new(study: Study, diseases: Vec<Disease>, draft: &NewCohort, error: String) -> Self {
        let options = diseases
            .into_iter()
            .map(|d| TagOption {
                as_disease: draft.disease_tags.contains(&d.id),
                as_control: draft.control_tags.contains(&d.id),
                id: d.id,
                name: d.name,
            })
            .collect();
        Self {
            error,
            study_id: study.id,
            study_title: study.title,
            disease_field: form::DISEASE_TAGS,
            control_field: form::CONTROL_TAGS,
            options,
        }
    }
}

