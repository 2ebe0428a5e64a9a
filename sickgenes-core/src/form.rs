//! # Codec do Formulário de Rodada
//!
//! O estado de desambiguação vai e volta como pares `(chave, valor)` planos,
//! no formato de formsets (prefixo, índice, campo):
//!
//! | Chave                               | Conteúdo                         |
//! |-------------------------------------|----------------------------------|
//! | `search_terms`                      | texto livre novo                 |
//! | `no_matches-<i>-search_term`        | token sem resultado              |
//! | `no_matches-<i>-delete`             | caixa de exclusão                |
//! | `multiple_matches-<i>-search_term`  | token ambíguo                    |
//! | `multiple_matches-<i>-item_id`      | candidato escolhido (opcional)   |
//! | `multiple_matches-<i>-delete`       | caixa de exclusão                |
//! | `one_match-<i>-search_term`         | token confirmado                 |
//! | `one_match-<i>-item_id`             | id da entidade                   |
//! | `one_match-<i>-item_string`         | exibição da entidade             |
//! | `one_match-<i>-delete`              | caixa de exclusão                |
//! | `<prefixo>-TOTAL_FORMS`             | quantidade de linhas (opcional)  |
//! | `confirm_insert`                    | "gravar agora"                   |
//!
//! A decodificação é pura e nunca falha: valores inválidos viram "sem
//! seleção" ou descartam a linha, com um aviso no log.
//!
//! ## Formulários de Curadoria
//!
//! [`decode_study`] lê `title`, `doi`, `publisher_url`, `s4me_url` e a caixa
//! `preprint`. [`decode_cohort`] lê `disease_tags` e `control_tags`, que se
//! repetem uma vez por opção marcada; valores não inteiros são ignorados.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::EntityId;
use crate::state::{ConfirmedRow, DisambiguationState, MultipleMatchRow, NoMatchRow};
use crate::study::{NewCohort, NewStudy};

pub const SEARCH_TERMS: &str = "search_terms";
pub const CONFIRM_INSERT: &str = "confirm_insert";
pub const NO_MATCHES: &str = "no_matches";
pub const MULTIPLE_MATCHES: &str = "multiple_matches";
pub const ONE_MATCH: &str = "one_match";
pub const DISEASE_TAGS: &str = "disease_tags";
pub const CONTROL_TAGS: &str = "control_tags";

/// Tamanho máximo de um campo de texto de linha
pub const MAX_FIELD_CHARS: usize = 300;

/// Limite de linhas por balde aceito em `TOTAL_FORMS`
pub const MAX_ROWS: usize = 1000;

/// Um envio completo: estado reconstruído mais o sinal de inserção.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub state: DisambiguationState,
    pub confirm_insert: bool,
}

/// Nome de um campo de linha (`one_match-3-item_id`)
pub fn field_name(prefix: &str, index: usize, field: &str) -> String {
    format!("{}-{}-{}", prefix, index, field)
}

/// Chave `<prefixo>-TOTAL_FORMS`
pub fn total_forms_key(prefix: &str) -> String {
    format!("{}-TOTAL_FORMS", prefix)
}

/// Visão de consulta sobre os pares do formulário (o último valor vence).
struct FormData<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> FormData<'a> {
    fn new<K, V>(pairs: &'a [(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        Self { values }
    }

    fn raw(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied()
    }

    fn text(&self, key: &str) -> Option<&'a str> {
        self.raw(key).map(str::trim)
    }

    fn checkbox(&self, key: &str) -> bool {
        match self.text(key) {
            None => false,
            Some(v) => !(v.is_empty() || v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("off")),
        }
    }

    fn row_count(&self, prefix: &str) -> usize {
        if let Some(total) = self.text(&total_forms_key(prefix)).and_then(|v| v.parse::<usize>().ok()) {
            if total > MAX_ROWS {
                warn!(prefix, total, "TOTAL_FORMS acima do limite, truncando");
            }
            return total.min(MAX_ROWS);
        }
        (0..MAX_ROWS)
            .take_while(|i| self.raw(&field_name(prefix, *i, "search_term")).is_some())
            .count()
    }

    /// Token da linha; vazio ou longo demais descarta a linha.
    fn search_term(&self, prefix: &str, index: usize) -> Option<String> {
        let term = self.text(&field_name(prefix, index, "search_term"))?;
        if term.is_empty() {
            return None;
        }
        if term.chars().count() > MAX_FIELD_CHARS {
            warn!(prefix, index, "Termo de busca com mais de {} caracteres descartado", MAX_FIELD_CHARS);
            return None;
        }
        Some(term.to_string())
    }

    fn item_id(&self, prefix: &str, index: usize) -> Option<EntityId> {
        self.text(&field_name(prefix, index, "item_id"))
            .and_then(|v| v.parse::<EntityId>().ok())
    }
}

/// Reconstrói o envio a partir dos pares do formulário.
pub fn decode<K, V>(pairs: &[(K, V)]) -> Submission
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let form = FormData::new(pairs);

    let search_text = form.text(SEARCH_TERMS).unwrap_or_default().to_string();

    let no_matches = (0..form.row_count(NO_MATCHES))
        .filter_map(|i| {
            let search_term = form.search_term(NO_MATCHES, i)?;
            Some(NoMatchRow {
                search_term,
                delete: form.checkbox(&field_name(NO_MATCHES, i, "delete")),
            })
        })
        .collect();

    let multiple_matches = (0..form.row_count(MULTIPLE_MATCHES))
        .filter_map(|i| {
            let search_term = form.search_term(MULTIPLE_MATCHES, i)?;
            Some(MultipleMatchRow {
                search_term,
                candidates: Vec::new(),
                selected: form.item_id(MULTIPLE_MATCHES, i),
                delete: form.checkbox(&field_name(MULTIPLE_MATCHES, i, "delete")),
            })
        })
        .collect();

    let confirmed = (0..form.row_count(ONE_MATCH))
        .filter_map(|i| {
            let search_term = form.search_term(ONE_MATCH, i)?;
            let Some(entity_id) = form.item_id(ONE_MATCH, i) else {
                warn!(index = i, search_term = %search_term, "Linha confirmada sem item_id válido descartada");
                return None;
            };
            let display = form
                .text(&field_name(ONE_MATCH, i, "item_string"))
                .unwrap_or_default();
            if display.chars().count() > MAX_FIELD_CHARS {
                warn!(index = i, "item_string com mais de {} caracteres descartado", MAX_FIELD_CHARS);
                return None;
            }
            Some(ConfirmedRow {
                search_term,
                entity_id,
                display: display.to_string(),
                delete: form.checkbox(&field_name(ONE_MATCH, i, "delete")),
            })
        })
        .collect();

    Submission {
        state: DisambiguationState {
            search_text,
            no_matches,
            multiple_matches,
            confirmed,
        },
        confirm_insert: form.checkbox(CONFIRM_INSERT),
    }
}

/// Serializa o estado nos pares que [`decode`] entende.
///
/// Os candidatos das linhas ambíguas não são serializados: são recalculados
/// na próxima rodada.
pub fn encode(state: &DisambiguationState) -> Vec<(String, String)> {
    let mut pairs = vec![(SEARCH_TERMS.to_string(), state.search_text.clone())];
    let checkbox = |pairs: &mut Vec<(String, String)>, key: String, on: bool| {
        if on {
            pairs.push((key, "on".to_string()));
        }
    };

    pairs.push((total_forms_key(NO_MATCHES), state.no_matches.len().to_string()));
    for (i, row) in state.no_matches.iter().enumerate() {
        pairs.push((field_name(NO_MATCHES, i, "search_term"), row.search_term.clone()));
        checkbox(&mut pairs, field_name(NO_MATCHES, i, "delete"), row.delete);
    }

    pairs.push((total_forms_key(MULTIPLE_MATCHES), state.multiple_matches.len().to_string()));
    for (i, row) in state.multiple_matches.iter().enumerate() {
        pairs.push((field_name(MULTIPLE_MATCHES, i, "search_term"), row.search_term.clone()));
        if let Some(id) = row.selected {
            pairs.push((field_name(MULTIPLE_MATCHES, i, "item_id"), id.to_string()));
        }
        checkbox(&mut pairs, field_name(MULTIPLE_MATCHES, i, "delete"), row.delete);
    }

    pairs.push((total_forms_key(ONE_MATCH), state.confirmed.len().to_string()));
    for (i, row) in state.confirmed.iter().enumerate() {
        pairs.push((field_name(ONE_MATCH, i, "search_term"), row.search_term.clone()));
        pairs.push((field_name(ONE_MATCH, i, "item_id"), row.entity_id.to_string()));
        pairs.push((field_name(ONE_MATCH, i, "item_string"), row.display.clone()));
        checkbox(&mut pairs, field_name(ONE_MATCH, i, "delete"), row.delete);
    }

    pairs
}

/// Rascunho de estudo a partir do formulário (sem validação).
pub fn decode_study<K, V>(pairs: &[(K, V)]) -> NewStudy
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let form = FormData::new(pairs);
    let text = |key: &str| form.text(key).unwrap_or_default().to_string();
    NewStudy {
        title: text("title"),
        doi: text("doi"),
        publisher_url: form.text("publisher_url").map(str::to_string),
        s4me_url: form.text("s4me_url").map(str::to_string),
        preprint: form.checkbox("preprint"),
    }
}

/// Rascunho de coorte; cada opção marcada chega como um par próprio.
pub fn decode_cohort<K, V>(pairs: &[(K, V)]) -> NewCohort
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let ids = |field: &str| -> Vec<EntityId> {
        pairs
            .iter()
            .filter(|(k, _)| k.as_ref() == field)
            .filter_map(|(_, v)| match v.as_ref().trim().parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(field, value = v.as_ref(), "Id de doença inválido ignorado");
                    None
                }
            })
            .collect()
    };
    NewCohort {
        disease_tags: ids(DISEASE_TAGS),
        control_tags: ids(CONTROL_TAGS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Candidate;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_form_is_empty_state() {
        let submission = decode::<String, String>(&[]);
        assert!(submission.state.is_empty());
        assert!(!submission.confirm_insert);
    }

    #[test]
    fn test_decode_all_buckets() {
        let form = pairs(&[
            ("search_terms", "  TTN\nBRCA1  "),
            ("no_matches-TOTAL_FORMS", "1"),
            ("no_matches-0-search_term", " NOTHING "),
            ("no_matches-0-delete", "on"),
            ("multiple_matches-TOTAL_FORMS", "2"),
            ("multiple_matches-0-search_term", "123"),
            ("multiple_matches-0-item_id", "10"),
            ("multiple_matches-1-search_term", "G1A1"),
            ("multiple_matches-1-item_id", ""),
            ("one_match-TOTAL_FORMS", "1"),
            ("one_match-0-search_term", "G1"),
            ("one_match-0-item_id", "1"),
            ("one_match-0-item_string", "G1"),
            ("confirm_insert", "true"),
        ]);
        let Submission { state, confirm_insert } = decode(&form);

        assert!(confirm_insert);
        assert_eq!(state.search_text, "TTN\nBRCA1");
        assert_eq!(state.no_matches, vec![NoMatchRow { search_term: "NOTHING".to_string(), delete: true }]);
        assert_eq!(state.multiple_matches[0].selected, Some(10));
        assert_eq!(state.multiple_matches[1].selected, None);
        assert_eq!(state.confirmed, vec![ConfirmedRow::new("G1", 1, "G1")]);
    }

    #[test]
    fn test_checkbox_values() {
        for (value, expected) in [("on", true), ("1", true), ("true", true), ("", false), ("false", false), ("off", false)] {
            let form = pairs(&[("no_matches-0-search_term", "X"), ("no_matches-0-delete", value)]);
            assert_eq!(decode(&form).state.no_matches[0].delete, expected, "{value:?}");
        }
    }

    #[test]
    fn test_non_integer_selection_is_no_selection() {
        let form = pairs(&[("multiple_matches-0-search_term", "G1A1"), ("multiple_matches-0-item_id", "abc")]);
        let state = decode(&form).state;
        assert_eq!(state.multiple_matches.len(), 1);
        assert_eq!(state.multiple_matches[0].selected, None);
    }

    #[test]
    fn test_confirmed_row_without_id_is_dropped() {
        let form = pairs(&[
            ("one_match-0-search_term", "G1"),
            ("one_match-0-item_id", "x1"),
            ("one_match-1-search_term", "G2"),
            ("one_match-1-item_id", "2"),
            ("one_match-1-item_string", "G2"),
        ]);
        let state = decode(&form).state;
        assert_eq!(state.confirmed, vec![ConfirmedRow::new("G2", 2, "G2")]);
    }

    #[test]
    fn test_long_rows_are_dropped() {
        let long = "A".repeat(MAX_FIELD_CHARS + 1);
        let form = pairs(&[("no_matches-0-search_term", long.as_str()), ("no_matches-1-search_term", "SHORT")]);
        let state = decode(&form).state;
        assert_eq!(state.no_matches.len(), 1);
        assert_eq!(state.no_matches[0].search_term, "SHORT");
    }

    #[test]
    fn test_rows_read_until_first_gap_without_total() {
        let form = pairs(&[
            ("no_matches-0-search_term", "A"),
            ("no_matches-1-search_term", "B"),
            ("no_matches-3-search_term", "D"),
        ]);
        let terms: Vec<String> = decode(&form).state.no_matches.into_iter().map(|r| r.search_term).collect();
        assert_eq!(terms, vec!["A", "B"]);
    }

    #[test]
    fn test_total_forms_is_honoured_and_capped() {
        let form = pairs(&[
            ("no_matches-TOTAL_FORMS", "4"),
            ("no_matches-0-search_term", "A"),
            ("no_matches-3-search_term", "D"),
        ]);
        let terms: Vec<String> = decode(&form).state.no_matches.into_iter().map(|r| r.search_term).collect();
        assert_eq!(terms, vec!["A", "D"]);

        let huge = pairs(&[("no_matches-TOTAL_FORMS", "99999999"), ("no_matches-0-search_term", "A")]);
        assert_eq!(decode(&huge).state.no_matches.len(), 1);
    }

    #[test]
    fn test_encode_is_understood_by_decode() {
        let state = DisambiguationState {
            search_text: "NEW".to_string(),
            no_matches: vec![NoMatchRow { search_term: "item, comma".to_string(), delete: true }],
            multiple_matches: vec![
                MultipleMatchRow {
                    search_term: "123".to_string(),
                    candidates: vec![Candidate { id: 10, display: "GX".to_string() }],
                    selected: Some(10),
                    delete: false,
                },
                MultipleMatchRow {
                    search_term: "G1A1".to_string(),
                    ..MultipleMatchRow::default()
                },
            ],
            confirmed: vec![ConfirmedRow::new("HGNC:1", 1, "G1")],
        };

        let decoded = decode(&encode(&state)).state;
        assert_eq!(decoded.search_text, state.search_text);
        assert_eq!(decoded.no_matches, state.no_matches);
        assert_eq!(decoded.confirmed, state.confirmed);
        // candidatos não viajam no formulário
        assert!(decoded.multiple_matches.iter().all(|row| row.candidates.is_empty()));
        assert_eq!(decoded.multiple_matches[0].selected, Some(10));
        assert_eq!(decoded.multiple_matches[1].search_term, "G1A1");
        assert_eq!(decoded.multiple_matches[1].selected, None);
    }

    #[test]
    fn test_decode_study_fields() {
        let draft = decode_study(&pairs(&[
            ("title", " Gut microbiome "),
            ("doi", "10.1/gut"),
            ("publisher_url", ""),
            ("preprint", "on"),
        ]));
        assert_eq!(draft.title, "Gut microbiome");
        assert_eq!(draft.doi, "10.1/gut");
        assert_eq!(draft.publisher_url.as_deref(), Some(""));
        assert_eq!(draft.s4me_url, None);
        assert!(draft.preprint);
        assert!(!decode_study(&pairs(&[("preprint", "off")])).preprint);
    }

    #[test]
    fn test_decode_cohort_collects_repeated_keys() {
        let draft = decode_cohort(&pairs(&[
            ("disease_tags", "1"),
            ("control_tags", "2"),
            ("disease_tags", "3"),
            ("disease_tags", "abc"),
        ]));
        assert_eq!(draft.disease_tags, vec![1, 3]);
        assert_eq!(draft.control_tags, vec![2]);
    }
}
