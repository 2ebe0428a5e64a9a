//! # Máquina de Desambiguação
//!
//! Uma rodada transforma o estado anterior (mais o texto novo) em um novo
//! estado. Cada token digitado termina a rodada em exatamente um lugar:
//! excluído, sem resultado, ambíguo pendente ou confirmado.
//!
//! ## Passos de uma Rodada
//!
//! ```text
//!  texto novo ─┐
//!  no_matches ─┼─► entrada ──┐
//!  (não excl.) │             │
//!  multiple ───┴─ sem escolha┤
//!          └──── com escolha ┼─► casamento (1 busca em lote) ─► validação das escolhas
//!                            │
//!  confirmados anteriores ───┴─► mescla por id: anteriores < únicos < escolhas
//! ```
//!
//! 1. Entrada = tokens do texto novo ∪ linhas sem resultado não excluídas.
//! 2. Linhas ambíguas não excluídas: sem escolha voltam para a entrada; com
//!    escolha viram candidatas a confirmação.
//! 3. Casamento sobre a entrada. Os tokens escolhidos entram na mesma busca
//!    para que a escolha seja validada contra os candidatos atuais: se o id
//!    escolhido sumiu, a escolha se perde e o token segue o fluxo normal.
//! 4. Confirmados, por precedência (o posterior sobrescreve no mesmo id):
//!    anteriores não excluídos, casamentos únicos desta rodada, escolhas.
//! 5. Linhas ambíguas recebem candidatos novos; um candidato cuja exibição
//!    é igual ao token (sem diferenciar maiúsculas) vem pré-selecionado.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::entity::EntityId;
use crate::error::Result;
use crate::matcher::{find_matching_items, MatchResults};
use crate::search_index::SearchableEntity;
use crate::state::{Candidate, ConfirmedRow, DisambiguationState, MultipleMatchRow, NoMatchRow};
use crate::store::EntityRepository;
use crate::tokens::{parse_free_text, TokenSet};

/// Balde de confirmados indexado pela identidade da entidade.
///
/// Preserva a ordem de chegada; uma linha posterior com o mesmo id substitui
/// a anterior na mesma posição.
#[derive(Debug, Default)]
struct ConfirmedBucket {
    rows: Vec<ConfirmedRow>,
    by_entity: HashMap<EntityId, usize>,
}

impl ConfirmedBucket {
    fn put(&mut self, row: ConfirmedRow) {
        match self.by_entity.get(&row.entity_id) {
            Some(&idx) => self.rows[idx] = row,
            None => {
                self.by_entity.insert(row.entity_id, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    fn into_rows(self) -> Vec<ConfirmedRow> {
        self.rows
    }
}

/// Executa uma rodada de desambiguação para o tipo de entidade `E`.
pub fn run_round<E, R>(repo: &R, previous: &DisambiguationState) -> Result<DisambiguationState>
where
    E: SearchableEntity,
    R: EntityRepository<E> + ?Sized,
{
    // 1. texto novo + sem resultado sobreviventes
    let mut input: TokenSet = parse_free_text(&previous.search_text);
    input.extend(
        previous
            .no_matches
            .iter()
            .filter(|row| !row.delete)
            .filter_map(|row| non_empty(&row.search_term)),
    );

    // 2. ambíguos sobreviventes
    let mut selections: BTreeMap<String, EntityId> = BTreeMap::new();
    for row in previous.multiple_matches.iter().filter(|row| !row.delete) {
        let Some(token) = non_empty(&row.search_term) else {
            continue;
        };
        match row.selected {
            Some(id) => {
                selections.insert(token, id);
            }
            None => {
                input.insert(token);
            }
        }
    }

    // 3. uma única busca para a entrada e para as escolhas
    let mut query = input;
    query.extend(selections.keys().cloned());
    let results = find_matching_items::<E, R>(repo, &query)?;

    let mut chosen = Vec::with_capacity(selections.len());
    let mut settled: HashSet<String> = HashSet::with_capacity(selections.len());
    for (token, id) in selections {
        match find_candidate(&results, &token, id) {
            Some(entity) => {
                chosen.push(ConfirmedRow::new(token.clone(), id, entity.display()));
                settled.insert(token);
            }
            None => {
                warn!(token = %token, selected = id, "Seleção perdida: candidato não está mais entre os resultados");
            }
        }
    }

    // 4. mescla dos confirmados
    let mut confirmed = ConfirmedBucket::default();
    for row in previous.confirmed.iter().filter(|row| !row.delete) {
        confirmed.put(ConfirmedRow {
            delete: false,
            ..row.clone()
        });
    }
    for single in results.one_match.iter().filter(|m| !settled.contains(&m.token)) {
        confirmed.put(ConfirmedRow::new(
            single.token.clone(),
            single.entity.id(),
            single.entity.display(),
        ));
    }
    for row in chosen {
        confirmed.put(row);
    }

    // 5. novo estado
    let no_matches: Vec<NoMatchRow> = results
        .no_matches
        .into_iter()
        .map(|search_term| NoMatchRow {
            search_term,
            delete: false,
        })
        .collect();

    let multiple_matches: Vec<MultipleMatchRow> = results
        .multiple_matches
        .into_iter()
        .filter(|m| !settled.contains(&m.token))
        .map(|m| {
            let candidates: Vec<Candidate> = m.entities.iter().map(Candidate::of).collect();
            let selected = preselect(&m.token, &candidates);
            MultipleMatchRow {
                search_term: m.token,
                candidates,
                selected,
                delete: false,
            }
        })
        .collect();

    let state = DisambiguationState {
        search_text: String::new(),
        no_matches,
        multiple_matches,
        confirmed: confirmed.into_rows(),
    };

    debug!(
        kind = %E::KIND,
        no_matches = state.no_matches.len(),
        multiple_matches = state.multiple_matches.len(),
        confirmed = state.confirmed.len(),
        resolved = state.is_fully_resolved(),
        "Rodada de desambiguação concluída"
    );

    Ok(state)
}

fn non_empty(term: &str) -> Option<String> {
    let term = term.trim();
    (!term.is_empty()).then(|| term.to_string())
}

/// Procura a entidade escolhida entre os resultados atuais do token.
fn find_candidate<'a, E: SearchableEntity>(results: &'a MatchResults<E>, token: &str, id: EntityId) -> Option<&'a E> {
    let single = results
        .one_match
        .iter()
        .filter(|m| m.token == token)
        .map(|m| &m.entity);
    let multiple = results
        .multiple_matches
        .iter()
        .filter(|m| m.token == token)
        .flat_map(|m| m.entities.iter());

    single.chain(multiple).find(|entity| entity.id() == id)
}

/// Primeiro candidato cuja exibição é igual ao token, sem diferenciar maiúsculas.
///
/// Com mais de um candidato igual vale o primeiro na ordem de exibição.
fn preselect(token: &str, candidates: &[Candidate]) -> Option<EntityId> {
    candidates
        .iter()
        .find(|c| same_text(&c.display, token))
        .map(|c| c.id)
}

fn same_text(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
