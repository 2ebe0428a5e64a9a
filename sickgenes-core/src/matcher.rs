//! # Casamento de Tokens
//!
//! Dado um conjunto de tokens e um tipo de entidade, classifica cada token em
//! exatamente um de três baldes:
//!
//! | Balde              | Cardinalidade | Conteúdo                      |
//! |--------------------|---------------|-------------------------------|
//! | `no_matches`       | 0             | o token                       |
//! | `one_match`        | 1             | token + entidade              |
//! | `multiple_matches` | 2+            | token + entidades candidatas  |
//!
//! Os baldes particionam o conjunto de tokens: nenhum token some e nenhum
//! aparece em dois baldes. Ausência de resultado é uma classificação, nunca
//! um erro.
//!
//! ## Algoritmo
//!
//! 1. Um predicado por token ([`build_predicate`]).
//! 2. UMA chamada ao repositório com todos os predicados (busca em lote).
//!    Um repositório que devolve um número de listas diferente do número de
//!    predicados é tratado como falha de armazenamento.
//! 3. Deduplicação por identidade: uma entidade que casou por dois campos
//!    conta uma vez.
//! 4. Ordenação estável dos candidatos (string de exibição, depois id).

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::entity::EntityId;
use crate::error::{CoreError, Result};
use crate::search_index::{build_predicate, Predicate, SearchableEntity};
use crate::store::EntityRepository;
use crate::tokens::TokenSet;

/// Token resolvido para uma única entidade
#[derive(Debug, Clone, Serialize)]
pub struct SingleMatch<E> {
    pub token: String,
    pub entity: E,
}

/// Token ambíguo com seus candidatos
#[derive(Debug, Clone, Serialize)]
pub struct MultipleMatch<E> {
    pub token: String,
    pub entities: Vec<E>,
}

/// Resultado de uma passada de casamento.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResults<E> {
    pub no_matches: Vec<String>,
    pub one_match: Vec<SingleMatch<E>>,
    pub multiple_matches: Vec<MultipleMatch<E>>,
}

impl<E> Default for MatchResults<E> {
    fn default() -> Self {
        Self {
            no_matches: Vec::new(),
            one_match: Vec::new(),
            multiple_matches: Vec::new(),
        }
    }
}

impl<E> MatchResults<E> {
    pub fn len(&self) -> usize {
        self.no_matches.len() + self.one_match.len() + self.multiple_matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifica cada token do conjunto contra o repositório de `E`.
pub fn find_matching_items<E, R>(repo: &R, tokens: &TokenSet) -> Result<MatchResults<E>>
where
    E: SearchableEntity,
    R: EntityRepository<E> + ?Sized,
{
    let mut results = MatchResults::default();
    if tokens.is_empty() {
        return Ok(results);
    }

    let predicates: Vec<Predicate<E>> = tokens.iter().map(|t| build_predicate(t)).collect();
    let hits = repo.search(&predicates)?;
    if hits.len() != predicates.len() {
        return Err(CoreError::Storage(format!(
            "search returned {} hit lists for {} predicates",
            hits.len(),
            predicates.len()
        )));
    }

    for (predicate, raw_hits) in predicates.iter().zip(hits) {
        let mut entities = dedup_by_identity(raw_hits);
        let token = predicate.token().to_string();

        match entities.len() {
            0 => results.no_matches.push(token),
            1 => {
                let entity = entities.remove(0);
                results.one_match.push(SingleMatch { token, entity });
            }
            _ => {
                sort_candidates(&mut entities);
                results.multiple_matches.push(MultipleMatch { token, entities });
            }
        }
    }

    debug!(
        kind = %E::KIND,
        tokens = tokens.len(),
        no_matches = results.no_matches.len(),
        one_match = results.one_match.len(),
        multiple_matches = results.multiple_matches.len(),
        "Passada de casamento concluída"
    );

    Ok(results)
}

/// Mantém a primeira ocorrência de cada id
fn dedup_by_identity<E: SearchableEntity>(hits: Vec<E>) -> Vec<E> {
    let mut seen: HashSet<EntityId> = HashSet::with_capacity(hits.len());
    hits.into_iter().filter(|e| seen.insert(e.id())).collect()
}

fn sort_candidates<E: SearchableEntity>(entities: &mut [E]) {
    entities.sort_by_cached_key(|e| (e.display(), e.id()));
}
