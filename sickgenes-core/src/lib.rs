//! # sickgenes-core — Resolução de Identificadores e Desambiguação
//!
//! Este crate resolve listas de identificadores colados por um curador (símbolos
//! de genes, IDs HGNC/Entrez/OMIM, acessos e sinônimos HMDB) para entidades
//! canônicas do banco, e conduz a desambiguação em várias rodadas até que cada
//! token esteja descartado ou ligado a exatamente uma entidade.
//!
//! ## Arquitetura
//!
//! O dado flui assim, uma rodada por requisição:
//!
//! 1.  **Entrada**: texto livre, um identificador por linha.
//! 2.  **Tokenização** ([`tokens`]): linhas aparadas e deduplicadas.
//! 3.  **Índice de Busca** ([`search_index`]): campos pesquisáveis declarados
//!     por tipo de entidade ([`gene`], [`metabolite`]).
//! 4.  **Casamento** ([`matcher`]): uma busca em lote, classificação em
//!     sem resultado / único / vários.
//! 5.  **Desambiguação** ([`disambiguation`]): reconcilia a rodada com o
//!     estado anterior ([`state`]), transportado pelo formulário ([`form`]).
//! 6.  **Inserção** ([`insertion`]): grava os achados na coorte.
//! 7.  **Orquestração** ([`workflow`]): decide entre nova rodada e inserção.
//!
//! Estudos e coortes que recebem os achados são criados pela [`curation`].
//!
//! O armazenamento é um colaborador externo ([`store`]); o crate traz uma
//! implementação em memória carregável de um snapshot JSON.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use sickgenes_core::{demo_snapshot, run_round, DisambiguationState, HgncGene, MemoryStore};
//!
//! let store = MemoryStore::from_snapshot(demo_snapshot()).unwrap();
//!
//! let typed = DisambiguationState {
//!     search_text: "TTN\nNAC1\nNOT-A-GENE".to_string(),
//!     ..DisambiguationState::default()
//! };
//! let state = run_round::<HgncGene, _>(&store, &typed).unwrap();
//!
//! assert_eq!(state.confirmed.len(), 1);        // TTN
//! assert_eq!(state.multiple_matches.len(), 1); // NAC1: SCN1A ou NACC1
//! assert_eq!(state.no_matches.len(), 1);
//! ```

pub mod curation;
pub mod demo;
pub mod disambiguation;
pub mod entity;
pub mod error;
pub mod form;
pub mod gene;
pub mod insertion;
pub mod matcher;
pub mod metabolite;
pub mod search_index;
pub mod state;
pub mod store;
pub mod study;
pub mod study_view;
pub mod tokens;
pub mod workflow;

pub use curation::{create_cohort, create_study};
pub use demo::demo_snapshot;
pub use disambiguation::run_round;
pub use entity::{EntityId, EntityKind, GeneFindingType};
pub use error::{CoreError, Result};
pub use form::{decode, decode_cohort, decode_study, encode, Submission};
pub use gene::HgncGene;
pub use matcher::{find_matching_items, MatchResults};
pub use metabolite::HmdbMetabolite;
pub use search_index::{build_predicate, SearchableEntity};
pub use state::{Candidate, ConfirmedRow, DisambiguationState, MultipleMatchRow, NoMatchRow};
pub use store::{EntityRepository, FindingRepository, InsertReport, MemoryStore, Snapshot};
pub use study::{Disease, NewCohort, NewStudy, Study, StudyCohort};
pub use study_view::{study_view, StudyView};
pub use tokens::{parse_free_text, TokenSet};
pub use workflow::{handle_kind, CohortContext, Outcome, WorkflowMode};
