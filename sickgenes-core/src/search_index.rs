//! # Índice de Busca por Entidade
//!
//! Cada tipo de entidade declara, de forma declarativa, quais campos participam
//! da busca de um token. Não há montagem de consultas por interpolação de
//! strings: cada campo é um [`SearchField`] com um acessor tipado.
//!
//! ## Classes de Campo
//!
//! | Tipo          | Comparação                                      | Exemplo                 |
//! |---------------|-------------------------------------------------|-------------------------|
//! | `Scalar`      | igualdade exata, sem diferenciar maiúsculas     | `symbol`, `hgnc_id`     |
//! | `MultiValued` | pertinência exata, sem diferenciar maiúsculas   | `alias_symbols`, `ccds` |
//! | `Numeric`     | igualdade inteira, só se o token for um inteiro | `omim_ids`, `chebi_id`  |
//!
//! A origem do campo ([`FieldSource`]) diz se o valor mora na própria entidade
//! ou em sub-registros associados (tabelas de apelidos, sinônimos...). Para a
//! comparação isso é indiferente; para o armazenamento indica um join.
//!
//! ## Contrato
//!
//! [`build_predicate`] é pura e total: um token malformado (ex: texto contra um
//! campo numérico) nunca gera erro, apenas produz um predicado com menos campos.

use crate::entity::{EntityId, EntityKind};

/// De onde vem o valor de um campo pesquisável
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Atributo da própria entidade
    Direct,
    /// Sub-registro um-para-muitos (nome da tabela associada)
    Associated(&'static str),
}

/// Tipo de comparação de um campo, com o acessor correspondente.
pub enum FieldKind<E: 'static> {
    Scalar(fn(&E) -> Option<&str>),
    MultiValued(fn(&E) -> &[String]),
    Numeric(fn(&E) -> &[i64]),
}

/// Descritor de um campo pesquisável
pub struct SearchField<E: 'static> {
    pub name: &'static str,
    pub source: FieldSource,
    pub kind: FieldKind<E>,
}

impl<E: 'static> SearchField<E> {
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FieldKind::Numeric(_))
    }
}

/// Uma entidade canônica que pode ser encontrada por tokens.
pub trait SearchableEntity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    /// String de exibição (usada nas listas de candidatos e na pré-seleção)
    fn display(&self) -> String;

    fn search_fields() -> &'static [SearchField<Self>];
}

/// Predicado de busca para um único token.
pub struct Predicate<E: 'static> {
    token: String,
    needle: String,
    number: Option<i64>,
    fields: Vec<&'static SearchField<E>>,
}

/// Constrói o predicado de um token para o tipo de entidade `E`.
///
/// Campos numéricos só entram quando o token é um inteiro válido. Um token
/// vazio não mantém campo nenhum (valores vazios no banco nunca casam).
pub fn build_predicate<E: SearchableEntity>(token: &str) -> Predicate<E> {
    let number = token.parse::<i64>().ok();
    let fields = if token.is_empty() {
        Vec::new()
    } else {
        E::search_fields()
            .iter()
            .filter(|field| number.is_some() || !field.is_numeric())
            .collect()
    };

    Predicate {
        token: token.to_string(),
        needle: token.chars().flat_map(char::to_lowercase).collect(),
        number,
        fields,
    }
}

impl<E: SearchableEntity> Predicate<E> {
    /// Token original, exatamente como o usuário digitou (após o trim)
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Campos que participam deste predicado
    pub fn fields(&self) -> impl Iterator<Item = &'static SearchField<E>> + '_ {
        self.fields.iter().copied()
    }

    /// Verifica um único campo contra a entidade
    pub fn field_matches(&self, field: &SearchField<E>, entity: &E) -> bool {
        match &field.kind {
            FieldKind::Scalar(get) => get(entity).is_some_and(|value| self.text_eq(value)),
            FieldKind::MultiValued(get) => get(entity).iter().any(|value| self.text_eq(value)),
            FieldKind::Numeric(get) => match self.number {
                Some(n) => get(entity).contains(&n),
                None => false,
            },
        }
    }

    /// Nomes dos campos que casaram com a entidade (um acerto por campo)
    pub fn matching_fields<'a>(&'a self, entity: &'a E) -> impl Iterator<Item = &'static str> + 'a {
        self.fields
            .iter()
            .filter(move |field| self.field_matches(field, entity))
            .map(|field| field.name)
    }

    pub fn matches(&self, entity: &E) -> bool {
        self.fields.iter().any(|field| self.field_matches(field, entity))
    }

    fn text_eq(&self, value: &str) -> bool {
        value.chars().flat_map(char::to_lowercase).eq(self.needle.chars())
    }
}
