//! # Tipos de Entidade Canônica
//!
//! Uma entidade canônica (gene HGNC, metabólito HMDB) é um registro com
//! identificador estável e vários campos independentes pelos quais pode ser
//! encontrada: símbolo, IDs de referência cruzada, sinônimos, nomes antigos.
//!
//! | Slug         | Entidade          | Achado (join)        |
//! |--------------|-------------------|----------------------|
//! | `gene`       | [`HgncGene`]      | gene finding (V/A)   |
//! | `metabolite` | [`HmdbMetabolite`]| metabolite finding   |
//!
//! [`HgncGene`]: crate::gene::HgncGene
//! [`HmdbMetabolite`]: crate::metabolite::HmdbMetabolite

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Chave primária de qualquer registro do banco.
pub type EntityId = i64;

/// Tipos de entidade que participam da resolução de identificadores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Gene do HGNC (HUGO Gene Nomenclature Committee).
    Gene,
    /// Metabólito do HMDB (Human Metabolome Database).
    Metabolite,
}

impl EntityKind {
    /// Slug usado nas URLs (`/search/identify/gene/`)
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Gene => "gene",
            EntityKind::Metabolite => "metabolite",
        }
    }

    /// Rótulo legível para a UI
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Gene => "HGNC genes",
            EntityKind::Metabolite => "HMDB metabolites",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gene" => Ok(EntityKind::Gene),
            "metabolite" => Ok(EntityKind::Metabolite),
            other => Err(CoreError::UnknownEntityType(other.to_string())),
        }
    }
}

/// Subtipo de um achado de gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneFindingType {
    /// `V` — variação genética
    #[serde(rename = "V")]
    Variation,
    /// `A` — abundância molecular
    #[serde(rename = "A")]
    Abundance,
}

impl GeneFindingType {
    pub fn code(&self) -> &'static str {
        match self {
            GeneFindingType::Variation => "V",
            GeneFindingType::Abundance => "A",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GeneFindingType::Variation => "Genetic variation",
            GeneFindingType::Abundance => "Molecular abundance",
        }
    }

    /// Interpreta o parâmetro `?type=` da URL de inserção.
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        match code {
            "V" => Ok(GeneFindingType::Variation),
            "A" => Ok(GeneFindingType::Abundance),
            other => Err(CoreError::InvalidFindingType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_slug() {
        assert_eq!("gene".parse::<EntityKind>().unwrap(), EntityKind::Gene);
        assert_eq!(
            "metabolite".parse::<EntityKind>().unwrap(),
            EntityKind::Metabolite
        );
        assert!(matches!(
            "protein".parse::<EntityKind>(),
            Err(CoreError::UnknownEntityType(s)) if s == "protein"
        ));
    }

    #[test]
    fn test_finding_type_codes() {
        assert_eq!(GeneFindingType::from_code("V").unwrap(), GeneFindingType::Variation);
        assert_eq!(GeneFindingType::from_code("A").unwrap().code(), "A");
        assert!(GeneFindingType::from_code("X").is_err());
        // códigos são sensíveis a maiúsculas, como a restrição do banco
        assert!(GeneFindingType::from_code("v").is_err());
    }
}
