//! # Metabólitos HMDB
//!
//! Campos textuais (acesso HMDB, nome, CAS, DrugBank, FooDB, KNApSAcK, BioCyc,
//! Wikipedia, nomes IUPAC), campos inteiros (BiGG, PubChem, ChemSpider, ChEBI)
//! e sub-registros de sinônimos e acessos secundários.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityKind};
use crate::search_index::{FieldKind, FieldSource, SearchField, SearchableEntity};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmdbMetabolite {
    pub id: EntityId,
    pub accession: String,
    pub name: String,
    pub cas_registry_number: Option<String>,
    pub drugbank_id: Option<String>,
    pub foodb_id: Option<String>,
    pub knapsack_id: Option<String>,
    pub biocyc_id: Option<String>,
    pub wikipedia_id: Option<String>,
    pub iupac_name: Option<String>,
    pub traditional_iupac: Option<String>,
    pub bigg_id: Option<i64>,
    pub pubchem_compound_id: Option<i64>,
    pub chemspider_id: Option<i64>,
    pub chebi_id: Option<i64>,

    pub synonyms: Vec<String>,
    pub secondary_accessions: Vec<String>,
}

static METABOLITE_FIELDS: &[SearchField<HmdbMetabolite>] = &[
    SearchField { name: "accession", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| Some(m.accession.as_str())) },
    SearchField { name: "name", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| Some(m.name.as_str())) },
    SearchField { name: "cas_registry_number", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.cas_registry_number.as_deref()) },
    SearchField { name: "drugbank_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.drugbank_id.as_deref()) },
    SearchField { name: "foodb_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.foodb_id.as_deref()) },
    SearchField { name: "knapsack_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.knapsack_id.as_deref()) },
    SearchField { name: "biocyc_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.biocyc_id.as_deref()) },
    SearchField { name: "wikipedia_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.wikipedia_id.as_deref()) },
    SearchField { name: "iupac_name", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.iupac_name.as_deref()) },
    SearchField { name: "traditional_iupac", source: FieldSource::Direct, kind: FieldKind::Scalar(|m| m.traditional_iupac.as_deref()) },
    SearchField { name: "bigg_id", source: FieldSource::Direct, kind: FieldKind::Numeric(|m| m.bigg_id.as_slice()) },
    SearchField { name: "pubchem_compound_id", source: FieldSource::Direct, kind: FieldKind::Numeric(|m| m.pubchem_compound_id.as_slice()) },
    SearchField { name: "chemspider_id", source: FieldSource::Direct, kind: FieldKind::Numeric(|m| m.chemspider_id.as_slice()) },
    SearchField { name: "chebi_id", source: FieldSource::Direct, kind: FieldKind::Numeric(|m| m.chebi_id.as_slice()) },
    SearchField { name: "synonyms", source: FieldSource::Associated("metabolite_synonym"), kind: FieldKind::MultiValued(|m| m.synonyms.as_slice()) },
    SearchField { name: "secondary_accessions", source: FieldSource::Associated("secondary_accession"), kind: FieldKind::MultiValued(|m| m.secondary_accessions.as_slice()) },
];

impl SearchableEntity for HmdbMetabolite {
    const KIND: EntityKind = EntityKind::Metabolite;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display(&self) -> String {
        self.name.clone()
    }

    fn search_fields() -> &'static [SearchField<Self>] {
        METABOLITE_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_index::build_predicate;

    fn histidine() -> HmdbMetabolite {
        HmdbMetabolite {
            id: 1,
            accession: "HMDB0000001".to_string(),
            name: "1-Methylhistidine".to_string(),
            cas_registry_number: Some("123-45-6".to_string()),
            bigg_id: Some(1),
            pubchem_compound_id: Some(101),
            chebi_id: Some(50212),
            synonyms: vec!["Pi-methylhistidine".to_string()],
            secondary_accessions: vec!["SECACC001".to_string()],
            ..HmdbMetabolite::default()
        }
    }

    #[test]
    fn test_text_and_numeric_fields() {
        let m = histidine();
        for token in ["hmdb0000001", "1-METHYLHISTIDINE", "123-45-6", "pi-methylhistidine", "secacc001", "1", "101", "50212"] {
            assert!(build_predicate::<HmdbMetabolite>(token).matches(&m), "{token}");
        }
        assert!(!build_predicate::<HmdbMetabolite>("102").matches(&m));
    }

    #[test]
    fn test_cas_number_is_not_numeric() {
        // "123-45-6" não é inteiro: campos numéricos ficam de fora
        let predicate = build_predicate::<HmdbMetabolite>("123-45-6");
        assert!(predicate.fields().all(|f| !f.is_numeric()));
    }
}
