//! # Genes HGNC
//!
//! Um gene é encontrado pelo ID HGNC, símbolo, nome, IDs de outros bancos
//! (Entrez, Ensembl, VEGA, UCSC, CCDS) e pelos sub-registros associados:
//! acessos ENA, UniProt, OMIM, símbolos/nomes alternativos e anteriores.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityKind};
use crate::search_index::{FieldKind, FieldSource, SearchField, SearchableEntity};

/// Registro de gene HGNC com seus sub-registros associados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HgncGene {
    pub id: EntityId,
    pub hgnc_id: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub entrez_id: Option<String>,
    pub ensembl_gene_id: Option<String>,
    pub vega_id: Option<String>,
    pub ucsc_id: Option<String>,
    /// IDs CCDS (lista multivalorada na própria linha do gene)
    pub ccds_ids: Vec<String>,

    pub ena: Vec<String>,
    pub uniprot_ids: Vec<String>,
    pub omim_ids: Vec<i64>,
    pub alias_symbols: Vec<String>,
    pub alias_names: Vec<String>,
    pub prev_symbols: Vec<String>,
    pub prev_names: Vec<String>,
}

static GENE_FIELDS: &[SearchField<HgncGene>] = &[
    SearchField { name: "hgnc_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|g| g.hgnc_id.as_deref()) },
    SearchField { name: "symbol", source: FieldSource::Direct, kind: FieldKind::Scalar(|g| g.symbol.as_deref()) },
    SearchField { name: "name", source: FieldSource::Direct, kind: FieldKind::Scalar(|g| g.name.as_deref()) },
    SearchField { name: "entrez_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|g| g.entrez_id.as_deref()) },
    SearchField { name: "ensembl_gene_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|g| g.ensembl_gene_id.as_deref()) },
    SearchField { name: "vega_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|g| g.vega_id.as_deref()) },
    SearchField { name: "ucsc_id", source: FieldSource::Direct, kind: FieldKind::Scalar(|g| g.ucsc_id.as_deref()) },
    SearchField { name: "ccds_ids", source: FieldSource::Direct, kind: FieldKind::MultiValued(|g| g.ccds_ids.as_slice()) },
    SearchField { name: "ena", source: FieldSource::Associated("ena"), kind: FieldKind::MultiValued(|g| g.ena.as_slice()) },
    SearchField { name: "uniprot_ids", source: FieldSource::Associated("uniprot_id"), kind: FieldKind::MultiValued(|g| g.uniprot_ids.as_slice()) },
    SearchField { name: "alias_symbols", source: FieldSource::Associated("alias_symbol"), kind: FieldKind::MultiValued(|g| g.alias_symbols.as_slice()) },
    SearchField { name: "alias_names", source: FieldSource::Associated("alias_name"), kind: FieldKind::MultiValued(|g| g.alias_names.as_slice()) },
    SearchField { name: "prev_symbols", source: FieldSource::Associated("prev_symbol"), kind: FieldKind::MultiValued(|g| g.prev_symbols.as_slice()) },
    SearchField { name: "prev_names", source: FieldSource::Associated("prev_name"), kind: FieldKind::MultiValued(|g| g.prev_names.as_slice()) },
    SearchField { name: "omim_ids", source: FieldSource::Associated("omim_id"), kind: FieldKind::Numeric(|g| g.omim_ids.as_slice()) },
];

impl SearchableEntity for HgncGene {
    const KIND: EntityKind = EntityKind::Gene;

    fn id(&self) -> EntityId {
        self.id
    }

    /// Símbolo; na falta dele, o ID HGNC
    fn display(&self) -> String {
        self.symbol
            .as_deref()
            .or(self.hgnc_id.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.id))
    }

    fn search_fields() -> &'static [SearchField<Self>] {
        GENE_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_index::build_predicate;

    #[test]
    fn test_display_fallbacks() {
        let mut gene = HgncGene {
            id: 9,
            hgnc_id: Some("HGNC:9".to_string()),
            symbol: Some("TTN".to_string()),
            ..HgncGene::default()
        };
        assert_eq!(gene.display(), "TTN");
        gene.symbol = None;
        assert_eq!(gene.display(), "HGNC:9");
        gene.hgnc_id = None;
        assert_eq!(gene.display(), "#9");
    }

    #[test]
    fn test_every_declared_field_is_reachable() {
        let gene = HgncGene {
            id: 1,
            hgnc_id: Some("a".into()),
            symbol: Some("b".into()),
            name: Some("c".into()),
            entrez_id: Some("d".into()),
            ensembl_gene_id: Some("e".into()),
            vega_id: Some("f".into()),
            ucsc_id: Some("g".into()),
            ccds_ids: vec!["h".into()],
            ena: vec!["i".into()],
            uniprot_ids: vec!["j".into()],
            omim_ids: vec![11],
            alias_symbols: vec!["k".into()],
            alias_names: vec!["l".into()],
            prev_symbols: vec!["m".into()],
            prev_names: vec!["n".into()],
        };
        for token in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "11", "k", "l", "m", "n"] {
            let predicate = build_predicate::<HgncGene>(token);
            assert_eq!(
                predicate.matching_fields(&gene).count(),
                1,
                "token {token} deveria casar exatamente um campo"
            );
        }
    }
}
