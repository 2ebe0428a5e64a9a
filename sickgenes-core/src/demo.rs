//! # Dados de Demonstração
//!
//! Snapshot embutido usado quando nenhum arquivo é configurado e como base
//! dos testes. Inclui ambiguidades reais de nomenclatura:
//!
//! - `NAC1` é apelido de SCN1A e de NACC1;
//! - `Methylhistidine` é sinônimo de 1- e 3-metil-histidina.
//!
//! ## Conteúdo
//! - Genes HGNC com IDs Entrez/Ensembl/OMIM/UniProt
//! - Metabólitos HMDB com IDs CAS/ChEBI/PubChem
//! - Um estudo ME/CFS com duas coortes e um preprint com uma coorte

use crate::gene::HgncGene;
use crate::metabolite::HmdbMetabolite;
use crate::store::Snapshot;
use crate::study::{Disease, Study, StudyCohort};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn genes() -> Vec<HgncGene> {
    vec![
        HgncGene {
            id: 1,
            hgnc_id: Some("HGNC:12403".to_string()),
            symbol: Some("TTN".to_string()),
            name: Some("titin".to_string()),
            entrez_id: Some("7273".to_string()),
            ensembl_gene_id: Some("ENSG00000155657".to_string()),
            ucsc_id: Some("uc031rqc.3".to_string()),
            ccds_ids: strings(&["CCDS33337", "CCDS54423"]),
            uniprot_ids: strings(&["Q8WZ42"]),
            omim_ids: vec![188840],
            alias_symbols: strings(&["CMD1G", "TMD", "CMH9", "LGMD2J", "MYLK5"]),
            alias_names: strings(&["connectin"]),
            ..HgncGene::default()
        },
        HgncGene {
            id: 2,
            hgnc_id: Some("HGNC:1100".to_string()),
            symbol: Some("BRCA1".to_string()),
            name: Some("BRCA1 DNA repair associated".to_string()),
            entrez_id: Some("672".to_string()),
            ensembl_gene_id: Some("ENSG00000012048".to_string()),
            vega_id: Some("OTTHUMG00000180435".to_string()),
            uniprot_ids: strings(&["P38398"]),
            omim_ids: vec![113705],
            alias_symbols: strings(&["RNF53", "BRCC1", "PPP1R53", "FANCS"]),
            prev_names: strings(&["breast cancer 1", "breast cancer 1, early onset"]),
            ..HgncGene::default()
        },
        HgncGene {
            id: 3,
            hgnc_id: Some("HGNC:10585".to_string()),
            symbol: Some("SCN1A".to_string()),
            name: Some("sodium voltage-gated channel alpha subunit 1".to_string()),
            entrez_id: Some("6323".to_string()),
            ensembl_gene_id: Some("ENSG00000144285".to_string()),
            uniprot_ids: strings(&["P35498"]),
            omim_ids: vec![182389],
            alias_symbols: strings(&["NAC1", "Nav1.1", "FEB3", "GEFSP2"]),
            prev_names: strings(&["sodium channel, voltage-gated, type I, alpha subunit"]),
            ..HgncGene::default()
        },
        HgncGene {
            id: 4,
            hgnc_id: Some("HGNC:20967".to_string()),
            symbol: Some("NACC1".to_string()),
            name: Some("nucleus accumbens associated 1".to_string()),
            entrez_id: Some("112939".to_string()),
            ensembl_gene_id: Some("ENSG00000160877".to_string()),
            uniprot_ids: strings(&["Q96RE7"]),
            omim_ids: vec![610672],
            alias_symbols: strings(&["NAC1", "BEND8"]),
            prev_symbols: strings(&["BTBD14B"]),
            ..HgncGene::default()
        },
        HgncGene {
            id: 5,
            hgnc_id: Some("HGNC:2229".to_string()),
            symbol: Some("COQ2".to_string()),
            name: Some("coenzyme Q2, polyprenyltransferase".to_string()),
            entrez_id: Some("27235".to_string()),
            ensembl_gene_id: Some("ENSG00000173085".to_string()),
            ena: strings(&["AF091086"]),
            uniprot_ids: strings(&["Q96H96"]),
            omim_ids: vec![609825],
            alias_symbols: strings(&["CL640", "FLJ13490"]),
            ..HgncGene::default()
        },
    ]
}

fn metabolites() -> Vec<HmdbMetabolite> {
    vec![
        HmdbMetabolite {
            id: 1,
            accession: "HMDB0000001".to_string(),
            name: "1-Methylhistidine".to_string(),
            cas_registry_number: Some("332-80-9".to_string()),
            iupac_name: Some("(2S)-2-amino-3-(1-methyl-1H-imidazol-4-yl)propanoic acid".to_string()),
            pubchem_compound_id: Some(92105),
            chemspider_id: Some(83153),
            chebi_id: Some(50599),
            synonyms: strings(&["1-MHis", "Pi-methylhistidine", "Methylhistidine"]),
            secondary_accessions: strings(&["HMDB00001"]),
            ..HmdbMetabolite::default()
        },
        HmdbMetabolite {
            id: 2,
            accession: "HMDB0000479".to_string(),
            name: "3-Methylhistidine".to_string(),
            cas_registry_number: Some("368-16-1".to_string()),
            pubchem_compound_id: Some(64969),
            chebi_id: Some(27596),
            synonyms: strings(&["3-MHis", "Tele-methylhistidine", "Methylhistidine"]),
            secondary_accessions: strings(&["HMDB00479"]),
            ..HmdbMetabolite::default()
        },
        HmdbMetabolite {
            id: 3,
            accession: "HMDB0000062".to_string(),
            name: "L-Carnitine".to_string(),
            cas_registry_number: Some("541-15-1".to_string()),
            drugbank_id: Some("DB00583".to_string()),
            pubchem_compound_id: Some(10917),
            chebi_id: Some(16347),
            synonyms: strings(&["Levocarnitine", "Vitamin BT"]),
            ..HmdbMetabolite::default()
        },
        HmdbMetabolite {
            id: 4,
            accession: "HMDB0000243".to_string(),
            name: "Pyruvic acid".to_string(),
            cas_registry_number: Some("127-17-3".to_string()),
            pubchem_compound_id: Some(1060),
            chebi_id: Some(32816),
            synonyms: strings(&["Pyruvate", "2-Oxopropanoic acid"]),
            ..HmdbMetabolite::default()
        },
    ]
}

/// Snapshot completo de demonstração
pub fn demo_snapshot() -> Snapshot {
    Snapshot {
        genes: genes(),
        metabolites: metabolites(),
        studies: vec![
            Study {
                id: 1,
                title: "Metabolic features of chronic fatigue syndrome".to_string(),
                doi: "10.1073/pnas.1607571113".to_string(),
                publisher_url: Some("https://www.pnas.org/doi/10.1073/pnas.1607571113".to_string()),
                ..Study::default()
            },
            Study {
                id: 2,
                title: "Exome sequencing in familial ME/CFS".to_string(),
                doi: "10.1101/2024.01.01.000001".to_string(),
                preprint: true,
                ..Study::default()
            },
        ],
        diseases: vec![
            Disease { id: 1, name: "ME/CFS".to_string() },
            Disease { id: 2, name: "Healthy".to_string() },
            Disease { id: 3, name: "Fibromyalgia".to_string() },
        ],
        cohorts: vec![
            StudyCohort {
                id: 1,
                study_id: 1,
                disease_tags: vec![1],
                control_tags: vec![2],
            },
            StudyCohort {
                id: 2,
                study_id: 1,
                disease_tags: vec![1, 3],
                control_tags: vec![2],
            },
            StudyCohort {
                id: 3,
                study_id: 2,
                disease_tags: vec![1],
                control_tags: vec![2],
            },
        ],
        findings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let snapshot = demo_snapshot();
        let genes: HashSet<_> = snapshot.genes.iter().map(|g| g.id).collect();
        let metabolites: HashSet<_> = snapshot.metabolites.iter().map(|m| m.id).collect();
        assert_eq!(genes.len(), snapshot.genes.len());
        assert_eq!(metabolites.len(), snapshot.metabolites.len());
    }

    #[test]
    fn test_cohorts_reference_existing_rows() {
        let snapshot = demo_snapshot();
        for cohort in &snapshot.cohorts {
            assert!(snapshot.studies.iter().any(|s| s.id == cohort.study_id));
            for tag in cohort.disease_tags.iter().chain(&cohort.control_tags) {
                assert!(snapshot.diseases.iter().any(|d| d.id == *tag));
            }
        }
    }

    #[test]
    fn test_snapshot_survives_json() {
        let json = serde_json::to_string(&demo_snapshot()).unwrap();
        let snapshot = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.genes, demo_snapshot().genes);
    }
}
