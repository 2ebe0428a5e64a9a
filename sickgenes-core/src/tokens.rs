//! # Tokenização do Texto Livre
//!
//! O usuário cola uma lista de identificadores, um por linha. Cada linha vira
//! um token atômico: vírgulas, dois-pontos e espaços internos são preservados
//! (`"item, comma"` é UM token, não dois).
//!
//! ## Regras
//!
//! 1. Quebra em fronteiras de linha (`\n`, `\r\n`, `\r`, `\v`, `\f`, separadores
//!    de registro/arquivo, `NEL`, `U+2028`, `U+2029`).
//! 2. Remove espaços nas pontas de cada linha.
//! 3. Descarta linhas vazias.
//! 4. Deduplica. A ordem não é significativa depois daqui; o [`BTreeSet`] dá
//!    uma iteração estável (ordem lexicográfica) para cada rodada.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Conjunto normalizado de tokens de busca.
pub type TokenSet = BTreeSet<String>;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|[\n\r\x0B\x0C\x1C\x1D\x1E\x{85}\x{2028}\x{2029}]")
        .expect("line break pattern is valid")
});

/// Converte o conteúdo da caixa de texto em um conjunto de tokens.
pub fn parse_free_text(text: &str) -> TokenSet {
    LINE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
