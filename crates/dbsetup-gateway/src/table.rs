//! Grammar for the line-oriented tables the CLI prints.
//!
//! ```text
//! Scope          Backend         KeyVault URL
//! -------------  --------------  ----------------------------------
//! finance        AZURE_KEYVAULT  https://kv-finance.vault.azure.net/
//! ```
//!
//! The header line (when the listing has one) is discarded, separator lines
//! (only `-` characters or blank) are discarded, and every remaining line is
//! split on runs of whitespace into a record of at least `min_columns` tokens.

/// Shape of one CLI listing.
#[derive(Debug, Clone, Copy)]
pub struct TableGrammar {
    pub has_header: bool,
    pub min_columns: usize,
}

/// A row that does not have enough columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortRow {
    pub line: String,
    pub expected: usize,
}

impl std::fmt::Display for ShortRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected at least {} columns in row '{}'", self.expected, self.line)
    }
}

fn is_separator(line: &str) -> bool {
    line.chars().all(|c| c == '-' || c.is_whitespace())
}

/// Tokenize a listing into records.
pub fn parse_rows(raw: &str, grammar: TableGrammar) -> Result<Vec<Vec<String>>, ShortRow> {
    let mut lines = raw
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .skip_while(|l| l.trim().is_empty());

    if grammar.has_header {
        lines.next();
    }

    let mut rows = Vec::new();
    for line in lines {
        if is_separator(line) {
            continue;
        }
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.len() < grammar.min_columns {
            return Err(ShortRow {
                line: line.to_string(),
                expected: grammar.min_columns,
            });
        }
        rows.push(tokens);
    }
    Ok(rows)
}
