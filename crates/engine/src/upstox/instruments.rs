use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use tracing::{debug, info};

use common::{Error, Result};

#[derive(Debug, Deserialize)]
struct InstrumentRow {
    instrument_key: String,
    tradingsymbol: String,
    instrument_type: String,
}

#[derive(Debug, Clone)]
struct Instrument {
    symbol: String,
    key: String,
    /// Upper-cased symbol with `&`, `-` and spaces removed.
    compact: String,
}

/// Maps NSE trading symbols to Upstox instrument keys.
///
/// Loaded once from the Upstox instrument master CSV; only `EQUITY` rows are
/// kept. Lookups try the exact symbol, then a case-insensitive match, then a
/// prefix match on the symbol with punctuation stripped.
#[derive(Debug, Clone, Default)]
pub struct InstrumentMaster {
    instruments: Vec<Instrument>,
    exact: HashMap<String, usize>,
    upper: HashMap<String, usize>,
}

impl InstrumentMaster {
    pub fn from_path(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Config(format!("failed to open instrument master '{path}': {e}")))?;
        let master = Self::from_reader(file)?;
        info!(path, instruments = master.len(), "Loaded NSE EQUITY instruments");
        Ok(master)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut master = Self::default();
        for row in csv_reader.deserialize::<InstrumentRow>() {
            let row = row.map_err(|e| Error::Config(format!("instrument master: {e}")))?;
            if row.instrument_type != "EQUITY" {
                continue;
            }
            master.insert(row.tradingsymbol, row.instrument_key);
        }
        Ok(master)
    }

    fn insert(&mut self, symbol: String, key: String) {
        let index = self.instruments.len();
        // first listing of a symbol wins
        self.exact.entry(symbol.clone()).or_insert(index);
        self.upper.entry(symbol.to_uppercase()).or_insert(index);
        self.instruments.push(Instrument {
            compact: compact(&symbol),
            symbol,
            key,
        });
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Instrument key for `symbol`, if any listing matches.
    pub fn resolve(&self, symbol: &str) -> Option<&str> {
        if let Some(&i) = self.exact.get(symbol) {
            return Some(&self.instruments[i].key);
        }
        if let Some(&i) = self.upper.get(&symbol.to_uppercase()) {
            return Some(&self.instruments[i].key);
        }

        let wanted = compact(symbol);
        if wanted.is_empty() {
            return None;
        }
        let found = self
            .instruments
            .iter()
            .find(|inst| inst.compact.starts_with(&wanted))?;
        debug!(symbol, matched = %found.symbol, "Fuzzy-matched instrument");
        Some(&found.key)
    }
}

fn compact(symbol: &str) -> String {
    symbol
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '&' | '-' | ' '))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "\
instrument_key,exchange_token,tradingsymbol,name,instrument_type
NSE_EQ|INE002A01018,2885,RELIANCE,RELIANCE INDUSTRIES,EQUITY
NSE_EQ|INE155A01022,3456,TATAMOTORS,TATA MOTORS,EQUITY
NSE_EQ|INE018A01030,11483,LT,LARSEN & TOUBRO,EQUITY
NSE_EQ|INE774D01024,2031,M&M,MAHINDRA & MAHINDRA,EQUITY
NSE_EQ|INE115A01026,17818,BAJAJ-AUTO,BAJAJ AUTO,EQUITY
NSE_FO|12345,12345,RELIANCE24JANFUT,RELIANCE,FUTSTK
";

    fn master() -> InstrumentMaster {
        InstrumentMaster::from_reader(MASTER.as_bytes()).unwrap()
    }

    #[test]
    fn keeps_only_equity_rows() {
        assert_eq!(master().len(), 5);
        assert_eq!(master().resolve("RELIANCE24JANFUT"), None);
    }

    #[test]
    fn exact_then_case_insensitive() {
        let m = master();
        assert_eq!(m.resolve("RELIANCE"), Some("NSE_EQ|INE002A01018"));
        assert_eq!(m.resolve("tatamotors"), Some("NSE_EQ|INE155A01022"));
    }

    #[test]
    fn fuzzy_strips_punctuation() {
        let m = master();
        assert_eq!(m.resolve("MM"), Some("NSE_EQ|INE774D01024"));
        assert_eq!(m.resolve("BAJAJAUTO"), Some("NSE_EQ|INE115A01026"));
        assert_eq!(m.resolve("Bajaj Auto"), Some("NSE_EQ|INE115A01026"));
    }

    #[test]
    fn unknown_symbol_is_none() {
        assert_eq!(master().resolve("NOSUCHCO"), None);
        assert_eq!(master().resolve("-"), None);
    }

    #[test]
    fn missing_columns_is_config_error() {
        let err = InstrumentMaster::from_reader("symbol,key\nA,B\n".as_bytes()).unwrap_err();
        assert!(err.is_config_error());
    }
}
