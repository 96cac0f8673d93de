use std::io::Read;

use crate::error::Result;
use crate::input::Table;

/// Header is the first record, taken verbatim; a leading `#` is part of the column name.
pub fn read_csv_table<R: Read>(reader: R, name: &str) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = rdr
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(Table::new(name, columns, rows))
}
