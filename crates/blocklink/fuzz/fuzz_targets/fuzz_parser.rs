//! Fuzz target for the data parser and record conversion.
//!
//! Malformed input must surface as an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use blocklink::{DataModel, Parser, RecordReader, VariableDefinition, VariableType};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok(table) = Parser::new().parse_bytes(data) else {
        return;
    };
    let profile = table.profile();
    assert_eq!(profile.len(), table.column_count());

    let Ok(model) = DataModel::new(&[
        VariableDefinition::field(0, VariableType::String),
        VariableDefinition::field(1, VariableType::Set),
        VariableDefinition::field(2, VariableType::Price),
        VariableDefinition::field(3, VariableType::LatLong),
    ]) else {
        return;
    };
    let _ = RecordReader::new(&model).read(&table);
});
