//! JSON: массив отчётов как есть, через serde.

use crate::{error::Result, model::Report, traits::WriteReport};
use std::io::Write;

pub struct Json;

impl WriteReport for Json {
    fn write<W: Write>(mut w: W, reports: &[Report]) -> Result<()> {
        serde_json::to_writer_pretty(&mut w, reports)?;
        writeln!(w)?;
        Ok(())
    }
}
