use leetseek_indexer_prelude::{ResultRecord, ResultSink};
use std::io::Write;

#[derive(Debug, serde::Serialize)]
struct StreamedRecord<'a> {
    link: &'a str,
    name: &'a str,
    size: &'a str,
    seeds: &'a str,
    leech: &'a str,
    engine_url: &'a str,
    desc_link: &'a str,
}

impl<'a> From<&'a ResultRecord> for StreamedRecord<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        Self {
            link: &record.magnet,
            name: &record.name,
            size: &record.size_display,
            seeds: &record.seeds,
            leech: &record.leechers,
            engine_url: &record.source_url,
            desc_link: &record.detail_url,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct BatchedRecord<'a> {
    magnet: &'a str,
    name: &'a str,
    size: &'a str,
    size_bytes: u64,
    seeds: &'a str,
    leech: &'a str,
    desc_link: &'a str,
}

impl<'a> From<&'a ResultRecord> for BatchedRecord<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        Self {
            magnet: &record.magnet,
            name: &record.name,
            size: &record.size_display,
            size_bytes: record.size_bytes(),
            seeds: &record.seeds,
            leech: &record.leechers,
            desc_link: &record.detail_url,
        }
    }
}

pub struct StreamPrinter<W> {
    writer: W,
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ResultSink for StreamPrinter<W> {
    fn emit(&mut self, record: ResultRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, &StreamedRecord::from(&record))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

// nothing is written when nothing was found
pub struct JsonArrayPrinter<W> {
    writer: W,
    records: Vec<ResultRecord>,
}

impl<W: Write> JsonArrayPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
        }
    }
}

#[cfg(test)]
impl<W> JsonArrayPrinter<W> {
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonArrayPrinter<W> {
    fn emit(&mut self, record: ResultRecord) -> std::io::Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn finish(&mut self) -> std::io::Result<()> {
        if self.records.is_empty() {
            return Ok(());
        }
        let items = self
            .records
            .iter()
            .map(BatchedRecord::from)
            .collect::<Vec<_>>();
        serde_json::to_writer_pretty(&mut self.writer, &items)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
