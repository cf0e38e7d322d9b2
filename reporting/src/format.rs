use domain::PortfolioSnapshot;

use crate::ExportFailure;

pub const REPORT_HEADER: [&str; 9] = [
    "Asset",
    "Ticker",
    "Shares",
    "Cost Basis",
    "Current Price",
    "Value",
    "Gain/Loss",
    "Return %",
    "Blockchain",
];

/// One report line read back from CSV, numbers at their two-decimal precision.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub asset: String,
    pub ticker: String,
    pub shares: f64,
    pub cost_basis: f64,
    pub current_price: f64,
    pub value: f64,
    pub gain: f64,
    pub return_percent: f64,
    pub blockchain: String,
}

pub fn render_csv(snapshot: &PortfolioSnapshot) -> Result<String, ExportFailure> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(REPORT_HEADER)
        .map_err(|err| ExportFailure::Render(err.to_string()))?;

    for holding in snapshot.holdings() {
        let record = &holding.record;
        let metrics = &holding.metrics;
        writer
            .write_record([
                record.name.clone(),
                record.ticker.clone(),
                fixed(record.shares),
                money(record.cost_basis),
                money(record.current_price),
                money(metrics.value),
                money(metrics.gain),
                format!("{}%", fixed(metrics.gain_percent)),
                record.blockchain.clone(),
            ])
            .map_err(|err| ExportFailure::Render(err.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportFailure::Render(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportFailure::Render(err.to_string()))
}

pub fn parse_report(body: &str) -> Result<Vec<ReportRow>, ExportFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| ExportFailure::Parse(err.to_string()))?;
    if !headers.iter().eq(REPORT_HEADER.iter().copied()) {
        return Err(ExportFailure::Parse(format!(
            "unexpected header row: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|err| ExportFailure::Parse(err.to_string()))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let number = |idx: usize, raw: &str| {
            raw.trim().parse::<f64>().map_err(|_| {
                ExportFailure::Parse(format!(
                    "row {}: `{}` is not a number in column {}",
                    line + 1,
                    field(idx),
                    REPORT_HEADER[idx]
                ))
            })
        };
        let amount = |idx: usize| number(idx, field(idx).trim().trim_start_matches('$'));

        rows.push(ReportRow {
            asset: field(0).to_string(),
            ticker: field(1).to_string(),
            shares: number(2, field(2))?,
            cost_basis: amount(3)?,
            current_price: amount(4)?,
            value: amount(5)?,
            gain: amount(6)?,
            return_percent: number(7, field(7).trim().trim_end_matches('%'))?,
            blockchain: field(8).to_string(),
        });
    }
    Ok(rows)
}

fn fixed(value: f64) -> String {
    let text = format!("{value:.2}");
    // a tiny negative rounds to "-0.00"
    if text == "-0.00" {
        "0.00".to_string()
    } else {
        text
    }
}

fn money(value: f64) -> String {
    format!("${}", fixed(value))
}
