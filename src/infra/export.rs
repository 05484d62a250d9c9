use anyhow::{anyhow, Context, Result};
use rust_xlsxwriter::Workbook;

pub fn encode_csv(columns: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns)
        .context("failed to write csv header")?;
    for row in rows {
        writer.write_record(row).context("failed to write csv row")?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush csv writer: {}", err.error()))
}

pub fn encode_xlsx(columns: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col_idx, name) in columns.iter().enumerate() {
        let col = u16::try_from(col_idx).context("too many columns for xlsx")?;
        worksheet
            .write_string(0, col, name)
            .context("failed to write xlsx header")?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let sheet_row = u32::try_from(row_idx + 1).context("too many rows for xlsx")?;
        for (col_idx, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col = u16::try_from(col_idx).context("too many columns for xlsx")?;
            worksheet
                .write_string(sheet_row, col, value)
                .context("failed to write xlsx cell")?;
        }
    }

    workbook
        .save_to_buffer()
        .context("failed to encode xlsx workbook")
}
