use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::Utc;
use tracing::debug;

use crate::domain::entities::query::FileId;
use crate::infra::export::{encode_csv, encode_xlsx};
use crate::infra::sqlite::queries::{query_page, replace_dataset};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::gateway::{
    ExportFormat, GatewayError, LoadedPage, PersistenceGateway, SaveAck, TabularData,
};

/// `PersistenceGateway` over the local dataset store; a file id is a dataset id.
pub struct SqliteGateway {
    pub db_path: PathBuf,
}

impl SqliteGateway {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn init(&self) -> anyhow::Result<()> {
        init_db(&self.db_path)
    }
}

impl PersistenceGateway for SqliteGateway {
    fn load(
        &self,
        file_id: FileId,
        page: usize,
        page_size: NonZeroUsize,
    ) -> Result<LoadedPage, GatewayError> {
        let (columns, rows, total_rows) =
            query_page(&self.db_path, file_id.0, page, page_size.get()).map_err(|err| {
                GatewayError::LoadFailure {
                    file_id,
                    message: format!("{err:#}"),
                }
            })?;
        debug!(file = %file_id, page, rows = rows.len(), "loaded page from sqlite");

        Ok(LoadedPage {
            columns,
            rows,
            total_rows: usize::try_from(total_rows).unwrap_or_default(),
        })
    }

    fn save(&self, file_id: FileId, data: &TabularData) -> Result<SaveAck, GatewayError> {
        let saved_at = Utc::now();
        let row_count = replace_dataset(
            &self.db_path,
            file_id.0,
            &data.columns,
            &data.rows,
            &saved_at.to_rfc3339(),
        )
        .map_err(|err| GatewayError::SaveFailure {
            file_id,
            message: format!("{err:#}"),
        })?;

        Ok(SaveAck {
            row_count,
            saved_at,
        })
    }

    fn export(
        &self,
        file_id: FileId,
        data: &TabularData,
        format: ExportFormat,
    ) -> Result<Vec<u8>, GatewayError> {
        let bytes = match format {
            ExportFormat::Csv => encode_csv(&data.columns, &data.rows),
            ExportFormat::Xlsx => encode_xlsx(&data.columns, &data.rows),
        }
        .map_err(|err| GatewayError::ExportFailure {
            file_id,
            message: format!("{err:#}"),
        })?;
        debug!(file = %file_id, bytes = bytes.len(), format = format.extension(), "exported");
        Ok(bytes)
    }
}
