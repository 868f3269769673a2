use tracing::{error, info, warn};

use crate::{
    database::postgres::client::{PostgresError, StatementExecutor},
    manifest::config::TableTargets,
    rib::{
        assembler::AssembleError,
        encode::EncodeDiagnostic,
        family::{BatchOptions, PrefixBatch},
    },
};

#[derive(thiserror::Error, Debug)]
pub enum WriteBatchError {
    #[error("Could not build statement: {0}")]
    Assemble(#[from] AssembleError),

    #[error("Statement {statement} of {total} for {table} failed: {source}")]
    Execute {
        statement: usize,
        total: usize,
        table: String,
        #[source]
        source: PostgresError,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub statements: usize,
    pub rows: usize,
    pub diagnostics: Vec<EncodeDiagnostic>,
}

/// Encodes a batch into one or more upsert statements and runs them in order.
///
/// Every statement is built before the first one runs, so a malformed record writes
/// nothing. Statements are not wrapped in a transaction.
pub async fn write_prefix_batch<E: StatementExecutor + ?Sized>(
    executor: &E,
    targets: &TableTargets,
    batch: &PrefixBatch,
    options: &BatchOptions,
) -> Result<WriteSummary, WriteBatchError> {
    if batch.is_empty() {
        return Ok(WriteSummary::default());
    }

    let template = batch.template(targets);
    let built = batch.statements(targets, options).map_err(|e| {
        error!("{} - Could not build statements for {} records: {}", batch.family(), batch.len(), e);
        e
    })?;

    let total = built.len();
    let mut summary = WriteSummary::default();

    for (i, statement) in built.into_iter().enumerate() {
        for diagnostic in &statement.diagnostics {
            warn!("{} - {}", batch.family(), diagnostic);
        }

        executor.execute_statement(&statement.statement.to_sql()).await.map_err(|source| {
            error!("{} - Batch operation failed: {}", batch.family(), source);
            WriteBatchError::Execute {
                statement: i + 1,
                total,
                table: template.table().to_string(),
                source,
            }
        })?;

        summary.statements += 1;
        summary.rows += statement.rows;
        summary.diagnostics.extend(statement.diagnostics);
    }

    info!(
        "{} - Wrote {} rows to {} in {} statements",
        batch.family(),
        summary.rows,
        template.table(),
        summary.statements
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::rib::l3vpn::L3VpnPrefixRecord;

    #[derive(Default)]
    struct RecordingExecutor {
        statements: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl StatementExecutor for RecordingExecutor {
        async fn execute_statement(&self, sql: &str) -> Result<(), PostgresError> {
            let mut statements = self.statements.lock().unwrap();
            if self.fail_on == Some(statements.len()) {
                return Err(PostgresError::ConnectionClosed);
            }
            statements.push(sql.to_string());
            Ok(())
        }
    }

    fn record(i: u32) -> L3VpnPrefixRecord {
        L3VpnPrefixRecord {
            hash_id: format!("{:032x}", i + 1),
            peer_hash_id: "7d793037a0760186574b0282f2f435e7".to_string(),
            path_attr_hash_id: Some("9e107d9d372bb6826bd81d3542a419d6".to_string()),
            is_ipv4: true,
            origin_asn: 64512,
            prefix: format!("10.{}.0.0", i % 250),
            prefix_length: 16,
            timestamp: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap().and_hms_opt(2, 2, 2).unwrap(),
            is_withdrawn: false,
            path_id: 0,
            labels: String::new(),
            is_pre_policy: true,
            is_adj_rib_in: false,
            rd: "65000:1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_executes_nothing() {
        let executor = RecordingExecutor::default();
        let summary = write_prefix_batch(
            &executor,
            &TableTargets::default(),
            &PrefixBatch::L3Vpn(vec![]),
            &BatchOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(summary, WriteSummary::default());
        assert!(executor.statements.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_is_split_by_max_rows() {
        let executor = RecordingExecutor::default();
        let batch = PrefixBatch::L3Vpn((0..7).map(record).collect());
        let options = BatchOptions { max_rows: Some(3), ..Default::default() };
        let targets = TableTargets { schema: Some("bmp".to_string()), ..Default::default() };

        let summary = write_prefix_batch(&executor, &targets, &batch, &options).await.unwrap();

        assert_eq!(summary.statements, 3);
        assert_eq!(summary.rows, 7);
        let statements = executor.statements.lock().unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements.iter().all(|s| s.starts_with("INSERT INTO \"bmp\".\"l3vpn_rib\" (")));
        assert!(statements[0].contains("'00000000-0000-0000-0000-000000000001'::uuid"));
        assert!(statements[2].contains("'00000000-0000-0000-0000-000000000007'::uuid"));
    }

    #[tokio::test]
    async fn test_default_writes_one_statement() {
        let executor = RecordingExecutor::default();
        let batch = PrefixBatch::L3Vpn((0..7).map(record).collect());

        let summary =
            write_prefix_batch(&executor, &TableTargets::default(), &batch, &BatchOptions::default())
                .await
                .unwrap();

        assert_eq!((summary.statements, summary.rows), (1, 7));
        assert_eq!(executor.statements.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_record_writes_nothing() {
        let executor = RecordingExecutor::default();
        let mut records: Vec<L3VpnPrefixRecord> = (0..4).map(record).collect();
        records[3].origin_asn = 1;
        records[3].prefix = "10.0.0".to_string();
        let options = BatchOptions { max_rows: Some(2), ..Default::default() };

        let err = write_prefix_batch(
            &executor,
            &TableTargets::default(),
            &PrefixBatch::L3Vpn(records),
            &options,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WriteBatchError::Assemble(AssembleError::Encode(_))));
        assert!(executor.statements.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execution_failure_is_reported() {
        let executor = RecordingExecutor { fail_on: Some(1), ..Default::default() };
        let options = BatchOptions { max_rows: Some(2), ..Default::default() };

        let err = write_prefix_batch(
            &executor,
            &TableTargets::default(),
            &PrefixBatch::L3Vpn((0..4).map(record).collect()),
            &options,
        )
        .await
        .unwrap_err();

        match err {
            WriteBatchError::Execute { statement, total, table, .. } => {
                assert_eq!((statement, total), (2, 2));
                assert_eq!(table, "l3vpn_rib");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(executor.statements.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_diagnostics_are_returned() {
        let executor = RecordingExecutor::default();
        let mut mapped = record(0);
        mapped.prefix_length = 120;

        let summary = write_prefix_batch(
            &executor,
            &TableTargets::default(),
            &PrefixBatch::L3Vpn(vec![mapped, record(1)]),
            &BatchOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.diagnostics.len(), 3);
    }
}
