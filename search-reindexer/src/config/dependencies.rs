//! Dependency initialization and wiring for the search reindexer.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{Cli, Strategy};
use crate::config::Settings;
use crate::IndexingError;
use search_reindexer_pipeline::{
    BulkSubmitter, ColumnTransformer, CompletionSummary, IndexingPipeline, KeyRange, PipelineError,
    PkScanPipeline,
};
use search_reindexer_repository::{IndexConfig, OpenSearchClientFactory, PostgresStore};
use search_reindexer_shared::Query;

/// The pipeline selected on the command line, ready to run.
pub enum Runner {
    Cursor {
        pipeline: IndexingPipeline,
        query: Query,
    },
    PkScan {
        pipeline: PkScanPipeline,
        range: KeyRange,
    },
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub runner: Runner,
    pub chunk_size: usize,
}

impl Dependencies {
    /// Connect to Postgres and build the selected pipeline.
    ///
    /// The search client is connected lazily by the submitter, so an
    /// unreachable search backend is handled by the retry policy.
    pub async fn new(
        settings: &Settings,
        cli: &Cli,
        cancel: CancellationToken,
    ) -> Result<Self, IndexingError> {
        cli.validate()?;

        info!(
            opensearch_url = %settings.opensearch_url,
            index = %settings.index_name,
            table = %settings.source_table,
            strategy = ?cli.strategy,
            chunk_size = cli.chunk_size,
            "Initializing dependencies"
        );

        let store = PostgresStore::connect(&settings.database_url)
            .await
            .map_err(PipelineError::from)?;
        let store = Arc::new(store);

        let factory = OpenSearchClientFactory::new(
            settings.opensearch_url.clone(),
            IndexConfig::new(settings.index_name.clone()),
        )
        .with_timeout(settings.request_timeout);
        let submitter = BulkSubmitter::new(Arc::new(factory), settings.retry.clone());

        let transformer = settings.excluded_columns.iter().fold(
            ColumnTransformer::new(settings.index_name.clone(), settings.id_column.clone()),
            |transformer, column| transformer.skip_column(column.clone()),
        );
        let transformer = Arc::new(transformer);
        let source = settings.source();

        let runner = match cli.strategy {
            Strategy::Cursor => {
                let mut pipeline = IndexingPipeline::new(store, transformer, submitter)
                    .with_cancellation(cancel);
                if let Some(fetch_window) = cli.fetch_window {
                    pipeline = pipeline.with_fetch_window(fetch_window);
                }
                Runner::Cursor {
                    pipeline,
                    query: source.scan_query(),
                }
            }
            Strategy::PkScan => Runner::PkScan {
                pipeline: PkScanPipeline::new(store, transformer, submitter, source)
                    .with_cancellation(cancel),
                range: cli
                    .key_upper_bound
                    .map_or(KeyRange::FromStore, KeyRange::Explicit),
            },
        };

        Ok(Self {
            runner,
            chunk_size: cli.chunk_size,
        })
    }

    /// Run the selected pipeline to completion.
    pub async fn run(&mut self) -> Result<CompletionSummary, IndexingError> {
        let summary = match &mut self.runner {
            Runner::Cursor { pipeline, query } => pipeline.run(query, self.chunk_size).await?,
            Runner::PkScan { pipeline, range } => pipeline.run(*range, self.chunk_size).await?,
        };
        Ok(summary)
    }
}
