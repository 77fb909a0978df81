//! Paginated dataset query.

use crate::models::{DatasetFilters, Pagination, QueryOutcome, QueryPage};
use crate::sources::{DatasetSource, SourceError};

/// Query `source` with `filters` and return the requested page.
///
/// The remote service returns every match; the page is cut locally and
/// `total_pages` counts the full result set. A page past the end is a
/// successful, empty page.
pub async fn dataset_query(
    source: &dyn DatasetSource,
    filters: &DatasetFilters,
    pagination: Pagination,
) -> QueryOutcome {
    tracing::info!(
        source = source.id(),
        page = pagination.page,
        page_size = pagination.page_size,
        "Running dataset query"
    );

    match run(source, filters, pagination).await {
        Ok(page) => {
            tracing::info!(
                results = page.result_length(),
                total_pages = page.total_pages,
                "Dataset query succeeded"
            );
            QueryOutcome::Page(page)
        }
        Err(e) => {
            tracing::warn!("Dataset query failed: {}", e);
            QueryOutcome::failure(e)
        }
    }
}

async fn run(
    source: &dyn DatasetSource,
    filters: &DatasetFilters,
    pagination: Pagination,
) -> Result<QueryPage, SourceError> {
    if !pagination.is_valid() {
        return Err(SourceError::InvalidRequest(format!(
            "page and page_size must be at least 1 (got page={}, page_size={})",
            pagination.page, pagination.page_size
        )));
    }

    let records = source.query(filters).await?;
    Ok(QueryPage::from_full(records, pagination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{make_records, MockSource};
    use serde_json::json;

    async fn page_of(page: usize, page_size: usize) -> QueryPage {
        let source = MockSource::with_records(make_records(25));
        match dataset_query(
            &source,
            &DatasetFilters::default(),
            Pagination::new(page, page_size),
        )
        .await
        {
            QueryOutcome::Page(page) => page,
            QueryOutcome::Failure(e) => panic!("unexpected failure: {}", e),
        }
    }

    #[tokio::test]
    async fn test_first_page() {
        let page = page_of(1, 10).await;
        assert_eq!(page.result_length(), 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results[0]["id"], json!("DS_1_0"));
    }

    #[tokio::test]
    async fn test_last_partial_page() {
        let page = page_of(3, 10).await;
        assert_eq!(page.result_length(), 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results[0]["id"], json!("DS_21_0"));
        assert_eq!(page.results[4]["id"], json!("DS_25_0"));
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty_success() {
        let page = page_of(4, 10).await;
        assert_eq!(page.result_length(), 0);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 4);
    }

    #[tokio::test]
    async fn test_slice_matches_full_set_for_all_pages() {
        let full = make_records(25);
        for page_size in 1..=30 {
            for page in 1..=(25 / page_size + 2) {
                let got = page_of(page, page_size).await;
                let start = ((page - 1) * page_size).min(full.len());
                let end = (start + page_size).min(full.len());
                assert_eq!(got.results, full[start..end].to_vec());
                assert_eq!(got.total_pages, 25usize.div_ceil(page_size));
            }
        }
    }

    #[tokio::test]
    async fn test_network_failure_becomes_failure_envelope() {
        let source = MockSource::new();
        source.fail_with("connection refused");

        let outcome =
            dataset_query(&source, &DatasetFilters::default(), Pagination::default()).await;

        assert!(!outcome.is_success());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], json!(false));
        assert!(value["results"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_invalid_pagination_skips_remote_call() {
        let source = MockSource::with_records(make_records(3));

        let outcome =
            dataset_query(&source, &DatasetFilters::default(), Pagination::new(1, 0)).await;
        assert!(!outcome.is_success());

        let outcome =
            dataset_query(&source, &DatasetFilters::default(), Pagination::new(0, 10)).await;
        assert!(!outcome.is_success());

        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_filters_are_forwarded() {
        let source = MockSource::with_records(make_records(1));
        let filters = DatasetFilters {
            name: Some("water".to_string()),
            exact_elements: true,
            ..Default::default()
        };

        dataset_query(&source, &filters, Pagination::default()).await;
        assert_eq!(source.last_filters(), Some(filters));
    }

    #[tokio::test]
    async fn test_identical_queries_yield_identical_envelopes() {
        let source = MockSource::with_records(make_records(12));
        let filters = DatasetFilters::default();

        let first = dataset_query(&source, &filters, Pagination::new(2, 5)).await;
        let second = dataset_query(&source, &filters, Pagination::new(2, 5)).await;
        assert_eq!(first, second);
    }
}
