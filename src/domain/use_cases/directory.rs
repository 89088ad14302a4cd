use std::sync::Arc;

use tracing::instrument;

use crate::csv_source::AlumniCsvStore;
use crate::directory::{filter_options, merge_alumni, run_query};
use crate::entities::alumni::{AlumniListResponse, AlumniQuery, FilterOptionsResponse};
use crate::errors::AppError;
use crate::repositories::profile::ProfileRepository;

/// Read side of the alumni directory.
pub struct DirectoryHandler<P>
where
    P: ProfileRepository,
{
    pub profile_repo: P,
    pub csv: Arc<AlumniCsvStore>,
}

impl<P> DirectoryHandler<P>
where
    P: ProfileRepository,
{
    pub fn new(profile_repo: P, csv: Arc<AlumniCsvStore>) -> Self {
        DirectoryHandler { profile_repo, csv }
    }

    /// Merged CSV and profile records, filtered and sorted by `query`.
    #[instrument(skip(self))]
    pub async fn list_alumni(&self, query: &AlumniQuery) -> Result<AlumniListResponse, AppError> {
        let rows = self.csv.snapshot();
        let profiles = self.profile_repo.list_profiles().await?;
        let deleted = self.profile_repo.deleted_csv_rows().await?;

        let merged = merge_alumni(&rows, &profiles, &deleted);
        let data = run_query(merged, query);

        tracing::debug!(count = data.len(), "Alumni query served");
        Ok(AlumniListResponse {
            success: true,
            count: data.len(),
            data,
        })
    }

    pub fn filter_options(&self) -> FilterOptionsResponse {
        FilterOptionsResponse {
            success: true,
            filters: filter_options(&self.csv.snapshot()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::alumni::{AlumniSource, SortKey, SortOrder};
    use crate::use_cases::test_support::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn store() -> Arc<AlumniCsvStore> {
        Arc::new(AlumniCsvStore::from_rows(vec![
            csv_row(0, "Jordan Kim", "Software Engineer", "Stripe", "2024"),
            csv_row(1, "Priya Shah", "Data Scientist", "Capital One", "2023"),
            csv_row(2, "Miguel Torres", "Product Manager", "Amazon", ""),
        ]))
    }

    #[actix_rt::test]
    async fn list_merges_linked_profiles_and_hides_deleted_rows() {
        let mut profiles = MockProfileRepo::new();
        profiles.expect_list_profiles().returning(|| {
            let mut linked = profile(Uuid::new_v4(), "Jordan M. Kim");
            linked.is_csv_linked = true;
            linked.csv_source_id = Some(0);
            linked.companies = vec!["Anthropic".into()];
            Ok(vec![linked])
        });
        profiles
            .expect_deleted_csv_rows()
            .returning(|| Ok(HashSet::from([1])));

        let handler = DirectoryHandler::new(profiles, store());
        let response = handler.list_alumni(&AlumniQuery::default()).await.unwrap();

        assert_eq!(response.count, 2);
        assert_eq!(response.data[0].name, "Jordan M. Kim");
        assert_eq!(response.data[0].company, "Anthropic");
        assert_eq!(response.data[0].source, AlumniSource::UserProfile);
        assert!(response.data.iter().all(|r| r.name != "Priya Shah"));
    }

    #[actix_rt::test]
    async fn list_applies_sort_with_blank_years_last() {
        let mut profiles = MockProfileRepo::new();
        profiles.expect_list_profiles().returning(|| Ok(vec![]));
        profiles.expect_deleted_csv_rows().returning(|| Ok(HashSet::new()));

        let query = AlumniQuery {
            sort_by: Some(SortKey::GradYear),
            order: SortOrder::Desc,
            ..AlumniQuery::default()
        };
        let response = DirectoryHandler::new(profiles, store())
            .list_alumni(&query)
            .await
            .unwrap();

        let names: Vec<&str> = response.data.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Jordan Kim", "Priya Shah", "Miguel Torres"]);
    }

    #[test]
    fn filter_options_come_from_the_snapshot() {
        let handler = DirectoryHandler::new(MockProfileRepo::new(), store());
        let options = handler.filter_options().filters;

        assert_eq!(options.years, vec!["2023", "2024"]);
        assert_eq!(options.companies, vec!["Amazon", "Capital One", "Stripe"]);
    }
}
