use std::sync::Arc;

use marquee_model::{CreditId, CreditKind, MovieId, Person, PersonId};
use tracing::{debug, info, warn};

use crate::database::CatalogRepository;
use crate::error::Result;
use crate::tmdb::TmdbClient;
use crate::tmdb::models::CreditEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub people_created: usize,
}

enum CreditOutcome {
    Skipped,
    Inserted { person_created: bool },
}

/// Expands a movie's credit list into credit and person rows.
///
/// Credits already stored are skipped without any network traffic, so an
/// interrupted run resumes where it stopped.
#[derive(Debug, Clone)]
pub struct CreditExpander {
    client: TmdbClient,
    store: Arc<dyn CatalogRepository>,
}

impl CreditExpander {
    pub fn new(client: TmdbClient, store: Arc<dyn CatalogRepository>) -> Self {
        Self { client, store }
    }

    /// Only a failure to fetch the credit list itself is returned as an
    /// error; individual credits fail in isolation.
    pub async fn expand(&self, movie_id: MovieId) -> Result<ExpandReport> {
        let credits = self.client.movie_credits(movie_id).await?;
        let mut report = ExpandReport::default();

        let lists = [
            (CreditKind::Crew, &credits.crew),
            (CreditKind::Cast, &credits.cast),
        ];
        for (kind, entries) in lists {
            for (index, entry) in entries.iter().enumerate() {
                let order = i32::try_from(index).unwrap_or(i32::MAX);
                match self.expand_one(movie_id, kind, entry, order).await {
                    Ok(CreditOutcome::Skipped) => report.skipped += 1,
                    Ok(CreditOutcome::Inserted { person_created }) => {
                        report.inserted += 1;
                        if person_created {
                            report.people_created += 1;
                        }
                    }
                    Err(err) => {
                        report.failed += 1;
                        warn!(
                            movie_id = %movie_id,
                            credit_id = %entry.credit_id,
                            %kind,
                            index,
                            "credit sync failed: {err}"
                        );
                    }
                }
            }
        }

        info!(
            movie_id = %movie_id,
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed,
            "credits expanded"
        );
        Ok(report)
    }

    async fn expand_one(
        &self,
        movie_id: MovieId,
        kind: CreditKind,
        entry: &CreditEntry,
        order: i32,
    ) -> Result<CreditOutcome> {
        let credit_id = CreditId::new(entry.credit_id.as_str());
        if self.store.credit_exists(&credit_id).await? {
            return Ok(CreditOutcome::Skipped);
        }

        let details = self.client.credit(&credit_id).await?;
        let person_created = self.ensure_person(details.person_id()).await?;

        let credit = details.into_credit(movie_id, kind, order);
        self.store.create_credit(&credit).await?;
        debug!(
            movie_id = %movie_id,
            credit_id = %credit.id,
            person_id = %credit.person_id,
            order,
            "credit stored"
        );

        Ok(CreditOutcome::Inserted { person_created })
    }

    /// Returns `true` when the person had to be fetched and created.
    async fn ensure_person(&self, person_id: PersonId) -> Result<bool> {
        if self.store.person_exists(person_id).await? {
            return Ok(false);
        }
        let person = Person::from(self.client.person(person_id).await?);
        self.store.create_person(&person).await
    }
}
