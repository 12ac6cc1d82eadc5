//! Provider storage backends.
//!
//! [`PgProviderStore`] runs rendered SQL against PostgreSQL.
//! [`MemoryProviderStore`] evaluates the same [`SearchPlan`] in process and
//! backs `STORE=memory` deployments and tests.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::plan::SearchPlan;
use super::query_builder::ProviderQueryBuilder;
use crate::db;
use crate::filter::PriceBounds;
use crate::models::{NewProvider, ProviderProfile};

/// One page of matches plus the unpaginated total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorePage {
    pub items: Vec<ProviderProfile>,
    pub total: u64,
}

/// Storage seam for provider profiles.
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Run a search plan.
    async fn search(&self, plan: &SearchPlan) -> Result<StorePage>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>>;

    async fn insert(&self, provider: NewProvider) -> Result<ProviderProfile>;

    /// Hourly-rate bounds over active profiles; `None` when no active
    /// profile has a rate.
    async fn price_bounds(&self) -> Result<Option<PriceBounds>>;

    async fn healthy(&self) -> bool;
}

/// Read a JSON array of providers from disk.
pub fn load_seed_file(path: &Path) -> Result<Vec<NewProvider>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let providers: Vec<NewProvider> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse seed file {}", path.display()))?;
    info!(path = %path.display(), count = providers.len(), "seed file loaded");
    Ok(providers)
}

// -------------------------------------------------------------------------
// PostgreSQL
// -------------------------------------------------------------------------

/// PostgreSQL-backed provider store.
#[derive(Clone)]
pub struct PgProviderStore {
    pool: PgPool,
    statement_timeout_secs: u64,
}

impl PgProviderStore {
    pub fn new(pool: PgPool, statement_timeout_secs: u64) -> Self {
        Self {
            pool,
            statement_timeout_secs,
        }
    }
}

#[async_trait]
impl ProviderStore for PgProviderStore {
    async fn search(&self, plan: &SearchPlan) -> Result<StorePage> {
        let builder = ProviderQueryBuilder::new(plan);
        let count_sql = builder.build_count();
        let main_sql = builder.build();
        debug!(sql = %main_sql, "provider search");

        // SET LOCAL only lasts for the enclosing transaction.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}s'",
            self.statement_timeout_secs
        ))
        .execute(&mut *tx)
        .await
        .context("failed to set statement timeout")?;

        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .context("failed to execute count query")?;

        let items = sqlx::query_as::<_, ProviderProfile>(&main_sql)
            .fetch_all(&mut *tx)
            .await
            .context("failed to execute search query")?;

        tx.commit()
            .await
            .context("failed to commit search transaction")?;

        Ok(StorePage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>> {
        sqlx::query_as::<_, ProviderProfile>("SELECT * FROM provider_profile WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to load provider")
    }

    async fn insert(&self, provider: NewProvider) -> Result<ProviderProfile> {
        let p = provider.into_profile();
        let row = sqlx::query_as::<_, ProviderProfile>(
            r#"
            INSERT INTO provider_profile (
                id, display_name, city, district, category, bio, age, height, weight,
                hair_color, eye_color, skin_tone, breast_size, body_type, ethnicity,
                nationality, hourly_rate, services, is_vip, is_verified_by_admin,
                is_active, available_today, incall, outcall, created
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING *
            "#,
        )
        .bind(p.id)
        .bind(&p.display_name)
        .bind(&p.city)
        .bind(&p.district)
        .bind(&p.category)
        .bind(&p.bio)
        .bind(p.age)
        .bind(p.height)
        .bind(p.weight)
        .bind(&p.hair_color)
        .bind(&p.eye_color)
        .bind(&p.skin_tone)
        .bind(&p.breast_size)
        .bind(&p.body_type)
        .bind(&p.ethnicity)
        .bind(&p.nationality)
        .bind(p.hourly_rate)
        .bind(&p.services)
        .bind(p.is_vip)
        .bind(p.is_verified_by_admin)
        .bind(p.is_active)
        .bind(p.available_today)
        .bind(p.incall)
        .bind(p.outcall)
        .bind(p.created)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert provider")?;

        debug!(id = %row.id, "provider inserted");
        Ok(row)
    }

    async fn price_bounds(&self) -> Result<Option<PriceBounds>> {
        let (min, max): (Option<i32>, Option<i32>) =
            sqlx::query_as(&ProviderQueryBuilder::build_price_bounds())
                .fetch_one(&self.pool)
                .await
                .context("failed to load price bounds")?;

        Ok(min.zip(max).map(|(min, max)| PriceBounds { min, max }))
    }

    async fn healthy(&self) -> bool {
        db::check_health(&self.pool).await
    }
}

// -------------------------------------------------------------------------
// In memory
// -------------------------------------------------------------------------

/// In-process provider store.
#[derive(Default)]
pub struct MemoryProviderStore {
    providers: RwLock<Vec<ProviderProfile>>,
}

impl MemoryProviderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `providers`.
    ///
    /// Fails on the first repeated id, like [`ProviderStore::insert`].
    pub fn with_providers(providers: impl IntoIterator<Item = NewProvider>) -> Result<Self> {
        let store = Self::new();
        {
            let mut rows = store.providers.write();
            for provider in providers {
                push_unique(&mut rows, provider.into_profile())?;
            }
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

#[async_trait]
impl ProviderStore for MemoryProviderStore {
    async fn search(&self, plan: &SearchPlan) -> Result<StorePage> {
        let providers = self.providers.read();
        let mut matched: Vec<&ProviderProfile> =
            providers.iter().filter(|p| plan.matches(p)).collect();
        matched.sort_by(|a, b| plan.compare(a, b));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(plan.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(plan.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(StorePage { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>> {
        Ok(self.providers.read().iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, provider: NewProvider) -> Result<ProviderProfile> {
        let profile = provider.into_profile();
        push_unique(&mut self.providers.write(), profile.clone())?;
        Ok(profile)
    }

    async fn price_bounds(&self) -> Result<Option<PriceBounds>> {
        let providers = self.providers.read();
        let rates = providers
            .iter()
            .filter(|p| p.is_active)
            .filter_map(|p| p.hourly_rate);
        let bounds = rates.fold(None, |acc: Option<PriceBounds>, rate| {
            Some(match acc {
                None => PriceBounds { min: rate, max: rate },
                Some(b) => PriceBounds {
                    min: b.min.min(rate),
                    max: b.max.max(rate),
                },
            })
        });
        Ok(bounds)
    }

    async fn healthy(&self) -> bool {
        true
    }
}

fn push_unique(providers: &mut Vec<ProviderProfile>, profile: ProviderProfile) -> Result<()> {
    anyhow::ensure!(
        !providers.iter().any(|p| p.id == profile.id),
        "provider {} already exists",
        profile.id
    );
    providers.push(profile);
    Ok(())
}
