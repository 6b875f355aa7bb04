use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rahhal_catalog::{Availability, Package};
use rahhal_core::repository::{PackageDraft, PackageFilter, PackageRepository, RepoResult};
use rahhal_shared::PageRequest;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct StorePackageRepository {
    pool: PgPool,
}

impl StorePackageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PACKAGE_COLUMNS: &str = "id, name, description, service_type, price, currency, duration, \
    max_travelers, inclusions, exclusions, itinerary, images, features, destination, \
    requirements, start_date, end_date, max_bookings, current_bookings, price_breakdown, \
    is_active, is_featured, tags, created_at, updated_at";

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    name: String,
    description: String,
    service_type: String,
    price: f64,
    currency: String,
    duration: i32,
    max_travelers: i32,
    inclusions: Value,
    exclusions: Value,
    itinerary: Value,
    images: Value,
    features: Value,
    destination: Value,
    requirements: Value,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    max_bookings: i32,
    current_bookings: i32,
    price_breakdown: Value,
    is_active: bool,
    is_featured: bool,
    tags: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PackageRow {
    fn into_package(self) -> RepoResult<Package> {
        Ok(Package {
            id: self.id,
            name: self.name,
            description: self.description,
            service_type: self.service_type.parse()?,
            price: self.price,
            currency: self.currency.parse()?,
            duration: self.duration.max(1) as u32,
            max_travelers: self.max_travelers.max(0) as u32,
            inclusions: serde_json::from_value(self.inclusions)?,
            exclusions: serde_json::from_value(self.exclusions)?,
            itinerary: serde_json::from_value(self.itinerary)?,
            images: serde_json::from_value(self.images)?,
            features: serde_json::from_value(self.features)?,
            destination: serde_json::from_value(self.destination)?,
            requirements: serde_json::from_value(self.requirements)?,
            availability: Availability {
                start_date: self.start_date,
                end_date: self.end_date,
                max_bookings: self.max_bookings.max(0) as u32,
                current_bookings: self.current_bookings.max(0) as u32,
            },
            price_breakdown: serde_json::from_value(self.price_breakdown)?,
            is_active: self.is_active,
            is_featured: self.is_featured,
            tags: serde_json::from_value(self.tags)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PackageFilter) {
    if let Some(service_type) = filter.service_type {
        qb.push(" AND service_type = ").push_bind(service_type.as_str());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(is_featured) = filter.is_featured {
        qb.push(" AND is_featured = ").push_bind(is_featured);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR destination->>'country' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR destination->>'city' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    // Price range defaults to [0, +inf)
    qb.push(" AND price >= ").push_bind(filter.min_price.unwrap_or(0.0));
    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max_price);
    }
}

#[async_trait]
impl PackageRepository for StorePackageRepository {
    async fn create_package(&self, draft: &PackageDraft) -> RepoResult<Package> {
        let id = Uuid::new_v4();
        let row: PackageRow = sqlx::query_as(&format!(
            "INSERT INTO packages (id, name, description, service_type, price, currency, \
             duration, max_travelers, inclusions, exclusions, itinerary, images, features, \
             destination, requirements, start_date, end_date, max_bookings, price_breakdown, \
             is_active, is_featured, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22) \
             RETURNING {PACKAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.service_type.as_str())
        .bind(draft.price)
        .bind(draft.currency.as_str())
        .bind(draft.duration as i32)
        .bind(draft.max_travelers as i32)
        .bind(serde_json::to_value(&draft.inclusions)?)
        .bind(serde_json::to_value(&draft.exclusions)?)
        .bind(serde_json::to_value(&draft.itinerary)?)
        .bind(serde_json::to_value(&draft.images)?)
        .bind(serde_json::to_value(&draft.features)?)
        .bind(serde_json::to_value(&draft.destination)?)
        .bind(serde_json::to_value(&draft.requirements)?)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.max_bookings as i32)
        .bind(serde_json::to_value(&draft.price_breakdown)?)
        .bind(draft.is_active)
        .bind(draft.is_featured)
        .bind(serde_json::to_value(&draft.tags)?)
        .fetch_one(&self.pool)
        .await?;

        row.into_package()
    }

    async fn get_package(&self, id: Uuid) -> RepoResult<Option<Package>> {
        let row: Option<PackageRow> =
            sqlx::query_as(&format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(PackageRow::into_package).transpose()
    }

    async fn update_package(&self, id: Uuid, draft: &PackageDraft) -> RepoResult<Option<Package>> {
        let row: Option<PackageRow> = sqlx::query_as(&format!(
            "UPDATE packages SET name = $2, description = $3, service_type = $4, price = $5, \
             currency = $6, duration = $7, max_travelers = $8, inclusions = $9, \
             exclusions = $10, itinerary = $11, images = $12, features = $13, \
             destination = $14, requirements = $15, start_date = $16, end_date = $17, \
             max_bookings = $18, price_breakdown = $19, is_active = $20, is_featured = $21, \
             tags = $22, updated_at = NOW() \
             WHERE id = $1 RETURNING {PACKAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.service_type.as_str())
        .bind(draft.price)
        .bind(draft.currency.as_str())
        .bind(draft.duration as i32)
        .bind(draft.max_travelers as i32)
        .bind(serde_json::to_value(&draft.inclusions)?)
        .bind(serde_json::to_value(&draft.exclusions)?)
        .bind(serde_json::to_value(&draft.itinerary)?)
        .bind(serde_json::to_value(&draft.images)?)
        .bind(serde_json::to_value(&draft.features)?)
        .bind(serde_json::to_value(&draft.destination)?)
        .bind(serde_json::to_value(&draft.requirements)?)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.max_bookings as i32)
        .bind(serde_json::to_value(&draft.price_breakdown)?)
        .bind(draft.is_active)
        .bind(draft.is_featured)
        .bind(serde_json::to_value(&draft.tags)?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PackageRow::into_package).transpose()
    }

    async fn set_package_active(&self, id: Uuid, is_active: bool) -> RepoResult<Option<Package>> {
        let row: Option<PackageRow> = sqlx::query_as(&format!(
            "UPDATE packages SET is_active = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {PACKAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PackageRow::into_package).transpose()
    }

    async fn delete_package(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM packages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_packages(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<Package>, u64)> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM packages WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE 1=1"
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY is_featured DESC, created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<PackageRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let packages = rows
            .into_iter()
            .map(PackageRow::into_package)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok((packages, total.max(0) as u64))
    }

    async fn reserve_slot(&self, id: Uuid, now: DateTime<Utc>) -> RepoResult<bool> {
        // Single conditional update: claim the slot only while the package is
        // bookable. Zero rows means inactive, outside the window, or full.
        let result = sqlx::query(
            "UPDATE packages SET current_bookings = current_bookings + 1, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE \
             AND $2 BETWEEN start_date AND end_date \
             AND current_bookings < max_bookings",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn release_slot(&self, id: Uuid) -> RepoResult<()> {
        sqlx::query(
            "UPDATE packages SET current_bookings = GREATEST(current_bookings - 1, 0), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
