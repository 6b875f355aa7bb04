use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rahhal_booking::models::{
    Booking, BookingStatus, BookingView, PackageSummary, PaymentMethod, PaymentStatus,
    PersonalInfo, Pricing, TravelDetails, UserSummary,
};
use rahhal_booking::reference::generate_reference;
use rahhal_core::repository::{BookingFilter, BookingRepository, NewBooking, RepoResult};
use rahhal_shared::{Masked, PageRequest};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_view(&self, id: Uuid) -> RepoResult<Option<BookingView>> {
        let row: Option<BookingViewRow> = sqlx::query_as(&format!(
            "SELECT {VIEW_COLUMNS} FROM bookings b \
             LEFT JOIN users u ON u.id = b.user_id \
             LEFT JOIN packages p ON p.id = b.package_id \
             WHERE b.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookingViewRow::into_view).transpose()
    }
}

const VIEW_COLUMNS: &str = "b.id, b.reference, b.user_id, b.package_id, b.service_type, \
    b.first_name, b.last_name, b.email, b.phone, b.departure_city, b.departure_date, \
    b.return_date, b.travelers, b.room_type, b.special_requests, b.additional_services, \
    b.base_price, b.services_total, b.total_amount, b.currency, b.status, b.payment_status, \
    b.payment_method, b.notes, b.documents, b.created_at, b.updated_at, \
    u.name AS owner_name, u.email AS owner_email, u.phone AS owner_phone, \
    p.name AS package_name, p.price AS package_price, \
    p.service_type AS package_service_type, p.description AS package_description";

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingViewRow {
    id: Uuid,
    reference: String,
    user_id: Uuid,
    package_id: Uuid,
    service_type: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    departure_city: String,
    departure_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
    travelers: i32,
    room_type: String,
    special_requests: Option<String>,
    additional_services: Value,
    base_price: f64,
    services_total: f64,
    total_amount: f64,
    currency: String,
    status: String,
    payment_status: String,
    payment_method: Option<String>,
    notes: Option<String>,
    documents: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_name: Option<String>,
    owner_email: Option<String>,
    owner_phone: Option<String>,
    package_name: Option<String>,
    package_price: Option<f64>,
    package_service_type: Option<String>,
    package_description: Option<String>,
}

impl BookingViewRow {
    fn into_view(self) -> RepoResult<BookingView> {
        let user = match (self.owner_name, self.owner_email) {
            (Some(name), Some(email)) => Some(UserSummary {
                id: self.user_id,
                name,
                email: Masked(email),
                phone: self.owner_phone.map(Masked),
            }),
            _ => None,
        };

        let package = match (self.package_name, self.package_service_type) {
            (Some(name), Some(service_type)) => Some(PackageSummary {
                id: self.package_id,
                name,
                price: self.package_price.unwrap_or(0.0),
                service_type: service_type.parse()?,
                description: self.package_description.unwrap_or_default(),
            }),
            _ => None,
        };

        let booking = Booking {
            id: self.id,
            booking_id: self.reference,
            user_id: self.user_id,
            package_id: self.package_id,
            service_type: self.service_type.parse()?,
            personal_info: PersonalInfo {
                first_name: self.first_name,
                last_name: self.last_name,
                email: Masked(self.email),
                phone: Masked(self.phone),
            },
            travel_details: TravelDetails {
                departure_city: self.departure_city,
                preferred_departure_date: self.departure_date,
                return_date: self.return_date,
                number_of_travelers: self.travelers.max(1) as u32,
                room_type: self.room_type.parse()?,
                special_requests: self.special_requests,
            },
            additional_services: serde_json::from_value(self.additional_services)?,
            pricing: Pricing {
                base_price: self.base_price,
                additional_services_total: self.services_total,
                total_amount: self.total_amount,
                currency: self.currency.parse()?,
            },
            status: self.status.parse()?,
            payment_status: self.payment_status.parse()?,
            payment_method: self
                .payment_method
                .as_deref()
                .map(|m| m.parse::<PaymentMethod>())
                .transpose()?,
            notes: self.notes,
            documents: serde_json::from_value(self.documents)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        Ok(BookingView::new(booking, user, package))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookingFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND b.status = ").push_bind(status.as_str());
    }
    if let Some(service_type) = filter.service_type {
        qb.push(" AND b.service_type = ").push_bind(service_type.as_str());
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND b.user_id = ").push_bind(user_id);
    }
}

/// How many fresh references to try before giving up on a create. The
/// random tail makes back-to-back collisions vanishingly unlikely.
const REFERENCE_ATTEMPTS: u32 = 3;

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(&self, new_booking: &NewBooking) -> RepoResult<BookingView> {
        let id = Uuid::new_v4();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let reference = generate_reference(Utc::now());

            let result = sqlx::query(
                "INSERT INTO bookings (id, reference, user_id, package_id, service_type, \
                 first_name, last_name, email, phone, departure_city, departure_date, \
                 return_date, travelers, room_type, special_requests, additional_services, \
                 base_price, services_total, total_amount, currency, status, payment_status, \
                 payment_method, notes, documents) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 $16, $17, $18, $19, $20, 'pending', 'pending', $21, $22, '[]')",
            )
            .bind(id)
            .bind(&reference)
            .bind(new_booking.user_id)
            .bind(new_booking.package_id)
            .bind(new_booking.service_type.as_str())
            .bind(&new_booking.personal_info.first_name)
            .bind(&new_booking.personal_info.last_name)
            .bind(new_booking.personal_info.email.as_inner())
            .bind(new_booking.personal_info.phone.as_inner())
            .bind(&new_booking.travel_details.departure_city)
            .bind(new_booking.travel_details.preferred_departure_date)
            .bind(new_booking.travel_details.return_date)
            .bind(new_booking.travel_details.number_of_travelers as i32)
            .bind(new_booking.travel_details.room_type.as_str())
            .bind(new_booking.travel_details.special_requests.as_deref())
            .bind(serde_json::to_value(&new_booking.additional_services)?)
            .bind(new_booking.pricing.base_price)
            .bind(new_booking.pricing.additional_services_total)
            .bind(new_booking.pricing.total_amount)
            .bind(new_booking.pricing.currency.as_str())
            .bind(new_booking.payment_method.map(|m| m.as_str()))
            .bind(new_booking.notes.as_deref())
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => break,
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation() && attempt < REFERENCE_ATTEMPTS =>
                {
                    warn!(%reference, attempt, "booking reference collision, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.fetch_view(id)
            .await?
            .ok_or_else(|| "booking missing immediately after insert".into())
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<BookingView>> {
        self.fetch_view(id).await
    }

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<BookingView>, u64)> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings b WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {VIEW_COLUMNS} FROM bookings b \
             LEFT JOIN users u ON u.id = b.user_id \
             LEFT JOIN packages p ON p.id = b.package_id \
             WHERE 1=1"
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY b.created_at DESC, b.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<BookingViewRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let views = rows
            .into_iter()
            .map(BookingViewRow::into_view)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok((views, total.max(0) as u64))
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        notes: Option<&str>,
    ) -> RepoResult<Option<BookingView>> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $3, notes = COALESCE($4, notes), \
             updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_view(id).await
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        next: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> RepoResult<Option<BookingView>> {
        let result = sqlx::query(
            "UPDATE bookings SET payment_status = $3, \
             payment_method = COALESCE($4, payment_method), updated_at = NOW() \
             WHERE id = $1 AND payment_status = $2",
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(payment_method.map(|m| m.as_str()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_view(id).await
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
