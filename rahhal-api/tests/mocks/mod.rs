//! In-memory repository doubles backing the router tests. Same traits as the
//! Postgres store, plus seeding helpers for deterministic fixtures.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc};
use rahhal_booking::models::{
    Booking, BookingStatus, BookingView, PackageSummary, PaymentMethod, PaymentStatus,
    PersonalInfo, Pricing, RoomType, TravelDetails, UserSummary,
};
use rahhal_booking::reference::generate_reference;
use rahhal_catalog::{
    Availability, Currency, Destination, Package, PriceBreakdown, Requirements, ServiceType,
};
use rahhal_core::analytics::{
    DashboardStats, MonthlyRevenue, OverviewStats, PopularPackage, ServiceSlice, StatusSlice,
};
use rahhal_core::repository::{
    AnalyticsRepository, BookingFilter, BookingRepository, NewBooking, PackageDraft,
    PackageFilter, PackageRepository, RepoResult, UserRepository,
};
use rahhal_core::user::User;
use rahhal_shared::{Masked, PageRequest};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use uuid::Uuid;

pub fn sample_package(service_type: ServiceType, price: f64, max_bookings: u32) -> Package {
    let now = Utc::now();
    Package {
        id: Uuid::new_v4(),
        name: format!("Package {}", Uuid::new_v4().simple()),
        description: "Fixture package".to_string(),
        service_type,
        price,
        currency: Currency::Usd,
        duration: 10,
        max_travelers: 4,
        inclusions: vec![],
        exclusions: vec![],
        itinerary: vec![],
        images: vec![],
        features: vec![],
        destination: Destination {
            country: "Saudi Arabia".to_string(),
            city: "Makkah".to_string(),
            coordinates: None,
        },
        requirements: Requirements::default(),
        availability: Availability {
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(90),
            max_bookings,
            current_bookings: 0,
        },
        price_breakdown: PriceBreakdown::default(),
        is_active: true,
        is_featured: false,
        tags: vec![],
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    packages: Mutex<HashMap<Uuid, Package>>,
    bookings: Mutex<Vec<BookingView>>,
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_package(&self, package: Package) {
        self.packages.lock().unwrap().insert(package.id, package);
    }

    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn package_bookings(&self, id: Uuid) -> u32 {
        self.packages
            .lock()
            .unwrap()
            .get(&id)
            .map(|p| p.availability.current_bookings)
            .unwrap_or(0)
    }

    /// Insert a booking directly, `minutes_ago` back from now so listings
    /// have a deterministic order.
    pub fn seed_booking(
        &self,
        package: &Package,
        minutes_ago: i64,
        status: BookingStatus,
    ) -> BookingView {
        let now = Utc::now();
        let created_at = now - Duration::minutes(minutes_ago);
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_id: generate_reference(created_at),
            user_id: Uuid::new_v4(),
            package_id: package.id,
            service_type: package.service_type,
            personal_info: PersonalInfo {
                first_name: "Sara".to_string(),
                last_name: "Nasser".to_string(),
                email: Masked("sara@example.com".to_string()),
                phone: Masked("+966500000000".to_string()),
            },
            travel_details: TravelDetails {
                departure_city: "Riyadh".to_string(),
                preferred_departure_date: now + Duration::days(15),
                return_date: now + Duration::days(25),
                number_of_travelers: 1,
                room_type: RoomType::Double,
                special_requests: None,
            },
            additional_services: vec![],
            pricing: Pricing {
                base_price: package.price,
                additional_services_total: 0.0,
                total_amount: package.price,
                currency: package.currency,
            },
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            notes: None,
            documents: vec![],
            created_at,
            updated_at: created_at,
        };

        let view = BookingView::new(
            booking,
            None,
            Some(PackageSummary {
                id: package.id,
                name: package.name.clone(),
                price: package.price,
                service_type: package.service_type,
                description: package.description.clone(),
            }),
        );
        self.bookings.lock().unwrap().push(view.clone());
        view
    }

    fn sorted_filtered(&self, filter: &BookingFilter) -> Vec<BookingView> {
        let mut views: Vec<BookingView> = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|v| filter.status.map_or(true, |s| v.booking.status == s))
            .filter(|v| {
                filter
                    .service_type
                    .map_or(true, |s| v.booking.service_type == s)
            })
            .filter(|v| filter.user_id.map_or(true, |u| v.booking.user_id == u))
            .cloned()
            .collect();
        views.sort_by(|a, b| {
            b.booking
                .created_at
                .cmp(&a.booking.created_at)
                .then(b.booking.id.cmp(&a.booking.id))
        });
        views
    }
}

#[async_trait]
impl PackageRepository for MemoryStore {
    async fn create_package(&self, draft: &PackageDraft) -> RepoResult<Package> {
        let now = Utc::now();
        let package = Package {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            service_type: draft.service_type,
            price: draft.price,
            currency: draft.currency,
            duration: draft.duration,
            max_travelers: draft.max_travelers,
            inclusions: draft.inclusions.clone(),
            exclusions: draft.exclusions.clone(),
            itinerary: draft.itinerary.clone(),
            images: draft.images.clone(),
            features: draft.features.clone(),
            destination: draft.destination.clone(),
            requirements: draft.requirements.clone(),
            availability: Availability {
                start_date: draft.start_date,
                end_date: draft.end_date,
                max_bookings: draft.max_bookings,
                current_bookings: 0,
            },
            price_breakdown: draft.price_breakdown.clone(),
            is_active: draft.is_active,
            is_featured: draft.is_featured,
            tags: draft.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        self.insert_package(package.clone());
        Ok(package)
    }

    async fn get_package(&self, id: Uuid) -> RepoResult<Option<Package>> {
        Ok(self.packages.lock().unwrap().get(&id).cloned())
    }

    async fn update_package(&self, id: Uuid, draft: &PackageDraft) -> RepoResult<Option<Package>> {
        let mut packages = self.packages.lock().unwrap();
        let Some(package) = packages.get_mut(&id) else {
            return Ok(None);
        };
        package.name = draft.name.clone();
        package.description = draft.description.clone();
        package.service_type = draft.service_type;
        package.price = draft.price;
        package.currency = draft.currency;
        package.duration = draft.duration;
        package.max_travelers = draft.max_travelers;
        package.availability.start_date = draft.start_date;
        package.availability.end_date = draft.end_date;
        package.availability.max_bookings = draft.max_bookings;
        package.is_active = draft.is_active;
        package.is_featured = draft.is_featured;
        package.updated_at = Utc::now();
        Ok(Some(package.clone()))
    }

    async fn set_package_active(&self, id: Uuid, is_active: bool) -> RepoResult<Option<Package>> {
        let mut packages = self.packages.lock().unwrap();
        let Some(package) = packages.get_mut(&id) else {
            return Ok(None);
        };
        package.is_active = is_active;
        package.updated_at = Utc::now();
        Ok(Some(package.clone()))
    }

    async fn delete_package(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.packages.lock().unwrap().remove(&id).is_some())
    }

    async fn list_packages(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<Package>, u64)> {
        let mut packages: Vec<Package> = self
            .packages
            .lock()
            .unwrap()
            .values()
            .filter(|p| filter.service_type.map_or(true, |s| p.service_type == s))
            .filter(|p| filter.is_active.map_or(true, |a| p.is_active == a))
            .filter(|p| filter.is_featured.map_or(true, |f| p.is_featured == f))
            .filter(|p| {
                filter.search.as_deref().map_or(true, |needle| {
                    let needle = needle.to_lowercase();
                    p.name.to_lowercase().contains(&needle)
                        || p.description.to_lowercase().contains(&needle)
                        || p.destination.country.to_lowercase().contains(&needle)
                        || p.destination.city.to_lowercase().contains(&needle)
                })
            })
            .filter(|p| p.price >= filter.min_price.unwrap_or(0.0))
            .filter(|p| filter.max_price.map_or(true, |max| p.price <= max))
            .cloned()
            .collect();

        packages.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        let total = packages.len() as u64;
        let start = (page.offset() as usize).min(packages.len());
        let end = (start + page.limit() as usize).min(packages.len());
        Ok((packages[start..end].to_vec(), total))
    }

    async fn reserve_slot(&self, id: Uuid, now: DateTime<Utc>) -> RepoResult<bool> {
        let mut packages = self.packages.lock().unwrap();
        let Some(package) = packages.get_mut(&id) else {
            return Ok(false);
        };
        if !package.is_available(now) {
            return Ok(false);
        }
        package.availability.current_bookings += 1;
        Ok(true)
    }

    async fn release_slot(&self, id: Uuid) -> RepoResult<()> {
        if let Some(package) = self.packages.lock().unwrap().get_mut(&id) {
            package.availability.current_bookings =
                package.availability.current_bookings.saturating_sub(1);
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, new_booking: &NewBooking) -> RepoResult<BookingView> {
        let now = Utc::now();
        let package = self
            .packages
            .lock()
            .unwrap()
            .get(&new_booking.package_id)
            .cloned();
        let user = self
            .users
            .lock()
            .unwrap()
            .get(&new_booking.user_id)
            .cloned();

        let booking = Booking {
            id: Uuid::new_v4(),
            booking_id: generate_reference(now),
            user_id: new_booking.user_id,
            package_id: new_booking.package_id,
            service_type: new_booking.service_type,
            personal_info: new_booking.personal_info.clone(),
            travel_details: new_booking.travel_details.clone(),
            additional_services: new_booking.additional_services.clone(),
            pricing: new_booking.pricing.clone(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: new_booking.payment_method,
            notes: new_booking.notes.clone(),
            documents: vec![],
            created_at: now,
            updated_at: now,
        };

        let view = BookingView::new(
            booking,
            user.map(|u| UserSummary {
                id: u.id,
                name: u.name,
                email: Masked(u.email),
                phone: u.phone.map(Masked),
            }),
            package.map(|p| PackageSummary {
                id: p.id,
                name: p.name,
                price: p.price,
                service_type: p.service_type,
                description: p.description,
            }),
        );
        self.bookings.lock().unwrap().push(view.clone());
        Ok(view)
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<BookingView>> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.booking.id == id)
            .cloned())
    }

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<BookingView>, u64)> {
        let views = self.sorted_filtered(filter);
        let total = views.len() as u64;
        let start = (page.offset() as usize).min(views.len());
        let end = (start + page.limit() as usize).min(views.len());
        Ok((views[start..end].to_vec(), total))
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        notes: Option<&str>,
    ) -> RepoResult<Option<BookingView>> {
        let mut bookings = self.bookings.lock().unwrap();
        let Some(view) = bookings
            .iter_mut()
            .find(|v| v.booking.id == id && v.booking.status == expected)
        else {
            return Ok(None);
        };
        view.booking.status = next;
        if let Some(notes) = notes {
            view.booking.notes = Some(notes.to_string());
        }
        view.booking.updated_at = Utc::now();
        Ok(Some(view.clone()))
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        next: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> RepoResult<Option<BookingView>> {
        let mut bookings = self.bookings.lock().unwrap();
        let Some(view) = bookings
            .iter_mut()
            .find(|v| v.booking.id == id && v.booking.payment_status == expected)
        else {
            return Ok(None);
        };
        view.booking.payment_status = next;
        if payment_method.is_some() {
            view.booking.payment_method = payment_method;
        }
        view.booking.updated_at = Utc::now();
        Ok(Some(view.clone()))
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool> {
        let mut bookings = self.bookings.lock().unwrap();
        let before = bookings.len();
        bookings.retain(|v| v.booking.id != id);
        Ok(bookings.len() < before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.failed_login_attempts = attempts;
            user.locked_until = locked_until;
        }
        Ok(())
    }

    async fn record_login_success(&self, id: Uuid) -> RepoResult<()> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.failed_login_attempts = 0;
            user.locked_until = None;
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryStore {
    async fn overview(&self, window_start: DateTime<Utc>) -> RepoResult<OverviewStats> {
        let bookings = self.bookings.lock().unwrap();
        let window: Vec<&BookingView> = bookings
            .iter()
            .filter(|v| v.booking.created_at >= window_start)
            .collect();

        let total_revenue = window
            .iter()
            .filter(|v| v.booking.status == BookingStatus::Confirmed)
            .map(|v| v.booking.pricing.total_amount)
            .sum();

        let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_service: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_month: BTreeMap<(i32, u32), (f64, u64)> = BTreeMap::new();
        for view in &window {
            *by_status
                .entry(view.booking.status.to_string())
                .or_default() += 1;
            *by_service
                .entry(view.booking.service_type.to_string())
                .or_default() += 1;
            if view.booking.status == BookingStatus::Confirmed {
                let key = (
                    view.booking.created_at.year(),
                    view.booking.created_at.month(),
                );
                let entry = by_month.entry(key).or_default();
                entry.0 += view.booking.pricing.total_amount;
                entry.1 += 1;
            }
        }

        Ok(OverviewStats {
            total_bookings: window.len() as u64,
            total_revenue,
            status_distribution: by_status
                .into_iter()
                .map(|(status, count)| StatusSlice { status, count })
                .collect(),
            service_distribution: by_service
                .into_iter()
                .map(|(service_type, count)| ServiceSlice {
                    service_type,
                    count,
                })
                .collect(),
            monthly_trend: by_month
                .into_iter()
                .map(|((year, month), (revenue, count))| MonthlyRevenue {
                    year,
                    month,
                    revenue,
                    bookings: count,
                })
                .collect(),
        })
    }

    async fn popular_packages(
        &self,
        window_start: DateTime<Utc>,
        limit: i64,
    ) -> RepoResult<Vec<PopularPackage>> {
        let bookings = self.bookings.lock().unwrap();
        let mut grouped: HashMap<Uuid, PopularPackage> = HashMap::new();
        for view in bookings
            .iter()
            .filter(|v| v.booking.created_at >= window_start)
        {
            let Some(summary) = &view.package else {
                continue;
            };
            let entry = grouped
                .entry(view.booking.package_id)
                .or_insert_with(|| PopularPackage {
                    package_id: summary.id,
                    name: summary.name.clone(),
                    service_type: summary.service_type.to_string(),
                    bookings: 0,
                    revenue: 0.0,
                });
            entry.bookings += 1;
            entry.revenue += view.booking.pricing.total_amount;
        }

        let mut ranked: Vec<PopularPackage> = grouped.into_values().collect();
        ranked.sort_by(|a, b| {
            b.bookings
                .cmp(&a.bookings)
                .then(b.revenue.total_cmp(&a.revenue))
        });
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }

    async fn dashboard(&self) -> RepoResult<DashboardStats> {
        let bookings = self.bookings.lock().unwrap();
        let total_revenue = bookings
            .iter()
            .filter(|v| v.booking.status == BookingStatus::Confirmed)
            .map(|v| v.booking.pricing.total_amount)
            .sum();
        let pending = bookings
            .iter()
            .filter(|v| v.booking.status == BookingStatus::Pending)
            .count() as u64;

        Ok(DashboardStats {
            total_users: self.users.lock().unwrap().len() as u64,
            total_packages: self.packages.lock().unwrap().len() as u64,
            total_bookings: bookings.len() as u64,
            total_revenue,
            pending_bookings: pending,
        })
    }
}
