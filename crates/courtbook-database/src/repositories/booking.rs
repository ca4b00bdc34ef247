//! Booking ledger repository implementation.
//!
//! Every write runs in one transaction covering the booking row, its
//! equipment lines, and the equipment stock counters. Reservations use a
//! guarded `UPDATE ... WHERE available_stock >= $n`, so a counter can never
//! go negative; a refused guard rolls the whole write back.
//!
//! Writes of confirmed bookings first take transaction-scoped advisory locks
//! on every court, coach, and equipment item involved, in ascending key
//! order, then re-check court and coach overlap. The locks are shared by
//! every process on the database and released at commit or rollback. The
//! `bookings_*_no_overlap` exclusion constraints back the re-check.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use courtbook_core::error::{AppError, ErrorKind};
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, CoachId, CourtId, EquipmentId};
use courtbook_core::types::interval::TimeInterval;
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_entity::booking::{Booking, BookingFilter, BookingStatus, EquipmentLine};

use super::rows::{BookingRow, EquipmentLineRow, to_column, to_count};
use crate::store::{BookingStore, ResourceScope, StockCount, stock_delta};

const OVERLAP_CLAUSE: &str = "status = 'confirmed' AND start_time < $3 AND $2 < end_time \
                              AND ($4::uuid IS NULL OR id <> $4)";

/// SQLSTATE raised when an exclusion constraint refuses a row.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Advisory lock key of one bookable resource.
///
/// The top byte names the resource kind so a court and a coach never share
/// a key; the remaining bits fold the 128-bit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct AdvisoryKey(i64);

impl AdvisoryKey {
    const COURT: u8 = 1;
    const COACH: u8 = 2;
    const EQUIPMENT: u8 = 3;

    fn new(kind: u8, id: Uuid) -> Self {
        let bits = id.as_u128();
        let folded = ((bits >> 64) as u64) ^ (bits as u64);
        Self(((u64::from(kind) << 56) | (folded >> 8)) as i64)
    }

    fn court(id: CourtId) -> Self {
        Self::new(Self::COURT, id.into_uuid())
    }

    fn coach(id: CoachId) -> Self {
        Self::new(Self::COACH, id.into_uuid())
    }

    fn equipment(id: EquipmentId) -> Self {
        Self::new(Self::EQUIPMENT, id.into_uuid())
    }

    /// Keys of every resource a booking holds, ascending and distinct.
    fn for_booking(booking: &Booking) -> BTreeSet<Self> {
        let mut keys = BTreeSet::from([Self::court(booking.court_id)]);
        keys.extend(booking.resources.coach.map(Self::coach));
        keys.extend(
            booking
                .resources
                .equipment
                .iter()
                .map(|line| Self::equipment(line.equipment_id)),
        );
        keys
    }
}

/// Map a failed booking write, turning an exclusion violation into a
/// `Conflict`.
fn write_error(e: sqlx::Error, message: &str) -> AppError {
    let excluded = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == EXCLUSION_VIOLATION);
    if excluded {
        AppError::with_source(
            ErrorKind::Conflict,
            "Court or coach is already booked over this interval",
            e,
        )
    } else {
        AppError::with_source(ErrorKind::Database, message, e)
    }
}

/// Repository for bookings and their equipment lines.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Take the advisory locks for `keys` until the transaction ends.
    async fn lock_resources(
        conn: &mut PgConnection,
        keys: &BTreeSet<AdvisoryKey>,
    ) -> AppResult<()> {
        for key in keys {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(key.0)
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock booked resources", e)
                })?;
        }
        Ok(())
    }

    /// Refuse a confirmed booking whose court or coach another confirmed
    /// booking holds over an overlapping interval. Must run under the
    /// booking's advisory locks.
    async fn ensure_unclaimed(conn: &mut PgConnection, booking: &Booking) -> AppResult<()> {
        if !booking.is_confirmed() {
            return Ok(());
        }
        let holder: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM bookings WHERE status = 'confirmed' AND id <> $1 \
             AND (court_id = $2 OR ($3::uuid IS NOT NULL AND coach_id = $3)) \
             AND start_time < $5 AND $4 < end_time LIMIT 1",
        )
        .bind(booking.id.into_uuid())
        .bind(booking.court_id.into_uuid())
        .bind(booking.resources.coach.map(|c| c.into_uuid()))
        .bind(booking.start_time)
        .bind(booking.end_time)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to re-check booking overlap", e)
        })?;

        match holder {
            Some(other) => Err(AppError::conflict(format!(
                "Booking {} overlaps confirmed booking {other}",
                booking.id
            ))),
            None => Ok(()),
        }
    }

    /// Attach equipment lines to booking rows, preserving row order.
    async fn hydrate(&self, rows: Vec<BookingRow>) -> AppResult<Vec<Booking>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let line_rows = sqlx::query_as::<_, EquipmentLineRow>(
            "SELECT booking_id, equipment_id, quantity FROM booking_equipment \
             WHERE booking_id = ANY($1) ORDER BY booking_id, line_no",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load booking equipment", e)
        })?;

        let mut lines: HashMap<Uuid, Vec<EquipmentLine>> = HashMap::new();
        for row in line_rows {
            let booking_id = row.booking_id;
            lines
                .entry(booking_id)
                .or_default()
                .push(EquipmentLine::try_from(row)?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let equipment = lines.remove(&row.id).unwrap_or_default();
                row.into_booking(equipment)
            })
            .collect())
    }

    /// Load a booking with its row locked for the rest of the transaction.
    async fn load_locked(conn: &mut PgConnection, id: BookingId) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id.into_uuid())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock booking", e))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, EquipmentLineRow>(
            "SELECT booking_id, equipment_id, quantity FROM booking_equipment \
             WHERE booking_id = $1 ORDER BY line_no",
        )
        .bind(id.into_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load booking equipment", e)
        })?
        .into_iter()
        .map(EquipmentLine::try_from)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(Some(row.into_booking(lines)))
    }

    async fn write_lines(conn: &mut PgConnection, booking: &Booking) -> AppResult<()> {
        sqlx::query("DELETE FROM booking_equipment WHERE booking_id = $1")
            .bind(booking.id.into_uuid())
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear booking equipment", e)
            })?;

        for (line_no, line) in booking.resources.equipment.iter().enumerate() {
            sqlx::query(
                "INSERT INTO booking_equipment (booking_id, line_no, equipment_id, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(booking.id.into_uuid())
            .bind(i32::try_from(line_no).unwrap_or(i32::MAX))
            .bind(line.equipment_id.into_uuid())
            .bind(to_column(line.quantity, "quantity")?)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to save booking equipment", e)
            })?;
        }
        Ok(())
    }

    async fn apply_stock_delta(
        conn: &mut PgConnection,
        delta: &BTreeMap<EquipmentId, i64>,
    ) -> AppResult<()> {
        for (id, change) in delta {
            let quantity = i32::try_from(change.unsigned_abs())
                .map_err(|_| AppError::validation(format!("Quantity {change} is too large")))?;
            if *change > 0 {
                let result = sqlx::query(
                    "UPDATE equipment SET available_stock = available_stock - $2, updated_at = NOW() \
                     WHERE id = $1 AND available_stock >= $2",
                )
                .bind(id.into_uuid())
                .bind(quantity)
                .execute(&mut *conn)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reserve stock", e))?;
                if result.rows_affected() == 0 {
                    return Err(AppError::conflict(format!(
                        "Insufficient stock for equipment {id}: {quantity} requested"
                    )));
                }
            } else {
                sqlx::query(
                    "UPDATE equipment SET available_stock = LEAST(total_stock, available_stock + $2), \
                     updated_at = NOW() WHERE id = $1",
                )
                .bind(id.into_uuid())
                .bind(quantity)
                .execute(&mut *conn)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release stock", e))?;
            }
        }
        Ok(())
    }

    async fn write_row(conn: &mut PgConnection, booking: &Booking, insert: bool) -> AppResult<()> {
        let sql = if insert {
            "INSERT INTO bookings (id, user_name, user_email, user_phone, court_id, coach_id, \
             start_time, end_time, status, base_price, peak_hour_fee, weekend_fee, equipment_fee, \
             coach_fee, total, notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
        } else {
            "UPDATE bookings SET user_name = $2, user_email = $3, user_phone = $4, court_id = $5, \
             coach_id = $6, start_time = $7, end_time = $8, status = $9, base_price = $10, \
             peak_hour_fee = $11, weekend_fee = $12, equipment_fee = $13, coach_fee = $14, \
             total = $15, notes = $16, created_at = $17, updated_at = $18 WHERE id = $1"
        };
        let price = &booking.pricing_breakdown;
        sqlx::query(sql)
            .bind(booking.id.into_uuid())
            .bind(&booking.user.name)
            .bind(&booking.user.email)
            .bind(&booking.user.phone)
            .bind(booking.court_id.into_uuid())
            .bind(booking.resources.coach.map(|c| c.into_uuid()))
            .bind(booking.start_time)
            .bind(booking.end_time)
            .bind(booking.status)
            .bind(price.base_price)
            .bind(price.peak_hour_fee)
            .bind(price.weekend_fee)
            .bind(price.equipment_fee)
            .bind(price.coach_fee)
            .bind(price.total)
            .bind(&booking.notes)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .execute(conn)
            .await
            .map_err(|e| write_error(e, "Failed to save booking"))?;
        Ok(())
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn find_by_id(&self, id: BookingId) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking", e))?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR status::text = $1) \
                             AND ($2::uuid IS NULL OR court_id = $2) \
                             AND ($3::timestamptz IS NULL OR (start_time >= $3 AND start_time < $4))";
        let status = filter.status.map(|s| s.as_str());
        let court = filter.court_id.map(|c| c.into_uuid());
        let window_start = filter.starts_within.map(|w| w.start());
        let window_end = filter.starts_within.map(|w| w.end());

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM bookings {WHERE}"))
            .bind(status)
            .bind(court)
            .bind(window_start)
            .bind(window_end)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count bookings", e))?;

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT * FROM bookings {WHERE} ORDER BY start_time, created_at LIMIT $5 OFFSET $6"
        ))
        .bind(status)
        .bind(court)
        .bind(window_start)
        .bind(window_end)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list bookings", e))?;

        Ok(PageResponse::new(
            self.hydrate(rows).await?,
            page.page,
            page.limit(),
            total.max(0) as u64,
        ))
    }

    async fn find_confirmed_overlapping(
        &self,
        scope: ResourceScope,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<Booking>> {
        let (sql, resource) = match scope {
            ResourceScope::Court(id) => (
                format!("SELECT * FROM bookings WHERE court_id = $1 AND {OVERLAP_CLAUSE} ORDER BY start_time"),
                id.into_uuid(),
            ),
            ResourceScope::Coach(id) => (
                format!("SELECT * FROM bookings WHERE coach_id = $1 AND {OVERLAP_CLAUSE} ORDER BY start_time"),
                id.into_uuid(),
            ),
            ResourceScope::Equipment(id) => (
                format!(
                    "SELECT * FROM bookings WHERE EXISTS (SELECT 1 FROM booking_equipment be \
                     WHERE be.booking_id = bookings.id AND be.equipment_id = $1) \
                     AND {OVERLAP_CLAUSE} ORDER BY start_time"
                ),
                id.into_uuid(),
            ),
        };

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(resource)
            .bind(interval.start())
            .bind(interval.end())
            .bind(exclude.map(|id| id.into_uuid()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to scan overlapping bookings", e)
            })?;
        self.hydrate(rows).await
    }

    async fn insert(&self, booking: &Booking) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        if booking.is_confirmed() {
            Self::lock_resources(&mut tx, &AdvisoryKey::for_booking(booking)).await?;
            Self::ensure_unclaimed(&mut tx, booking).await?;
        }
        Self::write_row(&mut tx, booking, true).await?;
        Self::write_lines(&mut tx, booking).await?;
        if booking.is_confirmed() {
            let delta: BTreeMap<EquipmentId, i64> = booking
                .equipment_totals()
                .into_iter()
                .map(|(id, qty)| (id, i64::from(qty)))
                .collect();
            Self::apply_stock_delta(&mut tx, &delta).await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit booking", e)
        })?;
        Ok(booking.clone())
    }

    async fn cancel(&self, id: BookingId) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let previous = Self::load_locked(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;
        if previous.status == BookingStatus::Cancelled {
            return Err(AppError::already_cancelled(format!(
                "Booking {id} is already cancelled"
            )));
        }

        let mut cancelled = previous.clone();
        cancelled.status = BookingStatus::Cancelled;
        cancelled.updated_at = Utc::now();

        Self::write_row(&mut tx, &cancelled, false).await?;
        Self::apply_stock_delta(&mut tx, &stock_delta(&previous, &cancelled)).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit cancellation", e)
        })?;
        Ok(cancelled)
    }

    async fn replace(&self, previous: &Booking, updated: &Booking) -> AppResult<Booking> {
        if previous.id != updated.id {
            return Err(AppError::validation("Replacement must keep the booking id"));
        }
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        if updated.is_confirmed() {
            let mut keys = AdvisoryKey::for_booking(previous);
            keys.extend(AdvisoryKey::for_booking(updated));
            Self::lock_resources(&mut tx, &keys).await?;
        }
        let stored = Self::load_locked(&mut tx, previous.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", previous.id)))?;
        if stored.status != previous.status || stored.updated_at != previous.updated_at {
            return Err(AppError::conflict(format!(
                "Booking {} was modified concurrently",
                previous.id
            )));
        }

        Self::ensure_unclaimed(&mut tx, updated).await?;
        Self::write_row(&mut tx, updated, false).await?;
        Self::write_lines(&mut tx, updated).await?;
        Self::apply_stock_delta(&mut tx, &stock_delta(previous, updated)).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit booking update", e)
        })?;
        Ok(updated.clone())
    }

    async fn confirmed_equipment_totals(&self) -> AppResult<BTreeMap<EquipmentId, u32>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT be.equipment_id, SUM(be.quantity)::BIGINT FROM booking_equipment be \
             JOIN bookings b ON b.id = be.booking_id \
             WHERE b.status = 'confirmed' GROUP BY be.equipment_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to total confirmed equipment", e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, total)| {
                (
                    EquipmentId::from_uuid(id),
                    u32::try_from(total.max(0)).unwrap_or(u32::MAX),
                )
            })
            .collect())
    }

    async fn recount_stock(&self, id: EquipmentId) -> AppResult<Option<StockCount>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Self::lock_resources(&mut tx, &BTreeSet::from([AdvisoryKey::equipment(id)])).await?;

        let counters: Option<(i32, i32)> = sqlx::query_as(
            "SELECT total_stock, available_stock FROM equipment WHERE id = $1 FOR UPDATE",
        )
        .bind(id.into_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock equipment", e))?;
        let Some((total, counter)) = counters else {
            return Ok(None);
        };

        let held: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(be.quantity), 0)::BIGINT FROM booking_equipment be \
             JOIN bookings b ON b.id = be.booking_id \
             WHERE b.status = 'confirmed' AND be.equipment_id = $1",
        )
        .bind(id.into_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to total held equipment", e)
        })?;

        let count = StockCount {
            total: to_count(total, "total_stock")?,
            held: u32::try_from(held.max(0)).unwrap_or(u32::MAX),
            counter: to_count(counter, "available_stock")?,
        };
        if count.drifted() {
            sqlx::query(
                "UPDATE equipment SET available_stock = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id.into_uuid())
            .bind(to_column(count.expected(), "available_stock")?)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to reset stock counter", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit stock recount", e)
        })?;
        Ok(Some(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtbook_entity::booking::{BookingResources, ContactInfo};
    use courtbook_entity::pricing::PricingBreakdown;

    fn booking(court_id: CourtId, coach: Option<CoachId>, lines: Vec<EquipmentLine>) -> Booking {
        let now = Utc::now();
        Booking {
            id: BookingId::new(),
            user: ContactInfo::new("Ada", "ada@example.com", "555-0101"),
            court_id,
            start_time: now,
            end_time: now + chrono::Duration::hours(1),
            resources: BookingResources {
                equipment: lines,
                coach,
            },
            status: BookingStatus::Confirmed,
            pricing_breakdown: PricingBreakdown::from_base(20.0),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_advisory_keys_separate_resource_kinds() {
        let id = Uuid::new_v4();
        let court = AdvisoryKey::court(CourtId::from_uuid(id));
        let coach = AdvisoryKey::coach(CoachId::from_uuid(id));
        let item = AdvisoryKey::equipment(EquipmentId::from_uuid(id));
        assert_ne!(court, coach);
        assert_ne!(coach, item);
        assert_eq!(court, AdvisoryKey::court(CourtId::from_uuid(id)));
    }

    #[test]
    fn test_booking_keys_are_distinct_and_ordered() {
        let item = EquipmentId::new();
        let b = booking(
            CourtId::new(),
            Some(CoachId::new()),
            vec![EquipmentLine::new(item, 1), EquipmentLine::new(item, 2)],
        );
        let keys: Vec<_> = AdvisoryKey::for_booking(&b).into_iter().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
