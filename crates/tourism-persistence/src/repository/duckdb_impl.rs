//! DuckDB repository implementation.
//!
//! A single embedded connection backs every repository trait. DuckDB's
//! columnar engine does the filtering, grouping and aggregation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use duckdb::{Connection, params, params_from_iter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::traits::*;
use crate::error::{PersistenceError, Result};
use tourism_domain::{
    ArrivalRecord, CacheEntry, DateRange, EconomicRecord, ForecastRecord, Granularity,
    OccupancyRecord, RecordFilter,
};

const SCHEMA: &str = r"
    -- Visitor arrivals fact table
    CREATE TABLE IF NOT EXISTS visitor_arrivals (
        date DATE NOT NULL,
        location VARCHAR NOT NULL,
        origin VARCHAR,
        arrival_count BIGINT NOT NULL,
        arrival_type VARCHAR NOT NULL
    );

    CREATE TABLE IF NOT EXISTS hotel_occupancy (
        date DATE NOT NULL,
        location VARCHAR NOT NULL,
        occupancy_rate DOUBLE NOT NULL,
        adr DOUBLE NOT NULL,
        revpar DOUBLE
    );

    CREATE TABLE IF NOT EXISTS economic_indicators (
        date DATE NOT NULL,
        unemployment_rate DOUBLE NOT NULL,
        visitor_spending_millions DOUBLE NOT NULL,
        gdp_growth_rate DOUBLE
    );

    -- Forecast history, appended on every generation
    CREATE TABLE IF NOT EXISTS tourism_forecasts (
        forecast_id VARCHAR PRIMARY KEY,
        forecast_date DATE NOT NULL,
        target_date DATE NOT NULL,
        location VARCHAR NOT NULL,
        predicted_arrivals BIGINT NOT NULL,
        confidence_lower BIGINT NOT NULL,
        confidence_upper BIGINT NOT NULL,
        model_name VARCHAR NOT NULL,
        created_at TIMESTAMP NOT NULL
    );

    -- Append-only query cache; several rows may share a query_hash
    CREATE TABLE IF NOT EXISTS analytics_cache (
        entry_id VARCHAR PRIMARY KEY,
        query_hash VARCHAR NOT NULL,
        results VARCHAR NOT NULL,
        created_at TIMESTAMP NOT NULL,
        expires_at TIMESTAMP NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_arrivals_date ON visitor_arrivals(date);
    CREATE INDEX IF NOT EXISTS idx_arrivals_location ON visitor_arrivals(location);
    CREATE INDEX IF NOT EXISTS idx_occupancy_date ON hotel_occupancy(date);
    CREATE INDEX IF NOT EXISTS idx_economic_date ON economic_indicators(date);
    CREATE INDEX IF NOT EXISTS idx_forecasts_location ON tourism_forecasts(location);
    CREATE INDEX IF NOT EXISTS idx_cache_hash ON analytics_cache(query_hash);
";

/// DuckDB-backed record store.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl DuckDbStore {
    /// Open an in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) a store backed by a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }

    fn query_rows<T, F>(&self, sql: &str, args: &[String], map: F) -> Result<Vec<T>>
    where
        F: FnMut(&duckdb::Row<'_>) -> duckdb::Result<T>,
    {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), map)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(PersistenceError::from)
    }

    /// Export the forecast history to a Parquet file.
    pub fn export_forecasts_to_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let target = path.as_ref().display().to_string().replace('\'', "''");
        let query = format!("COPY tourism_forecasts TO '{target}' (FORMAT PARQUET)");
        self.conn()?.execute(&query, [])?;
        Ok(())
    }
}

// =============================================================================
// SQL HELPERS
// =============================================================================

/// WHERE clause for a record filter plus its positional arguments.
fn filter_clause(filter: &RecordFilter) -> (String, Vec<String>) {
    let mut sql = "date >= CAST(? AS DATE) AND date <= CAST(? AS DATE)".to_string();
    let mut args = vec![filter.range.start.to_string(), filter.range.end.to_string()];

    if !filter.locations.is_empty() {
        let placeholders = vec!["?"; filter.locations.len()].join(", ");
        sql.push_str(&format!(" AND location IN ({placeholders})"));
        args.extend(filter.locations.iter().cloned());
    }

    (sql, args)
}

const fn period_expr(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Day => "CAST(date AS VARCHAR)",
        Granularity::Month => "strftime(date, '%Y-%m')",
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| PersistenceError::Conversion(format!("bad date '{raw}': {e}")))
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| PersistenceError::Conversion(format!("timestamp out of range: {ms}")))
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| PersistenceError::Conversion(e.to_string()))
}

// =============================================================================
// ARRIVALS
// =============================================================================

#[async_trait]
impl ArrivalRepository for DuckDbStore {
    async fn insert_arrivals(&self, records: &[ArrivalRecord]) -> Result<usize> {
        for record in records {
            record.validate()?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT INTO visitor_arrivals (date, location, origin, arrival_count, arrival_type)
                VALUES (CAST(? AS DATE), ?, ?, ?, ?)
                ",
            )?;
            for record in records {
                stmt.execute(params![
                    record.date.to_string(),
                    record.location,
                    record.origin,
                    record.count,
                    record.arrival_type.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    async fn arrivals_by_period(
        &self,
        filter: &RecordFilter,
        granularity: Granularity,
    ) -> Result<Vec<ArrivalGroup>> {
        let (clause, args) = filter_clause(filter);
        let period = period_expr(granularity);
        let sql = format!(
            r"
            SELECT
                {period} AS period,
                location,
                CAST(SUM(arrival_count) AS BIGINT) AS arrivals
            FROM visitor_arrivals
            WHERE {clause}
            GROUP BY period, location
            ORDER BY period, location
            "
        );

        self.query_rows(&sql, &args, |row| {
            Ok(ArrivalGroup {
                period: row.get(0)?,
                location: row.get(1)?,
                arrivals: row.get(2)?,
            })
        })
    }

    async fn top_origins(&self, filter: &RecordFilter, limit: usize) -> Result<Vec<OriginTotal>> {
        let (clause, args) = filter_clause(filter);
        let sql = format!(
            r"
            SELECT origin, CAST(SUM(arrival_count) AS BIGINT) AS total
            FROM visitor_arrivals
            WHERE {clause} AND origin IS NOT NULL
            GROUP BY origin
            ORDER BY total DESC, origin
            LIMIT {limit}
            "
        );

        self.query_rows(&sql, &args, |row| {
            Ok(OriginTotal {
                origin: row.get(0)?,
                arrivals: row.get(1)?,
            })
        })
    }

    async fn origin_breakdown(&self, filter: &RecordFilter) -> Result<Vec<OriginLocationTotal>> {
        let (clause, args) = filter_clause(filter);
        let sql = format!(
            r"
            SELECT origin, location, CAST(SUM(arrival_count) AS BIGINT) AS total
            FROM visitor_arrivals
            WHERE {clause} AND origin IS NOT NULL
            GROUP BY origin, location
            ORDER BY origin, location
            "
        );

        self.query_rows(&sql, &args, |row| {
            Ok(OriginLocationTotal {
                origin: row.get(0)?,
                location: row.get(1)?,
                arrivals: row.get(2)?,
            })
        })
    }

    async fn total_arrivals(&self, filter: &RecordFilter) -> Result<i64> {
        let (clause, args) = filter_clause(filter);
        let sql = format!(
            "SELECT CAST(COALESCE(SUM(arrival_count), 0) AS BIGINT) FROM visitor_arrivals WHERE {clause}"
        );

        let totals = self.query_rows(&sql, &args, |row| row.get::<_, i64>(0))?;
        Ok(totals.into_iter().next().unwrap_or(0))
    }

    async fn daily_totals(&self, filter: &RecordFilter) -> Result<Vec<DailyTotal>> {
        let (clause, args) = filter_clause(filter);
        let sql = format!(
            r"
            SELECT CAST(date AS VARCHAR), CAST(SUM(arrival_count) AS BIGINT)
            FROM visitor_arrivals
            WHERE {clause}
            GROUP BY date
            ORDER BY date
            "
        );

        let raw = self.query_rows(&sql, &args, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        raw.into_iter()
            .map(|(date, arrivals)| {
                Ok(DailyTotal {
                    date: parse_date(&date)?,
                    arrivals,
                })
            })
            .collect()
    }

    async fn daily_history(&self, location: &str) -> Result<Vec<DailyTotal>> {
        let raw = self.query_rows(
            r"
            SELECT CAST(date AS VARCHAR), CAST(SUM(arrival_count) AS BIGINT)
            FROM visitor_arrivals
            WHERE location = ?
            GROUP BY date
            ORDER BY date
            ",
            &[location.to_string()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )?;
        raw.into_iter()
            .map(|(date, arrivals)| {
                Ok(DailyTotal {
                    date: parse_date(&date)?,
                    arrivals,
                })
            })
            .collect()
    }

    async fn average_count(&self, filter: &RecordFilter) -> Result<Option<f64>> {
        let (clause, args) = filter_clause(filter);
        let sql = format!("SELECT AVG(arrival_count) FROM visitor_arrivals WHERE {clause}");

        let averages = self.query_rows(&sql, &args, |row| row.get::<_, Option<f64>>(0))?;
        Ok(averages.into_iter().next().flatten())
    }

    async fn monthly_averages(&self, location: &str) -> Result<Vec<MonthlyAverage>> {
        self.query_rows(
            r"
            SELECT CAST(EXTRACT(MONTH FROM date) AS INTEGER) AS month, AVG(arrival_count)
            FROM visitor_arrivals
            WHERE location = ?
            GROUP BY month
            ORDER BY month
            ",
            &[location.to_string()],
            |row| {
                Ok(MonthlyAverage {
                    month: row.get(0)?,
                    average_arrivals: row.get(1)?,
                })
            },
        )
    }
}

// =============================================================================
// OCCUPANCY
// =============================================================================

#[async_trait]
impl OccupancyRepository for DuckDbStore {
    async fn insert_occupancy(&self, records: &[OccupancyRecord]) -> Result<usize> {
        for record in records {
            record.validate()?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT INTO hotel_occupancy (date, location, occupancy_rate, adr, revpar)
                VALUES (CAST(? AS DATE), ?, ?, ?, ?)
                ",
            )?;
            for record in records {
                stmt.execute(params![
                    record.date.to_string(),
                    record.location,
                    record.occupancy_rate,
                    record.average_daily_rate,
                    record.revenue_per_available_room,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    async fn occupancy_by_period(
        &self,
        filter: &RecordFilter,
        granularity: Granularity,
    ) -> Result<Vec<OccupancyGroup>> {
        let (clause, args) = filter_clause(filter);
        let period = period_expr(granularity);
        let sql = format!(
            r"
            SELECT
                {period} AS period,
                location,
                ROUND(AVG(occupancy_rate), 1),
                ROUND(AVG(adr), 2),
                ROUND(AVG(revpar), 2)
            FROM hotel_occupancy
            WHERE {clause}
            GROUP BY period, location
            ORDER BY period, location
            "
        );

        self.query_rows(&sql, &args, |row| {
            Ok(OccupancyGroup {
                period: row.get(0)?,
                location: row.get(1)?,
                occupancy_rate: row.get(2)?,
                average_daily_rate: row.get(3)?,
                revenue_per_available_room: row.get(4)?,
            })
        })
    }

    async fn occupancy_stats(&self, filter: &RecordFilter) -> Result<Option<OccupancyStats>> {
        let (clause, args) = filter_clause(filter);
        let sql = format!(
            r"
            SELECT
                COUNT(*),
                AVG(occupancy_rate),
                AVG(adr),
                MAX(occupancy_rate),
                MIN(occupancy_rate)
            FROM hotel_occupancy
            WHERE {clause}
            "
        );

        let rows = self.query_rows(&sql, &args, |row| {
            let count: i64 = row.get(0)?;
            if count == 0 {
                return Ok(None);
            }
            Ok(Some(OccupancyStats {
                average_occupancy: row.get(1)?,
                average_daily_rate: row.get(2)?,
                peak_occupancy: row.get(3)?,
                low_occupancy: row.get(4)?,
            }))
        })?;
        Ok(rows.into_iter().next().flatten())
    }

    async fn daily_occupancy(&self, filter: &RecordFilter) -> Result<Vec<DailyOccupancy>> {
        let (clause, args) = filter_clause(filter);
        let sql = format!(
            r"
            SELECT CAST(date AS VARCHAR), AVG(occupancy_rate), AVG(adr)
            FROM hotel_occupancy
            WHERE {clause}
            GROUP BY date
            ORDER BY date
            "
        );

        let raw = self.query_rows(&sql, &args, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;
        raw.into_iter()
            .map(|(date, occupancy_rate, average_daily_rate)| {
                Ok(DailyOccupancy {
                    date: parse_date(&date)?,
                    occupancy_rate,
                    average_daily_rate,
                })
            })
            .collect()
    }

    async fn occupancy_by_location(&self, filter: &RecordFilter) -> Result<Vec<LocationOccupancy>> {
        let (clause, args) = filter_clause(filter);
        let sql = format!(
            r"
            SELECT location, AVG(occupancy_rate), AVG(adr)
            FROM hotel_occupancy
            WHERE {clause}
            GROUP BY location
            ORDER BY location
            "
        );

        self.query_rows(&sql, &args, |row| {
            Ok(LocationOccupancy {
                location: row.get(0)?,
                occupancy_rate: row.get(1)?,
                average_daily_rate: row.get(2)?,
            })
        })
    }
}

// =============================================================================
// ECONOMIC INDICATORS
// =============================================================================

type RawIndicator = (String, f64, f64, Option<f64>);

fn indicator_from_raw((date, unemployment, spending, gdp): RawIndicator) -> Result<EconomicRecord> {
    Ok(EconomicRecord {
        date: parse_date(&date)?,
        unemployment_rate: unemployment,
        visitor_spending_millions: spending,
        gdp_growth_rate: gdp,
    })
}

#[async_trait]
impl EconomicRepository for DuckDbStore {
    async fn insert_indicators(&self, records: &[EconomicRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT INTO economic_indicators
                    (date, unemployment_rate, visitor_spending_millions, gdp_growth_rate)
                VALUES (CAST(? AS DATE), ?, ?, ?)
                ",
            )?;
            for record in records {
                stmt.execute(params![
                    record.date.to_string(),
                    record.unemployment_rate,
                    record.visitor_spending_millions,
                    record.gdp_growth_rate,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    async fn indicators_in_range(&self, range: &DateRange) -> Result<Vec<EconomicRecord>> {
        let raw = self.query_rows(
            r"
            SELECT CAST(date AS VARCHAR), unemployment_rate, visitor_spending_millions, gdp_growth_rate
            FROM economic_indicators
            WHERE date >= CAST(? AS DATE) AND date <= CAST(? AS DATE)
            ORDER BY date
            ",
            &[range.start.to_string(), range.end.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        raw.into_iter().map(indicator_from_raw).collect()
    }

    async fn latest_indicators(&self, limit: usize) -> Result<Vec<EconomicRecord>> {
        let sql = format!(
            r"
            SELECT CAST(date AS VARCHAR), unemployment_rate, visitor_spending_millions, gdp_growth_rate
            FROM economic_indicators
            ORDER BY date DESC
            LIMIT {limit}
            "
        );
        let raw = self.query_rows(&sql, &[], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        raw.into_iter().map(indicator_from_raw).collect()
    }
}

// =============================================================================
// FORECASTS
// =============================================================================

#[async_trait]
impl ForecastRepository for DuckDbStore {
    async fn insert_forecasts(&self, records: &[ForecastRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT INTO tourism_forecasts (
                    forecast_id, forecast_date, target_date, location, predicted_arrivals,
                    confidence_lower, confidence_upper, model_name, created_at
                ) VALUES (?, CAST(? AS DATE), CAST(? AS DATE), ?, ?, ?, ?, ?, epoch_ms(CAST(? AS BIGINT)))
                ",
            )?;
            for record in records {
                stmt.execute(params![
                    record.id.to_string(),
                    record.forecast_issue_date.to_string(),
                    record.target_date.to_string(),
                    record.location,
                    record.predicted_count,
                    record.lower_bound,
                    record.upper_bound,
                    record.model_name,
                    record.created_at.timestamp_millis(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    async fn forecast_history(&self, location: &str, limit: usize) -> Result<Vec<ForecastRecord>> {
        let sql = format!(
            r"
            SELECT
                forecast_id,
                CAST(forecast_date AS VARCHAR),
                CAST(target_date AS VARCHAR),
                location,
                predicted_arrivals,
                confidence_lower,
                confidence_upper,
                model_name,
                epoch_ms(created_at)
            FROM tourism_forecasts
            WHERE location = ?
            ORDER BY created_at DESC, forecast_date DESC, target_date
            LIMIT {limit}
            "
        );

        type RawForecast = (String, String, String, String, i64, i64, i64, String, i64);
        let raw: Vec<RawForecast> = self.query_rows(&sql, &[location.to_string()], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })?;

        raw.into_iter()
            .map(|(id, issued, target, location, predicted, lower, upper, model, created)| {
                Ok(ForecastRecord {
                    id: parse_uuid(&id)?,
                    forecast_issue_date: parse_date(&issued)?,
                    target_date: parse_date(&target)?,
                    location,
                    predicted_count: predicted,
                    lower_bound: lower,
                    upper_bound: upper,
                    model_name: model,
                    created_at: from_millis(created)?,
                })
            })
            .collect()
    }
}

// =============================================================================
// QUERY CACHE
// =============================================================================

#[async_trait]
impl QueryCacheRepository for DuckDbStore {
    async fn find_valid(&self, fingerprint: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        let raw = self.query_rows(
            r"
            SELECT entry_id, results, epoch_ms(created_at), epoch_ms(expires_at)
            FROM analytics_cache
            WHERE query_hash = ? AND expires_at > epoch_ms(CAST(? AS BIGINT))
            ORDER BY created_at DESC
            LIMIT 1
            ",
            &[fingerprint.to_string(), now.timestamp_millis().to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;

        raw.into_iter()
            .next()
            .map(|(id, payload, created, expires)| {
                Ok(CacheEntry {
                    id: parse_uuid(&id)?,
                    fingerprint: fingerprint.to_string(),
                    payload,
                    created_at: from_millis(created)?,
                    expires_at: from_millis(expires)?,
                })
            })
            .transpose()
    }

    async fn insert_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.conn()?.execute(
            r"
            INSERT INTO analytics_cache (entry_id, query_hash, results, created_at, expires_at)
            VALUES (?, ?, ?, epoch_ms(CAST(? AS BIGINT)), epoch_ms(CAST(? AS BIGINT)))
            ",
            params![
                entry.id.to_string(),
                entry.fingerprint,
                entry.payload,
                entry.created_at.timestamp_millis(),
                entry.expires_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    async fn count_entries(&self, fingerprint: &str) -> Result<usize> {
        let counts = self.query_rows(
            "SELECT COUNT(*) FROM analytics_cache WHERE query_hash = ?",
            &[fingerprint.to_string()],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(counts
            .into_iter()
            .next()
            .and_then(|c| usize::try_from(c).ok())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tourism_domain::DailyForecast;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> RecordFilter {
        RecordFilter::new(DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap())
    }

    async fn seeded_store() -> DuckDbStore {
        let store = DuckDbStore::open_in_memory().unwrap();
        let records = vec![
            ArrivalRecord::new(date(2024, 1, 1), "Oahu", 100).with_origin("California"),
            ArrivalRecord::new(date(2024, 1, 1), "Oahu", 50).with_origin("Texas"),
            ArrivalRecord::new(date(2024, 1, 2), "Oahu", 120).with_origin("California"),
            ArrivalRecord::new(date(2024, 1, 2), "Maui", 80).with_origin("Texas"),
            ArrivalRecord::new(date(2024, 2, 1), "Maui", 999).with_origin("Oregon"),
            ArrivalRecord::new(date(2024, 1, 3), "Kauai", 30),
        ];
        store.insert_arrivals(&records).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_store() {
        let store = DuckDbStore::open_in_memory().unwrap();
        assert_eq!(store.total_arrivals(&january()).await.unwrap(), 0);
        assert!(store.top_origins(&january(), 10).await.unwrap().is_empty());
        assert!(store.occupancy_stats(&january()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_arrivals_grouped_by_day_and_month() {
        let store = seeded_store().await;

        let daily = store
            .arrivals_by_period(&january(), Granularity::Day)
            .await
            .unwrap();
        assert_eq!(daily.len(), 4);
        assert_eq!(daily[0].period, "2024-01-01");
        assert_eq!(daily[0].location, "Oahu");
        assert_eq!(daily[0].arrivals, 150);

        let monthly = store
            .arrivals_by_period(&january(), Granularity::Month)
            .await
            .unwrap();
        let oahu = monthly.iter().find(|g| g.location == "Oahu").unwrap();
        assert_eq!(oahu.period, "2024-01");
        assert_eq!(oahu.arrivals, 270);
    }

    #[tokio::test]
    async fn test_location_filter_and_origins() {
        let store = seeded_store().await;
        let oahu = january().with_locations(["Oahu"]);

        assert_eq!(store.total_arrivals(&oahu).await.unwrap(), 270);

        let origins = store.top_origins(&january(), 10).await.unwrap();
        assert_eq!(origins[0].origin, "California");
        assert_eq!(origins[0].arrivals, 220);
        assert_eq!(origins[1].origin, "Texas");
        assert_eq!(origins.len(), 2);
    }

    #[tokio::test]
    async fn test_tied_origins_sorted_by_name() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let records: Vec<_> = ["Washington", "Alaska", "Texas", "Oregon"]
            .into_iter()
            .map(|origin| ArrivalRecord::new(date(2024, 1, 5), "Oahu", 40).with_origin(origin))
            .chain([ArrivalRecord::new(date(2024, 1, 6), "Oahu", 90).with_origin("Nevada")])
            .collect();
        store.insert_arrivals(&records).await.unwrap();

        let origins: Vec<String> = store
            .top_origins(&january(), 3)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.origin)
            .collect();
        assert_eq!(origins, vec!["Nevada", "Alaska", "Oregon"]);
    }

    #[tokio::test]
    async fn test_negative_arrivals_rejected() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let bad = ArrivalRecord::new(date(2024, 1, 1), "Oahu", -5);
        assert!(matches!(
            store.insert_arrivals(&[bad]).await,
            Err(PersistenceError::InvalidRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_occupancy_stats() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let records: Vec<_> = [70.0, 80.0, 90.0]
            .into_iter()
            .enumerate()
            .map(|(i, rate)| OccupancyRecord {
                date: date(2024, 1, 1 + i as u32),
                location: "Oahu".to_string(),
                occupancy_rate: rate,
                average_daily_rate: 250.0,
                revenue_per_available_room: None,
            })
            .collect();
        store.insert_occupancy(&records).await.unwrap();

        let stats = store.occupancy_stats(&january()).await.unwrap().unwrap();
        assert!((stats.average_occupancy - 80.0).abs() < 1e-9);
        assert!((stats.peak_occupancy - 90.0).abs() < 1e-9);
        assert!((stats.low_occupancy - 70.0).abs() < 1e-9);

        let groups = store
            .occupancy_by_period(&january(), Granularity::Month)
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].revenue_per_available_room.is_none());
    }

    #[tokio::test]
    async fn test_indicators_ordered_by_date() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let records = vec![
            EconomicRecord {
                date: date(2024, 3, 1),
                unemployment_rate: 3.1,
                visitor_spending_millions: 1800.0,
                gdp_growth_rate: None,
            },
            EconomicRecord {
                date: date(2024, 1, 1),
                unemployment_rate: 3.0,
                visitor_spending_millions: 1700.0,
                gdp_growth_rate: Some(2.1),
            },
        ];
        store.insert_indicators(&records).await.unwrap();

        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let in_range = store.indicators_in_range(&range).await.unwrap();
        assert_eq!(in_range[0].date, date(2024, 1, 1));
        assert_eq!(in_range[0].gdp_growth_rate, Some(2.1));

        let latest = store.latest_indicators(1).await.unwrap();
        assert_eq!(latest[0].date, date(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_forecast_history_round_trip() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let now = Utc::now();
        let day = DailyForecast::bounded(date(2024, 5, 1), "Maui", 3000, 2550, 3450);
        let record = ForecastRecord::from_daily(&day, date(2024, 5, 1), "baseline", now);

        let mut regenerated = record.clone();
        regenerated.id = Uuid::now_v7();

        store.insert_forecasts(&[record]).await.unwrap();
        store.insert_forecasts(&[regenerated]).await.unwrap();

        let history = store.forecast_history("Maui", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].predicted_count, 3000);
        assert_eq!(history[0].model_name, "baseline");
    }

    #[tokio::test]
    async fn test_cache_rows_are_appended_not_overwritten() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let t0 = Utc::now();

        let first = CacheEntry::new("fp", r#"{"v":1}"#.to_string(), t0, Duration::hours(1));
        store.insert_entry(&first).await.unwrap();

        let hit = store.find_valid("fp", t0 + Duration::minutes(5)).await.unwrap();
        assert_eq!(hit.unwrap().payload, r#"{"v":1}"#);

        let later = t0 + Duration::hours(2);
        assert!(store.find_valid("fp", later).await.unwrap().is_none());

        let second = CacheEntry::new("fp", r#"{"v":2}"#.to_string(), later, Duration::hours(1));
        store.insert_entry(&second).await.unwrap();

        assert_eq!(store.count_entries("fp").await.unwrap(), 2);
        let hit = store.find_valid("fp", later).await.unwrap().unwrap();
        assert_eq!(hit.payload, r#"{"v":2}"#);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tourism.duckdb");

        {
            let store = DuckDbStore::open(&path).unwrap();
            store
                .insert_arrivals(&[ArrivalRecord::new(date(2024, 1, 5), "Lanai", 42)])
                .await
                .unwrap();
        }

        let reopened = DuckDbStore::open(&path).unwrap();
        let history = reopened.daily_history("Lanai").await.unwrap();
        assert_eq!(history, vec![DailyTotal { date: date(2024, 1, 5), arrivals: 42 }]);
    }
}
