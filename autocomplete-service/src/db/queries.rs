use async_trait::async_trait;
use common::errors::AppError;
use common::models::City;
use sqlx::PgPool;
use tracing::instrument;

use crate::store::CityStore;

#[derive(sqlx::FromRow)]
pub struct CityRow {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        City {
            name: row.name,
            country: row.country,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

/// Escape `LIKE` metacharacters so the fragment matches literally.
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Postgres-backed city store
#[derive(Clone)]
pub struct PgCityStore {
    pool: PgPool,
}

impl PgCityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CityStore for PgCityStore {
    #[instrument(skip(self))]
    async fn query(
        &self,
        city: &str,
        country: Option<&str>,
        limit: usize,
    ) -> Result<Vec<City>, AppError> {
        let name_pattern = format!("%{}%", escape_like(city));
        let country_pattern = country
            .filter(|c| !c.is_empty())
            .map(|c| format!("{}%", escape_like(c)));

        let rows = sqlx::query_as::<_, CityRow>(
            r#"
            SELECT id, name, country, latitude, longitude, created_at
            FROM cities
            WHERE name ILIKE $1 ESCAPE '\'
              AND ($2::TEXT IS NULL OR country ILIKE $2 ESCAPE '\')
            ORDER BY id
            LIMIT $3
            "#,
        )
        .bind(name_pattern)
        .bind(country_pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(City::from).collect())
    }

    #[instrument(skip_all, fields(keys = keys.len()))]
    async fn find_existing(&self, keys: &[City]) -> Result<Vec<City>, AppError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<String> = keys.iter().map(|k| k.name.clone()).collect();
        let countries: Vec<String> = keys.iter().map(|k| k.country.clone()).collect();

        let rows = sqlx::query_as::<_, CityRow>(
            r#"
            SELECT DISTINCT c.id, c.name, c.country, c.latitude, c.longitude, c.created_at
            FROM cities c
            INNER JOIN UNNEST($1::TEXT[], $2::TEXT[]) AS k(name, country)
                ON LOWER(c.name) = LOWER(k.name) AND LOWER(c.country) = LOWER(k.country)
            ORDER BY c.id
            "#,
        )
        .bind(names)
        .bind(countries)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(City::from).collect())
    }

    #[instrument(skip_all, fields(count = cities.len()))]
    async fn insert_many(&self, cities: Vec<City>) -> Result<u64, AppError> {
        if cities.is_empty() {
            return Ok(0);
        }

        let mut names = Vec::with_capacity(cities.len());
        let mut countries = Vec::with_capacity(cities.len());
        let mut latitudes = Vec::with_capacity(cities.len());
        let mut longitudes = Vec::with_capacity(cities.len());
        for city in cities {
            names.push(city.name);
            countries.push(city.country);
            latitudes.push(city.latitude);
            longitudes.push(city.longitude);
        }

        // Rows hitting the unique pair index are skipped, the rest still land.
        let result = sqlx::query(
            r#"
            INSERT INTO cities (name, country, latitude, longitude)
            SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[], $3::FLOAT8[], $4::FLOAT8[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(names)
        .bind(countries)
        .bind(latitudes)
        .bind(longitudes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("São Paulo"), "São Paulo");
        assert_eq!(escape_like("100%_x"), "100\\%\\_x");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_row_conversion() {
        let row = CityRow {
            id: 1,
            name: "Paris".to_string(),
            country: "France".to_string(),
            latitude: Some(48.87),
            longitude: Some(2.33),
            created_at: chrono::Utc::now(),
        };

        assert_eq!(
            City::from(row),
            City::new("Paris", "France").with_coordinates(48.87, 2.33)
        );
    }
}
