//! Highlight catalog repository.

use sqlx::{Row, SqlitePool};

use bais_models::{HighlightCategory, HighlightRecord};

use crate::error::{DbError, DbResult};

use super::parse_ts;

/// Sort order for highlight listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightSort {
    /// Newest match first
    #[default]
    Latest,
    Oldest,
    Name,
}

impl HighlightSort {
    pub fn from_str(s: &str) -> Self {
        match s {
            "oldest" => HighlightSort::Oldest,
            "name" => HighlightSort::Name,
            _ => HighlightSort::Latest,
        }
    }

    fn order_clause(&self) -> &'static str {
        match self {
            HighlightSort::Latest => "match_date DESC",
            HighlightSort::Oldest => "match_date ASC",
            HighlightSort::Name => "title ASC",
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Clone, Default)]
pub struct HighlightQuery {
    pub category: Option<HighlightCategory>,
    /// Case-insensitive title substring
    pub search: Option<String>,
    pub sort: HighlightSort,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

/// One page of highlight results.
#[derive(Debug, Clone)]
pub struct HighlightPage {
    pub highlights: Vec<HighlightRecord>,
    pub has_next: bool,
}

/// Repository for the curated highlight catalog.
pub struct HighlightRepository {
    pool: SqlitePool,
}

impl HighlightRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, highlight: &HighlightRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO highlights
                (highlight_id, title, category_code, file_key, match_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&highlight.highlight_id)
        .bind(&highlight.title)
        .bind(highlight.category.code() as i64)
        .bind(&highlight.file_key)
        .bind(highlight.match_date.to_rfc3339())
        .bind(highlight.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, highlight_id: &str) -> DbResult<Option<HighlightRecord>> {
        let row = sqlx::query("SELECT * FROM highlights WHERE highlight_id = ?")
            .bind(highlight_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_highlight).transpose()
    }

    /// Browse/search the catalog with pagination. Fetches one row past
    /// the page to detect whether more results exist.
    pub async fn list(&self, query: &HighlightQuery) -> DbResult<HighlightPage> {
        let page = query.page.max(1);
        let page_size = query.page_size.max(1);
        let offset = (page - 1) * page_size;

        let mut sql = String::from("SELECT * FROM highlights WHERE 1 = 1");
        if query.category.is_some() {
            sql.push_str(" AND category_code = ?");
        }
        if query.search.is_some() {
            sql.push_str(" AND title LIKE ? COLLATE NOCASE");
        }
        sql.push_str(&format!(
            " ORDER BY {} LIMIT ? OFFSET ?",
            query.sort.order_clause()
        ));

        let mut q = sqlx::query(&sql);
        if let Some(category) = query.category {
            q = q.bind(category.code() as i64);
        }
        if let Some(search) = &query.search {
            q = q.bind(format!("%{}%", search));
        }
        q = q.bind(page_size as i64 + 1).bind(offset as i64);

        let rows = q.fetch_all(&self.pool).await?;
        let has_next = rows.len() > page_size as usize;

        let highlights = rows
            .into_iter()
            .take(page_size as usize)
            .map(row_to_highlight)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(HighlightPage {
            highlights,
            has_next,
        })
    }
}

fn row_to_highlight(row: sqlx::sqlite::SqliteRow) -> DbResult<HighlightRecord> {
    let code = row.get::<i64, _>("category_code") as u16;
    let category = HighlightCategory::from_code(code)
        .ok_or_else(|| DbError::invalid_row(format!("unknown category code {}", code)))?;

    Ok(HighlightRecord {
        highlight_id: row.get("highlight_id"),
        title: row.get("title"),
        category,
        file_key: row.get("file_key"),
        match_date: parse_ts(&row.get::<String, _>("match_date"))?,
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{Duration, Utc};

    async fn seeded_repo() -> HighlightRepository {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let repo = HighlightRepository::new(db.pool().clone());

        let base = Utc::now();
        for (i, title) in ["Lions sweep", "Twins rally", "Eagles shutout"]
            .iter()
            .enumerate()
        {
            repo.create(&HighlightRecord::new(
                *title,
                HighlightCategory::Kbo,
                format!("highlights/{}.mp4", i),
                base - Duration::days(i as i64),
            ))
            .await
            .unwrap();
        }
        repo.create(&HighlightRecord::new(
            "Gold medal game",
            HighlightCategory::AsianGames,
            "highlights/gold.mp4",
            base - Duration::days(10),
        ))
        .await
        .unwrap();

        repo
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let repo = seeded_repo().await;

        let page = repo
            .list(&HighlightQuery {
                category: Some(HighlightCategory::AsianGames),
                page: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.highlights.len(), 1);
        assert_eq!(page.highlights[0].title, "Gold medal game");
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_list_search_and_sort() {
        let repo = seeded_repo().await;

        let page = repo
            .list(&HighlightQuery {
                search: Some("rally".to_string()),
                page: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.highlights.len(), 1);

        let sorted = repo
            .list(&HighlightQuery {
                category: Some(HighlightCategory::Kbo),
                sort: HighlightSort::Name,
                page: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sorted.highlights[0].title, "Eagles shutout");
    }

    #[tokio::test]
    async fn test_pagination_detects_next_page() {
        let repo = seeded_repo().await;

        let first = repo
            .list(&HighlightQuery {
                category: Some(HighlightCategory::Kbo),
                page: 1,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(first.highlights.len(), 2);
        assert!(first.has_next);

        let second = repo
            .list(&HighlightQuery {
                category: Some(HighlightCategory::Kbo),
                page: 2,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(second.highlights.len(), 1);
        assert!(!second.has_next);
    }
}
