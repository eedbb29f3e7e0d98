//! Embedded schema, applied statement-by-statement at startup.

pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id            TEXT PRIMARY KEY,
        email              TEXT NOT NULL UNIQUE,
        password_hash      TEXT NOT NULL,
        favorite_team      TEXT,
        free_play_used     INTEGER NOT NULL DEFAULT 0,
        storage_used_bytes INTEGER NOT NULL DEFAULT 0,
        created_at         TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS uploads (
        upload_id      TEXT PRIMARY KEY,
        user_id        TEXT NOT NULL,
        title          TEXT NOT NULL,
        file_key       TEXT NOT NULL,
        local_path     TEXT,
        status_code    INTEGER NOT NULL,
        analyst_code   INTEGER NOT NULL,
        download_count INTEGER NOT NULL DEFAULT 0,
        active         INTEGER NOT NULL DEFAULT 1,
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_uploads_user_active
        ON uploads(user_id, active)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subtitles (
        subtitle_id  TEXT PRIMARY KEY,
        upload_id    TEXT NOT NULL UNIQUE,
        analyst_code INTEGER NOT NULL,
        payload      BLOB NOT NULL,
        created_at   TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subscriptions (
        subscription_id TEXT PRIMARY KEY,
        user_id         TEXT NOT NULL,
        plan            TEXT NOT NULL,
        started_at      TEXT NOT NULL,
        ended_at        TEXT,
        created_at      TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_subscriptions_user
        ON subscriptions(user_id, started_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        payment_id      TEXT PRIMARY KEY,
        subscription_id TEXT NOT NULL,
        amount          INTEGER NOT NULL,
        transaction_id  TEXT NOT NULL,
        paid_at         TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS highlights (
        highlight_id  TEXT PRIMARY KEY,
        title         TEXT NOT NULL,
        category_code INTEGER NOT NULL,
        file_key      TEXT NOT NULL,
        match_date    TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_highlights_category
        ON highlights(category_code, match_date)
    "#,
];
