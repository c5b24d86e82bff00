use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::str::FromStr;
use tracing::info;

use crate::types::{MatchFormat, MatchRecord, Officials, Player, SquadMembership};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS matches (
        match_id TEXT PRIMARY KEY,
        teams TEXT NOT NULL,
        match_name TEXT,
        format TEXT,
        winner TEXT,
        venue TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS officials (
        match_id TEXT PRIMARY KEY REFERENCES matches(match_id),
        umpire_1 TEXT,
        umpire_2 TEXT,
        tv_umpire TEXT,
        match_referee TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS players (
        player_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        role TEXT,
        birth_date TEXT,
        birth_place TEXT,
        nickname TEXT,
        height TEXT,
        batting_style TEXT,
        bowling_style TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS squad_memberships (
        squad_id INTEGER PRIMARY KEY AUTOINCREMENT,
        match_id TEXT NOT NULL,
        player_id INTEGER NOT NULL REFERENCES players(player_id),
        team TEXT NOT NULL,
        UNIQUE (match_id, player_id)
    )
    "#,
];

const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS squad_memberships",
    "DROP TABLE IF EXISTS players",
    "DROP TABLE IF EXISTS officials",
    "DROP TABLE IF EXISTS matches",
];

/// What happened to a player row in [`Store::save_squad_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquadWrite {
    pub player_inserted: bool,
    pub membership_inserted: bool,
}

/// SQLite-backed store for matches, officials, players and squads.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if needed) the database at `url` and ensures the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in CREATE_TABLES {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Drops and recreates every table.
    pub async fn reset_schema(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for statement in DROP_TABLES {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        for statement in CREATE_TABLES {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("Recreated database schema");
        Ok(())
    }

    /// Replaces the whole matches and officials tables in one transaction.
    pub async fn replace_matches(&self, matches: &[MatchRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM officials").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM matches").execute(&mut *tx).await?;

        for m in matches {
            sqlx::query(
                r#"
                INSERT INTO matches (match_id, teams, match_name, format, winner, venue)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&m.match_id)
            .bind(&m.teams)
            .bind(&m.match_name)
            .bind(m.format.as_str())
            .bind(&m.winner)
            .bind(&m.venue)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO officials (match_id, umpire_1, umpire_2, tv_umpire, match_referee)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&m.match_id)
            .bind(&m.officials.umpire_1)
            .bind(&m.officials.umpire_2)
            .bind(&m.officials.tv_umpire)
            .bind(&m.officials.match_referee)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Stored {} matches", matches.len());
        Ok(())
    }

    /// Every stored match with its officials, ordered by match id.
    pub async fn matches(&self) -> Result<Vec<MatchRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT m.match_id, m.teams, m.match_name, m.format, m.winner, m.venue,
                   o.umpire_1, o.umpire_2, o.tv_umpire, o.match_referee
            FROM matches m
            LEFT JOIN officials o ON o.match_id = m.match_id
            ORDER BY m.match_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let matches = rows.iter().map(match_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(matches)
    }

    pub async fn match_ids(&self) -> Result<Vec<String>, StoreError> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT match_id FROM matches ORDER BY match_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn player_exists(&self, player_id: i64) -> Result<bool, StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT player_id FROM players WHERE player_id = ?")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn player(&self, player_id: i64) -> Result<Option<Player>, StoreError> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            SELECT player_id, name, role, birth_date, birth_place, nickname,
                   height, batting_style, bowling_style
            FROM players WHERE player_id = ?
            "#,
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }

    pub async fn squad(&self, match_id: &str) -> Result<Vec<SquadMembership>, StoreError> {
        let rows = sqlx::query_as::<_, SquadMembership>(
            "SELECT match_id, player_id, team FROM squad_memberships WHERE match_id = ? ORDER BY squad_id",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Writes one squad sighting atomically.
    ///
    /// A new player is inserted with all fields; an existing one only gets
    /// its name and role refreshed. The membership row is added unless the
    /// (match, player) pair is already present.
    pub async fn save_squad_entry(
        &self,
        player: &Player,
        membership: &SquadMembership,
    ) -> Result<SquadWrite, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existed: Option<i64> = sqlx::query_scalar("SELECT player_id FROM players WHERE player_id = ?")
            .bind(player.player_id)
            .fetch_optional(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO players (
                player_id, name, role,
                birth_date, birth_place, nickname,
                height, batting_style, bowling_style
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (player_id) DO UPDATE SET
                name = excluded.name,
                role = excluded.role
            "#,
        )
        .bind(player.player_id)
        .bind(&player.name)
        .bind(&player.role)
        .bind(&player.profile.birth_date)
        .bind(&player.profile.birth_place)
        .bind(&player.profile.nickname)
        .bind(&player.profile.height)
        .bind(&player.profile.batting_style)
        .bind(&player.profile.bowling_style)
        .execute(&mut *tx)
        .await?;

        let membership_result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO squad_memberships (match_id, player_id, team)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&membership.match_id)
        .bind(membership.player_id)
        .bind(&membership.team)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SquadWrite {
            player_inserted: existed.is_none(),
            membership_inserted: membership_result.rows_affected() > 0,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn match_from_row(row: &SqliteRow) -> Result<MatchRecord, sqlx::Error> {
    let format: Option<String> = row.try_get("format")?;
    let format = format
        .as_deref()
        .map(MatchFormat::from_str)
        .and_then(Result::ok)
        .unwrap_or(MatchFormat::Unknown);

    Ok(MatchRecord {
        match_id: row.try_get("match_id")?,
        teams: row.try_get("teams")?,
        match_name: row.try_get::<Option<String>, _>("match_name")?.unwrap_or_default(),
        format,
        winner: row.try_get::<Option<String>, _>("winner")?.unwrap_or_default(),
        venue: row.try_get::<Option<String>, _>("venue")?.unwrap_or_default(),
        officials: Officials {
            umpire_1: row.try_get("umpire_1")?,
            umpire_2: row.try_get("umpire_2")?,
            tv_umpire: row.try_get("tv_umpire")?,
            match_referee: row.try_get("match_referee")?,
        },
    })
}
