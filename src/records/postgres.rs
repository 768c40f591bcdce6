use super::*;
use std::sync::Arc;
use tokio_postgres::Client;

pub const ROUND_TABLE: &str = "round_records";
pub const SUMMARY_TABLE: &str = "session_summaries";

/// Persists records into PostgreSQL. Tables are created on connect.
pub struct PostgresRecorder {
    client: Arc<Client>,
}

impl PostgresRecorder {
    /// Connects to `url`, runs migrations, and spawns the connection driver.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        log::info!("[recorder] connecting to database");
        let tls = tokio_postgres::tls::NoTls;
        let (client, connection) = tokio_postgres::connect(url, tls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("[recorder] database connection closed: {}", e);
            }
        });
        client
            .execute("SET client_min_messages TO WARNING", &[])
            .await?;
        client.batch_execute(Self::creates()).await?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            ROUND_TABLE,
            " (
                room        TEXT             NOT NULL,
                round       BIGINT           NOT NULL,
                slot        BIGINT           NOT NULL,
                subject     TEXT             NOT NULL,
                partner     BIGINT,
                choice      BIGINT,
                frequency   BIGINT           NOT NULL,
                mean        DOUBLE PRECISION NOT NULL,
                noise       DOUBLE PRECISION NOT NULL,
                payoff      DOUBLE PRECISION NOT NULL,
                condition   TEXT             NOT NULL,
                paid        BOOLEAN          NOT NULL,
                timed_out   BOOLEAN          NOT NULL,
                reaction_ms BIGINT,
                chosen_at   BIGINT,
                team_mean   DOUBLE PRECISION,
                recorded_at BIGINT           NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ",
            SUMMARY_TABLE,
            " (
                room            TEXT             NOT NULL,
                slot            BIGINT           NOT NULL,
                subject         TEXT             NOT NULL,
                total           DOUBLE PRECISION NOT NULL,
                waiting_bonus   DOUBLE PRECISION NOT NULL,
                rounds_answered BIGINT           NOT NULL,
                rounds_played   BIGINT           NOT NULL,
                reason          TEXT             NOT NULL,
                recorded_at     BIGINT           NOT NULL
            );"
        )
    }
    fn inserts_round() -> &'static str {
        const_format::concatcp!(
            "INSERT INTO ",
            ROUND_TABLE,
            " (room, round, slot, subject, partner, choice, frequency, mean, noise, payoff,
               condition, paid, timed_out, reaction_ms, chosen_at, team_mean, recorded_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"
        )
    }
    fn inserts_summary() -> &'static str {
        const_format::concatcp!(
            "INSERT INTO ",
            SUMMARY_TABLE,
            " (room, slot, subject, total, waiting_bonus, rounds_answered, rounds_played,
               reason, recorded_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        )
    }
}

#[async_trait::async_trait]
impl Recorder for PostgresRecorder {
    async fn record(&self, record: Record) -> anyhow::Result<()> {
        match record {
            Record::Round(r) => {
                let condition = r.payoff.condition.to_string();
                self.client
                    .execute(
                        Self::inserts_round(),
                        &[
                            &r.room,
                            &(r.round as i64),
                            &(r.slot as i64),
                            &r.subject,
                            &r.partner.map(|p| p as i64),
                            &r.payoff.choice.map(|c| c as i64),
                            &(r.payoff.frequency as i64),
                            &r.payoff.mean,
                            &r.payoff.noise,
                            &r.payoff.payoff,
                            &condition,
                            &r.payoff.paid,
                            &r.timed_out,
                            &r.reaction_ms.map(|ms| ms as i64),
                            &r.chosen_at.map(|t| t as i64),
                            &r.payoff.team_mean,
                            &(r.recorded_at as i64),
                        ],
                    )
                    .await?;
            }
            Record::Summary(s) => {
                let reason = s.reason.to_string();
                self.client
                    .execute(
                        Self::inserts_summary(),
                        &[
                            &s.room,
                            &(s.slot as i64),
                            &s.subject,
                            &s.total,
                            &s.waiting_bonus,
                            &(s.rounds_answered as i64),
                            &(s.rounds_played as i64),
                            &reason,
                            &(s.recorded_at as i64),
                        ],
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
