use super::*;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only sink for records.
/// Implementations may be slow or fail; callers never block game state on them.
#[async_trait::async_trait]
pub trait Recorder: Send + Sync {
    async fn record(&self, record: Record) -> anyhow::Result<()>;
}

/// Hands a record to `recorder` on a detached task, logging any failure.
pub fn dispatch(recorder: &Arc<dyn Recorder>, record: Record) {
    let recorder = recorder.clone();
    tokio::spawn(async move {
        let room = record.room().to_string();
        if let Err(e) = recorder.record(record).await {
            log::warn!("[recorder {}] dropped record: {}", room, e);
        }
    });
}

/// Writes each record as a JSON line to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

#[async_trait::async_trait]
impl Recorder for LogRecorder {
    async fn record(&self, record: Record) -> anyhow::Result<()> {
        log::info!("[record] {}", record.to_json()?);
        Ok(())
    }
}

/// Keeps records in memory. Used by tests and for inspection.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: Mutex<Vec<Record>>,
}

impl MemoryRecorder {
    pub async fn records(&self) -> Vec<Record> {
        self.records.lock().await.clone()
    }
    pub async fn rounds(&self) -> Vec<RoundRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter_map(|r| match r {
                Record::Round(r) => Some(r.clone()),
                Record::Summary(_) => None,
            })
            .collect()
    }
    pub async fn summaries(&self) -> Vec<SummaryRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter_map(|r| match r {
                Record::Summary(s) => Some(s.clone()),
                Record::Round(_) => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Recorder for MemoryRecorder {
    async fn record(&self, record: Record) -> anyhow::Result<()> {
        self.records.lock().await.push(record);
        Ok(())
    }
}

/// Appends records as JSON lines to a file.
#[derive(Debug)]
pub struct JsonlRecorder {
    file: Mutex<tokio::fs::File>,
}

impl JsonlRecorder {
    pub async fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;
        log::info!("[recorder] appending to {}", path.as_ref().display());
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait::async_trait]
impl Recorder for JsonlRecorder {
    async fn record(&self, record: Record) -> anyhow::Result<()> {
        let mut line = record.to_json()?;
        line.push('\n');
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::Condition;
    use crate::payoff::PayoffRecord;

    fn summary(slot: usize) -> Record {
        Record::from(SummaryRecord {
            room: "r".to_string(),
            slot,
            subject: format!("s{}", slot),
            total: 12.5,
            waiting_bonus: 0.3,
            rounds_answered: 3,
            rounds_played: 4,
            reason: EndReason::Completed,
            recorded_at: 0,
        })
    }

    #[tokio::test]
    async fn memory_keeps_order() {
        let recorder = MemoryRecorder::default();
        recorder.record(summary(0)).await.unwrap();
        recorder.record(summary(1)).await.unwrap();
        let slots = recorder.summaries().await.iter().map(|s| s.slot).collect::<Vec<_>>();
        assert_eq!(slots, vec![0, 1]);
        assert!(recorder.rounds().await.is_empty());
    }
    #[tokio::test]
    async fn jsonl_appends_lines() {
        let path = std::env::temp_dir().join(format!("groupstakes-{}.jsonl", uuid::Uuid::now_v7()));
        let recorder = JsonlRecorder::open(&path).await.unwrap();
        recorder.record(summary(0)).await.unwrap();
        let round = Record::from(RoundRecord {
            room: "r".to_string(),
            round: 0,
            slot: 1,
            subject: "s1".to_string(),
            partner: None,
            chosen_at: Some(5),
            reaction_ms: Some(830),
            timed_out: false,
            recorded_at: 6,
            payoff: PayoffRecord::absent(Condition::Additive),
        });
        recorder.record(round.clone()).await.unwrap();
        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        let parsed = serde_json::from_str::<Record>(lines[1]).unwrap();
        assert_eq!(parsed, round);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
