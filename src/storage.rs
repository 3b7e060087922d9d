use crate::errors::HabitError;
use crate::models::{AppData, Habit, SkippedRecords, Task};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/habits.json"))
}

/// The document with every record still in raw form.
#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    habits: Option<Vec<Value>>,
    #[serde(default)]
    tasks: Option<Vec<Value>>,
    #[serde(default)]
    rules: Option<Vec<Value>>,
}

/// Reads the data file. An absent file is an empty collection. Records that do
/// not parse are logged and set aside in [`AppData::skipped`]; a document that
/// is not valid as a whole is an `InvalidData` error.
pub async fn read_data(path: &Path) -> Result<AppData, std::io::Error> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AppData::default()),
        Err(err) => return Err(err),
    };
    let raw: RawDocument = serde_json::from_slice(&bytes)
        .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?;

    let (habits, skipped_habits) = split_records(raw.habits.unwrap_or_default(), "habit");
    let (tasks, skipped_tasks) = split_records(raw.tasks.unwrap_or_default(), "task");
    let (rules, skipped_rules) = split_records(raw.rules.unwrap_or_default(), "rule");
    Ok(AppData {
        habits,
        tasks,
        rules,
        skipped: SkippedRecords {
            habits: skipped_habits,
            tasks: skipped_tasks,
            rules: skipped_rules,
        },
    })
}

/// Like [`read_data`], but any failure reads as an empty collection.
pub async fn load_data(path: &Path) -> AppData {
    match read_data(path).await {
        Ok(data) => data,
        Err(err) => {
            error!(path = %path.display(), "failed to read data file: {err}");
            AppData::default()
        }
    }
}

fn split_records<T: DeserializeOwned>(records: Vec<Value>, kind: &str) -> (Vec<T>, Vec<Value>) {
    let mut parsed = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    for record in records {
        match serde_json::from_value::<T>(record.clone()) {
            Ok(item) => parsed.push(item),
            Err(err) => {
                error!("skipping unreadable {kind} record: {err}");
                skipped.push(record);
            }
        }
    }
    (parsed, skipped)
}

/// Unreadable records go back after the readable ones, unchanged.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), std::io::Error> {
    let document = serde_json::json!({
        "habits": with_skipped(&data.habits, &data.skipped.habits)?,
        "tasks": with_skipped(&data.tasks, &data.skipped.tasks)?,
        "rules": with_skipped(&data.rules, &data.skipped.rules)?,
    });
    let payload = serde_json::to_vec_pretty(&document).map_err(std::io::Error::other)?;
    fs::write(path, payload).await?;
    Ok(())
}

fn with_skipped<T: Serialize>(items: &[T], skipped: &[Value]) -> Result<Vec<Value>, std::io::Error> {
    let mut records = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(std::io::Error::other)?;
    records.extend(skipped.iter().cloned());
    Ok(records)
}

/// Readable records whose stored id is missing or not a UUID.
fn count_without_id<T: DeserializeOwned>(records: &[Value]) -> usize {
    records
        .iter()
        .filter(|record| {
            let has_id = record
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| uuid::Uuid::parse_str(id).is_ok());
            !has_id && serde_json::from_value::<T>((*record).clone()).is_ok()
        })
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionChanged {
    pub revision: u64,
}

/// The persisted habit, task and rule collections.
///
/// Every read goes back to disk. Writes run one at a time inside
/// [`HabitStore::mutate`], which loads, applies the change, persists and then
/// announces a new revision. Another process writing the same file between two
/// operations is picked up; one writing during an operation is overwritten.
pub struct HabitStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    revision: AtomicU64,
    changes: broadcast::Sender<CollectionChanged>,
}

impl HabitStore {
    pub fn new(path: PathBuf) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            path,
            write_lock: Mutex::new(()),
            revision: AtomicU64::new(0),
            changes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> AppData {
        load_data(&self.path).await
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChanged> {
        self.changes.subscribe()
    }

    /// Load, change, persist, notify. Nothing is written when `change` fails,
    /// or when the file exists but cannot be read as a document.
    pub async fn mutate<T, F>(&self, change: F) -> Result<T, HabitError>
    where
        F: FnOnce(&mut AppData) -> Result<T, HabitError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut data = read_data(&self.path).await.inspect_err(|err| {
            error!(path = %self.path.display(), "refusing to overwrite data file: {err}");
        })?;
        let value = change(&mut data)?;
        persist_data(&self.path, &data).await?;

        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(revision, "collection changed");
        // No subscribers is fine.
        let _ = self.changes.send(CollectionChanged { revision });
        Ok(value)
    }

    /// Resolves once the revision moves past `since`, or after `wait`.
    pub async fn wait_for_change(&self, since: u64, wait: Duration) -> u64 {
        let mut changes = self.subscribe();
        let current = self.revision();
        if current > since {
            return current;
        }
        loop {
            match tokio::time::timeout(wait, changes.recv()).await {
                Ok(Ok(CollectionChanged { revision })) if revision > since => return revision,
                Ok(Ok(_)) => continue,
                Ok(Err(_)) | Err(_) => return self.revision(),
            }
        }
    }

    /// Rewrites the file once when habits or tasks were stored without a UUID
    /// id, so the ids handed out on read stay stable.
    pub async fn assign_missing_ids(&self) -> Result<bool, HabitError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        let Ok(raw) = serde_json::from_slice::<RawDocument>(&bytes) else {
            return Ok(false);
        };
        let missing = count_without_id::<Habit>(raw.habits.as_deref().unwrap_or_default())
            + count_without_id::<Task>(raw.tasks.as_deref().unwrap_or_default());
        if missing == 0 {
            return Ok(false);
        }
        self.mutate(|_| Ok(())).await?;
        info!(missing, "assigned ids to stored records");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Habit};
    use chrono::Local;
    use uuid::Uuid;

    fn unique_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = env::temp_dir();
        path.push(format!("habit_tracker_{tag}_{}_{}.json", std::process::id(), nanos));
        path
    }

    fn habit(name: &str) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            frequency: Frequency::Daily,
            selected_days: Default::default(),
            created_at: Local::now().fixed_offset(),
            completed_dates: Vec::new(),
            label_override_date: None,
        }
    }

    #[tokio::test]
    async fn absent_or_malformed_file_reads_as_empty() {
        let path = unique_path("absent");
        assert!(load_data(&path).await.habits.is_empty());

        fs::write(&path, b"{ not json").await.unwrap();
        assert!(load_data(&path).await.habits.is_empty());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn mutate_persists_and_announces() {
        let path = unique_path("mutate");
        let store = HabitStore::new(path.clone());
        let mut changes = store.subscribe();

        let id = store
            .mutate(|data| {
                let h = habit("Read");
                let id = h.id;
                data.habits.push(h);
                Ok(id)
            })
            .await
            .unwrap();

        assert_eq!(changes.recv().await.unwrap(), CollectionChanged { revision: 1 });
        let reloaded = load_data(&path).await;
        assert_eq!(reloaded.habits.len(), 1);
        assert_eq!(reloaded.habits[0].id, id);
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn failed_change_writes_nothing() {
        let path = unique_path("failed");
        let store = HabitStore::new(path.clone());
        let result: Result<(), _> = store
            .mutate(|data| {
                data.habits.push(habit("Ghost"));
                Err(HabitError::Validation("nope".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.revision(), 0);
        assert!(fs::metadata(&path).await.is_err());
    }

    #[tokio::test]
    async fn external_writes_are_seen_and_last_writer_wins() {
        let path = unique_path("external");
        let store = HabitStore::new(path.clone());
        store
            .mutate(|data| {
                data.habits.push(habit("Mine"));
                Ok(())
            })
            .await
            .unwrap();

        let external = AppData {
            habits: vec![habit("Theirs")],
            ..AppData::default()
        };
        persist_data(&path, &external).await.unwrap();

        let seen = store.load().await;
        assert_eq!(seen.habits[0].name, "Theirs");

        store
            .mutate(|data| {
                data.habits.push(habit("Again"));
                Ok(())
            })
            .await
            .unwrap();
        let names: Vec<_> = store.load().await.habits.into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Theirs", "Again"]);
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn wait_for_change_returns_new_revision() {
        let path = unique_path("wait");
        let store = std::sync::Arc::new(HabitStore::new(path.clone()));

        let timed_out = store.wait_for_change(0, Duration::from_millis(20)).await;
        assert_eq!(timed_out, 0);

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_for_change(0, Duration::from_secs(5)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.mutate(|_| Ok(())).await.unwrap();
        assert_eq!(waiter.await.unwrap(), 1);
        assert_eq!(store.wait_for_change(0, Duration::from_millis(20)).await, 1);
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn unreadable_records_survive_a_write() {
        let path = unique_path("skipped");
        let stored = r#"{"habits":[
            {"id":"6f1c1f8e-8c5e-4e4b-9d7a-1a2b3c4d5e6f","name":"Keep me","frequency":"daily","createdAt":"2024-01-01T00:00:00Z","completedDates":[]},
            {"id":"0b6c2a4e-7f11-4a8e-9a55-2f4f1d3c9e10","name":"Odd one","frequency":"monthly","createdAt":"2024-01-01T00:00:00Z","completedDates":[]}
        ]}"#;
        fs::write(&path, stored).await.unwrap();
        let store = HabitStore::new(path.clone());

        let data = store.load().await;
        assert_eq!(data.habits.len(), 1);
        assert_eq!(data.habits[0].name, "Keep me");
        assert_eq!(data.skipped.habits.len(), 1);

        store.mutate(|_| Ok(())).await.unwrap();

        let raw: Value = serde_json::from_slice(&fs::read(&path).await.unwrap()).unwrap();
        let names: Vec<_> = raw["habits"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Keep me", "Odd one"]);
        assert_eq!(raw["habits"][1]["frequency"], "monthly");
        assert_eq!(store.load().await.habits[0].name, "Keep me");
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn unreadable_document_is_never_overwritten() {
        let path = unique_path("garbled");
        fs::write(&path, b"{ \"habits\": [ truncated").await.unwrap();
        let store = HabitStore::new(path.clone());

        let result = store
            .mutate(|data| {
                data.habits.push(habit("New"));
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(HabitError::Storage(_))));
        assert_eq!(store.revision(), 0);
        assert_eq!(fs::read(&path).await.unwrap(), b"{ \"habits\": [ truncated");
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_ids_are_written_back_once() {
        let path = unique_path("ids");
        let legacy = r#"{"habits":[{"name":"Old","frequency":"daily","createdAt":"2024-01-01T00:00:00Z","completedDates":[]}]}"#;
        fs::write(&path, legacy).await.unwrap();
        let store = HabitStore::new(path.clone());

        assert!(store.assign_missing_ids().await.unwrap());
        let first = store.load().await.habits[0].id;
        let second = store.load().await.habits[0].id;
        assert_eq!(first, second);
        assert!(!store.assign_missing_ids().await.unwrap());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn numeric_task_ids_are_replaced_once() {
        let path = unique_path("task_ids");
        let legacy = r#"{"tasks":[{"id":1712345678901,"title":"Taxes","due":"2024-04-15","priority":"High","status":"Todo","subtasks":[],"createdAt":"2024-01-02T09:00:00.000Z"}]}"#;
        fs::write(&path, legacy).await.unwrap();
        let store = HabitStore::new(path.clone());

        assert!(store.assign_missing_ids().await.unwrap());
        let first = store.load().await.tasks[0].id;
        assert_eq!(store.load().await.tasks[0].id, first);
        assert!(!store.assign_missing_ids().await.unwrap());
        let _ = fs::remove_file(&path).await;
    }
}
