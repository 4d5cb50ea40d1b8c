//! JSON import: a single record or a sequence of records, with
//! language-variant field aliases.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{
    DEFAULT_TASK_TITLE, ImportBatch, PartialGoal, lenient_urgency, parse_deadline,
};
use crate::models::Task;
use crate::storage::generate_id;
use crate::{Error, Result};

// Ordered source keys per target field; the first present alias wins.
const NAME_KEYS: &[&str] = &["meta", "nome", "name"];
const DESCRIPTION_KEYS: &[&str] = &["descricao", "description"];
const CATEGORY_KEYS: &[&str] = &["categoria", "category"];
const URGENCY_KEYS: &[&str] = &["urgencia", "urgency"];
const DEADLINE_KEYS: &[&str] = &["prazo", "deadline"];
const STEPS_KEYS: &[&str] = &["etapas", "steps"];
const PROGRESS_KEYS: &[&str] = &["progresso", "progress"];
const TASK_TITLE_KEYS: &[&str] = &["titulo", "title", "task"];

/// Key holding a nested sequence of task-like objects.
const NESTED_TASKS_KEY: &str = "tarefas";

pub(super) fn parse(text: &str, now: DateTime<Utc>) -> Result<ImportBatch> {
    let parsed: Value = serde_json::from_str(text)
        .map_err(|e| Error::ImportFormat(format!("invalid JSON: {}", e)))?;

    let records = match parsed {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut batch = ImportBatch::default();
    let mut task_index = 0usize;

    for (goal_index, record) in records.iter().enumerate() {
        let goal_id = generate_id("meta", goal_index);

        let partial = PartialGoal {
            name: first_string(record, NAME_KEYS),
            description: first_string(record, DESCRIPTION_KEYS),
            category: first_string(record, CATEGORY_KEYS),
            urgency: first_string(record, URGENCY_KEYS).map(|s| lenient_urgency(&s)),
            deadline: first_string(record, DEADLINE_KEYS).and_then(|s| parse_deadline(&s)),
            steps: first_array(record, STEPS_KEYS),
            progress: first_number(record, PROGRESS_KEYS).map(|n| n.min(100) as u8),
            tags: first_array(record, &["tags"]),
        };
        batch.goals.push(partial.build(goal_id.clone(), now));

        if let Some(Value::Array(entries)) = record.get(NESTED_TASKS_KEY) {
            for entry in entries {
                let title = first_string(entry, TASK_TITLE_KEYS)
                    .unwrap_or_else(|| DEFAULT_TASK_TITLE.to_string());
                let mut task = Task::new(
                    generate_id("task", task_index),
                    goal_id.clone(),
                    title,
                    now,
                );
                task.description = first_string(entry, DESCRIPTION_KEYS).unwrap_or_default();
                batch.tasks.push(task);
                task_index += 1;
            }
        }
    }

    Ok(batch)
}

/// First non-empty string found under the given keys.
fn first_string(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First numeric value found under the given keys.
fn first_number(record: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(Value::as_u64)
}

/// String elements of the first array found under the given keys;
/// anything else yields an empty list.
fn first_array(record: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
