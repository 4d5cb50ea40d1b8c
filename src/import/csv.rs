//! CSV import: header row plus one goal per data row.
//!
//! Comma-delimited with no quoting or escaping support. Header names are
//! case-insensitive and alias-tolerant; a `steps`/`etapas` column splits
//! on semicolons into the step list, a `tasks`/`tarefas` column into one
//! backlog task per segment.

use chrono::{DateTime, Utc};

use super::{
    DEFAULT_TASK_TITLE, ImportBatch, PartialGoal, lenient_urgency, parse_deadline,
};
use crate::models::Task;
use crate::storage::generate_id;
use crate::{Error, Result};

pub(super) fn parse(text: &str, now: DateTime<Utc>) -> Result<ImportBatch> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(Error::ImportFormat(
            "CSV needs a header row and at least one data row".to_string(),
        ));
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut batch = ImportBatch::default();
    let mut task_index = 0usize;

    for (row_index, line) in lines[1..].iter().enumerate() {
        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        let mut partial = PartialGoal::default();
        let mut task_titles: Vec<String> = Vec::new();

        for (column, header) in headers.iter().enumerate() {
            let value = values.get(column).copied().unwrap_or("");
            match header.as_str() {
                "nome" | "name" => partial.name = non_empty(value),
                "descricao" | "description" => partial.description = non_empty(value),
                "categoria" | "category" => partial.category = non_empty(value),
                "urgencia" | "urgency" => {
                    if !value.is_empty() {
                        partial.urgency = Some(lenient_urgency(value));
                    }
                }
                "prazo" | "deadline" => partial.deadline = parse_deadline(value),
                "etapas" | "steps" => {
                    if !value.is_empty() {
                        partial.steps = value.split(';').map(str::to_string).collect();
                    }
                }
                "tarefas" | "tasks" => {
                    if !value.is_empty() {
                        task_titles = value.split(';').map(str::to_string).collect();
                    }
                }
                _ => {}
            }
        }

        let goal_id = generate_id("meta", row_index);
        batch.goals.push(partial.build(goal_id.clone(), now));

        for title in task_titles {
            let title = if title.is_empty() {
                DEFAULT_TASK_TITLE.to_string()
            } else {
                title
            };
            batch.tasks.push(Task::new(
                generate_id("task", task_index),
                goal_id.clone(),
                title,
                now,
            ));
            task_index += 1;
        }
    }

    Ok(batch)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
