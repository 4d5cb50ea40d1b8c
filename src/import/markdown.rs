//! Markdown import: a restartable line-oriented scan.
//!
//! A level-1 heading starts a new goal (flushing the open one). Bullets
//! under a goal are either checkbox items, which become backlog tasks, or
//! plain steps. The first other non-empty line while a goal is open and
//! still undescribed becomes its description. Input with no headings
//! produces an empty batch; the command layer rejects empty imports.

use chrono::{DateTime, Utc};

use super::{ImportBatch, PartialGoal};
use crate::models::Task;
use crate::storage::generate_id;

pub(super) fn parse(text: &str, now: DateTime<Utc>) -> ImportBatch {
    let mut batch = ImportBatch::default();
    let mut open: Option<(String, PartialGoal)> = None;
    let mut goal_index = 0usize;
    let mut task_index = 0usize;

    for raw in text.lines() {
        let line = raw.trim();

        if let Some(heading) = line.strip_prefix("# ") {
            if let Some((id, partial)) = open.take() {
                batch.goals.push(partial.build(id, now));
            }
            let partial = PartialGoal {
                name: Some(heading.to_string()).filter(|s| !s.is_empty()),
                ..PartialGoal::default()
            };
            open = Some((generate_id("meta", goal_index), partial));
            goal_index += 1;
        } else if let Some(content) = line.strip_prefix("- ") {
            let Some((goal_id, partial)) = open.as_mut() else {
                // Bullets before the first heading have no goal to attach to
                continue;
            };
            if let Some(title) = content
                .strip_prefix("[ ] ")
                .or_else(|| content.strip_prefix("[x] "))
            {
                // Checked state is recognized but not mapped: both arrive
                // as backlog
                batch.tasks.push(Task::new(
                    generate_id("task", task_index),
                    goal_id.clone(),
                    title.to_string(),
                    now,
                ));
                task_index += 1;
            } else {
                partial.steps.push(content.to_string());
            }
        } else if !line.is_empty() {
            if let Some((_, partial)) = open.as_mut() {
                if partial.description.is_none() {
                    partial.description = Some(line.to_string());
                }
            }
        }
    }

    if let Some((id, partial)) = open.take() {
        batch.goals.push(partial.build(id, now));
    }

    batch
}
