//! `xnative tasks` command

use anyhow::Result;

use crate::cli::{GlobalArgs, TasksArgs};
use xnative::ops::task_report;

pub fn execute(global: &GlobalArgs, args: TasksArgs) -> Result<()> {
    let build = super::load_build(global, Vec::new())?;
    let report = task_report(&build.project);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for task in &report {
        match task.description {
            Some(ref description) => println!("{} - {}", task.name, description),
            None => println!("{}", task.name),
        }
        if !task.depends_on.is_empty() {
            println!("    depends on: {}", task.depends_on.join(", "));
        }
        if !task.required_by.is_empty() {
            println!("    required by: {}", task.required_by.join(", "));
        }
    }

    Ok(())
}
