use std::path::Path;
use std::process::Command as Process;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use walkdir::WalkDir;

const TMP_DIR: &str = "tmp";

/// A third-party asset bundle: clone the upstream repository, copy one
/// subtree into the source assets, drop the clone.
struct AssetTask {
    name: &'static str,
    repository: &'static str,
    subtree: &'static str,
    dest: &'static str,
}

const TASKS: [AssetTask; 2] = [
    AssetTask {
        name: "fontawesome",
        repository: "https://github.com/FortAwesome/Font-Awesome.git",
        subtree: "fonts",
        dest: "source/css/fonts",
    },
    AssetTask {
        name: "fancybox",
        repository: "https://github.com/fancyapps/fancyBox.git",
        subtree: "source",
        dest: "source/fancybox",
    },
];

pub fn make_subcommand() -> Command {
    Command::new("assets")
        .about("Fetch third-party asset bundles into the source tree")
        .arg(
            Arg::new("task")
                .value_name("TASK")
                .help("Task to run: fontawesome, fancybox, default (all), clean")
                .default_value("default"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let task = args
        .get_one::<String>("task")
        .map(String::as_str)
        .unwrap_or("default");

    match task {
        "default" => {
            for task in &TASKS {
                run_task(task)?;
            }
        }
        "clean" => clean()?,
        name => match TASKS.iter().find(|t| t.name == name) {
            Some(task) => run_task(task)?,
            None => bail!("Unknown assets task: {}", name),
        },
    }

    Ok(())
}

fn run_task(task: &AssetTask) -> Result<()> {
    let clone_dir = Path::new(TMP_DIR).join(task.name);

    println!("Fetching {} from {}", task.name, task.repository);
    clone(task.repository, &clone_dir)?;
    copy_tree(&clone_dir.join(task.subtree), Path::new(task.dest))?;
    std::fs::remove_dir_all(TMP_DIR).context("Failed to remove tmp directory")?;
    println!("Installed {} into {}", task.name, task.dest);

    Ok(())
}

fn clean() -> Result<()> {
    for dir in TASKS.iter().map(|t| t.dest).chain([TMP_DIR]) {
        if Path::new(dir).exists() {
            std::fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to remove {}", dir))?;
            println!("Removed {}", dir);
        }
    }

    Ok(())
}

fn clone(repository: &str, dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }

    let status = Process::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(repository)
        .arg(dir)
        .status()
        .context("Failed to run git")?;
    if !status.success() {
        bail!("git clone failed for {}", repository);
    }

    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).into_iter().filter_map(|e| e.ok()) {
        let relative = entry
            .path()
            .strip_prefix(from)
            .with_context(|| format!("Path outside copy root: {}", entry.path().display()))?;
        let target = to.join(relative);

        if entry.path().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
