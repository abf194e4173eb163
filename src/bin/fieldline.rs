use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fieldline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a project file against every structural and hardware constraint.
    Validate(ValidateArgs),
    /// Emit a project's preview keyframe track as JSON.
    Preview(PreviewArgs),
    /// Print a drivetrain's catalog definition and default motor names.
    Hardware(HardwareArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path for the keyframe track JSON (stdout if omitted).
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long, default_value_t = 46)]
    baseline_samples: usize,

    #[arg(long, default_value_t = 35)]
    optimized_samples: usize,
}

#[derive(Parser, Debug)]
struct HardwareArgs {
    /// Drivetrain id (e.g. `mecanum-drive`).
    #[arg(long)]
    drivetrain: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Hardware(args) => cmd_hardware(args),
    }
}

fn read_project_json(path: &Path) -> anyhow::Result<fieldline::Project> {
    let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
    let r = BufReader::new(f);
    let project: fieldline::Project =
        serde_json::from_reader(r).with_context(|| "parse project JSON")?;
    Ok(project)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let project = read_project_json(&args.in_path)?;
    project.validate()?;

    let fp = project.fingerprint()?;
    eprintln!(
        "project '{}' ok: {} nodes, {} edges, {} motors, fingerprint {:016x}{:016x}",
        project.name,
        project.workflow_data.nodes().len(),
        project.workflow_data.edges().len(),
        project.motor_config.motors.len(),
        fp.hi,
        fp.lo,
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let project = read_project_json(&args.in_path)?;
    project.validate()?;

    let opts = fieldline::PreviewOptions {
        baseline_samples: args.baseline_samples,
        optimized_samples: args.optimized_samples,
        ..fieldline::PreviewOptions::default()
    };
    let track = fieldline::plan_preview(&project.workflow_data, &opts)?;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(&out)
                .with_context(|| format!("write track '{}'", out.display()))?;
            serde_json::to_writer_pretty(f, &track)?;
            eprintln!("wrote {} ({} keyframes)", out.display(), track.len());
        }
        None => {
            let s = serde_json::to_string_pretty(&track)?;
            println!("{s}");
        }
    }
    Ok(())
}

fn cmd_hardware(args: HardwareArgs) -> anyhow::Result<()> {
    let ty: fieldline::DriveTrainType = args.drivetrain.parse()?;
    let def = fieldline::definition(ty);

    println!("{}", serde_json::to_string_pretty(def)?);
    eprintln!("default motor names:");
    for (role, name) in fieldline::default_motor_names(ty) {
        eprintln!("  {role}: {name}");
    }
    Ok(())
}
