//! Berth CLI - start, stop and inspect the containers declared in a manifest

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use berth::cli::{logging, Args, SubCommand};
use berth::engine::{commands, runner, LifecycleController, SystemRunner};
use berth::output::{format_output, ListingRow, OutputFormat, Report, ReportData};
use berth::{BerthError, DeclaredContainer, Manifest};

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let format = if args.json { OutputFormat::Json } else { OutputFormat::Human };

    // `check` works without a manifest; everything else needs one
    let manifest = match args.command {
        SubCommand::Check if !args.file.exists() => Manifest::default(),
        _ => Manifest::load(&args.file)
            .with_context(|| format!("cannot use manifest {}", args.file.display()))?,
    };

    let mut engine = manifest.engine.clone();
    if let Some(binary) = &args.engine {
        engine.binary = binary.clone();
    }
    debug!(binary = %engine.binary, banner = %engine.banner, "engine selected");
    let controller = LifecycleController::from_config(&engine);

    match args.command {
        SubCommand::Check => {
            let available = controller.is_engine_available();
            let report = Report::new(ReportData::EngineCheck {
                binary: engine.binary.clone(),
                available,
            });
            println!("{}", format_output(&report, &format));
            if !available {
                return Err(BerthError::EngineUnavailable {
                    binary: engine.binary,
                }
                .into());
            }
            Ok(())
        }

        SubCommand::List => {
            let containers = manifest
                .containers()
                .iter()
                .map(|c| ListingRow {
                    name: c.spec.name().to_string(),
                    image: c.spec.image_reference(),
                    group: manifest.group_label(c),
                })
                .collect();
            let report = Report::new(ReportData::Listing { containers });
            println!("{}", format_output(&report, &format));
            Ok(())
        }

        SubCommand::Plan { name } => {
            let declared = manifest.find(&name)?;
            let command = runner::render_command(
                &engine.binary,
                &commands::run_command(&declared.spec),
            );
            let report = Report::new(ReportData::Plan { name, command });
            println!("{}", format_output(&report, &format));
            Ok(())
        }

        SubCommand::Status { name } => {
            ensure_engine(&controller, &engine.binary)?;
            let declared = manifest.find(&name)?;
            let (status, text) = controller.status(declared.spec.name())?;
            let report = Report::new(ReportData::Status { name, status, text });
            println!("{}", format_output(&report, &format));
            Ok(())
        }

        SubCommand::Start { names } => {
            ensure_engine(&controller, &engine.binary)?;
            let selected = manifest.select(&names)?;
            each(&selected, &format, |c| {
                let outcome = controller.start(&c.spec)?;
                Ok(ReportData::Started {
                    name: c.spec.name().to_string(),
                    outcome,
                })
            })
        }

        SubCommand::Stop { names } => {
            ensure_engine(&controller, &engine.binary)?;
            let mut selected = manifest.select(&names)?;
            if names.is_empty() {
                selected.reverse();
            }
            each(&selected, &format, |c| {
                let outcome = controller.stop(c.spec.name())?;
                Ok(ReportData::Stopped {
                    name: c.spec.name().to_string(),
                    outcome,
                })
            })
        }

        SubCommand::Restart { names } => {
            ensure_engine(&controller, &engine.binary)?;
            let selected = manifest.select(&names)?;
            each(&selected, &format, |c| {
                let outcome = controller.restart(&c.spec)?;
                Ok(ReportData::Started {
                    name: c.spec.name().to_string(),
                    outcome,
                })
            })
        }
    }
}

fn ensure_engine(controller: &LifecycleController<SystemRunner>, binary: &str) -> berth::Result<()> {
    if controller.is_engine_available() {
        Ok(())
    } else {
        Err(BerthError::EngineUnavailable {
            binary: binary.to_string(),
        })
    }
}

/// Apply `op` to each container in order, stopping at the first failure.
/// Reports gathered before a failure are still printed.
fn each<F>(containers: &[&DeclaredContainer], format: &OutputFormat, mut op: F) -> anyhow::Result<()>
where
    F: FnMut(&DeclaredContainer) -> berth::Result<ReportData>,
{
    let mut reports = Vec::with_capacity(containers.len());
    let mut failure = None;

    for &container in containers {
        match op(container) {
            Ok(data) => reports.push(Report::new(data)),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let report = if reports.len() == 1 && failure.is_none() {
        reports.pop()
    } else if reports.is_empty() {
        None
    } else {
        Some(Report::new(ReportData::Multiple { reports }))
    };
    if let Some(report) = report {
        println!("{}", format_output(&report, format));
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
