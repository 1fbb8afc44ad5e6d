use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use nmap_pilot_core::{
    catalog::{self, ScanCategory},
    output_file, NmapCommand, OutputFormat, ProcessRunner, ScanSession, ScanStatus, StdoutSink,
    Target, TimingPreset,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{privileges, settings::Settings, ui};

type Input = Lines<BufReader<Stdin>>;

/// Interactive menu loop. Ends on the exit choice or stdin EOF.
pub(crate) async fn run(settings: &Settings, session: &ScanSession) -> Result<()> {
    let runner = ProcessRunner::new(&settings.nmap_path);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        ui::banner();
        for (idx, category) in catalog::CATALOG.iter().enumerate() {
            println!("{}", format!("{}. {}", idx + 1, category.title).bold());
        }
        let exit_choice = catalog::CATALOG.len() + 1;
        println!("{}", format!("{exit_choice}. Exit").bold());

        let Some(choice) = prompt(&mut input, &format!("Choose an option (1-{exit_choice}):")).await?
        else {
            break;
        };
        let choice = choice.trim().to_string();
        if choice == exit_choice.to_string() {
            ui::print_success("Exiting...");
            break;
        }
        match parse_choice(&choice, catalog::CATALOG.len()) {
            Some(idx) => {
                let flow = run_category(
                    &catalog::CATALOG[idx],
                    &runner,
                    session,
                    settings,
                    &mut input,
                )
                .await?;
                if flow.is_none() {
                    break;
                }
            }
            None => ui::print_error("Invalid choice. Try again."),
        }
    }
    Ok(())
}

/// Drive one category flow: option, extra input, target, privilege check,
/// timing, output, then run. `Ok(None)` means stdin hit EOF mid-flow.
async fn run_category(
    category: &ScanCategory,
    runner: &ProcessRunner,
    session: &ScanSession,
    settings: &Settings,
    input: &mut Input,
) -> Result<Option<()>> {
    println!("\n{}", format!("=== {} ===", category.title).bold());

    let option = if category.options.len() == 1 {
        &category.options[0]
    } else {
        for (idx, option) in category.options.iter().enumerate() {
            println!("{}. {}", idx + 1, option.label);
        }
        let back = category.options.len() + 1;
        println!("{back}. Back");
        let Some(choice) = prompt(input, &format!("Choose an option (1-{back}):")).await? else {
            return Ok(None);
        };
        let choice = choice.trim().to_string();
        if choice == back.to_string() {
            return Ok(Some(()));
        }
        match parse_choice(&choice, category.options.len()) {
            Some(idx) => &category.options[idx],
            None => {
                ui::print_error("Invalid choice.");
                return Ok(Some(()));
            }
        }
    };

    let extra = match option.flags.needs_input() {
        Some(text) => match prompt(input, text).await? {
            Some(line) => Some(line),
            None => return Ok(None),
        },
        None => None,
    };

    let Some(raw_target) = prompt(input, "Enter target (e.g., 192.168.1.1):").await? else {
        return Ok(None);
    };
    let target: Target = match raw_target.parse() {
        Ok(target) => target,
        Err(err) => {
            ui::print_error(&err.to_string());
            return Ok(Some(()));
        }
    };

    if option.requires_root && !privileges::is_root() {
        ui::print_error("This scan requires root privileges. Use 'sudo'.");
        return Ok(Some(()));
    }

    let timing = if category.prompt_timing {
        match ask_timing(input).await? {
            Some(timing) => timing,
            None => return Ok(None),
        }
    } else {
        None
    };

    let output = match ask_output(input, &settings.output_dir).await? {
        Some(output) => output,
        None => return Ok(None),
    };

    // base flags first, then timing, then output, then the target
    let mut command = NmapCommand::new(target);
    command.extend_flags(option.flags.resolve(extra.as_deref()));
    if let Some(preset) = timing {
        command.timing(preset);
    }
    if let Some((format, path)) = output {
        std::fs::create_dir_all(&settings.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                settings.output_dir.display()
            )
        })?;
        command.output(format, &path);
    }

    println!(
        "\n{}\n",
        format!(">>> Running Nmap Scan: {} {} <<<", runner.program(), command)
            .cyan()
            .bold()
    );
    match runner.run(&command, session, &mut StdoutSink).await {
        Ok(ScanStatus::Completed { exit_code, stderr }) => {
            if let Some(message) = stderr {
                ui::print_error(&message);
            }
            if let Some(code) = exit_code.filter(|code| *code != 0) {
                ui::print_warning(&format!("nmap exited with status {code}"));
            }
        }
        Ok(ScanStatus::Interrupted) => {
            ui::print_error("Scan interrupted. Exiting...");
            std::process::exit(130);
        }
        Err(err) => ui::print_error(&format!("Failed to run Nmap: {err}")),
    }
    Ok(Some(()))
}

async fn ask_timing(input: &mut Input) -> Result<Option<Option<TimingPreset>>> {
    println!("\n{}", "=== Timing/Aggressiveness ===".bold());
    for (idx, preset) in TimingPreset::ALL.iter().enumerate() {
        println!("{}. {} ({})", idx + 1, preset.label(), preset.flag());
    }
    println!("7. Skip (use default timing)");
    let Some(choice) = prompt(input, "Choose an option (1-7):").await? else {
        return Ok(None);
    };
    let choice = choice.trim();
    if choice == "7" {
        return Ok(Some(None));
    }
    match parse_choice(choice, TimingPreset::ALL.len()) {
        Some(idx) => Ok(Some(Some(TimingPreset::ALL[idx]))),
        None => {
            ui::print_warning("Invalid choice. Using default timing.");
            Ok(Some(None))
        }
    }
}

async fn ask_output(
    input: &mut Input,
    output_dir: &Path,
) -> Result<Option<Option<(OutputFormat, PathBuf)>>> {
    println!("\n{}", "=== Output Format ===".bold());
    println!("1. Save output to file");
    println!("2. Skip (no output file)");
    let Some(choice) = prompt(input, "Choose an option (1-2):").await? else {
        return Ok(None);
    };
    match choice.trim() {
        "1" => {}
        "2" => return Ok(Some(None)),
        _ => {
            ui::print_warning("Invalid choice. Skipping output file.");
            return Ok(Some(None));
        }
    }

    println!("\n{}", "=== File Format ===".bold());
    for (idx, format) in OutputFormat::ALL.iter().enumerate() {
        println!("{}. {} ({})", idx + 1, format.label(), format.flag());
    }
    let Some(choice) = prompt(input, "Choose an option (1-4):").await? else {
        return Ok(None);
    };
    match parse_choice(choice.trim(), OutputFormat::ALL.len()) {
        Some(idx) => {
            let format = OutputFormat::ALL[idx];
            Ok(Some(Some((format, output_file(output_dir, format)))))
        }
        None => {
            ui::print_warning("Invalid choice. Skipping output file.");
            Ok(Some(None))
        }
    }
}

async fn prompt(input: &mut Input, text: &str) -> Result<Option<String>> {
    print!("{} ", text.cyan());
    std::io::stdout().flush().context("failed to flush prompt")?;
    Ok(input.next_line().await?)
}

/// Map a 1-based menu choice onto a 0-based index, rejecting out-of-range
/// and non-numeric input.
fn parse_choice(choice: &str, count: usize) -> Option<usize> {
    choice
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
}
