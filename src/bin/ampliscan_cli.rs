use ampliscan::{
    binding::render_alignment,
    dimer,
    simulation::{run, SimulationReport, SimulationRequest},
    Primer, SimulationConfig, Template,
};
use serde::Serialize;
use std::{env, fs};

#[derive(Serialize)]
struct SimulateOutput {
    report: SimulationReport,
    alignments: Option<Vec<String>>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  ampliscan_cli --version\n  \
  ampliscan_cli simulate TEMPLATE_FILE --primers '<primers-json>' \\\n      \
      [--circular] [--max-mismatches N] [--config '<config-json>'] \\\n      \
      [--template-id ID] [--show-alignment]\n  \
  ampliscan_cli check-dimers --primers '<primers-json>' [--config '<config-json>']\n\n  \
  Primers JSON: [{{\"id\": \"fwd1\", \"role\": \"Forward\", \"sequence\": \"ACGT...\"}}, ...]\n  \
  Template files: FASTA, or GenBank (.gb/.gbk, topology is honored)\n  \
  Tip: pass @file.json instead of inline JSON"
    );
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn next_value(args: &[String], i: &mut usize, flag: &str) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("Missing value for {flag}"))
}

fn parse_primers(arg: Option<String>) -> Result<Vec<Primer>, String> {
    let json = load_json_arg(&arg.ok_or("Missing --primers")?)?;
    serde_json::from_str(&json).map_err(|e| format!("Invalid primers JSON: {e}"))
}

fn parse_config(arg: Option<String>) -> Result<SimulationConfig, String> {
    match arg {
        None => Ok(SimulationConfig::default()),
        Some(value) => {
            let json = load_json_arg(&value)?;
            serde_json::from_str(&json).map_err(|e| format!("Invalid config JSON: {e}"))
        }
    }
}

fn load_template(path: &str, template_id: Option<&str>, circular: bool) -> Result<Template, String> {
    let lower = path.to_ascii_lowercase();
    let templates = if lower.ends_with(".gb") || lower.ends_with(".gbk") {
        Template::from_genbank_file(path)
    } else {
        Template::from_fasta_file(path)
    }
    .map_err(|e| format!("Could not load template file '{path}': {e}"))?;

    let template = match template_id {
        Some(id) => templates
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| format!("Template '{id}' not found in '{path}'"))?,
        None => templates
            .into_iter()
            .next()
            .ok_or_else(|| format!("No sequence found in '{path}'"))?,
    };
    if circular && !template.is_circular() {
        return Template::new(template.id(), &template.to_string(), true)
            .map_err(|e| e.to_string());
    }
    Ok(template)
}

fn simulate_command(args: &[String]) -> Result<(), String> {
    let mut template_file: Option<String> = None;
    let mut primers_arg: Option<String> = None;
    let mut config_arg: Option<String> = None;
    let mut template_id: Option<String> = None;
    let mut max_mismatches: Option<usize> = None;
    let mut circular = false;
    let mut show_alignment = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--circular" => circular = true,
            "--show-alignment" => show_alignment = true,
            "--primers" => primers_arg = Some(next_value(args, &mut i, "--primers")?),
            "--config" => config_arg = Some(next_value(args, &mut i, "--config")?),
            "--template-id" => template_id = Some(next_value(args, &mut i, "--template-id")?),
            "--max-mismatches" => {
                let value = next_value(args, &mut i, "--max-mismatches")?;
                max_mismatches = Some(
                    value
                        .parse()
                        .map_err(|e| format!("Invalid --max-mismatches '{value}': {e}"))?,
                );
            }
            other if other.starts_with("--") => {
                usage();
                return Err(format!("Unknown flag '{other}'"));
            }
            other => {
                if template_file.is_some() {
                    usage();
                    return Err(format!("Unexpected argument '{other}'"));
                }
                template_file = Some(other.to_string());
            }
        }
        i += 1;
    }

    let template_file = template_file.ok_or("Missing template file")?;
    let template = load_template(&template_file, template_id.as_deref(), circular)?;
    let primers = parse_primers(primers_arg)?;
    let mut config = parse_config(config_arg)?;
    if let Some(max) = max_mismatches {
        config.max_mismatches = max;
    }

    let request = SimulationRequest {
        template,
        primers,
        config,
    };
    let report = run(&request).map_err(|e| e.to_string())?;

    let alignments = if show_alignment {
        let mut rendered = vec![];
        for check in &report.primers_checked {
            let primer = request
                .primers
                .iter()
                .find(|p| p.id == check.primer_id)
                .expect("checked primer comes from the request");
            for site in &check.sites {
                rendered.push(render_alignment(&request.template, primer, site));
            }
        }
        Some(rendered)
    } else {
        None
    };

    print_json(&SimulateOutput { report, alignments })
}

fn check_dimers_command(args: &[String]) -> Result<(), String> {
    let mut primers_arg: Option<String> = None;
    let mut config_arg: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--primers" => primers_arg = Some(next_value(args, &mut i, "--primers")?),
            "--config" => config_arg = Some(next_value(args, &mut i, "--config")?),
            other => {
                usage();
                return Err(format!("Unexpected argument '{other}'"));
            }
        }
        i += 1;
    }

    let primers = parse_primers(primers_arg)?;
    let config = parse_config(config_arg)?;
    config.validate().map_err(|e| e.to_string())?;
    let results = dimer::check_all_dimers(&primers, &config).map_err(|e| e.to_string())?;
    print_json(&results)
}

fn main() {
    env_logger::init();
    if let Err(e) = run_cli() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("ampliscan {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match args[1].as_str() {
        "simulate" => simulate_command(&args[2..]),
        "check-dimers" => check_dimers_command(&args[2..]),
        other => {
            usage();
            Err(format!("Unknown command '{other}'"))
        }
    }
}
