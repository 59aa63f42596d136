use clap::Parser;
use kaleido_config::{Config, load_or_init, save};
use kaleido_prompt::{
    FlagMap, FlagValue, GenerationRequest, ParameterSet, PromptVariant, Session, parse_flags,
    parse_and_validate_with_defaults, validate,
};
use kaleido_utils::{DEFAULT_SESSION_CODE_LENGTH, ImageNameContext, session_code};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const INPUT_HELP: &str = "\
Prompt format:
  <prompt> -size <square|portrait|landscape> -quality <standard|hd> -style <vivid|natural>
Flags are optional; defaults are square, standard, vivid.

Variations (multi-line, read from --input or stdin):
  A robot shrine -size landscape -variations
  3
  Camera Angle (low, high, aerial)
  Mood (sacred, mysterious)

The line after -variations is the number of variants (at most 4 are produced).
Each following line is a category: Name (option, option, ...).";

/// Kaleido CLI entry point.
///
/// Kaleido expands one prompt with inline flags and variation axes into a
/// plan of DALL-E 3 image requests, one per variant.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "kaleido",
    author,
    version,
    about = "Expand a prompt and its variation axes into a DALL-E 3 generation plan.",
    long_about = None,
    after_help = INPUT_HELP
)]
struct Cli {
    /// Prompt text with optional inline flags. Read from stdin when omitted.
    #[arg(
        value_name = "PROMPT",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    prompt: Vec<String>,
    /// Read the prompt from a file (`-` for stdin).
    #[arg(long, short, value_name = "PATH", conflicts_with = "prompt")]
    input: Option<PathBuf>,
    /// Change parameters after parsing, e.g. "-style natural". Repeatable.
    #[arg(long = "flags", value_name = "FLAGS", allow_hyphen_values = true)]
    flags: Vec<String>,
    /// Append a modification to the prompt. Repeatable.
    #[arg(long = "tweak", value_name = "TEXT")]
    tweaks: Vec<String>,
    /// Print the plan as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Set the image model persisted in the Kaleido config file.
    #[arg(long, value_name = "MODEL")]
    set_model: Option<String>,
    /// Set the inline flags applied before every prompt's own flags.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    set_default_flags: Option<String>,
}

impl Cli {
    fn updates_config(&self) -> bool {
        self.set_model.is_some() || self.set_default_flags.is_some()
    }

    fn has_prompt_source(&self) -> bool {
        !self.prompt.is_empty() || self.input.is_some()
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read prompt from {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read prompt from stdin: {0}")]
    ReadStdin(#[source] io::Error),
    #[error("the prompt is empty; describe the image before any flags (see --help)")]
    EmptyPrompt,
    #[error("failed to render plan as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let raw = if cli.updates_config() && !cli.has_prompt_source() {
        None
    } else {
        match resolve_input(&cli, io::stdin().lock()) {
            Ok(raw) => Some(raw),
            Err(error) => {
                error!("{error}");
                return ExitCode::FAILURE;
            }
        }
    };

    let json = cli.json;
    let context = run(cli, raw.as_deref());
    debug!(config_ready = context.config_ready, "configuration resolved");

    for message in &context.infos {
        info!("{message}");
    }

    for warning in &context.warnings {
        warn!("{warning}");
    }

    let Some(result) = context.plan else {
        return ExitCode::SUCCESS;
    };

    let rendered = result.and_then(|plan| {
        if json {
            render_json(&plan)
        } else {
            Ok(render_text(&plan))
        }
    });

    match rendered {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn resolve_input<R: Read>(cli: &Cli, mut stdin: R) -> Result<String, CliError> {
    match cli.input.as_deref() {
        Some(path) if path.as_os_str() == "-" => read_all(&mut stdin),
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        }),
        None if !cli.prompt.is_empty() => Ok(cli.prompt.join(" ")),
        None => read_all(&mut stdin),
    }
}

fn read_all<R: Read>(reader: &mut R) -> Result<String, CliError> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(CliError::ReadStdin)?;
    Ok(raw)
}

#[derive(Debug)]
struct Plan {
    session: Session,
    variants: Vec<PromptVariant>,
    names: ImageNameContext,
    model: String,
}

#[derive(Debug, Default)]
struct RunContext {
    infos: Vec<String>,
    warnings: Vec<String>,
    config_ready: bool,
    plan: Option<Result<Plan, CliError>>,
}

fn run(cli: Cli, raw: Option<&str>) -> RunContext {
    let Cli {
        flags,
        tweaks,
        set_model,
        set_default_flags,
        ..
    } = cli;

    let mut infos = Vec::new();
    let mut warnings = Vec::new();

    let (config, config_ready) = match load_or_init() {
        Ok(outcome) => {
            if outcome.created {
                infos.push(format!(
                    "Created Kaleido configuration at {}",
                    outcome.path.display()
                ));
            } else if outcome.backfilled {
                infos.push(format!(
                    "Added missing settings to {}",
                    outcome.path.display()
                ));
            }

            let mut config = outcome.config;
            let mut changed = Vec::new();

            if let Some(model) = set_model {
                config.model = model.trim().to_string();
                changed.push("model");
            }

            if let Some(default_flags) = set_default_flags {
                let check = parse_flags(&default_flags);
                warnings.extend(check.warnings.iter().map(ToString::to_string));
                warnings.extend(
                    validate(&check.flags)
                        .warnings
                        .iter()
                        .map(ToString::to_string),
                );
                config.default_flags = default_flags.trim().to_string();
                changed.push("default_flags");
            }

            if !changed.is_empty() {
                match save(&config, &outcome.path) {
                    Ok(()) => infos.push(format!(
                        "Updated {} in {}",
                        changed.join(", "),
                        outcome.path.display()
                    )),
                    Err(error) => warnings.push(format!(
                        "Failed to update {} ({error}).",
                        changed.join(", ")
                    )),
                }
            }

            (config, true)
        }
        Err(error) => {
            warnings.push(format!(
                "Failed to load Kaleido configuration ({error}). Falling back to defaults."
            ));

            if set_model.is_some() || set_default_flags.is_some() {
                warnings.push(
                    "Cannot update settings because the configuration could not be loaded."
                        .to_string(),
                );
            }

            (Config::default(), false)
        }
    };

    let plan = raw.map(|raw| build_plan(raw, &config, &flags, &tweaks, &mut warnings));

    RunContext {
        infos,
        warnings,
        config_ready,
        plan,
    }
}

fn build_plan(
    raw: &str,
    config: &Config,
    flags: &[String],
    tweaks: &[String],
    warnings: &mut Vec<String>,
) -> Result<Plan, CliError> {
    let outcome = parse_and_validate_with_defaults(raw, &config.default_flags);
    warnings.extend(outcome.warnings.iter().map(ToString::to_string));

    if outcome.plan.base_prompt.trim().is_empty() {
        return Err(CliError::EmptyPrompt);
    }

    let mut session = Session::new(outcome.plan);
    for flag_text in flags {
        warnings.extend(
            session
                .apply_flags(flag_text)
                .iter()
                .map(ToString::to_string),
        );
    }
    for tweak in tweaks {
        session.tweak(tweak);
    }

    let variants = session.variants();
    if variants.is_empty() {
        warnings.push("Variation count is 0, so no images are planned.".to_string());
    }

    Ok(Plan {
        names: ImageNameContext::new(
            &config.file_name_prefix,
            &session_code(DEFAULT_SESSION_CODE_LENGTH),
        ),
        model: config.model.clone(),
        session,
        variants,
    })
}

#[derive(Debug, Serialize)]
struct PlanView<'a> {
    session: &'a str,
    parameters: ParameterSet,
    #[serde(skip_serializing_if = "is_empty_map")]
    passthrough: &'a FlagMap,
    images: Vec<ImageView<'a>>,
}

#[derive(Debug, Serialize)]
struct ImageView<'a> {
    index: usize,
    label: &'a str,
    file_stem: String,
    request: GenerationRequest<'a>,
}

fn is_empty_map(map: &&FlagMap) -> bool {
    map.is_empty()
}

fn image_views(plan: &Plan) -> Vec<ImageView<'_>> {
    plan.session
        .requests(&plan.model, &plan.variants)
        .into_iter()
        .zip(&plan.variants)
        .enumerate()
        .map(|(position, (request, variant))| {
            let index = position + 1;
            ImageView {
                index,
                label: &variant.label,
                file_stem: plan.names.file_stem(index, &variant.label),
                request,
            }
        })
        .collect()
}

fn render_json(plan: &Plan) -> Result<String, CliError> {
    let view = PlanView {
        session: plan.names.base(),
        parameters: plan.session.plan().parameters,
        passthrough: &plan.session.plan().passthrough,
        images: image_views(plan),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

fn render_text(plan: &Plan) -> String {
    let parameters = plan.session.plan().parameters;
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Plan {} for {}: {} ({}), {}, {}",
        plan.names.base(),
        plan.model,
        parameters.size.as_str(),
        parameters.size.dimensions(),
        parameters.quality.as_str(),
        parameters.style.as_str()
    );

    let total = plan.variants.len();
    for view in image_views(plan) {
        let _ = writeln!(
            output,
            "\n[{}/{total}] {} -> {}",
            view.index, view.label, view.file_stem
        );
        let _ = writeln!(output, "  {}", view.request.prompt);
    }

    output.trim_end().to_string()
}
