//! CLI command definitions for specimen-forge.
//!
//! Every editing action of the dataset editor is a subcommand. Commands that
//! mutate a specimen save the whole dataset before returning.

use crate::config::ForgeConfig;
use crate::dataset::{self, Dataset};
use crate::generator::ValueSampler;
use crate::harness::numbered;
use crate::runner::{CheckResult, DatasetCheckSummary};
use crate::specimen::Specimen;
use crate::template::parse_binding;
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default dataset document when none is given.
const DEFAULT_DATASET: &str = "./dataset.json";

/// Editor and verifier for templated programming-exercise datasets.
#[derive(Parser, Debug)]
#[command(name = "specimen-forge")]
#[command(about = "Edit and verify templated programming-exercise datasets")]
#[command(version)]
#[command(
    long_about = "specimen-forge edits a JSON dataset of programming-exercise specimens and verifies them.\n\nEach check resamples the specimen's random bindings, renders its templates, synthesizes a Python harness, and runs it.\n\nExample usage:\n  specimen-forge -d exercises.json check 3 --samples 10"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Dataset document to operate on.
    #[arg(short, long, env = "SPECIMEN_FORGE_DATASET", default_value = DEFAULT_DATASET, global = true)]
    pub dataset: PathBuf,

    /// Optional YAML configuration file.
    #[arg(short, long, env = "SPECIMEN_FORGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List specimens with their packages and labels.
    #[command(alias = "ls")]
    List,

    /// Show one specimen, raw or with freshly sampled values substituted.
    Show(ShowArgs),

    /// Print the line-numbered harness for a specimen.
    Harness(HarnessArgs),

    /// Verify one specimen, or every specimen when no id is given.
    Check(CheckArgs),

    /// Append an empty specimen and print its id.
    New,

    /// Append a copy of a specimen and print the new id.
    Clone(IdArgs),

    /// Replace fields of a specimen.
    Edit(EditArgs),

    /// Add or clear a specimen's packages.
    Packages(CatalogArgs),

    /// Add or clear a specimen's labels.
    Labels(CatalogArgs),
}

/// Arguments naming a single specimen.
#[derive(Parser, Debug)]
pub struct IdArgs {
    /// Specimen id.
    pub id: usize,
}

/// Arguments for `specimen-forge show`.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Specimen id.
    pub id: usize,

    /// Substitute placeholders with a fresh sample.
    #[arg(short, long)]
    pub resolved: bool,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `specimen-forge harness`.
#[derive(Parser, Debug)]
pub struct HarnessArgs {
    /// Specimen id.
    pub id: usize,

    /// Keep placeholders instead of sampling.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for `specimen-forge check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Specimen id. Checks the whole dataset when omitted.
    pub id: Option<usize>,

    /// Number of independent passes, each with a fresh sample.
    #[arg(short = 'n', long, default_value = "1")]
    pub samples: usize,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `specimen-forge edit`.
#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Specimen id.
    pub id: usize,

    /// New intent text.
    #[arg(long, conflicts_with = "intent_file")]
    pub intent: Option<String>,

    /// Read the intent from a file.
    #[arg(long)]
    pub intent_file: Option<PathBuf>,

    /// Read the function code from a file.
    #[arg(long)]
    pub code_file: Option<PathBuf>,

    /// Argument expressions, one per line.
    #[arg(long, requires = "assertions_file")]
    pub args_file: Option<PathBuf>,

    /// Assertion expressions, one per line.
    #[arg(long)]
    pub assertions_file: Option<PathBuf>,

    /// Random binding such as "x = @RNAT". Repeat to add several.
    #[arg(short, long = "binding")]
    pub bindings: Vec<String>,

    /// Remove existing bindings before adding new ones.
    #[arg(long)]
    pub clear_bindings: bool,
}

/// Arguments for `specimen-forge packages` and `specimen-forge labels`.
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Specimen id.
    pub id: usize,

    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog edits.
#[derive(clap::Subcommand, Debug)]
pub enum CatalogAction {
    /// Merge names into the specimen and the dataset catalog.
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove every name from the specimen.
    Clear,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
///
/// This is the main entry point for the specimen-forge CLI.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = ForgeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!(?config, "configuration loaded");

    let path = cli.dataset.as_path();
    let mut data = dataset::load(path)
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;

    match cli.command {
        Commands::List => run_list_command(&data),
        Commands::Show(args) => run_show_command(&mut data, &config, args),
        Commands::Harness(args) => run_harness_command(&mut data, &config, args),
        Commands::Check(args) => run_check_command(&mut data, &config, args).await,
        Commands::New => {
            let id = data.create_empty();
            persist(path, &data)?;
            println!("{}", id);
            Ok(())
        }
        Commands::Clone(args) => {
            let id = data.clone_specimen(args.id)?;
            persist(path, &data)?;
            println!("{}", id);
            Ok(())
        }
        Commands::Edit(args) => {
            run_edit_command(&mut data, args)?;
            persist(path, &data)
        }
        Commands::Packages(args) => {
            run_catalog_command(&mut data, args, Catalog::Packages)?;
            persist(path, &data)
        }
        Commands::Labels(args) => {
            run_catalog_command(&mut data, args, Catalog::Labels)?;
            persist(path, &data)
        }
    }
}

fn persist(path: &Path, data: &Dataset) -> anyhow::Result<()> {
    dataset::save(path, data).with_context(|| format!("Failed to save dataset {}", path.display()))
}

fn sampler_for(config: &ForgeConfig) -> ValueSampler {
    match config.seed {
        Some(seed) => ValueSampler::new(seed),
        None => ValueSampler::from_entropy(),
    }
}

// ============================================================================
// Read-only commands
// ============================================================================

fn run_list_command(data: &Dataset) -> anyhow::Result<()> {
    for specimen in data.iter() {
        println!(
            "{:>4}  {:<48}  [{}]  [{}]",
            specimen.id(),
            summarize(specimen.intent(), 48),
            specimen.packages().join(", "),
            specimen.labels().join(", ")
        );
    }
    println!();
    println!("{} specimens", data.len());
    println!("Packages: {}", data.package_catalog().join(", "));
    println!("Labels:   {}", data.label_catalog().join(", "));
    Ok(())
}

/// First line of `text`, cut to `width` characters.
fn summarize(text: &str, width: usize) -> String {
    let first = text.lines().next().unwrap_or_default();
    if first.chars().count() <= width {
        first.to_string()
    } else {
        let cut: String = first.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[derive(Serialize)]
struct SpecimenView<'a> {
    id: usize,
    intent: &'a str,
    code: &'a str,
    tests: Vec<(&'a str, &'a str)>,
    packages: &'a [String],
    labels: &'a [String],
    bindings: Vec<String>,
}

fn run_show_command(data: &mut Dataset, config: &ForgeConfig, args: ShowArgs) -> anyhow::Result<()> {
    let specimen = data.get_mut(args.id)?;

    if args.resolved {
        specimen.resample(&mut sampler_for(config))?;
        let resolved = specimen
            .resolve(&config.aliases)
            .with_context(|| format!("Undefined template in specimen {}", args.id))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            return Ok(());
        }
        let tests = resolved
            .tests
            .iter()
            .map(|t| (t.args.as_str(), t.assertion.as_str()))
            .collect();
        print_specimen(
            resolved.id,
            &resolved.intent,
            &resolved.code,
            tests,
            &resolved.packages,
            specimen.labels(),
            &[],
        );
        return Ok(());
    }

    let bindings: Vec<String> = specimen.bindings().iter().map(|b| b.to_string()).collect();
    let tests: Vec<(&str, &str)> = specimen
        .tests()
        .iter()
        .map(|t| (t.args.as_str(), t.assertion.as_str()))
        .collect();

    if args.json {
        let view = SpecimenView {
            id: specimen.id(),
            intent: specimen.intent(),
            code: specimen.code(),
            tests,
            packages: specimen.packages(),
            labels: specimen.labels(),
            bindings,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_specimen(
        specimen.id(),
        specimen.intent(),
        specimen.code(),
        tests,
        specimen.packages(),
        specimen.labels(),
        &bindings,
    );
    Ok(())
}

fn print_specimen(
    id: usize,
    intent: &str,
    code: &str,
    tests: Vec<(&str, &str)>,
    packages: &[String],
    labels: &[String],
    bindings: &[String],
) {
    println!("Specimen {}", id);
    println!("Intent:\n{}", intent);
    println!("Code:\n{}", code);
    println!("Tests:");
    for (args, assertion) in tests {
        println!("  {:<24} => {}", args, assertion);
    }
    println!("Packages: {}", packages.join(", "));
    println!("Labels:   {}", labels.join(", "));
    if !bindings.is_empty() {
        println!("Bindings:");
        for binding in bindings {
            println!("  {}", binding);
        }
    }
}

fn run_harness_command(
    data: &mut Dataset,
    config: &ForgeConfig,
    args: HarnessArgs,
) -> anyhow::Result<()> {
    let checker = config.checker();
    let specimen = data.get_mut(args.id)?;

    let script = if args.raw {
        checker.synthesizer().synthesize_unresolved(specimen)?
    } else {
        specimen.resample(&mut sampler_for(config))?;
        let resolved = specimen
            .resolve(checker.aliases())
            .with_context(|| format!("Undefined template in specimen {}", args.id))?;
        checker.synthesizer().synthesize(&resolved)?
    };

    println!("{}", numbered(&script));
    Ok(())
}

// ============================================================================
// Verification
// ============================================================================

async fn run_check_command(
    data: &mut Dataset,
    config: &ForgeConfig,
    args: CheckArgs,
) -> anyhow::Result<()> {
    let checker = config.checker();

    match args.id {
        Some(id) => {
            let specimen = data.get_mut(id)?;
            let result = checker.check_repeatedly(specimen, args.samples).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_check_result(&result);
            }
            if !result.status.is_passed() {
                anyhow::bail!("Specimen {} failed verification", id);
            }
        }
        None => {
            let summary = checker.check_dataset(data, args.samples).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_dataset_summary(&summary);
            }
            if !summary.all_passed() {
                anyhow::bail!(
                    "{} of {} specimens failed verification",
                    summary.malformed.len(),
                    summary.total()
                );
            }
        }
    }
    Ok(())
}

fn print_check_result(result: &CheckResult) {
    let mark = if result.status.is_passed() { "✓" } else { "✗" };
    println!("{} Specimen {}: {}", mark, result.specimen_id, result.diagnostic);
    println!("  Passes: {}  Seed: {}", result.passes, result.seed);
    println!();
    println!("Intent:\n{}", result.intent);
    println!();
    println!("Harness:\n{}", numbered(&result.script));
}

fn print_dataset_summary(summary: &DatasetCheckSummary) {
    for result in &summary.results {
        let mark = if result.status.is_passed() { "✓" } else { "✗" };
        println!("{} {:>4}  {}", mark, result.specimen_id, result.diagnostic);
    }
    println!();
    println!("=== Dataset Check ===");
    println!("Total:       {}", summary.total());
    println!("Well-formed: {}", summary.wellformed.len());
    println!("Malformed:   {}", summary.malformed.len());
    if !summary.malformed.is_empty() {
        let ids: Vec<String> = summary.malformed.iter().map(|id| id.to_string()).collect();
        println!("Malformed ids: {}", ids.join(", "));
    }
}

// ============================================================================
// Editing
// ============================================================================

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Lines of a column file with trailing blank lines removed. Interior blank
/// lines are kept so rows stay aligned with the other column.
fn read_column(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut lines: Vec<String> = read_text(path)?
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

fn run_edit_command(data: &mut Dataset, args: EditArgs) -> anyhow::Result<()> {
    let specimen = data.get_mut(args.id)?;

    if let Some(intent) = args.intent {
        specimen.set_intent(intent);
    }
    if let Some(path) = &args.intent_file {
        specimen.set_intent(read_text(path)?.trim_end());
    }
    if let Some(path) = &args.code_file {
        specimen.set_code(read_text(path)?.trim_end());
    }
    if let (Some(args_path), Some(assertions_path)) = (&args.args_file, &args.assertions_file) {
        let arg_lines = read_column(args_path)?;
        let assertion_lines = read_column(assertions_path)?;
        specimen.set_tests_from_columns(&arg_lines, &assertion_lines);
    } else if let Some(path) = &args.assertions_file {
        let assertion_lines = read_column(path)?;
        specimen.set_tests_from_columns::<String, String>(&[], &assertion_lines);
    }

    apply_bindings(specimen, &args.bindings, args.clear_bindings)?;
    info!("Updated specimen {}", args.id);
    Ok(())
}

fn apply_bindings(specimen: &mut Specimen, exprs: &[String], clear: bool) -> anyhow::Result<()> {
    let mut bindings = if clear {
        Vec::new()
    } else {
        specimen.bindings().to_vec()
    };
    for expr in exprs {
        bindings.push(parse_binding(expr)?);
    }
    specimen.set_bindings(bindings);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Catalog {
    Packages,
    Labels,
}

fn run_catalog_command(data: &mut Dataset, args: CatalogArgs, catalog: Catalog) -> anyhow::Result<()> {
    match args.action {
        CatalogAction::Add { names } => {
            let specimen = data.get_mut(args.id)?;
            match catalog {
                Catalog::Packages => specimen.add_packages(names.iter().cloned()),
                Catalog::Labels => specimen.add_labels(names.iter().cloned()),
            }
            let added = match catalog {
                Catalog::Packages => data.register_packages(names.iter().map(String::as_str)),
                Catalog::Labels => data.register_labels(names.iter().map(String::as_str)),
            };
            debug!(added, ?catalog, "registered catalog entries");
        }
        CatalogAction::Clear => {
            let specimen = data.get_mut(args.id)?;
            match catalog {
                Catalog::Packages => specimen.clear_packages(),
                Catalog::Labels => specimen.clear_labels(),
            }
        }
    }
    Ok(())
}
