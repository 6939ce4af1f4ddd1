use cellatlas::render_export::{export_bar_svg, export_radar_svg, export_scatter_svg};
use cellatlas::{
    CATALOG, about,
    catalog::GeneRecord,
    derived_views::{cell_type_summary, comparison_matrix, with_expression},
    engine::{AtlasEngine, Engine, MAX_COMPARED_GENES, Operation, SessionState, Workflow},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::{env, fs};

#[derive(Serialize)]
struct GeneSummary {
    id: String,
    display_name: String,
    specificity_score: i32,
}

#[derive(Serialize)]
struct GeneInfo<'a> {
    #[serde(flatten)]
    gene: &'a GeneRecord,
    specificity_score: i32,
}

/// All three derived datasets in one document, for external tooling.
#[derive(Serialize)]
struct ExportBundle {
    points: Vec<cellatlas::derived_views::ExpressionPoint>,
    cell_type_summary: Vec<cellatlas::derived_views::CellTypeSummaryRow>,
    comparison: Vec<cellatlas::derived_views::ComparisonRow>,
}

#[derive(Serialize)]
struct SessionReport {
    results: Vec<cellatlas::engine::OpResult>,
    state: SessionState,
    suggestions: Vec<String>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  cellatlas_cli --version\n  \
  cellatlas_cli capabilities\n  \
  cellatlas_cli genes\n  \
  cellatlas_cli search QUERY\n  \
  cellatlas_cli gene-info GENE_ID\n  \
  cellatlas_cli [--seed N] op '<operation-json>'\n  \
  cellatlas_cli [--seed N] workflow '<workflow-json>'\n  \
  cellatlas_cli [--seed N] export-json GENE_IDS|- OUTPUT.json\n  \
  cellatlas_cli [--seed N] export-svg scatter GENE_ID|- OUTPUT.svg\n  \
  cellatlas_cli [--seed N] export-svg bar GENE_ID OUTPUT.svg\n  \
  cellatlas_cli [--seed N] export-svg radar GENE_IDS OUTPUT.svg\n\n  \
  GENE_IDS is comma-separated, at most {MAX_COMPARED_GENES} ids; '-' means no gene.\n  \
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

/// Global `--seed N` before the command, like a session launched with a
/// fixed cell table.
fn parse_global_seed_arg(args: &[String]) -> Result<(Option<u64>, usize), String> {
    if args.len() >= 3 && args[1] == "--seed" {
        let seed = args[2]
            .parse::<u64>()
            .map_err(|e| format!("Invalid --seed value '{}': {e}", args[2]))?;
        return Ok((Some(seed), 3));
    }
    Ok((None, 1))
}

fn new_engine(seed: Option<u64>) -> AtlasEngine {
    match seed {
        Some(seed) => AtlasEngine::new_seeded(seed),
        None => AtlasEngine::new(),
    }
}

fn jitter_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    }
}

fn lookup_gene(id: &str) -> Result<&'static GeneRecord, String> {
    CATALOG
        .lookup(id)
        .ok_or_else(|| format!("Gene '{id}' is not in the catalog"))
}

fn optional_gene(arg: &str) -> Result<Option<&'static GeneRecord>, String> {
    if arg == "-" {
        Ok(None)
    } else {
        lookup_gene(arg).map(Some)
    }
}

/// Comma-separated gene ids, `-` for none, at most the compare cap.
fn parse_gene_list(arg: &str) -> Result<Vec<&'static GeneRecord>, String> {
    if arg == "-" {
        return Ok(vec![]);
    }
    let ids: Vec<&str> = arg.split(',').filter(|s| !s.is_empty()).collect();
    if ids.len() > MAX_COMPARED_GENES {
        return Err(format!(
            "At most {MAX_COMPARED_GENES} comma-separated gene ids"
        ));
    }
    ids.iter().map(|id| lookup_gene(id)).collect()
}

fn report(engine: &AtlasEngine, results: Vec<cellatlas::engine::OpResult>) -> SessionReport {
    SessionReport {
        results,
        state: engine.state().clone(),
        suggestions: engine
            .suggestions()
            .into_iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (seed, cmd_idx) = parse_global_seed_arg(&args)?;
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }

    let command = &args[cmd_idx];

    match command.as_str() {
        "capabilities" => print_json(&AtlasEngine::capabilities()),
        "genes" => {
            let genes: Vec<GeneSummary> = CATALOG
                .iter()
                .map(|g| GeneSummary {
                    id: g.id.clone(),
                    display_name: g.display_name.clone(),
                    specificity_score: g.expression_profile.specificity_score(),
                })
                .collect();
            print_json(&genes)
        }
        "search" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing search query".to_string());
            }
            print_json(&CATALOG.search(&args[cmd_idx + 1]))
        }
        "gene-info" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing gene id".to_string());
            }
            let gene = lookup_gene(&args[cmd_idx + 1])?;
            print_json(&GeneInfo {
                gene,
                specificity_score: gene.expression_profile.specificity_score(),
            })
        }
        "op" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing operation JSON".to_string());
            }
            let json = load_json_arg(&args[cmd_idx + 1])?;
            let op: Operation =
                serde_json::from_str(&json).map_err(|e| format!("Invalid operation JSON: {e}"))?;
            let mut engine = new_engine(seed);
            let result = engine.apply(op).map_err(|e| e.to_string())?;
            print_json(&report(&engine, vec![result]))
        }
        "workflow" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing workflow JSON".to_string());
            }
            let json = load_json_arg(&args[cmd_idx + 1])?;
            let workflow: Workflow =
                serde_json::from_str(&json).map_err(|e| format!("Invalid workflow JSON: {e}"))?;
            let mut engine = new_engine(seed);
            let results = engine.apply_workflow(workflow).map_err(|e| e.to_string())?;
            print_json(&report(&engine, results))
        }
        "export-json" => {
            if args.len() <= cmd_idx + 2 {
                usage();
                return Err("export-json requires: GENE_IDS|- OUTPUT.json".to_string());
            }
            let genes = parse_gene_list(&args[cmd_idx + 1])?;
            let output = &args[cmd_idx + 2];
            let engine = new_engine(seed);
            let first = genes.first().copied();
            let bundle = ExportBundle {
                points: with_expression(engine.cells().cells(), first, &mut jitter_rng(seed)),
                cell_type_summary: cell_type_summary(first),
                comparison: comparison_matrix(&genes),
            };
            let text = serde_json::to_string_pretty(&bundle)
                .map_err(|e| format!("Could not serialize datasets: {e}"))?;
            fs::write(output, text)
                .map_err(|e| format!("Could not write JSON output '{output}': {e}"))?;
            println!("Wrote {} points to '{output}'", bundle.points.len());
            Ok(())
        }
        "export-svg" => {
            if args.len() <= cmd_idx + 3 {
                usage();
                return Err("export-svg requires: scatter|bar|radar ARG OUTPUT.svg".to_string());
            }
            let chart = &args[cmd_idx + 1];
            let arg = &args[cmd_idx + 2];
            let output = &args[cmd_idx + 3];

            let svg = match chart.as_str() {
                "scatter" => {
                    let gene = optional_gene(arg)?;
                    let engine = new_engine(seed);
                    let points =
                        with_expression(engine.cells().cells(), gene, &mut jitter_rng(seed));
                    export_scatter_svg(&points, gene)
                }
                "bar" => {
                    let gene = lookup_gene(arg)?;
                    export_bar_svg(&cell_type_summary(Some(gene)), gene)
                }
                "radar" => {
                    let genes = parse_gene_list(arg)?;
                    if genes.is_empty() {
                        return Err(format!(
                            "radar takes 1 to {MAX_COMPARED_GENES} comma-separated gene ids"
                        ));
                    }
                    let names: Vec<String> =
                        genes.iter().map(|g| g.display_name.clone()).collect();
                    export_radar_svg(&comparison_matrix(&genes), &names)
                }
                _ => {
                    return Err(format!(
                        "Unknown chart '{chart}', expected 'scatter', 'bar' or 'radar'"
                    ));
                }
            };
            fs::write(output, svg)
                .map_err(|e| format!("Could not write SVG output '{output}': {e}"))?;
            println!("Wrote {chart} SVG to '{output}'");
            Ok(())
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
