//! kemgraph CLI
//!
//! Command-line entrypoint for:
//! - Extracting the mention/annotation graph of pre-annotated JSON documents into N-Quads
//! - Smushing and group-merging existing RDF dumps
//! - Inspecting how a TIMEX3 value code is normalized

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use kemgraph_extract::config::parse_sentences;
use kemgraph_extract::{Document, ExtractionOutput, Extractor, ExtractorConfig};
use kemgraph_rdf::{merge, normalize_facts, parse_statements_file, to_nquads, GroupMergeConfig, RdfStatement, StatementSink};
use kemgraph_temporal::TemporalValue;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kemgraph")]
#[command(author, version, about = "kemgraph: mention/annotation graphs from annotated text")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract RDF statements from annotated JSON documents.
    ///
    /// Documents are processed in parallel; their outputs are concatenated in input
    /// order and, with `--merge`, smushed and group-merged once as a whole.
    Extract {
        /// Input documents (JSON)
        #[arg(required = true)]
        docs: Vec<PathBuf>,
        /// Output N-Quads file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Extractor options as JSON (any subset of the option fields)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Option override as `key=value` (fusion, normalization, owltime, sentences, instances)
        #[arg(short = 'D', long = "property", value_name = "KEY=VALUE")]
        properties: Vec<String>,
        /// Smush `owl:sameAs` and merge composite groups
        #[arg(long)]
        merge: bool,
        /// Base IRI whose `owl:sameAs` links are dropped after merging
        /// (defaults to the document IRI for a single document)
        #[arg(long)]
        base: Option<String>,
        /// Re-identify facts by content and metadata
        #[arg(long)]
        normalize: bool,
        /// Project annotations into instance facts
        #[arg(long)]
        instances: bool,
        /// Restrict extraction to these sentence indices (e.g. `0,2,5`)
        #[arg(long)]
        sentences: Option<String>,
        /// Write per-document extraction reports (JSON)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Smush and group-merge RDF files into one N-Quads output.
    Merge {
        /// Input RDF files (.nq, .nt, .ttl, .trig, .rdf)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output N-Quads file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Base IRI whose `owl:sameAs` links are dropped after merging
        #[arg(long)]
        base: Option<String>,
        /// Namespace of named (non-anonymous) resources
        #[arg(long)]
        named_namespace: Option<String>,
    },

    /// Normalize a TIMEX3 value and print its OWL-Time rendering.
    Timex {
        /// Value code, e.g. `2003-WI`, `P3Y`, `1999-W12-3T10:00`
        code: String,
        /// OWL-Time namespace for minted IRIs
        #[arg(long)]
        namespace: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            docs,
            out,
            config,
            properties,
            merge,
            base,
            normalize,
            instances,
            sentences,
            report,
        } => {
            let mut cfg = load_config(config.as_deref(), &properties)?;
            if merge {
                cfg.merging = true;
            }
            if normalize {
                cfg.normalization = true;
            }
            if instances {
                cfg.instances = true;
            }
            if let Some(sentences) = sentences {
                let set = parse_sentences(&sentences)?;
                cfg.sentences = (!set.is_empty()).then_some(set);
            }
            cmd_extract(&docs, cfg, base, out.as_deref(), report.as_deref())
        }
        Commands::Merge {
            files,
            out,
            base,
            named_namespace,
        } => cmd_merge(&files, out.as_deref(), base, named_namespace),
        Commands::Timex { code, namespace } => cmd_timex(&code, namespace.as_deref()),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&Path>, properties: &[String]) -> Result<ExtractorConfig> {
    let cfg = match path {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("invalid extractor options in {}", path.display()))?
        }
        None => ExtractorConfig::default(),
    };
    let properties = properties
        .iter()
        .map(|p| parse_property(p))
        .collect::<Result<HashMap<_, _>>>()?;
    cfg.with_properties(&properties, None)
}

fn parse_property(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got `{raw}`"))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn cmd_extract(
    docs: &[PathBuf],
    cfg: ExtractorConfig,
    base: Option<String>,
    out: Option<&Path>,
    report: Option<&Path>,
) -> Result<()> {
    // Merging and normalization run once over the whole batch.
    let batch_merge = cfg.merging;
    let batch_normalize = cfg.normalization;
    let extractor = Extractor::new(cfg.clone().with_merging(false).with_normalization(false));

    let results: Vec<Result<(String, ExtractionOutput)>> = docs
        .par_iter()
        .map(|path| {
            let doc = Document::from_path(path)?;
            Ok((doc.uri.clone(), extractor.extract(&doc)))
        })
        .collect();

    let mut statements: Vec<RdfStatement> = Vec::new();
    let mut reports = Vec::new();
    let mut uris = Vec::new();
    for (path, result) in docs.iter().zip(results) {
        let (uri, output) = result.with_context(|| format!("failed to extract {}", path.display()))?;
        for failure in &output.report.failures {
            warn!(document = %uri, step = %failure.step, item = %failure.item, "{}", failure.message);
        }
        statements.extend(output.statements);
        reports.push(output.report);
        uris.push(uri);
    }

    if batch_merge {
        let merge_config = GroupMergeConfig {
            base_iri: base.or_else(|| match uris.as_slice() {
                [single] => Some(single.clone()),
                _ => None,
            }),
            named_namespace: cfg.known_named_namespace.clone(),
        };
        let before = statements.len();
        statements = merge(statements, &merge_config);
        debug!(before, after = statements.len(), "merged");
    }
    if batch_normalize {
        statements = normalize_facts(statements, &cfg.fact_namespace);
    }

    if let Some(path) = report {
        let json = serde_json::to_string_pretty(&reports)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }
    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    info!(documents = docs.len(), statements = statements.len(), failures, "extraction finished");
    write_output(out, &to_nquads(&statements))
}

fn cmd_merge(files: &[PathBuf], out: Option<&Path>, base: Option<String>, named_namespace: Option<String>) -> Result<()> {
    let mut statements = Vec::new();
    for path in files {
        let parsed = parse_statements_file(path).with_context(|| format!("failed to read {}", path.display()))?;
        debug!(file = %path.display(), statements = parsed.len(), "loaded");
        statements.extend(parsed);
    }
    let config = GroupMergeConfig {
        base_iri: base,
        named_namespace: named_namespace.unwrap_or_else(|| ExtractorConfig::default().known_named_namespace),
    };
    let before = statements.len();
    let merged = merge(statements, &config);
    info!(before, after = merged.len(), "merge finished");
    write_output(out, &to_nquads(&merged))
}

fn cmd_timex(code: &str, namespace: Option<&str>) -> Result<()> {
    let namespace = namespace
        .map(str::to_string)
        .unwrap_or_else(|| ExtractorConfig::default().owltime_namespace);
    let Some(value) = TemporalValue::parse(code)? else {
        println!("{code}: no OWL-Time rendering");
        return Ok(());
    };
    println!("{value}");
    let mut sink = StatementSink::new();
    let iri = value.to_rdf(&mut sink, &namespace, None);
    println!("# {}", iri.value());
    print!("{}", to_nquads(sink.iter()));
    Ok(())
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => fs::write(path, text).with_context(|| format!("failed to write {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(text.as_bytes())?;
            lock.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_split_on_the_first_equals() {
        assert_eq!(
            parse_property("owltime = http://x.org/t#a=b").unwrap(),
            ("owltime".to_string(), "http://x.org/t#a=b".to_string())
        );
        assert!(parse_property("fusion").is_err());
    }

    #[test]
    fn property_overrides_apply_to_defaults() {
        let cfg = load_config(None, &["fusion=true".into(), "sentences=1,3".into()]).unwrap();
        assert!(cfg.merging);
        assert_eq!(cfg.sentences, Some([1, 3].into_iter().collect()));
    }
}
