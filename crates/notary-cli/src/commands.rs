use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;

use notary_citation::{
    verify_citation, AuditSink, CitationConfig, CitationRecord, CitationService, CustodyChain,
    EvidenceStore, JsonlAuditLog, JsonlEvidenceStore, Meta, Signer,
};
use notary_crypto::Keystore;
use notary_ledger::{verify_ledger, CustodyLedger, LedgerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let dir = cli.dir.clone();
    match cli.command {
        Command::Init(_) => cmd_init(&dir),
        Command::Record(args) => cmd_record(&dir, args),
        Command::Log(args) => cmd_log(&dir, args),
        Command::Verify(_) => cmd_verify(&dir, &cli.format),
        Command::Cite(args) => cmd_cite(&dir, args, &cli.format),
        Command::VerifyCitation(args) => cmd_verify_citation(&dir, args, &cli.format),
    }
}

/// Split a `key=value` argument.
fn parse_kv(raw: &str) -> anyhow::Result<(String, serde_json::Value)> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), serde_json::Value::from(value))),
        None => bail!("expected key=value, got '{raw}'"),
    }
}

fn open_ledger(dir: &str) -> anyhow::Result<CustodyLedger> {
    let config = LedgerConfig::in_dir(Path::new(dir));
    CustodyLedger::open(&config).with_context(|| format!("opening ledger in {dir}"))
}

fn cmd_init(dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    let ledger = open_ledger(dir)?;
    println!(
        "{} Initialized notary ledger in {}",
        "✓".green().bold(),
        dir.bold()
    );
    println!("  Ledger: {}", ledger.path().display().to_string().cyan());
    println!("  Key id: {}", ledger.key_id().to_string().yellow());
    Ok(())
}

fn cmd_record(dir: &str, args: RecordArgs) -> anyhow::Result<()> {
    let ledger = open_ledger(dir)?;
    let payload = args
        .data
        .iter()
        .map(|raw| parse_kv(raw))
        .collect::<anyhow::Result<_>>()?;

    let record = ledger.record(&args.event_type, &args.actor, payload)?;
    println!("{} Custody record appended", "✓".green().bold());
    println!("  Sequence: {}", record.sequence_no.to_string().bold());
    println!("  Event: {}", record.event_type.cyan());
    println!("  Chain: {}", record.chain_hash.short_hex().yellow());
    Ok(())
}

fn cmd_log(dir: &str, args: LogArgs) -> anyhow::Result<()> {
    let ledger = open_ledger(dir)?;
    let records = ledger.read_all()?;
    if records.is_empty() {
        println!("Ledger is empty.");
        return Ok(());
    }

    for record in records.iter().rev().take(args.limit) {
        if args.oneline {
            println!(
                "{} {} {} {}",
                format!("#{}", record.sequence_no).yellow(),
                record.chain_hash.short_hex().dimmed(),
                record.event_type.cyan(),
                record.actor_id
            );
        } else {
            println!(
                "{}  {}  ({})",
                format!("#{}", record.sequence_no).yellow().bold(),
                record.chain_hash.short_hex().dimmed(),
                record.ts
            );
            println!("  Event: {} | Actor: {}", record.event_type.cyan(), record.actor_id);
            if !record.payload.is_empty() {
                println!("  Payload: {}", serde_json::to_string(&record.payload)?);
            }
        }
    }
    Ok(())
}

fn cmd_verify(dir: &str, format: &OutputFormat) -> anyhow::Result<()> {
    let config = LedgerConfig::in_dir(Path::new(dir));
    let key = Keystore::load_public_key(&config.public_key_path)
        .with_context(|| format!("loading public key from {}", config.public_key_path.display()))?;
    let report = verify_ledger(&config.ledger_path, &key)?;

    if let OutputFormat::Json = format {
        println!(
            "{}",
            serde_json::json!({
                "valid": report.valid,
                "totalRecords": report.total_records,
                "verifiedRecords": report.verified_records,
                "firstBrokenAt": report.first_broken_at.as_ref().map(|b| serde_json::json!({
                    "seq": b.seq,
                    "reason": b.reason.to_string(),
                })),
                "chainRoot": report.chain_root.map(|h| h.to_hex()),
                "chainHead": report.chain_head.map(|h| h.to_hex()),
            })
        );
    } else if report.valid {
        println!("{} Ledger chain verified", "✓".green().bold());
        println!(
            "  Records: {} verified of {}",
            report.verified_records.to_string().bold(),
            report.total_records
        );
        if let Some(head) = report.chain_head {
            println!("  Chain head: {}", head.short_hex().yellow());
        }
    } else {
        let broken = report.first_broken_at.as_ref();
        println!("{} Ledger chain BROKEN", "✗".red().bold());
        println!(
            "  Records: {} verified of {}",
            report.verified_records.to_string().bold(),
            report.total_records
        );
        if let Some(b) = broken {
            println!("  First break: record #{} — {}", b.seq.to_string().red(), b.reason);
        }
    }

    if report.valid {
        Ok(())
    } else {
        bail!("ledger verification failed")
    }
}

fn cmd_cite(dir: &str, args: CiteArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let document =
        std::fs::read(&args.file).with_context(|| format!("reading document {}", args.file))?;

    let base = Path::new(dir);
    let ledger = Arc::new(open_ledger(dir)?);
    let service = CitationService::new(
        Arc::clone(&ledger) as Arc<dyn Signer>,
        Arc::clone(&ledger) as Arc<dyn CustodyChain>,
        Arc::new(JsonlEvidenceStore::new(&base.join("evidence.jsonl"))) as Arc<dyn EvidenceStore>,
        Arc::new(JsonlAuditLog::new(&base.join("audit.log"))) as Arc<dyn AuditSink>,
        CitationConfig {
            receipt_dir: Some(base.join("receipts")),
        },
    );

    let meta: Meta = args
        .meta
        .iter()
        .map(|raw| parse_kv(raw))
        .collect::<anyhow::Result<_>>()?;
    let citation = service.cite(
        &document,
        &args.doc_type,
        &args.subject,
        &args.created_by,
        meta,
    )?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&citation)?);
        return Ok(());
    }

    println!("{} Citation issued", "✓".green().bold());
    println!("  Citation: {}", citation.citation_id.to_string().yellow());
    println!("  Document: {}", citation.document_hash.short_hex().cyan());
    println!("  Key id: {}", citation.key_id.to_string().yellow());
    match citation.custody_sequence {
        Some(seq) => println!("  Custody: record #{}", seq.to_string().bold()),
        None => println!("  Custody: {}", "DEGRADED — not chained".red().bold()),
    }
    println!(
        "  Receipt: {}",
        base.join("receipts")
            .join(format!("{}.json", citation.citation_id))
            .display()
    );
    Ok(())
}

fn cmd_verify_citation(
    dir: &str,
    args: VerifyCitationArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let document =
        std::fs::read(&args.file).with_context(|| format!("reading document {}", args.file))?;
    let receipt = std::fs::read_to_string(&args.citation)
        .with_context(|| format!("reading citation {}", args.citation))?;
    let citation: CitationRecord =
        serde_json::from_str(&receipt).context("parsing citation receipt")?;

    let key_path = args
        .key
        .map(Into::into)
        .unwrap_or_else(|| LedgerConfig::in_dir(Path::new(dir)).public_key_path);
    let key = Keystore::load_public_key(&key_path)
        .with_context(|| format!("loading public key from {}", key_path.display()))?;

    let result = verify_citation(&document, &citation, &key);

    if let OutputFormat::Json = format {
        println!(
            "{}",
            serde_json::json!({
                "valid": result.valid,
                "checks": result.checks.iter().map(|c| serde_json::json!({
                    "name": c.name,
                    "passed": c.passed,
                    "expected": c.expected,
                    "actual": c.actual,
                })).collect::<Vec<_>>(),
            })
        );
    } else {
        for check in &result.checks {
            let mark = if check.passed {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            println!("{mark} {}", check.name);
            if !check.passed {
                println!("    expected: {}", check.expected);
                println!("    actual:   {}", check.actual);
            }
        }
        if result.valid {
            println!("{} Citation verified", "✓".green().bold());
        } else {
            println!("{} Citation verification FAILED", "✗".red().bold());
        }
    }

    if result.valid {
        Ok(())
    } else {
        bail!("citation verification failed")
    }
}
