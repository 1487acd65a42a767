//! Subcommand implementations. Output goes to the supplied writer; logs go
//! to stderr.

use std::{io::Write, path::Path};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use matoba_core::{
  archive::{rebuild_index, scan_records},
  history::{person_history, tournament_history as participant_history},
  person::{Issue, PersonRegistry, Severity, assign_person_ids, audit, format_person_id},
  results::PersonId,
  store::ArchiveStore,
  tournament::ParticipantName,
};

// ─── persons build ───────────────────────────────────────────────────────────

pub async fn build_registry<S: ArchiveStore>(
  store: &S,
  dry_run: bool,
  out: &mut impl Write,
) -> Result<()> {
  let scan = scan_records(store).await?;
  for (period, e) in &scan.unreadable {
    writeln!(out, "skipped {period}: {e}")?;
  }

  let registry = PersonRegistry::build(&scan.records, Utc::now());
  writeln!(out, "scanned {} periods", scan.records.len())?;
  writeln!(out, "registered {} persons", registry.persons.len())?;
  writeln!(out, "next person id: {}", format_person_id(registry.next_person_id))?;

  let keyed = registry.persons.iter().filter(|p| p.person_key.is_some()).count();
  if keyed > 0 {
    writeln!(out, "persons with a personKey: {keyed}")?;
  }
  if let Some(top) = registry.persons.iter().max_by_key(|p| p.appearance_count) {
    writeln!(out, "most appearances: {} ({})", top.name, top.appearance_count)?;
  }

  if dry_run {
    writeln!(out, "dry run; persons.json not written")?;
    return Ok(());
  }
  store.save_registry(registry).await?;
  Ok(())
}

// ─── persons assign ──────────────────────────────────────────────────────────

pub async fn assign_ids<S: ArchiveStore>(
  store: &S,
  dry_run: bool,
  out: &mut impl Write,
) -> Result<()> {
  let mut registry = store
    .load_registry()
    .await?
    .context("persons.json not found; run `matoba persons build` first")?;

  let mut scan = scan_records(store).await?;
  if !scan.unreadable.is_empty() {
    bail!("{} period(s) could not be read; fix them before assigning ids", scan.unreadable.len());
  }

  let report = assign_person_ids(&mut registry, &mut scan.records, Utc::now());
  for person in &report.new_persons {
    match &person.person_key {
      Some(key) => writeln!(out, "{}: {} ({key})", person.person_id, person.name)?,
      None => writeln!(out, "{}: {}", person.person_id, person.name)?,
    }
  }
  writeln!(
    out,
    "assigned {} rows in {} periods; {} new persons",
    report.assigned,
    report.changed_periods.len(),
    report.new_persons.len()
  )?;

  if dry_run {
    writeln!(out, "dry run; nothing written")?;
    return Ok(());
  }

  for record in scan.records {
    if report.changed_periods.contains(&record.period) {
      store.save_period(record.period, record.entries).await?;
    }
  }
  if !report.new_persons.is_empty() {
    store.save_registry(registry).await?;
  }
  Ok(())
}

// ─── persons check ───────────────────────────────────────────────────────────

pub async fn check<S: ArchiveStore>(store: &S, out: &mut impl Write) -> Result<()> {
  let registry = store
    .load_registry()
    .await?
    .context("persons.json not found; run `matoba persons build` first")?;

  let scan = scan_records(store).await?;
  let mut issues: Vec<Issue> = scan
    .unreadable
    .iter()
    .map(|(period, e)| Issue::unreadable(*period, e))
    .collect();
  issues.extend(audit(&registry, &scan.records));

  if issues.is_empty() {
    writeln!(out, "no problems found")?;
    return Ok(());
  }

  issues.sort_by_key(|i| i.severity());
  for issue in &issues {
    writeln!(out, "{}: {issue}", issue.severity())?;
  }

  let errors = issues.iter().filter(|i| i.severity() == Severity::Error).count();
  let warnings = issues.len() - errors;
  writeln!(out, "{errors} error(s), {warnings} warning(s)")?;
  if errors > 0 {
    bail!("person registry check failed");
  }
  Ok(())
}

// ─── persons report ──────────────────────────────────────────────────────────

/// Render the registry as Markdown to `path`, or to `out` when no path is
/// given.
pub async fn report<S: ArchiveStore>(
  store: &S,
  path: Option<&Path>,
  out: &mut impl Write,
) -> Result<()> {
  let registry = store
    .load_registry()
    .await?
    .context("persons.json not found; run `matoba persons build` first")?;
  let markdown = crate::report::render(&registry, Utc::now());

  let Some(path) = path else {
    out.write_all(markdown.as_bytes())?;
    return Ok(());
  };
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  tokio::fs::write(path, &markdown)
    .await
    .with_context(|| format!("writing {}", path.display()))?;
  writeln!(out, "wrote {} ({} persons)", path.display(), registry.persons.len())?;
  Ok(())
}

// ─── reindex ─────────────────────────────────────────────────────────────────

pub async fn reindex<S: ArchiveStore>(store: &S, out: &mut impl Write) -> Result<()> {
  let before = store.load_index().await.map(|i| i.archives.len()).ok();
  let index = rebuild_index(store).await?;
  match before {
    Some(n) => writeln!(out, "index rebuilt: {n} -> {} entries", index.archives.len())?,
    None => writeln!(out, "index rebuilt: {} entries", index.archives.len())?,
  }
  Ok(())
}

// ─── history ─────────────────────────────────────────────────────────────────

pub async fn history<S: ArchiveStore>(
  store: &S,
  person_id: &str,
  out: &mut impl Write,
) -> Result<()> {
  let person_id = PersonId::parse(person_id)?;
  let Some(history) = person_history(store, &person_id).await? else {
    bail!("no results for {person_id}");
  };
  serde_json::to_writer_pretty(&mut *out, &history)?;
  writeln!(out)?;
  Ok(())
}

pub async fn tournament_history<S: ArchiveStore>(
  store: &S,
  name: &str,
  out: &mut impl Write,
) -> Result<()> {
  let name = ParticipantName::parse(name)?;
  let Some(history) = participant_history(store, &name).await? else {
    bail!("no tournament results for {}", name.as_str());
  };
  serde_json::to_writer_pretty(&mut *out, &history)?;
  writeln!(out)?;
  Ok(())
}
