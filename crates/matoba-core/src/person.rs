//! The person registry and its maintenance passes.
//!
//! The registry (`persons/persons.json`) records every stable person id
//! handed out so far. It is derived data: [`PersonRegistry::build`]
//! regenerates it from the stored periods, [`assign_person_ids`] fills in
//! ids on legacy rows, and [`audit`] cross-checks the two.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, period::Period, results::PeriodRecord};

pub const REGISTRY_VERSION: &str = "1.0.0";

const PERSON_ID_PREFIX: &str = "person_";

/// Render the `n`th person id, e.g. `person_007`.
pub fn format_person_id(n: u32) -> String { format!("{PERSON_ID_PREFIX}{n:03}") }

/// The numeric suffix of a person id.
pub fn person_number(person_id: &str) -> Result<u32> {
  person_id
    .strip_prefix(PERSON_ID_PREFIX)
    .and_then(|digits| digits.parse().ok())
    .ok_or_else(|| Error::MalformedPersonId(person_id.to_owned()))
}

/// Whether `person_id` is in canonical `person_NNN` form.
fn is_canonical(person_id: &str) -> bool {
  person_id
    .strip_prefix(PERSON_ID_PREFIX)
    .is_some_and(|d| d.len() == 3 && d.bytes().all(|b| b.is_ascii_digit()))
}

/// Key under which a person is matched by name: the display name, or
/// `name_personKey` when a disambiguating key is present.
fn identity_key(name: &str, person_key: Option<&str>) -> String {
  match person_key.filter(|k| !k.is_empty()) {
    Some(key) => format!("{name}_{key}"),
    None => name.to_owned(),
  }
}

fn key_note(person_key: Option<&str>) -> String {
  match person_key.filter(|k| !k.is_empty()) {
    Some(key) => format!("personKey=\"{key}\" で同名の別人と区別"),
    None => String::new(),
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
  pub person_id:        String,
  pub name:             String,
  pub person_key:       Option<String>,
  pub first_appearance: Period,
  pub last_appearance:  Period,
  pub appearance_count: u32,
  pub created_at:       DateTime<Utc>,
  #[serde(default)]
  pub note:             String,
}

impl PersonRecord {
  fn first_seen(
    person_id: &str,
    name: &str,
    person_key: Option<&str>,
    period: Period,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      person_id:        person_id.to_owned(),
      name:             name.to_owned(),
      person_key:       person_key.filter(|k| !k.is_empty()).map(str::to_owned),
      first_appearance: period,
      last_appearance:  period,
      appearance_count: 1,
      created_at:       now,
      note:             key_note(person_key),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRegistry {
  pub version:        String,
  pub last_updated:   DateTime<Utc>,
  pub next_person_id: u32,
  pub persons:        Vec<PersonRecord>,
}

impl PersonRegistry {
  /// Regenerate the registry from stored period records.
  ///
  /// Records are visited oldest first, so each person's first appearance
  /// and display name come from the earliest period they appear in.
  /// Placeholder rows and rows without a person id are ignored.
  pub fn build(records: &[PeriodRecord], now: DateTime<Utc>) -> Self {
    let mut sorted: Vec<&PeriodRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.period);

    let mut persons: BTreeMap<String, PersonRecord> = BTreeMap::new();
    for record in sorted {
      for entry in record.entries.iter().filter(|e| !e.is_empty) {
        let Some(person_id) = entry.person_id() else { continue };
        match persons.get_mut(person_id) {
          Some(person) => {
            person.appearance_count += 1;
            person.last_appearance = person.last_appearance.max(record.period);
          }
          None => {
            let person = PersonRecord::first_seen(
              person_id,
              &entry.name,
              entry.person_key.as_deref(),
              record.period,
              now,
            );
            persons.insert(person_id.to_owned(), person);
          }
        }
      }
    }

    let mut persons: Vec<PersonRecord> = persons.into_values().collect();
    persons.sort_by_key(|p| person_number(&p.person_id).unwrap_or(u32::MAX));

    let max = persons
      .iter()
      .filter_map(|p| person_number(&p.person_id).ok())
      .max()
      .unwrap_or(0);

    Self {
      version: REGISTRY_VERSION.to_owned(),
      last_updated: now,
      next_person_id: max + 1,
      persons,
    }
  }

  pub fn get(&self, person_id: &str) -> Option<&PersonRecord> {
    self.persons.iter().find(|p| p.person_id == person_id)
  }
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// Outcome of [`assign_person_ids`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AssignReport {
  /// Periods whose records were modified and must be written back.
  pub changed_periods: Vec<Period>,
  /// Rows that received an id.
  pub assigned:        usize,
  /// Registry entries minted during this pass.
  pub new_persons:     Vec<PersonRecord>,
}

/// Give every non-placeholder row lacking a person id an id.
///
/// Rows are matched to existing persons by name, or by `name_personKey`
/// when a key is set. Unseen identities get the next `person_NNN` id and
/// are appended to `registry`. `records` is sorted oldest first in place;
/// modified records have `updated_at` set to `now`.
pub fn assign_person_ids(
  registry: &mut PersonRegistry,
  records: &mut [PeriodRecord],
  now: DateTime<Utc>,
) -> AssignReport {
  let mut by_identity: HashMap<String, String> = registry
    .persons
    .iter()
    .map(|p| (identity_key(&p.name, p.person_key.as_deref()), p.person_id.clone()))
    .collect();

  records.sort_by_key(|r| r.period);

  let mut report = AssignReport::default();
  let mut next = registry.next_person_id;

  for record in records.iter_mut() {
    let mut modified = false;
    for entry in record.entries.iter_mut().filter(|e| !e.is_empty) {
      if entry.person_id().is_some() {
        continue;
      }
      let key = identity_key(&entry.name, entry.person_key.as_deref());
      let person_id = match by_identity.get(&key) {
        Some(id) => id.clone(),
        None => {
          let id = format_person_id(next);
          next += 1;
          tracing::info!(person_id = %id, name = %entry.name, "minted person id");
          report.new_persons.push(PersonRecord::first_seen(
            &id,
            &entry.name,
            entry.person_key.as_deref(),
            record.period,
            now,
          ));
          by_identity.insert(key, id.clone());
          id
        }
      };
      entry.person_id = Some(person_id);
      report.assigned += 1;
      modified = true;
    }
    if modified {
      record.updated_at = now;
      report.changed_periods.push(record.period);
    }
  }

  if !report.new_persons.is_empty() {
    registry.persons.extend(report.new_persons.iter().cloned());
    registry.next_person_id = next;
    registry.last_updated = now;
  }
  report
}

// ─── Audit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
  DuplicatePersonId,
  InvalidPersonIdFormat,
  InvalidNextPersonId,
  MissingInRegistry,
  FileReadError,
  NameMismatch,
  UnusedPersonId,
  AppearanceCountMismatch,
  MissingPersonKey,
}

impl IssueKind {
  pub fn severity(self) -> Severity {
    match self {
      Self::DuplicatePersonId
      | Self::InvalidPersonIdFormat
      | Self::InvalidNextPersonId
      | Self::MissingInRegistry
      | Self::FileReadError => Severity::Error,
      Self::NameMismatch
      | Self::UnusedPersonId
      | Self::AppearanceCountMismatch
      | Self::MissingPersonKey => Severity::Warning,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
  pub kind:    IssueKind,
  pub message: String,
}

impl Issue {
  fn new(kind: IssueKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into() }
  }

  /// A period that could not be read while collecting records to audit.
  pub fn unreadable(period: Period, error: impl std::fmt::Display) -> Self {
    Self::new(IssueKind::FileReadError, format!("could not read {period}: {error}"))
  }

  pub fn severity(&self) -> Severity { self.kind.severity() }
}

impl std::fmt::Display for Issue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}", self.kind, self.message)
  }
}

/// Cross-check the registry against the stored period records.
pub fn audit(registry: &PersonRegistry, records: &[PeriodRecord]) -> Vec<Issue> {
  let mut issues = Vec::new();

  let mut seen = HashSet::new();
  for person in &registry.persons {
    if !seen.insert(person.person_id.as_str()) {
      issues.push(Issue::new(
        IssueKind::DuplicatePersonId,
        format!("duplicate person id {} ({})", person.person_id, person.name),
      ));
    }
    if !is_canonical(&person.person_id) {
      issues.push(Issue::new(
        IssueKind::InvalidPersonIdFormat,
        format!("malformed person id {:?} ({})", person.person_id, person.name),
      ));
    }
  }

  let max = registry
    .persons
    .iter()
    .filter_map(|p| person_number(&p.person_id).ok())
    .max();
  if let Some(max) = max.filter(|max| registry.next_person_id <= *max) {
    issues.push(Issue::new(
      IssueKind::InvalidNextPersonId,
      format!("nextPersonId {} is not above the highest id in use ({max})", registry.next_person_id),
    ));
  }

  let mut sorted: Vec<&PeriodRecord> = records.iter().collect();
  sorted.sort_by_key(|r| r.period);

  let mut counts: HashMap<&str, u32> = HashMap::new();
  for record in sorted {
    for entry in record.entries.iter().filter(|e| !e.is_empty) {
      let Some(person_id) = entry.person_id() else { continue };
      match registry.get(person_id) {
        None => issues.push(Issue::new(
          IssueKind::MissingInRegistry,
          format!("{person_id} ({}) in {} is not registered", entry.name, record.period),
        )),
        Some(person) => {
          if person.name != entry.name {
            issues.push(Issue::new(
              IssueKind::NameMismatch,
              format!(
                "{person_id} is registered as {} but appears as {} in {}",
                person.name, entry.name, record.period
              ),
            ));
          }
          *counts.entry(person.person_id.as_str()).or_default() += 1;
        }
      }
    }
  }

  for person in &registry.persons {
    let actual = counts.get(person.person_id.as_str()).copied().unwrap_or(0);
    if actual == 0 {
      issues.push(Issue::new(
        IssueKind::UnusedPersonId,
        format!("{} ({}) does not appear in any period", person.person_id, person.name),
      ));
    }
    if actual != person.appearance_count {
      issues.push(Issue::new(
        IssueKind::AppearanceCountMismatch,
        format!(
          "{} ({}) is registered with {} appearances but has {actual}",
          person.person_id, person.name, person.appearance_count
        ),
      ));
    }
  }

  let mut by_name: BTreeMap<&str, Vec<&PersonRecord>> = BTreeMap::new();
  for person in &registry.persons {
    by_name.entry(person.name.as_str()).or_default().push(person);
  }
  for (name, group) in by_name.into_iter().filter(|(_, g)| g.len() > 1) {
    let missing = group.iter().filter(|p| p.person_key.is_none()).count();
    if missing > 0 {
      issues.push(Issue::new(
        IssueKind::MissingPersonKey,
        format!(
          "{} persons are named {name} but {missing} of them lack a personKey",
          group.len()
        ),
      ));
    }
  }

  issues
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::{
    results::ResultEntry,
    testing::{entry, period},
  };

  fn ts(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

  fn record(year: i32, month: u32, entries: Vec<ResultEntry>) -> PeriodRecord {
    PeriodRecord { period: period(year, month), entries, published_at: ts(0), updated_at: ts(0) }
  }

  fn unassigned(rank: u32, name: &str) -> ResultEntry { ResultEntry::new(rank, name, "1寸") }

  fn kinds(issues: &[Issue]) -> Vec<IssueKind> { issues.iter().map(|i| i.kind).collect() }

  #[test]
  fn person_ids_format_and_parse() {
    assert_eq!(format_person_id(7), "person_007");
    assert_eq!(format_person_id(1234), "person_1234");
    assert_eq!(person_number("person_042").unwrap(), 42);
    assert!(matches!(person_number("guest_1"), Err(Error::MalformedPersonId(_))));
    assert!(is_canonical("person_001"));
    assert!(!is_canonical("person_1"));
  }

  #[test]
  fn build_tracks_appearances() {
    let mut placeholder = entry(3, "person_009", "", "-");
    placeholder.is_empty = true;
    let records = vec![
      record(2024, 3, vec![entry(1, "person_002", "佐藤", "1寸")]),
      record(2024, 1, vec![
        entry(1, "person_001", "山田", "1寸"),
        entry(2, "person_002", "佐藤", "1寸"),
      ]),
      record(2024, 2, vec![entry(1, "person_001", "山田", "1寸"), placeholder]),
    ];

    let registry = PersonRegistry::build(&records, ts(5));
    assert_eq!(registry.next_person_id, 3);
    assert_eq!(registry.persons.len(), 2);

    let sato = registry.get("person_002").unwrap();
    assert_eq!(sato.first_appearance, period(2024, 1));
    assert_eq!(sato.last_appearance, period(2024, 3));
    assert_eq!(sato.appearance_count, 2);
    assert_eq!(registry.persons[0].person_id, "person_001");
  }

  #[test]
  fn build_notes_person_keys() {
    let mut e = entry(1, "person_001", "山田", "1寸");
    e.person_key = Some("A".into());
    let registry = PersonRegistry::build(&[record(2024, 1, vec![e])], ts(0));
    assert_eq!(registry.persons[0].person_key.as_deref(), Some("A"));
    assert!(registry.persons[0].note.contains("personKey=\"A\""));
  }

  #[test]
  fn assign_reuses_and_mints_ids() {
    let mut registry =
      PersonRegistry::build(&[record(2024, 1, vec![entry(1, "person_001", "山田", "1寸")])], ts(0));

    let mut keyed = unassigned(2, "山田");
    keyed.person_key = Some("B".into());
    let mut records = vec![
      record(2024, 2, vec![unassigned(1, "山田"), keyed]),
      record(2024, 3, vec![unassigned(1, "鈴木"), entry(2, "person_001", "山田", "1寸")]),
    ];

    let report = assign_person_ids(&mut registry, &mut records, ts(9));
    assert_eq!(report.assigned, 3);
    assert_eq!(report.changed_periods, [period(2024, 2), period(2024, 3)]);

    let ids: Vec<_> = records[0].entries.iter().map(|e| e.person_id().unwrap()).collect();
    assert_eq!(ids, ["person_001", "person_002"]);
    assert_eq!(records[1].entries[0].person_id(), Some("person_003"));
    assert_eq!(records[1].updated_at, ts(9));

    assert_eq!(report.new_persons.len(), 2);
    assert_eq!(registry.next_person_id, 4);
    assert_eq!(registry.persons.len(), 3);
  }

  #[test]
  fn assign_without_work_leaves_registry() {
    let mut registry = PersonRegistry::build(&[], ts(0));
    let mut records = vec![record(2024, 1, vec![entry(1, "person_001", "山田", "1寸")])];
    let before = registry.clone();
    let report = assign_person_ids(&mut registry, &mut records, ts(9));
    assert_eq!(report, AssignReport::default());
    assert_eq!(registry, before);
  }

  #[test]
  fn clean_registry_audits_clean() {
    let records = vec![
      record(2024, 1, vec![entry(1, "person_001", "山田", "1寸")]),
      record(2024, 2, vec![entry(1, "person_001", "山田", "1寸")]),
    ];
    let registry = PersonRegistry::build(&records, ts(0));
    assert!(audit(&registry, &records).is_empty());
  }

  #[test]
  fn audit_reports_registry_problems() {
    let records = vec![record(2024, 1, vec![
      entry(1, "person_001", "山田太郎", "1寸"),
      entry(2, "person_077", "佐藤", "1寸"),
    ])];
    let mut registry = PersonRegistry::build(&records[..0], ts(0));
    let base = PersonRecord::first_seen("person_001", "山田", None, period(2024, 1), ts(0));
    registry.persons = vec![
      base.clone(),
      PersonRecord { person_id: "person_1".into(), ..base.clone() },
      base.clone(),
    ];
    registry.next_person_id = 1;

    let found = kinds(&audit(&registry, &records));
    for kind in [
      IssueKind::DuplicatePersonId,
      IssueKind::InvalidPersonIdFormat,
      IssueKind::InvalidNextPersonId,
      IssueKind::MissingInRegistry,
      IssueKind::NameMismatch,
      IssueKind::UnusedPersonId,
      IssueKind::MissingPersonKey,
    ] {
      assert!(found.contains(&kind), "missing {kind} in {found:?}");
    }
  }

  #[test]
  fn audit_flags_count_drift() {
    let records = vec![record(2024, 1, vec![entry(1, "person_001", "山田", "1寸")])];
    let mut registry = PersonRegistry::build(&records, ts(0));
    registry.persons[0].appearance_count = 4;
    let issues = audit(&registry, &records);
    assert_eq!(kinds(&issues), [IssueKind::AppearanceCountMismatch]);
    assert_eq!(issues[0].severity(), Severity::Warning);
    assert!(issues[0].to_string().starts_with("[APPEARANCE_COUNT_MISMATCH]"));
  }
}
