//! The `ArchiveStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `matoba-store-fs`).
//! Higher layers (`matoba-api`, `matoba-server`, `matoba-cli`) depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  period::{Period, TournamentYear},
  person::PersonRegistry,
  results::{ArchiveIndex, PeriodRecord, ResultEntry},
  tournament::{NewTournament, TournamentIndex, TournamentRecord},
};

/// Abstraction over a results archive backend.
///
/// Writes replace whole records: a period or tournament is always
/// resubmitted in full. Every write keeps the matching index in step with
/// the stored records.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ArchiveStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Monthly results ───────────────────────────────────────────────────

  /// The archive index, newest period first. A store with no index yet
  /// returns an empty one.
  fn load_index(
    &self,
  ) -> impl Future<Output = Result<ArchiveIndex, Self::Error>> + Send + '_;

  /// The record for `period`, or `None` if nothing is stored for it.
  fn load_period(
    &self,
    period: Period,
  ) -> impl Future<Output = Result<Option<PeriodRecord>, Self::Error>> + Send + '_;

  /// Replace the entries for `period` and update the index.
  ///
  /// `published_at` is kept from any existing record; `updated_at` is set
  /// to now.
  fn save_period(
    &self,
    period: Period,
    entries: Vec<ResultEntry>,
  ) -> impl Future<Output = Result<PeriodRecord, Self::Error>> + Send + '_;

  /// Delete the record for `period` and its index entry. Returns whether
  /// anything was removed.
  fn delete_period(
    &self,
    period: Period,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Periods physically present in the store, oldest first, independent of
  /// the index.
  fn scan_periods(
    &self,
  ) -> impl Future<Output = Result<Vec<Period>, Self::Error>> + Send + '_;

  /// Overwrite the archive index wholesale.
  fn save_index(
    &self,
    index: ArchiveIndex,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tournaments ───────────────────────────────────────────────────────

  /// The tournament index, newest year first.
  fn load_tournament_index(
    &self,
  ) -> impl Future<Output = Result<TournamentIndex, Self::Error>> + Send + '_;

  fn load_tournament(
    &self,
    year: TournamentYear,
  ) -> impl Future<Output = Result<Option<TournamentRecord>, Self::Error>> + Send + '_;

  /// Replace the tournament for `input.year` and update the index.
  fn save_tournament(
    &self,
    input: NewTournament,
  ) -> impl Future<Output = Result<TournamentRecord, Self::Error>> + Send + '_;

  fn delete_tournament(
    &self,
    year: TournamentYear,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Person registry ───────────────────────────────────────────────────

  fn load_registry(
    &self,
  ) -> impl Future<Output = Result<Option<PersonRegistry>, Self::Error>> + Send + '_;

  fn save_registry(
    &self,
    registry: PersonRegistry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
