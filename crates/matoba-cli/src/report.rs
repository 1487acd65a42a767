//! Markdown rendering of the person registry (`persons.md`).

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Utc};
use matoba_core::person::{PersonRegistry, format_person_id};

/// Timestamps are shown in Japan Standard Time.
const JST_OFFSET_SECS: i32 = 9 * 3600;

fn jst(at: DateTime<Utc>) -> String {
  match FixedOffset::east_opt(JST_OFFSET_SECS) {
    Some(offset) => at.with_timezone(&offset).format("%Y/%m/%d %H:%M:%S").to_string(),
    None => at.format("%Y/%m/%d %H:%M:%S UTC").to_string(),
  }
}

/// Render `registry` as the `persons.md` overview.
pub fn render(registry: &PersonRegistry, generated_at: DateTime<Utc>) -> String {
  let persons = &registry.persons;
  let keyed: Vec<_> = persons.iter().filter(|p| p.person_key.is_some()).collect();
  let total: u32 = persons.iter().map(|p| p.appearance_count).sum();
  let most = persons.iter().map(|p| p.appearance_count).max();
  let top = persons.iter().find(|p| Some(p.appearance_count) == most);

  // Writing to a String cannot fail.
  let mut md = String::new();
  let _ = writeln!(md, "# PersonID 一覧");
  let _ = writeln!(md);
  let _ = writeln!(md, "> このファイルは `persons.json` から自動生成されています。");
  let _ = writeln!(md, "> 直接編集せず、`matoba persons report` で再生成してください。");
  let _ = writeln!(md);
  let _ = writeln!(md, "**最終更新**: {}", jst(registry.last_updated));
  let _ = writeln!(md, "**次のpersonId**: {}", format_person_id(registry.next_person_id));
  let _ = writeln!(md, "**登録人数**: {}名", persons.len());
  let _ = writeln!(md);

  let _ = writeln!(md, "## 一覧");
  let _ = writeln!(md);
  let _ = writeln!(md, "| personId | 名前 | personKey | 初登場 | 最終登場 | 回数 | 備考 |");
  let _ = writeln!(md, "|----------|------|-----------|--------|---------|------|------|");
  for p in persons {
    let _ = writeln!(
      md,
      "| {} | {} | {} | {} | {} | {} | {} |",
      p.person_id,
      p.name,
      p.person_key.as_deref().unwrap_or("-"),
      p.first_appearance,
      p.last_appearance,
      p.appearance_count,
      p.note,
    );
  }
  let _ = writeln!(md);

  let _ = writeln!(md, "## 統計");
  let _ = writeln!(md);
  let _ = writeln!(md, "- 総登録人数: {}名", persons.len());
  let _ = writeln!(md, "- personKey使用: {}名", keyed.len());
  let _ = writeln!(md, "- 総登場回数: {total}回");
  if let Some(top) = top {
    let _ = writeln!(md, "- 最多登場: {} ({}回)", top.name, top.appearance_count);
  }
  let _ = writeln!(md);

  if !keyed.is_empty() {
    let _ = writeln!(md, "## personKey 使用者");
    let _ = writeln!(md);
    let _ = writeln!(md, "同名の別人を区別するために personKey を使用している人の一覧:");
    let _ = writeln!(md);
    let _ = writeln!(md, "| personId | 名前 | personKey | 備考 |");
    let _ = writeln!(md, "|----------|------|-----------|------|");
    for p in keyed {
      let key = p.person_key.as_deref().unwrap_or_default();
      let _ = writeln!(md, "| {} | {} | {key} | {} |", p.person_id, p.name, p.note);
    }
    let _ = writeln!(md);
  }

  let _ = writeln!(md, "---");
  let _ = writeln!(md);
  let _ = writeln!(md, "*生成日時: {}*", jst(generated_at));
  md
}
