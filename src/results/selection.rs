//! Per-framework selection sets and the tables built from them.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::frameworks::{Framework, FrameworkResult};
use crate::schemas::Entity;

/// Ids one framework selected, deduplicated, remembering first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderedIds {
    members: BTreeSet<String>,
    order: Vec<String>,
}

impl OrderedIds {
    pub fn insert(&mut self, id: &str) -> bool {
        if self.members.insert(id.to_string()) {
            self.order.push(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    /// Ids in the order the backend ranked them.
    pub fn in_order(&self) -> &[String] {
        &self.order
    }
}

/// Framework tag → ids it selected. All three tags are always present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    utilitarian: OrderedIds,
    fairness: OrderedIds,
    rule_based: OrderedIds,
}

impl SelectionSet {
    fn ids(&self, framework: Framework) -> &OrderedIds {
        match framework {
            Framework::Utilitarian => &self.utilitarian,
            Framework::Fairness => &self.fairness,
            Framework::RuleBased => &self.rule_based,
        }
    }

    fn ids_mut(&mut self, framework: Framework) -> &mut OrderedIds {
        match framework {
            Framework::Utilitarian => &mut self.utilitarian,
            Framework::Fairness => &mut self.fairness,
            Framework::RuleBased => &mut self.rule_based,
        }
    }

    pub fn get(&self, framework: Framework) -> &BTreeSet<String> {
        self.ids(framework).members()
    }

    pub fn ranked(&self, framework: Framework) -> &[String] {
        self.ids(framework).in_order()
    }

    pub fn contains(&self, framework: Framework, id: &str) -> bool {
        self.get(framework).contains(id)
    }

    /// Ids selected by any framework, each once: frameworks in priority
    /// order, each framework's ids in backend rank order.
    pub fn union(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for fw in Framework::ALL {
            for id in self.ranked(fw) {
                if seen.insert(id.as_str()) {
                    out.push(id.clone());
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        Framework::ALL.iter().all(|fw| self.get(*fw).is_empty())
    }
}

/// Group every result's selected ids by framework. Ids are already strings
/// after validation, so `42` and `"42"` collapse to one entry.
pub fn build_selection_sets(results: &[FrameworkResult]) -> SelectionSet {
    let mut sets = SelectionSet::default();
    for result in results {
        let set = sets.ids_mut(result.framework);
        for id in &result.selected_ids {
            set.insert(id);
        }
    }
    sets
}

/// Scenario entities keyed by their string id; later duplicates win.
pub fn entities_by_id(entities: &[Entity]) -> HashMap<String, &Entity> {
    entities.iter().map(|e| (e.id.clone(), e)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Column sort for the selected-candidates table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: "id".to_string(),
            direction: SortDirection::Ascending,
        }
    }
}

impl SortSpec {
    /// Clicking a header selects that column and flips the direction.
    pub fn click(&mut self, key: &str) {
        self.key = key.to_string();
        self.direction = self.direction.flipped();
    }
}

/// One row of the selected-candidates table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRow {
    pub id: String,
    pub entity: Option<Entity>,
    pub utilitarian: bool,
    pub fairness: bool,
    pub rule_based: bool,
}

impl SelectedRow {
    pub fn selected_by(&self, framework: Framework) -> bool {
        match framework {
            Framework::Utilitarian => self.utilitarian,
            Framework::Fairness => self.fairness,
            Framework::RuleBased => self.rule_based,
        }
    }

    /// Name when known, else the id.
    pub fn label(&self) -> String {
        match self.entity.as_ref().and_then(|e| e.attribute("name")) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => self.id.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn column(&self, key: &str) -> String {
        match &self.entity {
            Some(e) => e.display(key),
            None if key == "id" => self.id.clone(),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(entities: &HashMap<String, &Entity>, id: &str, key: &str) -> SortKey {
    if key == "id" {
        // Ids are coerced to strings; numeric ones still sort as numbers.
        return match entities.get(id) {
            Some(e) => match e.id.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => SortKey::Number(n),
                _ => SortKey::Text(e.id.to_lowercase()),
            },
            None => SortKey::Text(String::new()),
        };
    }
    match entities.get(id).and_then(|e| e.attribute(key)) {
        Some(Value::Number(n)) => SortKey::Number(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) => SortKey::Text(s.to_lowercase()),
        Some(Value::Null) | None => SortKey::Text(String::new()),
        Some(other) => SortKey::Text(other.to_string().to_lowercase()),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        // Mixed kinds order numbers first so the sort stays total.
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
    }
}

/// Union of every framework's selection, sorted by `sort` and cut to `limit`.
pub fn selected_rows(
    entities: &[Entity],
    sets: &SelectionSet,
    sort: &SortSpec,
    limit: usize,
) -> Vec<SelectedRow> {
    let by_id = entities_by_id(entities);
    let mut ids = sets.union();
    ids.sort_by(|a, b| {
        let ord = compare_keys(
            &sort_key(&by_id, a, &sort.key),
            &sort_key(&by_id, b, &sort.key),
        );
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    ids.truncate(limit);
    ids.into_iter()
        .map(|id| SelectedRow {
            entity: by_id.get(&id).map(|e| (*e).clone()),
            utilitarian: sets.contains(Framework::Utilitarian, &id),
            fairness: sets.contains(Framework::Fairness, &id),
            rule_based: sets.contains(Framework::RuleBased, &id),
            id,
        })
        .collect()
}

/// Row count for the selected table: never fewer than ten.
pub fn selected_table_limit(top_k: i64) -> usize {
    top_k.max(10) as usize
}

/// Records preview: first `limit` entities (or all) with their selection flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordsPreview {
    pub rows: Vec<(Entity, bool)>,
    pub shown: usize,
    pub total: usize,
}

pub fn records_preview(
    entities: &[Entity],
    selected: &BTreeSet<String>,
    limit: usize,
    show_all: bool,
) -> RecordsPreview {
    let shown = if show_all {
        entities.len()
    } else {
        limit.min(entities.len())
    };
    RecordsPreview {
        rows: entities[..shown]
            .iter()
            .map(|e| (e.clone(), selected.contains(&e.id)))
            .collect(),
        shown,
        total: entities.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::RawFrameworkResult;
    use serde_json::json;

    fn result(tag: &str, ids: Value) -> RawFrameworkResult {
        serde_json::from_value(json!({
            "framework": tag,
            "decisions": {"selected_ids": ids}
        }))
        .unwrap()
    }

    fn entity(v: Value) -> Entity {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_numeric_and_string_ids_collapse() {
        let raw = vec![result("utilitarian", json!([42, "42", 7]))];
        let sets = build_selection_sets(&FrameworkResult::from_raw_list(&raw));
        assert_eq!(sets.get(Framework::Utilitarian).len(), 2);
        assert!(sets.contains(Framework::Utilitarian, "42"));
        assert!(sets.get(Framework::Fairness).is_empty());
    }

    #[test]
    fn test_build_is_idempotent() {
        let raw = vec![
            result("fairness", json!(["a", "b"])),
            result("rule_based", json!([1])),
            result("mystery", json!(["z"])),
        ];
        let results = FrameworkResult::from_raw_list(&raw);
        assert_eq!(build_selection_sets(&results), build_selection_sets(&results));
        assert!(!build_selection_sets(&results).union().contains(&"z".to_string()));
    }

    #[test]
    fn test_selected_rows_sort_numeric_and_limit() {
        let entities = vec![
            entity(json!({"id": 1, "name": "Ada", "experience": 9})),
            entity(json!({"id": 2, "name": "bob", "experience": 3})),
            entity(json!({"id": 3, "name": "Cy", "experience": 12})),
        ];
        let raw = vec![
            result("utilitarian", json!([1, 3])),
            result("fairness", json!([2, 3])),
        ];
        let sets = build_selection_sets(&FrameworkResult::from_raw_list(&raw));
        let sort = SortSpec {
            key: "experience".into(),
            direction: SortDirection::Descending,
        };
        let rows = selected_rows(&entities, &sets, &sort, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "3");
        assert!(rows[0].utilitarian && rows[0].fairness && !rows[0].rule_based);
        assert_eq!(rows[1].label(), "Ada");
    }

    #[test]
    fn test_selected_rows_text_sort_is_case_insensitive() {
        let entities = vec![
            entity(json!({"id": "x", "name": "bob"})),
            entity(json!({"id": "y", "name": "Ada"})),
        ];
        let raw = vec![result("rule_based", json!(["x", "y", "unknown"]))];
        let sets = build_selection_sets(&FrameworkResult::from_raw_list(&raw));
        let sort = SortSpec {
            key: "name".into(),
            direction: SortDirection::Ascending,
        };
        let rows = selected_rows(&entities, &sets, &sort, 10);
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        // Missing entity sorts as empty text first.
        assert_eq!(ids, vec!["unknown", "y", "x"]);
        assert_eq!(rows[0].label(), "unknown");
        assert_eq!(rows[0].column("gender"), "-");
    }

    #[test]
    fn test_default_sort_orders_numeric_ids_before_truncating() {
        let entities: Vec<Entity> = (1..=12).map(|i| entity(json!({"id": i}))).collect();
        let ids: Vec<i64> = (1..=12).rev().collect();
        let raw = vec![result("utilitarian", json!(ids))];
        let sets = build_selection_sets(&FrameworkResult::from_raw_list(&raw));
        let rows = selected_rows(&entities, &sets, &SortSpec::default(), 10);
        let got: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
    }

    #[test]
    fn test_union_keeps_backend_rank_order() {
        let raw = vec![
            result("fairness", json!([9, 2])),
            result("utilitarian", json!([11, 3, 2])),
        ];
        let sets = build_selection_sets(&FrameworkResult::from_raw_list(&raw));
        assert_eq!(sets.ranked(Framework::Utilitarian), ["11", "3", "2"]);
        assert_eq!(sets.union(), vec!["11", "3", "2", "9"]);
    }

    #[test]
    fn test_equal_sort_keys_keep_rank_order() {
        let entities = vec![
            entity(json!({"id": 10, "department": "ops"})),
            entity(json!({"id": 2, "department": "ops"})),
            entity(json!({"id": 7, "department": "eng"})),
        ];
        let raw = vec![result("utilitarian", json!([10, 2, 7]))];
        let sets = build_selection_sets(&FrameworkResult::from_raw_list(&raw));
        let sort = SortSpec {
            key: "department".into(),
            direction: SortDirection::Ascending,
        };
        let rows = selected_rows(&entities, &sets, &sort, 10);
        let got: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["7", "10", "2"]);
    }

    #[test]
    fn test_sort_click_flips_direction() {
        let mut sort = SortSpec::default();
        sort.click("name");
        assert_eq!(sort.key, "name");
        assert_eq!(sort.direction, SortDirection::Descending);
        sort.click("experience");
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_selected_table_limit_floor() {
        assert_eq!(selected_table_limit(3), 10);
        assert_eq!(selected_table_limit(25), 25);
    }

    #[test]
    fn test_records_preview_marks_selection() {
        let entities: Vec<Entity> = (0..5).map(|i| entity(json!({"id": i}))).collect();
        let selected = BTreeSet::from(["1".to_string(), "4".to_string()]);
        let preview = records_preview(&entities, &selected, 3, false);
        assert_eq!(preview.shown, 3);
        assert_eq!(preview.total, 5);
        assert!(preview.rows[1].1);
        assert!(!preview.rows[2].1);
        let all = records_preview(&entities, &selected, 3, true);
        assert_eq!(all.rows.len(), 5);
        assert!(all.rows[4].1);
    }
}
