use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{DbError, DbResult, Filter, FindMany, OrderBy, Record, Repository, SortDirection};

/// In-memory record store keyed by a monotonically increasing integer id.
#[derive(Debug)]
pub struct MemoryRepository<R: Record> {
    state: RwLock<State<R>>,
}

#[derive(Debug)]
struct State<R> {
    next_id: i64,
    rows: BTreeMap<i64, R>,
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> MemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn matches<R: Record>(record: &R, filter: &Filter) -> DbResult<bool> {
    for (field, condition) in filter.conditions() {
        let value = record.field(field).ok_or_else(|| DbError::UnknownField {
            entity: R::ENTITY,
            field: field.to_string(),
        })?;
        if !condition.matches(&value) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn select<'a, R: Record>(rows: impl Iterator<Item = &'a R>, filter: &Filter) -> DbResult<Vec<&'a R>> {
    let mut selected = Vec::new();
    for row in rows {
        if matches(row, filter)? {
            selected.push(row);
        }
    }
    Ok(selected)
}

fn sort<R: Record>(rows: &mut [&R], order_by: &OrderBy) -> DbResult<()> {
    if let Some(row) = rows.first() {
        if row.field(&order_by.field).is_none() {
            return Err(DbError::UnknownField {
                entity: R::ENTITY,
                field: order_by.field.clone(),
            });
        }
    }

    rows.sort_by(|a, b| {
        let ordering = match (a.field(&order_by.field), b.field(&order_by.field)) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };
        let ordering = match order_by.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id().cmp(&b.id()))
    });
    Ok(())
}

#[async_trait]
impl<R: Record> Repository<R> for MemoryRepository<R> {
    async fn create(&self, draft: R::Draft) -> DbResult<R> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id = id
            .checked_add(1)
            .ok_or(DbError::SequenceExhausted(R::ENTITY))?;

        let record = R::from_draft(id, draft);
        state.rows.insert(id, record.clone());
        tracing::trace!(target: "bookstore-db", entity = R::ENTITY, id, "record inserted");
        Ok(record)
    }

    async fn find_many(&self, query: &FindMany) -> DbResult<Vec<R>> {
        let state = self.state.read().await;
        let mut rows = select(state.rows.values(), &query.filter)?;
        sort(&mut rows, &query.order_by)?;

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(query.take).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count(&self, filter: &Filter) -> DbResult<u64> {
        let state = self.state.read().await;
        let rows = select(state.rows.values(), filter)?;
        Ok(rows.len() as u64)
    }

    async fn find_first(&self, filter: &Filter) -> DbResult<Option<R>> {
        let state = self.state.read().await;
        for row in state.rows.values() {
            if matches(row, filter)? {
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn update(&self, id: i64, patch: R::Patch) -> DbResult<Option<R>> {
        let mut state = self.state.write().await;
        let Some(row) = state.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.apply(patch);
        tracing::trace!(target: "bookstore-db", entity = R::ENTITY, id, "record updated");
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> DbResult<Option<R>> {
        let removed = self.state.write().await.rows.remove(&id);
        if removed.is_some() {
            tracing::trace!(target: "bookstore-db", entity = R::ENTITY, id, "record deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: i64,
        label: String,
        weight: f64,
    }

    struct WidgetPatch {
        label: Option<String>,
        weight: Option<f64>,
    }

    impl Record for Widget {
        type Draft = (String, f64);
        type Patch = WidgetPatch;

        const ENTITY: &'static str = "widget";

        fn id(&self) -> i64 {
            self.id
        }

        fn from_draft(id: i64, (label, weight): Self::Draft) -> Self {
            Self { id, label, weight }
        }

        fn apply(&mut self, patch: Self::Patch) {
            if let Some(label) = patch.label {
                self.label = label;
            }
            if let Some(weight) = patch.weight {
                self.weight = weight;
            }
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(self.id.into()),
                "label" => Some(self.label.as_str().into()),
                "weight" => Some(self.weight.into()),
                _ => None,
            }
        }
    }

    async fn seeded() -> MemoryRepository<Widget> {
        let repo = MemoryRepository::new();
        for (label, weight) in [("Bolt", 3.0), ("nut", 1.0), ("Bolt cutter", 9.5), ("gear", 3.0)] {
            repo.create((label.to_string(), weight)).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = seeded().await;
        let ids: Vec<i64> = repo
            .find_many(&FindMany {
                take: 10,
                ..FindMany::default()
            })
            .await
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn filters_are_conjunctive_and_case_insensitive() {
        let repo = seeded().await;
        let filter = Filter::new().contains("label", "bOLT").equals("weight", 3.0);

        let rows = repo
            .find_many(&FindMany {
                filter: filter.clone(),
                take: 10,
                ..FindMany::default()
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Bolt");
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn integer_filter_matches_float_column() {
        let repo = seeded().await;
        let count = repo
            .count(&Filter::new().equals("weight", 3_i64))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn orders_then_pages() {
        let repo = seeded().await;
        let rows = repo
            .find_many(&FindMany {
                filter: Filter::new(),
                order_by: OrderBy::new("weight", SortDirection::Desc),
                skip: 1,
                take: 2,
            })
            .await
            .unwrap();

        // weight ties are broken by id ascending
        let ids: Vec<i64> = rows.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn unknown_field_is_an_error() {
        let repo = seeded().await;
        let err = repo
            .count(&Filter::new().equals("colour", "red"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownField { field, .. } if field == "colour"));

        let err = repo
            .find_many(&FindMany {
                order_by: OrderBy::new("colour", SortDirection::Asc),
                take: 1,
                ..FindMany::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownField { .. }));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = seeded().await;

        let updated = repo
            .update(
                2,
                WidgetPatch {
                    label: Some("washer".into()),
                    weight: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.label, "washer");
        assert_eq!(updated.weight, 1.0);

        let missing = repo
            .update(
                99,
                WidgetPatch {
                    label: None,
                    weight: Some(2.0),
                },
            )
            .await
            .unwrap();
        assert!(missing.is_none());

        assert_eq!(repo.delete(2).await.unwrap().map(|w| w.id), Some(2));
        assert!(repo.delete(2).await.unwrap().is_none());
        assert!(repo.find_first(&Filter::by_id(2)).await.unwrap().is_none());
        assert_eq!(repo.len().await, 3);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let repo = seeded().await;
        repo.delete(4).await.unwrap();
        let created = repo.create(("spring".into(), 0.5)).await.unwrap();
        assert_eq!(created.id, 5);
    }
}
